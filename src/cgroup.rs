// Copyright 2026 Octave Online LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::Error;
use crate::error::Result;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::sys::signal::Signal;
use nix::unistd::Group;
use nix::unistd::Pid;
use nix::unistd::User;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;
use tracing::info;

const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// A named control group with an ordered list of attached subsystems.
///
/// All group manipulation is delegated to the libcgroup CLI tools; this
/// struct only knows how to drive them. The subsystem order is fixed at
/// construction since it determines the `SUBSYSTEMS:/NAME` handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleGroup {
	name: String,
	subsystems: Vec<String>,
}

impl ThrottleGroup {
	pub fn new(name: impl Into<String>, subsystems: Vec<String>) -> Self {
		Self {
			name: name.into(),
			subsystems,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn subsystems(&self) -> &[String] {
		&self.subsystems
	}

	/// # Examples
	///
	/// ```
	/// use cgslow::ThrottleGroup;
	///
	/// let group = ThrottleGroup::new("grp", vec!["cpu".to_string()]);
	/// assert_eq!(group.handle(), "cpu:/grp");
	/// ```
	pub fn handle(&self) -> String {
		format!("{}:/{}", self.subsystems.join(","), self.name)
	}

	/// Creates the group, owned by the invoking user so that later cgexec
	/// calls need no elevation.
	pub fn create(&self) -> Result<()> {
		let owner = current_owner()?;
		let mut cmd = Command::new("sudo");
		cmd.arg("cgcreate")
			.arg("-a")
			.arg(&owner)
			.arg("-g")
			.arg(self.handle())
			.arg("-t")
			.arg(&owner);
		run_tool("cgcreate", &mut cmd).map_err(|err| match err {
			Error::Toolchain { status, .. } => Error::GroupCreation {
				name: self.name.clone(),
				status,
			},
			other => other,
		})
	}

	/// Applies the CPU bandwidth cap. The period must be written before the
	/// quota: the kernel validates the quota against the period already in
	/// place. A failure on the second call leaves only the period set.
	pub fn set_cpu_bandwidth(&self, period_us: u64, quota_us: u64) -> Result<()> {
		let mut cmd = Command::new("sudo");
		cmd.arg("cgset")
			.arg("-r")
			.arg(format!("cpu.cfs_period_us={period_us}"))
			.arg(&self.name);
		run_tool("cgset", &mut cmd)?;

		let mut cmd = Command::new("sudo");
		cmd.arg("cgset")
			.arg("-r")
			.arg(format!("cpu.cfs_quota_us={quota_us}"))
			.arg(&self.name);
		run_tool("cgset", &mut cmd)
	}

	/// Runs a command inside the group, blocking until it exits, and returns
	/// its exit status. The group is left in place afterwards.
	pub fn exec(&self, cmd_line: &[impl AsRef<OsStr>]) -> Result<ExitStatus> {
		let mut cmd = Command::new("cgexec");
		cmd.arg("-g").arg(self.handle()).args(cmd_line);
		info!("executing {cmd:?}");
		Ok(cmd.status()?)
	}

	/// Fails if the group still has member processes or no longer exists.
	pub fn delete(&self) -> Result<()> {
		let mut cmd = Command::new("sudo");
		cmd.arg("cgdelete").arg(self.handle());
		run_tool("cgdelete", &mut cmd)
	}

	/// PIDs currently in the group, read from the cgroupfs membership
	/// listing. A missing listing means the group is already gone and yields
	/// an empty list.
	pub fn tasks(&self) -> Result<Vec<i32>> {
		let mut path = PathBuf::from(CGROUP_ROOT);
		path.push("cpu");
		path.push(&self.name);
		path.push("tasks");
		let contents = match fs::read_to_string(&path) {
			Ok(contents) => contents,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(err) => return Err(err.into()),
		};
		Ok(contents.lines().filter_map(|line| line.trim().parse().ok()).collect())
	}

	/// Sends SIGKILL to every member process. A process that exited between
	/// the listing and the signal is not an error.
	pub fn kill_tasks(&self) -> Result<()> {
		for pid in self.tasks()? {
			match kill(Pid::from_raw(pid), Signal::SIGKILL) {
				Ok(()) | Err(Errno::ESRCH) => {}
				Err(err) => return Err(io::Error::from(err).into()),
			}
		}
		Ok(())
	}
}

/// The invoking user's `user:group` pair, as cgcreate's `-a` and `-t`
/// options expect it.
fn current_owner() -> Result<String> {
	let uid = nix::unistd::getuid();
	let gid = nix::unistd::getgid();
	let user = User::from_uid(uid)
		.map_err(io::Error::from)?
		.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no passwd entry for uid {uid}")))?;
	let group = Group::from_gid(gid)
		.map_err(io::Error::from)?
		.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no group entry for gid {gid}")))?;
	Ok(format!("{}:{}", user.name, group.name))
}

fn run_tool(tool: &'static str, cmd: &mut Command) -> Result<()> {
	info!("executing {cmd:?}");
	let status = cmd.status()?;
	if !status.success() {
		return Err(Error::Toolchain { tool, status });
	}
	Ok(())
}

#[test]
fn test_handle_joins_subsystems_in_order() {
	let group = ThrottleGroup::new("grp", vec!["cpu".to_string(), "memory".to_string()]);
	assert_eq!(group.handle(), "cpu,memory:/grp");
}

#[test]
fn test_tasks_without_listing() {
	let group = ThrottleGroup::new("cgslow_no_such_group", vec!["cpu".to_string()]);
	assert_eq!(group.tasks().unwrap(), Vec::<i32>::new());
}

#[test]
fn test_kill_tasks_without_listing() {
	let group = ThrottleGroup::new("cgslow_no_such_group", vec!["cpu".to_string()]);
	group.kill_tasks().unwrap();
}
