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

use crate::cgroup::ThrottleGroup;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::name::random_group_name;
use crate::speed::Speed;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::ExitStatus;
use tracing::info;
use tracing::warn;

const LEDGER_FILE: &str = "cgslow.sq3";

/// Scheduling period for the CPU bandwidth cap. 100ms is the kernel default
/// and what the quota is computed against.
const PERIOD_US: u64 = 100_000;

#[derive(Debug, Clone)]
pub struct Config {
	pub ledger_path: PathBuf,
	pub period_us: u64,
	pub name_prefix: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			ledger_path: PathBuf::from(LEDGER_FILE),
			period_us: PERIOD_US,
			name_prefix: "cgslow_".to_string(),
		}
	}
}

/// Drives the two workflows: launching a program in a fresh throttled group
/// and reclaiming every group the ledger knows about.
pub struct Launcher {
	config: Config,
	ledger: Ledger,
}

impl Launcher {
	pub fn new(config: Config) -> Result<Self> {
		let ledger = Ledger::open(&config.ledger_path)?;
		Ok(Self { config, ledger })
	}

	/// Creates a throttled group and runs `cmd_line` inside it, blocking
	/// until the command exits. Returns the command's own exit status. The
	/// group stays behind afterwards, to be torn down by [`reclaim`].
	///
	/// The group is recorded in the ledger before the bandwidth cap is
	/// applied: a crash mid-configuration must still leave a record, or the
	/// unthrottled group could never be reclaimed.
	///
	/// [`reclaim`]: Launcher::reclaim
	pub fn launch(&mut self, speed: &Speed, cmd_line: &[impl AsRef<OsStr>]) -> Result<ExitStatus> {
		let subsystems = vec!["cpu".to_string()];
		let group = ThrottleGroup::new(random_group_name(&self.config.name_prefix), subsystems);
		group.create()?;
		self.ledger.record_group(group.name(), group.subsystems())?;
		info!("created control group {}", group.name());

		let quota_us = speed.quota_us(self.config.period_us);
		group.set_cpu_bandwidth(self.config.period_us, quota_us)?;
		group.exec(cmd_line)
	}

	/// Kills the member processes of every recorded group and deletes the
	/// groups. A group whose deletion fails keeps its ledger rows and is
	/// returned by name, so a re-run can retry it; the backing file is only
	/// removed once every group is gone.
	pub fn reclaim(mut self) -> Result<Vec<String>> {
		let mut failed = Vec::new();
		for (name, subsystems) in self.ledger.groups_with_subsystems()? {
			let group = ThrottleGroup::new(name, subsystems);
			group.kill_tasks()?;
			match group.delete() {
				Ok(()) => {
					self.ledger.remove_group(group.name())?;
					info!("removed control group {}", group.name());
				}
				Err(err) => {
					warn!("could not remove control group {}: {err}", group.name());
					failed.push(group.name().to_string());
				}
			}
		}
		if failed.is_empty() {
			self.ledger.destroy()?;
		}
		Ok(failed)
	}
}

#[test]
fn test_config_default() {
	let config = Config::default();
	assert_eq!(config.ledger_path, PathBuf::from("cgslow.sq3"));
	assert_eq!(config.period_us, 100_000);
	assert_eq!(config.name_prefix, "cgslow_");
}

#[test]
fn test_reclaim_with_nothing_tracked_destroys_ledger() {
	let dir = tempfile::tempdir().unwrap();
	let config = Config {
		ledger_path: dir.path().join("ledger.sq3"),
		..Config::default()
	};
	let launcher = Launcher::new(config.clone()).unwrap();
	assert!(config.ledger_path.exists());
	let failed = launcher.reclaim().unwrap();
	assert!(failed.is_empty());
	assert!(!config.ledger_path.exists());
}
