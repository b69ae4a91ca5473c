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

use cgslow::internal;
use cgslow::Config;
use cgslow::Launcher;
use cgslow::Speed;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::ffi::OsString;
use std::process;
use tracing::error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Runs programs and groups of programs slowly")]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Args, Debug)]
struct LaunchCommand {
	/// Speed of the program, as a percentage ("10pct", "10%") or a fraction of full speed ("0.1").
	#[arg(short, long, default_value = "10pct")]
	speed: Speed,

	/// The program to run and its arguments, separated from the options by "--".
	#[arg(last = true)]
	cmd: Vec<OsString>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Launches a slow program in a fresh throttled control group
	Launch(LaunchCommand),
	/// Kills all processes and removes all control groups created from here
	Killall,
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();
	let args = Cli::parse();
	internal::os_check();
	match run(args) {
		Ok(code) => process::exit(code),
		Err(err) => {
			error!("{err}");
			process::exit(1);
		}
	}
}

fn run(args: Cli) -> cgslow::Result<i32> {
	match args.command {
		Command::Launch(cmd_args) => {
			let mut launcher = Launcher::new(Config::default())?;
			let status = launcher.launch(&cmd_args.speed, &cmd_args.cmd)?;
			Ok(status.code().unwrap_or(0))
		}
		Command::Killall => {
			let launcher = Launcher::new(Config::default())?;
			let failed = launcher.reclaim()?;
			if !failed.is_empty() {
				warn!("{} control group(s) left in place; re-run killall to retry", failed.len());
			}
			Ok(0)
		}
	}
}

#[test]
fn test_cli_launch() {
	fn cli(input: &str) -> Result<Cli, String> {
		Cli::try_parse_from(shlex::split(input).unwrap()).map_err(|e| format!("{e}"))
	}
	assert!(cli("cgslow").is_err());
	assert!(cli("cgslow launch extra").is_err());
	assert!(cli("cgslow launch --speed").is_err());

	let Command::Launch(args) = cli("cgslow launch").unwrap().command else {
		panic!("expected launch");
	};
	assert_eq!(args.speed, Speed::Percent(10.0));
	assert!(args.cmd.is_empty());

	let Command::Launch(args) = cli("cgslow launch --speed=25% -- true").unwrap().command else {
		panic!("expected launch");
	};
	assert_eq!(args.speed, Speed::Percent(25.0));
	assert_eq!(args.cmd, vec![OsString::from("true")]);

	let Command::Launch(args) = cli("cgslow launch -s 0.5 -- sleep 10 --badflag").unwrap().command else {
		panic!("expected launch");
	};
	assert_eq!(args.speed, Speed::Fraction(0.5));
	assert_eq!(
		args.cmd,
		vec![OsString::from("sleep"), OsString::from("10"), OsString::from("--badflag")]
	);
}

#[test]
fn test_cli_killall() {
	fn cli(input: &str) -> Result<Cli, String> {
		Cli::try_parse_from(shlex::split(input).unwrap()).map_err(|e| format!("{e}"))
	}
	assert!(matches!(cli("cgslow killall").unwrap().command, Command::Killall));
	assert!(cli("cgslow killall extra").is_err());
	assert!(cli("cgslow killall --speed=10pct").is_err());
}
