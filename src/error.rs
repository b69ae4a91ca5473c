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

use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	/// The speed argument matched neither the percentage nor the fraction grammar.
	#[error("could not parse speed {0:?}; expected a percentage like \"10pct\" or \"10%\", or a fraction like \"0.1\"")]
	InvalidSpeed(String),

	/// cgcreate refused the new group. A name collision from the generator
	/// surfaces here, since the group then already exists.
	#[error("could not create control group {name:?}: cgcreate exited with {status}")]
	GroupCreation { name: String, status: ExitStatus },

	#[error("{tool} exited with {status}")]
	Toolchain {
		tool: &'static str,
		status: ExitStatus,
	},

	#[error("ledger error: {0}")]
	Ledger(#[from] rusqlite::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
