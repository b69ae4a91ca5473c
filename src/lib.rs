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

//! This package launches programs inside CPU-bandwidth-limited control groups (cgroups v1) and keeps a durable ledger of every group it created, so that a later invocation can kill the member processes and remove the groups en masse.
//!
//! The kernel-facing work is delegated to the libcgroup CLI tools (`cgcreate`, `cgset`, `cgexec`, `cgdelete`); this crate orchestrates them.
//!
//! The `cgslow` binary has two subcommands:
//!
//! - `cgslow launch --speed 10pct -- some-program args` for starting a throttled program in a fresh control group.
//! - `cgslow killall` for reaping every control group recorded in the ledger.

mod cgroup;
mod error;
mod launcher;
mod ledger;
mod name;
mod speed;

#[doc(hidden)]
pub mod internal;

pub use cgroup::ThrottleGroup;
pub use error::Error;
pub use error::Result;
pub use launcher::Config;
pub use launcher::Launcher;
pub use ledger::Ledger;
pub use name::random_group_name;
pub use speed::Speed;
