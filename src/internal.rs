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

use std::path::Path;
use std::process;

pub fn os_check() {
	if !cfg!(target_os = "linux") {
		eprintln!("cgslow requires Linux control groups.");
		process::exit(1);
	}
	if !Path::new("/sys/fs/cgroup").is_dir() {
		eprintln!("cgroupfs is not mounted at /sys/fs/cgroup.");
		process::exit(1);
	}
}
