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

use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghi";
const SUFFIX_LEN: usize = 5;

/// Generates a control group name from a fixed prefix and a short random
/// suffix. Uniqueness is probabilistic, not checked: a collision makes
/// cgcreate refuse the group downstream.
pub fn random_group_name(prefix: &str) -> String {
	let mut rng = rand::thread_rng();
	let mut name = String::with_capacity(prefix.len() + SUFFIX_LEN);
	name.push_str(prefix);
	for _ in 0..SUFFIX_LEN {
		name.push(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char);
	}
	name
}

#[test]
fn test_random_group_name() {
	let name = random_group_name("cgslow_");
	assert_eq!(name.len(), "cgslow_".len() + SUFFIX_LEN);
	let suffix = name.strip_prefix("cgslow_").unwrap();
	assert!(suffix.chars().all(|c| matches!(c, 'a'..='i')));
}
