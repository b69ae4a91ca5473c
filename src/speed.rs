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
use std::str::FromStr;

/// A throttle specification, as parsed from the command line.
///
/// Values above 100% (or a fraction above 1.0) are accepted; the kernel
/// allows a quota larger than the period on multi-core machines.
///
/// # Examples
///
/// ```
/// use cgslow::Speed;
///
/// let speed: Speed = "25%".parse().unwrap();
/// assert_eq!(speed.fraction(), 0.25);
/// assert_eq!(speed.quota_us(100_000), 25_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Speed {
	/// Number followed by `pct` or `%`, such as "10pct".
	Percent(f64),
	/// Bare number already expressed as a fraction of full speed, such as "0.1".
	Fraction(f64),
}

impl Speed {
	pub fn fraction(&self) -> f64 {
		match self {
			Speed::Percent(value) => value / 100.0,
			Speed::Fraction(value) => *value,
		}
	}

	/// CPU time the group may consume per scheduling period, in microseconds.
	pub fn quota_us(&self, period_us: u64) -> u64 {
		(period_us as f64 * self.fraction()) as u64
	}
}

impl FromStr for Speed {
	type Err = Error;

	fn from_str(input: &str) -> Result<Self, Error> {
		let number = input.strip_suffix("pct").or_else(|| input.strip_suffix('%'));
		match number {
			Some(number) => parse_decimal(number).map(Speed::Percent),
			None => parse_decimal(input).map(Speed::Fraction),
		}
		.ok_or_else(|| Error::InvalidSpeed(input.to_string()))
	}
}

/// Accepts "10", "10.", ".5", and "0.5"; rejects signs, exponents, and
/// anything else `f64::from_str` would otherwise allow.
fn parse_decimal(input: &str) -> Option<f64> {
	if !input.chars().all(|c| matches!(c, '0'..='9' | '.')) {
		return None;
	}
	if !input.chars().any(|c| c.is_ascii_digit()) {
		return None;
	}
	if input.matches('.').count() > 1 {
		return None;
	}
	input.parse().ok()
}

#[test]
fn test_parse_percent() {
	assert_eq!("10pct".parse::<Speed>().unwrap(), Speed::Percent(10.0));
	assert_eq!("10%".parse::<Speed>().unwrap(), Speed::Percent(10.0));
	assert_eq!("10pct".parse::<Speed>().unwrap().fraction(), 0.10);
	assert_eq!("12.5pct".parse::<Speed>().unwrap().fraction(), 0.125);
	assert_eq!(".5%".parse::<Speed>().unwrap(), Speed::Percent(0.5));
	assert_eq!("100.%".parse::<Speed>().unwrap().fraction(), 1.0);
}

#[test]
fn test_parse_fraction() {
	assert_eq!("0.5".parse::<Speed>().unwrap(), Speed::Fraction(0.5));
	assert_eq!(".25".parse::<Speed>().unwrap(), Speed::Fraction(0.25));
	assert_eq!("1".parse::<Speed>().unwrap(), Speed::Fraction(1.0));
	assert_eq!("10.".parse::<Speed>().unwrap(), Speed::Fraction(10.0));
}

#[test]
fn test_parse_over_full_speed() {
	assert_eq!("250pct".parse::<Speed>().unwrap().fraction(), 2.5);
	assert_eq!("1.5".parse::<Speed>().unwrap().fraction(), 1.5);
}

#[test]
fn test_parse_rejects() {
	for input in ["garbage", "", "pct", "%", "1.2.3", "1e3", "-1", "+0.5", "inf", " 0.5", "0.5 ", "10p"] {
		assert!(input.parse::<Speed>().is_err(), "accepted {input:?}");
	}
}

#[test]
fn test_quota() {
	assert_eq!("10pct".parse::<Speed>().unwrap().quota_us(100_000), 10_000);
	assert_eq!("25%".parse::<Speed>().unwrap().quota_us(100_000), 25_000);
	assert_eq!("1".parse::<Speed>().unwrap().quota_us(100_000), 100_000);
}
