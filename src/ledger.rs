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

use crate::error::Result;
use rusqlite::params;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Durable record of the control groups this tool created, one SQLite file
/// in the working directory. The ledger, not the cgroupfs, is the source of
/// truth for what a later `killall` is responsible for; it outlives the
/// process that wrote it.
pub struct Ledger {
	conn: Connection,
	path: PathBuf,
}

impl Ledger {
	/// Opens the backing file, creating it and its schema if absent.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let conn = Connection::open(path.as_ref())?;
		// busy_timeout covers concurrent launch invocations sharing the file.
		conn.execute_batch(
			"PRAGMA busy_timeout = 5000;
			PRAGMA foreign_keys = ON;
			CREATE TABLE IF NOT EXISTS created_cgs(
				cgname TEXT PRIMARY KEY
			);
			CREATE TABLE IF NOT EXISTS subsystems(
				ssname TEXT NOT NULL,
				ofcg TEXT NOT NULL,
				seqno INTEGER NOT NULL,
				FOREIGN KEY (ofcg) REFERENCES created_cgs(cgname)
			);",
		)?;
		Ok(Self {
			conn,
			path: path.as_ref().to_path_buf(),
		})
	}

	/// Records a group and its subsystems, numbered by position, as one
	/// transaction: either every row lands or none do.
	pub fn record_group(&mut self, name: &str, subsystems: &[String]) -> Result<()> {
		let tx = self.conn.transaction()?;
		tx.execute("INSERT INTO created_cgs (cgname) VALUES (?1)", params![name])?;
		for (seqno, subsystem) in subsystems.iter().enumerate() {
			tx.execute(
				"INSERT INTO subsystems (ssname, ofcg, seqno) VALUES (?1, ?2, ?3)",
				params![subsystem, name, seqno as i64],
			)?;
		}
		tx.commit()?;
		Ok(())
	}

	/// Every recorded group mapped to its subsystem names, each list in the
	/// order it was recorded (enforced by the stored sequence number).
	pub fn groups_with_subsystems(&self) -> Result<BTreeMap<String, Vec<String>>> {
		let mut stmt = self
			.conn
			.prepare("SELECT ofcg, ssname FROM subsystems ORDER BY ofcg, seqno")?;
		let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
		let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for row in rows {
			let (name, subsystem) = row?;
			groups.entry(name).or_default().push(subsystem);
		}
		Ok(groups)
	}

	/// Removes a group and all of its subsystem rows in one transaction.
	pub fn remove_group(&mut self, name: &str) -> Result<()> {
		let tx = self.conn.transaction()?;
		tx.execute("DELETE FROM subsystems WHERE ofcg = ?1", params![name])?;
		tx.execute("DELETE FROM created_cgs WHERE cgname = ?1", params![name])?;
		tx.commit()?;
		Ok(())
	}

	pub fn is_empty(&self) -> Result<bool> {
		let count: i64 = self
			.conn
			.query_row("SELECT COUNT(*) FROM created_cgs", [], |row| row.get(0))?;
		Ok(count == 0)
	}

	/// Closes the connection and deletes the backing file. Callers only do
	/// this once nothing is left to track; a ledger with live rows must stay
	/// on disk so orphaned groups are not forgotten.
	pub fn destroy(self) -> Result<()> {
		let path = self.path;
		self.conn.close().map_err(|(_, err)| err)?;
		fs::remove_file(&path)?;
		Ok(())
	}
}

#[test]
fn test_record_and_list_preserves_order() {
	let dir = tempfile::tempdir().unwrap();
	let mut ledger = Ledger::open(dir.path().join("ledger.sq3")).unwrap();
	ledger
		.record_group("grp_a", &["cpu".to_string(), "memory".to_string()])
		.unwrap();
	ledger
		.record_group("grp_b", &["memory".to_string(), "cpu".to_string()])
		.unwrap();
	let groups = ledger.groups_with_subsystems().unwrap();
	assert_eq!(groups.len(), 2);
	assert_eq!(groups["grp_a"], vec!["cpu", "memory"]);
	assert_eq!(groups["grp_b"], vec!["memory", "cpu"]);
}

#[test]
fn test_record_duplicate_fails_atomically() {
	let dir = tempfile::tempdir().unwrap();
	let mut ledger = Ledger::open(dir.path().join("ledger.sq3")).unwrap();
	ledger.record_group("grp_a", &["cpu".to_string()]).unwrap();
	assert!(ledger
		.record_group("grp_a", &["cpu".to_string(), "memory".to_string()])
		.is_err());
	let groups = ledger.groups_with_subsystems().unwrap();
	assert_eq!(groups.len(), 1);
	assert_eq!(groups["grp_a"], vec!["cpu"]);
}

#[test]
fn test_rows_survive_reopen() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ledger.sq3");
	{
		let mut ledger = Ledger::open(&path).unwrap();
		ledger.record_group("grp_a", &["cpu".to_string()]).unwrap();
	}
	let ledger = Ledger::open(&path).unwrap();
	let groups = ledger.groups_with_subsystems().unwrap();
	assert_eq!(groups["grp_a"], vec!["cpu"]);
}

#[test]
fn test_destroy_removes_backing_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ledger.sq3");
	let mut ledger = Ledger::open(&path).unwrap();
	ledger.record_group("grp_a", &["cpu".to_string()]).unwrap();
	ledger.remove_group("grp_a").unwrap();
	assert!(ledger.is_empty().unwrap());
	ledger.destroy().unwrap();
	assert!(!path.exists());
}

#[test]
fn test_partial_removal_keeps_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("ledger.sq3");
	let mut ledger = Ledger::open(&path).unwrap();
	ledger.record_group("grp_a", &["cpu".to_string()]).unwrap();
	ledger.record_group("grp_b", &["cpu".to_string()]).unwrap();
	ledger.remove_group("grp_a").unwrap();
	assert!(!ledger.is_empty().unwrap());
	let groups = ledger.groups_with_subsystems().unwrap();
	assert_eq!(groups.len(), 1);
	assert_eq!(groups["grp_b"], vec!["cpu"]);
	assert!(path.exists());
}
