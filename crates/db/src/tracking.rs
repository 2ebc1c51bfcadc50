use rusqlite::{Connection, params};
use tracker_core::{TrackedPair, UsageRecord, UsageUpsert};

use crate::Db;
use crate::error::Result;
use crate::usage_records::upsert_usage_on;

impl Db {
    pub fn tracked_pairs(&self) -> Result<Vec<TrackedPair>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT goal_id, package_name
            FROM usage_record
            WHERE is_tracked = 1
            ORDER BY goal_id ASC, package_name ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TrackedPair {
                goal_id: row.get(0)?,
                package_name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Flips the tracking flag on every day recorded for the pair. Returns
    /// the number of rows touched; zero means the pair has no records yet.
    pub fn set_tracked(&self, package_name: &str, goal_id: i64, enabled: bool) -> Result<usize> {
        set_tracked_on(&self.conn, package_name, goal_id, enabled)
    }

    /// Re-enables every recorded day of the pair and writes `entry`, in one
    /// transaction.
    pub fn start_tracking(&mut self, entry: &UsageUpsert) -> Result<UsageRecord> {
        let tx = self.conn.transaction()?;
        set_tracked_on(&tx, &entry.package_name, entry.goal_id, true)?;
        let record = upsert_usage_on(&tx, entry)?;
        tx.commit()?;
        Ok(record)
    }

    pub fn is_tracked(&self, goal_id: i64, package_name: &str) -> Result<bool> {
        let tracked = self.conn.query_row(
            r#"
            SELECT EXISTS (
              SELECT 1 FROM usage_record
              WHERE goal_id = ?1 AND package_name = ?2 AND is_tracked = 1
            )
            "#,
            params![goal_id, package_name],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(tracked)
    }
}

fn set_tracked_on(
    conn: &Connection,
    package_name: &str,
    goal_id: i64,
    enabled: bool,
) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE usage_record SET is_tracked = ?1 WHERE package_name = ?2 AND goal_id = ?3",
        params![enabled, package_name, goal_id],
    )?;
    Ok(updated)
}
