use rusqlite::Connection;

use crate::Db;
use crate::error::Result;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_unique_usage_day.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_unique_usage_day", MIGRATION_0002),
];

impl Db {
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0002_unique_usage_day" {
                if index_exists(&tx, "idx_usage_record_day")? {
                    continue;
                }
                let before = count_rows(&tx, "usage_record")?;
                tx.execute_batch(sql)?;
                let removed = before - count_rows(&tx, "usage_record")?;
                if removed > 0 {
                    log::warn!("collapsed {} duplicate usage_record rows", removed);
                }
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn index_exists(conn: &Connection, index: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1")?;
    let mut rows = stmt.query([index])?;
    Ok(rows.next()?.is_some())
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}
