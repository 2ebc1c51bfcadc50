use rusqlite::{OptionalExtension, params};
use tracker_core::Goal;

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{now_rfc3339, row_to_goal};

impl Db {
    /// Creates a goal; without an explicit limit the configured default
    /// daily limit applies.
    pub fn create_goal(
        &self,
        name: &str,
        description: &str,
        daily_limit_minutes: Option<u32>,
    ) -> Result<Goal> {
        let limit = match daily_limit_minutes {
            Some(limit) => limit,
            None => self.get_default_daily_limit_minutes()?,
        };
        self.conn.execute(
            r#"
            INSERT INTO goal (name, description, daily_limit_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![name, description, limit as i64, now_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_goal(id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_goal(&self, id: i64) -> Result<Option<Goal>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, description, daily_limit_minutes, created_at
                FROM goal
                WHERE id = ?1
                "#,
                params![id],
                row_to_goal,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, description, daily_limit_minutes, created_at
            FROM goal
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// New limits apply to days recorded from now on; existing rows keep the
    /// limit they were written with.
    pub fn set_goal_limit(&self, id: i64, daily_limit_minutes: u32) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE goal SET daily_limit_minutes = ?1 WHERE id = ?2",
            params![daily_limit_minutes as i64, id],
        )?;
        Ok(updated > 0)
    }

    /// Removes the goal along with its usage records.
    pub fn delete_goal(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM goal WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
