use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracker_core::{UsageRecord, UsageUpsert, format_day};

use crate::Db;
use crate::error::Result;
use crate::helpers::{date_from_row, minutes_from_sql, now_rfc3339, row_to_usage_record};

impl Db {
    /// Inserts today's row for the key or overwrites its duration and display
    /// name. The stored limit and tracking flag survive an update; a new day
    /// inherits the flag of the pair's earlier days.
    pub fn upsert_usage(&self, entry: &UsageUpsert) -> Result<UsageRecord> {
        upsert_usage_on(&self.conn, entry)
    }

    pub fn find_usage(
        &self,
        goal_id: i64,
        package_name: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageRecord>> {
        let record = self
            .conn
            .query_row(
                r#"
                SELECT id, goal_id, package_name, app_name, usage_date, duration_minutes,
                       daily_limit_minutes, is_tracked, updated_at
                FROM usage_record
                WHERE goal_id = ?1 AND package_name = ?2 AND usage_date = ?3
                "#,
                params![goal_id, package_name, format_day(date)],
                row_to_usage_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn usage_history(&self, goal_id: i64) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, goal_id, package_name, app_name, usage_date, duration_minutes,
                   daily_limit_minutes, is_tracked, updated_at
            FROM usage_record
            WHERE goal_id = ?1
            ORDER BY usage_date DESC, package_name ASC
            "#,
        )?;
        let rows = stmt.query_map(params![goal_id], row_to_usage_record)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn usage_history_for_package(
        &self,
        goal_id: i64,
        package_name: &str,
    ) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, goal_id, package_name, app_name, usage_date, duration_minutes,
                   daily_limit_minutes, is_tracked, updated_at
            FROM usage_record
            WHERE goal_id = ?1 AND package_name = ?2
            ORDER BY usage_date DESC
            "#,
        )?;
        let rows = stmt.query_map(params![goal_id, package_name], row_to_usage_record)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn usage_in_range(
        &self,
        goal_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UsageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, goal_id, package_name, app_name, usage_date, duration_minutes,
                   daily_limit_minutes, is_tracked, updated_at
            FROM usage_record
            WHERE goal_id = ?1 AND usage_date BETWEEN ?2 AND ?3
            ORDER BY usage_date ASC, package_name ASC
            "#,
        )?;
        let rows = stmt.query_map(
            params![goal_id, format_day(start), format_day(end)],
            row_to_usage_record,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Minutes across every goal tracking `package_name` on `date`; `None`
    /// when no row exists.
    pub fn total_usage_for_date(&self, package_name: &str, date: NaiveDate) -> Result<Option<u32>> {
        let total = self.conn.query_row(
            r#"
            SELECT SUM(duration_minutes)
            FROM usage_record
            WHERE package_name = ?1 AND usage_date = ?2
            "#,
            params![package_name, format_day(date)],
            |row| row.get::<_, Option<i64>>(0),
        )?;
        Ok(total.map(minutes_from_sql))
    }

    pub fn average_usage_in_range(
        &self,
        goal_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<f64>> {
        let average = self.conn.query_row(
            r#"
            SELECT AVG(duration_minutes)
            FROM usage_record
            WHERE goal_id = ?1 AND usage_date BETWEEN ?2 AND ?3
            "#,
            params![goal_id, format_day(start), format_day(end)],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(average)
    }

    pub fn last_compliant_date(&self, goal_id: i64) -> Result<Option<NaiveDate>> {
        let date = self
            .conn
            .query_row(
                r#"
                SELECT usage_date
                FROM usage_record
                WHERE goal_id = ?1 AND duration_minutes <= daily_limit_minutes
                ORDER BY usage_date DESC
                LIMIT 1
                "#,
                params![goal_id],
                |row| date_from_row(row, 0),
            )
            .optional()?;
        Ok(date)
    }

    pub fn count_usage_records(&self, goal_id: i64) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM usage_record WHERE goal_id = ?1",
            params![goal_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

pub(crate) fn upsert_usage_on(conn: &Connection, entry: &UsageUpsert) -> Result<UsageRecord> {
    let record = conn.query_row(
        r#"
        INSERT INTO usage_record (
          goal_id, package_name, app_name, usage_date, duration_minutes,
          daily_limit_minutes, is_tracked, updated_at
        ) VALUES (
          ?1, ?2, ?3, ?4, ?5, ?6,
          COALESCE(
            (SELECT MIN(is_tracked) FROM usage_record
             WHERE goal_id = ?1 AND package_name = ?2),
            1
          ),
          ?7
        )
        ON CONFLICT(goal_id, package_name, usage_date) DO UPDATE SET
          duration_minutes = excluded.duration_minutes,
          app_name = excluded.app_name,
          updated_at = excluded.updated_at
        RETURNING id, goal_id, package_name, app_name, usage_date, duration_minutes,
                  daily_limit_minutes, is_tracked, updated_at
        "#,
        params![
            entry.goal_id,
            entry.package_name,
            entry.app_name,
            format_day(entry.usage_date),
            entry.duration_minutes as i64,
            entry.daily_limit_minutes as i64,
            now_rfc3339(),
        ],
        row_to_usage_record,
    )?;
    Ok(record)
}
