use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use tracker_core::{Goal, UsageRecord, parse_day};

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn minutes_from_sql(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

pub(crate) fn date_from_row(
    row: &Row<'_>,
    idx: usize,
) -> std::result::Result<NaiveDate, rusqlite::Error> {
    let value: String = row.get(idx)?;
    parse_day(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn row_to_usage_record(
    row: &Row<'_>,
) -> std::result::Result<UsageRecord, rusqlite::Error> {
    Ok(UsageRecord {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        package_name: row.get(2)?,
        app_name: row.get(3)?,
        usage_date: date_from_row(row, 4)?,
        duration_minutes: minutes_from_sql(row.get(5)?),
        daily_limit_minutes: minutes_from_sql(row.get(6)?),
        is_tracked: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) fn row_to_goal(row: &Row<'_>) -> std::result::Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        daily_limit_minutes: minutes_from_sql(row.get(3)?),
        created_at: row.get(4)?,
    })
}
