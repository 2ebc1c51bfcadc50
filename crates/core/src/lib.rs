use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// A (goal, application package) relationship under active monitoring.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackedPair {
    pub goal_id: i64,
    pub package_name: String,
}

impl TrackedPair {
    pub fn new(goal_id: i64, package_name: impl Into<String>) -> Self {
        Self {
            goal_id,
            package_name: package_name.into(),
        }
    }
}

/// Daily usage of one package against one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: i64,
    pub goal_id: i64,
    pub package_name: String,
    pub app_name: String,
    pub usage_date: NaiveDate,
    pub duration_minutes: u32,
    pub daily_limit_minutes: u32,
    pub is_tracked: bool,
    pub updated_at: String,
}

impl UsageRecord {
    pub fn is_compliant(&self) -> bool {
        is_compliant(self.duration_minutes, self.daily_limit_minutes)
    }

    pub fn pair(&self) -> TrackedPair {
        TrackedPair::new(self.goal_id, self.package_name.clone())
    }
}

/// Values written by an upsert, keyed by `(goal_id, package_name, usage_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageUpsert {
    pub goal_id: i64,
    pub package_name: String,
    pub usage_date: NaiveDate,
    pub duration_minutes: u32,
    pub daily_limit_minutes: u32,
    pub app_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub daily_limit_minutes: u32,
    pub created_at: String,
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What a consumer may say about today's usage of a tracked package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UsageStatus {
    PermissionMissing,
    NoData,
    WithinLimit { used: u32, limit: u32 },
    OverLimit { used: u32, limit: u32 },
}

pub fn is_compliant(duration_minutes: u32, daily_limit_minutes: u32) -> bool {
    duration_minutes <= daily_limit_minutes
}

/// A zero reading only counts once permission is confirmed; without it the
/// record cannot be told apart from a failed provider query.
pub fn usage_status(has_permission: bool, record: Option<&UsageRecord>) -> UsageStatus {
    if !has_permission {
        return UsageStatus::PermissionMissing;
    }
    match record {
        None => UsageStatus::NoData,
        Some(record) if record.is_compliant() => UsageStatus::WithinLimit {
            used: record.duration_minutes,
            limit: record.daily_limit_minutes,
        },
        Some(record) => UsageStatus::OverLimit {
            used: record.duration_minutes,
            limit: record.daily_limit_minutes,
        },
    }
}

/// Counts consecutive compliant days for `package_name`, newest first,
/// stopping at the first day over its limit. Missing days are not breaks.
pub fn current_streak(history: &[UsageRecord], package_name: &str) -> u32 {
    let mut records = history
        .iter()
        .filter(|record| record.package_name == package_name)
        .collect::<Vec<_>>();
    records.sort_by(|a, b| b.usage_date.cmp(&a.usage_date));
    let mut streak = 0u32;
    for record in records {
        if !record.is_compliant() {
            break;
        }
        streak = streak.saturating_add(1);
    }
    streak
}

pub fn local_day_start(date: NaiveDate) -> DateTime<Local> {
    local_datetime(date.and_time(NaiveTime::MIN))
}

pub fn local_day_end(date: NaiveDate) -> DateTime<Local> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_datetime(date.and_time(end))
}

fn local_datetime(naive: NaiveDateTime) -> DateTime<Local> {
    // DST gaps have no local midnight; fall back to reading the wall time as UTC.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_day(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}
