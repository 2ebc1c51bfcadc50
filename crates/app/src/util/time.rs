use chrono::{Datelike, Days, Local, NaiveDate};

use crate::config::RangeParams;
use crate::error::{AppError, Result};
use tracker_core::{DateRange, parse_day};

pub fn resolve_range(params: &RangeParams) -> Result<DateRange> {
    resolve_range_at(params, Local::now().date_naive())
}

/// Resolves `params` against `today`. Explicit bounds win over a named range;
/// a lone `start` runs until today.
pub fn resolve_range_at(params: &RangeParams, today: NaiveDate) -> Result<DateRange> {
    if let Some(start) = params.start.as_deref() {
        let start = parse_date(start)?;
        let end = match params.end.as_deref() {
            Some(end) => parse_date(end)?,
            None => today,
        };
        if end < start {
            return Err(AppError::InvalidInput(format!(
                "range end {} is before start {}",
                end, start
            )));
        }
        return Ok(DateRange { start, end });
    }
    let start = match params.range.as_deref().unwrap_or("last7days") {
        "today" => today,
        "last7days" => days_before(today, 6)?,
        "last14days" => days_before(today, 13)?,
        "thismonth" => today
            .with_day(1)
            .ok_or_else(|| AppError::InvalidInput("invalid local date".to_string()))?,
        "alltime" => NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| AppError::InvalidInput("invalid local date".to_string()))?,
        value => {
            return Err(AppError::InvalidInput(format!(
                "unsupported range {}",
                value
            )));
        }
    };
    Ok(DateRange { start, end: today })
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    parse_day(value)
        .map_err(|err| AppError::InvalidInput(format!("invalid date {}: {}", value, err)))
}

fn days_before(today: NaiveDate, days: u64) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| AppError::InvalidInput("date out of range".to_string()))
}
