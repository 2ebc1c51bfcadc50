#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use reconcile::{ForegroundLogProvider, StaticAccess, StaticLabels, UsageDataSource};
use tempfile::TempDir;
use tracker_app::{AppConfig, AppState};

pub const FEED: &str = "com.example.feed";
pub const CHAT: &str = "com.example.chat";

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub log_path: PathBuf,
}

/// App over a temp database, reading usage from a foreground log written by
/// [`write_sessions`].
pub fn setup_app(granted: bool) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let log_path = dir.path().join("foreground.jsonl");
    let source = UsageDataSource::new(
        Some(Arc::new(ForegroundLogProvider::new(&log_path))),
        Arc::new(StaticAccess(granted)),
    );
    let labels = [(FEED.to_string(), "Feed".to_string())]
        .into_iter()
        .collect::<StaticLabels>();
    let state = AppState::open(
        AppConfig {
            db_path: dir.path().join("app.sqlite"),
        },
        source,
        Arc::new(labels),
    )
    .expect("open app");
    TestApp {
        _dir: dir,
        state,
        log_path,
    }
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(hour, minute, 0).expect("time"))
        .single()
        .expect("local time")
}

pub fn day(value: &str) -> NaiveDate {
    tracker_core::parse_day(value).expect("date")
}

/// 2025-03-03 12:00 local time.
pub fn noon() -> DateTime<Local> {
    at(day("2025-03-03"), 12, 0)
}

/// Appends one session per `(package, start, minutes)`.
pub fn write_sessions(app: &TestApp, sessions: &[(&str, DateTime<Local>, i64)]) {
    let mut file = File::options()
        .create(true)
        .append(true)
        .open(&app.log_path)
        .expect("open log");
    for (package, start, minutes) in sessions {
        let start_ms = start.timestamp_millis();
        let line = serde_json::json!({
            "package": package,
            "start_ms": start_ms,
            "end_ms": start_ms + minutes * 60_000,
        });
        writeln!(file, "{}", line).expect("write session");
    }
}
