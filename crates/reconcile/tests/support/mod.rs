#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use reconcile::{
    AppLabels, LabelError, ProviderError, StaticAccess, UsageDataSource, UsageProvider,
};
use tempfile::TempDir;
use tracker_core::{Goal, UsageUpsert, parse_day};
use tracker_db::UsageStore;

pub struct TestStore {
    pub _dir: TempDir,
    pub store: UsageStore,
}

pub fn setup_store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = UsageStore::open(dir.path().join("usage.sqlite")).expect("open store");
    TestStore { _dir: dir, store }
}

pub fn setup_goal(store: &UsageStore, limit: u32) -> Goal {
    store
        .connect()
        .expect("connect")
        .create_goal("Less scrolling", "", Some(limit))
        .expect("create goal")
}

pub fn day(value: &str) -> NaiveDate {
    parse_day(value).expect("date")
}

/// Fixed clock: 2025-03-03 12:00 local time.
pub fn noon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 3, 3, 12, 0, 0)
        .single()
        .expect("local noon")
}

/// Marks a pair as tracked the way the app does: by writing a record.
pub fn seed_tracked(store: &UsageStore, goal_id: i64, package_name: &str) {
    store
        .upsert(&UsageUpsert {
            goal_id,
            package_name: package_name.to_string(),
            usage_date: day("2025-03-02"),
            duration_minutes: 0,
            daily_limit_minutes: 60,
            app_name: package_name.to_string(),
        })
        .expect("seed tracked pair");
}

/// Serves canned minutes per package; packages listed in `failing` error.
#[derive(Default)]
pub struct FakeProvider {
    minutes: HashMap<String, u64>,
    failing: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with(mut self, package_name: &str, minutes: u64) -> Self {
        self.minutes.insert(package_name.to_string(), minutes);
        self
    }

    pub fn failing(mut self, package_name: &str) -> Self {
        self.failing.push(package_name.to_string());
        self
    }
}

impl UsageProvider for FakeProvider {
    fn foreground_millis(
        &self,
        package_name: &str,
        _start_ms: i64,
        _end_ms: i64,
    ) -> Result<u64, ProviderError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(package_name.to_string());
        if self.failing.iter().any(|failing| failing == package_name) {
            return Err(ProviderError::Query("service died".to_string()));
        }
        Ok(self.minutes.get(package_name).copied().unwrap_or(0) * 60_000)
    }
}

pub fn data_source(provider: FakeProvider, granted: bool) -> UsageDataSource {
    UsageDataSource::new(Some(Arc::new(provider)), Arc::new(StaticAccess(granted)))
}

/// Labels every package after its last segment; panics on `panic_on`.
pub struct FakeLabels {
    pub panic_on: Option<String>,
}

impl AppLabels for FakeLabels {
    fn label(&self, package_name: &str) -> Result<String, LabelError> {
        if self.panic_on.as_deref() == Some(package_name) {
            panic!("label lookup exploded for {package_name}");
        }
        match package_name.rsplit('.').next() {
            Some("unknown") => Err(LabelError::NotFound(package_name.to_string())),
            Some(last) => Ok(last.to_uppercase()),
            None => Err(LabelError::NotFound(package_name.to_string())),
        }
    }
}

pub fn labels() -> Arc<dyn AppLabels> {
    Arc::new(FakeLabels { panic_on: None })
}
