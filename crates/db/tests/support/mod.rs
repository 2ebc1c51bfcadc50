#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::TempDir;
use tracker_core::{Goal, UsageUpsert, parse_day};
use tracker_db::{Db, UsageStore};

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub struct TestStore {
    pub _dir: TempDir,
    pub store: UsageStore,
}

pub fn setup_store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = UsageStore::open(dir.path().join("store.sqlite")).expect("open store");
    TestStore { _dir: dir, store }
}

pub fn setup_goal(db: &Db, limit: u32) -> Goal {
    db.create_goal("Less scrolling", "", Some(limit))
        .expect("create goal")
}

pub fn day(value: &str) -> NaiveDate {
    parse_day(value).expect("date")
}

pub fn make_upsert(goal_id: i64, package_name: &str, date: &str, minutes: u32) -> UsageUpsert {
    UsageUpsert {
        goal_id,
        package_name: package_name.to_string(),
        usage_date: day(date),
        duration_minutes: minutes,
        daily_limit_minutes: 60,
        app_name: package_name.rsplit('.').next().unwrap_or(package_name).to_string(),
    }
}
