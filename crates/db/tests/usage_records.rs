mod support;

use rusqlite::Connection;
use support::{day, make_upsert, setup_db, setup_goal};

#[test]
fn upsert_twice_keeps_one_row_with_latest_values() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);

    let first = db
        .upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-03", 12))
        .expect("first upsert");
    let mut second_entry = make_upsert(goal.id, "com.example.feed", "2025-03-03", 34);
    second_entry.app_name = "Feed".to_string();
    let second = db.upsert_usage(&second_entry).expect("second upsert");

    assert_eq!(first.id, second.id);
    assert_eq!(second.duration_minutes, 34);
    assert_eq!(second.app_name, "Feed");
    assert!(second.is_tracked);

    let conn = Connection::open(&test_db.path).expect("open conn");
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM usage_record WHERE goal_id = ?1",
            [goal.id],
            |row| row.get(0),
        )
        .expect("count");
    assert_eq!(count, 1);
}

#[test]
fn upsert_with_identical_arguments_is_idempotent() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    let entry = make_upsert(goal.id, "com.example.feed", "2025-03-03", 12);
    db.upsert_usage(&entry).expect("first upsert");
    db.upsert_usage(&entry).expect("second upsert");

    assert_eq!(db.count_usage_records(goal.id).expect("count"), 1);
    let record = db
        .find_usage(goal.id, "com.example.feed", day("2025-03-03"))
        .expect("find")
        .expect("record");
    assert_eq!(record.duration_minutes, 12);
}

#[test]
fn upsert_keeps_stored_limit_on_update() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    let mut entry = make_upsert(goal.id, "com.example.feed", "2025-03-03", 10);
    entry.daily_limit_minutes = 45;
    db.upsert_usage(&entry).expect("insert");
    entry.daily_limit_minutes = 90;
    entry.duration_minutes = 50;
    let record = db.upsert_usage(&entry).expect("update");
    assert_eq!(record.daily_limit_minutes, 45);
    assert!(!record.is_compliant());
}

#[test]
fn upsert_for_missing_goal_fails() {
    let test_db = setup_db();
    let result = test_db
        .db
        .upsert_usage(&make_upsert(999, "com.example.feed", "2025-03-03", 10));
    assert!(result.is_err());
}

#[test]
fn find_returns_none_for_other_days() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-03", 12))
        .expect("upsert");
    let missing = db
        .find_usage(goal.id, "com.example.feed", day("2025-03-04"))
        .expect("find");
    assert!(missing.is_none());
}

#[test]
fn history_is_newest_first_and_range_is_oldest_first() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    for (date, minutes) in [
        ("2025-03-02", 20),
        ("2025-03-04", 40),
        ("2025-03-01", 10),
        ("2025-03-03", 30),
    ] {
        db.upsert_usage(&make_upsert(goal.id, "com.example.feed", date, minutes))
            .expect("upsert");
    }

    let history = db.usage_history(goal.id).expect("history");
    let dates = history
        .iter()
        .map(|record| record.usage_date)
        .collect::<Vec<_>>();
    assert_eq!(
        dates,
        vec![day("2025-03-04"), day("2025-03-03"), day("2025-03-02"), day("2025-03-01")]
    );

    let range = db
        .usage_in_range(goal.id, day("2025-03-02"), day("2025-03-03"))
        .expect("range");
    let minutes = range
        .iter()
        .map(|record| record.duration_minutes)
        .collect::<Vec<_>>();
    assert_eq!(minutes, vec![20, 30]);
}

#[test]
fn sum_for_date_spans_goals_and_distinguishes_no_data() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal_a = setup_goal(db, 60);
    let goal_b = setup_goal(db, 30);
    db.upsert_usage(&make_upsert(goal_a.id, "com.example.feed", "2025-03-03", 12))
        .expect("upsert a");
    db.upsert_usage(&make_upsert(goal_b.id, "com.example.feed", "2025-03-03", 8))
        .expect("upsert b");

    let total = db
        .total_usage_for_date("com.example.feed", day("2025-03-03"))
        .expect("sum");
    assert_eq!(total, Some(20));
    let none = db
        .total_usage_for_date("com.example.feed", day("2025-03-04"))
        .expect("sum");
    assert_eq!(none, None);
}

#[test]
fn average_in_empty_range_is_none() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-03", 12))
        .expect("upsert");

    let empty = db
        .average_usage_in_range(goal.id, day("2025-04-01"), day("2025-04-30"))
        .expect("average");
    assert_eq!(empty, None);

    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-04", 0))
        .expect("upsert zero");
    let average = db
        .average_usage_in_range(goal.id, day("2025-03-01"), day("2025-03-31"))
        .expect("average");
    assert_eq!(average, Some(6.0));
}

#[test]
fn last_compliant_date_skips_days_over_limit() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-01", 30))
        .expect("upsert");
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-02", 60))
        .expect("upsert");
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-03", 61))
        .expect("upsert");

    let last = db.last_compliant_date(goal.id).expect("last compliant");
    assert_eq!(last, Some(day("2025-03-02")));

    let other = setup_goal(db, 60);
    assert_eq!(db.last_compliant_date(other.id).expect("none"), None);
}

#[test]
fn package_history_only_returns_that_package() {
    let test_db = setup_db();
    let db = &test_db.db;
    let goal = setup_goal(db, 60);
    db.upsert_usage(&make_upsert(goal.id, "com.example.feed", "2025-03-01", 30))
        .expect("upsert");
    db.upsert_usage(&make_upsert(goal.id, "com.example.chat", "2025-03-02", 30))
        .expect("upsert");
    let history = db
        .usage_history_for_package(goal.id, "com.example.chat")
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].package_name, "com.example.chat");
}
