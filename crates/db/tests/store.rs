mod support;

use std::thread;
use std::time::Duration;

use support::{day, make_upsert, setup_goal, setup_store};

#[test]
fn concurrent_upserts_to_same_key_leave_one_row() {
    let test_store = setup_store();
    let store = &test_store.store;
    let goal = setup_goal(&store.connect().expect("connect"), 60);

    let handles = (0..8u32)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .upsert(&make_upsert(goal.id, "com.example.feed", "2025-03-03", n))
                    .expect("upsert")
            })
        })
        .collect::<Vec<_>>();
    let mut written = handles
        .into_iter()
        .map(|handle| handle.join().expect("join").duration_minutes)
        .collect::<Vec<_>>();
    written.sort_unstable();
    assert_eq!(written, (0..8).collect::<Vec<_>>());

    let db = store.connect().expect("connect");
    assert_eq!(db.count_usage_records(goal.id).expect("count"), 1);
    let record = store
        .find(goal.id, "com.example.feed", day("2025-03-03"))
        .expect("find")
        .expect("record");
    assert!(record.duration_minutes < 8);
}

#[test]
fn writes_bump_revision_only_when_something_changed() {
    let test_store = setup_store();
    let store = &test_store.store;
    let goal = setup_goal(&store.connect().expect("connect"), 60);
    let start = store.revision();

    store
        .upsert(&make_upsert(goal.id, "com.example.feed", "2025-03-03", 5))
        .expect("upsert");
    assert_eq!(store.revision(), start + 1);

    store
        .registry()
        .set_tracked("com.example.other", goal.id, false)
        .expect("noop");
    assert_eq!(store.revision(), start + 1);

    store
        .registry()
        .set_tracked("com.example.feed", goal.id, false)
        .expect("disable");
    assert_eq!(store.revision(), start + 2);
    assert!(store.registry().tracked_pairs().expect("pairs").is_empty());
}

#[tokio::test]
async fn history_query_pushes_new_rows() {
    let test_store = setup_store();
    let store = test_store.store.clone();
    let goal = setup_goal(&store.connect().expect("connect"), 60);

    let mut history = store.history_for(goal.id);
    assert!(history.current().expect("initial").is_empty());
    assert!(!history.has_changed());

    let writer = store.clone();
    let goal_id = goal.id;
    tokio::task::spawn_blocking(move || {
        writer
            .upsert(&make_upsert(goal_id, "com.example.feed", "2025-03-03", 7))
            .expect("upsert");
    })
    .await
    .expect("writer");

    let rows = tokio::time::timeout(Duration::from_secs(5), history.changed())
        .await
        .expect("change arrives")
        .expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].duration_minutes, 7);
}

#[test]
fn range_query_restarts_with_fresh_subscription() {
    let test_store = setup_store();
    let store = &test_store.store;
    let goal = setup_goal(&store.connect().expect("connect"), 60);
    let mut range = store.range_for(goal.id, day("2025-03-01"), day("2025-03-31"));
    assert!(range.current().expect("initial").is_empty());

    store
        .upsert(&make_upsert(goal.id, "com.example.feed", "2025-03-02", 9))
        .expect("upsert");
    store
        .upsert(&make_upsert(goal.id, "com.example.feed", "2025-04-02", 9))
        .expect("upsert outside range");
    assert!(range.has_changed());

    let mut restarted = range.restart();
    assert!(!restarted.has_changed());
    assert_eq!(restarted.current().expect("restarted").len(), 1);
    assert_eq!(range.current().expect("original").len(), 1);
    assert!(!range.has_changed());
}
