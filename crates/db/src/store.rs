use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tracker_core::{TrackedPair, UsageRecord, UsageUpsert};

use crate::Db;
use crate::error::Result;

/// Shared handle to the usage database.
///
/// Cloning is cheap. Every operation opens its own connection, so the handle
/// can be moved into worker threads. Writes made through the handle bump a
/// revision counter that [`LiveQuery`] subscribers wait on.
#[derive(Clone)]
pub struct UsageStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    db_path: PathBuf,
    changes: watch::Sender<u64>,
}

impl UsageStore {
    /// Opens the database at `db_path`, applying migrations.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let mut db = Db::open(&db_path)?;
        db.migrate()?;
        let (changes, _) = watch::channel(0u64);
        Ok(Self {
            inner: Arc::new(StoreInner { db_path, changes }),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.inner.db_path
    }

    pub fn connect(&self) -> Result<Db> {
        Db::open(&self.inner.db_path)
    }

    /// Wakes live queries. Callers writing through [`UsageStore::connect`]
    /// must call this once their batch is done.
    pub fn notify_changed(&self) {
        self.inner
            .changes
            .send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub fn revision(&self) -> u64 {
        *self.inner.changes.borrow()
    }

    pub fn upsert(&self, entry: &UsageUpsert) -> Result<UsageRecord> {
        let record = self.connect()?.upsert_usage(entry)?;
        self.notify_changed();
        Ok(record)
    }

    pub fn find(
        &self,
        goal_id: i64,
        package_name: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageRecord>> {
        self.connect()?.find_usage(goal_id, package_name, date)
    }

    pub fn sum_for_date(&self, package_name: &str, date: NaiveDate) -> Result<Option<u32>> {
        self.connect()?.total_usage_for_date(package_name, date)
    }

    pub fn average_in_range(
        &self,
        goal_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<f64>> {
        self.connect()?.average_usage_in_range(goal_id, start, end)
    }

    pub fn last_compliant_date(&self, goal_id: i64) -> Result<Option<NaiveDate>> {
        self.connect()?.last_compliant_date(goal_id)
    }

    pub fn history_for_package(
        &self,
        goal_id: i64,
        package_name: &str,
    ) -> Result<Vec<UsageRecord>> {
        self.connect()?.usage_history_for_package(goal_id, package_name)
    }

    /// All records of a goal, newest day first.
    pub fn history_for(&self, goal_id: i64) -> LiveQuery<Vec<UsageRecord>> {
        self.live(move |db| db.usage_history(goal_id))
    }

    /// Records of a goal between `start` and `end` inclusive, oldest first.
    pub fn range_for(
        &self,
        goal_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LiveQuery<Vec<UsageRecord>> {
        self.live(move |db| db.usage_in_range(goal_id, start, end))
    }

    pub fn live<T, F>(&self, query: F) -> LiveQuery<T>
    where
        F: Fn(&Db) -> Result<T> + Send + Sync + 'static,
    {
        LiveQuery {
            store: self.clone(),
            changes: self.inner.changes.subscribe(),
            query: Arc::new(query),
        }
    }

    pub fn registry(&self) -> TrackingRegistry<'_> {
        TrackingRegistry { store: self }
    }
}

/// Which (goal, package) pairs are being tracked. Reads and writes the
/// `is_tracked` flag of the underlying usage records.
pub struct TrackingRegistry<'a> {
    store: &'a UsageStore,
}

impl TrackingRegistry<'_> {
    pub fn tracked_pairs(&self) -> Result<Vec<TrackedPair>> {
        self.store.connect()?.tracked_pairs()
    }

    pub fn is_tracked(&self, goal_id: i64, package_name: &str) -> Result<bool> {
        self.store.connect()?.is_tracked(goal_id, package_name)
    }

    pub fn set_tracked(&self, package_name: &str, goal_id: i64, enabled: bool) -> Result<usize> {
        let updated = self
            .store
            .connect()?
            .set_tracked(package_name, goal_id, enabled)?;
        if updated > 0 {
            self.store.notify_changed();
        }
        Ok(updated)
    }
}

/// A query re-run whenever the store reports a write.
pub struct LiveQuery<T> {
    store: UsageStore,
    changes: watch::Receiver<u64>,
    query: Arc<dyn Fn(&Db) -> Result<T> + Send + Sync>,
}

impl<T> LiveQuery<T> {
    /// Runs the query now and marks the current revision as seen.
    pub fn current(&mut self) -> Result<T> {
        self.changes.borrow_and_update();
        let db = self.store.connect()?;
        (self.query)(&db)
    }

    pub fn has_changed(&self) -> bool {
        self.changes.has_changed().unwrap_or(false)
    }

    /// Waits for the next write through the store, then re-runs the query.
    pub async fn changed(&mut self) -> Result<T> {
        // The sender lives in `self.store`, so this only returns on a change.
        let _ = self.changes.changed().await;
        self.current()
    }

    /// A fresh subscription over the same query.
    pub fn restart(&self) -> LiveQuery<T> {
        LiveQuery {
            store: self.store.clone(),
            changes: self.store.inner.changes.subscribe(),
            query: Arc::clone(&self.query),
        }
    }
}
