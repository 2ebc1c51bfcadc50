use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use tracker_core::{TrackedPair, UsageUpsert};
use tracker_db::{Db, UsageStore};

use crate::labels::{AppLabels, display_name};
use crate::source::UsageDataSource;
use crate::types::{JobOutcome, ReconcileError, ReconcileIssue, ReconcileStats, Result};

/// Periodic job writing today's usage of every tracked pair into the store.
///
/// Safe to invoke more than once per day: every write is an upsert keyed by
/// `(goal, package, day)`.
#[derive(Clone)]
pub struct ReconciliationJob {
    store: UsageStore,
    source: UsageDataSource,
    labels: Arc<dyn AppLabels>,
    parallel: bool,
}

enum PairResult {
    Upserted,
    Skipped(ReconcileIssue),
    Failed(ReconcileIssue),
}

impl ReconciliationJob {
    pub fn new(store: UsageStore, source: UsageDataSource, labels: Arc<dyn AppLabels>) -> Self {
        Self {
            store,
            source,
            labels,
            parallel: true,
        }
    }

    /// Processes pairs one after another on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn run(&self) -> JobOutcome {
        self.run_at(Local::now())
    }

    pub fn run_at(&self, now: DateTime<Local>) -> JobOutcome {
        let started = Instant::now();
        if !self.source.has_permission() {
            info!("usage access not granted; reconciliation skipped");
            return JobOutcome::SkippedNoPermission;
        }

        let pairs = match self.store.registry().tracked_pairs() {
            Ok(pairs) => pairs,
            Err(err) => {
                error!("failed to enumerate tracked pairs: {}", err);
                return JobOutcome::Failed {
                    message: err.to_string(),
                };
            }
        };
        if pairs.is_empty() {
            debug!("nothing tracked; reconciliation skipped");
            return JobOutcome::SkippedNothingTracked;
        }

        let results = if self.parallel {
            pairs
                .par_iter()
                .map_init(|| self.store.connect(), |conn, pair| self.attempt(conn, pair, now))
                .collect::<Vec<_>>()
        } else {
            let mut conn = self.store.connect();
            pairs
                .iter()
                .map(|pair| self.attempt(&mut conn, pair, now))
                .collect::<Vec<_>>()
        };

        let mut stats = ReconcileStats {
            pairs_total: pairs.len(),
            ..ReconcileStats::default()
        };
        for result in results {
            match result {
                PairResult::Upserted => stats.records_upserted += 1,
                PairResult::Skipped(issue) => {
                    stats.pairs_skipped += 1;
                    stats.issues.push(issue);
                }
                PairResult::Failed(issue) => {
                    stats.pairs_failed += 1;
                    stats.issues.push(issue);
                }
            }
        }
        if stats.records_upserted > 0 {
            self.store.notify_changed();
        }
        info!(
            "reconciled {} pairs in {:.2?}: {} upserted, {} skipped, {} failed",
            stats.pairs_total,
            started.elapsed(),
            stats.records_upserted,
            stats.pairs_skipped,
            stats.pairs_failed
        );
        JobOutcome::Success(stats)
    }

    fn attempt(
        &self,
        conn: &mut tracker_db::Result<Db>,
        pair: &TrackedPair,
        now: DateTime<Local>,
    ) -> PairResult {
        let db = match conn {
            Ok(db) => db,
            Err(err) => {
                error!("no connection for {}: {}", pair.package_name, err);
                return PairResult::Failed(issue(pair, err.to_string()));
            }
        };
        match catch_unwind(AssertUnwindSafe(|| self.process_pair(db, pair, now))) {
            Ok(Ok(())) => PairResult::Upserted,
            Ok(Err(ReconcileError::GoalMissing(goal_id))) => {
                warn!(
                    "goal {} no longer exists; skipping {}",
                    goal_id, pair.package_name
                );
                PairResult::Skipped(issue(pair, format!("goal {} not found", goal_id)))
            }
            Ok(Err(err)) => {
                error!("error processing {}: {}", pair.package_name, err);
                PairResult::Failed(issue(pair, err.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("panic while processing {}: {}", pair.package_name, message);
                PairResult::Failed(issue(pair, format!("panic: {}", message)))
            }
        }
    }

    fn process_pair(&self, db: &Db, pair: &TrackedPair, now: DateTime<Local>) -> Result<()> {
        let app_name = display_name(self.labels.as_ref(), &pair.package_name);
        let minutes = self
            .source
            .query_today_usage_minutes_at(&pair.package_name, now);
        let goal = db
            .get_goal(pair.goal_id)?
            .ok_or(ReconcileError::GoalMissing(pair.goal_id))?;
        db.upsert_usage(&UsageUpsert {
            goal_id: pair.goal_id,
            package_name: pair.package_name.clone(),
            usage_date: now.date_naive(),
            duration_minutes: minutes,
            daily_limit_minutes: goal.daily_limit_minutes,
            app_name,
        })?;
        debug!(
            "{} under goal {}: {} min today",
            pair.package_name, pair.goal_id, minutes
        );
        Ok(())
    }
}

fn issue(pair: &TrackedPair, message: String) -> ReconcileIssue {
    ReconcileIssue {
        goal_id: pair.goal_id,
        package_name: pair.package_name.clone(),
        message,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
