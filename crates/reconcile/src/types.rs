use serde::Serialize;

/// Per-run summary of a successful reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileStats {
    pub pairs_total: usize,
    pub records_upserted: usize,
    pub pairs_skipped: usize,
    pub pairs_failed: usize,
    pub issues: Vec<ReconcileIssue>,
}

/// Non-fatal problem with one tracked pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileIssue {
    pub goal_id: i64,
    pub package_name: String,
    pub message: String,
}

/// Result of one scheduled invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Success(ReconcileStats),
    Failed { message: String },
    SkippedNoPermission,
    SkippedNothingTracked,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Only job-level failures are worth a scheduler retry; skips repeat
    /// identically until the user acts.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failed { .. } => "failed",
            Self::SkippedNoPermission => "skipped_no_permission",
            Self::SkippedNothingTracked => "skipped_nothing_tracked",
        }
    }
}

/// Errors raised while reconciling a single pair.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("db error: {0}")]
    Db(#[from] tracker_db::DbError),
    #[error("goal {0} not found")]
    GoalMissing(i64),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
