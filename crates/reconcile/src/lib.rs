mod access;
mod foreground_log;
mod labels;
mod paths;
mod pipeline;
mod source;
mod types;

pub use access::{
    AccessError, ConsentHost, LegacyOpAccess, NAMED_OP_MIN_PLATFORM, NamedOpAccess, OpMode,
    StaticAccess, USAGE_STATS_OP, USAGE_STATS_OP_CODE, USAGE_STATS_PERMISSION, UsageAccess,
    select_access,
};
pub use foreground_log::{ForegroundLogProvider, foreground_millis_from_reader};
pub use labels::{AppLabels, LabelError, StaticLabels, display_name};
pub use paths::{FOREGROUND_LOG_ENV, FOREGROUND_LOG_FILE, default_foreground_log};
pub use pipeline::ReconciliationJob;
pub use source::{ProviderError, UsageDataSource, UsageProvider, millis_to_minutes};
pub use types::{JobOutcome, ReconcileError, ReconcileIssue, ReconcileStats, Result};
