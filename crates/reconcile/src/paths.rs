use std::path::{Path, PathBuf};

pub const FOREGROUND_LOG_ENV: &str = "USAGE_TRACKER_FOREGROUND_LOG";
pub const FOREGROUND_LOG_FILE: &str = "foreground.jsonl";

/// Session log location: `USAGE_TRACKER_FOREGROUND_LOG` when set, otherwise
/// next to the database in `data_dir`.
pub fn default_foreground_log(data_dir: &Path) -> PathBuf {
    match std::env::var_os(FOREGROUND_LOG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir.join(FOREGROUND_LOG_FILE),
    }
}
