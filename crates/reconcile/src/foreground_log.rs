use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::source::{ProviderError, UsageProvider};

/// One foreground session as written by the platform collector.
#[derive(Debug, Deserialize)]
struct ForegroundSession {
    package: String,
    start_ms: i64,
    end_ms: i64,
}

/// Reads foreground sessions from a JSONL file, one session per line.
#[derive(Debug, Clone)]
pub struct ForegroundLogProvider {
    path: PathBuf,
}

impl ForegroundLogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageProvider for ForegroundLogProvider {
    fn foreground_millis(
        &self,
        package_name: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<u64, ProviderError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ProviderError::Unavailable);
            }
            Err(err) => return Err(err.into()),
        };
        foreground_millis_from_reader(BufReader::new(file), package_name, start_ms, end_ms)
    }
}

/// Sums the part of every session of `package_name` that falls inside the
/// window. Lines that are not sessions are skipped.
pub fn foreground_millis_from_reader<R: BufRead>(
    mut reader: R,
    package_name: &str,
    start_ms: i64,
    end_ms: i64,
) -> Result<u64, ProviderError> {
    let mut total = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(session) = serde_json::from_str::<ForegroundSession>(line) else {
            continue;
        };
        if session.package != package_name {
            continue;
        }
        total = total.saturating_add(overlap_millis(
            session.start_ms,
            session.end_ms,
            start_ms,
            end_ms,
        ));
    }
    Ok(total)
}

fn overlap_millis(start: i64, end: i64, window_start: i64, window_end: i64) -> u64 {
    let start = start.max(window_start);
    let end = end.min(window_end);
    if end > start { (end - start) as u64 } else { 0 }
}
