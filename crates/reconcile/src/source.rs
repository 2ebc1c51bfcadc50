use std::io;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use log::{debug, error, warn};
use tracker_core::{local_day_end, local_day_start};

use crate::access::UsageAccess;

const MILLIS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("usage provider unavailable")]
    Unavailable,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("usage query failed: {0}")]
    Query(String),
}

/// OS usage-statistics boundary: total foreground milliseconds of a package
/// within `[start_ms, end_ms]` (epoch milliseconds).
pub trait UsageProvider: Send + Sync {
    fn foreground_millis(
        &self,
        package_name: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<u64, ProviderError>;
}

/// Permission-gated reads of foreground time, in whole minutes.
///
/// Queries never fail: a missing permission, a missing provider and a failed
/// provider call all read as zero and are only logged. Callers therefore
/// cannot trust a zero without checking [`UsageDataSource::has_permission`].
#[derive(Clone)]
pub struct UsageDataSource {
    provider: Option<Arc<dyn UsageProvider>>,
    access: Arc<dyn UsageAccess>,
}

impl UsageDataSource {
    pub fn new(provider: Option<Arc<dyn UsageProvider>>, access: Arc<dyn UsageAccess>) -> Self {
        Self { provider, access }
    }

    pub fn has_permission(&self) -> bool {
        self.access.is_granted()
    }

    pub fn query_usage_minutes(
        &self,
        package_name: &str,
        day_start: DateTime<Local>,
        day_end: DateTime<Local>,
    ) -> u32 {
        if !self.has_permission() {
            debug!("usage access not granted; {} reads as 0 minutes", package_name);
            return 0;
        }
        let Some(provider) = self.provider.as_ref() else {
            warn!("no usage provider available; {} reads as 0 minutes", package_name);
            return 0;
        };
        if day_end < day_start {
            warn!(
                "empty usage window for {}: {} is before {}",
                package_name, day_end, day_start
            );
            return 0;
        }
        match provider.foreground_millis(
            package_name,
            day_start.timestamp_millis(),
            day_end.timestamp_millis(),
        ) {
            Ok(millis) => millis_to_minutes(millis),
            Err(err) => {
                error!("error getting usage stats for {}: {}", package_name, err);
                0
            }
        }
    }

    /// Usage from local midnight until now.
    pub fn query_today_usage_minutes(&self, package_name: &str) -> u32 {
        self.query_today_usage_minutes_at(package_name, Local::now())
    }

    pub fn query_today_usage_minutes_at(&self, package_name: &str, now: DateTime<Local>) -> u32 {
        let start = local_day_start(now.date_naive());
        self.query_usage_minutes(package_name, start, now)
    }

    /// Usage over the whole local calendar day.
    pub fn query_day_usage_minutes(&self, package_name: &str, date: NaiveDate) -> u32 {
        self.query_usage_minutes(package_name, local_day_start(date), local_day_end(date))
    }
}

/// Truncates to whole minutes.
pub fn millis_to_minutes(millis: u64) -> u32 {
    (millis / MILLIS_PER_MINUTE).min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::access::StaticAccess;

    #[derive(Default)]
    struct RecordingProvider {
        millis: u64,
        fail: bool,
        windows: Mutex<Vec<(i64, i64)>>,
    }

    impl UsageProvider for RecordingProvider {
        fn foreground_millis(
            &self,
            _package_name: &str,
            start_ms: i64,
            end_ms: i64,
        ) -> Result<u64, ProviderError> {
            self.windows
                .lock()
                .expect("windows lock")
                .push((start_ms, end_ms));
            if self.fail {
                return Err(ProviderError::Query("service died".to_string()));
            }
            Ok(self.millis)
        }
    }

    fn source(provider: Arc<RecordingProvider>, granted: bool) -> UsageDataSource {
        UsageDataSource::new(Some(provider), Arc::new(StaticAccess(granted)))
    }

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 3, 12, 0, 0)
            .single()
            .expect("local noon")
    }

    #[test]
    fn minutes_are_truncated() {
        assert_eq!(millis_to_minutes(0), 0);
        assert_eq!(millis_to_minutes(59_999), 0);
        assert_eq!(millis_to_minutes(60_000), 1);
        assert_eq!(millis_to_minutes(179_999), 2);
    }

    #[test]
    fn no_permission_reads_zero_without_querying() {
        let provider = Arc::new(RecordingProvider {
            millis: 600_000,
            ..Default::default()
        });
        let source = source(provider.clone(), false);
        assert!(!source.has_permission());
        assert_eq!(source.query_today_usage_minutes_at("com.example.feed", noon()), 0);
        assert!(provider.windows.lock().expect("windows lock").is_empty());
    }

    #[test]
    fn provider_failure_reads_zero() {
        let provider = Arc::new(RecordingProvider {
            millis: 600_000,
            fail: true,
            ..Default::default()
        });
        let source = source(provider, true);
        assert_eq!(source.query_today_usage_minutes_at("com.example.feed", noon()), 0);
    }

    #[test]
    fn missing_provider_reads_zero() {
        let source = UsageDataSource::new(None, Arc::new(StaticAccess(true)));
        assert!(source.has_permission());
        assert_eq!(source.query_today_usage_minutes("com.example.feed"), 0);
    }

    #[test]
    fn today_window_starts_at_local_midnight() {
        let provider = Arc::new(RecordingProvider {
            millis: 125_000,
            ..Default::default()
        });
        let source = source(provider.clone(), true);
        let now = noon();
        assert_eq!(source.query_today_usage_minutes_at("com.example.feed", now), 2);
        let windows = provider.windows.lock().expect("windows lock");
        let midnight = local_day_start(now.date_naive());
        assert_eq!(
            windows.as_slice(),
            &[(midnight.timestamp_millis(), now.timestamp_millis())]
        );
    }

    #[test]
    fn full_day_window_ends_before_midnight() {
        let provider = Arc::new(RecordingProvider::default());
        let source = source(provider.clone(), true);
        let date = noon().date_naive();
        source.query_day_usage_minutes("com.example.feed", date);
        let windows = provider.windows.lock().expect("windows lock");
        let (start, end) = windows[0];
        assert_eq!(end - start, 86_399_000);
    }
}
