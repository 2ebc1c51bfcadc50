use std::time::Duration;

use log::{error, info, warn};
use reconcile::{JobOutcome, ReconciliationJob};
use tokio::task::JoinHandle;

const RETRY_BASE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    pub run_timeout: Duration,
    pub max_backoff: Duration,
}

/// Delay before the next run. Failures back off exponentially from
/// `RETRY_BASE` up to `max_backoff`; anything else resets the count.
pub fn next_delay(outcome: &JobOutcome, failures: &mut u32, schedule: &Schedule) -> Duration {
    if !outcome.should_retry() {
        *failures = 0;
        return schedule.interval;
    }
    let exponent = (*failures).min(16);
    *failures = failures.saturating_add(1);
    RETRY_BASE
        .saturating_mul(1u32 << exponent)
        .min(schedule.max_backoff)
}

/// Runs the job until Ctrl+C. Runs never overlap: a run that outlives its
/// timeout counts as failed, and the next run waits for it to finish.
pub async fn run_periodic(job: ReconciliationJob, schedule: Schedule) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut failures = 0u32;
    let mut straggler: Option<JoinHandle<JobOutcome>> = None;

    loop {
        if let Some(previous) = straggler.take() {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = previous => {}
            }
        }

        let run_job = job.clone();
        let mut handle = tokio::task::spawn_blocking(move || run_job.run());
        let outcome = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested; finishing in-flight run");
                let _ = handle.await;
                break;
            }
            result = tokio::time::timeout(schedule.run_timeout, &mut handle) => match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    error!("reconciliation task aborted: {}", err);
                    JobOutcome::Failed { message: err.to_string() }
                }
                Err(_) => {
                    warn!(
                        "reconciliation exceeded {:?}; waiting for it before the next run",
                        schedule.run_timeout
                    );
                    straggler = Some(handle);
                    JobOutcome::Failed { message: "timed out".to_string() }
                }
            },
        };

        let delay = next_delay(&outcome, &mut failures, &schedule);
        if outcome.should_retry() {
            warn!("run {} ({}); retrying in {:?}", outcome.label(), failures, delay);
        } else {
            info!("run {}; next in {:?}", outcome.label(), delay);
        }

        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    info!("scheduler stopped");
}
