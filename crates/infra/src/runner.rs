//! Executes analytics jobs against snapshots, with logging.

use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use salesboard_analytics::{AbcClassifier, AbcThresholds, AnalyticsJob, DimensionGroup};
use salesboard_core::{AnalyticsError, AnalyticsResult, Dimension};

use crate::snapshot::LedgerSnapshot;

/// Run one job over a snapshot's rows.
///
/// The job is pure; this wrapper only adds timing and outcome logs.
pub fn run_job<J: AnalyticsJob>(snapshot: &LedgerSnapshot, job: &J) -> AnalyticsResult<J::Output> {
    let started = Instant::now();

    match job.run(snapshot.rows()) {
        Ok(out) => {
            info!(
                job = job.name(),
                snapshot = %snapshot.id(),
                rows = snapshot.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "analytics job completed"
            );
            Ok(out)
        }
        Err(e) => {
            warn!(job = job.name(), snapshot = %snapshot.id(), error = %e, "analytics job failed");
            Err(e)
        }
    }
}

/// Classify every dimension of one snapshot, one scoped thread per dimension.
///
/// All threads read the same immutable rows; results come back in `Dimension::ALL`
/// order.
pub fn classify_all(
    snapshot: &LedgerSnapshot,
    thresholds: AbcThresholds,
) -> AnalyticsResult<Vec<(Dimension, Vec<DimensionGroup>)>> {
    thread::scope(|scope| {
        let handles: Vec<_> = Dimension::ALL
            .into_iter()
            .map(|dimension| {
                let job = AbcClassifier::new(dimension).with_thresholds(thresholds);
                (dimension, scope.spawn(move || run_job(snapshot, &job)))
            })
            .collect();

        handles
            .into_iter()
            .map(|(dimension, handle)| -> AnalyticsResult<(Dimension, Vec<DimensionGroup>)> {
                Ok((dimension, joined(dimension, handle.join())?))
            })
            .collect()
    })
}

/// A panicked worker is an engine fault, never a problem with the request.
fn joined<T>(dimension: Dimension, outcome: thread::Result<AnalyticsResult<T>>) -> AnalyticsResult<T> {
    outcome.map_err(|_| {
        warn!(%dimension, "classification thread panicked");
        AnalyticsError::internal(format!("{dimension} classification panicked"))
    })?
}
