//! Completed, immutable ledger snapshots.
//!
//! `fetch_snapshot` is the only place that talks to a [`LedgerSource`] on behalf of the
//! analytics: it pages exhaustively, retries transient failures with bounded
//! exponential backoff, and hands back either a whole snapshot or an error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use salesboard_core::{LedgerRow, SnapshotId};

use crate::source::{LedgerSource, RowFilter, SourceError};

/// Paging and retry settings for snapshot fetches.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    pub page_size: u64,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_retries: 3,
            base_backoff: Duration::from_millis(250),
        }
    }
}

/// Ledger rows as fetched at one point in time.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    id: SnapshotId,
    fetched_at: DateTime<Utc>,
    filter: RowFilter,
    rows: Arc<[LedgerRow]>,
    total_in_source: u64,
}

/// Serializable description of a snapshot (no rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub id: SnapshotId,
    pub fetched_at: DateTime<Utc>,
    pub filter: RowFilter,
    pub row_count: usize,
    pub total_in_source: u64,
    pub complete: bool,
}

impl LedgerSnapshot {
    pub fn new(filter: RowFilter, rows: Vec<LedgerRow>, total_in_source: u64) -> Self {
        Self {
            id: SnapshotId::new(),
            fetched_at: Utc::now(),
            filter,
            rows: rows.into(),
            total_in_source,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn filter(&self) -> RowFilter {
        self.filter
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_in_source(&self) -> u64 {
        self.total_in_source
    }

    /// Whether every row the source reported was actually fetched.
    pub fn is_complete(&self) -> bool {
        self.rows.len() as u64 == self.total_in_source
    }

    pub fn meta(&self) -> SnapshotMeta {
        SnapshotMeta {
            id: self.id,
            fetched_at: self.fetched_at,
            filter: self.filter,
            row_count: self.rows.len(),
            total_in_source: self.total_in_source,
            complete: self.is_complete(),
        }
    }
}

/// Fetch every row matching `filter` into a snapshot.
///
/// Pages of `page_size` are requested until the source returns a short (or empty)
/// page. A request that still fails after `max_retries` aborts the whole fetch; no
/// partial snapshot is ever returned.
pub async fn fetch_snapshot<S>(
    source: &S,
    filter: RowFilter,
    cfg: &PagingConfig,
) -> Result<LedgerSnapshot, SourceError>
where
    S: LedgerSource + ?Sized,
{
    let started = Instant::now();
    let page_size = cfg.page_size.max(1);

    let total = with_retry(cfg, "count", || source.count(filter)).await?;
    info!(source = source.name(), ?filter, total, page_size, "starting paginated ledger fetch");

    let mut rows: Vec<LedgerRow> = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut offset: u64 = 0;

    loop {
        let page = with_retry(cfg, "fetch_page", || source.fetch_page(filter, offset, page_size)).await?;
        let fetched = page.len() as u64;
        rows.extend(page);

        debug!(
            source = source.name(),
            page = offset / page_size + 1,
            fetched,
            total_so_far = rows.len(),
            "fetched ledger page"
        );

        if fetched < page_size {
            break;
        }
        offset += fetched;
    }

    let snapshot = LedgerSnapshot::new(filter, rows, total);

    if snapshot.is_complete() {
        info!(
            source = source.name(),
            snapshot = %snapshot.id(),
            rows = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "completed paginated ledger fetch"
        );
    } else {
        warn!(
            source = source.name(),
            snapshot = %snapshot.id(),
            rows = snapshot.len(),
            total,
            "ledger fetch returned a different row count than the source reported"
        );
    }

    Ok(snapshot)
}

async fn with_retry<T, F, Fut>(cfg: &PagingConfig, operation: &'static str, mut f: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut failures: u32 = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && failures < cfg.max_retries => {
                failures += 1;
                let delay = backoff(cfg.base_backoff, failures);
                warn!(
                    operation,
                    attempt = failures,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "ledger source request failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(operation, attempts = failures + 1, error = %e, "ledger source request failed");
                return Err(e);
            }
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // Exponential backoff: base * 2^(attempt-1), capped.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}
