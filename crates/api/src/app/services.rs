use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use salesboard_analytics::{AbcThresholds, Forecaster, SafetyMultipliers};
use salesboard_infra::{
    fetch_snapshot, CsvLedgerSource, InMemoryLedgerSource, LedgerSnapshot, LedgerSource,
    PagingConfig, PostgresLedgerSource, RowFilter, SourceError,
};

use crate::config::{ApiConfig, SourceKind};

/// Shared state behind every handler.
///
/// Holds the configured ledger source and the latest completed snapshot. Handlers never
/// see a snapshot that is still being fetched.
pub struct AppServices {
    source: Arc<dyn LedgerSource>,
    paging: PagingConfig,
    thresholds: AbcThresholds,
    multipliers: SafetyMultipliers,
    latest: RwLock<Option<Arc<LedgerSnapshot>>>,
}

impl AppServices {
    pub fn new(source: Arc<dyn LedgerSource>, paging: PagingConfig) -> Self {
        Self {
            source,
            paging,
            thresholds: AbcThresholds::default(),
            multipliers: SafetyMultipliers::default(),
            latest: RwLock::new(None),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AbcThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_multipliers(mut self, multipliers: SafetyMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    pub fn thresholds(&self) -> AbcThresholds {
        self.thresholds
    }

    /// Forecaster configured with this service's multipliers.
    pub fn forecaster(&self, strict: bool) -> Forecaster {
        Forecaster::new()
            .with_multipliers(self.multipliers)
            .require_match(strict)
    }

    /// Latest snapshot, fetching one on first use.
    pub async fn snapshot(&self) -> Result<Arc<LedgerSnapshot>, SourceError> {
        if let Some(snapshot) = self.latest.read().await.as_ref() {
            return Ok(snapshot.clone());
        }

        let mut slot = self.latest.write().await;
        // Another request may have filled it while we waited for the lock.
        if let Some(snapshot) = slot.as_ref() {
            return Ok(snapshot.clone());
        }

        let snapshot = Arc::new(fetch_snapshot(&self.source, RowFilter::All, &self.paging).await?);
        *slot = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Fetch a fresh snapshot and swap it in. On failure the previous snapshot stays.
    pub async fn refresh(&self) -> Result<Arc<LedgerSnapshot>, SourceError> {
        let snapshot = Arc::new(fetch_snapshot(&self.source, RowFilter::All, &self.paging).await?);
        *self.latest.write().await = Some(snapshot.clone());
        tracing::info!(snapshot = %snapshot.id(), rows = snapshot.len(), "ledger snapshot refreshed");
        Ok(snapshot)
    }
}

/// Wire the configured ledger source into [`AppServices`].
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let source: Arc<dyn LedgerSource> = match &config.source {
        SourceKind::Memory => {
            tracing::warn!("LEDGER_SOURCE=memory; serving an empty ledger");
            Arc::new(InMemoryLedgerSource::default())
        }
        SourceKind::Csv { path } => Arc::new(
            CsvLedgerSource::open(path).with_context(|| format!("failed to load {}", path.display()))?,
        ),
        SourceKind::Postgres { database_url, table } => Arc::new(
            PostgresLedgerSource::connect(database_url, table)
                .await
                .context("failed to connect to the ledger database")?,
        ),
    };

    tracing::info!(source = source.name(), page_size = config.paging.page_size, "ledger source ready");

    Ok(AppServices::new(source, config.paging.clone())
        .with_thresholds(config.thresholds)
        .with_multipliers(config.multipliers))
}
