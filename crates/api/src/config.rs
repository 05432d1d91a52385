//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use salesboard_analytics::{AbcThresholds, SafetyMultipliers};
use salesboard_infra::PagingConfig;

/// Where ledger rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Empty in-memory ledger (dev/test).
    Memory,
    Csv { path: PathBuf },
    Postgres { database_url: String, table: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub source: SourceKind,
    pub paging: PagingConfig,
    pub thresholds: AbcThresholds,
    pub multipliers: SafetyMultipliers,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or(get("BIND_ADDR"), "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let source = match get("LEDGER_SOURCE").as_deref().unwrap_or("memory") {
            "memory" => SourceKind::Memory,
            "csv" => SourceKind::Csv {
                path: get("LEDGER_CSV")
                    .map(PathBuf::from)
                    .ok_or_else(|| anyhow!("LEDGER_CSV must be set when LEDGER_SOURCE=csv"))?,
            },
            "postgres" => SourceKind::Postgres {
                database_url: get("DATABASE_URL")
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set when LEDGER_SOURCE=postgres"))?,
                table: get("LEDGER_TABLE")
                    .unwrap_or_else(|| salesboard_infra::source::postgres::DEFAULT_LEDGER_TABLE.to_string()),
            },
            other => bail!("LEDGER_SOURCE must be one of: memory, csv, postgres (got {other:?})"),
        };

        let defaults = PagingConfig::default();
        let page_size: u64 = parse_or(get("PAGE_SIZE"), "PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            bail!("PAGE_SIZE must be greater than zero");
        }
        let paging = PagingConfig {
            page_size,
            max_retries: parse_or(get("FETCH_MAX_RETRIES"), "FETCH_MAX_RETRIES", defaults.max_retries)?,
            base_backoff: Duration::from_millis(parse_or(
                get("FETCH_BACKOFF_MS"),
                "FETCH_BACKOFF_MS",
                defaults.base_backoff.as_millis() as u64,
            )?),
        };

        let default_thresholds = AbcThresholds::default();
        let thresholds = AbcThresholds::new(
            parse_or(get("ABC_THRESHOLD_A"), "ABC_THRESHOLD_A", default_thresholds.a_upper())?,
            parse_or(get("ABC_THRESHOLD_B"), "ABC_THRESHOLD_B", default_thresholds.b_upper())?,
        )?;

        let default_multipliers = SafetyMultipliers::default();
        let multipliers = SafetyMultipliers::new(
            parse_or(get("SAFETY_LOW"), "SAFETY_LOW", default_multipliers.low())?,
            parse_or(get("SAFETY_MEDIUM"), "SAFETY_MEDIUM", default_multipliers.medium())?,
            parse_or(get("SAFETY_CRITICAL"), "SAFETY_CRITICAL", default_multipliers.critical())?,
        )?;

        Ok(Self {
            bind_addr,
            source,
            paging,
            thresholds,
            multipliers,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v.parse::<T>().with_context(|| format!("invalid {key}: {v:?}")),
        None => Ok(default),
    }
}
