//! Classification dimensions of the ledger.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::ledger::LedgerRow;

/// A label of the ledger rows that ABC classification can group by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Client,
    Product,
    City,
    Finish,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Client,
        Dimension::Product,
        Dimension::City,
        Dimension::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Client => "client",
            Dimension::Product => "product",
            Dimension::City => "city",
            Dimension::Finish => "finish",
        }
    }

    /// Extract this dimension's label from a row.
    ///
    /// `None` means the row does not participate in this dimension's grouping.
    pub fn label_of<'a>(&self, row: &'a LedgerRow) -> Option<&'a str> {
        match self {
            Dimension::Client => Some(row.client()),
            Dimension::Product => Some(row.product()),
            Dimension::City => Some(row.city()),
            Dimension::Finish => row.finish(),
        }
    }
}

impl core::fmt::Display for Dimension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AnalyticsError;

    /// Accepts the English names plus the ledger's own column vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "cliente" => Ok(Dimension::Client),
            "product" | "sku" | "descricao" => Ok(Dimension::Product),
            "city" | "cidade" => Ok(Dimension::City),
            "finish" | "acabamento" => Ok(Dimension::Finish),
            other => Err(AnalyticsError::invalid_dimension(format!(
                "{other} (expected one of: client, product, city, finish)"
            ))),
        }
    }
}
