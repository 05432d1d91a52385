//! CSV export of forecast results.

use csv::WriterBuilder;
use thiserror::Error;

use salesboard_analytics::ForecastResult;

/// Download name used by the dashboard for the monthly sales export.
pub const EXPORT_FILENAME: &str = "previsao_estoque.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV buffer: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render `(month, sales)` pairs, already in chronological order.
pub fn forecast_csv(result: &ForecastResult) -> Result<String, ExportError> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(["Mês", "Vendas"])?;

    for bucket in &result.monthly_data {
        wtr.write_record([bucket.month_key.to_string(), bucket.sales_total.to_string()])?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
