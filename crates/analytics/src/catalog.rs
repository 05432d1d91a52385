//! Product catalog helpers used to scope forecasts.

use std::collections::HashSet;

use salesboard_core::LedgerRow;

/// Distinct, non-empty product labels in first-seen order.
pub fn product_labels(rows: &[LedgerRow]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    rows.iter()
        .map(|r| r.product())
        .filter(|p| !p.trim().is_empty())
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect()
}

/// Case-insensitive substring search; an empty query keeps everything.
pub fn search_products<'a>(labels: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    labels
        .iter()
        .map(String::as_str)
        .filter(|label| needle.is_empty() || label.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(product: &str) -> LedgerRow {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        LedgerRow::new(dec!(1), date, "c", product, "x")
    }

    #[test]
    fn labels_are_distinct_and_skip_blanks() {
        let rows = vec![row("Porta Lisa"), row(""), row("Janela"), row("Porta Lisa"), row("  ")];
        assert_eq!(product_labels(&rows), vec!["Porta Lisa", "Janela"]);
    }

    #[test]
    fn search_ignores_case() {
        let labels = vec!["Porta Lisa".to_string(), "Janela".to_string(), "PORTAL".to_string()];
        assert_eq!(search_products(&labels, "port"), vec!["Porta Lisa", "PORTAL"]);
        assert_eq!(search_products(&labels, ""), vec!["Porta Lisa", "Janela", "PORTAL"]);
        assert!(search_products(&labels, "telha").is_empty());
    }
}
