use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesboard_core::{AnalyticsError, AnalyticsResult, Dimension, LedgerRow};

use crate::{checked_sum, percent_of};

/// Pareto tier of a dimension group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub const ALL: [AbcClass; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];
}

impl core::fmt::Display for AbcClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        };
        f.write_str(s)
    }
}

/// Cumulative-percent upper bounds of classes A and B (both inclusive).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbcThresholds {
    a_upper: Decimal,
    b_upper: Decimal,
}

impl AbcThresholds {
    pub fn new(a_upper: Decimal, b_upper: Decimal) -> AnalyticsResult<Self> {
        if a_upper < Decimal::ZERO || b_upper > Decimal::ONE_HUNDRED || a_upper > b_upper {
            return Err(AnalyticsError::validation(format!(
                "thresholds must satisfy 0 <= A ({a_upper}) <= B ({b_upper}) <= 100"
            )));
        }
        Ok(Self { a_upper, b_upper })
    }

    pub fn a_upper(&self) -> Decimal {
        self.a_upper
    }

    pub fn b_upper(&self) -> Decimal {
        self.b_upper
    }

    /// Class of a group given its cumulative percent.
    pub fn class_for(&self, cumulative_percent: Decimal) -> AbcClass {
        if cumulative_percent <= self.a_upper {
            AbcClass::A
        } else if cumulative_percent <= self.b_upper {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl Default for AbcThresholds {
    fn default() -> Self {
        Self {
            a_upper: Decimal::from(80),
            b_upper: Decimal::from(95),
        }
    }
}

/// One distinct label of a dimension, ranked and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionGroup {
    pub label: String,
    pub total_value: Decimal,
    pub row_count: usize,
    pub cumulative_percent: Decimal,
    pub abc_class: AbcClass,
}

/// ABC classifier for a single dimension.
///
/// Model:
/// - Group rows by the dimension label (rows without a label are skipped).
/// - Rank groups by total `line_amount`, descending; ties keep first-seen order.
/// - Walk the ranking accumulating value and classify by cumulative percent.
#[derive(Debug, Copy, Clone)]
pub struct AbcClassifier {
    dimension: Dimension,
    thresholds: AbcThresholds,
}

impl AbcClassifier {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            thresholds: AbcThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AbcThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn thresholds(&self) -> AbcThresholds {
        self.thresholds
    }

    /// Rank and classify. Errors only when a total leaves the decimal range; no partial
    /// ranking is returned in that case.
    pub fn classify(&self, rows: &[LedgerRow]) -> AnalyticsResult<Vec<DimensionGroup>> {
        let mut groups = self.group(rows)?;

        // `sort_by` is stable: equal totals stay in first-encountered order.
        groups.sort_by(|a, b| b.total_value.cmp(&a.total_value));

        let grand_total = checked_sum(groups.iter().map(|g| g.total_value), "grand total")?;

        if grand_total.is_zero() {
            for g in &mut groups {
                g.cumulative_percent = Decimal::ZERO;
                g.abc_class = AbcClass::C;
            }
            return Ok(groups);
        }

        let mut running = Decimal::ZERO;
        for g in &mut groups {
            running = checked_sum([running, g.total_value], "running total")?;
            g.cumulative_percent = percent_of(running, grand_total)?;
            g.abc_class = self.thresholds.class_for(g.cumulative_percent);
        }

        Ok(groups)
    }

    /// Single pass: label -> index into a first-seen-ordered accumulator list.
    fn group(&self, rows: &[LedgerRow]) -> AnalyticsResult<Vec<DimensionGroup>> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<DimensionGroup> = Vec::new();

        for row in rows {
            let Some(label) = self.dimension.label_of(row) else {
                continue;
            };

            let slot = *index.entry(label).or_insert_with(|| {
                groups.push(DimensionGroup {
                    label: label.to_string(),
                    total_value: Decimal::ZERO,
                    row_count: 0,
                    cumulative_percent: Decimal::ZERO,
                    abc_class: AbcClass::C,
                });
                groups.len() - 1
            });

            let g = &mut groups[slot];
            g.total_value = checked_sum([g.total_value, row.line_amount()], "group total")?;
            g.row_count += 1;
        }

        Ok(groups)
    }
}

/// Classify `rows` by `dimension` with the default 80/95 thresholds.
pub fn classify(rows: &[LedgerRow], dimension: Dimension) -> AnalyticsResult<Vec<DimensionGroup>> {
    AbcClassifier::new(dimension).classify(rows)
}

/// Classify by a dimension given by name (e.g. from a request path).
pub fn classify_by_name(rows: &[LedgerRow], dimension: &str) -> AnalyticsResult<Vec<DimensionGroup>> {
    let dimension: Dimension = dimension.parse()?;
    classify(rows, dimension)
}

/// Totals of one class within a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class: AbcClass,
    pub group_count: usize,
    pub row_count: usize,
    pub total_value: Decimal,
    /// Share of the grand total, in percent (0 when the grand total is 0).
    pub value_share: Decimal,
}

/// Per-class rollup of a classification, always listing A, B and C in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbcSummary {
    pub group_count: usize,
    pub grand_total: Decimal,
    pub classes: Vec<ClassSummary>,
}

pub fn summarize(groups: &[DimensionGroup]) -> AnalyticsResult<AbcSummary> {
    let grand_total = checked_sum(groups.iter().map(|g| g.total_value), "grand total")?;

    let classes = AbcClass::ALL
        .iter()
        .map(|&class| -> AnalyticsResult<ClassSummary> {
            let members: Vec<&DimensionGroup> = groups.iter().filter(|g| g.abc_class == class).collect();
            let total_value = checked_sum(members.iter().map(|g| g.total_value), "class total")?;
            Ok(ClassSummary {
                class,
                group_count: members.len(),
                row_count: members.iter().map(|g| g.row_count).sum(),
                total_value,
                value_share: percent_of(total_value, grand_total)?,
            })
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    Ok(AbcSummary {
        group_count: groups.len(),
        grand_total,
        classes,
    })
}
