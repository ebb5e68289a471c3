// src/data_analysis/comparison.rs

use std::fmt;

use crate::data_analysis::point_cloud_error::{summarize, ErrorSummary};
use crate::data_input::log_data::{LogColumn, PositionTable};
use crate::error::{ValidationError, ValidationResult};
use crate::types::Vec3;

/// A measured column compared against a reference column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonPair {
    pub reference: LogColumn,
    pub measured: LogColumn,
}

impl ComparisonPair {
    /// File-name friendly tag, e.g. `Target_vs_Camera`.
    pub fn file_tag(&self) -> String {
        format!("{}_vs_{}", self.reference.label(), self.measured.label())
    }
}

impl fmt::Display for ComparisonPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.reference.label(), self.measured.label())
    }
}

/// Every measured column of the table paired with the target column.
pub fn comparison_pairs(table: &PositionTable) -> Vec<ComparisonPair> {
    LogColumn::ALL
        .iter()
        .skip(1)
        .filter(|column| table.layout().contains(**column))
        .map(|&measured| ComparisonPair {
            reference: LogColumn::Target,
            measured,
        })
        .collect()
}

/// Rows where both points are fully finite; missing readings are logged as NaN.
pub fn finite_pairs(reference: &[Vec3], measured: &[Vec3]) -> (Vec<Vec3>, Vec<Vec3>) {
    reference
        .iter()
        .zip(measured)
        .filter(|(r, m)| r.iter().chain(m.iter()).all(|v| v.is_finite()))
        .map(|(r, m)| (*r, *m))
        .unzip()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub pair: ComparisonPair,
    /// `None` when the measured column has no finite reading.
    pub summary: Option<ErrorSummary>,
    /// Rows skipped because of a missing reading.
    pub skipped: usize,
}

impl PairReport {
    pub fn lines(&self) -> Vec<String> {
        match &self.summary {
            Some(s) => {
                let mut lines = vec![
                    format!("[{}] mean error: {:.3} mm", self.pair, s.mean),
                    format!("[{}] std: {:.3} mm", self.pair, s.std),
                ];
                if self.skipped > 0 {
                    lines.push(format!(
                        "[{}] skipped {} rows without a reading",
                        self.pair, self.skipped
                    ));
                }
                lines
            }
            None => vec![format!("[{}] no readings", self.pair)],
        }
    }
}

/// Error statistics of every comparison pair present in `table`.
pub fn compare_table(table: &PositionTable) -> ValidationResult<Vec<PairReport>> {
    comparison_pairs(table)
        .into_iter()
        .map(|pair| {
            let (Some(reference), Some(measured)) =
                (table.column(pair.reference), table.column(pair.measured))
            else {
                return Err(ValidationError::invalid(format!(
                    "column missing for pair {pair}"
                )));
            };
            let (reference, measured) = finite_pairs(reference, measured);
            let skipped = table.len() - reference.len();
            let summary = if reference.is_empty() {
                None
            } else {
                Some(summarize(&reference, &measured)?)
            };
            Ok(PairReport {
                pair,
                summary,
                skipped,
            })
        })
        .collect()
}
