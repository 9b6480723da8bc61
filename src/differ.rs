//! Column-level comparison of matched rows

use crate::matcher::{KeyOutcome, MatchedPair};
use crate::table::{Key, Row, Value};
use rayon::prelude::*;
use serde::Serialize;

/// One differing column of an updated row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnChange {
    pub column: String,
    /// Value in the reference row
    pub old: Value,
    /// Value in the compare-to row
    pub new: Value,
}

/// Verdict for one matched pair
#[derive(Debug, Clone, PartialEq)]
pub enum RowVerdict {
    Same,
    /// Differing columns in column declaration order
    Updated(Vec<ColumnChange>),
}

impl RowVerdict {
    pub fn is_same(&self) -> bool {
        matches!(self, RowVerdict::Same)
    }
}

/// A key outcome paired with the verdict of its matched rows
#[derive(Debug)]
pub enum DiffedOutcome<'a, 't> {
    ReferenceOnly { key: &'a Key, row: &'t Row },
    CompareOnly { key: &'a Key, row: &'t Row },
    Matched { pair: &'a MatchedPair<'t>, verdict: RowVerdict },
}

/// Compares the non-key columns of matched rows
#[derive(Debug, Clone)]
pub struct RowDiffer {
    compared_columns: Vec<String>,
}

impl RowDiffer {
    /// `columns` in declaration order; key columns are skipped
    pub fn new(columns: &[String], key_columns: &[String]) -> Self {
        let compared_columns = columns
            .iter()
            .filter(|c| !key_columns.contains(c))
            .cloned()
            .collect();
        Self { compared_columns }
    }

    pub fn compared_columns(&self) -> &[String] {
        &self.compared_columns
    }

    /// Compare one reference row against one compare-to row
    pub fn diff_rows(&self, reference: &Row, compare_to: &Row) -> RowVerdict {
        let changes: Vec<ColumnChange> = self
            .compared_columns
            .iter()
            .filter_map(|col| {
                let old = reference.get(col).unwrap_or(&Value::Null);
                let new = compare_to.get(col).unwrap_or(&Value::Null);
                if old == new {
                    None
                } else {
                    Some(ColumnChange {
                        column: col.clone(),
                        old: old.clone(),
                        new: new.clone(),
                    })
                }
            })
            .collect();

        if changes.is_empty() {
            RowVerdict::Same
        } else {
            RowVerdict::Updated(changes)
        }
    }

    /// Diff every matched outcome in parallel; results keep the input order
    pub fn diff_outcomes<'a, 't>(&self, outcomes: &'a [KeyOutcome<'t>]) -> Vec<DiffedOutcome<'a, 't>> {
        outcomes
            .par_iter()
            .map(|outcome| match outcome {
                KeyOutcome::ReferenceOnly { key, row } => DiffedOutcome::ReferenceOnly { key, row: *row },
                KeyOutcome::CompareOnly { key, row } => DiffedOutcome::CompareOnly { key, row: *row },
                KeyOutcome::Matched(pair) => DiffedOutcome::Matched {
                    pair,
                    verdict: self.diff_rows(pair.reference, pair.compare_to),
                },
            })
            .collect()
    }
}
