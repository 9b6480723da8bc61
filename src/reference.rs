//! Choice of reference (A) and compare-to (B) tables

use crate::table::Table;
use serde::{Deserialize, Serialize};

/// How the reference table is picked from the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// The table with more rows is the reference; ties keep argument order
    #[default]
    LargerTable,
    /// The first argument is always the reference
    FirstArgument,
}

/// Outcome of reference selection
#[derive(Debug)]
pub struct ReferenceSelection {
    pub reference: Table,
    pub compare_to: Table,
    /// True when the second argument became the reference
    pub swapped: bool,
}

impl ReferencePolicy {
    /// Whether the second input becomes the reference for the given row counts
    pub fn swaps(&self, first_rows: usize, second_rows: usize) -> bool {
        match self {
            ReferencePolicy::LargerTable => second_rows > first_rows,
            ReferencePolicy::FirstArgument => false,
        }
    }
}

/// Order two normalized tables into (reference, compare-to)
pub fn select_reference(first: Table, second: Table, policy: ReferencePolicy) -> ReferenceSelection {
    if policy.swaps(first.row_count(), second.row_count()) {
        log::info!(
            "'{}' is larger ({} rows) than '{}' ({} rows); using it as reference (A)",
            second.name,
            second.row_count(),
            first.name,
            first.row_count()
        );
        ReferenceSelection {
            reference: second,
            compare_to: first,
            swapped: true,
        }
    } else {
        ReferenceSelection {
            reference: first,
            compare_to: second,
            swapped: false,
        }
    }
}
