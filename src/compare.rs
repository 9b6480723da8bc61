//! Comparison entry point and assembly of the four result views
//!
//! A comparison runs in fixed stages: normalize both tables, pick the
//! reference, resolve key columns, match rows by key, diff matched rows and
//! assemble DELETED / INSERTED / UPDATED / COMBINED. Schema and key errors
//! abort before any matching work, so a failed run produces no partial result.

use crate::differ::{ColumnChange, DiffedOutcome, RowDiffer, RowVerdict};
use crate::error::Result;
use crate::matcher::{match_by_key, DuplicateKey, KeyMatch, KeySpec};
use crate::normalize::normalize_tables;
use crate::reference::{select_reference, ReferencePolicy};
use crate::table::{Key, Row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering of the combined view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Reference keys in reference order, then compare-only keys in compare-to order
    #[default]
    SourceOrder,
    /// Same two groups, each sorted by key value
    SortedByKey,
}

/// Settings for one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub key_columns: KeySpec,
    pub trim_strings: bool,
    pub reference_policy: ReferencePolicy,
    pub key_order: KeyOrder,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            key_columns: KeySpec::AllColumns,
            trim_strings: true,
            reference_policy: ReferencePolicy::LargerTable,
            key_order: KeyOrder::SourceOrder,
        }
    }
}

impl ComparisonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_columns(mut self, key_columns: KeySpec) -> Self {
        self.key_columns = key_columns;
        self
    }

    pub fn with_trim_strings(mut self, trim_strings: bool) -> Self {
        self.trim_strings = trim_strings;
        self
    }

    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }
}

/// Per-key classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Same,
    Updated,
    Deleted,
    Inserted,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Same => "SAME",
            RowStatus::Updated => "UPDATED",
            RowStatus::Deleted => "DELETED",
            RowStatus::Inserted => "INSERTED",
        }
    }

    pub const ALL: [RowStatus; 4] = [
        RowStatus::Same,
        RowStatus::Updated,
        RowStatus::Deleted,
        RowStatus::Inserted,
    ];
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key present in both tables whose non-key values differ
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedRow {
    pub key: Key,
    pub reference: Row,
    pub compare_to: Row,
    pub changes: Vec<ColumnChange>,
}

impl UpdatedRow {
    pub fn changed_columns(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.column.as_str()).collect()
    }
}

/// One entry of the outer-join view
#[derive(Debug, Clone, Serialize)]
pub struct CombinedEntry {
    pub key: Key,
    pub status: RowStatus,
    pub reference: Option<Row>,
    pub compare_to: Option<Row>,
    /// Non-empty only for UPDATED entries
    pub changed_columns: Vec<String>,
}

impl CombinedEntry {
    /// Row shown in single-row layouts: the reference side unless only the
    /// compare-to side exists
    pub fn primary_row(&self) -> Option<&Row> {
        self.reference.as_ref().or(self.compare_to.as_ref())
    }
}

/// Descriptive data about a run
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonMetadata {
    pub reference_name: String,
    pub compare_to_name: String,
    pub reference_rows: usize,
    pub compare_to_rows: usize,
    /// True when the second input became the reference
    pub swapped: bool,
    pub columns: Vec<String>,
    pub key_columns: Vec<String>,
    pub key_defaulted_to_all_columns: bool,
    pub duplicate_keys: Vec<DuplicateKey>,
    pub distinct_keys: usize,
}

impl ComparisonMetadata {
    /// Rows discarded by last-row-wins duplicate resolution, across both tables
    pub fn duplicate_key_count(&self) -> usize {
        self.duplicate_keys.iter().map(DuplicateKey::discarded).sum()
    }

    pub fn non_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !self.key_columns.contains(c))
            .map(String::as_str)
            .collect()
    }
}

/// Number of keys per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub same: usize,
    pub updated: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.same + self.updated + self.deleted + self.inserted
    }

    pub fn get(&self, status: RowStatus) -> usize {
        match status {
            RowStatus::Same => self.same,
            RowStatus::Updated => self.updated,
            RowStatus::Deleted => self.deleted,
            RowStatus::Inserted => self.inserted,
        }
    }
}

/// Immutable outcome of one comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Rows only in the reference table
    pub deleted: Vec<Row>,
    /// Rows only in the compare-to table
    pub inserted: Vec<Row>,
    pub updated: Vec<UpdatedRow>,
    pub combined: Vec<CombinedEntry>,
    pub metadata: ComparisonMetadata,
}

impl ComparisonResult {
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.combined {
            match entry.status {
                RowStatus::Same => counts.same += 1,
                RowStatus::Updated => counts.updated += 1,
                RowStatus::Deleted => counts.deleted += 1,
                RowStatus::Inserted => counts.inserted += 1,
            }
        }
        counts
    }

    pub fn same_count(&self) -> usize {
        self.counts().same
    }

    pub fn has_changes(&self) -> bool {
        !self.deleted.is_empty() || !self.inserted.is_empty() || !self.updated.is_empty()
    }

    pub fn has_duplicate_keys(&self) -> bool {
        !self.metadata.duplicate_keys.is_empty()
    }

    pub fn rows_with_status(&self, status: RowStatus) -> impl Iterator<Item = &CombinedEntry> + '_ {
        self.combined.iter().filter(move |e| e.status == status)
    }
}

/// Compare two tables.
///
/// `first` and `second` are in argument order; which one becomes the
/// reference is decided by `config.reference_policy`.
pub fn compare_tables(first: &Table, second: &Table, config: &ComparisonConfig) -> Result<ComparisonResult> {
    let (first, second) = normalize_tables(first, second, config.trim_strings)?;
    let selection = select_reference(first, second, config.reference_policy);
    let (reference, compare_to) = (&selection.reference, &selection.compare_to);

    let (key_columns, defaulted) = config.key_columns.resolve(reference)?;
    if defaulted {
        log::info!("Using all columns as key: {}", key_columns.join(", "));
    } else {
        log::debug!("Key columns: {}", key_columns.join(", "));
    }

    let mut key_match = match_by_key(reference, compare_to, &key_columns);
    if config.key_order == KeyOrder::SortedByKey {
        key_match.sort_by_key();
    }

    log::debug!(
        "Matched {} keys, {} only in reference, {} only in compare-to",
        key_match.matched().count(),
        key_match.only_in_reference().count(),
        key_match.only_in_compare_to().count()
    );
    let differ = RowDiffer::new(&reference.columns, &key_columns);

    let metadata = ComparisonMetadata {
        reference_name: reference.name.clone(),
        compare_to_name: compare_to.name.clone(),
        reference_rows: reference.row_count(),
        compare_to_rows: compare_to.row_count(),
        swapped: selection.swapped,
        columns: reference.columns.clone(),
        key_columns,
        key_defaulted_to_all_columns: defaulted,
        duplicate_keys: key_match.duplicates.clone(),
        distinct_keys: key_match.distinct_keys(),
    };

    let result = assemble(&key_match, &differ, metadata);
    let counts = result.counts();
    log::debug!(
        "SAME={} UPDATED={} DELETED={} INSERTED={}",
        counts.same,
        counts.updated,
        counts.deleted,
        counts.inserted
    );
    Ok(result)
}

/// Diff matched rows and merge every key outcome into the four views
fn assemble(key_match: &KeyMatch<'_>, differ: &RowDiffer, metadata: ComparisonMetadata) -> ComparisonResult {
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();
    let mut updated = Vec::new();
    let mut combined = Vec::with_capacity(key_match.outcomes.len());

    for outcome in differ.diff_outcomes(&key_match.outcomes) {
        match outcome {
            DiffedOutcome::ReferenceOnly { key, row } => {
                deleted.push((*row).clone());
                combined.push(CombinedEntry {
                    key: key.clone(),
                    status: RowStatus::Deleted,
                    reference: Some((*row).clone()),
                    compare_to: None,
                    changed_columns: Vec::new(),
                });
            }
            DiffedOutcome::CompareOnly { key, row } => {
                inserted.push((*row).clone());
                combined.push(CombinedEntry {
                    key: key.clone(),
                    status: RowStatus::Inserted,
                    reference: None,
                    compare_to: Some((*row).clone()),
                    changed_columns: Vec::new(),
                });
            }
            DiffedOutcome::Matched { pair, verdict } => {
                match verdict {
                    RowVerdict::Same => combined.push(CombinedEntry {
                        key: pair.key.clone(),
                        status: RowStatus::Same,
                        reference: Some(pair.reference.clone()),
                        compare_to: Some(pair.compare_to.clone()),
                        changed_columns: Vec::new(),
                    }),
                    RowVerdict::Updated(changes) => {
                        let changed_columns = changes.iter().map(|c| c.column.clone()).collect();
                        combined.push(CombinedEntry {
                            key: pair.key.clone(),
                            status: RowStatus::Updated,
                            reference: Some(pair.reference.clone()),
                            compare_to: Some(pair.compare_to.clone()),
                            changed_columns,
                        });
                        updated.push(UpdatedRow {
                            key: pair.key.clone(),
                            reference: pair.reference.clone(),
                            compare_to: pair.compare_to.clone(),
                            changes,
                        });
                    }
                }
            }
        }
    }

    ComparisonResult {
        deleted,
        inserted,
        updated,
        combined,
        metadata,
    }
}
