//! Key-based row matching between the reference and compare-to tables

use crate::error::{Result, TabcompareError};
use crate::table::{Key, Row, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which key columns identify a row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpec {
    /// Every column is part of the key (row-level equality)
    #[default]
    AllColumns,
    /// Ordered list of key column names
    Columns(Vec<String>),
}

impl KeySpec {
    /// Parse a comma separated list; blank input means all columns
    pub fn parse(s: &str) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !columns.iter().any(|c| c == part) {
                columns.push(part.to_string());
            }
        }
        Self::from_columns(columns)
    }

    pub fn from_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            Self::AllColumns
        } else {
            Self::Columns(columns)
        }
    }

    /// Resolve against a table's columns. Returns the key columns and
    /// whether they defaulted to every column.
    pub fn resolve(&self, table: &Table) -> Result<(Vec<String>, bool)> {
        match self {
            KeySpec::AllColumns => Ok((table.columns.clone(), true)),
            KeySpec::Columns(columns) if columns.is_empty() => Ok((table.columns.clone(), true)),
            KeySpec::Columns(columns) => {
                let missing: Vec<String> = columns
                    .iter()
                    .filter(|c| !table.has_column(c))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(TabcompareError::key_column_not_found(missing));
                }
                Ok((columns.clone(), false))
            }
        }
    }
}

/// The two sides of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSide {
    Reference,
    CompareTo,
}

/// A key that occurred more than once within one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateKey {
    pub side: TableSide,
    pub key: Key,
    pub occurrences: usize,
}

impl DuplicateKey {
    /// Rows discarded by last-row-wins resolution
    pub fn discarded(&self) -> usize {
        self.occurrences.saturating_sub(1)
    }
}

/// Key to row lookup for one table.
///
/// Duplicate policy: the last row with a given key wins, while the key keeps
/// the position of its first occurrence.
#[derive(Debug)]
pub struct KeyIndex<'t> {
    rows: IndexMap<Key, &'t Row>,
    duplicates: Vec<DuplicateKey>,
}

impl<'t> KeyIndex<'t> {
    pub fn build(table: &'t Table, key_columns: &[String], side: TableSide) -> Self {
        let mut rows: IndexMap<Key, &'t Row> = IndexMap::with_capacity(table.row_count());
        let mut occurrences: IndexMap<Key, usize> = IndexMap::new();

        for row in &table.rows {
            let key = Key::from_row(row, key_columns);
            if rows.insert(key.clone(), row).is_some() {
                *occurrences.entry(key).or_insert(1) += 1;
            }
        }

        let duplicates: Vec<DuplicateKey> = occurrences
            .into_iter()
            .map(|(key, occurrences)| DuplicateKey {
                side,
                key,
                occurrences,
            })
            .collect();

        for dup in &duplicates {
            log::warn!(
                "Duplicate key in '{}' ({} occurrences, keeping the last): {}",
                table.name,
                dup.occurrences,
                dup.key.describe(key_columns)
            );
        }

        Self { rows, duplicates }
    }

    pub fn get(&self, key: &Key) -> Option<&'t Row> {
        self.rows.get(key).copied()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys with their resolved rows, in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &'t Row)> + '_ {
        self.rows.iter().map(|(k, r)| (k, *r))
    }

    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }
}

/// A key present in both tables
#[derive(Debug, Clone)]
pub struct MatchedPair<'t> {
    pub key: Key,
    pub reference: &'t Row,
    pub compare_to: &'t Row,
}

/// Per-key matching outcome
#[derive(Debug, Clone)]
pub enum KeyOutcome<'t> {
    Matched(MatchedPair<'t>),
    ReferenceOnly { key: Key, row: &'t Row },
    CompareOnly { key: Key, row: &'t Row },
}

impl<'t> KeyOutcome<'t> {
    pub fn key(&self) -> &Key {
        match self {
            KeyOutcome::Matched(pair) => &pair.key,
            KeyOutcome::ReferenceOnly { key, .. } => key,
            KeyOutcome::CompareOnly { key, .. } => key,
        }
    }

    /// Reference-originated keys sort before compare-only keys
    fn group(&self) -> u8 {
        match self {
            KeyOutcome::CompareOnly { .. } => 1,
            _ => 0,
        }
    }
}

/// Result of matching both tables by key.
///
/// `outcomes` holds one entry per distinct key: every reference key in
/// reference order, then compare-only keys in compare-to order.
#[derive(Debug)]
pub struct KeyMatch<'t> {
    pub outcomes: Vec<KeyOutcome<'t>>,
    pub duplicates: Vec<DuplicateKey>,
}

impl<'t> KeyMatch<'t> {
    pub fn only_in_reference(&self) -> impl Iterator<Item = (&Key, &'t Row)> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            KeyOutcome::ReferenceOnly { key, row } => Some((key, *row)),
            _ => None,
        })
    }

    pub fn only_in_compare_to(&self) -> impl Iterator<Item = (&Key, &'t Row)> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            KeyOutcome::CompareOnly { key, row } => Some((key, *row)),
            _ => None,
        })
    }

    pub fn matched(&self) -> impl Iterator<Item = &MatchedPair<'t>> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            KeyOutcome::Matched(pair) => Some(pair),
            _ => None,
        })
    }

    pub fn distinct_keys(&self) -> usize {
        self.outcomes.len()
    }

    /// Stable sort by key within the reference-originated and compare-only groups
    pub fn sort_by_key(&mut self) {
        self.outcomes
            .sort_by(|a, b| a.group().cmp(&b.group()).then_with(|| a.key().cmp(b.key())));
    }
}

/// Match `reference` against `compare_to` on `key_columns`
pub fn match_by_key<'t>(reference: &'t Table, compare_to: &'t Table, key_columns: &[String]) -> KeyMatch<'t> {
    let reference_index = KeyIndex::build(reference, key_columns, TableSide::Reference);
    let compare_index = KeyIndex::build(compare_to, key_columns, TableSide::CompareTo);

    let mut outcomes = Vec::with_capacity(reference_index.len() + compare_index.len());

    for (key, row) in reference_index.iter() {
        match compare_index.get(key) {
            Some(other) => outcomes.push(KeyOutcome::Matched(MatchedPair {
                key: key.clone(),
                reference: row,
                compare_to: other,
            })),
            None => outcomes.push(KeyOutcome::ReferenceOnly {
                key: key.clone(),
                row,
            }),
        }
    }

    for (key, row) in compare_index.iter() {
        if !reference_index.contains(key) {
            outcomes.push(KeyOutcome::CompareOnly {
                key: key.clone(),
                row,
            });
        }
    }

    let mut duplicates = reference_index.duplicates().to_vec();
    duplicates.extend_from_slice(compare_index.duplicates());

    log::debug!(
        "Matched {} distinct keys ({} reference, {} compare-to)",
        outcomes.len(),
        reference_index.len(),
        compare_index.len()
    );

    KeyMatch {
        outcomes,
        duplicates,
    }
}
