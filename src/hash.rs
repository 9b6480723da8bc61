//! Content fingerprints of comparison results

use crate::compare::ComparisonResult;
use crate::table::{Row, Value};
use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// A hash value represented as a hex string
pub type HashValue = String;

/// Per-view digests plus one digest over all four.
///
/// Two runs over the same inputs and configuration produce equal
/// fingerprints; any difference in content or ordering changes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFingerprint {
    pub deleted: HashValue,
    pub inserted: HashValue,
    pub updated: HashValue,
    pub combined: HashValue,
    pub overall: HashValue,
}

fn update_value(hasher: &mut Hasher, value: &Value) {
    hasher.update(value.type_name().as_bytes());
    hasher.update(b":");
    hasher.update(value.to_string().as_bytes());
    hasher.update(b"|");
}

fn update_row(hasher: &mut Hasher, row: &Row) {
    for (column, value) in row {
        hasher.update(column.as_bytes());
        hasher.update(b"=");
        update_value(hasher, value);
    }
    hasher.update(b"\n");
}

fn hash_rows(rows: &[Row]) -> HashValue {
    let mut hasher = Hasher::new();
    for row in rows {
        update_row(&mut hasher, row);
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_updated(result: &ComparisonResult) -> HashValue {
    let mut hasher = Hasher::new();
    for update in &result.updated {
        for value in update.key.values() {
            update_value(&mut hasher, value);
        }
        for change in &update.changes {
            hasher.update(change.column.as_bytes());
            hasher.update(b"=");
            update_value(&mut hasher, &change.old);
            update_value(&mut hasher, &change.new);
        }
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_combined(result: &ComparisonResult) -> HashValue {
    let mut hasher = Hasher::new();
    for entry in &result.combined {
        hasher.update(entry.status.as_str().as_bytes());
        hasher.update(b"|");
        for value in entry.key.values() {
            update_value(&mut hasher, value);
        }
        for side in [&entry.reference, &entry.compare_to] {
            match side {
                Some(row) => update_row(&mut hasher, row),
                None => {
                    hasher.update(b"-\n");
                }
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint the four views of `result`, hashing them in parallel
pub fn fingerprint(result: &ComparisonResult) -> ResultFingerprint {
    let ((deleted, inserted), (updated, combined)) = rayon::join(
        || rayon::join(|| hash_rows(&result.deleted), || hash_rows(&result.inserted)),
        || rayon::join(|| hash_updated(result), || hash_combined(result)),
    );

    let mut hasher = Hasher::new();
    for digest in [&deleted, &inserted, &updated, &combined] {
        hasher.update(digest.as_bytes());
        hasher.update(b"|");
    }
    let overall = hasher.finalize().to_hex().to_string();

    ResultFingerprint {
        deleted,
        inserted,
        updated,
        combined,
        overall,
    }
}
