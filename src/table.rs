//! In-memory tables and the typed cell values they hold

use crate::error::{Result, TabcompareError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A numeric cell value. Integers and floats compare by value, not representation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Canonical numeric form shared by equality, hashing and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CanonicalNumber {
    Int(i64),
    FloatBits(u64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn canonical(self) -> CanonicalNumber {
        match self {
            Number::Int(i) => CanonicalNumber::Int(i),
            Number::Float(f) if f.is_nan() => CanonicalNumber::FloatBits(f64::NAN.to_bits()),
            Number::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                // also folds -0.0 into 0
                CanonicalNumber::Int(f as i64)
            }
            Number::Float(f) => CanonicalNumber::FloatBits(f.to_bits()),
        }
    }

    fn total_cmp(self, other: Number) -> Ordering {
        match (self.canonical(), other.canonical()) {
            (CanonicalNumber::Int(a), CanonicalNumber::Int(b)) => a.cmp(&b),
            (CanonicalNumber::FloatBits(a), CanonicalNumber::FloatBits(b)) => {
                f64::from_bits(a).total_cmp(&f64::from_bits(b))
            }
            (CanonicalNumber::Int(a), CanonicalNumber::FloatBits(b)) => {
                (a as f64).total_cmp(&f64::from_bits(b)).then(Ordering::Less)
            }
            (CanonicalNumber::FloatBits(a), CanonicalNumber::Int(b)) => {
                f64::from_bits(a).total_cmp(&(b as f64)).then(Ordering::Greater)
            }
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Number {}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A single cell value.
///
/// Equality is type-aware: strings compare after trimming, numbers compare
/// exactly by value regardless of integer/float representation, and null
/// equals null. Values of different variants are never equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Borrowed canonical form used for hashing
#[derive(Hash)]
enum CanonicalValue<'a> {
    Null,
    Bool(bool),
    Number(CanonicalNumber),
    Text(&'a str),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy of this value with surrounding whitespace stripped from strings
    pub fn trimmed(&self) -> Value {
        match self {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    fn canonical(&self) -> CanonicalValue<'_> {
        match self {
            Value::Null => CanonicalValue::Null,
            Value::Bool(b) => CanonicalValue::Bool(*b),
            Value::Number(n) => CanonicalValue::Number(n.canonical()),
            Value::String(s) => CanonicalValue::Text(s.trim()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
        }
    }

    /// Render for reports: nulls become `NULL`
    pub fn display_or_null(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a.trim() == b.trim(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl Ord for Value {
    /// Total order: null < boolean < number < string
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
            (Value::String(a), Value::String(b)) => a.trim().cmp(b.trim()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::Int(i as i64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One row: column name to value, in column order
pub type Row = IndexMap<String, Value>;

/// Ordered tuple of key-column values identifying a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Key(pub Vec<Value>);

impl Key {
    /// Extract the key for `row` from `columns`; absent cells read as null
    pub fn from_row(row: &Row, columns: &[String]) -> Self {
        Key(columns
            .iter()
            .map(|col| row.get(col).cloned().unwrap_or(Value::Null))
            .collect())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// `col=value | col=value` rendering used by reports and log lines
    pub fn describe(&self, columns: &[String]) -> String {
        columns
            .iter()
            .zip(&self.0)
            .map(|(col, value)| format!("{}={}", col, value.display_or_null()))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// A loaded dataset: ordered column names and ordered rows
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Identity surfaced in results (usually the source file name)
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from positional records; every record must match the column count
    pub fn from_records<C, V>(name: impl Into<String>, columns: &[C], records: Vec<Vec<V>>) -> Result<Self>
    where
        C: AsRef<str>,
        V: Into<Value>,
    {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let mut table = Table::new(name, columns);
        for (idx, record) in records.into_iter().enumerate() {
            if record.len() != table.columns.len() {
                return Err(TabcompareError::invalid_input(format!(
                    "Record {} of '{}' has {} values, expected {}",
                    idx + 1,
                    table.name,
                    record.len(),
                    table.columns.len()
                )));
            }
            let row: Row = table
                .columns
                .iter()
                .cloned()
                .zip(record.into_iter().map(Into::into))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}
