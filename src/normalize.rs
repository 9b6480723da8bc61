//! Schema alignment and whitespace normalization of input tables

use crate::error::{Result, TabcompareError};
use crate::table::{Row, Table};
use std::collections::HashSet;

/// Ensure both tables carry the same set of column names, ignoring order.
///
/// The error lists the symmetric difference, sorted, split by side.
pub fn ensure_same_columns(first: &Table, second: &Table) -> Result<()> {
    let first_set: HashSet<&str> = first.columns.iter().map(String::as_str).collect();
    let second_set: HashSet<&str> = second.columns.iter().map(String::as_str).collect();

    if first_set == second_set {
        return Ok(());
    }

    let mut only_in_first: Vec<String> = first_set
        .difference(&second_set)
        .map(|c| c.to_string())
        .collect();
    let mut only_in_second: Vec<String> = second_set
        .difference(&first_set)
        .map(|c| c.to_string())
        .collect();
    only_in_first.sort();
    only_in_second.sort();

    Err(TabcompareError::schema_mismatch(
        first.name.as_str(),
        second.name.as_str(),
        only_in_first,
        only_in_second,
    ))
}

/// Produce normalized copies of both tables.
///
/// The second table's columns are reordered to the first table's order and,
/// when `trim_strings` is set, every string value in both tables loses its
/// leading and trailing whitespace. Inputs are left untouched.
pub fn normalize_tables(first: &Table, second: &Table, trim_strings: bool) -> Result<(Table, Table)> {
    ensure_same_columns(first, second)?;

    if first.columns != second.columns {
        log::debug!(
            "Reordering columns of '{}' to match '{}'",
            second.name,
            first.name
        );
    }

    let columns = first.columns.clone();
    let first = realign(first, &columns, trim_strings);
    let second = realign(second, &columns, trim_strings);
    Ok((first, second))
}

fn realign(table: &Table, columns: &[String], trim_strings: bool) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    let value = row.get(col).cloned().unwrap_or_default();
                    let value = if trim_strings { value.trimmed() } else { value };
                    (col.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();

    Table {
        name: table.name.clone(),
        columns: columns.to_vec(),
        rows,
    }
}
