//! CSV and plain-text exports of a comparison result

use crate::compare::ComparisonResult;
use crate::error::Result;
use crate::matcher::TableSide;
use crate::table::{Row, Value};
use crate::workspace::{OutputKind, OutputWorkspace};
use std::fs;
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 80;

/// A file produced by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub kind: OutputKind,
    pub path: PathBuf,
    /// Data rows written, excluding the header
    pub rows: usize,
}

fn cell(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

fn write_rows<'r>(path: &Path, columns: &[String], rows: impl Iterator<Item = &'r Row>) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns)?;
    let mut count = 0;
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell(row.get(c))))?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Rows only in the reference table
pub fn write_deleted_csv(result: &ComparisonResult, path: &Path) -> Result<usize> {
    write_rows(path, &result.metadata.columns, result.deleted.iter())
}

/// Rows only in the compare-to table
pub fn write_inserted_csv(result: &ComparisonResult, path: &Path) -> Result<usize> {
    write_rows(path, &result.metadata.columns, result.inserted.iter())
}

/// Updated rows: key columns, then `<col>_a` / `<col>_b` pairs, then `changed_columns`
pub fn write_updated_csv(result: &ComparisonResult, path: &Path) -> Result<usize> {
    let key_columns = &result.metadata.key_columns;
    let value_columns = result.metadata.non_key_columns();

    let mut header: Vec<String> = key_columns.clone();
    for col in &value_columns {
        header.push(format!("{}_a", col));
        header.push(format!("{}_b", col));
    }
    header.push("changed_columns".to_string());

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;
    for update in &result.updated {
        let mut record: Vec<String> = update.key.values().iter().map(Value::to_string).collect();
        for col in &value_columns {
            record.push(cell(update.reference.get(*col)));
            record.push(cell(update.compare_to.get(*col)));
        }
        record.push(update.changed_columns().join(";"));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(result.updated.len())
}

/// Every distinct key with a trailing `status` column
pub fn write_combined_csv(result: &ComparisonResult, path: &Path) -> Result<usize> {
    let columns = &result.metadata.columns;
    let mut header = columns.clone();
    header.push("status".to_string());

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;
    for entry in &result.combined {
        let row = entry.primary_row();
        let mut record: Vec<String> = columns
            .iter()
            .map(|c| cell(row.and_then(|r| r.get(c))))
            .collect();
        record.push(entry.status.as_str().to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(result.combined.len())
}

/// Write the four CSV views into `workspace`
pub fn write_csv_views(result: &ComparisonResult, workspace: &OutputWorkspace) -> Result<Vec<WrittenFile>> {
    let writers: [(OutputKind, fn(&ComparisonResult, &Path) -> Result<usize>); 4] = [
        (OutputKind::Deleted, write_deleted_csv),
        (OutputKind::Inserted, write_inserted_csv),
        (OutputKind::Updated, write_updated_csv),
        (OutputKind::Combined, write_combined_csv),
    ];

    let mut written = Vec::with_capacity(writers.len());
    for (kind, write) in writers {
        let path = workspace.path(kind);
        let rows = write(result, &path)?;
        log::info!("Wrote {} ({} rows)", path.display(), rows);
        written.push(WrittenFile { kind, path, rows });
    }
    Ok(written)
}

fn row_pairs(columns: &[String], row: &Row) -> String {
    columns
        .iter()
        .map(|c| {
            let value = row.get(c).map(Value::display_or_null).unwrap_or_else(|| "NULL".to_string());
            format!("{}={}", c, value)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn section_header(out: &mut String, title: &str) {
    let rule = "─".repeat(BANNER_WIDTH);
    out.push_str(&format!("\n{}\n{}\n{}\n", rule, title, rule));
}

/// Render the plain-text comparison report
pub fn render_report(result: &ComparisonResult) -> String {
    let meta = &result.metadata;
    let counts = result.counts();
    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();

    let key_label = if meta.key_columns.is_empty() {
        "None".to_string()
    } else {
        meta.key_columns.join(", ")
    };

    let header = [
        format!("\n{}", banner),
        "TABLE COMPARISON REPORT (Reference vs Compare-to)".to_string(),
        banner.clone(),
        format!("Primary Key Columns: {}", key_label),
        format!("Reference (A): {}", meta.reference_name),
        format!("Compare-to (B): {}", meta.compare_to_name),
        format!("Total Rows in Reference (A): {}", meta.reference_rows),
        format!("Total Rows in Compare-to (B): {}", meta.compare_to_rows),
        format!("Identical Rows: {}", counts.same),
        format!("Deleted Rows: {}", counts.deleted),
        format!("Inserted Rows: {}", counts.inserted),
        format!("Updated Rows: {}", counts.updated),
    ];
    for line in &header {
        push_line(&mut out, line);
    }
    if !meta.duplicate_keys.is_empty() {
        push_line(
            &mut out,
            &format!(
                "Duplicate Keys: {} key(s), {} row(s) discarded (last row wins)",
                meta.duplicate_keys.len(),
                meta.duplicate_key_count()
            ),
        );
    }
    push_line(&mut out, &format!("{}\n", banner));

    if !result.deleted.is_empty() {
        section_header(
            &mut out,
            &format!("ONLY IN {}: {} row(s)", meta.reference_name, result.deleted.len()),
        );
        for row in &result.deleted {
            push_line(&mut out, &row_pairs(&meta.columns, row));
        }
    }

    if !result.inserted.is_empty() {
        section_header(
            &mut out,
            &format!("ONLY IN {}: {} row(s)", meta.compare_to_name, result.inserted.len()),
        );
        for row in &result.inserted {
            push_line(&mut out, &row_pairs(&meta.columns, row));
        }
    }

    if !result.updated.is_empty() {
        section_header(
            &mut out,
            &format!("DIFFERENT: {} row(s) with changed values", result.updated.len()),
        );
        for update in &result.updated {
            push_line(&mut out, &format!("\nKey: {}", update.key.describe(&meta.key_columns)));
            for change in &update.changes {
                push_line(
                    &mut out,
                    &format!(
                        "  {}: {} → {}",
                        change.column,
                        change.old.display_or_null(),
                        change.new.display_or_null()
                    ),
                );
            }
        }
    }

    if !meta.duplicate_keys.is_empty() {
        section_header(&mut out, "DUPLICATE KEYS (last row kept)");
        for dup in &meta.duplicate_keys {
            let table = match dup.side {
                TableSide::Reference => &meta.reference_name,
                TableSide::CompareTo => &meta.compare_to_name,
            };
            push_line(
                &mut out,
                &format!(
                    "{}: {} ({} occurrences)",
                    table,
                    dup.key.describe(&meta.key_columns),
                    dup.occurrences
                ),
            );
        }
    }

    out
}

pub fn write_report(result: &ComparisonResult, path: &Path) -> Result<()> {
    fs::write(path, render_report(result))?;
    log::info!("Wrote report: {}", path.display());
    Ok(())
}
