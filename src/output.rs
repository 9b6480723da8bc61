//! Output formatting utilities

use crate::compare::{ComparisonMetadata, ComparisonResult, StatusCounts};
use crate::error::Result;
use crate::export::WrittenFile;
use crate::hash::ResultFingerprint;
use crate::table::Table;
use crate::workspace::OutputKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Updated rows listed in the console summary
const UPDATE_SAMPLE: usize = 3;
/// Changed columns listed per sampled row
const CHANGE_SAMPLE: usize = 2;

/// Pretty printer for tabcompare output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Render the first `limit` rows of `table` as an aligned text grid
    pub fn render_preview(table: &Table, limit: usize) -> String {
        if table.columns.is_empty() {
            return "(no columns)\n".to_string();
        }

        let cells: Vec<Vec<String>> = table
            .rows
            .iter()
            .take(limit)
            .map(|row| {
                table
                    .columns
                    .iter()
                    .map(|c| row.get(c).map(|v| v.display_or_null()).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let line = |values: &[String], out: &mut String| {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:>width$}", v, width = *w))
                .collect();
            out.push_str(padded.join("  ").trim_end());
            out.push('\n');
        };

        line(table.columns.as_slice(), &mut out);
        for row in &cells {
            line(row.as_slice(), &mut out);
        }
        if cells.is_empty() {
            out.push_str("(no rows)\n");
        } else if table.row_count() > cells.len() {
            out.push_str(&format!("... {} more rows\n", table.row_count() - cells.len()));
        }
        out
    }

    /// Print both inputs before comparing, labelled with the role each will play
    pub fn print_input_preview(first: &Table, second: &Table, swapped: bool, limit: usize) {
        let (reference, compare_to) = if swapped { (second, first) } else { (first, second) };

        if swapped {
            println!(
                "ℹ️  {} is larger ({} rows) than {} ({} rows); using it as Reference (A)",
                second.name,
                second.row_count(),
                first.name,
                first.row_count()
            );
        }

        println!("{}", "=".repeat(60));
        println!(
            "Reference (A): {}  (rows={}, cols={})",
            reference.name,
            reference.row_count(),
            reference.column_count()
        );
        print!("{}", Self::render_preview(reference, limit));
        println!("{}", "-".repeat(60));
        println!(
            "Compare-to (B): {}  (rows={}, cols={})",
            compare_to.name,
            compare_to.row_count(),
            compare_to.column_count()
        );
        print!("{}", Self::render_preview(compare_to, limit));
        println!("{}\n", "=".repeat(60));
    }

    /// Print the comparison summary tree and the files written
    pub fn print_comparison_summary(result: &ComparisonResult, files: &[WrittenFile]) {
        let meta = &result.metadata;
        let counts = result.counts();

        println!("📊 {} → {}", meta.reference_name, meta.compare_to_name);
        if meta.key_defaulted_to_all_columns {
            println!("├─ Key: all columns ({})", meta.key_columns.join(", "));
        } else {
            println!("├─ Key: {}", meta.key_columns.join(", "));
        }
        println!(
            "├─ Rows: {} reference, {} compare-to, {} distinct keys",
            meta.reference_rows, meta.compare_to_rows, meta.distinct_keys
        );
        println!("├─ ✅ Same: {}", counts.same);

        if counts.updated > 0 {
            println!("├─ ❌ Updated: {}", counts.updated);
            Self::print_update_sample(result, "│  ");
        } else {
            println!("├─ ✅ Updated: 0");
        }
        println!("├─ {} Deleted: {}", mark(counts.deleted), counts.deleted);
        println!("├─ {} Inserted: {}", mark(counts.inserted), counts.inserted);

        if meta.duplicate_keys.is_empty() {
            println!("└─ ✅ Duplicate keys: none");
        } else {
            println!(
                "└─ ⚠️  Duplicate keys: {} ({} rows discarded, last row wins)",
                meta.duplicate_keys.len(),
                meta.duplicate_key_count()
            );
        }

        if !files.is_empty() {
            println!();
            println!("📁 Wrote:");
            for (i, file) in files.iter().enumerate() {
                let prefix = if i == files.len() - 1 { "└─" } else { "├─" };
                println!("{} {}{}", prefix, file.path.display(), describe_file(file));
            }
        }
    }

    fn print_update_sample(result: &ComparisonResult, prefix: &str) {
        let key_columns = &result.metadata.key_columns;
        let shown = result.updated.len().min(UPDATE_SAMPLE);

        for (i, update) in result.updated.iter().take(UPDATE_SAMPLE).enumerate() {
            let is_last = i == shown - 1 && result.updated.len() <= UPDATE_SAMPLE;
            let row_prefix = if is_last { "└─" } else { "├─" };
            let child_prefix = if is_last { "   " } else { "│  " };
            println!(
                "{}{} {}: {} column(s) changed",
                prefix,
                row_prefix,
                update.key.describe(key_columns),
                update.changes.len()
            );

            let change_count = update.changes.len();
            for (j, change) in update.changes.iter().take(CHANGE_SAMPLE).enumerate() {
                let is_last_change = j == change_count.min(CHANGE_SAMPLE) - 1 && change_count <= CHANGE_SAMPLE;
                let marker = if is_last_change { "└─" } else { "├─" };
                println!(
                    "{}{}{} {}: '{}' → '{}'",
                    prefix,
                    child_prefix,
                    marker,
                    change.column,
                    change.old.display_or_null(),
                    change.new.display_or_null()
                );
            }
            if change_count > CHANGE_SAMPLE {
                println!(
                    "{}{}└─ ... and {} more",
                    prefix,
                    child_prefix,
                    change_count - CHANGE_SAMPLE
                );
            }
        }

        if result.updated.len() > UPDATE_SAMPLE {
            println!(
                "{}└─ ... and {} more updated rows",
                prefix,
                result.updated.len() - UPDATE_SAMPLE
            );
        }
    }

    /// Machine-readable `key=value` lines
    pub fn render_quiet(result: &ComparisonResult) -> String {
        let meta = &result.metadata;
        let counts = result.counts();
        let lines = [
            format!("reference={}", meta.reference_name),
            format!("compare_to={}", meta.compare_to_name),
            format!("swapped={}", meta.swapped),
            format!("key_columns={}", meta.key_columns.join(",")),
            format!("same={}", counts.same),
            format!("updated={}", counts.updated),
            format!("deleted={}", counts.deleted),
            format!("inserted={}", counts.inserted),
            format!("distinct_keys={}", meta.distinct_keys),
            format!("duplicate_keys={}", meta.duplicate_key_count()),
        ];
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    pub fn print_quiet(result: &ComparisonResult) {
        print!("{}", Self::render_quiet(result));
    }
}

fn mark(count: usize) -> &'static str {
    if count == 0 {
        "✅"
    } else {
        "❌"
    }
}

fn describe_file(file: &WrittenFile) -> String {
    let size = file_size(&file.path).map(format_bytes);
    match (file.kind, size) {
        (OutputKind::Report | OutputKind::Excel | OutputKind::Summary, Some(size)) => format!(" ({})", size),
        (OutputKind::Report | OutputKind::Excel | OutputKind::Summary, None) => String::new(),
        (_, Some(size)) => format!(" ({} rows, {})", file.rows, size),
        (_, None) => format!(" ({} rows)", file.rows),
    }
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

/// JSON document describing one comparison run
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary<'a> {
    pub generated_at: DateTime<Utc>,
    pub tool_version: &'static str,
    pub metadata: &'a ComparisonMetadata,
    pub counts: StatusCounts,
    pub duplicate_rows_discarded: usize,
    pub fingerprint: ResultFingerprint,
    pub files: Vec<String>,
}

impl<'a> ComparisonSummary<'a> {
    pub fn new(result: &'a ComparisonResult, fingerprint: ResultFingerprint, files: &[WrittenFile]) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION"),
            metadata: &result.metadata,
            counts: result.counts(),
            duplicate_rows_discarded: result.metadata.duplicate_key_count(),
            fingerprint,
            files: files.iter().map(|f| f.path.display().to_string()).collect(),
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Format bytes in human-readable format
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
