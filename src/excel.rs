//! Side-by-side Excel rendering of a comparison result

use crate::compare::{CombinedEntry, ComparisonResult, RowStatus};
use crate::error::Result;
use crate::table::{Row, Value};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const UPDATED_FILL: u32 = 0xFFFF00;
const ONE_SIDED_FILL: u32 = 0xFFA500;
const MAX_COLUMN_WIDTH: usize = 50;
/// Title row and header row
const HEADER_ROWS: u32 = 2;

struct Formats {
    header: Format,
    title: Format,
    plain: Format,
    updated: Format,
    one_sided: Format,
}

impl Formats {
    fn new() -> Self {
        let plain = Format::new().set_border(FormatBorder::Thin);
        let header = plain.clone().set_bold().set_align(FormatAlign::Center);
        Self {
            title: header.clone(),
            header,
            updated: plain.clone().set_background_color(Color::RGB(UPDATED_FILL)),
            one_sided: plain.clone().set_background_color(Color::RGB(ONE_SIDED_FILL)),
            plain,
        }
    }

    /// Cell format for one block of a row with `status`; `left` is the reference block
    fn block(&self, status: RowStatus, left: bool) -> &Format {
        match (status, left) {
            (RowStatus::Updated, _) => &self.updated,
            (RowStatus::Deleted, true) | (RowStatus::Inserted, false) => &self.one_sided,
            _ => &self.plain,
        }
    }

    fn status(&self, status: RowStatus) -> &Format {
        match status {
            RowStatus::Same => &self.plain,
            RowStatus::Updated => &self.updated,
            RowStatus::Deleted | RowStatus::Inserted => &self.one_sided,
        }
    }
}

/// Column positions on the Comparison sheet: reference block, status, compare-to block
struct Layout {
    width: u16,
}

impl Layout {
    fn status_col(&self) -> u16 {
        self.width
    }

    fn left(&self, idx: usize) -> u16 {
        idx as u16
    }

    fn right(&self, idx: usize) -> u16 {
        self.width + 1 + idx as u16
    }

    fn last_col(&self) -> u16 {
        self.width * 2
    }
}

/// Tracks the widest rendered value per column
struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    fn observe(&mut self, col: u16, text_len: usize) {
        if let Some(w) = self.0.get_mut(col as usize) {
            *w = (*w).max(text_len);
        }
    }

    fn apply(&self, sheet: &mut Worksheet) -> Result<()> {
        for (col, len) in self.0.iter().enumerate() {
            let width = (len + 2).min(MAX_COLUMN_WIDTH);
            sheet.set_column_width(col as u16, width as f64)?;
        }
        Ok(())
    }
}

/// Write the Summary, Legend and Comparison sheets to `path`
pub fn write_comparison_workbook(result: &ComparisonResult, path: &Path) -> Result<()> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_summary_sheet(sheet, result, &formats)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Legend")?;
        write_legend_sheet(sheet, &formats)?;
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Comparison")?;
        write_comparison_sheet(sheet, result, &formats)?;
    }

    workbook.save(path)?;
    log::info!("Wrote Excel: {}", path.display());
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, result: &ComparisonResult, formats: &Formats) -> Result<()> {
    let meta = &result.metadata;
    let counts = result.counts();
    let bold = Format::new().set_bold();

    sheet.write_string_with_format(0, 0, "Table Comparison Summary", &bold)?;
    sheet.write_string(1, 0, "Reference (A)")?;
    sheet.write_string(1, 1, &meta.reference_name)?;
    sheet.write_string(2, 0, "Compare-to (B)")?;
    sheet.write_string(2, 1, &meta.compare_to_name)?;
    sheet.write_string(3, 0, "Key Columns")?;
    sheet.write_string(3, 1, meta.key_columns.join(", "))?;

    sheet.write_string(4, 0, "Total Rows (A)")?;
    sheet.write_number(4, 1, meta.reference_rows as f64)?;
    sheet.write_string(5, 0, "Total Rows (B)")?;
    sheet.write_number(5, 1, meta.compare_to_rows as f64)?;

    let mut row = 7;
    for status in RowStatus::ALL {
        sheet.write_string_with_format(row, 0, status.as_str(), formats.status(status))?;
        sheet.write_number(row, 1, counts.get(status) as f64)?;
        row += 1;
    }

    if !meta.duplicate_keys.is_empty() {
        row += 1;
        sheet.write_string(row, 0, "Duplicate rows discarded")?;
        sheet.write_number(row, 1, meta.duplicate_key_count() as f64)?;
    }

    sheet.set_column_width(0, 26.0)?;
    sheet.set_column_width(1, 40.0)?;
    Ok(())
}

fn write_legend_sheet(sheet: &mut Worksheet, formats: &Formats) -> Result<()> {
    let bold = Format::new().set_bold();
    sheet.write_string_with_format(0, 0, "Legend", &bold)?;
    sheet.write_string_with_format(2, 0, "UPDATED (Yellow)", &formats.updated)?;
    sheet.write_string(
        2,
        1,
        "Rows with differences in non-key columns between files (A → B)",
    )?;
    sheet.write_string_with_format(3, 0, "INSERTED/DELETED (Orange)", &formats.one_sided)?;
    sheet.write_string(3, 1, "Rows present only in one file (left-only or right-only)")?;
    sheet.set_column_width(0, 40.0)?;
    sheet.set_column_width(1, 40.0)?;
    Ok(())
}

/// Combined entries grouped SAME, UPDATED, DELETED, INSERTED; order within a group is kept
fn display_order(result: &ComparisonResult) -> Vec<&CombinedEntry> {
    RowStatus::ALL
        .iter()
        .flat_map(|status| result.rows_with_status(*status))
        .collect()
}

fn write_comparison_sheet(sheet: &mut Worksheet, result: &ComparisonResult, formats: &Formats) -> Result<()> {
    let meta = &result.metadata;
    let columns = &meta.columns;
    let layout = Layout {
        width: columns.len() as u16,
    };
    let mut widths = ColumnWidths(vec![0; layout.last_col() as usize + 1]);

    let a_title = format!("--- {} ---", meta.reference_name);
    let b_title = format!("--- {} ---", meta.compare_to_name);
    let titles = [
        (layout.left(0), a_title.as_str()),
        (layout.status_col(), "--- Status ---"),
        (layout.right(0), b_title.as_str()),
    ];
    for col in 0..=layout.last_col() {
        sheet.write_blank(0, col, &formats.title)?;
    }
    for (col, title) in titles {
        sheet.write_string_with_format(0, col, title, &formats.title)?;
        widths.observe(col, title.chars().count());
    }

    for (idx, name) in columns.iter().enumerate() {
        for col in [layout.left(idx), layout.right(idx)] {
            sheet.write_string_with_format(1, col, name, &formats.header)?;
            widths.observe(col, name.chars().count());
        }
    }
    sheet.write_string_with_format(1, layout.status_col(), "Status", &formats.header)?;
    widths.observe(layout.status_col(), "Status".len());

    let mut row_num = HEADER_ROWS;
    for entry in display_order(result) {
        let left_format = formats.block(entry.status, true);
        let right_format = formats.block(entry.status, false);
        for (idx, column) in columns.iter().enumerate() {
            let left = entry.reference.as_ref().and_then(|r| cell_value(r, column));
            let len = write_cell(sheet, row_num, layout.left(idx), left, left_format)?;
            widths.observe(layout.left(idx), len);

            let right = entry.compare_to.as_ref().and_then(|r| cell_value(r, column));
            let len = write_cell(sheet, row_num, layout.right(idx), right, right_format)?;
            widths.observe(layout.right(idx), len);
        }
        let status = entry.status.as_str();
        sheet.write_string_with_format(row_num, layout.status_col(), status, formats.status(entry.status))?;
        row_num += 1;
    }

    sheet.set_freeze_panes(HEADER_ROWS, 0)?;
    let last_row = row_num.saturating_sub(1).max(1);
    sheet.autofilter(1, 0, last_row, layout.last_col())?;
    widths.apply(sheet)?;
    Ok(())
}

fn cell_value<'r>(row: &'r Row, column: &str) -> Option<&'r Value> {
    row.get(column)
}

/// Write one cell, returning the rendered text length
fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: Option<&Value>, format: &Format) -> Result<usize> {
    match value {
        None | Some(Value::Null) => {
            sheet.write_blank(row, col, format)?;
            Ok(0)
        }
        Some(Value::Bool(b)) => {
            sheet.write_boolean_with_format(row, col, *b, format)?;
            Ok(if *b { 4 } else { 5 })
        }
        Some(Value::Number(n)) => {
            sheet.write_number_with_format(row, col, n.as_f64(), format)?;
            Ok(n.to_string().chars().count())
        }
        Some(Value::String(s)) => {
            sheet.write_string_with_format(row, col, s, format)?;
            Ok(s.chars().count())
        }
    }
}
