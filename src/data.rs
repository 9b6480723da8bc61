//! Table loading using DuckDB

use crate::error::{Result, TabcompareError};
use crate::table::{Number, Row, Table, Value};
use duckdb::types::ValueRef;
use duckdb::Connection;
use std::collections::HashMap;
use std::path::Path;

/// Options controlling how input files are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Read every column as text, skipping type inference
    pub all_varchar: bool,
    /// Field delimiter for delimited text; sniffed when unset
    pub delimiter: Option<char>,
    /// Rows shown in console previews
    pub sample_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            all_varchar: false,
            delimiter: None,
            sample_rows: 10,
        }
    }
}

/// Column name and DuckDB type as reported by `DESCRIBE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// How a column is projected out of DuckDB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Projection {
    Native,
    AsDouble,
    AsText,
}

/// Value family of a DuckDB type; columns shared by both inputs must agree on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    Boolean,
    Integer,
    Float,
    Text,
}

impl ColumnInfo {
    fn family(&self) -> TypeFamily {
        let ty = self.data_type.to_uppercase();
        match ty.as_str() {
            "BOOLEAN" => TypeFamily::Boolean,
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT" | "USMALLINT"
            | "UINTEGER" | "UBIGINT" => TypeFamily::Integer,
            "FLOAT" | "DOUBLE" => TypeFamily::Float,
            _ if ty.starts_with("DECIMAL") => TypeFamily::Float,
            _ => TypeFamily::Text,
        }
    }

    fn projection(&self) -> Projection {
        match self.family() {
            TypeFamily::Text => Projection::AsText,
            _ if self.data_type.to_uppercase().starts_with("DECIMAL") => Projection::AsDouble,
            _ => Projection::Native,
        }
    }

    fn select_expr(&self, projection: Projection) -> String {
        let ident = quote_ident(&self.name);
        match projection {
            Projection::Native => ident,
            Projection::AsDouble => format!("CAST({} AS DOUBLE) AS {}", ident, ident),
            Projection::AsText => format!("CAST({} AS VARCHAR) AS {}", ident, ident),
        }
    }
}

/// Loads tabular files into [`Table`]s through an in-memory DuckDB
pub struct DataProcessor {
    connection: Connection,
    options: LoadOptions,
}

impl DataProcessor {
    pub fn with_options(options: LoadOptions) -> Result<Self> {
        let connection = Connection::open_in_memory()?;

        connection.execute("SET enable_progress_bar=false", [])?;
        // row order is part of the comparison output
        connection.execute("SET preserve_insertion_order=true", [])?;

        Ok(Self { connection, options })
    }

    /// Load both inputs of a comparison.
    ///
    /// Type inference runs per file, so a shared column can come out as
    /// BIGINT in one file and VARCHAR in the other. Such columns are read
    /// with one common type from both files: DOUBLE when both sides are
    /// numeric, VARCHAR otherwise.
    pub fn load_pair(&self, first: &Path, second: &Path) -> Result<(Table, Table)> {
        let first_columns = self.open_view(first, "first_view")?;
        let second_columns = self.open_view(second, "second_view")?;
        let shared = reconcile_types(&first_columns, &second_columns);

        let first_table = self.read_view("first_view", first, table_name(first), &first_columns, &shared)?;
        let second_table = self.read_view("second_view", second, table_name(second), &second_columns, &shared)?;
        Ok((first_table, second_table))
    }

    /// Validate `file_path` and expose it as `view`; returns the view's columns
    fn open_view(&self, file_path: &Path, view: &str) -> Result<Vec<ColumnInfo>> {
        if !file_path.exists() {
            return Err(TabcompareError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }
        if !file_path.is_file() {
            return Err(TabcompareError::invalid_input(format!(
                "Not a file: {}",
                file_path.display()
            )));
        }
        if !Self::is_supported_format(file_path) {
            return Err(TabcompareError::invalid_input(format!(
                "Unsupported file format: {}",
                file_path.display()
            )));
        }

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}",
            quote_ident(view),
            self.source_expr(file_path)
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        self.get_column_info(view)
    }

    /// Read every row of `view`; `overrides` replaces the per-type projection by column name
    fn read_view(
        &self,
        view: &str,
        file_path: &Path,
        name: String,
        columns: &[ColumnInfo],
        overrides: &HashMap<String, Projection>,
    ) -> Result<Table> {
        let mut table = Table::new(name, columns.iter().map(|c| c.name.clone()).collect());
        if columns.is_empty() {
            return Ok(table);
        }

        let select_sql = format!(
            "SELECT {} FROM {}",
            columns
                .iter()
                .map(|c| {
                    let projection = overrides.get(&c.name).copied().unwrap_or_else(|| c.projection());
                    c.select_expr(projection)
                })
                .collect::<Vec<_>>()
                .join(", "),
            quote_ident(view)
        );
        let mut stmt = self
            .connection
            .prepare(&select_sql)
            .map_err(|e| convert_duckdb_error(e, file_path))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        while let Some(row) = rows.next().map_err(|e| convert_duckdb_error(e, file_path))? {
            let mut record = Row::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(|e| {
                    TabcompareError::data_processing(format!(
                        "Failed to read column '{}' of {}: {}",
                        column.name,
                        file_path.display(),
                        e
                    ))
                })?;
                record.insert(column.name.clone(), convert_value(value));
            }
            table.rows.push(record);
        }

        log::info!(
            "Loaded {} ({} rows, {} columns)",
            table.name,
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    /// `FROM` clause source for a file; delimited text goes through the CSV sniffer
    fn source_expr(&self, file_path: &Path) -> String {
        let path = quote_literal(&file_path.to_string_lossy());
        let extension = file_path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "tsv" | "txt" => {
                let mut args = vec![path, "header=true".to_string()];
                let delimiter = self
                    .options
                    .delimiter
                    .or(if extension == "tsv" { Some('\t') } else { None });
                if let Some(delim) = delimiter {
                    args.push(format!("delim={}", quote_literal(&delim.to_string())));
                }
                if self.options.all_varchar {
                    args.push("all_varchar=true".to_string());
                }
                format!("read_csv_auto({})", args.join(", "))
            }
            _ => path,
        }
    }

    /// Column names and types of a view, in file order
    fn get_column_info(&self, view: &str) -> Result<Vec<ColumnInfo>> {
        let describe_sql = format!("DESCRIBE {}", quote_ident(view));
        let mut stmt = self.connection.prepare(&describe_sql).map_err(|e| {
            TabcompareError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get::<_, String>(0)?,
                    data_type: row.get::<_, String>(1)?,
                })
            })
            .map_err(|e| TabcompareError::data_processing(format!("Failed to query column info: {}", e)))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                TabcompareError::data_processing(format!("Failed to process column info row: {}", e))
            })?);
        }
        Ok(columns)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension().and_then(|s| s.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "csv" | "tsv" | "txt" | "parquet" | "json" | "jsonl"
            )
        } else {
            false
        }
    }
}

fn table_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string())
}

/// Common projections for columns whose type family differs between the inputs
fn reconcile_types(first: &[ColumnInfo], second: &[ColumnInfo]) -> HashMap<String, Projection> {
    let mut shared = HashMap::new();
    for left in first {
        let Some(right) = second.iter().find(|c| c.name == left.name) else {
            continue;
        };
        let (a, b) = (left.family(), right.family());
        if a == b {
            continue;
        }

        let numeric = |f: TypeFamily| matches!(f, TypeFamily::Integer | TypeFamily::Float);
        let projection = if numeric(a) && numeric(b) {
            Projection::AsDouble
        } else {
            Projection::AsText
        };
        log::debug!(
            "Column '{}' is {} in one input and {} in the other; reading both as {}",
            left.name,
            left.data_type,
            right.data_type,
            if projection == Projection::AsDouble { "DOUBLE" } else { "VARCHAR" }
        );
        shared.insert(left.name.clone(), projection);
    }
    shared
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::from(i64::from(i)),
        ValueRef::SmallInt(i) => Value::from(i64::from(i)),
        ValueRef::Int(i) => Value::from(i64::from(i)),
        ValueRef::BigInt(i) => Value::from(i),
        ValueRef::HugeInt(i) => match i64::try_from(i) {
            Ok(v) => Value::from(v),
            Err(_) => Value::Number(Number::Float(i as f64)),
        },
        ValueRef::UTinyInt(i) => Value::from(i64::from(i)),
        ValueRef::USmallInt(i) => Value::from(i64::from(i)),
        ValueRef::UInt(i) => Value::from(i64::from(i)),
        ValueRef::UBigInt(i) => match i64::try_from(i) {
            Ok(v) => Value::from(v),
            Err(_) => Value::Number(Number::Float(i as f64)),
        },
        ValueRef::Float(f) => Value::from(f64::from(f)),
        ValueRef::Double(f) => Value::from(f),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::String(format!("<blob:{} bytes>", b.len())),
        // everything else is projected to VARCHAR before it gets here
        other => Value::String(format!("{:?}", other)),
    }
}

/// Map DuckDB errors onto input errors where the cause is the file itself
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> TabcompareError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        TabcompareError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("JSON") {
        TabcompareError::invalid_input(format!(
            "Malformed JSON file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        TabcompareError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        TabcompareError::invalid_input(format!(
            "Permission denied accessing file: {}",
            file_path.display()
        ))
    } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
        TabcompareError::invalid_input(format!(
            "File encoding error '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else {
        TabcompareError::DuckDb(error)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
