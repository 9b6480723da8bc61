//! Error types for tabcompare operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TabcompareError>;

#[derive(Error, Debug)]
pub enum TabcompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error(
        "Column mismatch: {}",
        describe_mismatch(first_name, second_name, only_in_first, only_in_second)
    )]
    SchemaMismatch {
        first_name: String,
        second_name: String,
        only_in_first: Vec<String>,
        only_in_second: Vec<String>,
    },

    #[error("Key columns not found: {}", columns.join(", "))]
    KeyColumnNotFound { columns: Vec<String> },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

fn describe_mismatch(first: &str, second: &str, only_in_first: &[String], only_in_second: &[String]) -> String {
    let mut parts = Vec::new();
    if !only_in_first.is_empty() {
        parts.push(format!(
            "columns in {} not in {}: [{}]",
            first,
            second,
            only_in_first.join(", ")
        ));
    }
    if !only_in_second.is_empty() {
        parts.push(format!(
            "columns in {} not in {}: [{}]",
            second,
            first,
            only_in_second.join(", ")
        ));
    }
    parts.join("; ")
}

impl TabcompareError {
    pub fn schema_mismatch(
        first_name: impl Into<String>,
        second_name: impl Into<String>,
        only_in_first: Vec<String>,
        only_in_second: Vec<String>,
    ) -> Self {
        Self::SchemaMismatch {
            first_name: first_name.into(),
            second_name: second_name.into(),
            only_in_first,
            only_in_second,
        }
    }

    pub fn key_column_not_found(columns: Vec<String>) -> Self {
        Self::KeyColumnNotFound { columns }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether the error was raised before any comparison work began
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. } | Self::KeyColumnNotFound { .. })
    }
}
