//! Command-line interface for tabcompare

use crate::compare::{ComparisonConfig, KeyOrder};
use crate::data::LoadOptions;
use crate::matcher::KeySpec;
use crate::reference::ReferencePolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tabcompare")]
#[command(about = "Compare two tables by key and write DELETED / INSERTED / UPDATED / COMBINED views")]
#[command(version)]
pub struct Cli {
    /// First input file (csv, tsv, txt, parquet, json)
    pub a: PathBuf,

    /// Second input file
    pub b: PathBuf,

    /// Comma separated key columns (default: all columns)
    #[arg(long)]
    pub key: Option<String>,

    /// Name for output files and the default output directory
    #[arg(long)]
    pub name: String,

    /// Output directory (default: value of --name)
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Filename prefix for outputs
    #[arg(long, default_value = "diff")]
    pub prefix: String,

    /// Also write a plain-text report
    #[arg(long)]
    pub report: bool,

    /// Also write a side-by-side Excel workbook
    #[arg(long)]
    pub excel: bool,

    /// Print and write a JSON summary
    #[arg(long)]
    pub json: bool,

    /// Always use the first file as reference, even when it is smaller
    #[arg(long)]
    pub no_swap: bool,

    /// Order output rows by key instead of file order
    #[arg(long)]
    pub sort_by_key: bool,

    /// Keep leading and trailing whitespace in string values
    #[arg(long)]
    pub no_trim: bool,

    /// Read every column as text
    #[arg(long)]
    pub all_varchar: bool,

    /// Field delimiter for delimited text files ("tab" or "\t" for tabs)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Rows shown in the input preview
    #[arg(long, default_value = "10")]
    pub preview_rows: usize,

    /// Quiet output (machine-readable)
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// How results are printed to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
    Quiet,
}

impl Cli {
    pub fn key_spec(&self) -> KeySpec {
        self.key.as_deref().map(KeySpec::parse).unwrap_or_default()
    }

    pub fn comparison_config(&self) -> ComparisonConfig {
        ComparisonConfig::new()
            .with_key_columns(self.key_spec())
            .with_trim_strings(!self.no_trim)
            .with_reference_policy(if self.no_swap {
                ReferencePolicy::FirstArgument
            } else {
                ReferencePolicy::LargerTable
            })
            .with_key_order(if self.sort_by_key {
                KeyOrder::SortedByKey
            } else {
                KeyOrder::SourceOrder
            })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            all_varchar: self.all_varchar,
            delimiter: self.delimiter,
            sample_rows: self.preview_rows,
        }
    }

    /// `--outdir`, falling back to `--name`
    pub fn outdir(&self) -> PathBuf {
        self.outdir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name))
    }

    /// Quiet wins over JSON
    pub fn output_format(&self) -> OutputFormat {
        if self.quiet {
            OutputFormat::Quiet
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Pretty
        }
    }
}

/// Parse a single-character delimiter
fn parse_delimiter(s: &str) -> Result<char, String> {
    match s {
        "tab" | "\\t" | "\t" => return Ok('\t'),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '\n' && c != '"' => Ok(c),
        _ => Err(format!(
            "Invalid delimiter: '{}'. Must be a single character.",
            s
        )),
    }
}
