//! # tabcompare
//!
//! Key-based comparison of two tabular datasets. Every key is classified as
//! SAME, UPDATED, DELETED or INSERTED, and the result is exposed as four
//! views plus run metadata, ready for CSV, text report, Excel or JSON output.

pub mod cli;
pub mod commands;
pub mod compare;
pub mod data;
pub mod differ;
pub mod error;
pub mod excel;
pub mod export;
pub mod hash;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod reference;
pub mod table;
pub mod workspace;

pub use compare::{compare_tables, ComparisonConfig, ComparisonResult, KeyOrder, RowStatus};
pub use error::{Result, TabcompareError};
pub use matcher::KeySpec;
pub use reference::ReferencePolicy;
pub use table::{Key, Row, Table, Value};
pub use workspace::OutputWorkspace;
