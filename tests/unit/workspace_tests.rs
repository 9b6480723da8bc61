//! Unit tests for output workspace layout

use std::fs;
use tabcompare::workspace::{OutputKind, OutputWorkspace};
use tempfile::TempDir;

#[test]
fn test_workspace_paths_use_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = OutputWorkspace::new(temp_dir.path(), "inventory").unwrap();

    assert_eq!(workspace.deleted_path(), temp_dir.path().join("inventory_deleted.csv"));
    assert_eq!(workspace.inserted_path(), temp_dir.path().join("inventory_inserted.csv"));
    assert_eq!(workspace.updated_path(), temp_dir.path().join("inventory_updated.csv"));
    assert_eq!(workspace.combined_path(), temp_dir.path().join("inventory_combined.csv"));
    assert_eq!(workspace.report_path(), temp_dir.path().join("inventory_report.txt"));
    assert_eq!(workspace.excel_path(), temp_dir.path().join("inventory_comparison.xlsx"));
    assert_eq!(workspace.summary_path(), temp_dir.path().join("inventory_summary.json"));
}

#[test]
fn test_workspace_new_does_not_touch_disk() {
    let temp_dir = TempDir::new().unwrap();
    let outdir = temp_dir.path().join("later");
    let workspace = OutputWorkspace::new(&outdir, "diff").unwrap();
    assert!(!outdir.exists());
    assert_eq!(workspace.outdir(), outdir.as_path());
}

#[test]
fn test_workspace_create_makes_nested_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let outdir = temp_dir.path().join("a").join("b").join("c");
    OutputWorkspace::create(&outdir, "diff").unwrap();
    assert!(outdir.is_dir());
}

#[test]
fn test_workspace_create_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let outdir = temp_dir.path().join("out");
    OutputWorkspace::create(&outdir, "diff").unwrap();
    OutputWorkspace::create(&outdir, "diff").unwrap();
    assert!(outdir.is_dir());
}

#[test]
fn test_workspace_rejects_bad_prefixes() {
    let temp_dir = TempDir::new().unwrap();
    assert!(OutputWorkspace::new(temp_dir.path(), "").is_err());
    assert!(OutputWorkspace::new(temp_dir.path(), "   ").is_err());
    assert!(OutputWorkspace::new(temp_dir.path(), "a/b").is_err());
    assert!(OutputWorkspace::new(temp_dir.path(), "a\\b").is_err());
}

#[test]
fn test_workspace_existing_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = OutputWorkspace::create(temp_dir.path(), "diff").unwrap();
    assert!(workspace.existing_outputs().is_empty());

    fs::write(workspace.path(OutputKind::Combined), "id,status\n").unwrap();
    fs::write(workspace.path(OutputKind::Report), "report").unwrap();
    fs::write(temp_dir.path().join("unrelated.csv"), "x").unwrap();

    let existing = workspace.existing_outputs();
    assert_eq!(existing.len(), 2);
    assert!(existing.contains(&workspace.combined_path()));
    assert!(existing.contains(&workspace.report_path()));
}

#[test]
fn test_output_kinds_are_distinct() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = OutputWorkspace::new(temp_dir.path(), "diff").unwrap();
    let mut paths: Vec<_> = OutputKind::ALL.iter().map(|k| workspace.path(*k)).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), OutputKind::ALL.len());
}
