//! Edge case tests for filesystem scenarios

use crate::common::CliTestRunner;
use std::fs;
use tabcompare::TabcompareError;

fn runner_with_inputs() -> (CliTestRunner, String, String) {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_csv_raw("a.csv", "id,val\n1,a\n2,b\n").unwrap();
    let b = runner.fixture().create_csv_raw("b.csv", "id,val\n1,a\n3,c\n").unwrap();
    (runner, a.display().to_string(), b.display().to_string())
}

#[test]
fn test_nonexistent_input_file() {
    let (runner, a, _) = runner_with_inputs();
    let missing = runner.fixture().root().join("nope.csv");

    let err = runner.expect_failure(&[a.as_str(), missing.to_str().unwrap(), "--name", "x"]);
    assert!(matches!(err, TabcompareError::InvalidInput { .. }));
    assert!(err.to_string().contains("File not found"));
    assert!(!runner.fixture().outdir().exists());
}

#[test]
fn test_directory_as_input() {
    let (runner, a, _) = runner_with_inputs();
    let dir = runner.fixture().root().join("folder.csv");
    fs::create_dir(&dir).unwrap();

    let err = runner.expect_failure(&[a.as_str(), dir.to_str().unwrap(), "--name", "x"]);
    assert!(err.to_string().contains("Not a file"));
}

#[test]
fn test_empty_file() {
    let (runner, a, _) = runner_with_inputs();
    let empty = runner.fixture().create_csv_raw("empty.csv", "").unwrap();

    assert!(runner
        .run_command(&[a.as_str(), empty.to_str().unwrap(), "--name", "x", "-q"])
        .is_err());
    assert!(!runner.fixture().outdir().exists());
}

#[test]
fn test_outdir_is_a_file() {
    let (runner, a, b) = runner_with_inputs();
    let blocker = runner.fixture().create_csv_raw("blocker", "not a directory").unwrap();

    let err = runner.expect_failure(&[
        a.as_str(),
        b.as_str(),
        "--name",
        "x",
        "--outdir",
        blocker.to_str().unwrap(),
        "-q",
    ]);
    assert!(matches!(err, TabcompareError::Config { .. }));
}

#[test]
fn test_nested_outdir_is_created() {
    let (runner, a, b) = runner_with_inputs();
    let nested = runner.fixture().root().join("reports").join("2024").join("q1");

    let outcome = runner.expect_success(&[
        a.as_str(),
        b.as_str(),
        "--name",
        "x",
        "--outdir",
        nested.to_str().unwrap(),
        "-q",
    ]);
    assert!(nested.is_dir());
    assert!(outcome.workspace.combined_path().starts_with(&nested));
}

#[test]
fn test_invalid_prefix_fails_before_loading() {
    let runner = CliTestRunner::new().unwrap();
    let missing = runner.fixture().root().join("missing.csv");
    let missing = missing.to_str().unwrap();

    // the prefix is rejected even though the inputs do not exist
    let err = runner.expect_failure(&[missing, missing, "--name", "x", "--prefix", "a/b", "-q"]);
    assert!(matches!(err, TabcompareError::Config { .. }));
}

#[test]
fn test_schema_mismatch_writes_nothing() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_csv_raw("a.csv", "id,val\n1,a\n").unwrap();
    let b = runner.fixture().create_csv_raw("b.csv", "id,value\n1,a\n").unwrap();

    let err = runner.expect_failure(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "-q"]);
    assert!(matches!(err, TabcompareError::SchemaMismatch { .. }));
    assert!(err.is_precondition());
    assert!(!runner.fixture().outdir().exists());
}

#[test]
fn test_schema_mismatch_names_files_when_larger_input_comes_second() {
    let runner = CliTestRunner::new().unwrap();
    let small = runner
        .fixture()
        .create_csv_raw("small.csv", "id,val,extra\n1,a,x\n")
        .unwrap();
    let big = runner
        .fixture()
        .create_csv_raw("big.csv", "id,val\n1,a\n2,b\n3,c\n")
        .unwrap();

    let err = runner.expect_failure(&[small.to_str().unwrap(), big.to_str().unwrap(), "--name", "x", "-q"]);
    assert_eq!(
        err.to_string(),
        "Column mismatch: columns in small.csv not in big.csv: [extra]"
    );
}

#[test]
fn test_unknown_key_writes_nothing() {
    let (runner, a, b) = runner_with_inputs();

    let err = runner.expect_failure(&[a.as_str(), b.as_str(), "--name", "x", "--key", "uuid", "-q"]);
    assert!(matches!(err, TabcompareError::KeyColumnNotFound { .. }));
    assert!(!runner.fixture().outdir().exists());
}

#[test]
fn test_unicode_and_spaces_in_filenames() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner
        .fixture()
        .create_csv_raw("données clients.csv", "id,val\n1,a\n")
        .unwrap();
    let b = runner.fixture().create_csv_raw("новые.csv", "id,val\n1,b\n").unwrap();

    let outcome = runner.expect_success(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "--key", "id", "-q"]);
    assert_eq!(outcome.result.metadata.reference_name, "données clients.csv");
    assert_eq!(outcome.result.metadata.compare_to_name, "новые.csv");
    assert_eq!(outcome.result.updated.len(), 1);
}

#[test]
fn test_existing_outputs_are_replaced() {
    let (runner, a, b) = runner_with_inputs();
    let outdir = runner.fixture().outdir();
    fs::create_dir_all(&outdir).unwrap();
    fs::write(outdir.join("diff_deleted.csv"), "stale").unwrap();

    let outcome = runner.expect_success(&[a.as_str(), b.as_str(), "--name", "x", "--key", "id", "-q"]);
    let content = fs::read_to_string(outcome.workspace.deleted_path()).unwrap();
    assert!(content.starts_with("id,val"));
    assert!(!content.contains("stale"));
}

#[test]
fn test_unsupported_extension() {
    let (runner, a, _) = runner_with_inputs();
    let sheet = runner.fixture().create_csv_raw("book.xlsx", "id,val\n1,a\n").unwrap();

    let err = runner.expect_failure(&[a.as_str(), sheet.to_str().unwrap(), "--name", "x", "-q"]);
    assert!(err.to_string().contains("Unsupported file format"));
}
