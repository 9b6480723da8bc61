//! Functional tests for key-based classification

use crate::common::{assertions, sample_data, CliTestRunner};
use tabcompare::{compare_tables, ComparisonConfig, KeySpec, RowStatus, Table, TabcompareError, Value};

fn id_val_table(name: &str, rows: &[(i64, &str)]) -> Table {
    Table::from_records(
        name,
        &["id", "val"],
        rows.iter()
            .map(|(id, val)| vec![Value::from(*id), Value::from(*val)])
            .collect(),
    )
    .unwrap()
}

fn by_id() -> ComparisonConfig {
    ComparisonConfig::new().with_key_columns(KeySpec::parse("id"))
}

fn statuses(result: &tabcompare::ComparisonResult) -> Vec<RowStatus> {
    result.combined.iter().map(|e| e.status).collect()
}

#[test]
fn test_single_deleted_and_inserted_key() {
    let reference = id_val_table("a", &[(1, "a"), (2, "b")]);
    let compare_to = id_val_table("b", &[(1, "a"), (3, "c")]);

    let result = compare_tables(&reference, &compare_to, &by_id()).unwrap();

    assert_eq!(result.deleted.len(), 1);
    assert_eq!(result.deleted[0]["id"], Value::from(2));
    assert_eq!(result.deleted[0]["val"], Value::from("b"));
    assert_eq!(result.inserted.len(), 1);
    assert_eq!(result.inserted[0]["id"], Value::from(3));
    assert!(result.updated.is_empty());
    assert_eq!(
        statuses(&result),
        vec![RowStatus::Same, RowStatus::Deleted, RowStatus::Inserted]
    );
}

#[test]
fn test_trailing_space_trimmed_but_case_kept() {
    let reference = id_val_table("a", &[(1, "a"), (2, "b")]);
    let compare_to = id_val_table("b", &[(1, "A "), (2, "b")]);

    let result = compare_tables(&reference, &compare_to, &by_id()).unwrap();

    assert_eq!(result.updated.len(), 1);
    let update = &result.updated[0];
    assert_eq!(update.changed_columns(), vec!["val"]);
    assert_eq!(update.changes[0].old, Value::from("a"));
    assert_eq!(update.changes[0].new, Value::from("A"));
    assert_eq!(result.combined[0].status, RowStatus::Updated);
    assert_eq!(result.combined[0].changed_columns, vec!["val".to_string()]);
}

#[test]
fn test_identical_tables_without_key() {
    let table = id_val_table("a", &[(1, "a"), (2, "b"), (3, "c")]);
    let copy = Table {
        name: "b".to_string(),
        ..table.clone()
    };

    let result = compare_tables(&table, &copy, &ComparisonConfig::new()).unwrap();

    assert!(result.metadata.key_defaulted_to_all_columns);
    assert_eq!(result.metadata.key_columns, vec!["id", "val"]);
    assert_eq!(result.same_count(), 3);
    assert!(!result.has_changes());
}

#[test]
fn test_duplicate_reference_key_last_row_wins() {
    let reference = id_val_table("a", &[(1, "x"), (1, "y"), (2, "b")]);
    let compare_to = id_val_table("b", &[(1, "y"), (2, "b")]);

    let result = compare_tables(&reference, &compare_to, &by_id()).unwrap();

    assert!(result.metadata.duplicate_key_count() >= 1);
    assert!(result.has_duplicate_keys());
    assert_eq!(result.combined.len(), 2);
    assert_eq!(result.combined[0].status, RowStatus::Same);
    assert_eq!(
        result.combined[0].reference.as_ref().unwrap()["val"],
        Value::from("y")
    );
}

#[test]
fn test_empty_compare_to_table() {
    let reference = id_val_table("a", &[(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")]);
    let compare_to = Table::new("b", vec!["id".to_string(), "val".to_string()]);

    let result = compare_tables(&reference, &compare_to, &by_id()).unwrap();

    assert_eq!(result.deleted.len(), 5);
    assert!(result.inserted.is_empty());
    assert!(result.updated.is_empty());
    assert_eq!(result.combined.len(), 5);
}

#[test]
fn test_empty_first_argument_is_swapped_out() {
    let empty = Table::new("a", vec!["id".to_string(), "val".to_string()]);
    let full = id_val_table("b", &[(1, "a"), (2, "b")]);

    let result = compare_tables(&empty, &full, &by_id()).unwrap();

    assert!(result.metadata.swapped);
    assert_eq!(result.metadata.reference_name, "b");
    assert_eq!(result.deleted.len(), 2);
    assert!(result.inserted.is_empty());
}

#[test]
fn test_both_tables_empty() {
    let a = Table::new("a", vec!["id".to_string()]);
    let b = Table::new("b", vec!["id".to_string()]);

    let result = compare_tables(&a, &b, &by_id()).unwrap();

    assert!(result.combined.is_empty());
    assert_eq!(result.metadata.distinct_keys, 0);
}

#[test]
fn test_column_order_does_not_matter() {
    let a = id_val_table("a", &[(1, "a")]);
    let b = Table::from_records("b", &["val", "id"], vec![vec![Value::from("a"), Value::from(1)]]).unwrap();

    let result = compare_tables(&a, &b, &by_id()).unwrap();

    assert_eq!(result.same_count(), 1);
    assert_eq!(result.metadata.columns, vec!["id", "val"]);
}

#[test]
fn test_schema_mismatch_lists_both_sides() {
    let a = Table::from_records("a", &["id", "old_col"], vec![vec![1, 2]]).unwrap();
    let b = Table::from_records("b", &["id", "new_col"], vec![vec![1, 2]]).unwrap();

    match compare_tables(&a, &b, &by_id()) {
        Err(TabcompareError::SchemaMismatch {
            first_name,
            only_in_first,
            only_in_second,
            ..
        }) => {
            assert_eq!(first_name, "a");
            assert_eq!(only_in_first, vec!["old_col"]);
            assert_eq!(only_in_second, vec!["new_col"]);
        }
        other => panic!("Expected schema mismatch, got {:?}", other.map(|r| r.counts())),
    }
}

#[test]
fn test_missing_key_column_is_fatal() {
    let a = id_val_table("a", &[(1, "a")]);
    let b = id_val_table("b", &[(1, "a")]);

    let err = compare_tables(&a, &b, &ComparisonConfig::new().with_key_columns(KeySpec::parse("id, snapshot")))
        .unwrap_err();
    assert!(matches!(err, TabcompareError::KeyColumnNotFound { .. }));
    assert!(err.to_string().contains("snapshot"));
}

#[test]
fn test_composite_key_from_files() {
    let runner = CliTestRunner::new().unwrap();
    let (first, second) = sample_data::inventory_pair();
    let a = runner.fixture().create_csv("before.csv", &first).unwrap();
    let b = runner.fixture().create_csv("after.csv", &second).unwrap();

    let outcome = runner.expect_success(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--name",
        "inventory",
        "--key",
        "snapshot,instance",
        "--quiet",
    ]);

    let counts = outcome.result.counts();
    assert_eq!(counts.same, 1);
    assert_eq!(counts.updated, 2);
    assert_eq!(counts.deleted, 1);
    assert_eq!(counts.inserted, 1);
    assert_eq!(outcome.result.metadata.reference_name, "before.csv");
    assert_eq!(outcome.result.metadata.compare_to_name, "after.csv");

    let combined = outcome.workspace.combined_path();
    assert_eq!(
        assertions::column(&combined, "status"),
        vec!["SAME", "UPDATED", "DELETED", "UPDATED", "INSERTED"]
    );
}

#[test]
fn test_larger_second_file_becomes_reference() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner
        .fixture()
        .create_csv("small.csv", &[vec!["id", "val"], vec!["1", "a"]])
        .unwrap();
    let b = runner
        .fixture()
        .create_csv("large.csv", &[vec!["id", "val"], vec!["1", "a"], vec!["2", "b"]])
        .unwrap();

    let outcome = runner.expect_success(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "-q"]);
    assert!(outcome.result.metadata.swapped);
    assert_eq!(outcome.result.metadata.reference_name, "large.csv");
    assert_eq!(outcome.result.deleted.len(), 1);

    let pinned = runner.expect_success(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--name",
        "x",
        "--no-swap",
        "-q",
    ]);
    assert!(!pinned.result.metadata.swapped);
    assert_eq!(pinned.result.inserted.len(), 1);
}

#[test]
fn test_numbers_compare_by_value_across_files() {
    let runner = CliTestRunner::new().unwrap();
    let (first, _) = sample_data::basic_pair();
    let a = runner.fixture().create_csv("ints.csv", &first).unwrap();
    let b = runner
        .fixture()
        .create_csv_raw("floats.csv", "id,val\n1.0,a\n2.0,b\n")
        .unwrap();

    let outcome = runner.expect_success(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--name",
        "x",
        "--key",
        "id",
        "-q",
    ]);
    assert_eq!(outcome.result.same_count(), 2);
}

#[test]
fn test_all_varchar_keeps_text_distinct() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_csv_raw("a.csv", "id,amount\n1,10\n").unwrap();
    let b = runner.fixture().create_csv_raw("b.csv", "id,amount\n1,10.0\n").unwrap();

    let typed = runner.expect_success(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "--key", "id", "-q"]);
    assert_eq!(typed.result.same_count(), 1);

    let text = runner.expect_success(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "--name",
        "x",
        "--key",
        "id",
        "--all-varchar",
        "-q",
    ]);
    assert_eq!(text.result.updated.len(), 1);
}

#[test]
fn test_value_column_typed_differently_per_file() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner.fixture().create_csv_raw("a.csv", "id,val\n1,10\n2,20\n").unwrap();
    let b = runner.fixture().create_csv_raw("b.csv", "id,val\n1,10\n2,n/a\n").unwrap();

    let outcome = runner.expect_success(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "--key", "id", "-q"]);
    assert_eq!(statuses(&outcome.result), vec![RowStatus::Same, RowStatus::Updated]);

    let update = &outcome.result.updated[0];
    assert_eq!(update.changed_columns(), vec!["val"]);
    assert_eq!(update.changes[0].old, Value::from("20"));
    assert_eq!(update.changes[0].new, Value::from("n/a"));
}

#[test]
fn test_key_column_typed_differently_per_file() {
    let runner = CliTestRunner::new().unwrap();
    let a = runner
        .fixture()
        .create_csv_raw("a.csv", "id,val\n1,x\n2,y\n3,z\n4,w\n")
        .unwrap();
    let b = runner
        .fixture()
        .create_csv_raw("b.csv", "id,val\n1,x\n2,y\nX9,q\n")
        .unwrap();

    let outcome = runner.expect_success(&[a.to_str().unwrap(), b.to_str().unwrap(), "--name", "x", "--key", "id", "-q"]);
    let counts = outcome.result.counts();
    assert_eq!(counts.same, 2);
    assert_eq!(counts.deleted, 2);
    assert_eq!(counts.inserted, 1);
    assert_eq!(outcome.result.combined[0].key.values()[0], Value::from("1"));
    assert_eq!(outcome.result.inserted[0]["id"], Value::from("X9"));
}
