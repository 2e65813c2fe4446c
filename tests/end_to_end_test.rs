//! Integration tests for the full run: discover, merge, validate, write

use email_validator_rs::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_full_run_over_csv_inputs() {
    let temp_dir = TempDir::new().unwrap();
    write_csv(&temp_dir, "1_first.csv", "Email,Name\nalice@x.com,Alice\nbob@x.com,Bob\nbob@x.com,Bob\n");
    write_csv(&temp_dir, "2_second.csv", "Email\nbob@x.com\ncarol\n");
    // Leftover from an earlier run, must not become an input
    write_csv(&temp_dir, "1_first_updated.csv", "Email,Name,Status\n");

    let files = collect_spreadsheet_files(temp_dir.path(), false).unwrap();
    assert_eq!(files.len(), 2);

    let (record_sets, mut map) = merge_files(&files).unwrap();
    let summary = ValidationPipeline::new(&SyntaxVerifier).run(&mut map);
    assert_eq!(summary.checked, 3);

    for set in &record_sets {
        write_annotated_copy(set, &map, &annotated_path(&set.source)).unwrap();
    }
    let summary_path = temp_dir.path().join("validated_emails.csv");
    write_summary(&map, &summary_path).unwrap();

    let first = fs::read_to_string(temp_dir.path().join("1_first_updated.csv")).unwrap();
    assert_eq!(
        first,
        "Email,Name,Status\n\
         alice@x.com,Alice,Valid\n\
         bob@x.com,Bob,\"Valid, Was in file 1\"\n\
         bob@x.com,Bob,\"Valid, Was in file 1\"\n"
    );

    let second = fs::read_to_string(temp_dir.path().join("2_second_updated.csv")).unwrap();
    assert_eq!(
        second,
        "Email,Status\n\
         bob@x.com,\"Valid, Was in file 1\"\n\
         carol,Invalid\n"
    );

    let table = read_record_set(&summary_path).unwrap();
    assert_eq!(table.headers, vec!["Email", "Status"]);
    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["alice@x.com", "bob@x.com", "carol"]);
}

#[test]
fn test_xlsx_annotated_copy_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("list.xlsx");
    let set = RecordSet::new(
        &source,
        vec!["Email".into(), "Score".into()],
        vec![vec!["a@x.com".into(), "10".into()], vec!["b@".into(), "".into()]],
    );
    let mut map = merge(std::slice::from_ref(&set));
    ValidationPipeline::new(&SyntaxVerifier).run(&mut map);

    let out = annotated_path(&source);
    write_annotated_copy(&set, &map, &out).unwrap();

    let copy = read_record_set(&out).unwrap();
    assert_eq!(copy.headers, vec!["Email", "Score", "Status"]);
    assert_eq!(copy.rows[0], vec!["a@x.com", "10", "Valid"]);
    assert_eq!(copy.rows[1], vec!["b@", "", "Invalid"]);
}

#[test]
fn test_missing_input_aborts_before_any_output() {
    let temp_dir = TempDir::new().unwrap();
    let present = write_csv(&temp_dir, "present.csv", "Email\na@x.com\n");
    let missing = temp_dir.path().join("missing.xlsx");

    let result = merge_files(&[present, missing.clone()]);

    match result {
        Err(Error::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected NotFound, got {:?}", other.map(|(_, m)| m.len())),
    }
    assert!(!temp_dir.path().join("present_updated.csv").exists());
}

#[test]
fn test_explicit_file_order_sets_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_csv(&temp_dir, "a.csv", "Email\nshared@x.com\n");
    let b = write_csv(&temp_dir, "b.csv", "Email\nshared@x.com\n");

    let (_, map) = merge_files(&[b, a]).unwrap();
    assert_eq!(map.get("shared@x.com").unwrap().origin_index(), 0);
    assert_eq!(map.status_text("shared@x.com"), "Not validated, Was in file 1");
}
