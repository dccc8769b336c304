// Integration tests for the gridedit binary.
// Run with: cargo test -p gridedit-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs gridedit with a settings path that does not exist, so every test
/// sees default settings and nothing is written to the user's config dir.
fn gridedit(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gridedit"));
    cmd.current_dir(dir);
    cmd.arg("--config").arg(dir.join("no-settings.json"));
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    gridedit(dir).args(args).output().expect("run gridedit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn fruit_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("fruit.csv");
    fs::write(&path, "Name,Qty\napple,3\ncat,5\ncategory,7\n").unwrap();
    path
}

fn read_csv(path: &Path) -> String {
    fs::read_to_string(path).unwrap().trim_start_matches('\u{feff}').to_string()
}

// ---------------------------------------------------------------------------
// new / show / convert
// ---------------------------------------------------------------------------

#[test]
fn new_writes_blank_table_with_default_size() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["new", "blank.csv"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(read_csv(&dir.path().join("blank.csv")), "A,B\n,\n,\n");
}

#[test]
fn new_respects_size_flags() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["new", "wide.md", "--rows", "1", "--cols", "3"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let shown = run(dir.path(), &["show", "wide.md", "--json"]);
    assert!(shown.status.success(), "{}", stderr(&shown));
    let table: serde_json::Value = serde_json::from_str(&stdout(&shown)).expect("valid JSON");
    assert_eq!(table["columns"], serde_json::json!(["A", "B", "C"]));
    assert_eq!(table["row_ids"], serde_json::json!([0]));
}

#[test]
fn show_prints_row_ids() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["show", "fruit.csv"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("| #   | Name     | Qty |\n"), "{}", text);
    assert!(text.contains("| 2   | category | 7   |"), "{}", text);
}

#[test]
fn convert_csv_to_json_coerces_numbers() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["convert", "fruit.csv", "fruit.json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("fruit.json")).unwrap()).unwrap();
    assert_eq!(json[0]["Name"], "apple");
    assert_eq!(json[0]["Qty"], 3);
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[test]
fn unsupported_format_is_usage_error() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["convert", "fruit.csv", "fruit.docx"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["show", "nope.csv"]);
    assert_eq!(output.status.code(), Some(3));
}

// ---------------------------------------------------------------------------
// find / replace
// ---------------------------------------------------------------------------

#[test]
fn find_reports_first_match() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["find", "fruit.csv", "cat"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Name[1]\n");
}

#[test]
fn find_all_lists_matches_in_row_order() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["find", "fruit.csv", "cat", "--all"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Name[1]\nName[2]\n");
}

#[test]
fn find_without_match_exits_not_found() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["find", "fruit.csv", "pear"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn find_header_fuzzy() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["find", "fruit.csv", "Naem", "--header", "columns", "--fuzzy"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "0\tName\n");
}

#[test]
fn replace_all_counts_cells_and_saves() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    let output = run(dir.path(), &["replace", "fruit.csv", "cat", "dog"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("replaced 2 cell(s)"));
    assert_eq!(read_csv(&path), "Name,Qty\napple,3\ndog,5\ndogegory,7\n");
}

#[test]
fn replace_without_match_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    let before = fs::read(&path).unwrap();
    let output = run(dir.path(), &["replace", "fruit.csv", "pear", "plum"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("replaced 0 cell(s)"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn stats_fits_a_line() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xy.csv"), "x,y\n1,3\n2,5\n3,7\n").unwrap();

    let output = run(dir.path(), &["stats", "xy.csv", "x", "y"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("pearson:     1.0000"), "{}", text);
    assert!(text.contains("y = 2.0000*x + 1.0000"), "{}", text);

    let output = run(dir.path(), &["stats", "xy.csv", "x", "y", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["points"], 3);
    assert!((json["linear"]["a"].as_f64().unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn stats_unknown_column_exits_not_found() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    let output = run(dir.path(), &["stats", "fruit.csv", "Qty", "Weight"]);
    assert_eq!(output.status.code(), Some(5));
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

#[test]
fn apply_runs_ops_with_undo() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    fs::write(
        dir.path().join("ops.jsonl"),
        r#"{"op": "edit", "row": 0, "col": 2, "value": "9"}
{"op": "undo"}
{"op": "edit", "row": 1, "col": 1, "value": "cow"}
{"op": "insert_row", "row": 2, "placement": "below"}
"#,
    )
    .unwrap();

    let output = run(dir.path(), &["apply", "fruit.csv", "ops.jsonl"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let report = stdout(&output);
    assert!(report.contains("2: undo: Edit cell"), "{}", report);
    assert_eq!(read_csv(&path), "A,B\napple,3\ncow,5\ncategory,7\n,\n");
}

#[test]
fn apply_dry_run_does_not_save() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    fs::write(dir.path().join("ops.json"), r#"[{"op": "replace_all", "find": "a", "replace": "A"}]"#).unwrap();

    let output = run(dir.path(), &["apply", "fruit.csv", "ops.json", "--dry-run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("| 0   | Apple    | 3   |"));
    assert_eq!(read_csv(&path), "Name,Qty\napple,3\ncat,5\ncategory,7\n");
}

#[test]
fn apply_delete_column_needs_yes() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    fs::write(dir.path().join("ops.jsonl"), "{\"op\": \"delete_column\", \"name\": \"Qty\"}\n").unwrap();

    let refused = run(dir.path(), &["apply", "fruit.csv", "ops.jsonl"]);
    assert_eq!(refused.status.code(), Some(2));
    assert!(stderr(&refused).contains("--yes"));
    assert_eq!(read_csv(&path), "Name,Qty\napple,3\ncat,5\ncategory,7\n");

    let output = run(dir.path(), &["--yes", "apply", "fruit.csv", "ops.jsonl"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(read_csv(&path), "A\napple\ncat\ncategory\n");
}

#[test]
fn apply_rejected_op_saves_nothing() {
    let dir = TempDir::new().unwrap();
    let path = fruit_csv(&dir);
    fs::write(
        dir.path().join("ops.jsonl"),
        r#"{"op": "edit", "row": 0, "col": 1, "value": "pear"}
{"op": "edit", "row": 42, "col": 1, "value": "plum"}
"#,
    )
    .unwrap();

    let output = run(dir.path(), &["apply", "fruit.csv", "ops.jsonl"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("op 2:"), "{}", stderr(&output));
    assert_eq!(read_csv(&path), "Name,Qty\napple,3\ncat,5\ncategory,7\n");
}

#[test]
fn apply_bad_script_names_line() {
    let dir = TempDir::new().unwrap();
    fruit_csv(&dir);
    fs::write(dir.path().join("ops.jsonl"), "{\"op\": \"undo\"}\nnot json\n").unwrap();

    let output = run(dir.path(), &["apply", "fruit.csv", "ops.jsonl"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("line 2:"));
}
