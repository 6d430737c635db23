//! End-to-end tests for the devtools binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("splice-devtools").unwrap()
}

const IMPORTS: &str = "import a\nimport b\n";

const IMPORTS_TREE: &str = r#"{
  "type": "module", "start": 0, "stop": 18,
  "children": [{
    "type": "import_list", "start": 0, "stop": 17,
    "children": [
      {"type": "import_statement", "start": 0, "stop": 8, "children": [
        {"type": "import", "start": 0, "stop": 6},
        {"type": "dotted_name", "field": "name", "start": 7, "stop": 8}
      ]},
      {"type": "import_statement", "start": 9, "stop": 17, "children": [
        {"type": "import", "start": 9, "stop": 15},
        {"type": "dotted_name", "field": "name", "start": 16, "stop": 17}
      ]}
    ]
  }]
}"#;

const BROKEN: &str = "x = 1\ny = (\n";

const BROKEN_TREE: &str = r#"{
  "type": "module", "start": 0, "stop": 12,
  "children": [
    {"type": "expression_statement", "start": 0, "stop": 5, "children": [
      {"type": "identifier", "start": 0, "stop": 1},
      {"type": "=", "start": 2, "stop": 3},
      {"type": "integer", "start": 4, "stop": 5}
    ]},
    {"type": "ERROR", "start": 6, "stop": 11}
  ]
}"#;

/// Write a source and its parse tree into a fresh directory
fn project(name: &str, source: &str, tree: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(name), source).unwrap();
    fs::write(dir.path().join("tree.json"), tree).unwrap();
    dir
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dump"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("lines"));
}

#[test]
fn test_dump_prints_the_tree() {
    let dir = project("app.py", IMPORTS, IMPORTS_TREE);
    cli()
        .current_dir(dir.path())
        .args(["dump", "app.py", "--tree", "tree.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<program 0.."))
        .stdout(predicate::str::contains("<import_list"))
        .stdout(predicate::str::contains("\"import\""));
}

#[test]
fn test_dump_json() {
    let dir = project("app.py", IMPORTS, IMPORTS_TREE);
    let output = cli()
        .current_dir(dir.path())
        .args(["dump", "app.py", "--tree", "tree.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let nodes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(nodes[0]["kind"], "program");
    assert_eq!(nodes.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_check_passes_on_clean_source() {
    let dir = project("app.py", IMPORTS, IMPORTS_TREE);
    cli()
        .current_dir(dir.path())
        .args(["check", "app.py", "--tree", "tree.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok:"));
}

#[test]
fn test_check_reports_syntax_errors() {
    let dir = project("broken.py", BROKEN, BROKEN_TREE);
    cli()
        .current_dir(dir.path())
        .args(["check", "broken.py", "--tree", "tree.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.py"))
        .stderr(predicate::str::contains("syntax error at line 2, column 1"));
}

#[test]
fn test_lines_lists_every_match() {
    let dir = project("app.py", IMPORTS, IMPORTS_TREE);
    cli()
        .current_dir(dir.path())
        .args(["lines", "app.py", "--tree", "tree.json", "--kind", "import_list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("import_list 0.."));
}

#[test]
fn test_lines_rejects_unknown_kind() {
    let dir = project("app.py", IMPORTS, IMPORTS_TREE);
    cli()
        .current_dir(dir.path())
        .args(["lines", "app.py", "--tree", "tree.json", "--kind", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown syntax kind"));
}

#[test]
fn test_language_must_be_inferable() {
    let dir = project("app.txt", IMPORTS, IMPORTS_TREE);
    cli()
        .current_dir(dir.path())
        .args(["dump", "app.txt", "--tree", "tree.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--language"));

    cli()
        .current_dir(dir.path())
        .args(["dump", "app.txt", "--tree", "tree.json", "--language", "python"])
        .assert()
        .success();
}

#[test]
fn test_missing_source_file() {
    let dir = TempDir::new().unwrap();
    cli()
        .current_dir(dir.path())
        .args(["check", "missing.py", "--tree", "tree.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
