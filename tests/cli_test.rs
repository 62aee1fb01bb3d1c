//! CLI tests for the plsqlfmt binary

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const QUERY: &str = "SELECT a, b FROM t WHERE x = 1;\n";
const FORMATTED: &str = "select a,\n       b\n  from t\n where x = 1;\n";

#[test]
fn test_formats_directory_in_place() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("q.sql");
    fs::write(&file, QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg(dir.path())
        .assert()
        .success()
        .stdout(format!(
            "Formatting file 1 of 1: {}... done.\n",
            file.display()
        ));
    assert_eq!(fs::read_to_string(&file).unwrap(), FORMATTED);
}

#[test]
fn test_quiet_prints_no_report() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("q.sql"), QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg("-q").arg(dir.path()).assert().success().stdout("");
    assert_eq!(fs::read_to_string(dir.path().join("q.sql")).unwrap(), FORMATTED);
}

#[test]
fn test_syntax_error_is_reported_and_run_continues() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.sql"), "select a from;\n").unwrap();
    fs::write(dir.path().join("b.sql"), QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "a.sql... Syntax Error at line 1, column 14\n\nselect a from;\n             ^\n\nExpected: ",
        ))
        .stdout(predicate::str::contains("Formatting file 2 of 2: "))
        .stdout(predicate::str::contains("b.sql... done.\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.sql")).unwrap(),
        "select a from;\n"
    );
}

#[test]
fn test_ext_and_mext_filters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.pkb"), QUERY).unwrap();
    fs::write(dir.path().join("b.sql"), QUERY).unwrap();
    fs::write(dir.path().join("c.md"), "```sql\nSELECT 1 FROM dual;\n```\n").unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.args(["--ext", "pkb", "--mext", ""])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatting file 1 of 1: "))
        .stdout(predicate::str::contains("a.pkb... done."));
    assert_eq!(fs::read_to_string(dir.path().join("b.sql")).unwrap(), QUERY);
}

#[test]
fn test_expanded_style_flag() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("q.sql");
    fs::write(&file, QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.args(["--style", "expanded", "-q"])
        .arg(&file)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "SELECT\n    a,\n    b\nFROM\n    t\nWHERE\n    x = 1;\n"
    );
}

#[test]
fn test_config_file_is_discovered() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("plsqlfmt.toml"), "style = \"embedded\"\nexclude = [\"skip*\"]\n").unwrap();
    fs::write(dir.path().join("q.sql"), QUERY).unwrap();
    fs::write(dir.path().join("skip.sql"), QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg("-q").arg(dir.path()).assert().success();
    assert_eq!(
        fs::read_to_string(dir.path().join("q.sql")).unwrap(),
        "SELECT a,\n       b\n  FROM t\n WHERE x = 1;\n"
    );
    assert_eq!(fs::read_to_string(dir.path().join("skip.sql")).unwrap(), QUERY);
}

#[test]
fn test_missing_grammar_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("q.sql"), QUERY).unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.args(["--grammar", "does/not/exist.toml"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::starts_with("Error: "));
    assert_eq!(fs::read_to_string(dir.path().join("q.sql")).unwrap(), QUERY);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: I/O error"));
}

#[test]
fn test_stdin_to_stdout() {
    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg("-")
        .write_stdin(QUERY)
        .assert()
        .success()
        .stdout(FORMATTED);
}

#[test]
fn test_stdin_syntax_error() {
    let mut cmd = cargo_bin_cmd!("plsqlfmt");
    cmd.arg("-")
        .write_stdin("begin\n  null\nend;\n")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Syntax Error at line 3, column 1"));
}
