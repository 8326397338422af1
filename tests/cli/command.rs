use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn write_source(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("program.ziv");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn no_subcommand_reports_usage_error() {
    let mut cmd = Command::cargo_bin("ziv").unwrap();
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: No command specified"));
}

#[test]
fn valid_function_exits_successfully() {
    let (_dir, path) = write_source("fn add(a: int, b: int) -> int:\n    return a + b\n");

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn dump_tree_prints_function_decl() {
    let (_dir, path) = write_source("fn add(a: int, b: int) -> int:\n    return a + b\n");

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .arg("--dump-tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("FunctionDecl"));
}

#[test]
fn dump_lexer_prints_tokens() {
    let (_dir, path) = write_source("let x: int = 1;\n");

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .arg("--lexer")
        .assert()
        .success()
        .stdout(predicate::str::contains("Let"));
}

#[test]
fn rejected_file_extension_exits_with_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("program.txt");
    fs::write(&path, "let x: int = 1;\n").unwrap();

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no buffer"));
}

#[test]
fn unterminated_string_exits_with_failure() {
    let (_dir, path) = write_source("let s: string = \"hi\n");

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn duplicate_declaration_exits_with_failure() {
    let (_dir, path) = write_source("let x: int = 1;\nlet x: int = 2;\n");

    Command::cargo_bin("ziv")
        .unwrap()
        .arg("toolchain")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ZIV-2001"));
}
