// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Integration tests for the cfgtree binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cfgtree() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("cfgtree"))
}

fn fixtures() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app.yml"),
        "yml:\n  string: Evil_Wizard\n  array:\n    - 1\n    - 2\n    - 3\ndb:\n  host: localhost\n  port: 3306\n",
    )
    .unwrap();
    fs::write(dir.path().join("override.json"), r#"{"db": {"port": 5432, "user": "app"}}"#).unwrap();
    fs::write(
        dir.path().join("server.conf"),
        "ServerName example.org\n<ifModule dbgroup>\nDatabaseSlave primary 10.0.0.1\n</ifModule>\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_cli_version() {
    let mut cmd = cfgtree();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("cfgtree"));
}

#[test]
fn test_cli_help() {
    let mut cmd = cfgtree();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("has"))
        .stdout(predicate::str::contains("keys"))
        .stdout(predicate::str::contains("dump"));
}

#[test]
fn test_get_scalar_and_container() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["get", "app.yml", "yml.string"]);
    cmd.assert().success().stdout("Evil_Wizard\n");

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["get", "app.yml", "yml.array"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1").and(predicate::str::contains("3")));
}

#[test]
fn test_get_default_and_keys() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path())
        .args(["get", "app.yml", "db.password", "--default", "secret"]);
    cmd.assert().success().stdout("secret\n");

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["get", "app.yml", "nope"]);
    cmd.assert().success().stdout("false\n");

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path())
        .args(["get", "app.yml", "db", "--keys", "--output", "yaml"]);
    cmd.assert().success().stdout("- host\n- port\n");
}

#[test]
fn test_has_sets_exit_status() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["has", "app.yml", "db.host"]);
    cmd.assert().success().stdout(predicate::str::contains("✓"));

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["has", "app.yml", "db.password"]);
    cmd.assert().failure().stdout(predicate::str::contains("✗"));
}

#[test]
fn test_keys_lists_root_and_nested() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["keys", "app.yml"]);
    cmd.assert().success().stdout("yml\ndb\n");

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["keys", "app.yml", "yml.string"]);
    cmd.assert().failure().stderr(predicate::str::contains("Cannot descend"));
}

#[test]
fn test_dump_merges_left_to_right() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path())
        .args(["dump", "app.yml", "override.json", "--section", "db"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"host\": \"localhost\""))
        .stdout(predicate::str::contains("\"port\": 5432"))
        .stdout(predicate::str::contains("\"user\": \"app\""));
}

#[test]
fn test_conf_with_custom_separator() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args([
        "get",
        "server.conf",
        "dbgroup/database_slaves/10.0.0.1",
        "--separator",
        "/",
    ]);
    cmd.assert().success().stdout("primary\n");
}

#[test]
fn test_base_dir_and_format_override() {
    let dir = fixtures();
    fs::write(dir.path().join("settings.txt"), "name: from-text\n").unwrap();

    let mut cmd = cfgtree();
    cmd.args(["get", "settings.txt", "name", "--format", "yaml", "--base-dir"])
        .arg(dir.path());
    cmd.assert().success().stdout("from-text\n");
}

#[test]
fn test_missing_file_reports_error() {
    let dir = fixtures();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["get", "absent.yml", "a"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config source file"));
}

#[test]
fn test_unknown_extension_reports_parser_type() {
    let dir = fixtures();
    fs::write(dir.path().join("data.xml"), "<a/>").unwrap();

    let mut cmd = cfgtree();
    cmd.current_dir(dir.path()).args(["get", "data.xml", "a"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown parser type [xml]"));
}

#[cfg(unix)]
#[test]
fn test_cli_source_tolerates_non_utf8_arguments() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let mut cmd = cfgtree();
    cmd.args(["--format", "CLI", "get"])
        .arg(OsString::from_vec(b"/tmp/\xff\xfe.txt".to_vec()))
        .args(["format"]);
    cmd.assert().success().stdout("true\n");
}
