#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &str = r#"{
    "children": [
        {"name": "network", "children": [
            {"name": "port", "value": 8080, "types": ["int"],
             "validators": [{"name": "Between", "params": [1, 65535]}],
             "params": {"display_name": "Port"}},
            {"name": "mode", "value": "tcp", "allowed": ["tcp", "udp"]}
        ]},
        {"name": "debug", "value": false}
    ]
}"#;

/// A temp directory holding `schema.json`, isolated from any user config.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("schema.json"), SCHEMA).unwrap();
        Self { temp }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// `settree` run inside the workspace, without a schema flag.
    fn bare_cmd(&self) -> Command {
        let home = self.path("home");
        let mut cmd = Command::new(cargo_bin("settree"));
        cmd.current_dir(self.temp.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("SETTREE_SCHEMA")
            .env_remove("SETTREE_VALUES")
            .env_remove("SETTREE_FORMAT")
            .env_remove("SETTREE_LOG");
        cmd
    }

    /// `settree --schema schema.json --values values.json`.
    fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.args(["--schema", "schema.json", "--values", "values.json"]);
        cmd
    }

    fn values(&self) -> serde_json::Value {
        read_json(&self.path("values.json"))
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_show_lists_leaves_with_values() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("/network/port"))
        .stdout(predicate::str::contains("8080"))
        .stdout(predicate::str::contains("/debug"))
        .stdout(predicate::str::contains("✗").not());
}

#[test]
fn test_naked_invocation_shows_tree() {
    let ws = Workspace::new();
    ws.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("/network/mode"));
}

#[test]
fn test_get_follows_trailing_separator_rules() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["get", "/network/port"])
        .assert()
        .success()
        .stdout("8080\n");
    ws.cmd()
        .args(["get", "/network"])
        .assert()
        .success()
        .stdout("port\nmode\n");
    ws.cmd()
        .args(["get", "/network/port/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Between(1, 65535)"));
    ws.cmd()
        .args(["get", "network/port/display_name"])
        .assert()
        .success()
        .stdout("Port\n");
}

#[test]
fn test_get_root_shows_root_node() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["get", "/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("network/ (2)"))
        .stdout(predicate::str::contains("debug = false"));
}

#[test]
fn test_get_missing_path_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["get", "/nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Setting not found: /nope"));
}

#[test]
fn test_set_valid_value_is_saved() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["set", "/network/port", "9090"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/network/port = 9090"));

    assert_eq!(
        ws.values(),
        serde_json::json!({"debug": false, "network": {"mode": "tcp", "port": 9090}})
    );

    // Values are loaded back on the next run.
    ws.cmd()
        .args(["get", "/network/port"])
        .assert()
        .success()
        .stdout("9090\n");
}

#[test]
fn test_set_invalid_value_is_rejected() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["set", "/network/port", "70000"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Rejected"))
        .stdout(predicate::str::contains("failed Between(1, 65535)"));

    assert!(!ws.path("values.json").exists());
}

#[test]
fn test_set_forced_invalid_value_is_saved() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["set", "/network/mode", "sctp", "--force"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("forced"));

    assert_eq!(ws.values()["network"]["mode"], "sctp");
    ws.cmd()
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("/network/mode"));
}

#[test]
fn test_set_on_node_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["set", "/network", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is a node"));
}

#[test]
fn test_apply_commits_valid_document() {
    let ws = Workspace::new();
    ws.write(
        "update.yaml",
        "network:\n  port: 443\n  mode: udp\nunknown: 1\n",
    );
    ws.cmd()
        .args(["apply", "update.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignoring /unknown"))
        .stdout(predicate::str::contains("Applied 2 value(s)"));

    assert_eq!(ws.values()["network"]["port"], 443);
    assert_eq!(ws.values()["network"]["mode"], "udp");
}

#[test]
fn test_apply_rejects_document_atomically() {
    let ws = Workspace::new();
    ws.write("update.json", r#"{"/network/port": 0, "/debug": true}"#);
    ws.cmd()
        .args(["apply", "update.json"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Rejected"))
        .stdout(predicate::str::contains("/network/port"));

    assert!(!ws.path("values.json").exists());
    ws.cmd()
        .args(["get", "/debug"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn test_apply_forced_reports_invalid_leaves() {
    let ws = Workspace::new();
    ws.write("update.json", r#"{"network": {"port": 0, "mode": "sctp"}}"#);
    ws.cmd()
        .args(["apply", "update.json", "--force"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("forced"))
        .stdout(predicate::str::contains("/network/port"))
        .stdout(predicate::str::contains("/network/mode"));

    assert_eq!(ws.values()["network"]["port"], 0);
    assert_eq!(ws.values()["network"]["mode"], "sctp");
}

#[test]
fn test_dump_nested_and_flat() {
    let ws = Workspace::new();
    let output = ws.cmd().arg("dump").output().unwrap();
    assert!(output.status.success());
    let dumped: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        dumped,
        serde_json::json!({"debug": false, "network": {"mode": "tcp", "port": 8080}})
    );

    let output = ws
        .cmd()
        .args(["dump", "--flat", "--format", "yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let dumped: serde_json::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(
        dumped,
        serde_json::json!({"/debug": false, "/network/mode": "tcp", "/network/port": 8080})
    );
}

#[test]
fn test_check_scoped_to_path() {
    let ws = Workspace::new();
    ws.write("values.json", r#"{"network": {"port": 0}}"#);
    ws.cmd()
        .args(["check", "/network"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("/network/port"));
    ws.cmd()
        .args(["check", "/debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All settings are valid."));
    ws.cmd().args(["check", "/missing"]).assert().code(1);
    ws.cmd()
        .args(["check", "/network/port/display_name"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Setting not found"));
}

#[test]
fn test_diff_against_document() {
    let ws = Workspace::new();
    ws.write("other.json", r#"{"network": {"port": 1, "mode": "tcp"}, "extra": 1}"#);
    ws.cmd()
        .args(["diff", "other.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("~ /network/port"))
        .stdout(predicate::str::contains("- /debug"))
        .stdout(predicate::str::contains("+ /extra"))
        .stdout(predicate::str::contains("/network/mode").not());
}

#[test]
fn test_list_by_kind() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["list", "--kind", "node"])
        .assert()
        .success()
        .stdout("/network\n");
    ws.cmd()
        .args(["ls", "--kind", "leaf", "/network"])
        .assert()
        .success()
        .stdout("/network/mode\n/network/port\n");
}

#[test]
fn test_missing_schema_is_an_error() {
    let ws = Workspace::new();
    ws.bare_cmd()
        .arg("show")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no schema given"));
}

#[test]
fn test_schema_from_project_config() {
    let ws = Workspace::new();
    ws.write(
        "settree.toml",
        "schema = \"schema.json\"\nvalues = \"saved.yaml\"\nform = \"flat\"\n",
    );
    ws.bare_cmd()
        .args(["set", "/debug", "true"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_yaml::from_str(&fs::read_to_string(ws.path("saved.yaml")).unwrap()).unwrap();
    assert_eq!(saved["/debug"], true);
    assert_eq!(saved["/network/port"], 8080);
}

#[test]
fn test_schema_from_environment() {
    let ws = Workspace::new();
    ws.bare_cmd()
        .env("SETTREE_SCHEMA", ws.path("schema.json"))
        .env("SETTREE_FORMAT", "yaml")
        .arg("dump")
        .assert()
        .success()
        .stdout(predicate::str::contains("port: 8080"));
}

#[test]
fn test_invalid_schema_is_reported() {
    let ws = Workspace::new();
    ws.write(
        "bad.json",
        r#"{"children": [{"name": "x", "value": 1, "validators": [{"name": "Huge", "params": [1]}]}]}"#,
    );
    ws.bare_cmd()
        .args(["--schema", "bad.json", "show"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown validator 'Huge'"));
}
