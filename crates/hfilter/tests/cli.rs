//! End-to-end tests that drive the `hfilter` binary.
//!
//! Each test points `HFILTER_CONFIG` at a temporary file so the user's own
//! configuration never leaks in.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use serial_test::serial;
use tempfile::TempDir;

const DEFS: &str = r#"
version = 1

[defs.equip]

[defs.ahu]
is = ["equip"]
implied_by = ["airHandler"]

[defs.rtu]
is = ["ahu"]

[defs.inputs]

[defs.elec]

[defs.elecRef]
relationships = { inputs = "elec" }
"#;

fn resolve_hfilter_binary_path() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_hfilter") {
        return PathBuf::from(path);
    }

    // Fallback for environments where Cargo doesn't export CARGO_BIN_EXE_hfilter
    // for this integration test binary.
    let test_binary = env::current_exe().expect("failed to resolve current test executable path");
    let debug_dir = test_binary
        .parent()
        .and_then(|p| p.parent())
        .expect("failed to resolve target/debug directory")
        .to_path_buf();

    let mut candidate = debug_dir.join("hfilter");
    if cfg!(windows) {
        candidate.set_extension("exe");
    }
    candidate
}

fn hfilter(config: &Path, args: &[&str]) -> Output {
    Command::new(resolve_hfilter_binary_path())
        .args(args)
        .env("HFILTER_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run hfilter")
}

fn with_defs() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, DEFS).unwrap();
    (dir, path)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
#[serial]
fn test_check_valid_filter() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["check", "site and area > 1000ft²"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "ok site and area > 1000ft²");
}

#[test]
#[serial]
fn test_check_invalid_filter_exit_code() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["check", "(site"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unclosed parenthesis"));
}

#[test]
#[serial]
fn test_check_invalid_filter_json_envelope() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["--json", "check", "site and"]);
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["code"], "FILTER_ERROR");
}

#[test]
#[serial]
fn test_fmt_canonicalizes_spacing() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["fmt", "  site   and(equip  or point)  "]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "site and (equip or point)");
}

#[test]
#[serial]
fn test_ast_json() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["ast", "--json", "foo == 1"]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "or");
    assert_eq!(json["children"][0]["children"][0]["type"], "cmp");
}

#[test]
#[serial]
fn test_v3_expands_subtypes() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["v3", "^ahu and not foo"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "(ahu or rtu) and not foo");
}

#[test]
#[serial]
fn test_v3_json_reports_requery() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["--json", "v3", "inputs? @m1"]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["filter"], "elecRef");
    assert_eq!(json["requery"], true);
}

#[test]
#[serial]
fn test_v3_warns_about_unknown_defs() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["v3", "^ahuu"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("did you mean 'ahu'?"));
}

#[test]
#[serial]
fn test_implied_expands_implied_by() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["implied", "^ahu"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("airHandler"));
}

#[test]
#[serial]
fn test_invalid_config_exit_code() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "version = [").unwrap();

    let output = hfilter(&config, &["--json", "v3", "site"]);
    assert_eq!(output.status.code(), Some(5));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["code"], "CONFIG_ERROR");
}

#[test]
#[serial]
fn test_config_init_and_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("hfilter").join("config.toml");

    let output = hfilter(&config, &["config", "path"]);
    assert_eq!(stdout(&output), config.display().to_string());

    let output = hfilter(&config, &["config", "init"]);
    assert!(output.status.success());
    assert!(config.exists());

    let output = hfilter(&config, &["config", "init"]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
#[serial]
fn test_completions() {
    let (_dir, config) = with_defs();
    let output = hfilter(&config, &["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("hfilter"));
}
