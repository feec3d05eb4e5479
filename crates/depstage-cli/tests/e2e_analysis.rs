//! E2E CLI tests over node lists and GitHub Actions workflows:
//! - `check` exit codes for clean and cyclic graphs
//! - `order`, `levels`, `critical-path`, `impact` JSON contracts
//! - `mermaid` and `report` output for a workflow
//! - error rendering (codes, hints, JSON wrapping) and `--strict`
//!
//! Each test runs the `depstage` binary against files in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const WORKFLOW: &str = r"
name: CI
on: [push]
jobs:
  setup:
    runs-on: ubuntu-latest
  lint:
    needs: setup
  unit:
    needs: [setup]
  build:
    needs: setup
  e2e:
    needs: [lint, unit, build]
  deploy:
    needs: e2e
    if: github.ref == 'refs/heads/main'
";

const DIAMOND: &str = r#"[
  {"name": "a"},
  {"name": "b", "depends_on": ["a"]},
  {"name": "c", "dependsOn": ["a"]},
  {"name": "d", "depends_on": ["b", "c"]}
]"#;

const CYCLIC: &str = "
- name: a
  depends_on: [c]
- name: b
  depends_on: [a]
- name: c
  depends_on: [b]
- name: d
";

/// Build a Command targeting the depstage binary, rooted in `dir`.
fn depstage(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("depstage"));
    cmd.current_dir(dir);
    cmd.env("DEPSTAGE_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// Run with `--json`, assert success, and parse stdout.
fn json_ok(dir: &Path, args: &[&str]) -> Value {
    let output = depstage(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("depstage should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_on_acyclic_graph() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.json", DIAMOND);

    depstage(dir.path())
        .args(["check", "graph.json", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph check: 4 nodes, 4 edges"))
        .stdout(predicate::str::contains("No dependency cycles found."));
}

#[test]
fn check_exits_one_on_cycles() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.yaml", CYCLIC);

    depstage(dir.path())
        .args(["check", "graph.yaml", "--output", "text"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Dependency cycles (1):"))
        .stdout(predicate::str::contains("a -> c -> b -> a"));
}

#[test]
fn check_json_lists_cycles_and_dangling_references() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "graph.yaml",
        "- name: a\n  depends_on: [a, ghost]\n- name: b\n  depends_on: [a, a]\n",
    );

    let output = depstage(dir.path())
        .args(["check", "graph.yaml", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["acyclic"], false);
    assert_eq!(json["cycles"], serde_json::json!([["a", "a"]]));
    assert_eq!(json["dangling_references"][0]["missing"], "ghost");
    assert_eq!(json["duplicate_edges_ignored"], 1);
    assert_eq!(json["self_loops"], serde_json::json!(["a"]));
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

#[test]
fn order_puts_dependencies_first() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.json", DIAMOND);

    let json = json_ok(dir.path(), &["order", "graph.json"]);
    assert_eq!(json["order"], serde_json::json!(["a", "b", "c", "d"]));
}

#[test]
fn levels_group_parallel_jobs() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    let json = json_ok(dir.path(), &["levels", "ci.yml"]);
    assert_eq!(json["kind"], "workflow");
    assert_eq!(json["level_count"], 4);
    assert_eq!(json["levels"]["e2e"], 2);
    assert_eq!(
        json["parallel_stages"],
        serde_json::json!([{"level": 1, "nodes": ["lint", "unit", "build"]}])
    );
}

#[test]
fn levels_text_output() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    depstage(dir.path())
        .args(["levels", "ci.yml", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Level 1 (3 jobs): lint, unit, build",
        ));
}

#[test]
fn critical_path_walks_levels() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    let json = json_ok(dir.path(), &["critical-path", "ci.yml"]);
    assert_eq!(
        json["path"],
        serde_json::json!(["setup", "lint", "e2e", "deploy"])
    );
    assert_eq!(json["length"], 4);
}

#[test]
fn cyclic_graph_fails_level_queries_with_code() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.yaml", CYCLIC);

    let output = depstage(dir.path())
        .args(["levels", "graph.yaml", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr JSON");
    assert_eq!(json["error"]["error_code"], "E2001");
    assert!(json["error"]["suggestion"].is_string());
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[test]
fn impact_reports_both_directions() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.json", DIAMOND);

    let json = json_ok(dir.path(), &["impact", "graph.json", "b"]);
    assert_eq!(json["name"], "b");
    assert_eq!(json["direct_dependencies"], serde_json::json!(["a"]));
    assert_eq!(json["direct_dependents"], serde_json::json!(["d"]));
    assert_eq!(json["impact_score"], 2);
    assert!(json.get("suggested_commands").is_none());
}

#[test]
fn impact_of_unknown_node_is_e3001() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.json", DIAMOND);

    depstage(dir.path())
        .args(["impact", "graph.json", "ghost", "--output", "text"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: node not found: ghost"));

    let output = depstage(dir.path())
        .args(["impact", "graph.json", "ghost", "--json"])
        .output()
        .expect("run");
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr JSON");
    assert_eq!(json["error"]["error_code"], "E3001");
}

#[test]
fn summary_ranks_by_impact() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    let json = json_ok(dir.path(), &["summary", "ci.yml", "--top", "2"]);
    assert_eq!(json["title"], "CI");
    assert_eq!(json["stats"]["node_count"], 6);
    assert_eq!(json["stats"]["edge_count"], 7);
    let ranking = json["ranking"].as_array().expect("ranking");
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0]["name"], "setup");
    assert_eq!(ranking[0]["impact_score"], 6);
}

#[test]
fn nodes_lists_workflow_metadata() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    let json = json_ok(dir.path(), &["nodes", "ci.yml"]);
    let deploy = &json["nodes"][5];
    assert_eq!(deploy["name"], "deploy");
    assert_eq!(deploy["metadata"]["has_condition"], true);
    assert_eq!(deploy["metadata"]["runs_on"], "ubuntu-latest");
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[test]
fn mermaid_renders_fenced_flowchart() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    depstage(dir.path())
        .args(["mermaid", "ci.yml", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("```mermaid\nflowchart TD\n"))
        .stdout(predicate::str::contains("    setup --> lint"))
        .stdout(predicate::str::contains(
            "<small>if: github.ref == 'refs/heads/main'</small>",
        ))
        .stdout(predicate::str::contains("    style setup fill:rgb(144,238,144)"))
        .stdout(predicate::str::contains("    style deploy fill:rgb(255,140,0)"));
}

#[test]
fn mermaid_without_fence_as_json() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    let json = json_ok(dir.path(), &["mermaid", "ci.yml", "--no-fence"]);
    let text = json["mermaid"].as_str().expect("mermaid text");
    assert!(text.starts_with("flowchart TD\n"));
    assert!(!text.contains("```"));
}

#[test]
fn report_is_markdown() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);

    depstage(dir.path())
        .args(["report", "ci.yml", "--with-diagram", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("## Dependency Graph\n"))
        .stdout(predicate::str::contains("# Workflow Analysis Report"))
        .stdout(predicate::str::contains("- Total jobs: 6"))
        .stdout(predicate::str::contains("- Execution levels: 4"))
        .stdout(predicate::str::contains("- `e2e` depends on: lint, unit, build"));
}

#[test]
fn config_file_raises_fan_in_threshold() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", WORKFLOW);
    write(dir.path(), ".depstage.toml", "[report]\nfan_in_threshold = 5\n");

    depstage(dir.path())
        .args(["report", "ci.yml", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("### Complex Dependencies").not());
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[test]
fn strict_mode_rejects_dangling_references() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "graph.yaml",
        "- name: deploy\n  depends_on: [build]\n",
    );

    depstage(dir.path())
        .args(["order", "graph.yaml", "--output", "text"])
        .assert()
        .success()
        .stdout("deploy\n");

    let output = depstage(dir.path())
        .args(["--strict", "order", "graph.yaml", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr JSON");
    assert_eq!(json["error"]["error_code"], "E1003");
}

#[test]
fn duplicate_names_are_e1002() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graph.yaml", "- name: a\n- name: a\n");

    let output = depstage(dir.path())
        .args(["order", "graph.yaml", "--json"])
        .output()
        .expect("run");
    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr JSON");
    assert_eq!(json["error"]["error_code"], "E1002");
}

#[test]
fn workflow_without_jobs_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "ci.yml", "name: Empty\non: [push]\n");

    depstage(dir.path())
        .args(["--input-kind", "workflow", "order", "ci.yml", "--output", "text"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No jobs found in workflow file"));
}

#[test]
fn missing_input_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");

    depstage(dir.path())
        .args(["order", "nope.json", "--output", "text"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read"));
}
