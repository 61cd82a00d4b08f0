//! CLI integration tests
//!
//! These tests run the shrinkres binary against small projects on disk.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, path: &str, contents: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, contents).unwrap();
}

/// A project with one used and two unused resources
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "app/src/main/java/Main.kt", "setContentView(R.layout.main)");
    write(
        root,
        "app/src/main/res/layout/main.xml",
        r#"<TextView xmlns:android="http://schemas.android.com/apk/res/android"
            android:text="@string/title"/>"#,
    );
    write(
        root,
        "app/src/main/res/values/strings.xml",
        r#"<resources>
            <string name="title">Title</string>
            <string name="old_title">Old</string>
        </resources>"#,
    );
    write(root, "app/src/main/res/drawable/unused_icon.png", "\u{89}PNG");
    dir
}

fn shrinkres() -> Command {
    Command::cargo_bin("shrinkres").unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    shrinkres()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unused resources"))
        .stdout(predicate::str::contains("--dump-graph"));
}

#[test]
fn test_version() {
    shrinkres()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    shrinkres()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No manifest, resource or source files found"));
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_terminal_report() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 unused resources"))
        .stdout(predicate::str::contains("@string/old_title"))
        .stdout(predicate::str::contains("@drawable/unused_icon"))
        .stdout(predicate::str::contains("@string/title\n").not());
}

#[test]
fn test_json_report_to_file() {
    let project = sample_project();
    let output = project.path().join("unused.json");

    shrinkres()
        .arg(project.path())
        .args(["--format", "json", "--quiet", "--output"])
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["total_unused"], 2);
    assert_eq!(json["by_type"]["string"], 1);
    assert_eq!(json["by_type"]["drawable"], 1);
}

#[test]
fn test_format_from_config_file() {
    let project = sample_project();
    write(project.path(), ".shrinkres.yml", "report:\n  format: json\n");

    shrinkres()
        .arg(project.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 2"));
}

// ============================================================================
// Directives
// ============================================================================

#[test]
fn test_keep_flag() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .args(["--keep", "@string/old_*", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 1"))
        .stdout(predicate::str::contains("old_title").not());
}

#[test]
fn test_discard_flag_overrides_usage() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .args(["--discard", "@string/title", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 3"));
}

#[test]
fn test_keep_from_config_file() {
    let project = sample_project();
    write(
        project.path(),
        "shrinkres.toml",
        "keep = [\"@drawable/unused_icon\"]\n\n[report]\nformat = \"json\"\n",
    );

    shrinkres()
        .arg(project.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 1"));
}

// ============================================================================
// Dumps
// ============================================================================

#[test]
fn test_dump_files() {
    let project = sample_project();
    let graph = project.path().join("graph.txt");
    let actions = project.path().join("actions.txt");
    let whitelist = project.path().join("whitelist.txt");

    shrinkres()
        .arg(project.path())
        .args(["--keep", "@string/old_title", "--quiet"])
        .arg("--dump-graph")
        .arg(&graph)
        .arg("--actions")
        .arg(&actions)
        .arg("--whitelist")
        .arg(&whitelist)
        .assert()
        .success();

    let graph = fs::read_to_string(graph).unwrap();
    assert!(graph.contains("layout/main"));
    assert!(graph.contains("    -> string/title (attribute)"));

    let actions = fs::read_to_string(actions).unwrap();
    assert!(actions.contains("drawable/unused_icon#remove"));
    assert!(actions.contains("string/old_title#no_obfuscate"));
    assert!(!actions.contains("string/title#"));

    assert_eq!(fs::read_to_string(whitelist).unwrap(), "old_title");
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn test_parallel_mode() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .args(["--parallel", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 2"));
}

#[test]
fn test_safe_mode_reports_string_pool() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Safe mode:"));

    shrinkres()
        .arg(project.path())
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("Safe mode:").not());
}

#[test]
fn test_exclude_pattern() {
    let project = sample_project();
    shrinkres()
        .arg(project.path())
        .args(["--exclude", "**/drawable/**", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_unused\": 1"));
}
