//! CLI command handler tests with real files on disk.

use std::fs;
use std::path::PathBuf;

use apidrift::cli::{run_diff, DiffInvocation};
use apidrift::reports::ReportFormat;

const OLD_MANIFEST: &str = r#"{"types": [
    {"name": "com.acme.Widget", "kind": "class",
     "fields": [{"name": "SIZE", "type": "int", "constant": "8"}],
     "methods": [{"name": "draw", "return": "void"}]}
]}"#;

const NEW_MANIFEST: &str = r#"{"types": [
    {"name": "com.acme.Widget", "kind": "interface",
     "methods": [{"name": "draw", "return": "void"}]}
]}"#;

fn invocation(old: PathBuf, new: PathBuf) -> DiffInvocation {
    DiffInvocation {
        old,
        new,
        old_supplementary: Vec::new(),
        new_supplementary: Vec::new(),
        format: ReportFormat::Json,
        output_file: None,
        locale: "en-US".to_string(),
    }
}

#[test]
fn diff_writes_json_report_to_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let old = dir.path().join("old.api.json");
    let new = dir.path().join("new.api.json");
    let out = dir.path().join("report.json");
    fs::write(&old, OLD_MANIFEST).expect("write old manifest");
    fs::write(&new, NEW_MANIFEST).expect("write new manifest");

    let mut inv = invocation(old, new);
    inv.output_file = Some(out.clone());
    run_diff(inv).expect("analysis succeeds");

    let content = fs::read_to_string(&out).expect("report was written");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("valid JSON");

    let codes: Vec<&str> = parsed["reports"]
        .as_array()
        .expect("reports array")
        .iter()
        .flat_map(|r| r["differences"].as_array().expect("differences array"))
        .map(|d| d["code"].as_str().expect("code string"))
        .collect();

    assert!(codes.contains(&"class.kindChanged"), "{codes:?}");
    assert!(codes.contains(&"field.constantRemoved"), "{codes:?}");
}

#[test]
fn findings_are_not_failures() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let old = dir.path().join("old.api.json");
    let new = dir.path().join("new.api.json");
    let out = dir.path().join("report.json");
    fs::write(&old, OLD_MANIFEST).expect("write old manifest");
    fs::write(&new, NEW_MANIFEST).expect("write new manifest");

    // Breaking changes are findings; the analysis itself succeeds.
    let mut inv = invocation(old, new);
    inv.output_file = Some(out);
    assert!(run_diff(inv).is_ok());
}

#[test]
fn missing_archive_is_a_fatal_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let old = dir.path().join("absent.api.json");
    let new = dir.path().join("also-absent.api.json");

    assert!(run_diff(invocation(old, new)).is_err());
}

#[test]
fn malformed_manifest_is_a_fatal_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let old = dir.path().join("old.api.json");
    let new = dir.path().join("new.api.json");
    fs::write(&old, "{ not json").expect("write old manifest");
    fs::write(&new, NEW_MANIFEST).expect("write new manifest");

    assert!(run_diff(invocation(old, new)).is_err());
}

#[test]
fn supplementary_archives_resolve_references() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let old = dir.path().join("old.api.json");
    let new = dir.path().join("new.api.json");
    let deps = dir.path().join("deps.api.json");
    let out = dir.path().join("report.json");

    fs::write(
        &old,
        r#"{"types": [{"name": "App", "fields": [{"name": "d", "type": "dep.Lib"}]}]}"#,
    )
    .expect("write old manifest");
    fs::write(&new, r#"{"types": [{"name": "App"}]}"#).expect("write new manifest");
    fs::write(&deps, r#"{"types": [{"name": "dep.Lib"}]}"#).expect("write deps manifest");

    let mut inv = invocation(old, new);
    inv.old_supplementary = vec![deps.clone()];
    inv.new_supplementary = vec![deps];
    inv.output_file = Some(out.clone());
    run_diff(inv).expect("analysis succeeds");

    let content = fs::read_to_string(&out).expect("report was written");
    assert!(content.contains("field.removed"), "{content}");
}
