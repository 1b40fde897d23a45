use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;

const CROSSED: &str = r#"{
    "nodes": [
        {"id": "a", "rank": 0, "width": 10},
        {"id": "b", "rank": 0, "width": 10},
        {"id": "c", "rank": 1, "width": 10},
        {"id": "d", "rank": 1, "width": 10}
    ],
    "edges": [
        {"src": "a", "dst": "d"},
        {"src": "b", "dst": "c"}
    ]
}"#;

fn strata() -> Command {
    Command::new(assert_cmd::cargo_bin!("strata-cli"))
}

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).expect("write input");
    path.to_string_lossy().into_owned()
}

fn stdout_json(output: std::process::Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn layout_untangles_a_crossed_pair() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write(tmp.path(), "crossed.json", CROSSED);

    let out = stdout_json(strata().args(["layout", &input]).output().unwrap());
    assert_eq!(out["total_crossings"], 0);
    assert_eq!(out["stats"]["crossings_before"], 1);
    assert_eq!(out["nodes"].as_array().unwrap().len(), 4);
}

#[test]
fn layout_reads_options_from_a_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write(tmp.path(), "crossed.json", CROSSED);
    let config = write(
        tmp.path(),
        "config.json",
        r#"{"reorder": {"disabled": true}, "position": {"spacing": 5}}"#,
    );

    let out = stdout_json(
        strata()
            .args(["layout", "--config", &config, "--dense", &input])
            .output()
            .unwrap(),
    );
    assert_eq!(out["total_crossings"], 1);
    let xs: Vec<f64> = out["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["rank"] == 0)
        .map(|n| n["x"].as_f64().unwrap())
        .collect();
    assert_eq!(xs, vec![0.0, 15.0]);
}

#[test]
fn validate_accepts_a_builtin_fixture() {
    let out = stdout_json(
        strata()
            .args(["validate", "--fixture", "small", "--runs", "2"])
            .output()
            .unwrap(),
    );
    assert_eq!(out["ok"], true);
}

#[test]
fn bench_reports_elapsed_time() {
    let out = stdout_json(
        strata()
            .args(["bench", "--fixture", "small", "--mode", "warm", "--runs", "2"])
            .output()
            .unwrap(),
    );
    assert_eq!(out["mode"], "warm");
    assert_eq!(out["runs"], 2);
    assert!(out["elapsed_ms"].as_f64().unwrap() >= 0.0);
}

#[test]
fn batch_lays_out_every_document_in_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let first = write(tmp.path(), "a.json", CROSSED);
    let second = write(tmp.path(), "b.json", r#"{"nodes": [{"id": "x", "rank": 0}]}"#);

    let out = stdout_json(
        strata()
            .args(["batch", "--workers", "2", &first, &second])
            .output()
            .unwrap(),
    );
    let items = out.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["path"], first.as_str());
    assert_eq!(items[1]["layout"]["nodes"][0]["id"], "x");
}

#[test]
fn batch_reports_broken_documents() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let broken = write(
        tmp.path(),
        "broken.json",
        r#"{"nodes": [{"id": "a", "rank": 0}], "edges": [{"src": "a", "dst": "zzz"}]}"#,
    );

    strata()
        .args(["batch", &broken])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn random_output_is_seeded() {
    let run = || strata().args(["random", "--seed", "7"]).output().unwrap();
    let (a, b) = (run(), run());
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);

    let doc = stdout_json(a);
    assert!(!doc["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn unknown_flags_print_usage() {
    strata().args(["layout", "--nope"]).assert().failure().code(2);
}
