mod common;

use assert_cmd::prelude::*;
use common::{world_shp, write_zip};
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("aquifer-plot").unwrap()
}

#[test]
fn cli_shows_help() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("aquifer-plot"));
}

#[test]
fn render_commands_offer_show() {
    for sub in ["run", "map", "chart"] {
        bin()
            .args([sub, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--show"));
    }
}

#[test]
fn config_prints_effective_json() {
    bin()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("world-administrative-boundaries.zip"))
        .stdout(predicate::str::contains("\"dpi\": 900.0"));
}

#[test]
fn export_writes_csv() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("rates.csv");
    bin().args(["export", "--out"]).arg(&out).assert().success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("region,period,mm_per_year,km3_per_year"));
}

#[test]
fn chart_reports_saved_path() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("chart.png");
    bin()
        .args(["chart", "--dpi", "20", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chart saved successfully at:"));
    assert!(out.exists());
}

#[test]
fn run_renders_both_figures() {
    let dir = tempdir().unwrap();
    let zip = dir.path().join("world.zip");
    let shp = world_shp();
    write_zip(&zip, &[("boundaries/world.shp", &shp)]);
    let map = dir.path().join("map.png");
    let chart = dir.path().join("chart.png");
    let cfg = serde_json::json!({
        "paths": {
            "archive": zip,
            "extract_dir": dir.path().join("extracted"),
            "map_output": map,
            "chart_output": chart,
        }
    });
    let cfg_path = dir.path().join("config.json");
    fs::write(&cfg_path, cfg.to_string()).unwrap();

    bin()
        .arg("--config")
        .arg(&cfg_path)
        .args(["run", "--dpi", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Map saved successfully at:"))
        .stdout(predicate::str::contains("Chart saved").not());
    assert!(map.exists());
    assert!(chart.exists());
}

#[test]
fn missing_archive_fails() {
    let dir = tempdir().unwrap();
    let cfg_path = dir.path().join("config.json");
    let cfg = serde_json::json!({ "paths": { "archive": dir.path().join("nope.zip") } });
    fs::write(&cfg_path, cfg.to_string()).unwrap();
    bin()
        .arg("--config")
        .arg(&cfg_path)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.zip"));
}
