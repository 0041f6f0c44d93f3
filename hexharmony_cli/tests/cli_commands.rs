// Runs the `hexharmony` binary end to end: table output, JSON snapshots,
// config files and error exits.

#![allow(deprecated)]

use assert_cmd::Command;
use hexharmony_engine::EngineConfig;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn hexharmony() -> Command {
    Command::cargo_bin("hexharmony").unwrap()
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn lut_lists_the_tempered_fifth_as_three_halves() {
    let out = stdout_of(hexharmony().args(["lut", "--edo", "12"]));
    assert!(out.starts_with("12 TET: weight 10, bandwidth 1"));

    let row: Vec<&str> = out
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|cols| cols.first() == Some(&"7"))
        .unwrap();
    assert_eq!(row[1], "700.0");
    assert_eq!(row[2], "3/2");
    assert_eq!(row[3], "-2.0");
    assert_eq!(row[4], "3");

    // 4 octaves of 12 steps plus the two header lines.
    assert_eq!(out.lines().count(), 50);
}

#[test]
fn heatmap_json_snapshot_has_the_sounding_dyad() {
    let out = stdout_of(hexharmony().args(["heatmap", "--edo", "12", "--steps", "0,7", "--json"]));
    let snapshot: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(snapshot["edo"], 12);

    let cells = snapshot["cells"].as_array().unwrap();
    let active: Vec<i64> = cells
        .iter()
        .filter(|c| c["active"] == true)
        .map(|c| c["pitch_step"].as_i64().unwrap())
        .collect();
    assert_eq!(active, vec![0, 7]);

    let fifth_labelled = cells.iter().any(|c| {
        c["visual"]["label"]
            .as_str()
            .is_some_and(|label| label.starts_with("3/2"))
    });
    assert!(fifth_labelled);
}

#[test]
fn heatmap_text_output_labels_partners() {
    hexharmony()
        .args(["heatmap", "--steps", "0,4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12 TET: sounding steps [0, 4]"))
        .stdout(predicate::str::contains("5/4 (Err: 13.7¢)"));
}

#[test]
fn unknown_preset_exits_with_an_error() {
    hexharmony()
        .args(["lut", "--edo", "17"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no preset for 17 EDO"));
}

#[test]
fn step_outside_the_lattice_exits_with_an_error() {
    hexharmony()
        .args(["heatmap", "--steps", "0,100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pitch step 100000 is outside the lattice"));
}

#[test]
fn config_round_trips_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.json");
    hexharmony()
        .args(["config", "--out"])
        .arg(&path)
        .assert()
        .success();
    let written = EngineConfig::load(&path).unwrap();
    assert_eq!(written, EngineConfig::default());

    // Feed a modified copy back through `--config`.
    let custom = EngineConfig {
        default_edo: 31,
        lattice_radius: 5,
        ..EngineConfig::default()
    };
    std::fs::write(&path, custom.to_json_pretty().unwrap()).unwrap();
    let out = stdout_of(
        hexharmony()
            .args(["lut", "--edo", "31", "--config"])
            .arg(&path),
    );
    assert!(out.starts_with("31 TET"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    hexharmony()
        .arg("reference")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading config"));
}
