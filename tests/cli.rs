use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("linegraph").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("linegraph"));
}

#[test]
fn render_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let scene = dir.path().join("scene.json");
    let out = dir.path().join("out.svg");
    fs::write(
        &scene,
        r#"{
            "graph": {
                "from": 1704067200,
                "period": 3600,
                "series": [ { "item": "cpu", "color": "00A000", "units": "%" } ]
            },
            "items": { "cpu": { "samples": [ [1704067200, "1"], [1704067800, "3.5"], [1704068400, 2] ] } }
        }"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("linegraph").unwrap();
    cmd.args(["render", "--scene"]).arg(&scene).arg("--out").arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Wrote 900x300 graph"));
    assert!(fs::read_to_string(&out).unwrap().contains("<svg"));
}

#[test]
fn missing_scene_fails() {
    let mut cmd = Command::cargo_bin("linegraph").unwrap();
    cmd.args(["render", "--scene", "no-such-scene.json", "--out", "x.svg"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no-such-scene.json"));
}
