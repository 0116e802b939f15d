use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use trihedral::export::{encode_png, RgbaImage};
use trihedral::rig::MarkerId;

fn cli() -> Command {
    Command::cargo_bin("trihedral").expect("binary")
}

fn write_markers(dir: &Path) {
    let img = RgbaImage {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 255],
    };
    let bytes = encode_png(&img).expect("png");
    for id in MarkerId::all() {
        fs::write(dir.join(format!("ArucoMarker{id}.png")), &bytes).expect("write marker");
    }
}

#[test]
fn resolve_prints_defaults_without_a_dimensions_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    cli()
        .current_dir(dir.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("PANEL_W_MM = 108"))
        .stdout(predicate::str::contains("COLS = 6"));
}

#[test]
fn resolve_applies_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dims = dir.path().join("dims.txt");
    fs::write(&dims, "# rig B\ncols = 7\nmargin_mm: 10\nbogus = 1\n").expect("write");
    cli()
        .args(["--log-level", "off", "resolve", "--dimensions"])
        .arg(&dims)
        .assert()
        .success()
        .stdout(predicate::str::contains("COLS = 7"))
        .stdout(predicate::str::contains("MARGIN_MM = 10"));
}

#[test]
fn build_fails_when_marker_images_are_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("rig.glb");
    cli()
        .current_dir(dir.path())
        .args(["build", "--markers"])
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ArucoMarker1.png"));
    assert!(!out.exists());
}

#[test]
fn build_writes_glb_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_markers(dir.path());
    let out = dir.path().join("out/rig.glb");
    let report = dir.path().join("out/report.json");

    cli()
        .current_dir(dir.path())
        .args(["build", "--px-per-square", "4", "--markers"])
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let bytes = fs::read(&out).expect("glb");
    assert_eq!(&bytes[0..4], b"glTF");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["markers"].as_array().expect("markers").len(), 8);
}

#[test]
fn reconstruct_reports_classified_roles() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_markers(dir.path());
    let parts = dir.path().join("parts.json");
    fs::write(
        &parts,
        r#"{ "parts": [
            { "name": "floor", "min": [0, 0, 0], "max": [0.108, 0.094, 0.0008] },
            { "name": "left", "min": [0, 0, 0], "max": [0.0008, 0.094, 0.094] },
            { "name": "back", "min": [0, 0.094, 0], "max": [0.108, 0.0948, 0.094] }
        ] }"#,
    )
    .expect("write parts");
    let out = dir.path().join("rec.glb");
    let report = dir.path().join("rec.json");

    cli()
        .current_dir(dir.path())
        .arg("reconstruct")
        .arg("--parts")
        .arg(&parts)
        .arg("--markers")
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["floor"], "floor");
    assert_eq!(json["wall_left"], "left");
    assert!(out.exists());
}

#[test]
fn reconstruct_rejects_too_few_panels() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_markers(dir.path());
    let parts = dir.path().join("parts.json");
    fs::write(
        &parts,
        r#"{ "parts": [{ "name": "floor", "min": [0, 0, 0], "max": [0.1, 0.1, 0.001] }] }"#,
    )
    .expect("write parts");

    cli()
        .current_dir(dir.path())
        .arg("reconstruct")
        .arg("--parts")
        .arg(&parts)
        .arg("--markers")
        .arg(dir.path())
        .arg("--out")
        .arg(dir.path().join("x.glb"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("TooFewPanels"));
}
