use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cue-synchronized scene animation player"));
}

#[test]
fn test_cli_template_generation() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("template")
        .arg("intro")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cue\": \"componentsStart\""))
        .stdout(predicate::str::contains("\"op\": \"wait_until\""));
}

#[test]
fn test_cli_validate_intro() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("validate")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg("demos/cues.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 cues defined"))
        .stdout(predicate::str::contains("Validation complete"));
}

#[test]
fn test_cli_validate_reports_missing_cue() {
    let dir = tempfile::tempdir().unwrap();
    let cues = dir.path().join("cues.json");
    fs::write(&cues, r#"{"componentsStart": 1.0}"#).unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("validate")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg(&cues)
        .assert()
        .failure()
        .stderr(predicate::str::contains("componentsSay"));
}

#[test]
fn test_cli_render_intro() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("frames");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("render")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg("demos/cues.json")
        .arg("--output")
        .arg(&output)
        .arg("--fps")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 49 frames"));

    let frames = fs::read_to_string(output.join("frames.jsonl")).unwrap();
    assert_eq!(frames.lines().count(), 49);
    assert!(frames.lines().last().unwrap().contains("COMPONENTS"));
}

#[test]
fn test_cli_render_without_cues_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("render")
        .arg("demos/intro.json")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cue"));
}

#[test]
fn test_cli_report_export() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("report")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg("demos/cues.json")
        .arg("--export-report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Scene duration: 4.80s"));

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(content["total_duration"], 4.8);
    assert_eq!(content["steps"].as_array().unwrap().len(), 6);
}

#[test]
fn test_cli_render_rejects_zero_fps() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.arg("render")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg("demos/cues.json")
        .arg("--output")
        .arg(dir.path())
        .arg("--fps")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FPS must be greater than 0"));

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.env("CUESCENE_PLAYBACK__FPS", "0")
        .arg("render")
        .arg("demos/intro.json")
        .arg("--cues")
        .arg("demos/cues.json")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("FPS must be greater than 0"));
    assert!(!dir.path().join("frames.jsonl").exists());
}

#[test]
fn test_cli_env_overrides_video_and_fps() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.env("CUESCENE_VIDEO__WIDTH", "1280")
        .env("CUESCENE_VIDEO__HEIGHT", "720")
        .arg("validate")
        .arg("demos/example.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolution: 1280x720"));

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cuescene"));
    cmd.env("CUESCENE_PLAYBACK__FPS", "4")
        .arg("render")
        .arg("demos/example.json")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("at 1920x1080, 4 fps"))
        .stdout(predicate::str::contains("Rendered 5 frames"));
}
