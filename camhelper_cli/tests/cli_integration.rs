use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Config whose motor registers are plain files inside `dir`.
fn write_register_config(dir: &Path, extra: &str) -> PathBuf {
    let reg = |name: &str| dir.join(name).display().to_string().replace('\\', "/");
    let toml = format!(
        r#"
[motor]
hall_calibration = "{}"
enable = "{}"
direction = "{}"
position = "{}"

[calibration]
persist_path = "{}"

[home]
command = ["true"]
{extra}
"#,
        reg("hall_calibration"),
        reg("enable"),
        reg("direction"),
        reg("position"),
        reg("persisted_calibration"),
    );
    let path = dir.join("camhelper.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn camhelper() -> Command {
    Command::cargo_bin("camhelper").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["--sim", "position"], 0, "closed", "stdout")]
#[case(&["--sim", "actuate", "--open"], 0, "actuated open", "stdout")]
#[case(&["--sim", "self-check"], 0, "ok position=closed", "stdout")]
#[case(&["actuate"], 2, "required", "stderr")]
#[case(&["actuate", "--open", "--close"], 2, "cannot be used", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let assert = camhelper().args(args).assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn calibrate_writes_factory_default_when_nothing_persisted() {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "");

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .arg("calibrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("origin=default"));

    let written = fs::read_to_string(dir.path().join("hall_calibration")).unwrap();
    assert_eq!(written, "170,170,480,0,0,480,500,0,0,500,1500");
}

#[test]
fn calibrate_prefers_persisted_record() {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "");
    fs::write(
        dir.path().join("persisted_calibration"),
        "160,171,470,1,0,481,498,0,2,503,1490\n",
    )
    .unwrap();

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .arg("calibrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("origin=persisted"));

    let written = fs::read_to_string(dir.path().join("hall_calibration")).unwrap();
    assert_eq!(written, "160,171,470,1,0,481,498,0,2,503,1490");
}

#[test]
fn actuate_writes_direction_then_enable() {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "");

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .args(["actuate", "--close"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("direction")).unwrap(), "0");
    assert_eq!(fs::read_to_string(dir.path().join("enable")).unwrap(), "1");
}

#[rstest]
#[case("1\n", "closed")]
#[case("0\n", "open")]
#[case("2\n", "open")]
#[case("moving\n", "unknown")]
fn position_reads_register(#[case] content: &str, #[case] expected: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "");
    fs::write(dir.path().join("position"), content).unwrap();

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .arg("position")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{expected}\n")));
}

#[test]
fn self_check_fails_without_position_register() {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "");

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("register"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = write_register_config(dir.path(), "[debounce]\nwindow_ms = 0\n");

    camhelper()
        .arg("--config")
        .arg(&cfg)
        .arg("position")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("window_ms"));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    camhelper()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("position")
        .assert()
        .code(2);
}
