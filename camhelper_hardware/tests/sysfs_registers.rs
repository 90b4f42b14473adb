use std::fs;

use camhelper_hardware::error::HwError;
use camhelper_hardware::util::read_first_line;
use camhelper_hardware::{RegisterPaths, SysfsMotor};
use camhelper_traits::MotorPort;
use rstest::rstest;
use tempfile::{TempDir, tempdir};

fn motor_in(dir: &TempDir) -> SysfsMotor {
    let paths = RegisterPaths {
        hall_calibration: dir.path().join("hall_calibration"),
        enable: dir.path().join("enable"),
        direction: dir.path().join("direction"),
        position: dir.path().join("position"),
    };
    SysfsMotor::new(paths)
}

#[rstest]
#[case(true, "1")]
#[case(false, "0")]
fn actuation_writes_direction_then_enable(#[case] open: bool, #[case] expected: &str) {
    let dir = tempdir().unwrap();
    let mut motor = motor_in(&dir);

    motor.set_direction(open).unwrap();
    motor.enable_actuation().unwrap();

    let p = motor.paths().clone();
    assert_eq!(fs::read_to_string(p.direction).unwrap(), expected);
    assert_eq!(fs::read_to_string(p.enable).unwrap(), "1");
}

#[test]
fn calibration_is_written_verbatim() {
    let dir = tempdir().unwrap();
    let mut motor = motor_in(&dir);
    motor
        .write_calibration("170,170,480,0,0,480,500,0,0,500,1500")
        .unwrap();
    let got = fs::read_to_string(&motor.paths().hall_calibration).unwrap();
    assert_eq!(got, "170,170,480,0,0,480,500,0,0,500,1500");
}

#[test]
fn position_reads_first_line_only() {
    let dir = tempdir().unwrap();
    let mut motor = motor_in(&dir);
    fs::write(&motor.paths().position, "1\nignored\n").unwrap();
    assert_eq!(motor.read_position().unwrap(), "1");
}

#[test]
fn missing_position_register_is_an_error() {
    let dir = tempdir().unwrap();
    let mut motor = motor_in(&dir);
    let err = motor.read_position().expect_err("no register file");
    assert!(err.to_string().contains("position"));
}

#[test]
fn write_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let mut motor = SysfsMotor::new(RegisterPaths {
        direction: dir.path().join("nope").join("direction"),
        ..RegisterPaths::default()
    });
    assert!(motor.set_direction(true).is_err());
}

#[test]
fn empty_register_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("position");
    fs::write(&path, "").unwrap();
    match read_first_line(&path) {
        Err(HwError::EmptyRegister(p)) => assert!(p.ends_with("position")),
        other => panic!("unexpected: {other:?}"),
    }
}
