use std::fs;

use camhelper_config::{CalibrationRecord, DEFAULT_CALIBRATION, load_calibration_record};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
#[case("170,170,480,0,0,480,500,0,0,500,1500")]
#[case("170,170,480,0,0,480,500,0,0,500,1500\n")]
#[case(" 170, 170,480 ,0,0,480,500,0,0,500,1500\r\n")]
fn parses_factory_record(#[case] text: &str) {
    let rec = CalibrationRecord::parse(text).unwrap();
    assert_eq!(rec.coefficients(), &DEFAULT_CALIBRATION);
}

#[test]
fn only_first_line_counts() {
    let rec = CalibrationRecord::parse("1,2,3,4,5,6,7,8,9,10,11\ngarbage").unwrap();
    assert_eq!(rec.to_string(), "1,2,3,4,5,6,7,8,9,10,11");
}

#[test]
fn negative_coefficients_are_allowed() {
    let rec: CalibrationRecord = "-1,2,3,4,5,6,7,8,9,10,-11".parse().unwrap();
    assert_eq!(rec.coefficients()[0], -1);
    assert_eq!(rec.coefficients()[10], -11);
}

#[rstest]
#[case("", "empty")]
#[case("\n170,170", "empty")]
#[case("1,2,3", "11 fields")]
#[case("1,2,3,4,5,6,7,8,9,10,11,12", "11 fields")]
#[case("1,2,3,4,5,x,7,8,9,10,11", "field 6")]
#[case("1,2,3,4,5,,7,8,9,10,11", "field 6")]
fn rejects_malformed_records(#[case] text: &str, #[case] expected: &str) {
    let err = CalibrationRecord::parse(text).expect_err("malformed");
    assert!(
        format!("{err}").contains(expected),
        "error {err} should mention {expected}"
    );
}

#[test]
fn loads_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hall_calibration");
    fs::write(&path, "100,100,400,0,0,400,450,0,0,450,1400\n").unwrap();
    let rec = load_calibration_record(&path).unwrap();
    assert_eq!(rec.coefficients()[2], 400);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_calibration_record(&dir.path().join("absent")).expect_err("missing");
    assert!(format!("{err}").contains("read calibration record"));
}
