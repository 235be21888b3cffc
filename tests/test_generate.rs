mod common;

use std::fs;

use common::{fixture_arg, generate, spawn_command, stderr, stdout};

fn lines(text: &str) -> Vec<(u32, u32, u8, u32)> {
    text.lines()
        .map(|line| {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 3, "bad line {line:?}");
            let (hh, mm) = fields[0].split_once(':').expect("hh:mm");
            assert_eq!(hh.len(), 2, "hours not zero-padded: {line:?}");
            assert_eq!(mm.len(), 2, "minutes not zero-padded: {line:?}");
            (
                hh.parse().unwrap(),
                mm.parse().unwrap(),
                fields[1].parse().unwrap(),
                fields[2].parse().unwrap(),
            )
        })
        .collect()
}

#[test]
fn writes_one_line_per_strike() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("storm.dat");
    let output = generate("valid", &out, 1);
    assert!(output.status.success(), "generate failed: {}", stderr(&output));

    let detections = lines(&fs::read_to_string(&out).unwrap());
    assert_eq!(detections.len(), 60);
    assert!(detections.iter().all(|&(_, mm, d, _)| mm < 60 && (5..=40).contains(&d)));

    let minutes: Vec<u32> = detections.iter().map(|&(hh, mm, _, _)| hh * 60 + mm).collect();
    assert!(minutes.windows(2).all(|w| w[0] <= w[1]));
    assert!(minutes.iter().all(|&m| m < 180));
}

#[test]
fn same_seed_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.dat");
    let b = dir.path().join("b.dat");
    assert!(generate("valid", &a, 99).status.success());
    assert!(generate("valid", &b, 99).status.success());
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn writes_to_stdout_with_dash() {
    let output = spawn_command(&[
        "generate",
        "-q",
        "--config-dir",
        &fixture_arg("early_window"),
        "--output-file",
        "-",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(lines(&stdout(&output)).len(), 15);
}

#[test]
fn whole_storm_close_stays_at_min_distance() {
    let output = spawn_command(&[
        "generate",
        "-q",
        "--config-dir",
        &fixture_arg("whole_storm"),
        "--output-file",
        "-",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(lines(&stdout(&output)).iter().all(|&(_, _, d, _)| d == 0));
}

#[test]
fn invalid_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("storm.dat");
    let output = generate("invalid_fields", &out, 0);
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn timeline_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("storm.dat");
    let output = generate("empty_storm", &out, 0);
    assert_eq!(output.status.code(), Some(5));
    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("storm.dat");
    let output = generate("valid", &out, 0);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn logs_summary_at_info() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("storm.dat");
    let output = spawn_command(&[
        "generate",
        "-v",
        "--config-dir",
        &fixture_arg("valid"),
        "--output-file",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("close window"), "{err}");
    assert!(err.contains("middle split, early/late normal"), "{err}");
    assert!(err.contains("detections written"), "{err}");
}
