use std::f64::consts::PI;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_tone_wav(path: &Path, frequency: f64, duration: f64, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let n = (duration * sample_rate as f64) as usize;
    for i in 0..n {
        let sample = (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin() * 0.5;
        writer.write_sample((sample * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn reports_all_eight_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_tone_wav(&input, 150.0, 0.6, 22_050);

    Command::cargo_bin("voxalyzer")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mean pitch"))
        .stdout(predicate::str::contains("F1"))
        .stdout(predicate::str::contains("F2"))
        .stdout(predicate::str::contains("F3"))
        .stdout(predicate::str::contains("Jitter"))
        .stdout(predicate::str::contains("Shimmer"))
        .stdout(predicate::str::contains("HNR"))
        .stdout(predicate::str::contains("L/H energy ratio"));
}

#[test]
fn writes_json_report_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let json_path = dir.path().join("report.json");
    write_tone_wav(&input, 150.0, 0.6, 22_050);

    Command::cargo_bin("voxalyzer")
        .unwrap()
        .arg(&input)
        .arg("--json")
        .arg(&json_path)
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let pitch = value["metrics"]["mean_pitch_hz"].as_f64().unwrap();
    assert!((pitch - 150.0).abs() < 5.0, "JSON pitch {pitch} not near 150");
}

#[test]
fn missing_input_fails_with_the_hint() {
    Command::cargo_bin("voxalyzer")
        .unwrap()
        .arg("no-such-file.wav")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Analysis failed"))
        .stderr(predicate::str::contains("not too short"));
}

#[test]
fn unsupported_extension_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.ogg");
    std::fs::write(&input, b"not audio").unwrap();

    Command::cargo_bin("voxalyzer")
        .unwrap()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}
