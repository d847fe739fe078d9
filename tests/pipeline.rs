use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::path::PathBuf;
use std::sync::Mutex;

/// The lifecycle assertions scan the shared temp directory, so the tests in
/// this file must not stage files concurrently.
static TEMP_DIR_LOCK: Mutex<()> = Mutex::new(());

fn temp_dir_guard() -> std::sync::MutexGuard<'static, ()> {
    TEMP_DIR_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

use voxalyzer::audio::encoder::encode_wav;
use voxalyzer::config::AnalysisConfig;
use voxalyzer::pipeline;
use voxalyzer::types::AudioData;

fn tone_wav_bytes(frequency: f64, duration: f64, sample_rate: u32) -> Vec<u8> {
    let n = (duration * sample_rate as f64) as usize;
    let audio = AudioData {
        samples: (0..n)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin() as f32 * 0.5)
            .collect(),
        sample_rate,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    encode_wav(&audio, &path).unwrap();
    std::fs::read(&path).unwrap()
}

/// Every file the pipeline stages under the system temp directory.
fn staged_temp_files() -> BTreeSet<PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name.starts_with("voxalyzer-"))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn full_run_reports_pitch_and_cleans_up() {
    let _guard = temp_dir_guard();
    let before = staged_temp_files();
    let bytes = tone_wav_bytes(150.0, 0.6, 22_050);

    let report =
        pipeline::process_bytes("tone.wav", &bytes, &AnalysisConfig::default()).unwrap();

    let pitch = report.metrics.mean_pitch_hz;
    assert!((pitch - 150.0).abs() < 5.0, "pitch {pitch} not near 150 Hz");

    // Both staged temp files are gone once the report exists.
    let after = staged_temp_files();
    assert!(
        after.difference(&before).next().is_none(),
        "staged files left behind: {:?}",
        after.difference(&before).collect::<Vec<_>>()
    );
}

#[test]
fn failed_run_cleans_up_too() {
    let _guard = temp_dir_guard();
    let before = staged_temp_files();

    // Valid extension, undecodable content: fails inside the pipeline,
    // after the upload was staged.
    let result = pipeline::process_bytes("junk.wav", &[0u8; 64], &AnalysisConfig::default());
    assert!(result.is_err());

    let after = staged_temp_files();
    assert!(
        after.difference(&before).next().is_none(),
        "staged files left behind after failure"
    );
}

#[test]
fn unsupported_extension_never_stages_anything() {
    let _guard = temp_dir_guard();
    let before = staged_temp_files();

    let result = pipeline::process_bytes("clip.ogg", &[0u8; 64], &AnalysisConfig::default());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Unsupported file type"));

    let after = staged_temp_files();
    assert_eq!(before, after, "rejection must happen before staging");
}

#[test]
fn resampling_happens_before_analysis() {
    let _guard = temp_dir_guard();
    // A 44.1 kHz upload still comes back with a report at the fixed rate;
    // pitch must survive the conversion.
    let bytes = tone_wav_bytes(150.0, 0.6, 44_100);
    let report =
        pipeline::process_bytes("tone.wav", &bytes, &AnalysisConfig::default()).unwrap();
    let pitch = report.metrics.mean_pitch_hz;
    assert!((pitch - 150.0).abs() < 5.0, "pitch {pitch} not near 150 Hz");
}
