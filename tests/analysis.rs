use std::f64::consts::PI;

use voxalyzer::analysis::Analyzer;
use voxalyzer::config::AnalysisConfig;
use voxalyzer::types::AudioData;

const SAMPLE_RATE: u32 = 22_050;

fn tone(frequency: f64, duration: f64) -> AudioData {
    let n = (duration * SAMPLE_RATE as f64) as usize;
    AudioData {
        samples: (0..n)
            .map(|i| (2.0 * PI * frequency * i as f64 / SAMPLE_RATE as f64).sin() as f32 * 0.5)
            .collect(),
        sample_rate: SAMPLE_RATE,
    }
}

fn silence(duration: f64) -> AudioData {
    AudioData {
        samples: vec![0.0; (duration * SAMPLE_RATE as f64) as usize],
        sample_rate: SAMPLE_RATE,
    }
}

#[test]
fn pure_tone_reports_its_frequency() {
    let outcome = Analyzer::new(AnalysisConfig::default())
        .analyze(&tone(150.0, 0.6))
        .expect("analysis succeeds");

    let pitch = outcome.metrics.mean_pitch_hz;
    assert!(
        (pitch - 150.0).abs() < 5.0,
        "mean pitch {pitch} Hz should be within tracking tolerance of 150 Hz"
    );
}

#[test]
fn pure_tone_is_stable_and_harmonic() {
    let outcome = Analyzer::new(AnalysisConfig::default())
        .analyze(&tone(150.0, 0.6))
        .expect("analysis succeeds");

    let m = &outcome.metrics;
    assert!(m.jitter_local < 0.02, "tone jitter {} too high", m.jitter_local);
    assert!(
        m.shimmer_local < 0.06,
        "tone shimmer {} too high",
        m.shimmer_local
    );
    assert!(m.hnr_db > 10.0, "tone HNR {} dB too low", m.hnr_db);
    // A 150 Hz tone keeps almost all of its energy below 1 kHz.
    assert!(m.energy_ratio > 1.0);
}

#[test]
fn every_scalar_is_finite_for_any_input() {
    let analyzer = Analyzer::new(AnalysisConfig::default());
    for audio in [tone(150.0, 0.6), tone(440.0, 0.3), silence(0.5)] {
        let metrics = analyzer.analyze(&audio).expect("analysis succeeds").metrics;
        for value in [
            metrics.mean_pitch_hz,
            metrics.f1_hz,
            metrics.f2_hz,
            metrics.f3_hz,
            metrics.jitter_local,
            metrics.shimmer_local,
            metrics.hnr_db,
            metrics.energy_ratio,
        ] {
            assert!(value.is_finite(), "non-finite scalar {value} escaped");
        }
    }
}

#[test]
fn silence_collapses_to_zero_metrics() {
    let outcome = Analyzer::new(AnalysisConfig::default())
        .analyze(&silence(0.5))
        .expect("silence still analyzes");

    let m = &outcome.metrics;
    assert_eq!(m.mean_pitch_hz, 0.0);
    assert_eq!(m.jitter_local, 0.0);
    assert_eq!(m.shimmer_local, 0.0);
    assert_eq!(m.hnr_db, 0.0);
    assert_eq!(m.energy_ratio, 0.0);
}

#[test]
fn empty_input_is_an_error() {
    let audio = AudioData {
        samples: Vec::new(),
        sample_rate: SAMPLE_RATE,
    };
    assert!(Analyzer::new(AnalysisConfig::default()).analyze(&audio).is_err());
}

#[test]
fn formant_tracks_align_with_pitch_frames() {
    let outcome = Analyzer::new(AnalysisConfig::default())
        .analyze(&tone(150.0, 0.6))
        .expect("analysis succeeds");

    let tracks = &outcome.tracks;
    assert!(!tracks.is_empty());
    assert_eq!(tracks.times.len(), tracks.f1.len());
    assert_eq!(tracks.times.len(), tracks.f2.len());
    assert_eq!(tracks.times.len(), tracks.f3.len());
    assert!(tracks.times.windows(2).all(|w| w[1] > w[0]));
}
