//! Acoustic analysis passes.
//!
//! This module is the "phonetics toolkit" of the pipeline: pitch tracking,
//! formant estimation, harmonicity, pulse-based perturbation measures, and
//! the short-time spectrum. Each pass works on the staged mono buffer and
//! reports per-frame values; the [`Analyzer`] facade reduces them to the
//! eight scalar metrics under the finite-or-zero policy.

pub mod burg;
pub mod dsp;
pub mod formant;
pub mod harmonicity;
pub mod pitch;
pub mod pulses;
pub mod spectrum;

use thiserror::Error;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{AcousticMetrics, AudioData, FormantTracks};

use formant::FormantTrack;
use harmonicity::Harmonicity;
use pitch::{PitchParams, PitchTrack};
use spectrum::Spectrogram;

/// Errors raised by the analysis passes.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("recording is too short to analyze: {0}")]
    TooShort(String),

    #[error("analysis failed: {0}")]
    Analysis(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Coerce an optional statistic to a finite number, substituting 0.
///
/// Both "the pass produced nothing" (None) and a non-finite value collapse
/// to 0. Zero is itself a plausible reading for some of these statistics;
/// the report deliberately does not distinguish the two cases.
pub fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub metrics: AcousticMetrics,
    pub tracks: FormantTracks,
    pub spectrogram: Spectrogram,
}

/// Runs every pass over one staged buffer.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, audio: &AudioData) -> Result<AnalysisOutcome> {
        if audio.is_empty() {
            return Err(AnalysisError::TooShort("no samples decoded".into()));
        }

        let pitch = PitchTrack::analyze(
            audio,
            &PitchParams::tracking(self.config.pitch_floor, self.config.pitch_ceiling),
        );
        debug!(
            frames = pitch.num_frames(),
            voiced = pitch.count_voiced(),
            "pitch pass complete"
        );

        let formants = FormantTrack::analyze(
            audio,
            self.config.max_formants,
            self.config.max_formant_hz,
        )?;
        debug!(frames = formants.num_frames(), "formant pass complete");

        let harmonicity = Harmonicity::analyze(audio, self.config.pitch_floor);

        // Pulse extraction throws outright on silence or too-short input, a
        // wider failure mode than a NaN statistic; both perturbation values
        // fall back to 0 together.
        let (jitter, shimmer) = match pulses::PulseTrain::extract(audio, &pitch) {
            Ok(train) => (
                finite_or_zero(train.jitter_local()),
                finite_or_zero(train.shimmer_local()),
            ),
            Err(err) => {
                debug!(error = %err, "pulse pass failed; reporting zero perturbation");
                (0.0, 0.0)
            }
        };

        let spectrogram = Spectrogram::compute(audio, &self.config);
        let energy_ratio = spectrogram.band_energy_ratio(self.config.band_split_hz);

        let metrics = AcousticMetrics {
            mean_pitch_hz: finite_or_zero(pitch.mean_frequency()),
            f1_hz: finite_or_zero(formants.mean_frequency(1)),
            f2_hz: finite_or_zero(formants.mean_frequency(2)),
            f3_hz: finite_or_zero(formants.mean_frequency(3)),
            jitter_local: jitter,
            shimmer_local: shimmer,
            hnr_db: finite_or_zero(harmonicity.mean()),
            energy_ratio,
        };

        let tracks = formant_tracks_at_pitch_times(&pitch, &formants);

        Ok(AnalysisOutcome {
            metrics,
            tracks,
            spectrogram,
        })
    }
}

/// Sample the three lowest formant tracks at the pitch frame times.
///
/// Frames with no defined formant stay NaN so the trace plot shows gaps.
fn formant_tracks_at_pitch_times(pitch: &PitchTrack, formants: &FormantTrack) -> FormantTracks {
    let times = pitch.times();
    let mut tracks = FormantTracks {
        f1: Vec::with_capacity(times.len()),
        f2: Vec::with_capacity(times.len()),
        f3: Vec::with_capacity(times.len()),
        times,
    };
    for &t in &tracks.times {
        tracks.f1.push(formants.value_at_time(1, t));
        tracks.f2.push(formants.value_at_time(2, t));
        tracks.f3.push(formants.value_at_time(3, t));
    }
    tracks
}

#[cfg(test)]
mod tests {
    use super::finite_or_zero;

    #[test]
    fn substitutes_zero_for_missing_and_non_finite() {
        assert_eq!(finite_or_zero(None), 0.0);
        assert_eq!(finite_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(finite_or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(finite_or_zero(Some(-12.5)), -12.5);
    }
}
