//! Core types shared across the voxalyzer pipeline

use serde::Serialize;

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 22050)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The eight scalar measurements of one recording.
///
/// Every field is finite: statistics that come back non-finite or undefined
/// from the analysis passes are coerced to 0 before this struct is built.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AcousticMetrics {
    /// Mean fundamental frequency over voiced frames, Hz
    pub mean_pitch_hz: f64,
    /// Mean first formant frequency, Hz
    pub f1_hz: f64,
    /// Mean second formant frequency, Hz
    pub f2_hz: f64,
    /// Mean third formant frequency, Hz
    pub f3_hz: f64,
    /// Cycle-to-cycle period perturbation, as a fraction (0.01 = 1%)
    pub jitter_local: f64,
    /// Cycle-to-cycle amplitude perturbation, as a fraction
    pub shimmer_local: f64,
    /// Mean harmonics-to-noise ratio over voiced frames, dB
    pub hnr_db: f64,
    /// Summed spectral magnitude below 1000 Hz over summed magnitude above
    pub energy_ratio: f64,
}

/// Formant trajectories sampled at the pitch analysis frame times.
///
/// Frames where a formant is undefined carry NaN so the plot shows a gap
/// instead of a spurious zero. Only the scalar report passes through the
/// finite-or-zero guard.
#[derive(Debug, Clone, Default)]
pub struct FormantTracks {
    /// Frame center times, seconds
    pub times: Vec<f64>,
    /// F1 frequency per frame, Hz (NaN where undefined)
    pub f1: Vec<f64>,
    /// F2 frequency per frame, Hz (NaN where undefined)
    pub f2: Vec<f64>,
    /// F3 frequency per frame, Hz (NaN where undefined)
    pub f3: Vec<f64>,
}

impl FormantTracks {
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_duration_from_rate() {
        let audio = AudioData {
            samples: vec![0.0; 22_050],
            sample_rate: 22_050,
        };
        assert!((audio.duration() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_default_to_zero() {
        let metrics = AcousticMetrics::default();
        assert_eq!(metrics.mean_pitch_hz, 0.0);
        assert_eq!(metrics.energy_ratio, 0.0);
    }
}
