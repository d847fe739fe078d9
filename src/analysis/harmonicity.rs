//! Harmonics-to-noise ratio contour.
//!
//! At each frame the normalized autocorrelation r of the best period
//! candidate splits signal power into a periodic part (r) and a noise part
//! (1 − r); HNR is their ratio in dB. The candidates come from the pitch
//! machinery run with every transition cost zeroed, so the raw correlation
//! survives the path search untouched.

use crate::analysis::pitch::{PitchParams, PitchTrack};
use crate::types::AudioData;

/// HNR values below this are treated as "unvoiced frame" markers.
const UNVOICED_DB: f64 = -200.0;

/// HNR contour in dB, one value per frame.
#[derive(Debug, Clone)]
pub struct Harmonicity {
    values: Vec<f64>,
}

impl Harmonicity {
    pub fn analyze(audio: &AudioData, min_pitch: f64) -> Self {
        let pitch = PitchTrack::analyze(audio, &PitchParams::correlation(min_pitch));
        let values = (0..pitch.num_frames())
            .map(|i| match pitch.strength_at_frame(i) {
                None => UNVOICED_DB,
                Some(r) if r <= 1e-15 => -150.0,
                Some(r) if r >= 1.0 - 1e-15 => 150.0,
                Some(r) => 10.0 * (r / (1.0 - r)).log10(),
            })
            .collect();
        Self { values }
    }

    /// Mean HNR over voiced frames, None when nothing is voiced.
    pub fn mean(&self) -> Option<f64> {
        let voiced: Vec<f64> = self
            .values
            .iter()
            .copied()
            .filter(|&v| v > UNVOICED_DB + 1.0)
            .collect();
        if voiced.is_empty() {
            None
        } else {
            Some(voiced.iter().sum::<f64>() / voiced.len() as f64)
        }
    }

    pub fn num_frames(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn pure_tone_has_high_hnr() {
        let sample_rate = 22_050u32;
        let samples: Vec<f32> = (0..sample_rate as usize / 2)
            .map(|i| (2.0 * PI * 200.0 * i as f64 / sample_rate as f64).sin() as f32 * 0.5)
            .collect();
        let audio = AudioData {
            samples,
            sample_rate,
        };

        let hnr = Harmonicity::analyze(&audio, 75.0);
        assert!(hnr.num_frames() > 0);
        let mean = hnr.mean().expect("voiced frames");
        assert!(mean > 10.0, "pure tone HNR {mean} dB should be high");
    }

    #[test]
    fn silence_has_no_mean() {
        let audio = AudioData {
            samples: vec![0.0; 22_050 / 2],
            sample_rate: 22_050,
        };
        let hnr = Harmonicity::analyze(&audio, 75.0);
        assert!(hnr.mean().is_none());
    }

    #[test]
    fn noise_scores_below_a_tone() {
        let sample_rate = 22_050u32;
        let n = sample_rate as usize / 2;
        // Deterministic pseudo-noise, no RNG dependency needed.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let noise: Vec<f32> = (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state >> 40) as f32 / 8_388_608.0) - 1.0
            })
            .collect();
        let tone: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 200.0 * i as f64 / sample_rate as f64).sin() as f32 * 0.5)
            .collect();

        let hnr_noise = Harmonicity::analyze(
            &AudioData {
                samples: noise,
                sample_rate,
            },
            75.0,
        );
        let hnr_tone = Harmonicity::analyze(
            &AudioData {
                samples: tone,
                sample_rate,
            },
            75.0,
        );

        let noise_mean = hnr_noise.mean().unwrap_or(UNVOICED_DB);
        let tone_mean = hnr_tone.mean().expect("tone is voiced");
        assert!(
            tone_mean > noise_mean,
            "tone {tone_mean} dB should exceed noise {noise_mean} dB"
        );
    }
}
