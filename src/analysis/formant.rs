//! Formant trajectory estimation.
//!
//! The buffer is brought down to twice the formant ceiling, pre-emphasized
//! above 50 Hz to flatten the glottal spectral slope, and cut into
//! Gaussian-windowed frames. Each frame is fitted with a Burg LPC model of
//! order 2×(number of formants); the model's pole pairs give the frame's
//! resonances.

use crate::analysis::{burg, dsp, AnalysisError, Result};
use crate::audio::resample;
use crate::types::AudioData;

const PRE_EMPHASIS_FROM_HZ: f64 = 50.0;
/// Half-length of the analysis window, seconds.
const HALF_WINDOW_SECONDS: f64 = 0.025;

/// One frame's resonances, lowest first. Slots with no surviving candidate
/// hold NaN.
#[derive(Debug, Clone)]
struct FormantFrame {
    frequencies: Vec<f64>,
}

/// Formant contours over a recording.
#[derive(Debug, Clone)]
pub struct FormantTrack {
    frames: Vec<FormantFrame>,
    start_time: f64,
    time_step: f64,
    max_formants: usize,
}

impl FormantTrack {
    /// Estimate up to `max_formants` formants below `max_formant_hz`.
    pub fn analyze(audio: &AudioData, max_formants: usize, max_formant_hz: f64) -> Result<Self> {
        let max_formants = max_formants.clamp(1, 10);
        let max_formant_hz = max_formant_hz
            .max(1_000.0)
            .min(audio.sample_rate as f64 / 2.0);

        // Everything above the ceiling is irrelevant to the pole fit, so
        // analyze at exactly twice the ceiling.
        let target_rate = (2.0 * max_formant_hz).round() as u32;
        let samples = if audio.sample_rate > target_rate {
            resample::linear_resample(&audio.samples, audio.sample_rate, target_rate)
                .map_err(|err| AnalysisError::Analysis(err.to_string()))?
        } else {
            audio.samples.clone()
        };
        let sample_rate = if audio.sample_rate > target_rate {
            target_rate as f64
        } else {
            audio.sample_rate as f64
        };

        let emphasized = pre_emphasis(&samples, sample_rate, PRE_EMPHASIS_FROM_HZ);

        let dx = 1.0 / sample_rate;
        let window_duration = 2.0 * HALF_WINDOW_SECONDS;
        let time_step = HALF_WINDOW_SECONDS / 4.0;
        let nsamp_window = (window_duration * sample_rate).floor() as usize;
        let halfnsamp_window = nsamp_window / 2;

        let duration = emphasized.len() as f64 * dx;
        if duration < window_duration || nsamp_window < 4 {
            return Err(AnalysisError::TooShort(format!(
                "{duration:.3}s of audio, need at least {window_duration:.3}s"
            )));
        }

        let window = dsp::gaussian_window(nsamp_window);
        let lpc_order = 2 * max_formants;
        let num_frames = 1 + ((duration - window_duration) / time_step).floor() as usize;
        let x1 = 0.5 * dx;
        let start_time = x1 + 0.5 * (duration - dx - (num_frames - 1) as f64 * time_step);

        let mut frames = Vec::with_capacity(num_frames);
        for frame_idx in 0..num_frames {
            let center = start_time + frame_idx as f64 * time_step;
            let left_sample = ((center - x1) / dx).floor() as isize;
            let start = (left_sample + 1 - halfnsamp_window as isize).max(0) as usize;
            let end = ((left_sample + halfnsamp_window as isize).max(0) as usize)
                .min(emphasized.len().saturating_sub(1));

            let windowed: Vec<f64> = emphasized[start..=end]
                .iter()
                .zip(window.iter())
                .map(|(&s, &w)| s * w)
                .collect();

            let mut frequencies = vec![f64::NAN; max_formants];
            if let Some(model) = burg::burg(&windowed, lpc_order) {
                let kept = burg::resonances(&model, sample_rate)
                    .into_iter()
                    .filter(|r| {
                        r.frequency > 50.0
                            && r.frequency < max_formant_hz
                            && r.bandwidth > 0.0
                            && r.bandwidth < max_formant_hz
                            && r.bandwidth < r.frequency * 2.0
                    })
                    .take(max_formants);
                for (slot, resonance) in frequencies.iter_mut().zip(kept) {
                    *slot = resonance.frequency;
                }
            }
            frames.push(FormantFrame { frequencies });
        }

        Ok(Self {
            frames,
            start_time,
            time_step,
            max_formants,
        })
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Mean frequency of formant `number` (1 = F1) over the frames where it
    /// is defined; None when it never is.
    pub fn mean_frequency(&self, number: usize) -> Option<f64> {
        if number == 0 || number > self.max_formants {
            return None;
        }
        let values: Vec<f64> = self
            .frames
            .iter()
            .map(|f| f.frequencies[number - 1])
            .filter(|f| f.is_finite())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Frequency of formant `number` at `time`, linearly interpolated
    /// between the two neighboring frames. NaN outside the analyzed range
    /// or where neither neighbor is defined.
    pub fn value_at_time(&self, number: usize, time: f64) -> f64 {
        if number == 0 || number > self.max_formants || self.frames.is_empty() {
            return f64::NAN;
        }

        let position = (time - self.start_time) / self.time_step;
        if position < -0.5 || position > self.frames.len() as f64 - 0.5 {
            return f64::NAN;
        }
        let position = position.clamp(0.0, (self.frames.len() - 1) as f64);

        let left = position.floor() as usize;
        let right = (left + 1).min(self.frames.len() - 1);
        let weight = position - left as f64;

        let a = self.frames[left].frequencies[number - 1];
        let b = self.frames[right].frequencies[number - 1];
        match (a.is_finite(), b.is_finite()) {
            (true, true) => a * (1.0 - weight) + b * weight,
            // Half-open shoulder: fall back to the defined neighbor.
            (true, false) if weight < 0.5 => a,
            (false, true) if weight >= 0.5 => b,
            _ => f64::NAN,
        }
    }
}

/// First-difference pre-emphasis with the coefficient tied to `from_hz`.
fn pre_emphasis(samples: &[f32], sample_rate: f64, from_hz: f64) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let alpha = (-2.0 * std::f64::consts::PI * from_hz / sample_rate).exp();
    let mut out = Vec::with_capacity(samples.len());
    out.push(samples[0] as f64);
    for i in 1..samples.len() {
        out.push(samples[i] as f64 - alpha * samples[i - 1] as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// A crude two-resonance vowel: harmonics of 120 Hz shaped by peaks
    /// near 700 and 1200 Hz.
    fn vowel_like(duration: f64, sample_rate: u32) -> AudioData {
        let n = (duration * sample_rate as f64) as usize;
        let f0 = 120.0;
        let peaks: [(f64, f64); 2] = [(700.0, 1.0), (1_200.0, 0.7)];
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                let mut value = 0.0;
                let mut harmonic = f0;
                while harmonic < 2_500.0 {
                    let gain: f64 = peaks
                        .iter()
                        .map(|&(fc, g)| g / (1.0 + ((harmonic - fc) / 150.0).powi(2)))
                        .sum();
                    value += gain * (2.0 * PI * harmonic * t).sin();
                    harmonic += f0;
                }
                (value * 0.05) as f32
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn finds_the_synthetic_resonances() {
        let audio = vowel_like(0.5, 22_050);
        let formants = FormantTrack::analyze(&audio, 5, 5_500.0).unwrap();
        assert!(formants.num_frames() > 0);

        let f1 = formants.mean_frequency(1).expect("F1 defined");
        assert!(
            (400.0..1_000.0).contains(&f1),
            "F1 {f1} Hz should sit near the 700 Hz peak"
        );
    }

    #[test]
    fn rejects_too_short_input() {
        let audio = AudioData {
            samples: vec![0.1; 100],
            sample_rate: 22_050,
        };
        assert!(matches!(
            FormantTrack::analyze(&audio, 5, 5_500.0),
            Err(AnalysisError::TooShort(_))
        ));
    }

    #[test]
    fn out_of_range_queries_are_nan() {
        let audio = vowel_like(0.3, 22_050);
        let formants = FormantTrack::analyze(&audio, 5, 5_500.0).unwrap();
        assert!(formants.value_at_time(1, -1.0).is_nan());
        assert!(formants.value_at_time(1, 99.0).is_nan());
        assert!(formants.value_at_time(0, 0.1).is_nan());
        assert!(formants.mean_frequency(0).is_none());
        assert!(formants.mean_frequency(9).is_none());
    }
}
