//! Glottal pulse extraction and the perturbation measures built on it.
//!
//! Voiced stretches of the pitch contour are walked period by period; the
//! strongest local extremum inside each expected cycle becomes a pulse.
//! Jitter and shimmer then compare consecutive cycle lengths and cycle peak
//! amplitudes under fixed plausibility bounds.

use crate::analysis::pitch::PitchTrack;
use crate::analysis::{AnalysisError, Result};
use crate::types::AudioData;

/// Shortest believable glottal period, seconds.
const PERIOD_FLOOR: f64 = 1.0e-4;
/// Longest believable glottal period, seconds.
const PERIOD_CEILING: f64 = 0.02;
/// Largest allowed ratio between consecutive periods.
const MAX_PERIOD_FACTOR: f64 = 1.3;
/// Largest allowed ratio between consecutive cycle amplitudes.
const MAX_AMPLITUDE_FACTOR: f64 = 1.6;

/// Detected pulse train: one timestamp and peak amplitude per cycle.
#[derive(Debug, Clone)]
pub struct PulseTrain {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl PulseTrain {
    /// Pick pulses along the voiced intervals of `pitch`.
    ///
    /// Fails outright (rather than returning an empty train) when the
    /// contour has no usable voiced stretch, e.g. on silence or input
    /// shorter than one analysis window.
    pub fn extract(audio: &AudioData, pitch: &PitchTrack) -> Result<Self> {
        if pitch.num_frames() == 0 {
            return Err(AnalysisError::TooShort(
                "no pitch frames to anchor pulses on".into(),
            ));
        }

        let sample_rate = audio.sample_rate as f64;
        let frame_times = pitch.times();

        let mut times = Vec::new();
        let mut amplitudes = Vec::new();

        for (start_frame, end_frame) in voiced_intervals(pitch) {
            let interval_start = frame_times[start_frame];
            let interval_end = frame_times[end_frame];

            let Some(mut frequency) = pitch.frequency_at_frame(start_frame) else {
                continue;
            };

            // Seed on the strongest peak of the first expected cycle.
            let mut period = 1.0 / frequency;
            let Some((mut pulse_time, mut amplitude)) =
                peak_in_window(audio, interval_start, interval_start + period)
            else {
                continue;
            };
            times.push(pulse_time);
            amplitudes.push(amplitude);

            loop {
                let frame = nearest_frame(&frame_times, pulse_time)
                    .clamp(start_frame, end_frame);
                if let Some(f) = pitch.frequency_at_frame(frame) {
                    frequency = f;
                }
                period = 1.0 / frequency;

                // The next pulse is expected one period on; allow it to
                // arrive a little early or late.
                let window_start = pulse_time + 0.8 * period;
                let window_end = pulse_time + 1.25 * period;
                if window_start > interval_end + 0.5 * period {
                    break;
                }
                match peak_in_window(audio, window_start, window_end) {
                    Some((t, a)) => {
                        pulse_time = t;
                        amplitude = a;
                        times.push(pulse_time);
                        amplitudes.push(amplitude);
                    }
                    None => break,
                }
                if times.len() > (audio.samples.len() as f64 / sample_rate / PERIOD_FLOOR) as usize
                {
                    break;
                }
            }
        }

        if times.len() < 3 {
            return Err(AnalysisError::TooShort(format!(
                "only {} pulses detected, need at least 3",
                times.len()
            )));
        }

        Ok(Self { times, amplitudes })
    }

    pub fn num_pulses(&self) -> usize {
        self.times.len()
    }

    /// Jitter (local): mean absolute difference between consecutive periods
    /// over the mean period, both restricted to plausible cycles.
    pub fn jitter_local(&self) -> Option<f64> {
        let periods = self.periods();

        let valid: Vec<f64> = periods.iter().copied().filter(|&p| period_ok(p)).collect();
        if valid.is_empty() {
            return None;
        }
        let mean_period = valid.iter().sum::<f64>() / valid.len() as f64;

        let mut diff_sum = 0.0;
        let mut pairs = 0usize;
        for pair in periods.windows(2) {
            if period_ok(pair[0])
                && period_ok(pair[1])
                && ratio(pair[0], pair[1]) <= MAX_PERIOD_FACTOR
            {
                diff_sum += (pair[1] - pair[0]).abs();
                pairs += 1;
            }
        }
        if pairs == 0 || mean_period <= 0.0 {
            return None;
        }
        Some((diff_sum / pairs as f64) / mean_period)
    }

    /// Shimmer (local): mean absolute difference between consecutive cycle
    /// peak amplitudes over the mean amplitude.
    pub fn shimmer_local(&self) -> Option<f64> {
        let periods = self.periods();

        let mut diff_sum = 0.0;
        let mut pairs = 0usize;
        let mut amp_sum = 0.0;
        let mut amps = 0usize;

        for i in 0..periods.len() {
            // The period between two pulses gates the amplitude pair that
            // spans it.
            if !period_ok(periods[i]) {
                continue;
            }
            let (a, b) = (self.amplitudes[i], self.amplitudes[i + 1]);
            amp_sum += a;
            amps += 1;
            if a > 0.0 && b > 0.0 && ratio(a, b) <= MAX_AMPLITUDE_FACTOR {
                diff_sum += (b - a).abs();
                pairs += 1;
            }
        }

        if pairs == 0 || amps == 0 {
            return None;
        }
        let mean_amplitude = amp_sum / amps as f64;
        if mean_amplitude <= 0.0 {
            return None;
        }
        Some((diff_sum / pairs as f64) / mean_amplitude)
    }

    fn periods(&self) -> Vec<f64> {
        self.times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

fn period_ok(period: f64) -> bool {
    (PERIOD_FLOOR..=PERIOD_CEILING).contains(&period)
}

fn ratio(a: f64, b: f64) -> f64 {
    if a > b {
        a / b
    } else {
        b / a
    }
}

/// Consecutive runs of voiced frames, as (first, last) frame indices.
fn voiced_intervals(pitch: &PitchTrack) -> Vec<(usize, usize)> {
    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;
    for frame in 0..pitch.num_frames() {
        match (pitch.is_voiced(frame), run_start) {
            (true, None) => run_start = Some(frame),
            (false, Some(start)) => {
                intervals.push((start, frame - 1));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        intervals.push((start, pitch.num_frames() - 1));
    }
    intervals
}

/// Strongest absolute extremum between two times; None when the window
/// falls outside the samples or is empty.
fn peak_in_window(audio: &AudioData, start: f64, end: f64) -> Option<(f64, f64)> {
    let sample_rate = audio.sample_rate as f64;
    let first = (start * sample_rate).ceil().max(0.0) as usize;
    let last = ((end * sample_rate).floor() as usize).min(audio.samples.len().saturating_sub(1));
    if first > last {
        return None;
    }

    let mut best_index = first;
    let mut best_value = 0.0f32;
    for (index, &sample) in audio.samples[first..=last].iter().enumerate() {
        if sample.abs() > best_value {
            best_value = sample.abs();
            best_index = first + index;
        }
    }
    if best_value == 0.0 {
        return None;
    }
    Some((best_index as f64 / sample_rate, best_value as f64))
}

fn nearest_frame(frame_times: &[f64], time: f64) -> usize {
    match frame_times.binary_search_by(|t| t.total_cmp(&time)) {
        Ok(index) => index,
        Err(0) => 0,
        Err(index) if index >= frame_times.len() => frame_times.len() - 1,
        Err(index) => {
            if time - frame_times[index - 1] <= frame_times[index] - time {
                index - 1
            } else {
                index
            }
        }
    }
}
