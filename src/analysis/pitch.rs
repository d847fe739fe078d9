//! Pitch (F0) tracking by short-term autocorrelation.
//!
//! Windowed autocorrelation per frame, normalized by the window's own
//! autocorrelation, gives a set of period candidates; a Viterbi pass picks
//! the cheapest path through the candidates using octave and voicing
//! transition costs. This is the classic design described by Boersma (1993)
//! for accurate short-term F0 and harmonics-to-noise analysis.

use rustfft::FftPlanner;

use crate::analysis::dsp;
use crate::types::AudioData;

/// Analysis window shape for the correlation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowShape {
    Hann,
    Gaussian,
}

/// Tuning knobs for one tracking run.
#[derive(Debug, Clone, Copy)]
pub struct PitchParams {
    /// Time between frame centers, seconds; 0 picks a default from the floor
    pub time_step: f64,
    /// Lowest candidate frequency, Hz
    pub floor: f64,
    /// Highest candidate frequency, Hz (clamped to Nyquist)
    pub ceiling: f64,
    pub max_candidates: usize,
    pub silence_threshold: f64,
    pub voicing_threshold: f64,
    pub octave_cost: f64,
    pub octave_jump_cost: f64,
    pub voiced_unvoiced_cost: f64,
    pub periods_per_window: f64,
    pub window: WindowShape,
}

impl PitchParams {
    /// Standard F0 tracking configuration.
    pub fn tracking(floor: f64, ceiling: f64) -> Self {
        Self {
            time_step: 0.0,
            floor,
            ceiling,
            max_candidates: 15,
            silence_threshold: 0.03,
            voicing_threshold: 0.45,
            octave_cost: 0.01,
            octave_jump_cost: 0.35,
            voiced_unvoiced_cost: 0.14,
            periods_per_window: 3.0,
            window: WindowShape::Hann,
        }
    }

    /// Configuration for the harmonicity pass: one period per Gaussian
    /// window, every transition cost zeroed so the raw correlation strength
    /// of the best candidate survives the path search.
    pub fn correlation(min_pitch: f64) -> Self {
        Self {
            time_step: 0.01,
            floor: min_pitch,
            ceiling: f64::INFINITY,
            max_candidates: 15,
            silence_threshold: 0.1,
            voicing_threshold: 0.0,
            octave_cost: 0.0,
            octave_jump_cost: 0.0,
            voiced_unvoiced_cost: 0.0,
            periods_per_window: 1.0,
            window: WindowShape::Gaussian,
        }
    }
}

/// One period hypothesis for a frame.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// Frequency in Hz; 0.0 marks the unvoiced hypothesis
    pub frequency: f64,
    /// Normalized autocorrelation at the candidate lag
    pub strength: f64,
}

/// One analysis frame. After the path search the winning candidate sits at
/// index 0.
#[derive(Debug, Clone)]
pub struct PitchFrame {
    pub candidates: Vec<Candidate>,
    /// Local peak amplitude relative to the recording's global peak
    pub intensity: f64,
}

/// F0 contour over a recording.
#[derive(Debug, Clone)]
pub struct PitchTrack {
    frames: Vec<PitchFrame>,
    start_time: f64,
    time_step: f64,
    ceiling: f64,
}

impl PitchTrack {
    pub fn analyze(audio: &AudioData, params: &PitchParams) -> Self {
        let sample_rate = audio.sample_rate as f64;
        let dx = 1.0 / sample_rate;
        let floor = params.floor.max(10.0);
        let ceiling = params.ceiling.min(0.5 * sample_rate);

        // The Gaussian window needs twice the span to keep the same lag
        // range usable; its taper eats the outer half of the window.
        let periods_per_window = match params.window {
            WindowShape::Hann => params.periods_per_window,
            WindowShape::Gaussian => params.periods_per_window * 2.0,
        };

        let dt = if params.time_step <= 0.0 {
            periods_per_window / floor / 4.0
        } else {
            params.time_step
        };

        let samples: Vec<f64> = audio.samples.iter().map(|&s| s as f64).collect();
        let nx = samples.len();

        let nsamp_period = (sample_rate / floor).floor() as usize;
        let halfnsamp_period = nsamp_period / 2 + 1;

        let dt_window = periods_per_window / floor;
        let nsamp_window_raw = (dt_window * sample_rate).floor() as usize;
        let halfnsamp_window = (nsamp_window_raw / 2).saturating_sub(1);
        if halfnsamp_window < 2 {
            return Self::empty(dt, ceiling);
        }
        let nsamp_window = halfnsamp_window * 2;

        let maximum_lag =
            (((nsamp_window as f64 / periods_per_window).floor() as usize) + 2).min(nsamp_window);

        let duration = dx * nx as f64;
        if duration < dt_window {
            return Self::empty(dt, ceiling);
        }
        let number_of_frames = ((duration - dt_window) / dt).floor() as usize + 1;

        // Frames are laid out symmetrically around the middle of the signal.
        let mid_time = 0.5 * duration;
        let t1 = mid_time - 0.5 * (number_of_frames as f64 * dt) + 0.5 * dt;

        let window = match params.window {
            WindowShape::Hann => dsp::hann_window(nsamp_window),
            WindowShape::Gaussian => dsp::gaussian_window(nsamp_window),
        };

        // Enough zero padding past the window keeps the circular product
        // linear over every scanned lag.
        let fft_size = dsp::next_power_of_two(nsamp_window + maximum_lag);
        let mut planner = FftPlanner::new();

        // Autocorrelation of the window itself, used to undo the taper's
        // damping of the signal autocorrelation at each lag.
        let window_ac = dsp::autocorrelation(&mut planner, &window, fft_size);
        let mut window_r = vec![0.0; nsamp_window + 1];
        window_r[0] = 1.0;
        if window_ac[0] > 0.0 {
            for lag in 1..=nsamp_window.min(window_ac.len() - 1) {
                window_r[lag] = window_ac[lag] / window_ac[0];
            }
        }

        let mean = samples.iter().sum::<f64>() / nx as f64;
        let global_peak = samples.iter().map(|&s| (s - mean).abs()).fold(0.0, f64::max);
        if global_peak == 0.0 {
            return Self::empty(dt, ceiling);
        }

        let max_candidates = params.max_candidates.max((ceiling / floor).floor() as usize);

        let mut frames = Vec::with_capacity(number_of_frames);
        for iframe in 0..number_of_frames {
            let time = t1 + iframe as f64 * dt;
            frames.push(analyze_frame(FrameContext {
                samples: &samples,
                sample_rate,
                time,
                floor,
                max_candidates,
                voicing_threshold: params.voicing_threshold,
                octave_cost: params.octave_cost,
                nsamp_window,
                halfnsamp_window,
                nsamp_period,
                halfnsamp_period,
                maximum_lag,
                global_peak,
                window: &window,
                window_r: &window_r,
                fft_size,
                planner: &mut planner,
            }));
        }

        find_best_path(
            &mut frames,
            params.silence_threshold,
            params.voicing_threshold,
            params.octave_cost,
            params.octave_jump_cost,
            params.voiced_unvoiced_cost,
            ceiling,
            dt,
        );

        Self {
            frames,
            start_time: t1,
            time_step: dt,
            ceiling,
        }
    }

    fn empty(time_step: f64, ceiling: f64) -> Self {
        Self {
            frames: Vec::new(),
            start_time: 0.0,
            time_step,
            ceiling,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Frame center times, seconds.
    pub fn times(&self) -> Vec<f64> {
        (0..self.frames.len())
            .map(|i| self.start_time + i as f64 * self.time_step)
            .collect()
    }

    /// Winning frequency of a frame, None when unvoiced.
    pub fn frequency_at_frame(&self, frame: usize) -> Option<f64> {
        self.frames.get(frame).and_then(|f| self.winner(f))
    }

    /// Correlation strength of the winning candidate, None when unvoiced.
    pub fn strength_at_frame(&self, frame: usize) -> Option<f64> {
        let frame = self.frames.get(frame)?;
        self.winner(frame)?;
        frame.candidates.first().map(|c| c.strength)
    }

    pub fn is_voiced(&self, frame: usize) -> bool {
        self.frequency_at_frame(frame).is_some()
    }

    pub fn count_voiced(&self) -> usize {
        (0..self.frames.len()).filter(|&i| self.is_voiced(i)).count()
    }

    /// Mean F0 over voiced frames, None when nothing is voiced.
    pub fn mean_frequency(&self) -> Option<f64> {
        let voiced: Vec<f64> = (0..self.frames.len())
            .filter_map(|i| self.frequency_at_frame(i))
            .collect();
        if voiced.is_empty() {
            None
        } else {
            Some(voiced.iter().sum::<f64>() / voiced.len() as f64)
        }
    }

    fn winner(&self, frame: &PitchFrame) -> Option<f64> {
        let candidate = frame.candidates.first()?;
        (candidate.frequency > 0.0 && candidate.frequency < self.ceiling)
            .then_some(candidate.frequency)
    }
}

struct FrameContext<'a> {
    samples: &'a [f64],
    sample_rate: f64,
    time: f64,
    floor: f64,
    max_candidates: usize,
    voicing_threshold: f64,
    octave_cost: f64,
    nsamp_window: usize,
    halfnsamp_window: usize,
    nsamp_period: usize,
    halfnsamp_period: usize,
    maximum_lag: usize,
    global_peak: f64,
    window: &'a [f64],
    window_r: &'a [f64],
    fft_size: usize,
    planner: &'a mut FftPlanner<f64>,
}

fn analyze_frame(ctx: FrameContext<'_>) -> PitchFrame {
    let dx = 1.0 / ctx.sample_rate;
    let nx = ctx.samples.len();
    let x1 = 0.5 * dx;

    let left_sample = ((ctx.time - x1) / dx).floor() as isize;
    let right_sample = left_sample + 1;

    // Local mean over one longest period to either side of the center.
    let mean_start = (right_sample - ctx.nsamp_period as isize).max(0) as usize;
    let mean_end = ((left_sample + ctx.nsamp_period as isize).max(0) as usize).min(nx);
    let local_mean = if mean_end > mean_start {
        ctx.samples[mean_start..mean_end].iter().sum::<f64>() / (mean_end - mean_start) as f64
    } else {
        0.0
    };

    let start_sample = (right_sample - ctx.halfnsamp_window as isize).max(0) as usize;
    let end_sample = ((left_sample + ctx.halfnsamp_window as isize).max(0) as usize).min(nx);

    let mut frame_data = vec![0.0; ctx.fft_size];
    for (j, i) in (start_sample..end_sample).enumerate() {
        if j < ctx.nsamp_window {
            frame_data[j] = (ctx.samples[i] - local_mean) * ctx.window[j];
        }
    }

    // Peak within half a period of the center, for the silence decision.
    let peak_start = ctx.halfnsamp_window.saturating_sub(ctx.halfnsamp_period);
    let peak_end = (ctx.halfnsamp_window + ctx.halfnsamp_period).min(ctx.nsamp_window);
    let local_peak = frame_data[peak_start..peak_end]
        .iter()
        .map(|v| v.abs())
        .fold(0.0, f64::max);

    let intensity = (local_peak / ctx.global_peak).min(1.0);

    // Candidate 0 is always the unvoiced hypothesis.
    let mut candidates = vec![Candidate {
        frequency: 0.0,
        strength: 0.0,
    }];

    if local_peak == 0.0 {
        return PitchFrame {
            candidates,
            intensity,
        };
    }

    let ac = dsp::autocorrelation(ctx.planner, &frame_data, ctx.fft_size);

    let top_lag = ctx
        .maximum_lag
        .min(ctx.nsamp_window)
        .min(ac.len().saturating_sub(1));
    let mut r = vec![0.0; top_lag + 2];
    r[0] = 1.0;
    if ac[0] > 0.0 {
        for lag in 1..=top_lag {
            if ctx.window_r[lag].abs() > 1e-10 {
                r[lag] = ac[lag] / (ac[0] * ctx.window_r[lag]);
            }
        }
    }

    // Scan for local maxima above the half-voicing threshold; each becomes a
    // period candidate after parabolic refinement of the lag.
    for lag in 2..ctx.maximum_lag.min(top_lag) {
        let here = r[lag];
        let before = r[lag - 1];
        let after = r[lag + 1];
        if here <= 0.5 * ctx.voicing_threshold || here <= before || here < after {
            continue;
        }

        let dr = 0.5 * (after - before);
        let d2r = 2.0 * here - before - after;
        if d2r <= 0.0 {
            continue;
        }

        let refined_lag = lag as f64 + dr / d2r;
        let frequency = ctx.sample_rate / refined_lag;
        let strength_raw = here + 0.5 * dr * dr / d2r;
        let strength = if strength_raw > 1.0 {
            1.0 / strength_raw
        } else {
            strength_raw
        };

        place_candidate(
            &mut candidates,
            Candidate {
                frequency,
                strength,
            },
            ctx.max_candidates,
            ctx.octave_cost,
            ctx.floor,
        );
    }

    PitchFrame {
        candidates,
        intensity,
    }
}

/// Insert a candidate, evicting the locally weakest one once the frame is
/// full. Weakness is judged with the octave cost applied, so a strong but
/// implausibly low candidate can still lose its seat.
fn place_candidate(
    candidates: &mut Vec<Candidate>,
    new: Candidate,
    max_candidates: usize,
    octave_cost: f64,
    floor: f64,
) {
    let local_strength =
        |c: &Candidate| c.strength - octave_cost * (floor / c.frequency).log2();

    if candidates.len() < max_candidates {
        candidates.push(new);
        return;
    }

    let mut weakest_place = 0;
    let mut weakest = f64::INFINITY;
    for (place, candidate) in candidates.iter().enumerate().skip(1) {
        let strength = local_strength(candidate);
        if strength < weakest {
            weakest = strength;
            weakest_place = place;
        }
    }
    if weakest_place > 0 && local_strength(&new) > weakest {
        candidates[weakest_place] = new;
    }
}

/// Viterbi pass over the per-frame candidates.
#[allow(clippy::too_many_arguments)]
fn find_best_path(
    frames: &mut [PitchFrame],
    silence_threshold: f64,
    voicing_threshold: f64,
    octave_cost: f64,
    octave_jump_cost: f64,
    voiced_unvoiced_cost: f64,
    ceiling: f64,
    dt: f64,
) {
    if frames.is_empty() {
        return;
    }
    let num_frames = frames.len();

    // Transition costs are specified per 10 ms of frame step.
    let correction = 0.01 / dt;
    let octave_jump_cost = octave_jump_cost * correction;
    let voiced_unvoiced_cost = voiced_unvoiced_cost * correction;

    let voiceless = |c: &Candidate| c.frequency <= 0.0 || c.frequency >= ceiling;

    let mut delta: Vec<Vec<f64>> = Vec::with_capacity(num_frames);
    let mut psi: Vec<Vec<usize>> = Vec::with_capacity(num_frames);

    for frame in frames.iter() {
        let unvoiced_strength = if silence_threshold <= 0.0 {
            0.0
        } else {
            let intensity_factor =
                frame.intensity / (silence_threshold / (1.0 + voicing_threshold));
            voicing_threshold + (2.0 - intensity_factor).max(0.0)
        };

        let scores: Vec<f64> = frame
            .candidates
            .iter()
            .map(|c| {
                if voiceless(c) {
                    unvoiced_strength
                } else {
                    c.strength - octave_cost * (ceiling / c.frequency).log2()
                }
            })
            .collect();
        psi.push(vec![0; scores.len()]);
        delta.push(scores);
    }

    for iframe in 1..num_frames {
        let (head, tail) = frames.split_at(iframe);
        let prev_frame = &head[iframe - 1];
        let cur_frame = &tail[0];

        for icur in 0..cur_frame.candidates.len() {
            let cur = &cur_frame.candidates[icur];
            let mut best = f64::NEG_INFINITY;
            let mut best_prev = 0;

            for (iprev, prev) in prev_frame.candidates.iter().enumerate() {
                let transition = match (voiceless(prev), voiceless(cur)) {
                    (true, true) => 0.0,
                    (true, false) | (false, true) => voiced_unvoiced_cost,
                    (false, false) => {
                        octave_jump_cost * (prev.frequency / cur.frequency).log2().abs()
                    }
                };
                let value = delta[iframe - 1][iprev] - transition + delta[iframe][icur];
                if value > best {
                    best = value;
                    best_prev = iprev;
                }
            }

            delta[iframe][icur] = best;
            psi[iframe][icur] = best_prev;
        }
    }

    // Backtrack, swapping each frame's winner to the front.
    let last = &delta[num_frames - 1];
    let mut place = last
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);

    for iframe in (0..num_frames).rev() {
        if place != 0 && place < frames[iframe].candidates.len() {
            frames[iframe].candidates.swap(0, place);
        }
        place = psi[iframe][place];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(frequency: f64, duration: f64, sample_rate: u32) -> AudioData {
        let n = (duration * sample_rate as f64) as usize;
        AudioData {
            samples: (0..n)
                .map(|i| {
                    (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin() as f32 * 0.5
                })
                .collect(),
            sample_rate,
        }
    }

    #[test]
    fn tracks_a_pure_tone() {
        let audio = tone(150.0, 0.6, 22_050);
        let pitch = PitchTrack::analyze(&audio, &PitchParams::tracking(75.0, 600.0));

        assert!(pitch.num_frames() > 0);
        assert!(pitch.count_voiced() > pitch.num_frames() / 2);

        let mean = pitch.mean_frequency().expect("voiced frames expected");
        assert!(
            (mean - 150.0).abs() < 5.0,
            "mean pitch {mean} Hz should be near 150 Hz"
        );
    }

    #[test]
    fn silence_has_no_voiced_frames() {
        let audio = AudioData {
            samples: vec![0.0; 22_050 / 2],
            sample_rate: 22_050,
        };
        let pitch = PitchTrack::analyze(&audio, &PitchParams::tracking(75.0, 600.0));
        assert_eq!(pitch.count_voiced(), 0);
        assert!(pitch.mean_frequency().is_none());
    }

    #[test]
    fn too_short_input_yields_empty_track() {
        let audio = tone(150.0, 0.01, 22_050);
        let pitch = PitchTrack::analyze(&audio, &PitchParams::tracking(75.0, 600.0));
        assert_eq!(pitch.num_frames(), 0);
    }

    #[test]
    fn frame_times_are_monotonic() {
        let audio = tone(200.0, 0.5, 22_050);
        let pitch = PitchTrack::analyze(&audio, &PitchParams::tracking(75.0, 600.0));
        let times = pitch.times();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }
}
