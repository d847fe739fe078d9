//! Short-time magnitude spectrum and the band energy ratio.

use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::analysis::dsp;
use crate::config::AnalysisConfig;
use crate::types::AudioData;

/// STFT magnitude matrix, frequency bins × frames, plus the geometry needed
/// to map indices back to Hz and seconds.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Linear magnitudes, shape (bins, frames); bin 0 is DC.
    magnitudes: Array2<f32>,
    sample_rate: u32,
    fft_size: usize,
    hop: usize,
}

impl Spectrogram {
    /// Compute the magnitude STFT with a Hann window.
    ///
    /// Input shorter than one frame is zero-padded so even the shortest
    /// decodable upload produces a one-column matrix.
    pub fn compute(audio: &AudioData, config: &AnalysisConfig) -> Self {
        let fft_size = config.stft_size;
        let hop = config.stft_hop;
        let bins = fft_size / 2 + 1;

        let window = dsp::hann_window(fft_size);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let num_frames = if audio.samples.len() < fft_size {
            1
        } else {
            (audio.samples.len() - fft_size) / hop + 1
        };

        let mut magnitudes = Array2::zeros((bins, num_frames));
        let mut buffer = vec![Complex::new(0.0f64, 0.0); fft_size];

        for frame in 0..num_frames {
            let start = frame * hop;
            for (i, value) in buffer.iter_mut().enumerate() {
                let sample = audio
                    .samples
                    .get(start + i)
                    .copied()
                    .unwrap_or(0.0) as f64;
                *value = Complex::new(sample * window[i], 0.0);
            }
            fft.process(&mut buffer);
            for bin in 0..bins {
                magnitudes[(bin, frame)] = buffer[bin].norm() as f32;
            }
        }

        Self {
            magnitudes,
            sample_rate: audio.sample_rate,
            fft_size,
            hop,
        }
    }

    /// Summed magnitude at or below `split_hz` divided by the summed
    /// magnitude above it; 0 when the high band holds no energy at all.
    pub fn band_energy_ratio(&self, split_hz: f64) -> f64 {
        let mut low = 0.0f64;
        let mut high = 0.0f64;
        for (bin, row) in self.magnitudes.outer_iter().enumerate() {
            let band = if self.bin_frequency(bin) <= split_hz {
                &mut low
            } else {
                &mut high
            };
            *band += row.iter().map(|&m| m as f64).sum::<f64>();
        }
        if high > 0.0 {
            low / high
        } else {
            0.0
        }
    }

    /// Magnitudes in dB relative to the matrix maximum, floored at -80 dB,
    /// the scaling used by the heat-map.
    pub fn to_db(&self) -> Array2<f32> {
        const FLOOR_DB: f32 = -80.0;
        let reference = self.magnitudes.iter().copied().fold(0.0f32, f32::max);
        if reference <= 0.0 {
            return Array2::from_elem(self.magnitudes.dim(), FLOOR_DB);
        }
        self.magnitudes
            .mapv(|m| (20.0 * (m / reference).log10()).max(FLOOR_DB))
    }

    pub fn num_bins(&self) -> usize {
        self.magnitudes.nrows()
    }

    pub fn num_frames(&self) -> usize {
        self.magnitudes.ncols()
    }

    /// Center frequency of a bin, Hz.
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.fft_size as f64
    }

    /// Start time of a frame, seconds.
    pub fn frame_time(&self, frame: usize) -> f64 {
        frame as f64 * self.hop as f64 / self.sample_rate as f64
    }

    pub fn magnitudes(&self) -> &Array2<f32> {
        &self.magnitudes
    }
}
