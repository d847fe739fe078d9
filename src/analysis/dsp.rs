//! Small shared DSP helpers: analysis windows and FFT-based autocorrelation.

use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Hann window, periodic form over `size + 1` points.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let i1 = (i + 1) as f64;
            0.5 - 0.5 * (2.0 * PI * i1 / (size + 1) as f64).cos()
        })
        .collect()
}

/// Gaussian window with edges pulled to zero, the shape used for the
/// correlation-based passes.
pub fn gaussian_window(size: usize) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    let edge = (-12.0_f64).exp();
    let imid = 0.5 * (size + 1) as f64;
    let denom = (size + 1) as f64;
    (0..size)
        .map(|i| {
            let i1 = (i + 1) as f64;
            let gaussian = (-48.0 * (i1 - imid) * (i1 - imid) / (denom * denom)).exp();
            (gaussian - edge) / (1.0 - edge)
        })
        .collect()
}

/// Raw (biased, un-normalized) autocorrelation of `data`, computed through a
/// length-`fft_size` transform. `data` shorter than `fft_size` is zero-padded,
/// which keeps the circular wrap-around out of the lags of interest.
pub fn autocorrelation(planner: &mut FftPlanner<f64>, data: &[f64], fft_size: usize) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = data
        .iter()
        .map(|&x| Complex::new(x, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_size)
        .collect();

    planner.plan_fft_forward(fft_size).process(&mut buffer);
    for value in buffer.iter_mut() {
        *value = Complex::new(value.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(fft_size).process(&mut buffer);

    let scale = 1.0 / fft_size as f64;
    buffer.iter().map(|c| c.re * scale).collect()
}

/// Next power of two at or above `n`.
pub fn next_power_of_two(n: usize) -> usize {
    let mut size = 1;
    while size < n {
        size *= 2;
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hann_is_symmetric_and_bounded() {
        let window = hann_window(64);
        for (a, b) in window.iter().zip(window.iter().rev()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert!(window.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn gaussian_edges_reach_zero() {
        let window = gaussian_window(33);
        assert!(window[0].abs() < 1e-3);
        assert!(window[16] > 0.9);
    }

    #[test]
    fn autocorrelation_peaks_at_signal_period() {
        // 100-sample period sine; lag 100 should dominate every nearby lag.
        let data: Vec<f64> = (0..400).map(|i| (2.0 * PI * i as f64 / 100.0).sin()).collect();
        let mut planner = FftPlanner::new();
        let ac = autocorrelation(&mut planner, &data, next_power_of_two(800));
        assert!(ac[100] > ac[50]);
        assert!(ac[100] > ac[150]);
        assert!(ac[0] >= ac[100]);
    }
}
