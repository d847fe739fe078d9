use anyhow::{ensure, Result};

/// Linearly resample `samples` from `source_rate` to `target_rate`.
///
/// Linear interpolation is adequate here: every statistic downstream works
/// on windows of hundreds of samples and the inputs are speech-band signals
/// far below the Nyquist frequency of either rate.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = ((samples.len() as f64) * ratio).ceil().max(1.0) as usize;
    let last_index = samples.len() - 1;

    let mut output = Vec::with_capacity(output_len);
    for i in 0..output_len {
        let position = i as f64 / ratio;
        let left = (position.floor() as usize).min(last_index);
        let right = (left + 1).min(last_index);
        let t = (position - left as f64) as f32;
        output.push(samples[left] * (1.0 - t) + samples[right] * t);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::linear_resample;

    #[test]
    fn preserves_constant_signal() {
        let input = vec![0.25; 441];
        let resampled = linear_resample(&input, 44_100, 22_050).unwrap();
        assert_eq!(resampled.len(), 221);
        assert!(resampled.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn identity_when_rates_match() {
        let input = vec![0.1, -0.2, 0.3];
        let resampled = linear_resample(&input, 22_050, 22_050).unwrap();
        assert_eq!(resampled, input);
    }

    #[test]
    fn upsampling_interpolates_between_neighbors() {
        let input = vec![0.0, 1.0];
        let resampled = linear_resample(&input, 1, 2).unwrap();
        assert_eq!(resampled.len(), 4);
        assert!((resampled[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(linear_resample(&[0.0], 0, 22_050).is_err());
        assert!(linear_resample(&[0.0], 22_050, 0).is_err());
    }
}
