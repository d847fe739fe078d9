use anyhow::{ensure, Result};

/// Analysis settings shared by the CLI and the studio window.
///
/// The defaults mirror common speech-analysis practice: everything is
/// resampled to a fixed 22.05 kHz before analysis, pitch is tracked between
/// 75 and 600 Hz, and formants are searched below a 5.5 kHz ceiling.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// Fixed sample rate every input is converted to before analysis, Hz
    pub analysis_sample_rate: u32,
    /// Lowest pitch the tracker considers, Hz
    pub pitch_floor: f64,
    /// Highest pitch the tracker considers, Hz
    pub pitch_ceiling: f64,
    /// Highest formant frequency of interest, Hz
    pub max_formant_hz: f64,
    /// Number of formants extracted per frame
    pub max_formants: usize,
    /// STFT frame length in samples
    pub stft_size: usize,
    /// STFT hop in samples
    pub stft_hop: usize,
    /// Boundary between the low and high spectral bands, Hz
    pub band_split_hz: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analysis_sample_rate: 22_050,
            pitch_floor: 75.0,
            pitch_ceiling: 600.0,
            max_formant_hz: 5_500.0,
            max_formants: 5,
            stft_size: 2_048,
            stft_hop: 512,
            band_split_hz: 1_000.0,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.analysis_sample_rate > 0,
            "analysis sample rate must be positive"
        );
        ensure!(self.pitch_floor > 0.0, "pitch floor must be positive");
        ensure!(
            self.pitch_ceiling > self.pitch_floor,
            "pitch ceiling ({}) must be above the pitch floor ({})",
            self.pitch_ceiling,
            self.pitch_floor
        );
        ensure!(
            self.max_formant_hz * 2.0 <= self.analysis_sample_rate as f64,
            "formant ceiling ({} Hz) must fit below the Nyquist frequency",
            self.max_formant_hz
        );
        ensure!(
            (1..=10).contains(&self.max_formants),
            "formant count must be between 1 and 10"
        );
        ensure!(
            self.stft_size.is_power_of_two(),
            "STFT size must be a power of two"
        );
        ensure!(
            self.stft_hop > 0 && self.stft_hop <= self.stft_size,
            "STFT hop must be positive and no larger than the frame"
        );
        ensure!(
            self.band_split_hz > 0.0
                && self.band_split_hz < self.analysis_sample_rate as f64 / 2.0,
            "band split must lie inside the analyzed spectrum"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisConfig;

    #[test]
    fn default_config_is_valid() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_pitch_range() {
        let config = AnalysisConfig {
            pitch_floor: 600.0,
            pitch_ceiling: 75.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_formant_ceiling_above_nyquist() {
        let config = AnalysisConfig {
            max_formant_hz: 20_000.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
