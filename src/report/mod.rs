//! Report assembly and rendering.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::spectrum::Spectrogram;
use crate::analysis::AnalysisOutcome;
use crate::types::{AcousticMetrics, FormantTracks};

/// Everything one processed upload produces, ready for either front-end.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Display name of the uploaded file
    pub source_name: String,
    /// Analyzed duration, seconds
    pub duration_seconds: f64,
    pub metrics: AcousticMetrics,
    pub tracks: FormantTracks,
    pub spectrogram: Spectrogram,
}

/// JSON shape of the report: the eight scalars plus provenance. The plot
/// matrices stay out of the export on purpose.
#[derive(Serialize)]
struct ReportExport<'a> {
    source: &'a str,
    duration_seconds: f64,
    metrics: &'a AcousticMetrics,
}

impl AnalysisReport {
    pub fn new(source_name: String, duration_seconds: f64, outcome: AnalysisOutcome) -> Self {
        Self {
            source_name,
            duration_seconds,
            metrics: outcome.metrics,
            tracks: outcome.tracks,
            spectrogram: outcome.spectrogram,
        }
    }

    /// The metrics block as shown to the user. Jitter and shimmer are
    /// fractions internally and percentages on screen.
    pub fn render_text(&self) -> String {
        let m = &self.metrics;
        let mut out = String::new();
        out.push_str(&format!(
            "Analysis of {} ({:.2}s)\n\n",
            self.source_name, self.duration_seconds
        ));
        out.push_str(&format!("Mean pitch (F0):       {:.2} Hz\n", m.mean_pitch_hz));
        out.push_str("Formants:\n");
        out.push_str(&format!("  F1 (mouth opening):  {:.2} Hz\n", m.f1_hz));
        out.push_str(&format!("  F2 (tongue position): {:.2} Hz\n", m.f2_hz));
        out.push_str(&format!("  F3 (timbre):         {:.2} Hz\n", m.f3_hz));
        out.push_str("Voice stability:\n");
        out.push_str(&format!("  Jitter (local):      {:.3} %\n", m.jitter_local * 100.0));
        out.push_str(&format!("  Shimmer (local):     {:.3} %\n", m.shimmer_local * 100.0));
        out.push_str(&format!("  HNR:                 {:.2} dB\n", m.hnr_db));
        out.push_str(&format!("  L/H energy ratio:    {:.4}\n", m.energy_ratio));
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&ReportExport {
            source: &self.source_name,
            duration_seconds: self.duration_seconds,
            metrics: &self.metrics,
        })
        .context("Failed to serialize the report")
    }
}
