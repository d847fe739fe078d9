//! The one linear flow: stage → decode → convert → analyze → report.
//!
//! Both front-ends call into here. One upload is processed start to finish
//! on the calling thread; nothing is retained between runs except the
//! returned report, and the staged temp files are gone by the time this
//! module returns, whatever the outcome.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::analysis::Analyzer;
use crate::audio::{decoder, encoder, resample, staging::StagedUpload};
use crate::config::AnalysisConfig;
use crate::report::AnalysisReport;
use crate::types::AudioData;

/// The single user-facing hint shown under any failure message.
pub const FAILURE_HINT: &str =
    "Check that the file format is supported (wav, mp4, m4a) and that the recording is not too short.";

/// Process an upload delivered as raw bytes (the studio drop surface).
pub fn process_bytes(file_name: &str, bytes: &[u8], config: &AnalysisConfig) -> Result<AnalysisReport> {
    let staged = StagedUpload::from_bytes(file_name, bytes)?;
    run(file_name, staged, config)
}

/// Process an upload given as a path (the CLI surface).
pub fn process_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let staged = StagedUpload::from_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    run(&name, staged, config)
}

fn run(source_name: &str, mut staged: StagedUpload, config: &AnalysisConfig) -> Result<AnalysisReport> {
    // `staged` owns both temp files; every `?` below unwinds through its
    // drop, so cleanup needs no explicit path.
    let decoded = decoder::decode_audio(staged.upload_path())
        .context("Failed to extract audio from the upload")?;
    info!(
        samples = decoded.samples.len(),
        sample_rate = decoded.sample_rate,
        "decoded upload"
    );

    let samples = resample::linear_resample(
        &decoded.samples,
        decoded.sample_rate,
        config.analysis_sample_rate,
    )
    .context("Failed to resample audio to the analysis rate")?;
    let converted = AudioData {
        samples,
        sample_rate: config.analysis_sample_rate,
    };

    let staged_wav = staged
        .stage_converted(&converted)
        .context("Failed to stage the converted WAV")?;
    info!(path = %staged_wav.display(), "staged analysis WAV");

    // The analysis passes read the staged file, not the in-memory buffer,
    // so what they see is exactly what the temp WAV holds.
    let audio = encoder::decode_wav(&staged_wav).context("Failed to reload the staged WAV")?;

    let outcome = Analyzer::new(*config)
        .analyze(&audio)
        .context("Acoustic analysis failed")?;
    info!(
        pitch_hz = outcome.metrics.mean_pitch_hz,
        hnr_db = outcome.metrics.hnr_db,
        "analysis complete"
    );

    Ok(AnalysisReport::new(
        source_name.to_string(),
        audio.duration(),
        outcome,
    ))
}
