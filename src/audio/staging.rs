use crate::types::AudioData;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use super::encoder;

/// File extensions the upload surface accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp4", "m4a"];

/// Lower-cased extension of `file_name`, if it has one.
pub fn declared_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_supported(file_name: &str) -> bool {
    declared_extension(file_name)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// The per-request temp-file workspace.
///
/// Holds the uploaded bytes and the converted analysis WAV as sibling temp
/// files. Both are deleted when this value drops, on every exit path; no
/// caller ever cleans up by hand. The extension check happens before any
/// file is created.
#[derive(Debug)]
pub struct StagedUpload {
    upload: TempPath,
    converted: Option<TempPath>,
}

impl StagedUpload {
    /// Stage raw uploaded bytes under their declared file name.
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let extension = match declared_extension(file_name) {
            Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => ext,
            _ => bail!(
                "Unsupported file type {:?}: accepted extensions are {}",
                file_name,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        };

        let mut file = tempfile::Builder::new()
            .prefix("voxalyzer-upload-")
            .suffix(&format!(".{extension}"))
            .tempfile()
            .context("Failed to create upload temp file")?;
        file.write_all(bytes)
            .context("Failed to write uploaded bytes")?;
        file.flush().context("Failed to flush uploaded bytes")?;

        Ok(Self {
            upload: file.into_temp_path(),
            converted: None,
        })
    }

    /// Stage an on-disk file (the CLI path) by copying its bytes.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Input path has no usable file name: {}", path.display()))?;
        if !is_supported(file_name) {
            bail!(
                "Unsupported file type {:?}: accepted extensions are {}",
                file_name,
                SUPPORTED_EXTENSIONS.join(", ")
            );
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        Self::from_bytes(file_name, &bytes)
    }

    /// Path of the staged upload, for the decoder.
    pub fn upload_path(&self) -> &Path {
        &self.upload
    }

    /// Write the converted mono buffer as the analysis WAV and return its path.
    pub fn stage_converted(&mut self, audio: &AudioData) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("voxalyzer-converted-")
            .suffix(".wav")
            .tempfile()
            .context("Failed to create conversion temp file")?;
        let path = file.into_temp_path();
        encoder::encode_wav(audio, &path)?;
        let staged = path.to_path_buf();
        self.converted = Some(path);
        Ok(staged)
    }

    pub fn converted_path(&self) -> Option<&Path> {
        self.converted.as_deref()
    }

    /// Snapshot of both temp paths, for lifecycle assertions in tests.
    pub fn temp_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.upload.to_path_buf()];
        if let Some(converted) = &self.converted {
            paths.push(converted.to_path_buf());
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_three_upload_types() {
        assert!(is_supported("speech.wav"));
        assert!(is_supported("speech.MP4"));
        assert!(is_supported("speech.m4a"));
        assert!(!is_supported("speech.ogg"));
        assert!(!is_supported("speech"));
    }

    #[test]
    fn rejects_unsupported_extension_without_staging() {
        let err = StagedUpload::from_bytes("clip.flac", &[0u8; 16]).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn staged_files_are_removed_on_drop() {
        let mut staged = StagedUpload::from_bytes("clip.wav", &[0u8; 4]).unwrap();
        staged
            .stage_converted(&AudioData {
                samples: vec![0.0; 64],
                sample_rate: 22_050,
            })
            .unwrap();
        let paths = staged.temp_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));

        drop(staged);
        assert!(paths.iter().all(|p| !p.exists()));
    }
}
