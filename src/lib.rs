//! Voxalyzer - acoustic speech report library
//!
//! Takes one short speech recording (WAV, or the audio track of an MP4/M4A),
//! runs a single linear analysis pipeline over it, and produces eight
//! acoustic measurements plus the series needed for a spectrogram heat-map
//! and formant trajectory plot.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod ui;
