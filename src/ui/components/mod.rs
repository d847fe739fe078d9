pub mod formant_tracks;
pub mod metrics_panel;
pub mod spectrogram;
