pub mod components;
pub mod screens;

use anyhow::{anyhow, Result};
use eframe::NativeOptions;

use crate::config::AnalysisConfig;

/// Open the studio window and block until it closes.
pub fn launch_ui(config: AnalysisConfig) -> Result<()> {
    let app = screens::studio::StudioApp::new(config);
    let options = NativeOptions::default();
    eframe::run_native(
        "Voxalyzer Studio",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!("failed to launch the studio window: {err}"))
}
