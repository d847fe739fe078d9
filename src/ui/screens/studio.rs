use eframe::egui;
use tracing::{error, info};

use crate::config::AnalysisConfig;
use crate::pipeline::{self, FAILURE_HINT};
use crate::report::AnalysisReport;
use crate::ui::components::formant_tracks::FormantTracksView;
use crate::ui::components::metrics_panel::MetricsPanel;
use crate::ui::components::spectrogram::{SpectrogramData, SpectrogramView};

/// One-window upload-and-results surface.
///
/// Analysis runs on the UI thread when a file is dropped; one upload is
/// fully processed before the next can start, and nothing survives between
/// runs but the report on screen.
pub struct StudioApp {
    config: AnalysisConfig,
    state: ViewState,
}

enum ViewState {
    Waiting,
    Ready {
        report: AnalysisReport,
        heatmap: SpectrogramData,
    },
    Failed {
        message: String,
    },
}

impl StudioApp {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            state: ViewState::Waiting,
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let (name, bytes) = match load_dropped_file(&file) {
            Ok(loaded) => loaded,
            Err(message) => {
                self.state = ViewState::Failed { message };
                return;
            }
        };

        info!(file = %name, bytes = bytes.len(), "processing dropped file");
        match pipeline::process_bytes(&name, &bytes, &self.config) {
            Ok(report) => {
                let heatmap = SpectrogramData::from_db_matrix(&report.spectrogram.to_db());
                self.state = ViewState::Ready { report, heatmap };
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "analysis failed");
                self.state = ViewState::Failed {
                    message: format!("{err:#}"),
                };
            }
        }
    }

    fn show_results(&self, ctx: &egui::Context) {
        match &self.state {
            ViewState::Waiting => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label("Drop a speech recording here (wav, mp4, m4a)");
                    });
                });
            }
            ViewState::Failed { message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                    ui.label(FAILURE_HINT);
                });
            }
            ViewState::Ready { report, heatmap } => {
                egui::SidePanel::left("metrics")
                    .resizable(false)
                    .min_width(260.0)
                    .show(ctx, |ui| {
                        ui.label(format!(
                            "{} ({:.2}s)",
                            report.source_name, report.duration_seconds
                        ));
                        ui.separator();
                        MetricsPanel {
                            metrics: &report.metrics,
                        }
                        .show(ui);
                    });
                egui::CentralPanel::default().show(ctx, |ui| {
                    SpectrogramView {
                        data: Some(heatmap),
                    }
                    .show(ui);
                    ui.separator();
                    FormantTracksView {
                        tracks: &report.tracks,
                        max_hz: 4_000.0,
                    }
                    .show(ui);
                });
            }
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Voxalyzer");
                ui.label("drop a wav / mp4 / m4a file to analyze it");
            });
        });

        self.show_results(ctx);
    }
}

fn load_dropped_file(file: &egui::DroppedFile) -> Result<(String, Vec<u8>), String> {
    if let Some(bytes) = &file.bytes {
        let name = if file.name.is_empty() {
            "upload.wav".to_string()
        } else {
            file.name.clone()
        };
        return Ok((name, bytes.to_vec()));
    }
    if let Some(path) = &file.path {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        return Ok((name, bytes));
    }
    Err("Dropped file carried no data".to_string())
}
