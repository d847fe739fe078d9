use eframe::egui;
use egui_extras::{Column, TableBuilder};

use crate::types::AcousticMetrics;

/// Two-column table of the eight measurements.
pub struct MetricsPanel<'a> {
    pub metrics: &'a AcousticMetrics,
}

impl<'a> MetricsPanel<'a> {
    pub fn show(self, ui: &mut egui::Ui) {
        ui.heading("Measurements");
        ui.add_space(4.0);

        let m = self.metrics;
        let rows = [
            ("Mean pitch (F0)", format!("{:.2} Hz", m.mean_pitch_hz)),
            ("F1 (mouth opening)", format!("{:.2} Hz", m.f1_hz)),
            ("F2 (tongue position)", format!("{:.2} Hz", m.f2_hz)),
            ("F3 (timbre)", format!("{:.2} Hz", m.f3_hz)),
            ("Jitter (local)", format!("{:.3} %", m.jitter_local * 100.0)),
            (
                "Shimmer (local)",
                format!("{:.3} %", m.shimmer_local * 100.0),
            ),
            ("HNR", format!("{:.2} dB", m.hnr_db)),
            ("L/H energy ratio", format!("{:.4}", m.energy_ratio)),
        ];

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(140.0))
            .column(Column::remainder())
            .body(|mut body| {
                for (label, value) in rows {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(label);
                        });
                        row.col(|ui| {
                            ui.monospace(value);
                        });
                    });
                }
            });
    }
}
