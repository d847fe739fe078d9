use eframe::egui::{self, Color32, Stroke};

use crate::types::FormantTracks;

/// Line plot of the F1/F2/F3 trajectories. NaN frames break the line, so
/// unvoiced stretches show as gaps rather than drops to zero.
pub struct FormantTracksView<'a> {
    pub tracks: &'a FormantTracks,
    /// Top of the frequency axis, Hz
    pub max_hz: f64,
}

const SERIES: [(&str, Color32); 3] = [
    ("F1", Color32::from_rgb(230, 80, 80)),
    ("F2", Color32::from_rgb(80, 180, 90)),
    ("F3", Color32::from_rgb(240, 160, 60)),
];

impl<'a> FormantTracksView<'a> {
    pub fn show(self, ui: &mut egui::Ui) {
        ui.label("Formant tracks");
        if self.tracks.is_empty() {
            ui.label("Formant tracks unavailable");
            return;
        }

        let size = egui::vec2(ui.available_width(), 180.0);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));

        let series = [&self.tracks.f1, &self.tracks.f2, &self.tracks.f3];
        for ((_, color), values) in SERIES.iter().zip(series) {
            draw_series(&painter, rect, values, self.max_hz, *color);
        }

        self.draw_legend(ui, rect);
    }

    fn draw_legend(&self, ui: &mut egui::Ui, rect: egui::Rect) {
        let painter = ui.painter();
        for (index, (label, color)) in SERIES.iter().enumerate() {
            let pos = egui::pos2(rect.left() + 8.0, rect.top() + 8.0 + index as f32 * 16.0);
            painter.circle_filled(pos, 4.0, *color);
            painter.text(
                pos + egui::vec2(10.0, 0.0),
                egui::Align2::LEFT_CENTER,
                *label,
                egui::FontId::proportional(12.0),
                ui.visuals().text_color(),
            );
        }
    }
}

fn draw_series(
    painter: &egui::Painter,
    rect: egui::Rect,
    values: &[f64],
    max_hz: f64,
    color: Color32,
) {
    if values.len() < 2 || max_hz <= 0.0 {
        return;
    }
    let last_index = (values.len() - 1) as f32;

    let mut segment: Vec<egui::Pos2> = Vec::new();
    for (index, &value) in values.iter().enumerate() {
        if value.is_finite() && value >= 0.0 {
            let x_ratio = index as f32 / last_index;
            let y_ratio = (value.min(max_hz) / max_hz) as f32;
            segment.push(egui::pos2(
                rect.left() + x_ratio * rect.width(),
                rect.bottom() - y_ratio * rect.height(),
            ));
        } else {
            flush_segment(painter, &mut segment, color);
        }
    }
    flush_segment(painter, &mut segment, color);
}

fn flush_segment(painter: &egui::Painter, segment: &mut Vec<egui::Pos2>, color: Color32) {
    match segment.len() {
        0 => {}
        1 => painter.circle_filled(segment[0], 1.5, color),
        _ => {
            painter.add(egui::epaint::PathShape::line(
                std::mem::take(segment),
                Stroke::new(1.5, color),
            ));
        }
    }
    segment.clear();
}
