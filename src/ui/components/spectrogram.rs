use eframe::egui;
use ndarray::Array2;

/// Downsampled heat-map cells, row 0 at the top (highest frequency).
pub struct SpectrogramData {
    pub rows: usize,
    pub cols: usize,
    values: Vec<f32>,
}

/// Largest heat-map size actually painted; the STFT matrix is max-pooled
/// down to this so a cell never shrinks below a pixel.
const MAX_ROWS: usize = 160;
const MAX_COLS: usize = 480;

impl SpectrogramData {
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> Self {
        Self { rows, cols, values }
    }

    /// Build display cells from a dB magnitude matrix (bins × frames,
    /// bin 0 = DC). Values are rescaled from [-80, 0] dB to [0, 1] and the
    /// frequency axis is flipped so low frequencies sit at the bottom.
    pub fn from_db_matrix(db: &Array2<f32>) -> Self {
        let (bins, frames) = db.dim();
        if bins == 0 || frames == 0 {
            return Self::new(0, 0, Vec::new());
        }

        let rows = bins.min(MAX_ROWS);
        let cols = frames.min(MAX_COLS);
        let mut values = Vec::with_capacity(rows * cols);

        for row in 0..rows {
            // Display row 0 is the top of the plot = highest bin block.
            let bin_hi = bins - row * bins / rows;
            let bin_lo = bins - (row + 1) * bins / rows;
            for col in 0..cols {
                let frame_lo = col * frames / cols;
                let frame_hi = ((col + 1) * frames / cols).max(frame_lo + 1);
                let mut peak = f32::NEG_INFINITY;
                for bin in bin_lo..bin_hi.max(bin_lo + 1) {
                    for frame in frame_lo..frame_hi {
                        peak = peak.max(db[(bin.min(bins - 1), frame)]);
                    }
                }
                values.push(((peak + 80.0) / 80.0).clamp(0.0, 1.0));
            }
        }

        Self::new(rows, cols, values)
    }

    pub fn value(&self, row: usize, col: usize) -> f32 {
        let index = row * self.cols + col;
        self.values.get(index).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0 || self.values.is_empty()
    }
}

pub struct SpectrogramView<'a> {
    pub data: Option<&'a SpectrogramData>,
}

impl<'a> SpectrogramView<'a> {
    pub fn show(self, ui: &mut egui::Ui) {
        ui.label("Spectrogram");
        match self.data {
            Some(data) if !data.is_empty() => paint_heatmap(ui, data),
            _ => {
                ui.label("Spectrogram unavailable");
            }
        }
    }
}

fn paint_heatmap(ui: &mut egui::Ui, data: &SpectrogramData) {
    let size = egui::vec2(ui.available_width(), 220.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;

    let cell_w = rect.width() / data.cols as f32;
    let cell_h = rect.height() / data.rows as f32;
    for row in 0..data.rows {
        for col in 0..data.cols {
            let color = color_for_value(data.value(row, col));
            let pos = rect.min + egui::vec2(col as f32 * cell_w, row as f32 * cell_h);
            let cell = egui::Rect::from_min_size(pos, egui::vec2(cell_w, cell_h));
            painter.rect_filled(cell, 0.0, color);
        }
    }
}

fn color_for_value(value: f32) -> egui::Color32 {
    let clamped = value.clamp(0.0, 1.0);
    let hue = (1.0 - clamped) * 240.0;
    let hsv = egui::ecolor::Hsva::new(hue / 360.0, 0.85, clamped.max(0.15), 1.0);
    let rgba = hsv.to_rgba_unmultiplied();
    egui::Color32::from_rgba_premultiplied(
        (rgba[0] * 255.0) as u8,
        (rgba[1] * 255.0) as u8,
        (rgba[2] * 255.0) as u8,
        (rgba[3] * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::SpectrogramData;
    use ndarray::Array2;

    #[test]
    fn flips_frequency_axis() {
        // Bright energy in the lowest bin must land in the bottom row.
        let mut db = Array2::from_elem((8, 4), -80.0f32);
        for frame in 0..4 {
            db[(0, frame)] = 0.0;
        }
        let data = SpectrogramData::from_db_matrix(&db);
        assert_eq!(data.rows, 8);
        assert!(data.value(7, 0) > 0.9);
        assert!(data.value(0, 0) < 0.1);
    }

    #[test]
    fn empty_matrix_is_empty() {
        let db = Array2::from_elem((0, 0), 0.0f32);
        assert!(SpectrogramData::from_db_matrix(&db).is_empty());
    }
}
