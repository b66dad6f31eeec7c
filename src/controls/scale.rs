// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metric scale bar.

use eframe::egui;

/// Widest the bar may get, in points
pub const MAX_WIDTH: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub meters: f64,
    pub width: f32,
    pub label: String,
}

impl ScaleBar {
    /// Pick the longest round distance that fits in `max_width` points.
    pub fn compute(meters_per_point: f64, max_width: f32) -> Option<Self> {
        if !meters_per_point.is_finite() || meters_per_point <= 0.0 || max_width <= 0.0 {
            return None;
        }

        let max_meters = meters_per_point * f64::from(max_width);
        let meters = round_distance(max_meters);
        let width = (f64::from(max_width) * meters / max_meters) as f32;

        let label = if meters < 1000.0 {
            format!("{meters} m")
        } else {
            format!("{} km", meters / 1000.0)
        };

        Some(Self { meters, width, label })
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let text_color = ui.visuals().text_color();
        let (rect, _) = ui.allocate_exact_size(egui::vec2(self.width.max(1.0) + 4.0, 18.0), egui::Sense::hover());
        let painter = ui.painter_at(rect);

        let left = rect.left() + 2.0;
        let right = left + self.width;
        let bottom = rect.bottom() - 2.0;
        let stroke = egui::Stroke::new(2.0, text_color);

        painter.line_segment([egui::pos2(left, bottom), egui::pos2(right, bottom)], stroke);
        painter.line_segment([egui::pos2(left, bottom), egui::pos2(left, bottom - 6.0)], stroke);
        painter.line_segment([egui::pos2(right, bottom), egui::pos2(right, bottom - 6.0)], stroke);
        painter.text(
            egui::pos2(left + 3.0, bottom - 3.0),
            egui::Align2::LEFT_BOTTOM,
            &self.label,
            egui::FontId::proportional(11.0),
            text_color,
        );
    }
}

/// Round down to 1, 2, 3 or 5 times a power of ten.
fn round_distance(meters: f64) -> f64 {
    let pow10 = 10_f64.powf(meters.log10().floor());
    let d = meters / pow10;

    let d = if d >= 10.0 {
        10.0
    } else if d >= 5.0 {
        5.0
    } else if d >= 3.0 {
        3.0
    } else if d >= 2.0 {
        2.0
    } else {
        1.0
    };

    pow10 * d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_distance() {
        assert_eq!(round_distance(730.0), 500.0);
        assert_eq!(round_distance(15_300.0), 10_000.0);
        assert_eq!(round_distance(2_999.0), 2_000.0);
        assert_eq!(round_distance(3_100.0), 3_000.0);
        assert_eq!(round_distance(1.7), 1.0);
    }

    #[test]
    fn test_meters_label_and_width() {
        let bar = ScaleBar::compute(7.3, 100.0).unwrap();
        assert_eq!(bar.label, "500 m");
        assert!((bar.width - 68.493_15).abs() < 1e-3);
    }

    #[test]
    fn test_kilometers_label() {
        let bar = ScaleBar::compute(153.0, 100.0).unwrap();
        assert_eq!(bar.label, "10 km");
        let bar = ScaleBar::compute(31.0, 100.0).unwrap();
        assert_eq!(bar.label, "3 km");
        assert!(bar.width <= MAX_WIDTH);
    }

    #[test]
    fn test_degenerate_input() {
        assert!(ScaleBar::compute(0.0, 100.0).is_none());
        assert!(ScaleBar::compute(f64::NAN, 100.0).is_none());
        assert!(ScaleBar::compute(10.0, 0.0).is_none());
    }
}
