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

//! Distance and area measurement.

use eframe::egui;
use geo::{ChamberlainDuquetteArea, LineString, Polygon};

/// Mean Earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Color of the measurement being drawn
pub const ACTIVE_COLOR: egui::Color32 = egui::Color32::from_rgb(0x10, 0xb9, 0x81);

/// Color of finished measurements
pub const COMPLETED_COLOR: egui::Color32 = egui::Color32::from_rgb(0x05, 0x96, 0x69);

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// A clicked path, `(lat, lon)` vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub points: Vec<(f64, f64)>,
}

impl Measurement {
    /// Path length in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| haversine_m(w[0].0, w[0].1, w[1].0, w[1].1))
            .sum()
    }

    /// Enclosed area in square meters, for three or more points.
    pub fn area_m2(&self) -> Option<f64> {
        if self.points.len() < 3 {
            return None;
        }
        let ring: LineString<f64> = self.points.iter().map(|&(lat, lon)| (lon, lat)).collect();
        let polygon = Polygon::new(ring, vec![]);
        Some(polygon.chamberlain_duquette_unsigned_area())
    }

    /// Readout text, e.g. `1234.5 m (1.23 km)`.
    pub fn summary(&self) -> String {
        let mut text = format_length(self.length_m());
        if let Some(area) = self.area_m2() {
            text.push_str(&format!(", {area:.0} m²"));
        }
        text
    }
}

pub fn format_length(meters: f64) -> String {
    format!("{meters:.1} m ({:.2} km)", meters / 1000.0)
}

/// Measurement tool state.
#[derive(Debug, Default)]
pub struct MeasureTool {
    active: bool,
    current: Measurement,
    completed: Vec<Measurement>,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.active = true;
        self.current = Measurement::default();
    }

    /// Add a vertex while measuring. Returns false when inactive.
    pub fn add_point(&mut self, lat: f64, lon: f64) -> bool {
        if !self.active {
            return false;
        }
        self.current.points.push((lat, lon));
        true
    }

    /// Stop measuring; a path of two or more points is kept.
    pub fn finish(&mut self) {
        self.active = false;
        let done = std::mem::take(&mut self.current);
        if done.points.len() >= 2 {
            self.completed.push(done);
        }
    }

    /// Stop measuring and drop the path in progress.
    pub fn cancel(&mut self) {
        self.active = false;
        self.current = Measurement::default();
    }

    /// Remove finished measurements.
    pub fn clear(&mut self) {
        self.completed.clear();
    }

    pub fn current(&self) -> &Measurement {
        &self.current
    }

    pub fn completed(&self) -> &[Measurement] {
        &self.completed
    }

    /// Toolbar with start/finish/cancel/clear buttons and the readout.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.active {
                if ui.button("✔ Finish").clicked() {
                    self.finish();
                }
                if ui.button("✖ Cancel").clicked() {
                    self.cancel();
                }
            } else {
                if ui.button("📏 Measure").on_hover_text("Click points on the map").clicked() {
                    self.start();
                }
                if !self.completed.is_empty() && ui.button("🗑 Clear").clicked() {
                    self.clear();
                }
            }
        });

        if self.active {
            let text = if self.current.points.is_empty() {
                "Click the map to start".to_string()
            } else {
                self.current.summary()
            };
            ui.label(egui::RichText::new(text).color(ACTIVE_COLOR));
        } else if let Some(last) = self.completed.last() {
            ui.label(egui::RichText::new(last.summary()).color(COMPLETED_COLOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_one_degree_latitude() {
        let d = haversine_m(0.0, 107.0, 1.0, 107.0);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
        assert_eq!(haversine_m(-6.9, 107.6, -6.9, 107.6), 0.0);
    }

    #[test]
    fn test_length_sums_segments() {
        let m = Measurement {
            points: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)],
        };
        assert!((m.length_m() - 2.0 * 111_195.0).abs() < 2.0);
        assert!(m.area_m2().is_some());
    }

    #[test]
    fn test_area_small_square() {
        let m = Measurement {
            points: vec![(0.0, 0.0), (0.0, 0.01), (0.01, 0.01), (0.01, 0.0)],
        };
        let area = m.area_m2().unwrap();
        let expected = 1_112.0_f64.powi(2);
        assert!((area - expected).abs() / expected < 0.01, "got {area}");
    }

    #[test]
    fn test_no_area_below_three_points() {
        let m = Measurement {
            points: vec![(0.0, 0.0), (0.0, 1.0)],
        };
        assert!(m.area_m2().is_none());
        assert!(!m.summary().contains("m²"));
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(1234.5), "1234.5 m (1.23 km)");
    }

    #[test]
    fn test_tool_lifecycle() {
        let mut tool = MeasureTool::new();
        assert!(!tool.add_point(0.0, 0.0));

        tool.start();
        assert!(tool.add_point(0.0, 0.0));
        assert!(tool.add_point(0.0, 1.0));
        tool.finish();
        assert!(!tool.is_active());
        assert_eq!(tool.completed().len(), 1);

        // A single point is not a measurement
        tool.start();
        tool.add_point(5.0, 5.0);
        tool.finish();
        assert_eq!(tool.completed().len(), 1);

        tool.start();
        tool.add_point(1.0, 1.0);
        tool.cancel();
        assert!(tool.current().points.is_empty());

        tool.clear();
        assert!(tool.completed().is_empty());
    }
}
