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

use eframe::egui;

/// Coordinate readout text.
pub fn hud_text(lat: f64, lon: f64) -> String {
    format!("Lat: {lat:.6}, Lng: {lon:.6}")
}

/// Pointer coordinate readout; keeps the last position once the pointer
/// leaves the map.
#[derive(Debug, Default)]
pub struct Hud {
    text: Option<String>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, hover: Option<(f64, f64)>) {
        if let Some((lat, lon)) = hover {
            self.text = Some(hud_text(lat, lon));
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.text {
            ui.label(egui::RichText::new(text).monospace());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text() {
        assert_eq!(hud_text(-6.9, 107.6), "Lat: -6.900000, Lng: 107.600000");
    }

    #[test]
    fn test_keeps_last_position() {
        let mut hud = Hud::new();
        assert!(hud.text().is_none());
        hud.update(Some((1.0, 2.0)));
        hud.update(None);
        assert_eq!(hud.text(), Some("Lat: 1.000000, Lng: 2.000000"));
    }
}
