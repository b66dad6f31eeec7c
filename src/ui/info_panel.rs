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

use crate::layers::LayerController;

/// Info panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoPanel {
    enabled: bool,
    visible: bool,
}

impl InfoPanel {
    /// A disabled panel never shows and ignores toggles.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            visible: enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.enabled && self.visible
    }

    pub fn toggle(&mut self) {
        if self.enabled {
            self.visible = !self.visible;
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, layers: &LayerController) {
        if !self.is_visible() {
            return;
        }

        let mut open = true;
        egui::Window::new("ℹ Info")
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
            .default_width(260.0)
            .resizable(false)
            .collapsible(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Environmental aspects of the study area with the 2025 prediction model.");
                ui.add_space(6.0);

                egui::Grid::new("info_layers").num_columns(2).striped(true).show(ui, |ui| {
                    for binding in layers.rasters() {
                        let descriptor = binding.descriptor();
                        ui.label(&descriptor.title);
                        ui.label(egui::RichText::new(&descriptor.color_scale).weak());
                        ui.end_row();
                    }
                    let vector = layers.vector();
                    if vector.has_toggle() {
                        ui.label(&vector.descriptor().title);
                        ui.label(egui::RichText::new("polygon").weak());
                        ui.end_row();
                    }
                });

                ui.add_space(6.0);
                ui.label(egui::RichText::new("Click the map to drop a marker. Press I to hide this panel.").small());
            });

        if !open {
            self.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut panel = InfoPanel::new(true);
        assert!(panel.is_visible());
        panel.toggle();
        assert!(!panel.is_visible());
        panel.toggle();
        assert!(panel.is_visible());
    }

    #[test]
    fn test_disabled_panel_ignores_toggle() {
        let mut panel = InfoPanel::new(false);
        panel.toggle();
        assert!(!panel.is_visible());
        assert!(!panel.is_enabled());
    }
}
