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

//! Layer toggles and opacity sliders.

use eframe::egui;

use crate::layers::{LayerController, VectorState};

/// A change the user made in the panel this frame
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SetRaster { id: String, active: bool },
    SetOpacity { id: String, opacity: f32 },
    SetVector(bool),
}

/// Draw toggles for every bound layer. The controller is not mutated here;
/// the returned actions are applied by the caller.
pub fn show(ui: &mut egui::Ui, layers: &LayerController) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    ui.label(egui::RichText::new("Environmental layers").strong());
    for binding in layers.rasters() {
        let descriptor = binding.descriptor();

        ui.horizontal(|ui| {
            let mut active = binding.is_active();
            if ui.checkbox(&mut active, descriptor.title.as_str()).changed() {
                actions.push(PanelAction::SetRaster {
                    id: binding.id().to_string(),
                    active,
                });
            }
            if binding.is_pending() {
                ui.spinner();
            }
        });

        if binding.has_slider() {
            let mut opacity = binding.opacity();
            let slider = egui::Slider::new(&mut opacity, 0.0..=1.0)
                .step_by(0.05)
                .text("opacity");
            if ui.add(slider).changed() {
                actions.push(PanelAction::SetOpacity {
                    id: binding.id().to_string(),
                    opacity,
                });
            }
        }
    }

    let vector = layers.vector();
    if vector.has_toggle() {
        ui.separator();
        ui.label(egui::RichText::new("Prediction").strong());

        let mut visible = vector.is_visible();
        let response = ui.add_enabled(
            vector.is_interactive(),
            egui::Checkbox::new(&mut visible, vector.descriptor().title.as_str()),
        );
        let response = match vector.state() {
            VectorState::Loading => response.on_disabled_hover_text("Loading…"),
            VectorState::Failed => response.on_disabled_hover_text("Layer could not be loaded"),
            VectorState::Ready(_) => response,
        };
        if response.changed() {
            actions.push(PanelAction::SetVector(visible));
        }
    }

    actions
}
