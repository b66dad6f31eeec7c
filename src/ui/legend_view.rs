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

//! Legend widgets, stacked in the bottom-right corner.

use egui::epaint::{Mesh, Vertex, WHITE_UV};
use raster_overlay::GradientStop;

use crate::layers::{Legend, LegendStack};

const LEGEND_WIDTH: f32 = 180.0;
const BAR_HEIGHT: f32 = 12.0;

/// Draw every legend; the stack grows upward, newest on top.
pub fn show(ctx: &egui::Context, legends: &LegendStack) {
    if legends.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("legend_stack"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -28.0))
        .interactable(false)
        .show(ctx, |ui| {
            let ordered: Vec<&Legend> = legends.iter().collect();
            for legend in ordered.into_iter().rev() {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(LEGEND_WIDTH);
                    legend_widget(ui, legend);
                });
                ui.add_space(4.0);
            }
        });
}

fn legend_widget(ui: &mut egui::Ui, legend: &Legend) {
    ui.label(egui::RichText::new(&legend.title).strong());

    let (rect, _) = ui.allocate_exact_size(egui::vec2(LEGEND_WIDTH, BAR_HEIGHT), egui::Sense::hover());
    ui.painter().add(egui::Shape::mesh(gradient_mesh(rect, &legend.stops)));

    ui.horizontal(|ui| {
        ui.set_width(LEGEND_WIDTH);
        ui.label(egui::RichText::new(&legend.min_label).small());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(&legend.max_label).small());
            if !legend.unit.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new(&legend.unit).small().weak());
                });
            }
        });
    });
}

/// Left-to-right gradient: one quad between each pair of stops.
fn gradient_mesh(rect: egui::Rect, stops: &[GradientStop]) -> Mesh {
    let mut mesh = Mesh::default();

    let x_at = |stop: &GradientStop| rect.left() + rect.width() * f32::from(stop.offset_percent.min(100)) / 100.0;
    let color = |stop: &GradientStop| {
        let [r, g, b] = stop.color;
        egui::Color32::from_rgb(r, g, b)
    };

    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let base = mesh.vertices.len() as u32;

        for (pos, stop) in [
            (egui::pos2(x_at(a), rect.top()), a),
            (egui::pos2(x_at(b), rect.top()), b),
            (egui::pos2(x_at(b), rect.bottom()), b),
            (egui::pos2(x_at(a), rect.bottom()), a),
        ] {
            mesh.vertices.push(Vertex {
                pos,
                uv: WHITE_UV,
                color: color(stop),
            });
        }

        mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(offset_percent: u8, color: [u8; 3]) -> GradientStop {
        GradientStop { offset_percent, color }
    }

    #[test]
    fn test_gradient_mesh_quads() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 10.0));
        let stops = [stop(0, [0, 0, 0]), stop(50, [128, 0, 0]), stop(100, [255, 0, 0])];
        let mesh = gradient_mesh(rect, &stops);

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.vertices[1].pos.x, 50.0);
        assert_eq!(mesh.vertices[5].pos.x, 100.0);
        assert_eq!(mesh.vertices[5].color, egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_single_stop_draws_nothing() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 10.0));
        assert!(gradient_mesh(rect, &[stop(0, [1, 2, 3])]).vertices.is_empty());
    }
}
