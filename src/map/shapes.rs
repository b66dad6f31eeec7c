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

//! Vector geometry plugins: the prediction layer and measurement paths.

use egui::epaint::Mesh;
use egui::{Color32, Pos2, Stroke};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

use crate::controls::measure::{MeasureTool, Measurement, ACTIVE_COLOR, COMPLETED_COLOR};
use crate::layers::{VectorLayer, VectorShape, VectorStyle};

fn project(projector: &Projector, lat: f64, lon: f64) -> Pos2 {
    let v = projector.project(lon_lat(lon, lat));
    egui::pos2(v.x, v.y)
}

/// Plugin drawing the GeoJSON layer
pub struct VectorLayerPlugin<'a> {
    layer: &'a VectorLayer,
    style: VectorStyle,
}

impl<'a> VectorLayerPlugin<'a> {
    pub fn new(layer: &'a VectorLayer, style: VectorStyle) -> Self {
        Self { layer, style }
    }
}

impl Plugin for VectorLayerPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();
        let [r, g, b] = self.style.stroke;
        let stroke = Stroke::new(self.style.weight, Color32::from_rgb(r, g, b));
        let fill = Color32::from_rgba_unmultiplied(r, g, b, (self.style.fill_opacity * 255.0) as u8);

        for shape in self.layer.shapes() {
            match shape {
                VectorShape::Area { rings, triangles } => {
                    let mut mesh = Mesh::default();
                    for triangle in triangles {
                        let base = mesh.vertices.len() as u32;
                        for &[lon, lat] in triangle {
                            mesh.colored_vertex(project(projector, lat, lon), fill);
                        }
                        mesh.add_triangle(base, base + 1, base + 2);
                    }
                    painter.add(egui::Shape::mesh(mesh));

                    for ring in rings {
                        let points = ring.iter().map(|&[lon, lat]| project(projector, lat, lon)).collect();
                        painter.add(egui::Shape::closed_line(points, stroke));
                    }
                }
                VectorShape::Line(line) => {
                    let points = line.iter().map(|&[lon, lat]| project(projector, lat, lon)).collect();
                    painter.add(egui::Shape::line(points, stroke));
                }
                VectorShape::Point([lon, lat]) => {
                    let pos = project(projector, *lat, *lon);
                    painter.circle_filled(pos, 5.0, fill);
                    painter.circle_stroke(pos, 5.0, stroke);
                }
            }
        }
    }
}

/// Plugin drawing finished measurements and the one in progress
pub struct MeasurePlugin<'a> {
    tool: &'a MeasureTool,
}

impl<'a> MeasurePlugin<'a> {
    pub fn new(tool: &'a MeasureTool) -> Self {
        Self { tool }
    }
}

impl Plugin for MeasurePlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();

        for measurement in self.tool.completed() {
            draw_measurement(painter, projector, measurement, COMPLETED_COLOR);
        }
        if self.tool.is_active() {
            draw_measurement(painter, projector, self.tool.current(), ACTIVE_COLOR);
        }
    }
}

fn draw_measurement(painter: &egui::Painter, projector: &Projector, measurement: &Measurement, color: Color32) {
    let points: Vec<Pos2> = measurement
        .points
        .iter()
        .map(|&(lat, lon)| project(projector, lat, lon))
        .collect();

    // Closing edge of the measured area
    if points.len() >= 3 {
        painter.line_segment([points[points.len() - 1], points[0]], Stroke::new(1.5, color.gamma_multiply(0.6)));
    }
    if points.len() >= 2 {
        painter.add(egui::Shape::line(points.clone(), Stroke::new(3.0, color)));
    }
    for p in points {
        painter.circle_filled(p, 4.0, Color32::WHITE);
        painter.circle_stroke(p, 4.0, Stroke::new(2.0, color));
    }
}
