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

//! Raster overlay textures and their map plugin.
//!
//! A raster is colorized once per load into a texture. At draw time the
//! texture is stretched over its bounds as a stack of horizontal strips, each
//! edge placed at its true latitude, so the Mercator stretch of geographic
//! rasters is followed.

use std::collections::HashMap;

use egui::epaint::{Mesh, Vertex};
use egui::{Color32, Pos2, TextureHandle, TextureId};
use log::debug;
use raster_overlay::{colorize, colorscale, GeoBounds, RasterStats};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

use crate::layers::LayerController;

/// Longest texture side; larger rasters are downsampled
const MAX_TEXTURE_DIM: u32 = 2048;

/// Horizontal strips per overlay
const STRIPS: usize = 32;

struct OverlayTexture {
    revision: u64,
    texture: TextureHandle,
    bounds: GeoBounds,
    /// `(v, latitude)` of each strip edge, top to bottom
    rows: Vec<(f32, f64)>,
}

/// Colorized textures keyed by layer id
#[derive(Default)]
pub struct OverlayTextures {
    textures: HashMap<String, OverlayTexture>,
}

impl OverlayTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build textures for visible overlays whose raster changed.
    pub fn sync(&mut self, ctx: &egui::Context, layers: &LayerController) {
        for binding in layers.overlays() {
            let Some(raster) = binding.raster() else {
                continue;
            };
            if self
                .textures
                .get(binding.id())
                .is_some_and(|t| t.revision == binding.revision())
            {
                continue;
            }

            let descriptor = binding.descriptor();
            let scale = colorscale::lookup_or_fallback(&descriptor.color_scale);
            let domain = binding.stats().unwrap_or(RasterStats::UNKNOWN).domain();
            let image = colorize::colorize(raster, scale, domain, MAX_TEXTURE_DIM);
            debug!(
                "Colorized '{}' to {}x{} texture",
                binding.id(),
                image.width,
                image.height
            );

            let color_image =
                egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.as_flat_samples());
            let texture = ctx.load_texture(
                format!("overlay_{}", binding.id()),
                color_image,
                egui::TextureOptions::LINEAR,
            );

            let height = f64::from(raster.height());
            let rows = (0..=STRIPS)
                .map(|i| {
                    let v = i as f64 / STRIPS as f64;
                    (v as f32, raster.latitude_at_row(v * height))
                })
                .collect();

            self.textures.insert(
                binding.id().to_string(),
                OverlayTexture {
                    revision: binding.revision(),
                    texture,
                    bounds: raster.bounds(),
                    rows,
                },
            );
        }
    }

    /// Plugin drawing every visible overlay with a texture, bottom to top.
    pub fn plugin<'a>(&'a self, layers: &LayerController) -> RasterOverlayPlugin<'a> {
        let draws = layers
            .overlays()
            .filter_map(|binding| {
                let texture = self.textures.get(binding.id())?;
                Some((texture, binding.opacity()))
            })
            .collect();

        RasterOverlayPlugin { draws }
    }
}

/// Plugin that drapes overlay textures over their bounds
pub struct RasterOverlayPlugin<'a> {
    draws: Vec<(&'a OverlayTexture, f32)>,
}

impl Plugin for RasterOverlayPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();

        for (overlay, opacity) in self.draws {
            let tint = Color32::from_white_alpha((opacity.clamp(0.0, 1.0) * 255.0) as u8);
            let mesh = strip_mesh(
                overlay.texture.id(),
                &overlay.rows,
                overlay.bounds.west,
                overlay.bounds.east,
                tint,
                |lat, lon| {
                    let v = projector.project(lon_lat(lon, lat));
                    egui::pos2(v.x, v.y)
                },
            );
            painter.add(egui::Shape::mesh(mesh));
        }
    }
}

/// Two vertices per strip edge (west and east), two triangles per strip.
fn strip_mesh(
    texture_id: TextureId,
    rows: &[(f32, f64)],
    west: f64,
    east: f64,
    tint: Color32,
    project: impl Fn(f64, f64) -> Pos2,
) -> Mesh {
    let mut mesh = Mesh::with_texture(texture_id);

    for &(v, lat) in rows {
        mesh.vertices.push(Vertex {
            pos: project(lat, west),
            uv: egui::pos2(0.0, v),
            color: tint,
        });
        mesh.vertices.push(Vertex {
            pos: project(lat, east),
            uv: egui::pos2(1.0, v),
            color: tint,
        });
    }

    for i in 0..rows.len().saturating_sub(1) {
        let top = (i * 2) as u32;
        mesh.add_triangle(top, top + 1, top + 2);
        mesh.add_triangle(top + 1, top + 3, top + 2);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mesh_layout() {
        let rows = vec![(0.0, -6.0), (0.5, -6.5), (1.0, -7.0)];
        let mesh = strip_mesh(TextureId::default(), &rows, 107.0, 108.0, Color32::WHITE, |lat, lon| {
            egui::pos2(lon as f32, -lat as f32)
        });

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices.len(), 12);

        assert_eq!(mesh.vertices[0].uv, egui::pos2(0.0, 0.0));
        assert_eq!(mesh.vertices[1].uv, egui::pos2(1.0, 0.0));
        assert_eq!(mesh.vertices[5].uv, egui::pos2(1.0, 1.0));
        assert_eq!(mesh.vertices[0].pos, egui::pos2(107.0, 6.0));
        assert_eq!(mesh.vertices[3].pos, egui::pos2(108.0, 6.5));
    }

    #[test]
    fn test_single_row_has_no_triangles() {
        let mesh = strip_mesh(TextureId::default(), &[(0.0, 1.0)], 0.0, 1.0, Color32::WHITE, |lat, lon| {
            egui::pos2(lon as f32, lat as f32)
        });
        assert!(mesh.indices.is_empty());
    }
}
