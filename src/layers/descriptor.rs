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

//! Static layer definitions.

use serde::{Deserialize, Serialize};

/// One raster overlay: where to fetch it and how to color it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Layer id, also the id of its panel toggle
    pub id: String,

    /// Asset path, relative to the asset root unless absolute
    pub url: String,

    /// Legend title
    pub title: String,

    /// Color scale name (see `raster_overlay::colorscale`)
    pub color_scale: String,

    /// Initial overlay opacity (0.0 - 1.0)
    pub opacity: f32,

    /// Unit shown between the legend bounds, may be empty
    #[serde(default)]
    pub unit: String,
}

impl LayerDescriptor {
    pub fn new(id: &str, url: &str, title: &str, color_scale: &str, opacity: f32, unit: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            color_scale: color_scale.to_string(),
            opacity,
            unit: unit.to_string(),
        }
    }
}

/// The six environmental layers shipped with the viewer.
pub fn default_raster_layers() -> Vec<LayerDescriptor> {
    vec![
        LayerDescriptor::new("dem", "Data/AspekLingkungan/DEM", "DEM (m)", "terrain", 0.7, "m"),
        LayerDescriptor::new("curah", "Data/AspekLingkungan/CurahHujan", "Curah Hujan", "rainbow", 0.7, "mm"),
        LayerDescriptor::new("lst", "Data/AspekLingkungan/LST", "LST (°C)", "jet", 0.7, "°C"),
        LayerDescriptor::new("ndvi", "Data/AspekLingkungan/NDVI", "NDVI", "greengold", 0.6, ""),
        LayerDescriptor::new("ndmi", "Data/AspekLingkungan/NDMI", "NDMI", "viridis", 0.6, ""),
        LayerDescriptor::new("ndwi", "Data/AspekLingkungan/NDWI", "NDWI", "blues", 0.6, ""),
    ]
}

/// The prediction polygon layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDescriptor {
    pub id: String,
    pub url: String,
    pub title: String,
}

impl Default for VectorDescriptor {
    fn default() -> Self {
        Self {
            id: "model2025".to_string(),
            url: "ModelPrediksi/MODEL2025.geojson".to_string(),
            title: "Model Prediksi 2025".to_string(),
        }
    }
}

/// Drawing style of the vector layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorStyle {
    pub stroke: [u8; 3],
    pub weight: f32,
    pub fill_opacity: f32,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            stroke: [0xef, 0x44, 0x44],
            weight: 2.0,
            fill_opacity: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers() {
        let layers = default_raster_layers();
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["dem", "curah", "lst", "ndvi", "ndmi", "ndwi"]);

        let lst = &layers[2];
        assert_eq!(lst.color_scale, "jet");
        assert_eq!(lst.unit, "°C");
        assert!((lst.opacity - 0.7).abs() < f32::EPSILON);
        assert!(layers[3].unit.is_empty());
    }

    #[test]
    fn test_every_default_scale_exists() {
        for layer in default_raster_layers() {
            assert!(
                raster_overlay::colorscale::lookup(&layer.color_scale).is_some(),
                "{} uses unknown scale {}",
                layer.id,
                layer.color_scale
            );
        }
    }
}
