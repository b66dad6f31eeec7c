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

//! Overlay layer state.
//!
//! [`LayerController`] owns every raster binding, the vector binding and the
//! legend registry. It never performs I/O: operations that need the network
//! or the map view return a [`LayerCommand`] for the application to execute,
//! and load results are fed back through `on_*_loaded`.

pub mod descriptor;
pub mod legend;
pub mod raster;
pub mod vector;

use std::sync::Arc;

use log::{debug, info, warn};
use raster_overlay::{GeoBounds, GeoRaster, RasterStats};

use crate::assets::LoadError;
use crate::config::PanelConfig;

pub use descriptor::{LayerDescriptor, VectorDescriptor, VectorStyle};
pub use legend::{Legend, LegendStack};
pub use raster::{RasterBinding, StatsState};
pub use vector::{VectorBinding, VectorLayer, VectorShape, VectorState};

/// Zoom cap when fitting the view to the vector layer.
pub const FIT_MAX_ZOOM: f64 = 11.0;

/// Side effect requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    /// Fetch and decode the raster of layer `id`
    LoadRaster { id: String, url: String },
    /// Move the map so `bounds` is visible, zooming in no further than `max_zoom`
    FitBounds { bounds: GeoBounds, max_zoom: f64 },
}

#[derive(Debug)]
pub struct LayerController {
    rasters: Vec<RasterBinding>,
    /// Ids of visible raster overlays, bottom to top
    overlays: Vec<String>,
    legends: LegendStack,
    vector: VectorBinding,
}

impl LayerController {
    /// Bind each descriptor to its configured panel control.
    ///
    /// Layers without a toggle in `panel` are skipped.
    pub fn new(descriptors: &[LayerDescriptor], vector: &VectorDescriptor, panel: &PanelConfig) -> Self {
        let mut rasters = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            match panel.control(&descriptor.id) {
                Some(control) => rasters.push(RasterBinding::new(descriptor.clone(), control.slider)),
                None => warn!("No toggle configured for raster layer '{}', skipping", descriptor.id),
            }
        }

        let has_vector_toggle = panel.control(&vector.id).is_some();
        if !has_vector_toggle {
            warn!("No toggle configured for vector layer '{}'", vector.id);
        }

        Self {
            rasters,
            overlays: Vec::new(),
            legends: LegendStack::new(),
            vector: VectorBinding::new(vector.clone(), has_vector_toggle),
        }
    }

    /// Bound raster layers in panel order.
    pub fn rasters(&self) -> &[RasterBinding] {
        &self.rasters
    }

    pub fn raster(&self, id: &str) -> Option<&RasterBinding> {
        self.rasters.iter().find(|b| b.id() == id)
    }

    fn raster_mut(&mut self, id: &str) -> Option<&mut RasterBinding> {
        self.rasters.iter_mut().find(|b| b.id() == id)
    }

    /// Visible overlays, in draw order.
    pub fn overlays(&self) -> impl Iterator<Item = &RasterBinding> {
        self.overlays.iter().filter_map(|id| self.raster(id))
    }

    pub fn overlay_ids(&self) -> &[String] {
        &self.overlays
    }

    pub fn legends(&self) -> &LegendStack {
        &self.legends
    }

    pub fn vector(&self) -> &VectorBinding {
        &self.vector
    }

    /// Show or hide a raster layer.
    ///
    /// The first activation requests the raster; later ones reuse the cached
    /// statistics. While a load is pending no second request is issued.
    pub fn set_raster_active(&mut self, id: &str, active: bool) -> Option<LayerCommand> {
        let Some(binding) = self.rasters.iter_mut().find(|b| b.id() == id) else {
            debug!("Ignoring toggle for unbound layer '{id}'");
            return None;
        };

        if !active {
            binding.set_active(false);
            self.overlays.retain(|o| o != id);
            self.legends.remove_legend(id);
            return None;
        }

        binding.set_active(true);
        if !self.overlays.iter().any(|o| o == id) {
            self.overlays.push(id.to_string());
        }

        match binding.stats_state() {
            StatsState::Ready(stats) => {
                debug!("Using cached statistics for '{id}'");
                self.legends.make_legend(legend_for(binding, stats));
                None
            }
            StatsState::Pending => None,
            StatsState::NotRequested => {
                info!("Loading raster '{id}' from {}", binding.descriptor().url);
                binding.mark_pending();
                Some(LayerCommand::LoadRaster {
                    id: id.to_string(),
                    url: binding.descriptor().url.clone(),
                })
            }
        }
    }

    /// Store a finished raster load. Failures cache unknown statistics.
    ///
    /// The legend is only shown if the layer is still active.
    pub fn on_raster_loaded(&mut self, id: &str, result: Result<Arc<GeoRaster>, LoadError>) {
        let Some(binding) = self.raster_mut(id) else {
            warn!("Raster loaded for unknown layer '{id}'");
            return;
        };

        let stats = match result {
            Ok(raster) => {
                let stats = raster.stats();
                info!(
                    "Loaded raster '{id}' ({}x{}), range {:?}..{:?}",
                    raster.width(),
                    raster.height(),
                    stats.min,
                    stats.max
                );
                binding.store(Some(raster), stats);
                stats
            }
            Err(e) => {
                warn!("Failed to compute statistics for '{id}': {e}");
                binding.store(None, RasterStats::UNKNOWN);
                RasterStats::UNKNOWN
            }
        };

        if binding.is_active() {
            let legend = legend_for(binding, stats);
            self.legends.make_legend(legend);
        }
    }

    pub fn set_opacity(&mut self, id: &str, opacity: f32) {
        if let Some(binding) = self.raster_mut(id) {
            binding.set_opacity(opacity);
        }
    }

    pub fn on_vector_loaded(&mut self, result: Result<VectorLayer, LoadError>) {
        match result {
            Ok(layer) => {
                info!(
                    "Loaded vector layer '{}' ({} shapes)",
                    self.vector.descriptor().id,
                    layer.shapes().len()
                );
                self.vector.set_state(VectorState::Ready(layer));
            }
            Err(e) => {
                warn!("Failed to load vector layer '{}': {e}", self.vector.descriptor().id);
                self.vector.set_state(VectorState::Failed);
            }
        }
    }

    /// Show or hide the vector layer. Showing it fits the view to its bounds
    /// when they are valid.
    pub fn set_vector_active(&mut self, active: bool) -> Option<LayerCommand> {
        if !self.vector.is_interactive() {
            return None;
        }

        self.vector.set_visible(active);
        if !active {
            return None;
        }

        self.vector
            .layer()
            .and_then(VectorLayer::bounds)
            .filter(GeoBounds::is_valid)
            .map(|bounds| LayerCommand::FitBounds {
                bounds,
                max_zoom: FIT_MAX_ZOOM,
            })
    }
}

fn legend_for(binding: &RasterBinding, stats: RasterStats) -> Legend {
    let d = binding.descriptor();
    Legend::build(&d.id, &d.title, &d.color_scale, stats, &d.unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use raster_overlay::{Crs, GeoTransform};

    fn controller() -> LayerController {
        LayerController::new(
            &descriptor::default_raster_layers(),
            &VectorDescriptor::default(),
            &PanelConfig::default(),
        )
    }

    fn raster(samples: Vec<f64>) -> Arc<GeoRaster> {
        let transform = GeoTransform {
            origin_x: 107.0,
            origin_y: -6.0,
            pixel_width: 0.1,
            pixel_height: -0.1,
        };
        let width = samples.len() as u32;
        Arc::new(GeoRaster::new(width, 1, samples, transform, Crs::Geographic).unwrap())
    }

    fn not_found() -> LoadError {
        LoadError::Status {
            url: "http://localhost/Data/AspekLingkungan/DEM".to_string(),
            status: 404,
        }
    }

    #[test]
    fn test_all_default_layers_bound() {
        let layers = controller();
        assert_eq!(layers.rasters().len(), 6);
        assert!(layers.raster("ndwi").is_some_and(RasterBinding::has_slider));
        assert!(layers.vector().has_toggle());
    }

    #[test]
    fn test_first_activation_requests_load() {
        let mut layers = controller();
        let cmd = layers.set_raster_active("dem", true);
        assert_eq!(
            cmd,
            Some(LayerCommand::LoadRaster {
                id: "dem".to_string(),
                url: "Data/AspekLingkungan/DEM".to_string(),
            })
        );
        assert_eq!(layers.overlay_ids(), ["dem"]);
        // Legend waits for the statistics
        assert!(layers.legends().is_empty());
        assert!(layers.raster("dem").is_some_and(RasterBinding::is_pending));
    }

    #[test]
    fn test_toggle_on_then_off_restores_state() {
        let mut layers = controller();
        layers.set_raster_active("lst", true);
        layers.on_raster_loaded("lst", Ok(raster(vec![20.0, 31.5])));
        let overlays_before = layers.overlay_ids().to_vec();
        let legends_before = layers.legends().ids().join(",");

        layers.set_raster_active("dem", true);
        layers.on_raster_loaded("dem", Ok(raster(vec![0.0, 3000.0])));
        layers.set_raster_active("dem", false);

        assert_eq!(layers.overlay_ids(), overlays_before.as_slice());
        assert_eq!(layers.legends().ids().join(","), legends_before);
    }

    #[test]
    fn test_double_activation_single_legend() {
        let mut layers = controller();
        layers.set_raster_active("ndvi", true);
        layers.on_raster_loaded("ndvi", Ok(raster(vec![-0.2, 0.8])));

        assert_eq!(layers.set_raster_active("ndvi", true), None);
        assert_eq!(layers.legends().len(), 1);
        assert_eq!(layers.overlay_ids().len(), 1);
    }

    #[test]
    fn test_pending_load_not_requested_twice() {
        let mut layers = controller();
        assert!(layers.set_raster_active("curah", true).is_some());
        layers.set_raster_active("curah", false);
        assert_eq!(layers.set_raster_active("curah", true), None);

        layers.on_raster_loaded("curah", Ok(raster(vec![1200.0, 3400.0])));
        assert_eq!(layers.legends().ids(), vec!["curah"]);
    }

    #[test]
    fn test_cached_stats_reused() {
        let mut layers = controller();
        layers.set_raster_active("dem", true);
        layers.on_raster_loaded("dem", Ok(raster(vec![2.0, 5.0, -1.0, f64::NAN, 9.0])));
        layers.set_raster_active("dem", false);

        assert_eq!(layers.set_raster_active("dem", true), None);
        let legend = layers.legends().get("dem").unwrap();
        assert_eq!((legend.min_label.as_str(), legend.max_label.as_str()), ("-1", "9"));
        assert_eq!(legend.unit, "m");
    }

    #[test]
    fn test_load_finishing_while_inactive_has_no_legend() {
        let mut layers = controller();
        layers.set_raster_active("ndmi", true);
        layers.set_raster_active("ndmi", false);
        layers.on_raster_loaded("ndmi", Ok(raster(vec![0.1, 0.4])));

        assert!(layers.legends().is_empty());
        let stats = layers.raster("ndmi").and_then(RasterBinding::stats).unwrap();
        assert_eq!(stats.max, Some(0.4));
    }

    #[test]
    fn test_unreachable_raster_uses_placeholders() {
        let mut layers = controller();
        layers.set_raster_active("dem", true);
        layers.on_raster_loaded("dem", Err(not_found()));

        assert_eq!(layers.overlay_ids(), ["dem"]);
        let legend = layers.legends().get("dem").unwrap();
        assert_eq!((legend.min_label.as_str(), legend.max_label.as_str()), ("min", "max"));

        // Never retried
        layers.set_raster_active("dem", false);
        assert_eq!(layers.set_raster_active("dem", true), None);
        assert_eq!(layers.raster("dem").and_then(RasterBinding::stats), Some(RasterStats::UNKNOWN));
    }

    #[test]
    fn test_missing_toggle_skips_binding() {
        let panel = PanelConfig {
            controls: PanelConfig::default()
                .controls
                .into_iter()
                .filter(|c| c.id != "lst" && c.id != "model2025")
                .collect(),
            ..PanelConfig::default()
        };
        let mut layers = LayerController::new(
            &descriptor::default_raster_layers(),
            &VectorDescriptor::default(),
            &panel,
        );

        assert_eq!(layers.rasters().len(), 5);
        assert_eq!(layers.set_raster_active("lst", true), None);
        assert!(layers.overlay_ids().is_empty());

        layers.on_vector_loaded(VectorLayer::from_geojson(r#"{"type": "Point", "coordinates": [107, -7]}"#).map_err(LoadError::from));
        assert!(!layers.vector().is_interactive());
        assert_eq!(layers.set_vector_active(true), None);
    }

    #[test]
    fn test_slider_is_optional() {
        let panel = PanelConfig {
            controls: vec![ControlConfig::toggle("dem")],
            ..PanelConfig::default()
        };
        let mut layers = LayerController::new(&descriptor::default_raster_layers(), &VectorDescriptor::default(), &panel);
        let dem = layers.raster("dem").unwrap();
        assert!(!dem.has_slider());
        assert!((dem.opacity() - 0.7).abs() < f32::EPSILON);

        layers.set_opacity("dem", 1.5);
        assert!((layers.raster("dem").unwrap().opacity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_opacity_independent_of_activation() {
        let mut layers = controller();
        layers.set_opacity("ndwi", 0.25);
        layers.set_raster_active("ndwi", true);
        layers.set_raster_active("ndwi", false);
        assert!((layers.raster("ndwi").unwrap().opacity() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_vector_fit_bounds_only_when_valid() {
        let mut layers = controller();
        // Not loaded yet: inert
        assert_eq!(layers.set_vector_active(true), None);
        assert!(!layers.vector().is_visible());

        let empty = VectorLayer::from_geojson(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        layers.on_vector_loaded(Ok(empty));
        assert_eq!(layers.set_vector_active(true), None);
        assert!(layers.vector().is_visible());

        let square = r#"{"type": "Polygon", "coordinates": [[[107, -7], [108, -7], [108, -6], [107, -7]]]}"#;
        layers.on_vector_loaded(VectorLayer::from_geojson(square).map_err(LoadError::from));
        let cmd = layers.set_vector_active(true);
        assert_eq!(
            cmd,
            Some(LayerCommand::FitBounds {
                bounds: GeoBounds::new(-7.0, 107.0, -6.0, 108.0),
                max_zoom: 11.0,
            })
        );

        assert_eq!(layers.set_vector_active(false), None);
        assert!(!layers.vector().is_visible());
    }

    #[test]
    fn test_vector_failure_leaves_toggle_inert() {
        let mut layers = controller();
        layers.on_vector_loaded(Err(not_found()));
        assert!(matches!(layers.vector().state(), VectorState::Failed));
        assert_eq!(layers.set_vector_active(true), None);
    }
}
