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

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! It holds the map start view, the asset root, the layer definitions and the
//! panel layout that decides which controls exist.

use log::info;
use serde::{Deserialize, Serialize};

use crate::layers::descriptor::{default_raster_layers, LayerDescriptor, VectorDescriptor};
use crate::map::Basemap;

const APP_NAME: &str = "envatlas-desktop";
const CONFIG_NAME: &str = "config";

/// Current schema version
const CONFIG_VERSION: u32 = 1;

/// Nominatim search endpoint
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// A panel control bound to a layer id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ControlConfig {
    /// Layer id this control toggles
    pub id: String,

    /// Whether an opacity slider sits next to the toggle
    #[serde(default)]
    pub slider: bool,
}

impl ControlConfig {
    pub fn toggle(id: &str) -> Self {
        Self {
            id: id.to_string(),
            slider: false,
        }
    }

    pub fn with_slider(id: &str) -> Self {
        Self {
            id: id.to_string(),
            slider: true,
        }
    }
}

/// Which panel widgets exist.
///
/// A layer without an entry in `controls` has no toggle and is not bound.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PanelConfig {
    /// Show the coordinate readout
    #[serde(default = "default_true")]
    pub hud: bool,

    /// Show the info panel and its toggle button
    #[serde(default = "default_true")]
    pub info_panel: bool,

    /// Layer toggles, in panel order
    #[serde(default = "default_controls")]
    pub controls: Vec<ControlConfig>,
}

impl PanelConfig {
    /// Control configured for a layer id.
    pub fn control(&self, id: &str) -> Option<&ControlConfig> {
        self.controls.iter().find(|c| c.id == id)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            hud: true,
            info_panel: true,
            controls: default_controls(),
        }
    }
}

/// Stock map controls.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MapControls {
    #[serde(default = "default_true")]
    pub scale: bool,

    #[serde(default = "default_true")]
    pub geocoder: bool,

    #[serde(default = "default_true")]
    pub measure: bool,
}

impl Default for MapControls {
    fn default() -> Self {
        Self {
            scale: true,
            geocoder: true,
            measure: true,
        }
    }
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Initial map center latitude
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    /// Initial map center longitude
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Basemap selected at startup
    #[serde(default)]
    pub basemap: Basemap,

    /// Directory or http(s) base URL that relative asset paths resolve against
    #[serde(default = "default_asset_root")]
    pub asset_root: String,

    /// Raster overlays
    #[serde(default = "default_raster_layers")]
    pub raster_layers: Vec<LayerDescriptor>,

    /// Prediction polygon layer
    #[serde(default)]
    pub vector_layer: VectorDescriptor,

    #[serde(default)]
    pub panel: PanelConfig,

    #[serde(default)]
    pub controls: MapControls,

    /// Nominatim-compatible search endpoint
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

fn default_center_lat() -> f64 {
    -6.9
}

fn default_center_lon() -> f64 {
    107.6
}

fn default_zoom() -> f64 {
    8.0
}

fn default_asset_root() -> String {
    ".".to_string()
}

fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}

fn default_controls() -> Vec<ControlConfig> {
    let mut controls: Vec<ControlConfig> = default_raster_layers()
        .iter()
        .map(|layer| ControlConfig::with_slider(&layer.id))
        .collect();
    controls.push(ControlConfig::toggle(&VectorDescriptor::default().id));
    controls
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            default_zoom: default_zoom(),
            basemap: Basemap::default(),
            asset_root: default_asset_root(),
            raster_layers: default_raster_layers(),
            vector_layer: VectorDescriptor::default(),
            panel: PanelConfig::default(),
            controls: MapControls::default(),
            geocoder_url: default_geocoder_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        let mut config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;

        // Older files only lack fields, which serde already filled in
        if config.config_version < CONFIG_VERSION {
            info!(
                "Upgrading configuration from version {} to {}",
                config.config_version, CONFIG_VERSION
            );
            config.config_version = CONFIG_VERSION;
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Overwrite the stored configuration with defaults
    pub fn reset() -> Result<Self, confy::ConfyError> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }
}
