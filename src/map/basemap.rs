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

//! Basemap tile sources.

use std::collections::HashMap;

use eframe::egui;
use serde::{Deserialize, Serialize};
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId};

/// Available background layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Basemap {
    #[default]
    OpenStreetMap,
    Satellite,
    Terrain,
    Topographic,
}

impl Basemap {
    pub const ALL: [Basemap; 4] = [
        Basemap::OpenStreetMap,
        Basemap::Satellite,
        Basemap::Terrain,
        Basemap::Topographic,
    ];

    /// Get human-readable display name
    pub fn display_name(self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "🌐 OpenStreetMap",
            Basemap::Satellite => "🛰️ Satelit",
            Basemap::Terrain => "⛰️ Terrain",
            Basemap::Topographic => "🗺️ Topografi",
        }
    }

    fn cache_name(self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "osm",
            Basemap::Satellite => "satellite",
            Basemap::Terrain => "terrain",
            Basemap::Topographic => "topo",
        }
    }

    pub fn max_zoom(self) -> u8 {
        match self {
            Basemap::OpenStreetMap | Basemap::Satellite => 19,
            Basemap::Terrain => 18,
            Basemap::Topographic => 17,
        }
    }

    pub fn tile_url(self, tile_id: TileId) -> String {
        // Subdomain load balancing (a, b, c) based on tile coordinates
        let subdomain = ['a', 'b', 'c'][((tile_id.x + tile_id.y) % 3) as usize];

        match self {
            Basemap::OpenStreetMap => format!(
                "https://{subdomain}.tile.openstreetmap.org/{}/{}/{}.png",
                tile_id.zoom, tile_id.x, tile_id.y
            ),
            Basemap::Satellite => format!(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
                tile_id.zoom, tile_id.y, tile_id.x
            ),
            Basemap::Terrain => format!(
                "https://stamen-tiles.a.ssl.fastly.net/terrain/{}/{}/{}.jpg",
                tile_id.zoom, tile_id.x, tile_id.y
            ),
            Basemap::Topographic => format!(
                "https://{subdomain}.tile.opentopomap.org/{}/{}/{}.png",
                tile_id.zoom, tile_id.x, tile_id.y
            ),
        }
    }

    pub fn attribution(self) -> Attribution {
        match self {
            Basemap::OpenStreetMap => Attribution {
                text: "© OpenStreetMap contributors",
                url: "https://www.openstreetmap.org/copyright",
                logo_light: None,
                logo_dark: None,
            },
            Basemap::Satellite => Attribution {
                text: "Tiles © Esri",
                url: "https://www.esri.com/",
                logo_light: None,
                logo_dark: None,
            },
            Basemap::Terrain => Attribution {
                text: "Map tiles by Stamen Design, © OpenStreetMap contributors",
                url: "https://maps.stamen.com/",
                logo_light: None,
                logo_dark: None,
            },
            Basemap::Topographic => Attribution {
                text: "© OpenTopoMap (CC-BY-SA)",
                url: "https://opentopomap.org/",
                logo_light: None,
                logo_dark: None,
            },
        }
    }
}

/// Tile source for one basemap
pub struct BasemapSource(Basemap);

impl TileSource for BasemapSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.0.tile_url(tile_id)
    }

    fn attribution(&self) -> Attribution {
        self.0.attribution()
    }

    fn max_zoom(&self) -> u8 {
        self.0.max_zoom()
    }
}

/// Lazily created tile layers, kept for the session
pub struct BasemapTiles {
    active: Basemap,
    tiles: HashMap<Basemap, HttpTiles>,
}

impl BasemapTiles {
    pub fn new(active: Basemap) -> Self {
        Self {
            active,
            tiles: HashMap::new(),
        }
    }

    pub fn active(&self) -> Basemap {
        self.active
    }

    pub fn set_active(&mut self, basemap: Basemap) {
        self.active = basemap;
    }

    /// Get or create HttpTiles for the active basemap
    pub fn active_tiles(&mut self, ctx: &egui::Context) -> &mut HttpTiles {
        let basemap = self.active;
        self.tiles.entry(basemap).or_insert_with(|| {
            let cache_dir = dirs::cache_dir()
                .unwrap_or_else(|| std::path::PathBuf::from(".cache"))
                .join("envatlas-desktop")
                .join("tiles")
                .join(basemap.cache_name());

            let http_options = HttpOptions {
                cache: Some(cache_dir),
                ..Default::default()
            };

            HttpTiles::with_options(BasemapSource(basemap), http_options, ctx.clone())
        })
    }

    /// Layer switcher: exactly one basemap is selected.
    pub fn show_switcher(&mut self, ui: &mut egui::Ui) {
        for basemap in Basemap::ALL {
            ui.radio_value(&mut self.active, basemap, basemap.display_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> TileId {
        TileId { x: 1, y: 2, zoom: 3 }
    }

    #[test]
    fn test_tile_urls() {
        assert_eq!(
            Basemap::OpenStreetMap.tile_url(tile()),
            "https://a.tile.openstreetmap.org/3/1/2.png"
        );
        // Esri orders y before x
        assert_eq!(
            Basemap::Satellite.tile_url(tile()),
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/3/2/1"
        );
        assert_eq!(
            Basemap::Terrain.tile_url(tile()),
            "https://stamen-tiles.a.ssl.fastly.net/terrain/3/1/2.jpg"
        );
        assert_eq!(
            Basemap::Topographic.tile_url(TileId { x: 2, y: 2, zoom: 5 }),
            "https://b.tile.opentopomap.org/5/2/2.png"
        );
    }

    #[test]
    fn test_max_zoom() {
        assert_eq!(Basemap::OpenStreetMap.max_zoom(), 19);
        assert_eq!(Basemap::Satellite.max_zoom(), 19);
        assert_eq!(Basemap::Terrain.max_zoom(), 18);
        assert_eq!(Basemap::Topographic.max_zoom(), 17);
    }

    #[test]
    fn test_default_is_osm() {
        assert_eq!(Basemap::default(), Basemap::OpenStreetMap);
        assert_eq!(BasemapTiles::new(Basemap::default()).active(), Basemap::OpenStreetMap);
    }
}
