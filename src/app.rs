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

//! The map window.

use eframe::egui;
use log::{info, warn};
use raster_overlay::GeoBounds;
use walkers::{lat_lon, Map, MapMemory, Position};

use crate::assets::{AssetLoader, LoadEvent};
use crate::config::AppConfig;
use crate::controls::{scale, GeocodeResult, GeocoderControl, MeasureTool, ScaleBar};
use crate::layers::{LayerCommand, LayerController};
use crate::map::{
    BasemapTiles, MarkerHit, MarkerLayer, MarkersPlugin, MeasurePlugin, OverlayTextures, PointerEvents,
    PointerPlugin, VectorLayerPlugin, WebMercator,
};
use crate::ui::{layer_panel, legend_view, Hud, InfoPanel, PanelAction};

/// Viewport assumed for fitting before the map has been laid out
const FALLBACK_VIEWPORT: egui::Vec2 = egui::vec2(800.0, 600.0);

pub struct EnvAtlasApp {
    config: AppConfig,
    loader: AssetLoader,
    layers: LayerController,

    basemaps: BasemapTiles,
    memory: MapMemory,
    home: Position,
    map_rect: Option<egui::Rect>,
    overlays: OverlayTextures,

    markers: MarkerLayer,
    measure: MeasureTool,
    geocoder: GeocoderControl,
    hud: Hud,
    info: InfoPanel,
}

impl EnvAtlasApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, mut loader: AssetLoader) -> Self {
        loader.set_repaint_context(cc.egui_ctx.clone());

        let layers = LayerController::new(&config.raster_layers, &config.vector_layer, &config.panel);
        info!(
            "Bound {} of {} raster layers",
            layers.rasters().len(),
            config.raster_layers.len()
        );

        // The prediction layer is fetched once, whatever its toggle state
        loader.load_vector(&config.vector_layer.url);

        let mut memory = MapMemory::default();
        if let Err(e) = memory.set_zoom(config.default_zoom) {
            warn!("Invalid default zoom {}: {e:?}", config.default_zoom);
        }

        Self {
            basemaps: BasemapTiles::new(config.basemap),
            home: lat_lon(config.center_lat, config.center_lon),
            info: InfoPanel::new(config.panel.info_panel),
            memory,
            map_rect: None,
            overlays: OverlayTextures::new(),
            markers: MarkerLayer::new(),
            measure: MeasureTool::new(),
            geocoder: GeocoderControl::new(),
            hud: Hud::new(),
            layers,
            loader,
            config,
        }
    }

    /// Apply results of background loads.
    fn process_events(&mut self) {
        for event in self.loader.drain() {
            match event {
                LoadEvent::Raster { id, result } => self.layers.on_raster_loaded(&id, result),
                LoadEvent::Vector(result) => self.layers.on_vector_loaded(result),
                LoadEvent::Geocoded(result) => {
                    self.geocoder.finish(&result);
                    match result {
                        Ok(Some(place)) => self.show_place(place),
                        Ok(None) => info!("Geocoder returned no results"),
                        Err(e) => warn!("Geocoder request failed: {e}"),
                    }
                }
            }
        }
    }

    fn execute(&mut self, command: LayerCommand) {
        match command {
            LayerCommand::LoadRaster { id, url } => {
                info!("Loading raster layer '{id}' from {url}");
                self.loader.load_raster(&id, &url);
            }
            LayerCommand::FitBounds { bounds, max_zoom } => self.fit_bounds(&bounds, max_zoom),
        }
    }

    fn apply(&mut self, actions: Vec<PanelAction>) {
        for action in actions {
            let command = match action {
                PanelAction::SetRaster { id, active } => self.layers.set_raster_active(&id, active),
                PanelAction::SetOpacity { id, opacity } => {
                    self.layers.set_opacity(&id, opacity);
                    None
                }
                PanelAction::SetVector(visible) => self.layers.set_vector_active(visible),
            };
            if let Some(command) = command {
                self.execute(command);
            }
        }
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds, max_zoom: f64) {
        let size = self.map_rect.map_or(FALLBACK_VIEWPORT, |r| r.size());
        let zoom = WebMercator::fit_zoom(bounds, size.x, size.y, max_zoom);
        let (lat, lon) = bounds.center();

        self.memory.center_at(lat_lon(lat, lon));
        if let Err(e) = self.memory.set_zoom(zoom) {
            warn!("Cannot zoom to {zoom}: {e:?}");
        }
    }

    /// Move to a geocoded place and mark it.
    fn show_place(&mut self, place: GeocodeResult) {
        info!("Geocoded '{}' at {:.5}, {:.5}", place.name, place.lat, place.lon);

        match place.bounds.filter(GeoBounds::is_valid) {
            Some(bounds) => self.fit_bounds(&bounds, f64::from(self.basemaps.active().max_zoom())),
            None => self.memory.center_at(lat_lon(place.lat, place.lon)),
        }
        self.markers.add(place.lat, place.lon, place.name);
    }

    fn map_center(&self) -> Position {
        self.memory.detached().unwrap_or(self.home)
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        self.overlays.sync(&ctx, &self.layers);

        let mut pointer = PointerEvents::default();
        let mut hit = None;

        let mut map = Map::new(Some(self.basemaps.active_tiles(&ctx)), &mut self.memory, self.home)
            .with_plugin(self.overlays.plugin(&self.layers));

        let vector = self.layers.vector();
        if let (true, Some(layer)) = (vector.is_visible(), vector.layer()) {
            map = map.with_plugin(VectorLayerPlugin::new(layer, vector.style()));
        }

        let map = map
            .with_plugin(MeasurePlugin::new(&self.measure))
            .with_plugin(MarkersPlugin::new(&self.markers, &mut hit))
            .with_plugin(PointerPlugin::new(&mut pointer));
        ui.add(map);

        self.map_rect = pointer.map_rect;
        if self.config.panel.hud {
            self.hud.update(pointer.hover);
        }
        self.handle_click(pointer.click, hit);
    }

    fn handle_click(&mut self, click: Option<(f64, f64)>, hit: Option<MarkerHit>) {
        let Some((lat, lon)) = click else {
            return;
        };

        if self.measure.is_active() {
            self.measure.add_point(lat, lon);
            return;
        }

        match hit {
            Some(MarkerHit::Marker(index)) => self.markers.open_popup(index),
            Some(MarkerHit::ClosePopup) => self.markers.close_popup(),
            Some(MarkerHit::Popup) => {}
            None => {
                self.markers.add_click(lat, lon);
            }
        }
    }

    /// Floating controls over the map.
    fn draw_map_controls(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let controls = self.config.controls;

        let query = egui::Area::new(egui::Id::new("map_controls_top_left"))
            .fixed_pos(rect.left_top() + egui::vec2(10.0, 10.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new("Basemap").strong());
                    self.basemaps.show_switcher(ui);
                });

                let mut query = None;
                if controls.geocoder {
                    ui.add_space(6.0);
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        query = self.geocoder.show(ui);
                    });
                }

                if controls.measure {
                    ui.add_space(6.0);
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        self.measure.show(ui);
                    });
                }
                query
            })
            .inner;

        if let Some(query) = query {
            info!("Searching for '{query}'");
            self.loader.geocode(&self.config.geocoder_url, &query);
        }

        let scale_bar = if controls.scale {
            let center = self.map_center();
            ScaleBar::compute(
                WebMercator::meters_per_pixel(center.y(), self.memory.zoom()),
                scale::MAX_WIDTH,
            )
        } else {
            None
        };

        egui::Area::new(egui::Id::new("map_controls_bottom_left"))
            .pivot(egui::Align2::LEFT_BOTTOM)
            .fixed_pos(rect.left_bottom() + egui::vec2(10.0, -10.0))
            .interactable(false)
            .show(ctx, |ui| {
                if let Some(bar) = &scale_bar {
                    bar.show(ui);
                }
                if self.config.panel.hud && self.hud.text().is_some() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| self.hud.show(ui));
                }
            });

        let attribution = self.basemaps.active().attribution();
        egui::Area::new(egui::Id::new("map_attribution"))
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .fixed_pos(rect.right_bottom() + egui::vec2(-4.0, -2.0))
            .show(ctx, |ui| {
                ui.hyperlink_to(egui::RichText::new(attribution.text).small(), attribution.url);
            });
    }
}

impl eframe::App for EnvAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        if self.info.is_enabled() && !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::I)) {
            self.info.toggle();
        }

        let actions = egui::SidePanel::left("layer_panel")
            .resizable(false)
            .default_width(230.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("EnvAtlas");
                    if self.info.is_enabled() {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("ℹ").on_hover_text("Toggle info panel (I)").clicked() {
                                self.info.toggle();
                            }
                        });
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .show(ui, |ui| layer_panel::show(ui, &self.layers))
                    .inner
            })
            .inner;
        self.apply(actions);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui);
            });

        if let Some(rect) = self.map_rect {
            self.draw_map_controls(ctx, rect);
        }

        legend_view::show(ctx, self.layers.legends());
        self.info.show(ctx, &self.layers);
    }
}
