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

//! Click markers with popups.
//!
//! Markers accumulate for the session. At most one popup is open; opening
//! another closes it.

use egui::{Color32, FontId, Pos2, Rect, Stroke};
use walkers::{lon_lat, MapMemory, Plugin, Projector};

const PIN_COLOR: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);
const PIN_RADIUS: f32 = 7.0;
/// Pin head sits this far above the marked point
const PIN_HEIGHT: f32 = 14.0;
const HIT_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

/// Popup text of a click marker.
pub fn click_popup_text(lat: f64, lon: f64) -> String {
    format!("Lat: {lat:.6}\nLng: {lon:.6}")
}

#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    open: Option<usize>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker and open its popup.
    pub fn add(&mut self, lat: f64, lon: f64, popup: String) -> usize {
        self.markers.push(Marker { lat, lon, popup });
        let index = self.markers.len() - 1;
        self.open = Some(index);
        index
    }

    /// Add a marker for a map click.
    pub fn add_click(&mut self, lat: f64, lon: f64) -> usize {
        self.add(lat, lon, click_popup_text(lat, lon))
    }

    pub fn open_popup(&mut self, index: usize) {
        if index < self.markers.len() {
            self.open = Some(index);
        }
    }

    pub fn close_popup(&mut self) {
        self.open = None;
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// What a map click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerHit {
    Marker(usize),
    Popup,
    ClosePopup,
}

/// Popup body and close button rectangles for a pin at `anchor`.
fn popup_rects(anchor: Pos2, text_size: egui::Vec2) -> (Rect, Rect) {
    let size = text_size + egui::vec2(16.0 + 16.0, 12.0);
    let bottom_center = anchor - egui::vec2(0.0, PIN_HEIGHT + PIN_RADIUS + 8.0);
    let body = Rect::from_min_size(bottom_center - egui::vec2(size.x / 2.0, size.y), size);
    let close = Rect::from_center_size(body.right_top() + egui::vec2(-10.0, 10.0), egui::vec2(14.0, 14.0));
    (body, close)
}

/// Popup takes precedence over pins; the last drawn pin wins.
fn hit_test(click: Pos2, pins: &[Pos2], popup: Option<(Rect, Rect)>) -> Option<MarkerHit> {
    if let Some((body, close)) = popup {
        if close.contains(click) {
            return Some(MarkerHit::ClosePopup);
        }
        if body.contains(click) {
            return Some(MarkerHit::Popup);
        }
    }

    pins.iter()
        .rposition(|pin| pin.distance(click) <= HIT_RADIUS)
        .map(MarkerHit::Marker)
}

/// Plugin drawing pins and the open popup, reporting clicks on them
pub struct MarkersPlugin<'a> {
    layer: &'a MarkerLayer,
    hit: &'a mut Option<MarkerHit>,
}

impl<'a> MarkersPlugin<'a> {
    pub fn new(layer: &'a MarkerLayer, hit: &'a mut Option<MarkerHit>) -> Self {
        Self { layer, hit }
    }
}

impl Plugin for MarkersPlugin<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();

        let anchors: Vec<Pos2> = self
            .layer
            .markers()
            .iter()
            .map(|m| {
                let v = projector.project(lon_lat(m.lon, m.lat));
                egui::pos2(v.x, v.y)
            })
            .collect();
        let heads: Vec<Pos2> = anchors.iter().map(|a| *a - egui::vec2(0.0, PIN_HEIGHT)).collect();

        for (anchor, head) in anchors.iter().zip(&heads) {
            painter.line_segment([*head, *anchor], Stroke::new(3.0, PIN_COLOR));
            painter.circle_filled(*head + egui::vec2(1.5, 1.5), PIN_RADIUS, Color32::from_black_alpha(80));
            painter.circle_filled(*head, PIN_RADIUS, PIN_COLOR);
            painter.circle_stroke(*head, PIN_RADIUS, Stroke::new(2.0, Color32::WHITE));
        }

        let mut popup = None;
        if let Some(index) = self.layer.open_index() {
            if let (Some(marker), Some(anchor)) = (self.layer.markers().get(index), anchors.get(index)) {
                let text_color = Color32::from_gray(30);
                let galley = painter.layout_no_wrap(marker.popup.clone(), FontId::proportional(13.0), text_color);
                let (body, close) = popup_rects(*anchor, galley.size());

                painter.rect_filled(body.translate(egui::vec2(2.0, 2.0)), 6.0, Color32::from_black_alpha(60));
                painter.rect_filled(body, 6.0, Color32::WHITE);
                painter.galley(body.min + egui::vec2(8.0, 6.0), galley, text_color);
                painter.text(
                    close.center(),
                    egui::Align2::CENTER_CENTER,
                    "×",
                    FontId::proportional(14.0),
                    Color32::from_gray(110),
                );
                popup = Some((body, close));
            }
        }

        if response.clicked() {
            if let Some(click) = response.interact_pointer_pos() {
                *self.hit = hit_test(click, &heads, popup);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_popup_text() {
        assert_eq!(click_popup_text(-6.9, 107.6), "Lat: -6.900000\nLng: 107.600000");
    }

    #[test]
    fn test_new_popup_replaces_open_one() {
        let mut layer = MarkerLayer::new();
        let first = layer.add_click(-6.9, 107.6);
        assert_eq!(layer.open_index(), Some(first));

        let second = layer.add_click(-7.0, 107.7);
        assert_eq!(layer.open_index(), Some(second));
        assert_eq!(layer.len(), 2);

        layer.open_popup(first);
        assert_eq!(layer.open_index(), Some(first));

        layer.close_popup();
        assert_eq!(layer.open_index(), None);
        // Markers are never removed
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_open_popup_ignores_bad_index() {
        let mut layer = MarkerLayer::new();
        layer.open_popup(3);
        assert_eq!(layer.open_index(), None);
    }

    #[test]
    fn test_hit_test() {
        let pins = [egui::pos2(100.0, 100.0), egui::pos2(105.0, 100.0)];
        // Overlapping pins: the one drawn last is on top
        assert_eq!(hit_test(egui::pos2(103.0, 101.0), &pins, None), Some(MarkerHit::Marker(1)));
        assert_eq!(hit_test(egui::pos2(300.0, 300.0), &pins, None), None);

        let (body, close) = popup_rects(egui::pos2(100.0, 114.0), egui::vec2(80.0, 30.0));
        let popup = Some((body, close));
        assert_eq!(hit_test(close.center(), &pins, popup), Some(MarkerHit::ClosePopup));
        assert_eq!(hit_test(body.left_bottom() + egui::vec2(2.0, -2.0), &pins, popup), Some(MarkerHit::Popup));
    }
}
