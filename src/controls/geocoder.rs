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

//! Place search against a Nominatim-compatible endpoint.

use eframe::egui;
use raster_overlay::GeoBounds;
use serde::Deserialize;

use crate::assets::LoadError;

/// One entry of a Nominatim `format=json` response.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
    /// `[south, north, west, east]`
    #[serde(default)]
    boundingbox: Vec<String>,
}

/// First search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub bounds: Option<GeoBounds>,
}

/// Parse a search response, keeping the first usable result.
pub fn parse_response(body: &str) -> Result<Option<GeocodeResult>, serde_json::Error> {
    let places: Vec<Place> = serde_json::from_str(body)?;

    Ok(places.into_iter().find_map(|place| {
        let lat = place.lat.parse::<f64>().ok()?;
        let lon = place.lon.parse::<f64>().ok()?;

        let bbox: Vec<f64> = place
            .boundingbox
            .iter()
            .filter_map(|v| v.parse::<f64>().ok())
            .collect();
        let bounds = match bbox.as_slice() {
            &[south, north, west, east] => Some(GeoBounds::new(south, west, north, east)),
            _ => None,
        }
        .filter(GeoBounds::is_valid);

        Some(GeocodeResult {
            lat,
            lon,
            name: place.display_name,
            bounds,
        })
    }))
}

/// Run a search query.
pub async fn search(client: &reqwest::Client, endpoint: &str, query: &str) -> Result<Option<GeocodeResult>, LoadError> {
    let response = client
        .get(endpoint)
        .query(&[("q", query), ("format", "json"), ("limit", "1")])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(LoadError::Status {
            url: endpoint.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(parse_response(&body)?)
}

/// Search box state.
#[derive(Debug, Default)]
pub struct GeocoderControl {
    query: String,
    pending: bool,
    message: Option<String>,
}

impl GeocoderControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the search box. Returns a query to submit.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<String> {
        let mut submit = None;

        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .hint_text("Search place…")
                    .desired_width(200.0),
            );
            let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.add_enabled(!self.pending, egui::Button::new("🔍")).clicked();

            let query = self.query.trim();
            if (enter || clicked) && !self.pending && !query.is_empty() {
                submit = Some(query.to_string());
            }
        });

        if self.pending {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Searching…");
            });
        } else if let Some(message) = &self.message {
            ui.label(egui::RichText::new(message).small().weak());
        }

        if submit.is_some() {
            self.pending = true;
            self.message = None;
        }
        submit
    }

    /// Record the outcome of the last query.
    pub fn finish(&mut self, result: &Result<Option<GeocodeResult>, LoadError>) {
        self.pending = false;
        self.message = match result {
            Ok(Some(_)) => None,
            Ok(None) => Some("Nothing found".to_string()),
            Err(e) => Some(format!("Search failed: {e}")),
        };
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_result() {
        let body = r#"[
            {
                "place_id": 1,
                "lat": "-6.9174639",
                "lon": "107.6191228",
                "display_name": "Bandung, Jawa Barat, Indonesia",
                "boundingbox": ["-6.9700", "-6.8400", "107.5400", "107.7400"]
            },
            {"lat": "0", "lon": "0", "display_name": "second"}
        ]"#;
        let result = parse_response(body).unwrap().unwrap();
        assert_eq!(result.name, "Bandung, Jawa Barat, Indonesia");
        assert!((result.lat + 6.917_463_9).abs() < 1e-9);
        assert_eq!(result.bounds, Some(GeoBounds::new(-6.97, 107.54, -6.84, 107.74)));
    }

    #[test]
    fn test_parse_without_bbox() {
        let body = r#"[{"lat": "1.5", "lon": "2.5", "display_name": "Somewhere"}]"#;
        let result = parse_response(body).unwrap().unwrap();
        assert_eq!((result.lat, result.lon), (1.5, 2.5));
        assert!(result.bounds.is_none());
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert_eq!(parse_response("[]").unwrap(), None);
        assert!(parse_response("{\"error\": 1}").is_err());

        let bad_coords = r#"[{"lat": "north", "lon": "2.5", "display_name": "x"}]"#;
        assert_eq!(parse_response(bad_coords).unwrap(), None);
    }

    #[test]
    fn test_finish_clears_pending() {
        let mut control = GeocoderControl::new();
        control.pending = true;
        control.finish(&Ok(None));
        assert!(!control.is_pending());
        assert_eq!(control.message.as_deref(), Some("Nothing found"));
    }
}
