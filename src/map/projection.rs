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

use raster_overlay::GeoBounds;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world
const MAX_LATITUDE: f64 = 85.051_128_78;

const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Web Mercator projection utilities
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to Web Mercator Y coordinate in tiles at `zoom`
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * 2_f64.powf(zoom)
    }

    /// Convert longitude to Web Mercator X coordinate in tiles at `zoom`
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        ((lon + 180.0) / 360.0) * 2_f64.powf(zoom)
    }

    /// Ground resolution at a latitude.
    pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
        EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / (TILE_SIZE * 2_f64.powf(zoom))
    }

    /// Largest whole zoom at which `bounds` fits in a `width` x `height`
    /// viewport, capped at `max_zoom`.
    pub fn fit_zoom(bounds: &GeoBounds, width: f32, height: f32, max_zoom: f64) -> f64 {
        let span_x = (Self::lon_to_x(bounds.east, 0.0) - Self::lon_to_x(bounds.west, 0.0)) * TILE_SIZE;
        let span_y = (Self::lat_to_y(bounds.south, 0.0) - Self::lat_to_y(bounds.north, 0.0)) * TILE_SIZE;

        let scale_x = if span_x > 0.0 { f64::from(width) / span_x } else { f64::INFINITY };
        let scale_y = if span_y > 0.0 { f64::from(height) / span_y } else { f64::INFINITY };
        let scale = scale_x.min(scale_y);

        if !scale.is_finite() {
            return max_zoom;
        }

        scale.log2().floor().clamp(0.0, max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_to_tiles() {
        assert!((WebMercator::lon_to_x(0.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((WebMercator::lat_to_y(0.0, 1.0) - 1.0).abs() < 1e-12);
        assert!(WebMercator::lat_to_y(60.0, 0.0) < WebMercator::lat_to_y(-60.0, 0.0));
        // Clamped at the poles
        assert!(WebMercator::lat_to_y(90.0, 0.0).is_finite());
    }

    #[test]
    fn test_meters_per_pixel() {
        assert!((WebMercator::meters_per_pixel(0.0, 0.0) - 156_543.03).abs() < 0.01);
        let at_bandung = WebMercator::meters_per_pixel(-6.9, 8.0);
        assert!((at_bandung - 607.1).abs() < 0.5, "got {at_bandung}");
    }

    #[test]
    fn test_fit_zoom() {
        let bounds = GeoBounds::new(-7.0, 107.0, -6.0, 108.0);
        assert_eq!(WebMercator::fit_zoom(&bounds, 800.0, 600.0, 11.0), 9.0);
        assert_eq!(WebMercator::fit_zoom(&bounds, 800.0, 600.0, 8.0), 8.0);
    }

    #[test]
    fn test_fit_zoom_tiny_or_point_bounds_capped() {
        let tiny = GeoBounds::new(-6.9001, 107.6, -6.9, 107.6001);
        assert_eq!(WebMercator::fit_zoom(&tiny, 800.0, 600.0, 11.0), 11.0);

        let point = GeoBounds::new(-6.9, 107.6, -6.9, 107.6);
        assert_eq!(WebMercator::fit_zoom(&point, 800.0, 600.0, 11.0), 11.0);
    }
}
