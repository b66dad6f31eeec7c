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

//! Raster to RGBA rendering through a color scale.

use crate::{ColorScale, GeoRaster};

/// Unpremultiplied RGBA image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 4]>,
}

impl RgbaImage {
    /// Flat RGBA bytes, as expected by texture uploaders.
    #[must_use]
    pub fn as_flat_samples(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }
}

/// Render `raster` through `scale`, mapping `domain.0..domain.1` onto the
/// scale. Non-finite samples become fully transparent.
///
/// The output is downsampled (nearest neighbour) so neither side exceeds
/// `max_dim`.
#[must_use]
pub fn colorize(
    raster: &GeoRaster,
    scale: &ColorScale,
    domain: (f64, f64),
    max_dim: u32,
) -> RgbaImage {
    let (width, height) = (raster.width(), raster.height());
    let longest = width.max(height);
    let step = longest.div_ceil(max_dim.max(1)).max(1);
    let out_w = width.div_ceil(step);
    let out_h = height.div_ceil(step);

    let (lo, hi) = domain;
    let span = hi - lo;

    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let value = raster.value_at(ox * step, oy * step).unwrap_or(f64::NAN);
            if !value.is_finite() {
                pixels.push([0, 0, 0, 0]);
                continue;
            }
            let t = if span > 0.0 { (value - lo) / span } else { 0.0 };
            let [r, g, b] = scale.sample(t);
            pixels.push([r, g, b, 255]);
        }
    }

    RgbaImage {
        width: out_w as usize,
        height: out_h as usize,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorscale::FALLBACK;
    use crate::{Crs, GeoTransform};

    fn raster(width: u32, height: u32, samples: Vec<f64>) -> GeoRaster {
        let transform = GeoTransform {
            origin_x: 107.0,
            origin_y: -6.0,
            pixel_width: 0.01,
            pixel_height: -0.01,
        };
        GeoRaster::new(width, height, samples, transform, Crs::Geographic).unwrap()
    }

    #[test]
    fn test_colorize_maps_domain_and_transparency() {
        let r = raster(3, 1, vec![0.0, f64::NAN, 10.0]);
        let image = colorize(&r, &FALLBACK, (0.0, 10.0), 1024);

        assert_eq!((image.width, image.height), (3, 1));
        assert_eq!(image.pixels[0], [0x44, 0x01, 0x54, 255]);
        assert_eq!(image.pixels[1][3], 0);
        assert_eq!(image.pixels[2], [0xfd, 0xe7, 0x25, 255]);
    }

    #[test]
    fn test_colorize_downsamples() {
        let r = raster(10, 4, vec![1.0; 40]);
        let image = colorize(&r, &FALLBACK, (0.0, 1.0), 5);
        assert_eq!((image.width, image.height), (5, 2));
        assert_eq!(image.as_flat_samples().len(), 5 * 2 * 4);
    }

    #[test]
    fn test_flat_domain_uses_scale_start() {
        let r = raster(1, 1, vec![42.0]);
        let image = colorize(&r, &FALLBACK, (42.0, 42.0), 16);
        assert_eq!(image.pixels[0], [0x44, 0x01, 0x54, 255]);
    }
}
