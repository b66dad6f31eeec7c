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

//! Raster overlay library for georeferenced environmental layers.
//!
//! This crate contains everything a map viewer needs to turn a GeoTIFF into
//! a colored overlay and a legend, without depending on any UI toolkit:
//!
//! - **Decoding**: single-band GeoTIFF samples plus georeferencing
//!   (tiepoint/pixel-scale or transformation matrix, geographic or
//!   Web Mercator)
//! - **Statistics**: min/max over the finite samples of a raster
//! - **Color scales**: a registry of named gradients and the stop list used
//!   to draw legends
//! - **Colorization**: RGBA rendering of a raster through a color scale
//!
//! # Quick Start
//!
//! ```no_run
//! use raster_overlay::{colorize, colorscale, GeoRaster};
//!
//! let bytes = std::fs::read("Data/AspekLingkungan/DEM").unwrap();
//! let raster = GeoRaster::decode(&bytes).unwrap();
//! let stats = raster.stats();
//! println!("DEM range: {:?}..{:?}", stats.min, stats.max);
//!
//! let scale = colorscale::lookup_or_fallback("terrain");
//! let image = colorize::colorize(&raster, scale, stats.domain(), 2048);
//! println!("{}x{} pixels", image.width, image.height);
//! ```

pub mod bounds;
pub mod colorize;
pub mod colorscale;
pub mod geotiff;
pub mod stats;

use thiserror::Error;

pub use bounds::GeoBounds;
pub use colorize::RgbaImage;
pub use colorscale::{ColorScale, GradientStop};
pub use geotiff::{Crs, GeoRaster, GeoTransform};
pub use stats::RasterStats;

/// Errors that can occur while decoding a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("TIFF decode failed: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("raster has no georeference (tiepoint/pixel scale or transformation tag)")]
    MissingGeoreference,

    #[error("unsupported coordinate reference system: EPSG:{0}")]
    UnsupportedCrs(u16),

    #[error("raster is empty or truncated: expected {expected} samples, got {actual}")]
    Truncated { expected: usize, actual: usize },
}
