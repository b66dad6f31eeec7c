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

//! Static asset access.
//!
//! Raster and vector assets live under an asset root, which is either a local
//! directory or an http(s) base URL. Remote responses are kept in a disk
//! cache so a second session starts without network access.

pub mod cache;
pub mod loader;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use cache::DiskCache;
pub use loader::{AssetLoader, LoadEvent};

/// Errors that can occur while loading an asset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("raster decode failed: {0}")]
    Raster(#[from] raster_overlay::RasterError),

    #[error("GeoJSON parse failed: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("asset is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("geocoder response invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where relative asset paths resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRoot {
    Directory(PathBuf),
    Remote(String),
}

/// A resolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    File(PathBuf),
    Url(String),
}

fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

impl AssetRoot {
    /// `http(s)://...` is a remote base, anything else a directory.
    pub fn parse(root: &str) -> Self {
        if is_url(root) {
            Self::Remote(root.trim_end_matches('/').to_string())
        } else {
            Self::Directory(PathBuf::from(root))
        }
    }

    /// Resolve an asset path. Absolute URLs and absolute file paths are used
    /// verbatim.
    pub fn resolve(&self, path: &str) -> AssetLocation {
        if is_url(path) {
            return AssetLocation::Url(path.to_string());
        }

        match self {
            Self::Directory(dir) => {
                if Path::new(path).is_absolute() {
                    AssetLocation::File(PathBuf::from(path))
                } else {
                    AssetLocation::File(dir.join(path))
                }
            }
            Self::Remote(base) => AssetLocation::Url(format!("{base}/{}", path.trim_start_matches('/'))),
        }
    }
}

impl std::fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
