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

//! Background asset loading.
//!
//! The loader owns a tokio runtime. Each request runs as a task that fetches
//! the bytes, decodes them on the blocking pool and sends a [`LoadEvent`]
//! back over a channel. The UI thread drains the channel once per frame.

use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;
use log::{debug, warn};
use raster_overlay::GeoRaster;

use super::{AssetLocation, AssetRoot, DiskCache, LoadError};
use crate::controls::geocoder::{self, GeocodeResult};
use crate::layers::VectorLayer;

/// Result of a background request.
#[derive(Debug)]
pub enum LoadEvent {
    Raster {
        id: String,
        result: Result<Arc<GeoRaster>, LoadError>,
    },
    Vector(Result<VectorLayer, LoadError>),
    Geocoded(Result<Option<GeocodeResult>, LoadError>),
}

pub struct AssetLoader {
    root: AssetRoot,
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    cache: Option<DiskCache>,
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    repaint: Option<egui::Context>,
}

impl AssetLoader {
    /// Create a loader. Without `cache`, remote assets are fetched every time.
    pub fn new(root: AssetRoot, cache: Option<DiskCache>) -> Result<Self, LoadError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("asset-loader")
            .enable_all()
            .build()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let (tx, rx) = channel();

        Ok(Self {
            root,
            runtime,
            client,
            cache,
            tx,
            rx,
            repaint: None,
        })
    }

    /// Request a repaint on `ctx` whenever an event arrives.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn root(&self) -> &AssetRoot {
        &self.root
    }

    /// Fetch and decode a GeoTIFF.
    pub fn load_raster(&self, id: &str, path: &str) {
        let location = self.root.resolve(path);
        let client = self.client.clone();
        let cache = self.cache.clone();
        let id = id.to_string();

        self.spawn(async move {
            let result = load_raster(&location, &client, cache.as_ref()).await;
            LoadEvent::Raster { id, result }
        });
    }

    /// Fetch and parse a GeoJSON document.
    pub fn load_vector(&self, path: &str) {
        let location = self.root.resolve(path);
        let client = self.client.clone();
        let cache = self.cache.clone();

        self.spawn(async move { LoadEvent::Vector(load_vector(&location, &client, cache.as_ref()).await) });
    }

    /// Run a place search.
    pub fn geocode(&self, endpoint: &str, query: &str) {
        let client = self.client.clone();
        let endpoint = endpoint.to_string();
        let query = query.to_string();

        self.spawn(async move { LoadEvent::Geocoded(geocoder::search(&client, &endpoint, &query).await) });
    }

    /// Events completed since the last call.
    pub fn drain(&self) -> Vec<LoadEvent> {
        self.rx.try_iter().collect()
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = LoadEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();

        self.runtime.spawn(async move {
            let event = task.await;
            if tx.send(event).is_err() {
                debug!("Load finished after the receiver was dropped");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }
}

async fn load_raster(location: &AssetLocation, client: &reqwest::Client, cache: Option<&DiskCache>) -> Result<Arc<GeoRaster>, LoadError> {
    let bytes = fetch(location, client, cache).await?;
    let raster = tokio::task::spawn_blocking(move || GeoRaster::decode(&bytes)).await??;
    Ok(Arc::new(raster))
}

async fn load_vector(location: &AssetLocation, client: &reqwest::Client, cache: Option<&DiskCache>) -> Result<VectorLayer, LoadError> {
    let bytes = fetch(location, client, cache).await?;
    tokio::task::spawn_blocking(move || -> Result<VectorLayer, LoadError> {
        let text = std::str::from_utf8(&bytes)?;
        Ok(VectorLayer::from_geojson(text)?)
    })
    .await?
}

/// Read a local file, or GET a URL through the disk cache.
pub async fn fetch(location: &AssetLocation, client: &reqwest::Client, cache: Option<&DiskCache>) -> Result<Vec<u8>, LoadError> {
    let url = match location {
        AssetLocation::File(path) => return Ok(tokio::fs::read(path).await?),
        AssetLocation::Url(url) => url,
    };

    if let Some(bytes) = cache.and_then(|c| c.get(url)) {
        debug!("Cache hit for {url}");
        return Ok(bytes);
    }

    let response = client.get(url.as_str()).send().await?;
    if !response.status().is_success() {
        return Err(LoadError::Status {
            url: url.clone(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await?.to_vec();

    if let Some(cache) = cache {
        if let Err(e) = cache.put(url, &bytes) {
            warn!("Failed to cache {url}: {e}");
        }
    }

    Ok(bytes)
}
