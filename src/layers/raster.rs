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

//! Runtime state of one raster overlay.

use std::sync::Arc;

use raster_overlay::{GeoRaster, RasterStats};

use super::descriptor::LayerDescriptor;

/// Statistics cache of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsState {
    /// Never activated
    NotRequested,
    /// Fetch and decode in flight
    Pending,
    /// Cached for the session, possibly [`RasterStats::UNKNOWN`]
    Ready(RasterStats),
}

/// A descriptor bound to its panel controls and loaded data.
#[derive(Debug)]
pub struct RasterBinding {
    descriptor: LayerDescriptor,
    has_slider: bool,
    active: bool,
    opacity: f32,
    stats: StatsState,
    raster: Option<Arc<GeoRaster>>,
    revision: u64,
}

impl RasterBinding {
    pub fn new(descriptor: LayerDescriptor, has_slider: bool) -> Self {
        let opacity = descriptor.opacity.clamp(0.0, 1.0);
        Self {
            descriptor,
            has_slider,
            active: false,
            opacity,
            stats: StatsState::NotRequested,
            raster: None,
            revision: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    pub fn has_slider(&self) -> bool {
        self.has_slider
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn stats_state(&self) -> StatsState {
        self.stats
    }

    /// Cached stats, if the load has finished.
    pub fn stats(&self) -> Option<RasterStats> {
        match self.stats {
            StatsState::Ready(stats) => Some(stats),
            StatsState::NotRequested | StatsState::Pending => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.stats == StatsState::Pending
    }

    /// Decoded raster, present once a load succeeded.
    pub fn raster(&self) -> Option<&Arc<GeoRaster>> {
        self.raster.as_ref()
    }

    /// Bumped whenever the raster or its stats change, for texture caching.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(super) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(super) fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub(super) fn mark_pending(&mut self) {
        self.stats = StatsState::Pending;
    }

    pub(super) fn store(&mut self, raster: Option<Arc<GeoRaster>>, stats: RasterStats) {
        self.raster = raster;
        self.stats = StatsState::Ready(stats);
        self.revision += 1;
    }
}
