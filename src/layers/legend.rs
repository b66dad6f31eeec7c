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

//! Legend model and the per-layer legend registry.

use raster_overlay::{colorscale, GradientStop, RasterStats};

/// Everything a legend widget shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub id: String,
    pub title: String,
    pub stops: Vec<GradientStop>,
    pub min_label: String,
    pub max_label: String,
    pub unit: String,
}

impl Legend {
    /// Build a legend from a color scale name and (possibly unknown) stats.
    pub fn build(id: &str, title: &str, color_scale: &str, stats: RasterStats, unit: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            stops: colorscale::gradient_stops(color_scale),
            min_label: format_bound(stats.min, "min"),
            max_label: format_bound(stats.max, "max"),
            unit: unit.to_string(),
        }
    }
}

/// Two decimals at most, trailing zeros dropped; `placeholder` when absent.
pub fn format_bound(value: Option<f64>, placeholder: &str) -> String {
    let Some(v) = value else {
        return placeholder.to_string();
    };

    let text = format!("{v:.2}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };

    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Ordered legends, at most one per layer id.
///
/// Display order is insertion order; the bottom-right stack grows upward.
#[derive(Debug, Default, Clone)]
pub struct LegendStack {
    legends: Vec<Legend>,
}

impl LegendStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a legend, replacing (and moving to the end) any legend with the same id.
    pub fn make_legend(&mut self, legend: Legend) {
        self.remove_legend(&legend.id);
        self.legends.push(legend);
    }

    /// Remove the legend for `id`. Returns false when none existed.
    pub fn remove_legend(&mut self, id: &str) -> bool {
        let before = self.legends.len();
        self.legends.retain(|l| l.id != id);
        self.legends.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Legend> {
        self.legends.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.legends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Legend> {
        self.legends.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.legends.iter().map(|l| l.id.as_str()).collect()
    }
}
