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

//! Min/max statistics over raster samples.

/// Value range of a raster.
///
/// Both bounds are `None` when the range is unknown: the raster could not be
/// loaded, or it holds no finite sample at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RasterStats {
    /// The "unknown" sentinel used when statistics cannot be computed.
    pub const UNKNOWN: Self = Self {
        min: None,
        max: None,
    };

    /// Scan samples and keep the smallest and largest finite value.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in samples {
            if v.is_finite() {
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
        }

        if min > max {
            return Self::UNKNOWN;
        }

        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    /// Color mapping domain; 0..1 when the range is unknown.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        match (self.min, self.max) {
            (Some(min), Some(max)) => (min, max),
            _ => (0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_excluded() {
        let stats = RasterStats::from_samples([2.0, 5.0, -1.0, f64::NAN, 9.0]);
        assert_eq!(stats.min, Some(-1.0));
        assert_eq!(stats.max, Some(9.0));
    }

    #[test]
    fn test_infinities_excluded() {
        let stats = RasterStats::from_samples([f64::INFINITY, 3.5, f64::NEG_INFINITY]);
        assert_eq!(stats.min, Some(3.5));
        assert_eq!(stats.max, Some(3.5));
    }

    #[test]
    fn test_no_finite_samples_is_unknown() {
        let stats = RasterStats::from_samples([f64::NAN, f64::NAN]);
        assert_eq!(stats, RasterStats::UNKNOWN);
        assert!(!stats.is_known());

        let empty = RasterStats::from_samples(std::iter::empty());
        assert_eq!(empty, RasterStats::UNKNOWN);
    }

    #[test]
    fn test_domain_fallback() {
        assert_eq!(RasterStats::UNKNOWN.domain(), (0.0, 1.0));
        let stats = RasterStats::from_samples([10.0, 20.0]);
        assert_eq!(stats.domain(), (10.0, 20.0));
    }
}
