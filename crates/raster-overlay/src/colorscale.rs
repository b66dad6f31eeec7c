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

//! Named color scales.
//!
//! Each scale is a list of `(position, color)` stops with positions in
//! `0.0..=1.0`. Scales drive both raster colorization and legend gradients.

/// RGB color.
pub type Rgb = [u8; 3];

/// A named gradient of color stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub name: &'static str,
    pub stops: &'static [(f32, Rgb)],
}

/// One legend gradient stop with an integer percentage offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientStop {
    pub offset_percent: u8,
    pub color: Rgb,
}

/// Three-stop gradient used when a scale name is unknown.
pub const FALLBACK: ColorScale = ColorScale {
    name: "fallback",
    stops: &[
        (0.0, [0x44, 0x01, 0x54]),
        (0.5, [0x21, 0x91, 0x8c]),
        (1.0, [0xfd, 0xe7, 0x25]),
    ],
};

const TERRAIN: ColorScale = ColorScale {
    name: "terrain",
    stops: &[
        (0.0, [0x33, 0x33, 0x99]),
        (0.15, [0x00, 0x99, 0xff]),
        (0.25, [0x00, 0xcc, 0x66]),
        (0.5, [0xff, 0xff, 0x99]),
        (0.75, [0x80, 0x5c, 0x54]),
        (1.0, [0xff, 0xff, 0xff]),
    ],
};

const RAINBOW: ColorScale = ColorScale {
    name: "rainbow",
    stops: &[
        (0.0, [0x96, 0x00, 0x5a]),
        (0.125, [0x00, 0x00, 0xc8]),
        (0.25, [0x00, 0x19, 0xff]),
        (0.375, [0x00, 0x98, 0xff]),
        (0.5, [0x2c, 0xff, 0x96]),
        (0.625, [0x97, 0xff, 0x00]),
        (0.75, [0xff, 0xea, 0x00]),
        (0.875, [0xff, 0x6f, 0x00]),
        (1.0, [0xff, 0x00, 0x00]),
    ],
};

const JET: ColorScale = ColorScale {
    name: "jet",
    stops: &[
        (0.0, [0x00, 0x00, 0x83]),
        (0.125, [0x00, 0x3c, 0xaa]),
        (0.375, [0x05, 0xff, 0xff]),
        (0.625, [0xff, 0xff, 0x00]),
        (0.875, [0xfa, 0x00, 0x00]),
        (1.0, [0x80, 0x00, 0x00]),
    ],
};

const GREENGOLD: ColorScale = ColorScale {
    name: "greengold",
    stops: &[
        (0.0, [0x14, 0x53, 0x2d]),
        (0.35, [0x3f, 0x8f, 0x3a]),
        (0.65, [0x9c, 0xbf, 0x3e]),
        (1.0, [0xf0, 0xc8, 0x28]),
    ],
};

const VIRIDIS: ColorScale = ColorScale {
    name: "viridis",
    stops: &[
        (0.0, [0x44, 0x01, 0x54]),
        (0.13, [0x48, 0x27, 0x77]),
        (0.25, [0x3f, 0x4a, 0x8a]),
        (0.38, [0x31, 0x67, 0x8e]),
        (0.5, [0x26, 0x83, 0x8f]),
        (0.63, [0x1f, 0x9d, 0x8a]),
        (0.75, [0x6c, 0xce, 0x5a]),
        (0.88, [0xb6, 0xde, 0x2b]),
        (1.0, [0xfe, 0xe8, 0x25]),
    ],
};

const BLUES: ColorScale = ColorScale {
    name: "blues",
    stops: &[
        (0.0, [0xf7, 0xfb, 0xff]),
        (0.25, [0xc6, 0xdb, 0xef]),
        (0.5, [0x6b, 0xae, 0xd6]),
        (0.75, [0x21, 0x71, 0xb5]),
        (1.0, [0x08, 0x30, 0x6b]),
    ],
};

static SCALES: &[ColorScale] = &[TERRAIN, RAINBOW, JET, GREENGOLD, VIRIDIS, BLUES];

/// Find a scale by name (case-insensitive).
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ColorScale> {
    SCALES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Find a scale by name, or the three-stop fallback.
#[must_use]
pub fn lookup_or_fallback(name: &str) -> &'static ColorScale {
    lookup(name).unwrap_or(&FALLBACK)
}

/// Names of all registered scales.
pub fn names() -> impl Iterator<Item = &'static str> {
    SCALES.iter().map(|s| s.name)
}

/// Legend gradient stops for a scale name.
///
/// Positions become rounded percentages. Unknown names, or a scale without
/// stops, produce the fallback gradient.
#[must_use]
pub fn gradient_stops(name: &str) -> Vec<GradientStop> {
    let scale = match lookup(name) {
        Some(scale) if !scale.stops.is_empty() => scale,
        _ => &FALLBACK,
    };
    scale.gradient_stops()
}

impl ColorScale {
    #[must_use]
    pub fn gradient_stops(&self) -> Vec<GradientStop> {
        self.stops
            .iter()
            .map(|&(pos, color)| GradientStop {
                offset_percent: (pos.clamp(0.0, 1.0) * 100.0).round() as u8,
                color,
            })
            .collect()
    }

    /// Color at normalized position `t` (clamped to 0..1), linearly
    /// interpolated between the two surrounding stops.
    #[must_use]
    pub fn sample(&self, t: f64) -> Rgb {
        let Some(&(_, first)) = self.stops.first() else {
            return [0, 0, 0];
        };
        let t = (if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }) as f32;

        for pair in self.stops.windows(2) {
            let (p1, c1) = pair[0];
            let (p2, c2) = pair[1];

            if t >= p1 && t <= p2 {
                let span = p2 - p1;
                let f = if span > 0.0 { (t - p1) / span } else { 0.0 };
                return [
                    lerp(c1[0], c2[0], f),
                    lerp(c1[1], c2[1], f),
                    lerp(c1[2], c2[2], f),
                ];
            }
        }

        // Outside the stop range: clamp to the nearest end
        if t < self.stops[0].0 {
            first
        } else {
            self.stops[self.stops.len() - 1].1
        }
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
}

/// Format a color as `#rrggbb`.
#[must_use]
pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_layer_scales_registered() {
        for name in ["terrain", "rainbow", "jet", "greengold", "viridis", "blues"] {
            assert!(lookup(name).is_some(), "missing scale {name}");
        }
        assert_eq!(names().count(), 6);
    }

    #[test]
    fn test_gradient_stops_percentages() {
        let stops = gradient_stops("jet");
        let offsets: Vec<u8> = stops.iter().map(|s| s.offset_percent).collect();
        // 0.125 and 0.375 round half away from zero
        assert_eq!(offsets, vec![0, 13, 38, 63, 88, 100]);
        assert_eq!(to_hex(stops[0].color), "#000083");
    }

    #[test]
    fn test_unknown_scale_uses_fallback() {
        let stops = gradient_stops("no-such-scale");
        assert_eq!(
            stops,
            vec![
                GradientStop { offset_percent: 0, color: [0x44, 0x01, 0x54] },
                GradientStop { offset_percent: 50, color: [0x21, 0x91, 0x8c] },
                GradientStop { offset_percent: 100, color: [0xfd, 0xe7, 0x25] },
            ]
        );
        assert_eq!(lookup_or_fallback("nope").name, "fallback");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("Viridis").map(|s| s.name), Some("viridis"));
    }

    #[test]
    fn test_sample_endpoints_and_midpoint() {
        assert_eq!(FALLBACK.sample(0.0), [0x44, 0x01, 0x54]);
        assert_eq!(FALLBACK.sample(1.0), [0xfd, 0xe7, 0x25]);
        assert_eq!(FALLBACK.sample(0.5), [0x21, 0x91, 0x8c]);
        // Clamped outside the range
        assert_eq!(FALLBACK.sample(-3.0), FALLBACK.sample(0.0));
        assert_eq!(FALLBACK.sample(7.0), FALLBACK.sample(1.0));
    }

    #[test]
    fn test_sample_interpolates() {
        let scale = ColorScale {
            name: "bw",
            stops: &[(0.0, [0, 0, 0]), (1.0, [200, 100, 50])],
        };
        assert_eq!(scale.sample(0.5), [100, 50, 25]);
    }
}
