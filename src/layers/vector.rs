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

//! GeoJSON prediction layer.
//!
//! Geometries are flattened into drawable shapes once, at load time. Polygons
//! are triangulated up front so the map plugin only has to project vertices.

use geo::{BoundingRect, Geometry, GeometryCollection, Polygon, TriangulateEarcut};
use geojson::GeoJson;
use raster_overlay::GeoBounds;

use super::descriptor::{VectorDescriptor, VectorStyle};

/// `[lon, lat]`
pub type LonLat = [f64; 2];

#[derive(Debug, Clone, PartialEq)]
pub enum VectorShape {
    /// Polygon rings (exterior first) and its fill triangles
    Area {
        rings: Vec<Vec<LonLat>>,
        triangles: Vec<[LonLat; 3]>,
    },
    Line(Vec<LonLat>),
    Point(LonLat),
}

/// Parsed vector layer.
#[derive(Debug, Clone, Default)]
pub struct VectorLayer {
    shapes: Vec<VectorShape>,
    bounds: Option<GeoBounds>,
}

impl VectorLayer {
    /// Parse a GeoJSON document (FeatureCollection, Feature or bare Geometry).
    ///
    /// Features without geometry are skipped.
    pub fn from_geojson(text: &str) -> Result<Self, geojson::Error> {
        let geojson: GeoJson = text.parse()?;

        let raw: Vec<geojson::Geometry> = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
            GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
            GeoJson::Geometry(geometry) => vec![geometry],
        };

        let geometries = raw
            .into_iter()
            .map(Geometry::<f64>::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let collection = GeometryCollection(geometries);
        let bounds = collection
            .bounding_rect()
            .map(|rect| GeoBounds::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x));

        let mut shapes = Vec::new();
        for geometry in &collection {
            flatten(geometry, &mut shapes);
        }

        Ok(Self { shapes, bounds })
    }

    pub fn shapes(&self) -> &[VectorShape] {
        &self.shapes
    }

    /// Bounding box, absent for a layer without coordinates.
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn flatten(geometry: &Geometry<f64>, out: &mut Vec<VectorShape>) {
    match geometry {
        Geometry::Point(p) => out.push(VectorShape::Point([p.x(), p.y()])),
        Geometry::MultiPoint(mp) => {
            out.extend(mp.iter().map(|p| VectorShape::Point([p.x(), p.y()])));
        }
        Geometry::Line(line) => out.push(VectorShape::Line(vec![
            [line.start.x, line.start.y],
            [line.end.x, line.end.y],
        ])),
        Geometry::LineString(ls) => out.push(VectorShape::Line(ls.coords().map(|c| [c.x, c.y]).collect())),
        Geometry::MultiLineString(mls) => {
            for ls in mls {
                out.push(VectorShape::Line(ls.coords().map(|c| [c.x, c.y]).collect()));
            }
        }
        Geometry::Polygon(polygon) => out.push(area(polygon)),
        Geometry::MultiPolygon(mp) => out.extend(mp.iter().map(area)),
        Geometry::Rect(rect) => out.push(area(&rect.to_polygon())),
        Geometry::Triangle(triangle) => out.push(area(&triangle.to_polygon())),
        Geometry::GeometryCollection(gc) => {
            for inner in gc {
                flatten(inner, out);
            }
        }
    }
}

fn area(polygon: &Polygon<f64>) -> VectorShape {
    let rings = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect();

    let triangles = polygon
        .earcut_triangles()
        .into_iter()
        .map(|t| t.to_array().map(|c| [c.x, c.y]))
        .collect();

    VectorShape::Area { rings, triangles }
}

/// Load state of the vector layer.
#[derive(Debug)]
pub enum VectorState {
    Loading,
    Ready(VectorLayer),
    Failed,
}

/// The vector layer bound to its panel toggle.
#[derive(Debug)]
pub struct VectorBinding {
    descriptor: VectorDescriptor,
    style: VectorStyle,
    has_toggle: bool,
    visible: bool,
    state: VectorState,
}

impl VectorBinding {
    pub fn new(descriptor: VectorDescriptor, has_toggle: bool) -> Self {
        Self {
            descriptor,
            style: VectorStyle::default(),
            has_toggle,
            visible: false,
            state: VectorState::Loading,
        }
    }

    pub fn descriptor(&self) -> &VectorDescriptor {
        &self.descriptor
    }

    pub fn style(&self) -> VectorStyle {
        self.style
    }

    pub fn has_toggle(&self) -> bool {
        self.has_toggle
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> &VectorState {
        &self.state
    }

    /// The parsed layer, once loaded.
    pub fn layer(&self) -> Option<&VectorLayer> {
        match &self.state {
            VectorState::Ready(layer) => Some(layer),
            VectorState::Loading | VectorState::Failed => None,
        }
    }

    /// Whether the toggle does anything.
    pub fn is_interactive(&self) -> bool {
        self.has_toggle && self.layer().is_some()
    }

    pub(super) fn set_state(&mut self, state: VectorState) {
        self.state = state;
    }

    pub(super) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"kelas": "tinggi"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[107.0, -7.0], [108.0, -7.0], [108.0, -6.0], [107.0, -6.0], [107.0, -7.0]]]
                }
            },
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_polygon_is_triangulated() {
        let layer = VectorLayer::from_geojson(SQUARE).unwrap();
        assert_eq!(layer.shapes().len(), 1);

        let VectorShape::Area { rings, triangles } = &layer.shapes()[0] else {
            panic!("expected an area");
        };
        assert_eq!(rings.len(), 1);
        assert_eq!(triangles.len(), 2);

        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds, GeoBounds::new(-7.0, 107.0, -6.0, 108.0));
        assert!(bounds.is_valid());
    }

    #[test]
    fn test_empty_collection_has_no_bounds() {
        let layer = VectorLayer::from_geojson(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(layer.is_empty());
        assert!(layer.bounds().is_none());
    }

    #[test]
    fn test_mixed_geometries() {
        let text = r#"{
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [107.6, -6.9]},
                {"type": "LineString", "coordinates": [[107.0, -7.0], [107.5, -6.5]]},
                {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[2, 2], [3, 2], [3, 3], [2, 2]]]
                ]}
            ]
        }"#;
        let layer = VectorLayer::from_geojson(text).unwrap();
        assert_eq!(layer.shapes().len(), 4);
        assert!(matches!(layer.shapes()[0], VectorShape::Point([lon, lat]) if lon == 107.6 && lat == -6.9));
        assert!(matches!(&layer.shapes()[1], VectorShape::Line(points) if points.len() == 2));
    }

    #[test]
    fn test_invalid_document() {
        assert!(VectorLayer::from_geojson("{not json").is_err());
        assert!(VectorLayer::from_geojson(r#"{"type": "Nope"}"#).is_err());
    }

    #[test]
    fn test_binding_interactive_only_when_loaded() {
        let mut binding = VectorBinding::new(VectorDescriptor::default(), true);
        assert!(!binding.is_interactive());

        binding.set_state(VectorState::Failed);
        assert!(!binding.is_interactive());

        binding.set_state(VectorState::Ready(VectorLayer::default()));
        assert!(binding.is_interactive());

        let unbound = VectorBinding::new(VectorDescriptor::default(), false);
        assert!(!unbound.is_interactive());
    }
}
