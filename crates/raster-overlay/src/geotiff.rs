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

//! GeoTIFF decoding.
//!
//! Reads the first sample of every pixel as `f64` together with the affine
//! georeference. Nodata samples (GDAL nodata tag) are stored as NaN so every
//! consumer can treat "not finite" as "no value".

use std::io::{Cursor, Read, Seek};

use log::debug;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use crate::{GeoBounds, RasterError, RasterStats};

const EARTH_RADIUS_M: f64 = 6_378_137.0;

// GeoKey ids and values from the GeoTIFF 1.0 key directory
const GT_MODEL_TYPE_KEY: u16 = 1024;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const MODEL_TYPE_PROJECTED: u16 = 1;
const WEB_MERCATOR_CODES: [u16; 2] = [3857, 3785];

/// Affine pixel-to-model transform without rotation terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X of the upper-left corner of the upper-left pixel
    pub origin_x: f64,
    /// Y of the upper-left corner of the upper-left pixel
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Typically negative (rows go south)
    pub pixel_height: f64,
}

impl GeoTransform {
    #[must_use]
    pub fn pixel_to_model(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width,
            self.origin_y + row * self.pixel_height,
        )
    }

    /// Build from ModelTiepoint (I,J,K,X,Y,Z) and ModelPixelScale (Sx,Sy,Sz).
    fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        Some(Self {
            origin_x: x - i * sx,
            origin_y: y + j * sy,
            pixel_width: sx,
            pixel_height: -sy,
        })
    }

    /// Build from a row-major 4x4 ModelTransformation matrix.
    fn from_matrix(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }
        if matrix[1] != 0.0 || matrix[4] != 0.0 {
            debug!("Ignoring rotation terms in ModelTransformation");
        }
        Some(Self {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: matrix[5],
        })
    }
}

/// Coordinate reference system of the model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// Longitude/latitude degrees (WGS84 and friends).
    #[default]
    Geographic,
    /// Spherical Web Mercator meters (EPSG:3857).
    WebMercator,
}

impl Crs {
    /// Convert a model-space point to (lat, lon) degrees.
    #[must_use]
    pub fn to_lat_lon(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Crs::Geographic => (y, x),
            Crs::WebMercator => {
                let lon = (x / EARTH_RADIUS_M).to_degrees();
                let lat = (y / EARTH_RADIUS_M).sinh().atan().to_degrees();
                (lat, lon)
            }
        }
    }
}

/// A decoded single-band raster with its georeference.
#[derive(Debug, Clone)]
pub struct GeoRaster {
    width: u32,
    height: u32,
    samples: Vec<f64>,
    transform: GeoTransform,
    crs: Crs,
    nodata: Option<f64>,
}

impl GeoRaster {
    /// Build a raster from parts; `samples` is row-major, one per pixel.
    pub fn new(
        width: u32,
        height: u32,
        samples: Vec<f64>,
        transform: GeoTransform,
        crs: Crs,
    ) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize;
        if expected == 0 || samples.len() < expected {
            return Err(RasterError::Truncated {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
            transform,
            crs,
            nodata: None,
        })
    }

    /// Decode GeoTIFF bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        let mut decoder = Decoder::new(Cursor::new(bytes))?.with_limits(Limits::unlimited());
        let (width, height) = decoder.dimensions()?;

        let transform = read_transform(&mut decoder)?;
        let crs = read_crs(&mut decoder)?;
        let nodata = read_nodata(&mut decoder);

        let image = decoder.read_image()?;
        let values = decoding_result_to_f64(image);

        let pixels = width as usize * height as usize;
        if pixels == 0 || values.len() < pixels {
            return Err(RasterError::Truncated {
                expected: pixels,
                actual: values.len(),
            });
        }

        // Interleaved samples: keep band 0 only
        let samples_per_pixel = values.len() / pixels;
        let samples: Vec<f64> = values
            .into_iter()
            .step_by(samples_per_pixel)
            .take(pixels)
            .map(|v| match nodata {
                Some(nd) if v == nd => f64::NAN,
                _ => v,
            })
            .collect();

        debug!(
            "Decoded {}x{} raster ({} samples/pixel, nodata {:?}, {:?})",
            width, height, samples_per_pixel, nodata, crs
        );

        Ok(Self {
            width,
            height,
            samples,
            transform,
            crs,
            nodata,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major band-0 samples; nodata is NaN.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    #[must_use]
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    #[must_use]
    pub fn crs(&self) -> Crs {
        self.crs
    }

    #[must_use]
    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    #[must_use]
    pub fn value_at(&self, col: u32, row: u32) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.samples
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Latitude of a (fractional) row edge; row 0 is the top edge.
    ///
    /// Rows are linear in model space, which for Web Mercator rasters is not
    /// linear in latitude.
    #[must_use]
    pub fn latitude_at_row(&self, row: f64) -> f64 {
        let (x, y) = self.transform.pixel_to_model(0.0, row);
        self.crs.to_lat_lon(x, y).0
    }

    /// Geographic extent of the raster.
    #[must_use]
    pub fn bounds(&self) -> GeoBounds {
        let (x0, y0) = self.transform.pixel_to_model(0.0, 0.0);
        let (x1, y1) = self
            .transform
            .pixel_to_model(f64::from(self.width), f64::from(self.height));
        GeoBounds::from_corners(self.crs.to_lat_lon(x0, y0), self.crs.to_lat_lon(x1, y1))
    }

    /// Min/max over the finite samples.
    #[must_use]
    pub fn stats(&self) -> RasterStats {
        RasterStats::from_samples(self.samples.iter().copied())
    }
}

fn find_f64_vec<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> Result<Option<Vec<f64>>, RasterError> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform, RasterError> {
    if let Some(matrix) = find_f64_vec(decoder, Tag::ModelTransformationTag)? {
        if let Some(transform) = GeoTransform::from_matrix(&matrix) {
            return Ok(transform);
        }
    }

    let tiepoint = find_f64_vec(decoder, Tag::ModelTiepointTag)?;
    let scale = find_f64_vec(decoder, Tag::ModelPixelScaleTag)?;
    match (tiepoint, scale) {
        (Some(tiepoint), Some(scale)) => {
            GeoTransform::from_tiepoint(&tiepoint, &scale).ok_or(RasterError::MissingGeoreference)
        }
        _ => Err(RasterError::MissingGeoreference),
    }
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Crs, RasterError> {
    let Some(value) = decoder.find_tag(Tag::GeoKeyDirectoryTag)? else {
        return Ok(Crs::Geographic);
    };
    let keys = value.into_u16_vec()?;
    crs_from_geokeys(&keys)
}

/// Interpret a GeoKeyDirectory: header of 4 shorts, then 4 shorts per key.
fn crs_from_geokeys(keys: &[u16]) -> Result<Crs, RasterError> {
    let mut model_type = None;
    let mut projected_cs = None;

    for entry in keys.chunks_exact(4).skip(1) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        // Only inline (location 0) values matter for these keys
        if location != 0 {
            continue;
        }
        match key_id {
            GT_MODEL_TYPE_KEY => model_type = Some(value),
            PROJECTED_CS_TYPE_KEY => projected_cs = Some(value),
            _ => {}
        }
    }

    if model_type != Some(MODEL_TYPE_PROJECTED) {
        return Ok(Crs::Geographic);
    }
    match projected_cs {
        Some(code) if WEB_MERCATOR_CODES.contains(&code) => Ok(Crs::WebMercator),
        Some(code) => Err(RasterError::UnsupportedCrs(code)),
        None => Err(RasterError::UnsupportedCrs(0)),
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    text.trim_matches(char::from(0)).trim().parse().ok()
}

fn decoding_result_to_f64(data: DecodingResult) -> Vec<f64> {
    match data {
        DecodingResult::U8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F64(values) => values,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    /// Encode a float GeoTIFF anchored at (lat, lon) with square pixels.
    pub(crate) fn encode_geotiff(
        width: u32,
        height: u32,
        data: &[f32],
        origin: (f64, f64),
        pixel: f64,
        nodata: Option<&str>,
    ) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            let mut image = encoder
                .new_image::<colortype::Gray32Float>(width, height)
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[pixel, pixel, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(
                    Tag::ModelTiepointTag,
                    &[0.0, 0.0, 0.0, origin.1, origin.0, 0.0][..],
                )
                .unwrap();
            if let Some(nodata) = nodata {
                image.encoder().write_tag(Tag::GdalNodata, nodata).unwrap();
            }
            image.write_data(data).unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_decode_samples_and_bounds() {
        let data = [2.0, 5.0, -1.0, f32::NAN, 9.0, 4.0];
        let bytes = encode_geotiff(3, 2, &data, (-6.0, 107.0), 0.5, None);

        let raster = GeoRaster::decode(&bytes).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.value_at(1, 0), Some(5.0));
        assert!(raster.value_at(0, 1).unwrap().is_nan());
        assert_eq!(raster.value_at(3, 0), None);

        let bounds = raster.bounds();
        assert_eq!(bounds, GeoBounds::new(-7.0, 107.0, -6.0, 108.5));
        assert_eq!(raster.latitude_at_row(0.0), -6.0);
        assert_eq!(raster.latitude_at_row(1.0), -6.5);
    }

    #[test]
    fn test_stats_skip_nan() {
        let data = [2.0, 5.0, -1.0, f32::NAN, 9.0];
        let bytes = encode_geotiff(5, 1, &data, (0.0, 0.0), 1.0, None);
        let stats = GeoRaster::decode(&bytes).unwrap().stats();
        assert_eq!(stats.min, Some(-1.0));
        assert_eq!(stats.max, Some(9.0));
    }

    #[test]
    fn test_nodata_becomes_nan() {
        let data = [-9999.0, 3.0, 7.0, -9999.0];
        let bytes = encode_geotiff(2, 2, &data, (0.0, 0.0), 1.0, Some("-9999"));
        let raster = GeoRaster::decode(&bytes).unwrap();
        assert_eq!(raster.nodata(), Some(-9999.0));
        assert!(raster.value_at(0, 0).unwrap().is_nan());
        assert_eq!(raster.stats().min, Some(3.0));
        assert_eq!(raster.stats().max, Some(7.0));
    }

    #[test]
    fn test_missing_georeference() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            encoder
                .write_image::<colortype::Gray8>(2, 1, &[1, 2])
                .unwrap();
        }
        let err = GeoRaster::decode(&buf.into_inner()).unwrap_err();
        assert!(matches!(err, RasterError::MissingGeoreference));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = GeoRaster::decode(b"<html>404 Not Found</html>").unwrap_err();
        assert!(matches!(err, RasterError::Tiff(_)));
    }

    #[test]
    fn test_geokeys_web_mercator() {
        let keys = [1, 1, 0, 2, GT_MODEL_TYPE_KEY, 0, 1, 1, PROJECTED_CS_TYPE_KEY, 0, 1, 3857];
        assert_eq!(crs_from_geokeys(&keys).unwrap(), Crs::WebMercator);

        let utm = [1, 1, 0, 2, GT_MODEL_TYPE_KEY, 0, 1, 1, PROJECTED_CS_TYPE_KEY, 0, 1, 32748];
        assert!(matches!(
            crs_from_geokeys(&utm),
            Err(RasterError::UnsupportedCrs(32748))
        ));

        let geographic = [1, 1, 0, 1, GT_MODEL_TYPE_KEY, 0, 1, 2];
        assert_eq!(crs_from_geokeys(&geographic).unwrap(), Crs::Geographic);
    }

    #[test]
    fn test_web_mercator_to_lat_lon() {
        let (lat, lon) = Crs::WebMercator.to_lat_lon(0.0, 0.0);
        assert!(lat.abs() < 1e-9 && lon.abs() < 1e-9);

        let (_, lon) = Crs::WebMercator.to_lat_lon(20_037_508.342_789_244, 0.0);
        assert!((lon - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_new_rejects_short_samples() {
        let transform = GeoTransform {
            origin_x: 0.0,
            origin_y: 0.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        };
        let err = GeoRaster::new(2, 2, vec![1.0], transform, Crs::Geographic).unwrap_err();
        assert!(matches!(err, RasterError::Truncated { expected: 4, actual: 1 }));
    }
}
