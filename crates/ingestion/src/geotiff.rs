//! Classified GeoTIFF reader.
//!
//! Decodes single-band integer rasters and the GeoTIFF tags needed to place
//! them on a map:
//! - ModelPixelScale / ModelTiepoint: pixel size and raster origin
//! - GeoKeyDirectory: EPSG code of the raster CRS
//! - GDAL_NODATA: the no-data sentinel, stored as ASCII

use landcover_common::{BoundingBox, CrsCode};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::{debug, warn};

use crate::error::{IngestionError, Result};

/// TIFF tag codes of the GeoTIFF and GDAL extensions.
const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const MODEL_TIEPOINT_TAG: u16 = 33922;
const GEO_KEY_DIRECTORY_TAG: u16 = 34735;
const GDAL_NODATA_TAG: u16 = 42113;

/// GeoKey ids from the GeoTIFF 1.0 key directory.
const GT_RASTER_TYPE_GEO_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u32 = 3072;

/// GTRasterTypeGeoKey value for point-registered rasters.
const RASTER_PIXEL_IS_POINT: u32 = 2;

/// A decoded class-id raster with its georeferencing.
#[derive(Debug, Clone)]
pub struct ClassifiedRaster {
    pub width: usize,
    pub height: usize,
    /// Class ids in row-major order, top row first
    pub values: Vec<i32>,
    /// No-data value declared by the file, if any
    pub nodata: Option<i32>,
    pub crs: CrsCode,
    /// Extent in native CRS units
    pub bounds: BoundingBox,
}

impl ClassifiedRaster {
    /// Declared no-data value, or 255 when the file declares none.
    pub fn nodata_or_default(&self) -> i32 {
        self.nodata.unwrap_or(255)
    }
}

/// Read a classified raster from a GeoTIFF file.
pub fn read_classified_raster(path: &Path) -> Result<ClassifiedRaster> {
    let file = File::open(path).map_err(|e| IngestionError::file_read(path, e))?;
    let tiff_err = |source| IngestionError::TiffDecode {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = Decoder::new(BufReader::new(file)).map_err(tiff_err)?;
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let (width, height) = (width as usize, height as usize);

    match decoder.colortype().map_err(tiff_err)? {
        ColorType::Gray(_) => {}
        other => {
            return Err(IngestionError::unsupported_raster(
                path,
                format!("expected a single band, found {:?}", other),
            ))
        }
    }

    let geo_keys = match decoder.find_tag(geotiff_tag(GEO_KEY_DIRECTORY_TAG)).map_err(tiff_err)? {
        Some(value) => value.into_u32_vec().map_err(tiff_err)?,
        None => Vec::new(),
    };
    let crs = crs_from_geo_keys(&geo_keys)
        .map_err(|reason| IngestionError::unsupported_raster(path, reason))?;

    let scale = required_f64_tag(&mut decoder, geotiff_tag(MODEL_PIXEL_SCALE_TAG), "ModelPixelScale", path)?;
    let tiepoint = required_f64_tag(&mut decoder, geotiff_tag(MODEL_TIEPOINT_TAG), "ModelTiepoint", path)?;
    let point_registered = geo_key(&geo_keys, GT_RASTER_TYPE_GEO_KEY) == Some(RASTER_PIXEL_IS_POINT);
    let bounds = raster_bounds(width, height, &scale, &tiepoint, point_registered)
        .map_err(|reason| IngestionError::unsupported_raster(path, reason))?;

    let nodata = match decoder.find_tag(geotiff_tag(GDAL_NODATA_TAG)).map_err(tiff_err)? {
        Some(value) => parse_nodata(&value.into_string().map_err(tiff_err)?, path),
        None => None,
    };

    let image = decoder.read_image().map_err(tiff_err)?;
    let values = class_values(image).map_err(|reason| IngestionError::unsupported_raster(path, reason))?;

    if values.len() != width * height {
        return Err(IngestionError::unsupported_raster(
            path,
            format!(
                "expected {} samples for {}x{}, got {}",
                width * height,
                width,
                height,
                values.len()
            ),
        ));
    }

    debug!(
        path = %path.display(),
        width,
        height,
        crs = %crs,
        nodata = ?nodata,
        "Decoded classified raster"
    );

    Ok(ClassifiedRaster {
        width,
        height,
        values,
        nodata,
        crs,
        bounds,
    })
}

/// The decoder keys its directory by `Tag`, so codes must resolve to the same
/// variant it produced while reading.
fn geotiff_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

fn required_f64_tag<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
    name: &str,
    path: &Path,
) -> Result<Vec<f64>> {
    let value = decoder
        .find_tag(tag)
        .map_err(|source| IngestionError::TiffDecode {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| IngestionError::unsupported_raster(path, format!("missing {} tag", name)))?;
    value.into_f64_vec().map_err(|source| IngestionError::TiffDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Look up a key in a GeoKeyDirectory whose value is stored inline.
///
/// The directory is a 4-short header followed by entries of
/// (key id, TIFF tag location, count, value); location 0 means inline.
fn geo_key(keys: &[u32], id: u32) -> Option<u32> {
    keys.get(4..)?
        .chunks_exact(4)
        .find(|entry| entry[0] == id && entry[1] == 0)
        .map(|entry| entry[3])
}

/// Resolve the raster CRS, preferring the projected CS over the geographic one.
fn crs_from_geo_keys(keys: &[u32]) -> std::result::Result<CrsCode, String> {
    let code = geo_key(keys, PROJECTED_CS_TYPE_GEO_KEY).or_else(|| geo_key(keys, GEOGRAPHIC_TYPE_GEO_KEY));
    match code {
        Some(code) => CrsCode::from_epsg(code).map_err(|e| e.to_string()),
        None => Ok(CrsCode::Epsg4326),
    }
}

/// Raster extent from the pixel scale and the first tiepoint.
fn raster_bounds(
    width: usize,
    height: usize,
    scale: &[f64],
    tiepoint: &[f64],
    point_registered: bool,
) -> std::result::Result<BoundingBox, String> {
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err("malformed ModelPixelScale or ModelTiepoint".to_string());
    }
    let (sx, sy) = (scale[0], scale[1]);
    if !(sx > 0.0 && sy > 0.0) {
        return Err(format!("invalid pixel scale ({}, {})", sx, sy));
    }

    let (i, j) = (tiepoint[0], tiepoint[1]);
    let (x, y) = (tiepoint[3], tiepoint[4]);
    let mut min_x = x - i * sx;
    let mut max_y = y + j * sy;
    if point_registered {
        // Tiepoint names the pixel center; shift to its corner
        min_x -= sx / 2.0;
        max_y += sy / 2.0;
    }

    Ok(BoundingBox::new(
        min_x,
        max_y - height as f64 * sy,
        min_x + width as f64 * sx,
        max_y,
    ))
}

/// Parse GDAL_NODATA. Values that are not integral are ignored.
fn parse_nodata(raw: &str, path: &Path) -> Option<i32> {
    let text = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if let Ok(value) = text.parse::<i32>() {
        return Some(value);
    }
    match text.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 => {
            Some(value as i32)
        }
        _ => {
            warn!(path = %path.display(), nodata = text, "Ignoring non-integral no-data value");
            None
        }
    }
}

fn class_values(image: DecodingResult) -> std::result::Result<Vec<i32>, String> {
    Ok(match image {
        DecodingResult::U8(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I32(v) => v,
        DecodingResult::U32(v) => v
            .into_iter()
            .map(|x| i32::try_from(x).map_err(|_| format!("class id {} out of range", x)))
            .collect::<std::result::Result<_, _>>()?,
        DecodingResult::U64(v) => v
            .into_iter()
            .map(|x| i32::try_from(x).map_err(|_| format!("class id {} out of range", x)))
            .collect::<std::result::Result<_, _>>()?,
        DecodingResult::I64(v) => v
            .into_iter()
            .map(|x| i32::try_from(x).map_err(|_| format!("class id {} out of range", x)))
            .collect::<std::result::Result<_, _>>()?,
        _ => return Err("floating-point samples are not class ids".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_key_lookup() {
        // Header, then GTModelType=1, GTRasterType=1, ProjectedCSType=31982
        let keys = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 31982];
        assert_eq!(geo_key(&keys, PROJECTED_CS_TYPE_GEO_KEY), Some(31982));
        assert_eq!(geo_key(&keys, GEOGRAPHIC_TYPE_GEO_KEY), None);

        let crs = crs_from_geo_keys(&keys).unwrap();
        assert_eq!(crs.epsg(), 31982);
    }

    #[test]
    fn test_crs_defaults_to_wgs84() {
        assert_eq!(crs_from_geo_keys(&[]).unwrap(), CrsCode::Epsg4326);
        let geographic = [1, 1, 0, 1, 2048, 0, 1, 4674];
        assert_eq!(crs_from_geo_keys(&geographic).unwrap(), CrsCode::Epsg4674);
        let unsupported = [1, 1, 0, 1, 3072, 0, 1, 27700];
        assert!(crs_from_geo_keys(&unsupported).is_err());
    }

    #[test]
    fn test_bounds_from_tiepoint() {
        let bounds = raster_bounds(100, 50, &[30.0, 30.0, 0.0], &[0.0, 0.0, 0.0, 250_000.0, 6_960_000.0, 0.0], false)
            .unwrap();
        assert_eq!(bounds, BoundingBox::new(250_000.0, 6_958_500.0, 253_000.0, 6_960_000.0));

        let centered = raster_bounds(1, 1, &[10.0, 10.0, 0.0], &[0.0, 0.0, 0.0, 5.0, 5.0, 0.0], true).unwrap();
        assert_eq!(centered, BoundingBox::new(0.0, 0.0, 10.0, 10.0));

        assert!(raster_bounds(1, 1, &[0.0, 1.0], &[0.0; 6], false).is_err());
    }

    #[test]
    fn test_parse_nodata() {
        let path = Path::new("x.tif");
        assert_eq!(parse_nodata("255\0", path), Some(255));
        assert_eq!(parse_nodata(" -9999 ", path), Some(-9999));
        assert_eq!(parse_nodata("0.0", path), Some(0));
        assert_eq!(parse_nodata("nan", path), None);
        assert_eq!(parse_nodata("1.5", path), None);
    }

    #[test]
    fn test_float_samples_rejected() {
        assert!(class_values(DecodingResult::F32(vec![1.0])).is_err());
        assert_eq!(class_values(DecodingResult::U8(vec![0, 255])).unwrap(), vec![0, 255]);
        assert!(class_values(DecodingResult::U32(vec![u32::MAX])).is_err());
    }
}
