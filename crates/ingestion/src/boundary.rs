//! Basin boundary polygon loader.
//!
//! Reads the watershed outline from GeoJSON or an ESRI shapefile,
//! tolerating Latin-1 encoded text, and brings coordinates to WGS84
//! lon/lat for display.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value as GeoValue};
use landcover_common::crs::Datum;
use landcover_common::{BoundingBox, CrsCode};
use serde_json::{Map as JsonMap, Value as JsonValue};
use shapefile::{PolygonRing, Shape};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};
use crate::metadata::{detect_file_type, FileType};

/// A ring of `[lon, lat]` positions.
pub type Ring = Vec<[f64; 2]>;
/// Exterior ring followed by any holes.
pub type Polygon = Vec<Ring>;

/// Watershed outline in WGS84.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasinBoundary {
    polygons: Vec<Polygon>,
}

impl BasinBoundary {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Envelope of all positions, `None` when there are none.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.polygons
                .iter()
                .flatten()
                .flatten()
                .map(|[lon, lat]| (*lon, *lat)),
        )
    }

    /// One feature per polygon, ready for a map's GeoJSON layer.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .polygons
            .iter()
            .map(|polygon| {
                let rings = polygon
                    .iter()
                    .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
                    .collect();
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(GeoValue::Polygon(rings))),
                    id: None,
                    properties: None,
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Load the basin boundary and bring it to WGS84.
///
/// `.shp` files are read as ESRI shapefiles, with the source CRS taken from
/// the sibling `.prj`. Anything else is parsed as GeoJSON; a legacy `crs`
/// member naming an EPSG code sets the source CRS, otherwise coordinates are
/// taken as WGS84.
pub fn load_basin_boundary(path: &Path) -> Result<BasinBoundary> {
    let (mut polygons, source_crs) = match detect_file_type(path) {
        FileType::Shapefile => read_shapefile(path)?,
        _ => read_geojson(path)?,
    };

    if source_crs != CrsCode::Epsg4326 {
        for position in polygons.iter_mut().flatten().flatten() {
            let (lon, lat) =
                projection::transform_point(source_crs, CrsCode::Epsg4326, position[0], position[1])
                    .map_err(|e| {
                        IngestionError::boundary(path, format!("reprojecting from {}: {}", source_crs, e))
                    })?;
            *position = [lon, lat];
        }
    }

    let boundary = BasinBoundary::new(polygons);
    info!(
        path = %path.display(),
        polygons = boundary.polygons().len(),
        source_crs = %source_crs,
        "Loaded basin boundary"
    );
    Ok(boundary)
}

fn read_geojson(path: &Path) -> Result<(Vec<Polygon>, CrsCode)> {
    let bytes = std::fs::read(path).map_err(|e| IngestionError::boundary(path, e.to_string()))?;
    let text = decode_text(&bytes);
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| IngestionError::boundary(path, e.to_string()))?;

    let source_crs = declared_crs(&geojson)
        .transpose()
        .map_err(|reason| IngestionError::boundary(path, reason))?
        .unwrap_or(CrsCode::Epsg4326);

    let mut polygons = Vec::new();
    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_polygons(&geometry.value, &mut polygons);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_polygons(&geometry.value, &mut polygons);
            }
        }
        GeoJson::Geometry(geometry) => collect_polygons(&geometry.value, &mut polygons),
    }
    Ok((polygons, source_crs))
}

/// Polygon shapes from a `.shp`. Attribute records in the `.dbf` are not
/// read, so their text encoding never matters.
fn read_shapefile(path: &Path) -> Result<(Vec<Polygon>, CrsCode)> {
    let shapes =
        shapefile::read_shapes(path).map_err(|e| IngestionError::boundary(path, e.to_string()))?;

    let mut polygons = Vec::new();
    for shape in &shapes {
        match shape {
            Shape::Polygon(polygon) => collect_rings(polygon.rings(), |p| [p.x, p.y], &mut polygons),
            Shape::PolygonM(polygon) => collect_rings(polygon.rings(), |p| [p.x, p.y], &mut polygons),
            Shape::PolygonZ(polygon) => collect_rings(polygon.rings(), |p| [p.x, p.y], &mut polygons),
            _ => debug!("Skipping non-polygon boundary shape"),
        }
    }

    let prj = path.with_extension("prj");
    let source_crs = if prj.is_file() {
        let bytes = std::fs::read(&prj).map_err(|e| IngestionError::boundary(&prj, e.to_string()))?;
        crs_from_wkt(&decode_text(&bytes)).map_err(|reason| IngestionError::boundary(&prj, reason))?
    } else {
        warn!(path = %path.display(), "Shapefile has no .prj, assuming WGS84");
        CrsCode::Epsg4326
    };
    Ok((polygons, source_crs))
}

/// Outer rings start a new polygon; inner rings are holes of the last one.
fn collect_rings<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> [f64; 2], out: &mut Vec<Polygon>) {
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => out.push(vec![points.iter().map(&xy).collect()]),
            PolygonRing::Inner(points) => {
                let hole: Ring = points.iter().map(&xy).collect();
                match out.last_mut() {
                    Some(polygon) => polygon.push(hole),
                    None => out.push(vec![hole]),
                }
            }
        }
    }
}

/// CRS described by a `.prj` WKT string.
///
/// A trailing top-level `AUTHORITY["EPSG","<code>"]` (or WKT2 `ID`) wins.
/// ESRI-flavoured WKT carries no authority, so UTM zones and the
/// SIRGAS 2000 / WGS84 datums are recognized by name.
fn crs_from_wkt(wkt: &str) -> std::result::Result<CrsCode, String> {
    let upper = wkt.trim().to_ascii_uppercase();
    if let Some(crs) = top_level_epsg(&upper).and_then(|code| CrsCode::from_epsg(code).ok()) {
        return Ok(crs);
    }

    let datum = if upper.contains("SIRGAS") && upper.contains("2000") {
        Datum::Sirgas2000
    } else if upper.contains("WGS") && upper.contains("84") {
        Datum::Wgs84
    } else {
        return Err(format!("unrecognized datum in .prj: {}", first_chars(wkt, 60)));
    };

    if upper.starts_with("PROJCS") || upper.starts_with("PROJCRS") {
        if let Some((zone, south)) = utm_zone(&upper) {
            let crs = CrsCode::Utm { zone, south, datum };
            return CrsCode::from_epsg(crs.epsg()).map_err(|e| e.to_string());
        }
        if upper.contains("MERCATOR_AUXILIARY_SPHERE") || upper.contains("PSEUDO-MERCATOR") {
            return Ok(CrsCode::Epsg3857);
        }
        return Err(format!("unsupported projection in .prj: {}", first_chars(wkt, 60)));
    }

    Ok(match datum {
        Datum::Sirgas2000 => CrsCode::Epsg4674,
        Datum::Wgs84 => CrsCode::Epsg4326,
    })
}

/// EPSG code of an authority sitting directly inside the outermost WKT node.
fn top_level_epsg(upper: &str) -> Option<u32> {
    let (head, tail) = upper.rsplit_once("\"EPSG\"")?;
    let depth = head.chars().fold(0i32, |depth, c| match c {
        '[' | '(' => depth + 1,
        ']' | ')' => depth - 1,
        _ => depth,
    });
    // PROJCS[ ... AUTHORITY[
    if depth != 2 {
        return None;
    }
    let tail = tail.trim_start_matches(|c: char| c == ',' || c == '"' || c.is_whitespace());
    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    tail[..digits].parse().ok()
}

/// `(zone, south)` from names like `UTM_Zone_22S` or `UTM zone 22S`.
fn utm_zone(upper: &str) -> Option<(u8, bool)> {
    let (_, tail) = upper.split_once("UTM")?;
    let (_, tail) = tail.split_once("ZONE")?;
    let tail = tail.trim_start_matches(|c: char| c == '_' || c == ' ');
    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
    let zone = tail[..digits].parse().ok()?;
    match tail[digits..].chars().next()? {
        'S' => Some((zone, true)),
        'N' => Some((zone, false)),
        _ => None,
    }
}

fn first_chars(text: &str, n: usize) -> String {
    text.trim().chars().take(n).collect()
}

/// UTF-8 if valid, otherwise Latin-1 (every byte maps to the same code point).
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.trim_start_matches('\u{feff}')),
        Err(_) => {
            debug!("Boundary is not UTF-8, decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// CRS named by a legacy `{"crs": {"type": "name", "properties": {"name": ...}}}` member.
fn declared_crs(geojson: &GeoJson) -> Option<std::result::Result<CrsCode, String>> {
    let members: Option<&JsonMap<String, JsonValue>> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
        GeoJson::Feature(feature) => feature.foreign_members.as_ref(),
        GeoJson::Geometry(geometry) => geometry.foreign_members.as_ref(),
    };
    let name = members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;
    Some(CrsCode::parse(name).map_err(|e| format!("unsupported crs {:?}: {}", name, e)))
}

fn collect_polygons(value: &GeoValue, out: &mut Vec<Polygon>) {
    match value {
        GeoValue::Polygon(rings) => out.push(to_polygon(rings)),
        GeoValue::MultiPolygon(polygons) => out.extend(polygons.iter().map(|rings| to_polygon(rings))),
        GeoValue::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_polygons(&geometry.value, out);
            }
        }
        other => debug!(kind = geometry_kind(other), "Skipping non-polygon boundary geometry"),
    }
}

fn geometry_kind(value: &GeoValue) -> &'static str {
    match value {
        GeoValue::Point(_) => "Point",
        GeoValue::MultiPoint(_) => "MultiPoint",
        GeoValue::LineString(_) => "LineString",
        GeoValue::MultiLineString(_) => "MultiLineString",
        GeoValue::Polygon(_) => "Polygon",
        GeoValue::MultiPolygon(_) => "MultiPolygon",
        GeoValue::GeometryCollection(_) => "GeometryCollection",
    }
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_fallback() {
        // "Várzea" with á as the single Latin-1 byte 0xE1
        let bytes = b"V\xe1rzea";
        assert_eq!(decode_text(bytes), "Várzea");
        assert_eq!(decode_text("Várzea".as_bytes()), "Várzea");
    }

    #[test]
    fn test_bounds_and_geojson() {
        let boundary = BasinBoundary::new(vec![vec![vec![
            [-53.5, -27.9],
            [-53.0, -27.9],
            [-53.0, -27.2],
            [-53.5, -27.9],
        ]]]);
        let bounds = boundary.bounds().unwrap();
        assert_eq!(bounds, BoundingBox::new(-53.5, -27.9, -53.0, -27.2));

        let fc = boundary.to_geojson();
        assert_eq!(fc.features.len(), 1);
        let json = GeoJson::FeatureCollection(fc).to_string();
        assert!(json.contains("\"Polygon\""));
    }

    const ESRI_SIRGAS_UTM_22S: &str = "PROJCS[\"SIRGAS_2000_UTM_Zone_22S\",GEOGCS[\"GCS_SIRGAS_2000\",\
        DATUM[\"D_SIRGAS_2000\",SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],\
        PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]],\
        PROJECTION[\"Transverse_Mercator\"],PARAMETER[\"Central_Meridian\",-51.0],\
        UNIT[\"Meter\",1.0]]";

    #[test]
    fn test_esri_prj_resolved_by_name() {
        assert_eq!(crs_from_wkt(ESRI_SIRGAS_UTM_22S).unwrap(), CrsCode::from_epsg(31982).unwrap());

        let wgs_north = "PROJCS[\"WGS_1984_UTM_Zone_33N\",GEOGCS[\"GCS_WGS_1984\"]]";
        assert_eq!(crs_from_wkt(wgs_north).unwrap(), CrsCode::from_epsg(32633).unwrap());

        let geographic = "GEOGCS[\"GCS_SIRGAS_2000\",DATUM[\"D_SIRGAS_2000\"]]";
        assert_eq!(crs_from_wkt(geographic).unwrap(), CrsCode::Epsg4674);
    }

    #[test]
    fn test_prj_top_level_authority_wins() {
        let wkt = "PROJCS[\"SIRGAS 2000 / UTM zone 23S\",GEOGCS[\"SIRGAS 2000\",\
            AUTHORITY[\"EPSG\",\"4674\"]],UNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]],\
            AUTHORITY[\"EPSG\",\"31983\"]]";
        assert_eq!(top_level_epsg(&wkt.to_ascii_uppercase()), Some(31983));
        assert_eq!(crs_from_wkt(wkt).unwrap(), CrsCode::from_epsg(31983).unwrap());

        // Only a nested unit authority: fall back to the name
        let nested = "PROJCS[\"SIRGAS 2000 / UTM zone 22S\",UNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]]]";
        assert_eq!(top_level_epsg(&nested.to_ascii_uppercase()), None);
        assert_eq!(crs_from_wkt(nested).unwrap(), CrsCode::from_epsg(31982).unwrap());
    }

    #[test]
    fn test_unknown_prj_rejected() {
        assert!(crs_from_wkt("LOCAL_CS[\"engineering\"]").is_err());
        assert!(crs_from_wkt("PROJCS[\"SIRGAS_2000_Polyconic\",GEOGCS[\"GCS_SIRGAS_2000\"]]").is_err());
    }

    #[test]
    fn test_empty_boundary_has_no_bounds() {
        assert!(BasinBoundary::default().bounds().is_none());
    }
}
