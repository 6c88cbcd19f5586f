//! Point and bounding-box transforms between supported CRS.
//!
//! Every transform goes through geographic WGS84 lon/lat as the pivot.

use landcover_common::{BoundingBox, CrsCode};
use thiserror::Error;

use crate::mercator;
use crate::transverse_mercator::TransverseMercator;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Coordinate ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Invalid bounding box: {0:?}")]
    InvalidBounds(BoundingBox),
}

/// A concrete projection for one CRS.
#[derive(Debug, Clone)]
pub enum Projection {
    Geographic,
    WebMercator,
    TransverseMercator(TransverseMercator),
}

impl Projection {
    pub fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Epsg4326 | CrsCode::Epsg4674 => Projection::Geographic,
            CrsCode::Epsg3857 => Projection::WebMercator,
            CrsCode::Utm { zone, south, .. } => {
                Projection::TransverseMercator(TransverseMercator::utm(zone, south))
            }
        }
    }

    /// Projected (x, y) to geographic (lon, lat) degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }
        let (lon, lat) = match self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => mercator::inverse(x, y),
            Projection::TransverseMercator(tm) => tm.inverse(x, y),
        };
        check_geographic(lon, lat)
    }

    /// Geographic (lon, lat) degrees to projected (x, y).
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        let (lon, lat) = check_geographic(lon, lat)?;
        let (x, y) = match self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator => mercator::forward(lon, lat),
            Projection::TransverseMercator(tm) => tm.forward(lon, lat),
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }
        Ok((x, y))
    }
}

fn check_geographic(lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(ProjectionError::NonFinite { x: lon, y: lat });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ProjectionError::LatitudeOutOfRange(lat));
    }
    Ok((lon, lat))
}

/// Transform a single point from `src` to `dst`.
pub fn transform_point(
    src: CrsCode,
    dst: CrsCode,
    x: f64,
    y: f64,
) -> Result<(f64, f64), ProjectionError> {
    if src == dst {
        return Ok((x, y));
    }
    let (lon, lat) = Projection::for_crs(src).to_geographic(x, y)?;
    Projection::for_crs(dst).from_geographic(lon, lat)
}

/// Transform a bounding box from `src` to `dst` by sampling its edges.
///
/// The four corners are always transformed; `densify_pts` extra points are
/// sampled evenly along each edge between them. The result is the envelope
/// of all transformed points. Only the box outline is transformed, never
/// the interior, so heavily curved or rotated targets are approximated.
pub fn transform_bounds(
    src: CrsCode,
    dst: CrsCode,
    bbox: &BoundingBox,
    densify_pts: usize,
) -> Result<BoundingBox, ProjectionError> {
    if !bbox.is_valid() {
        return Err(ProjectionError::InvalidBounds(*bbox));
    }
    if src == dst {
        return Ok(*bbox);
    }

    let corners = bbox.corners();
    let segments = densify_pts + 1;
    let mut points = Vec::with_capacity(4 * segments);

    for edge in 0..4 {
        let (x0, y0) = corners[edge];
        let (x1, y1) = corners[(edge + 1) % 4];
        // Each edge contributes its start corner plus the interior samples
        for step in 0..segments {
            let t = step as f64 / segments as f64;
            points.push((x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
        }
    }

    let transformed = points
        .into_iter()
        .map(|(x, y)| transform_point(src, dst, x, y))
        .collect::<Result<Vec<_>, _>>()?;

    BoundingBox::from_points(transformed).ok_or(ProjectionError::InvalidBounds(*bbox))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm22s() -> CrsCode {
        CrsCode::from_epsg(31982).unwrap()
    }

    #[test]
    fn test_identity_transform() {
        let bbox = BoundingBox::new(-54.0, -28.0, -53.0, -27.0);
        let out = transform_bounds(CrsCode::Epsg4326, CrsCode::Epsg4326, &bbox, 21).unwrap();
        assert_eq!(out, bbox);
    }

    #[test]
    fn test_utm_bounds_to_wgs84() {
        let bbox = BoundingBox::new(250_000.0, 6_900_000.0, 300_000.0, 6_960_000.0);
        let out = transform_bounds(utm22s(), CrsCode::Epsg4326, &bbox, 0).unwrap();

        // Zone 22S west of the central meridian: RS, Brazil
        assert!(out.min_x > -54.0 && out.max_x < -52.5, "lon range {:?}", out);
        assert!(out.min_y > -28.5 && out.max_y < -27.0, "lat range {:?}", out);
        assert!(out.is_valid());
    }

    #[test]
    fn test_densified_bounds_contain_corner_bounds() {
        let bbox = BoundingBox::new(200_000.0, 6_800_000.0, 400_000.0, 7_000_000.0);
        let corners = transform_bounds(utm22s(), CrsCode::Epsg4326, &bbox, 0).unwrap();
        let dense = transform_bounds(utm22s(), CrsCode::Epsg4326, &bbox, 21).unwrap();
        assert!(dense.contains(&corners), "{:?} should contain {:?}", dense, corners);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let bbox = BoundingBox::new(250_000.0, 6_900_000.0, 300_000.0, 6_960_000.0);
        let a = transform_bounds(utm22s(), CrsCode::Epsg4326, &bbox, 21).unwrap();
        let b = transform_bounds(utm22s(), CrsCode::Epsg4326, &bbox, 21).unwrap();
        assert_eq!(a.min_x.to_bits(), b.min_x.to_bits());
        assert_eq!(a.max_y.to_bits(), b.max_y.to_bits());
        assert_eq!(a.center().0.to_bits(), b.center().0.to_bits());
        assert_eq!(a.center().1.to_bits(), b.center().1.to_bits());
    }

    #[test]
    fn test_invalid_inputs() {
        let inverted = BoundingBox::new(10.0, 10.0, 5.0, 5.0);
        assert!(transform_bounds(utm22s(), CrsCode::Epsg4326, &inverted, 0).is_err());
        assert!(transform_point(CrsCode::Epsg4326, utm22s(), -53.0, 95.0).is_err());
        assert!(transform_point(CrsCode::Epsg3857, CrsCode::Epsg4326, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_point_roundtrip_through_mercator() {
        let (x, y) = transform_point(CrsCode::Epsg4326, CrsCode::Epsg3857, -53.5, -27.5).unwrap();
        let (lon, lat) = transform_point(CrsCode::Epsg3857, CrsCode::Epsg4326, x, y).unwrap();
        assert!((lon + 53.5).abs() < 1e-9);
        assert!((lat + 27.5).abs() < 1e-9);
    }
}
