//! Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! This is the projection behind UTM, which the upstream classification
//! step uses for its rasters (SIRGAS 2000 / UTM zone 22S over the basin).
//!
//! The series expansions follow Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), pp. 61-64. They are accurate to well below a
//! metre within a UTM zone, which is far finer than a raster pixel.
//!
//! The projection parameters include:
//! - Central meridian (lon0)
//! - Latitude of origin (lat0, 0 for UTM)
//! - Scale factor on the central meridian (k0, 0.9996 for UTM)
//! - False easting / false northing in meters

use std::f64::consts::PI;

/// WGS84 semi-major axis (meters)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM scale factor on the central meridian
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Semi-major axis (meters)
    a: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
    /// Meridian distance at lat0
    m0: f64,
}

impl TransverseMercator {
    /// Create a projection on the WGS84 ellipsoid.
    ///
    /// # Arguments
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `lat0_deg` - Latitude of origin (degrees)
    /// * `k0` - Scale factor on the central meridian
    /// * `false_easting` - Added to all x values (meters)
    /// * `false_northing` - Added to all y values (meters)
    pub fn new(lon0_deg: f64, lat0_deg: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let a = WGS84_A;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let ep2 = e2 / (1.0 - e2);
        let lat0 = lat0_deg.to_radians();

        let mut proj = Self {
            lon0: lon0_deg.to_radians(),
            lat0,
            k0,
            false_easting,
            false_northing,
            a,
            e2,
            ep2,
            m0: 0.0,
        };
        proj.m0 = proj.meridian_distance(lat0);
        proj
    }

    /// UTM zone projection. Zone 22 has central meridian -51°.
    pub fn utm(zone: u8, south: bool) -> Self {
        let lon0 = zone as f64 * 6.0 - 183.0;
        let false_northing = if south { UTM_FALSE_NORTHING_SOUTH } else { 0.0 };
        Self::new(lon0, 0.0, UTM_K0, UTM_FALSE_EASTING, false_northing)
    }

    /// Distance along the meridian from the equator to latitude `phi` (radians).
    fn meridian_distance(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Convert geographic coordinates (degrees) to projected (x, y) meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();

        // Normalize longitude difference to [-π, π]
        let mut dlon = lon_deg.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = dlon * cos_phi;
        let m = self.meridian_distance(phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = self.k0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);
        let y = self.k0
            * (m - self.m0
                + n * tan_phi
                    * (a2 / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0));

        (x + self.false_easting, y + self.false_northing)
    }

    /// Convert projected (x, y) meters to geographic (lon, lat) degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let m = self.m0 + y / self.k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let sqrt_1me2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        // Footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = self.a / denom.sqrt();
        let r1 = self.a * (1.0 - e2) / denom.powf(1.5);
        let d = x / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lambda = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos_phi1;

        (lambda.to_degrees(), phi.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_meridian_on_equator() {
        let proj = TransverseMercator::utm(22, true);
        let (x, y) = proj.forward(-51.0, 0.0);
        assert!((x - 500_000.0).abs() < 1e-6, "x should be false easting, got {}", x);
        assert!((y - 10_000_000.0).abs() < 1e-6, "y should be false northing, got {}", y);
    }

    #[test]
    fn test_utm_roundtrip_over_basin() {
        let proj = TransverseMercator::utm(22, true);

        for &(lon, lat) in &[(-53.5, -27.5), (-52.8, -27.1), (-51.0, -28.0), (-53.9, -29.2)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert!((lon - lon2).abs() < 1e-6, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_southern_hemisphere_northing_below_false_origin() {
        let proj = TransverseMercator::utm(22, true);
        let (x, y) = proj.forward(-53.5, -27.5);

        // West of the central meridian and south of the equator
        assert!(x < 500_000.0, "x should be west of false easting, got {}", x);
        assert!(y < 10_000_000.0 && y > 6_500_000.0, "unexpected northing {}", y);
    }

    #[test]
    fn test_meridian_distance_one_degree() {
        let proj = TransverseMercator::utm(31, false);

        // One degree of latitude near the equator is ~110.57 km on WGS84
        let (_, y) = proj.forward(3.0, 1.0);
        assert!((y * 1.0 / UTM_K0 - 110_574.0).abs() < 5.0, "got {}", y / UTM_K0);
    }
}
