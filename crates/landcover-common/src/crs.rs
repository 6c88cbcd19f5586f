//! Coordinate Reference System codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic datum of a CRS.
///
/// SIRGAS 2000 uses the GRS80 ellipsoid, which differs from WGS84 by
/// well under a millimetre, so both are handled with the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    Wgs84,
    Sirgas2000,
}

/// Well-known CRS codes understood by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// SIRGAS 2000 Geographic
    Epsg4674,
    /// Web Mercator (meters)
    Epsg3857,
    /// Universal Transverse Mercator zone (meters)
    Utm { zone: u8, south: bool, datum: Datum },
}

impl CrsCode {
    /// Resolve a numeric EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        let crs = match code {
            4326 => CrsCode::Epsg4326,
            4674 => CrsCode::Epsg4674,
            3857 | 900913 => CrsCode::Epsg3857,
            32601..=32660 => CrsCode::Utm {
                zone: (code - 32600) as u8,
                south: false,
                datum: Datum::Wgs84,
            },
            32701..=32760 => CrsCode::Utm {
                zone: (code - 32700) as u8,
                south: true,
                datum: Datum::Wgs84,
            },
            // SIRGAS 2000 / UTM zones 11N-22N
            31965..=31976 => CrsCode::Utm {
                zone: (code - 31954) as u8,
                south: false,
                datum: Datum::Sirgas2000,
            },
            // SIRGAS 2000 / UTM zones 17S-25S
            31977..=31985 => CrsCode::Utm {
                zone: (code - 31960) as u8,
                south: true,
                datum: Datum::Sirgas2000,
            },
            _ => return Err(CrsParseError::UnsupportedEpsg(code)),
        };
        Ok(crs)
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:31982"
    /// - "epsg:4326"
    /// - "urn:ogc:def:crs:EPSG::31982"
    /// - "CRS:84" / "urn:ogc:def:crs:OGC:1.3:CRS84" (WGS84 lon/lat)
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();

        if normalized == "CRS:84" || normalized.ends_with(":CRS84") {
            return Ok(CrsCode::Epsg4326);
        }

        let code = normalized
            .strip_prefix("EPSG:")
            .or_else(|| normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG::"))
            .or_else(|| normalized.rsplit_once("EPSG:").map(|(_, code)| code))
            .map(|code| code.trim_start_matches(':'))
            .ok_or_else(|| CrsParseError::InvalidFormat(s.to_string()))?;

        let code: u32 = code
            .parse()
            .map_err(|_| CrsParseError::InvalidFormat(s.to_string()))?;
        Self::from_epsg(code)
    }

    /// Numeric EPSG code for this CRS.
    pub fn epsg(&self) -> u32 {
        match *self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg4674 => 4674,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Utm { zone, south, datum } => {
                let zone = zone as u32;
                match (datum, south) {
                    (Datum::Wgs84, false) => 32600 + zone,
                    (Datum::Wgs84, true) => 32700 + zone,
                    (Datum::Sirgas2000, false) => 31954 + zone,
                    (Datum::Sirgas2000, true) => 31960 + zone,
                }
            }
        }
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4674)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported EPSG code: {0}")]
    UnsupportedEpsg(u32),

    #[error("Unrecognized CRS identifier: {0}")]
    InvalidFormat(String),
}
