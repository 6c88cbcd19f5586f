//! Metadata extraction from upstream output filenames.
//!
//! The classification step writes `classified_<year>.tif` and the evaluation
//! step writes `<name>_<year>.csv`; the year is recovered from the name.

use landcover_common::Year;
use std::path::Path;

/// Detected file type based on extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// GeoTIFF raster
    GeoTiff,
    /// Comma-separated table
    Csv,
    /// GeoJSON vector
    GeoJson,
    /// ESRI shapefile (`.shp` with sibling `.prj`)
    Shapefile,
    /// Unknown format
    Unknown,
}

/// Detect file type from path.
pub fn detect_file_type(path: &Path) -> FileType {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("tif") | Some("tiff") => FileType::GeoTiff,
        Some("csv") => FileType::Csv,
        Some("geojson") | Some("json") => FileType::GeoJson,
        Some("shp") => FileType::Shapefile,
        _ => FileType::Unknown,
    }
}

/// Extract the year of a classified raster from its filename.
///
/// Returns the first run of exactly four ASCII digits in the file stem
/// (`classified_2020.tif` → 2020, `mapa2019_v2.tif` → 2019). Longer digit
/// runs such as `20201231` are not years.
pub fn extract_raster_year(path: &Path) -> Option<Year> {
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    let bytes = stem.as_bytes();

    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }
        let end = bytes[start..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |len| start + len);
        if end - start == 4 {
            return stem[start..end].parse().ok();
        }
        start = end;
    }
    None
}

/// Extract the year of a metrics table: the last underscore-delimited token
/// of the file stem (`metrics_rf_2020.csv` → 2020).
pub fn extract_metrics_year(path: &Path) -> Option<Year> {
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    let token = stem.rsplit('_').next()?;
    token.trim().parse().ok()
}
