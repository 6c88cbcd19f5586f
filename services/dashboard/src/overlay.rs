//! Map panel: the classified raster draped over the basin boundary.

use std::path::Path;

use geojson::FeatureCollection;
use ingestion::{read_classified_raster, BasinBoundary, ClassifiedRaster};
use landcover_common::{ClassMapping, CrsCode, DashboardError, Year};
use projection::transform_bounds;
use renderer::{render_class_overlay, ClassGrid};
use serde::Serialize;
use tracing::debug;

use crate::config::DashboardConfig;

/// Map settings shared by every year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    pub opacity: f64,
    pub zoom: u8,
    pub densify_points: usize,
}

impl From<&DashboardConfig> for OverlayOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            opacity: config.overlay_opacity,
            zoom: config.zoom_start,
            densify_points: config.densify_points,
        }
    }
}

/// Everything Leaflet needs to draw the map for one year.
#[derive(Debug, Clone, Serialize)]
pub struct MapPanel {
    pub year: Year,
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    /// `[[south, west], [north, east]]`
    pub bounds: [[f64; 2]; 2],
    pub overlay: ImageOverlay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryLayer>,
    pub layer_control: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageOverlay {
    /// PNG data URI
    pub url: String,
    pub opacity: f64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryLayer {
    pub data: FeatureCollection,
    pub style: BoundaryStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStyle {
    pub fill_color: String,
    pub color: String,
    pub weight: u32,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            fill_color: "#00000000".to_string(),
            color: "blue".to_string(),
            weight: 2,
        }
    }
}

/// Read the raster for `year` from `path` and compose its map panel.
pub fn render_map_panel(
    year: Year,
    path: &Path,
    boundary: &BasinBoundary,
    mapping: &ClassMapping,
    options: OverlayOptions,
) -> Result<MapPanel, DashboardError> {
    let raster = read_classified_raster(path).map_err(|e| DashboardError::MapRender {
        year,
        reason: e.to_string(),
    })?;
    compose_map_panel(year, &raster, boundary, mapping, options)
}

/// Colorize a decoded raster and place it on the map in WGS84.
pub fn compose_map_panel(
    year: Year,
    raster: &ClassifiedRaster,
    boundary: &BasinBoundary,
    mapping: &ClassMapping,
    options: OverlayOptions,
) -> Result<MapPanel, DashboardError> {
    let map_err = |reason: String| DashboardError::MapRender { year, reason };

    let grid = ClassGrid::new(&raster.values, raster.width, raster.height, raster.nodata);
    let url = render_class_overlay(&grid, mapping).map_err(|e| map_err(e.to_string()))?;

    let wgs84 = transform_bounds(
        raster.crs,
        CrsCode::Epsg4326,
        &raster.bounds,
        options.densify_points,
    )
    .map_err(|e| map_err(e.to_string()))?;

    let (lon, lat) = wgs84.center();
    debug!(
        year,
        crs = %raster.crs,
        west = wgs84.min_x,
        south = wgs84.min_y,
        east = wgs84.max_x,
        north = wgs84.max_y,
        "Composed map panel"
    );

    Ok(MapPanel {
        year,
        center: [lat, lon],
        zoom: options.zoom,
        bounds: [[wgs84.min_y, wgs84.min_x], [wgs84.max_y, wgs84.max_x]],
        overlay: ImageOverlay {
            url,
            opacity: options.opacity,
            name: format!("Classified map {}", year),
        },
        boundary: (!boundary.is_empty()).then(|| BoundaryLayer {
            data: boundary.to_geojson(),
            style: BoundaryStyle::default(),
        }),
        layer_control: true,
    })
}
