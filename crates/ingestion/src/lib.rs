//! Data loading for the land-cover dashboard.
//!
//! Reads the outputs of the upstream classification pipeline from disk:
//!
//! - Classified GeoTIFF rasters, one per year, and their georeferencing
//! - The area-by-class CSV table
//! - Per-year classification metrics CSV tables
//! - The basin boundary polygon (GeoJSON or ESRI shapefile)

pub mod boundary;
pub mod catalog;
pub mod error;
pub mod geotiff;
pub mod metadata;
pub mod tables;

// Re-exports
pub use boundary::{load_basin_boundary, BasinBoundary};
pub use catalog::RasterCatalog;
pub use error::{IngestionError, Result};
pub use geotiff::{read_classified_raster, ClassifiedRaster};
pub use metadata::{detect_file_type, extract_metrics_year, extract_raster_year, FileType};
pub use tables::{load_area_table, load_metric_table};
