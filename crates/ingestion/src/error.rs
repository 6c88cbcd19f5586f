//! Error types for the ingestion crate.

use landcover_common::DashboardError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading dashboard inputs.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Raster directory not found: {0}")]
    RasterDirNotFound(PathBuf),

    #[error("No classified GeoTIFF files in {0}")]
    NoRasters(PathBuf),

    #[error("Failed to decode GeoTIFF {path}: {source}")]
    TiffDecode {
        path: PathBuf,
        #[source]
        source: tiff::TiffError,
    },

    #[error("Unsupported raster {path}: {reason}")]
    UnsupportedRaster { path: PathBuf, reason: String },

    #[error("Area table not found: {0}")]
    AreaCsvNotFound(PathBuf),

    #[error("Area table has no rows: {0}")]
    EmptyAreaCsv(PathBuf),

    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid table {path}: {reason}")]
    InvalidTable { path: PathBuf, reason: String },

    #[error("Invalid basin boundary {path}: {reason}")]
    Boundary { path: PathBuf, reason: String },
}

impl IngestionError {
    pub(crate) fn file_read(path: &Path, source: std::io::Error) -> Self {
        IngestionError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        IngestionError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_table(path: &Path, reason: impl Into<String>) -> Self {
        IngestionError::InvalidTable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn boundary(path: &Path, reason: impl Into<String>) -> Self {
        IngestionError::Boundary {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_raster(path: &Path, reason: impl Into<String>) -> Self {
        IngestionError::UnsupportedRaster {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

impl From<IngestionError> for DashboardError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::RasterDirNotFound(path) => DashboardError::MissingRasterDir {
                path: path.display().to_string(),
            },
            IngestionError::NoRasters(path) => DashboardError::NoRasters {
                path: path.display().to_string(),
            },
            IngestionError::AreaCsvNotFound(path) => DashboardError::MissingAreaCsv {
                path: path.display().to_string(),
            },
            IngestionError::EmptyAreaCsv(path) => DashboardError::EmptyAreaCsv {
                path: path.display().to_string(),
            },
            IngestionError::Csv { path, source } => DashboardError::InvalidTable {
                path: path.display().to_string(),
                reason: source.to_string(),
            },
            IngestionError::InvalidTable { path, reason } => DashboardError::InvalidTable {
                path: path.display().to_string(),
                reason,
            },
            IngestionError::Boundary { path, reason } => DashboardError::BoundaryUnreadable {
                path: path.display().to_string(),
                reason,
            },
            other => DashboardError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landcover_common::ErrorKind;

    #[test]
    fn test_startup_errors_are_fatal() {
        let err: DashboardError = IngestionError::NoRasters(PathBuf::from("outputs/maps")).into();
        assert!(matches!(err, DashboardError::NoRasters { .. }));
        assert_eq!(err.kind(), ErrorKind::Fatal);

        let err: DashboardError = IngestionError::Boundary {
            path: PathBuf::from("data/bacia.geojson"),
            reason: "not GeoJSON".into(),
        }
        .into();
        assert!(err.to_string().contains("data/bacia.geojson"));
    }

    #[test]
    fn test_invalid_table_keeps_path_and_reason() {
        let err: DashboardError =
            IngestionError::invalid_table(Path::new("outputs/metrics/m_x.csv"), "bad year").into();
        match err {
            DashboardError::InvalidTable { path, reason } => {
                assert_eq!(path, "outputs/metrics/m_x.csv");
                assert_eq!(reason, "bad year");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
