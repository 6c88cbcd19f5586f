//! Error taxonomy for the dashboard.

use thiserror::Error;

/// Result type alias using DashboardError.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// How an error affects the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input the whole page depends on is unusable; nothing renders.
    Fatal,
    /// One panel failed; the rest of the page still renders.
    Panel,
    /// Optional data is absent; the panel shows a notice instead.
    SoftMissing,
}

/// Primary error type for dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    // === Fatal input errors ===
    #[error("Failed to read basin boundary {path}: {reason}")]
    BoundaryUnreadable { path: String, reason: String },

    #[error("Classified raster directory not found: {path}")]
    MissingRasterDir { path: String },

    #[error("No classified GeoTIFF files found in {path}")]
    NoRasters { path: String },

    #[error("Area-by-class table not found: {path}")]
    MissingAreaCsv { path: String },

    #[error("Area-by-class table is empty: {path}")]
    EmptyAreaCsv { path: String },

    #[error("Invalid table {path}: {reason}")]
    InvalidTable { path: String, reason: String },

    // === Per-panel errors ===
    #[error("Failed to display the classified map for {year}: {reason}")]
    MapRender { year: i32, reason: String },

    // === Soft-missing data ===
    #[error("No metrics found in {path}")]
    NoMetrics { path: String },

    #[error("No detailed metrics available for {year}")]
    NoMetricsForYear { year: i32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::BoundaryUnreadable { .. }
            | DashboardError::MissingRasterDir { .. }
            | DashboardError::NoRasters { .. }
            | DashboardError::MissingAreaCsv { .. }
            | DashboardError::EmptyAreaCsv { .. }
            | DashboardError::InvalidTable { .. }
            | DashboardError::Internal(_) => ErrorKind::Fatal,

            DashboardError::MapRender { .. } => ErrorKind::Panel,

            DashboardError::NoMetrics { .. } | DashboardError::NoMetricsForYear { .. } => {
                ErrorKind::SoftMissing
            }
        }
    }

    /// The upstream action that produces the missing or broken input.
    pub fn remedy(&self) -> &'static str {
        match self {
            DashboardError::BoundaryUnreadable { .. } => {
                "Check the boundary path and export the basin outline as GeoJSON or a shapefile with its .prj."
            }
            DashboardError::MissingRasterDir { .. } | DashboardError::NoRasters { .. } => {
                "Run the classification step to write classified_<year>.tif rasters."
            }
            DashboardError::MissingAreaCsv { .. } | DashboardError::EmptyAreaCsv { .. } => {
                "Run the area-by-class step to write the area table."
            }
            DashboardError::InvalidTable { .. } => {
                "Re-run the step that produced this table and check its columns."
            }
            DashboardError::MapRender { .. } => {
                "Check that the raster is intact and re-run the classification step for this year."
            }
            DashboardError::NoMetrics { .. } => {
                "Make sure the evaluation metrics were computed and saved."
            }
            DashboardError::NoMetricsForYear { .. } => {
                "Run the evaluation step for this year to see per-class metrics."
            }
            DashboardError::Internal(_) => "Check the server logs.",
        }
    }

    /// Message shown on the page: what failed, then how to fix it.
    pub fn user_message(&self) -> String {
        format!("{}. {}", self, self.remedy())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Fatal => 503,
            ErrorKind::Panel => 500,
            ErrorKind::SoftMissing => 200,
        }
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let fatal = DashboardError::NoRasters {
            path: "outputs/maps".into(),
        };
        assert_eq!(fatal.kind(), ErrorKind::Fatal);
        assert_eq!(fatal.http_status_code(), 503);

        let panel = DashboardError::MapRender {
            year: 2020,
            reason: "bad tiff".into(),
        };
        assert_eq!(panel.kind(), ErrorKind::Panel);

        let soft = DashboardError::NoMetricsForYear { year: 2020 };
        assert_eq!(soft.kind(), ErrorKind::SoftMissing);
        assert_eq!(soft.http_status_code(), 200);
    }

    #[test]
    fn test_user_message_names_input_and_remedy() {
        let err = DashboardError::MissingAreaCsv {
            path: "outputs/area_por_classe.csv".into(),
        };
        let message = err.user_message();
        assert!(message.contains("outputs/area_por_classe.csv"));
        assert!(message.contains("area-by-class step"));
    }
}
