//! Response helpers shared by the page, panel and download handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use landcover_common::{DashboardError, ErrorKind, Year};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// `?year=` query. Anything that is not an integer counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

impl YearQuery {
    pub fn year(&self) -> Option<Year> {
        self.year.as_deref().and_then(|y| y.trim().parse().ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Ok,
    Error,
    Warning,
    Info,
}

/// JSON envelope of every panel.
#[derive(Debug, Serialize)]
pub struct PanelResponse<T> {
    pub status: PanelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(skip)]
    http_status: StatusCode,
}

impl<T: Serialize> PanelResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: PanelStatus::Ok,
            message: None,
            data: Some(data),
            http_status: StatusCode::OK,
        }
    }

    /// A warning or informational message in place of, or above, the panel.
    pub fn notice(status: PanelStatus, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            data,
            http_status: StatusCode::OK,
        }
    }

    /// Report an error in the panel. Soft-missing data becomes a warning.
    pub fn from_error(err: &DashboardError) -> Self {
        let status = match err.kind() {
            ErrorKind::Fatal | ErrorKind::Panel => {
                error!(error = %err, "Panel failed");
                PanelStatus::Error
            }
            ErrorKind::SoftMissing => {
                info!(error = %err, "Panel data missing");
                PanelStatus::Warning
            }
        };
        Self {
            status,
            message: Some(err.user_message()),
            data: None,
            http_status: status_code(err),
        }
    }
}

impl<T: Serialize> IntoResponse for PanelResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

/// Turn a panel pipeline's result into its response.
pub fn panel_response<T: Serialize>(result: Result<PanelResponse<T>, DashboardError>) -> Response {
    match result {
        Ok(panel) => panel.into_response(),
        Err(err) => PanelResponse::<T>::from_error(&err).into_response(),
    }
}

pub fn status_code(err: &DashboardError) -> StatusCode {
    StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn html_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// A CSV body served as a file download.
pub fn csv_attachment(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub fn text_error(status: StatusCode, message: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_query_parsing() {
        let query = |y: Option<&str>| YearQuery {
            year: y.map(str::to_string),
        };
        assert_eq!(query(Some("2020")).year(), Some(2020));
        assert_eq!(query(Some(" 2019 ")).year(), Some(2019));
        assert_eq!(query(Some("latest")).year(), None);
        assert_eq!(query(None).year(), None);
    }

    #[test]
    fn test_panel_envelope_serialization() {
        let ok = serde_json::to_value(PanelResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "ok", "data": [1, 2]}));

        let err = DashboardError::MapRender {
            year: 2020,
            reason: "corrupt strip".into(),
        };
        let panel = PanelResponse::<()>::from_error(&err);
        assert_eq!(panel.http_status, StatusCode::INTERNAL_SERVER_ERROR);
        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["data"].is_null());
        assert!(json["message"].as_str().unwrap().contains("2020"));
    }

    #[test]
    fn test_soft_missing_is_warning() {
        let err = DashboardError::NoMetrics {
            path: "outputs/metrics".into(),
        };
        let panel = PanelResponse::<()>::from_error(&err);
        assert_eq!(panel.status, PanelStatus::Warning);
        assert_eq!(panel.http_status, StatusCode::OK);
    }
}
