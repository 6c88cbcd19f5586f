//! CSV downloads of the tables shown on the page.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
};
use landcover_common::{DashboardError, ErrorKind, Year};
use tracing::{error, info, instrument};

use super::common::{csv_attachment, status_code, text_error, YearQuery};
use crate::presenter::{area_csv, area_csv_filename, area_for_year, metrics_csv, metrics_csv_filename, metrics_for_year};
use crate::state::AppState;

/// GET /download/area.csv?year= - Area table of the display year
#[instrument(skip(state))]
pub async fn area_csv_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Response {
    download_response(area_download(&state, query.year()).await)
}

async fn area_download(state: &AppState, requested: Option<Year>) -> Result<(String, String), DashboardError> {
    let year = state.display_year(requested)?;
    let table = state.area_table().await?;
    let rows = area_for_year(&table, year, &state.mapping);
    Ok((area_csv_filename(year), area_csv(&rows)?))
}

/// GET /download/metrics.csv?year= - Metrics table of the metrics year
#[instrument(skip(state))]
pub async fn metrics_csv_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Response {
    download_response(metrics_download(&state, query.year()).await)
}

async fn metrics_download(state: &AppState, requested: Option<Year>) -> Result<(String, String), DashboardError> {
    let year = state.metrics_year(requested)?;
    let metrics = state.metric_table().await?;
    if metrics.is_empty() {
        return Err(DashboardError::NoMetrics {
            path: state.config.metrics_dir.display().to_string(),
        });
    }
    let view = metrics_for_year(&metrics, year).ok_or(DashboardError::NoMetricsForYear { year })?;
    Ok((metrics_csv_filename(year), metrics_csv(&view)?))
}

fn download_response(result: Result<(String, String), DashboardError>) -> Response {
    match result {
        Ok((filename, body)) => csv_attachment(&filename, body),
        // Nothing to download is not a server fault
        Err(err) if err.kind() == ErrorKind::SoftMissing => {
            info!(error = %err, "Download has no data");
            text_error(StatusCode::NOT_FOUND, err.user_message())
        }
        Err(err) => {
            error!(error = %err, "Download failed");
            text_error(status_code(&err), err.user_message())
        }
    }
}
