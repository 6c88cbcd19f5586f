//! Dashboard page handler.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Response};
use landcover_common::DashboardError;
use tracing::{error, instrument};

use super::common::{html_response, status_code};
use crate::page::{render_error_page, render_page, PageContext};
use crate::state::AppState;

/// GET / - Page shell with the year selectors
#[instrument(skip(state))]
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match page_context_years(&state).await {
        Ok((display_year, metrics_year)) => {
            let years = state.years();
            let html = render_page(&PageContext {
                title: &state.config.title,
                years: &years,
                display_year,
                metrics_year,
            });
            html_response(StatusCode::OK, html)
        }
        Err(err) => {
            error!(error = %err, "Dashboard inputs unavailable");
            html_response(status_code(&err), render_error_page(&state.config.title, &err))
        }
    }
}

/// Default years, after checking the inputs every panel depends on.
async fn page_context_years(state: &AppState) -> Result<(i32, i32), DashboardError> {
    let areas = state.area_table().await?;
    if areas.is_empty() {
        return Err(DashboardError::EmptyAreaCsv {
            path: state.config.area_csv.display().to_string(),
        });
    }
    Ok((state.display_year(None)?, state.metrics_year(None)?))
}
