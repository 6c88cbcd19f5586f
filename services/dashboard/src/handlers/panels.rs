//! Panel handlers. Each returns the JSON one section of the page draws.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::Response,
};
use landcover_common::{DashboardError, Year};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::common::{panel_response, PanelResponse, PanelStatus, YearQuery};
use crate::charts;
use crate::overlay::{render_map_panel, MapPanel};
use crate::presenter::{
    area_for_year, area_pivot, mean_f1_by_year, metrics_for_year, round2, total_area_by_year,
    AreaRow, MetricsView, AREA_KM2_COLUMN, CLASS_COLUMN,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AreaPanel {
    pub year: Year,
    pub chart: Value,
    pub columns: [&'static str; 2],
    /// Areas rounded to two decimals
    pub rows: Vec<AreaRow>,
    pub download: String,
}

#[derive(Debug, Serialize)]
pub struct TrendsPanel {
    pub total_chart: Value,
    pub class_chart: Value,
}

#[derive(Debug, Serialize)]
pub struct MetricsPanel {
    pub year: Year,
    /// Absent unless the metrics carry f1-score and support
    pub trend_chart: Option<Value>,
    /// Absent when the year has no metric rows
    pub detail: Option<MetricsDetail>,
}

#[derive(Debug, Serialize)]
pub struct MetricsDetail {
    pub bar_chart: Option<Value>,
    pub table: MetricsView,
    pub download: String,
}

/// GET /panels/map?year= - Classified map over the basin boundary
#[instrument(skip(state))]
pub async fn map_panel_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Response {
    panel_response(map_panel(state, query.year()).await)
}

async fn map_panel(
    state: Arc<AppState>,
    requested: Option<Year>,
) -> Result<PanelResponse<MapPanel>, DashboardError> {
    let year = state.display_year(requested)?;
    let path = state
        .catalog
        .path_for(year)
        .ok_or_else(|| DashboardError::MapRender {
            year,
            reason: "no raster for this year".to_string(),
        })?
        .to_path_buf();
    let options = state.overlay_options();

    // Decoding and colorizing are CPU-bound
    let panel = tokio::task::spawn_blocking(move || {
        render_map_panel(year, &path, &state.boundary, &state.mapping, options)
    })
    .await
    .map_err(|e| DashboardError::MapRender {
        year,
        reason: format!("render task failed: {}", e),
    })??;
    debug!(year, bytes = panel.overlay.url.len(), "Map panel ready");
    Ok(PanelResponse::ok(panel))
}

/// GET /panels/area?year= - Area by class for one year
#[instrument(skip(state))]
pub async fn area_panel_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Response {
    panel_response(area_panel(&state, query.year()).await)
}

async fn area_panel(state: &AppState, requested: Option<Year>) -> Result<PanelResponse<AreaPanel>, DashboardError> {
    let year = state.display_year(requested)?;
    let table = state.area_table().await?;

    let rows = area_for_year(&table, year, &state.mapping);
    if rows.is_empty() {
        return Ok(PanelResponse::notice(
            PanelStatus::Info,
            format!("No area records for {}.", year),
            None,
        ));
    }

    let chart = charts::area_bar_chart(&rows, year, &state.mapping);
    let rows = rows
        .into_iter()
        .map(|row| AreaRow {
            area_km2: round2(row.area_km2),
            ..row
        })
        .collect();

    Ok(PanelResponse::ok(AreaPanel {
        year,
        chart,
        columns: [CLASS_COLUMN, AREA_KM2_COLUMN],
        rows,
        download: format!("/download/area.csv?year={}", year),
    }))
}

/// GET /panels/trends - Total and per-class area across all years
#[instrument(skip(state))]
pub async fn trends_panel_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    panel_response(trends_panel(&state).await)
}

async fn trends_panel(state: &AppState) -> Result<PanelResponse<TrendsPanel>, DashboardError> {
    let table = state.area_table().await?;
    let totals = total_area_by_year(&table);
    let pivot = area_pivot(&table, &state.mapping);

    Ok(PanelResponse::ok(TrendsPanel {
        total_chart: charts::total_area_chart(&totals),
        class_chart: charts::class_area_chart(&pivot, &state.mapping),
    }))
}

/// GET /panels/metrics?year= - Classification quality for one year
#[instrument(skip(state))]
pub async fn metrics_panel_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Response {
    panel_response(metrics_panel(&state, query.year()).await)
}

async fn metrics_panel(state: &AppState, requested: Option<Year>) -> Result<PanelResponse<MetricsPanel>, DashboardError> {
    let metrics = state.metric_table().await?;
    if metrics.is_empty() {
        return Err(DashboardError::NoMetrics {
            path: state.config.metrics_dir.display().to_string(),
        });
    }

    let year = state.metrics_year(requested)?;
    let trend_chart = mean_f1_by_year(&metrics).map(|points| charts::mean_f1_chart(&points));
    let detail = metrics_for_year(&metrics, year).map(|view| MetricsDetail {
        bar_chart: charts::f1_bar_chart(&view, &state.mapping),
        table: view,
        download: format!("/download/metrics.csv?year={}", year),
    });

    let panel = MetricsPanel {
        year,
        trend_chart,
        detail,
    };
    if panel.detail.is_none() {
        let notice = DashboardError::NoMetricsForYear { year };
        info!(year, "No metric rows for year");
        return Ok(PanelResponse::notice(
            PanelStatus::Info,
            notice.user_message(),
            Some(panel),
        ));
    }
    Ok(PanelResponse::ok(panel))
}
