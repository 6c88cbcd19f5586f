//! Land-cover dashboard service library.
//!
//! Serves one page for the Rio da Várzea basin: the classified map of a
//! selected year over the basin boundary, area statistics by class and
//! classification quality metrics.

pub mod charts;
pub mod config;
pub mod handlers;
pub mod overlay;
pub mod page;
pub mod presenter;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the dashboard router with its middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Page
        .route("/", get(handlers::index_handler))
        // Panels
        .route("/panels/map", get(handlers::map_panel_handler))
        .route("/panels/area", get(handlers::area_panel_handler))
        .route("/panels/trends", get(handlers::trends_panel_handler))
        .route("/panels/metrics", get(handlers::metrics_panel_handler))
        // Downloads
        .route("/download/area.csv", get(handlers::area_csv_handler))
        .route("/download/metrics.csv", get(handlers::metrics_csv_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
