//! HTTP request handlers for the dashboard.

pub mod common;
pub mod downloads;
pub mod page;
pub mod panels;

// Re-export handlers for use in main.rs and the router
pub use downloads::{area_csv_handler, metrics_csv_handler};
pub use page::index_handler;
pub use panels::{area_panel_handler, map_panel_handler, metrics_panel_handler, trends_panel_handler};
