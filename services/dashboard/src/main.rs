//! Land-cover dashboard server
//!
//! Loads the classification outputs once, then serves the dashboard page.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use dashboard::config::DashboardConfig;
use dashboard::state::AppState;

/// Land-cover dashboard server
#[derive(Parser, Debug)]
#[command(name = "landcover-dashboard")]
#[command(about = "Land-cover dashboard for the Rio da Várzea basin")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "LANDCOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long, env = "LANDCOVER_LISTEN_ADDR")]
    listen: Option<String>,

    /// Directory of classified_<year>.tif rasters
    #[arg(long, env = "LANDCOVER_MAP_DIR")]
    map_dir: Option<PathBuf>,

    /// Basin boundary (.shp with .prj, or GeoJSON)
    #[arg(long, env = "LANDCOVER_BOUNDARY")]
    boundary: Option<PathBuf>,

    /// Area-by-class CSV
    #[arg(long, env = "LANDCOVER_AREA_CSV")]
    area_csv: Option<PathBuf>,

    /// Directory of metrics_<year>.csv files
    #[arg(long, env = "LANDCOVER_METRICS_DIR")]
    metrics_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

impl Args {
    /// File (or default) configuration with flags applied on top.
    fn into_config(self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load_file(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(map_dir) = self.map_dir {
            config.map_dir = map_dir;
        }
        if let Some(boundary) = self.boundary {
            config.boundary_path = boundary;
        }
        if let Some(area_csv) = self.area_csv {
            config.area_csv = area_csv;
        }
        if let Some(metrics_dir) = self.metrics_dir {
            config.metrics_dir = metrics_dir;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = args.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = args.into_config()?;
    let mapping = config.class_mapping()?;
    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen))?;

    info!(
        map_dir = %config.map_dir.display(),
        boundary = %config.boundary_path.display(),
        area_csv = %config.area_csv.display(),
        metrics_dir = %config.metrics_dir.display(),
        "Starting land-cover dashboard"
    );

    // Preflight: every input the page needs must load
    let state = match AppState::load(config, mapping).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error = %e, remedy = e.remedy(), "Failed to load dashboard inputs");
            std::process::exit(1);
        }
    };

    let app = dashboard::build_router(state);

    info!("Dashboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
