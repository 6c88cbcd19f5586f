//! Application state for the dashboard.

use std::sync::Arc;

use ingestion::{load_area_table, load_basin_boundary, load_metric_table, BasinBoundary, RasterCatalog};
use landcover_common::{AreaTable, ClassMapping, DashboardError, MetricTable, Year};
use storage::{SourceCache, SourceCacheStats};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::overlay::OverlayOptions;
use crate::presenter::resolve_year;

/// Shared application state.
pub struct AppState {
    pub config: DashboardConfig,

    /// Class table used for labels, colors and ordering.
    pub mapping: ClassMapping,

    /// Classified rasters by year.
    pub catalog: RasterCatalog,

    /// Basin outline in WGS84.
    pub boundary: BasinBoundary,

    area_cache: SourceCache<AreaTable>,
    metrics_cache: SourceCache<MetricTable>,
}

impl AppState {
    /// Load every input once.
    ///
    /// Any fatal input error is returned; a missing metrics directory only
    /// leaves the metrics table empty.
    pub async fn load(config: DashboardConfig, mapping: ClassMapping) -> Result<Self, DashboardError> {
        let boundary = load_basin_boundary(&config.boundary_path)?;
        if boundary.is_empty() {
            warn!(path = %config.boundary_path.display(), "Basin boundary has no polygons");
        }

        let catalog = RasterCatalog::scan(&config.map_dir)?;

        let state = Self {
            config,
            mapping,
            catalog,
            boundary,
            area_cache: SourceCache::new("area"),
            metrics_cache: SourceCache::new("metrics"),
        };

        let areas = state.area_table().await?;
        let metrics = state.metric_table().await?;
        if metrics.is_empty() {
            warn!(
                path = %state.config.metrics_dir.display(),
                "No classification metrics found"
            );
        }

        info!(
            years = ?state.catalog.years(),
            area_rows = areas.len(),
            metric_rows = metrics.len(),
            polygons = state.boundary.polygons().len(),
            "Dashboard inputs loaded"
        );
        Ok(state)
    }

    /// The area table, read on first access.
    pub async fn area_table(&self) -> Result<Arc<AreaTable>, DashboardError> {
        let table = self
            .area_cache
            .get_or_try_load(&self.config.area_csv, |path| {
                load_area_table(path, &self.mapping)
            })
            .await;
        log_cache_stats(&self.area_cache).await;
        table.map_err(DashboardError::from)
    }

    /// All metrics files concatenated, read on first access.
    pub async fn metric_table(&self) -> Result<Arc<MetricTable>, DashboardError> {
        let table = self
            .metrics_cache
            .get_or_try_load(&self.config.metrics_dir, |dir| {
                load_metric_table(dir, &self.mapping)
            })
            .await;
        log_cache_stats(&self.metrics_cache).await;
        table.map_err(DashboardError::from)
    }

    /// Hit and miss counts of the area and metrics caches.
    pub async fn cache_stats(&self) -> [(&'static str, SourceCacheStats); 2] {
        [
            (self.area_cache.name(), self.area_cache.stats().await),
            (self.metrics_cache.name(), self.metrics_cache.stats().await),
        ]
    }

    /// Raster years, ascending.
    pub fn years(&self) -> Vec<Year> {
        self.catalog.years()
    }

    /// Year of the map and area panels: the request's when valid, else the latest.
    pub fn display_year(&self, requested: Option<Year>) -> Result<Year, DashboardError> {
        let default = self.catalog.latest_year().ok_or_else(|| self.no_rasters())?;
        Ok(resolve_year(requested, &self.years(), default))
    }

    /// Year of the metrics panel: the request's when valid, else the first.
    pub fn metrics_year(&self, requested: Option<Year>) -> Result<Year, DashboardError> {
        let default = self.catalog.first_year().ok_or_else(|| self.no_rasters())?;
        Ok(resolve_year(requested, &self.years(), default))
    }

    fn no_rasters(&self) -> DashboardError {
        DashboardError::NoRasters {
            path: self.catalog.dir().display().to_string(),
        }
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions::from(&self.config)
    }
}

async fn log_cache_stats<T>(cache: &SourceCache<T>) {
    let stats = cache.stats().await;
    debug!(
        cache = cache.name(),
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        hit_rate = stats.hit_rate(),
        "Source cache lookup"
    );
}
