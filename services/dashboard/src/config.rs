//! Dashboard configuration loading and types.

use anyhow::{bail, Context, Result};
use landcover_common::{ClassEntry, ClassMapping, Rgb};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration.
///
/// Defaults match the upstream pipeline's output layout. A YAML file may
/// override any subset of fields; command-line flags override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address
    pub listen: String,

    /// Directory holding `classified_<year>.tif` rasters
    pub map_dir: PathBuf,

    /// Basin boundary: a `.shp` (CRS from its `.prj`) or GeoJSON
    pub boundary_path: PathBuf,

    /// Area-by-class CSV
    pub area_csv: PathBuf,

    /// Directory holding `metrics_<year>.csv` files
    pub metrics_dir: PathBuf,

    /// Page title
    pub title: String,

    /// Opacity of the classified overlay (0-1)
    pub overlay_opacity: f64,

    /// Initial map zoom level
    pub zoom_start: u8,

    /// Points sampled along each raster edge when reprojecting its bounds.
    ///
    /// The default of 21 gives the same envelope as rasterio's
    /// `transform_bounds`. 0 transforms only the four corners.
    pub densify_points: usize,

    /// Replaces the built-in class table when present.
    pub classes: Option<Vec<ClassConfig>>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8501".to_string(),
            map_dir: PathBuf::from("outputs/maps"),
            boundary_path: PathBuf::from("data/bacia/limite_bacia_varzea.shp"),
            area_csv: PathBuf::from("outputs/area_por_classe.csv"),
            metrics_dir: PathBuf::from("outputs/metrics"),
            title: "Rio da Várzea Basin Land-Cover Dashboard".to_string(),
            overlay_opacity: 0.7,
            zoom_start: 10,
            densify_points: 21,
            classes: None,
        }
    }
}

/// One class table row as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    pub id: u16,
    pub name: String,
    /// Hex color ("#1f77b4"); omitted classes render gray
    #[serde(default)]
    pub color: Option<String>,
}

impl DashboardConfig {
    /// Load configuration from a YAML file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        tracing::info!(path = %path.display(), "Loaded dashboard config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            bail!(
                "overlay_opacity must be between 0 and 1, got {}",
                self.overlay_opacity
            );
        }
        if self.title.trim().is_empty() {
            bail!("title must not be empty");
        }
        Ok(())
    }

    /// The class table in effect: the configured one, or the built-in table.
    pub fn class_mapping(&self) -> Result<ClassMapping> {
        let Some(classes) = &self.classes else {
            return Ok(ClassMapping::default());
        };

        let entries = classes
            .iter()
            .map(|class| {
                let color = match &class.color {
                    Some(hex) => Some(Rgb::from_hex(hex).with_context(|| {
                        format!("Invalid color {:?} for class {}", hex, class.name)
                    })?),
                    None => None,
                };
                Ok(ClassEntry::new(class.id, class.name.clone(), color))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ClassMapping::new(entries))
    }
}
