//! Input fixtures shaped like the upstream pipeline's outputs.
//!
//! The defaults describe a small raster over the Rio da Várzea basin in
//! SIRGAS 2000 / UTM zone 22S (EPSG:31982).

use serde_json::json;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::generators::create_clipped_class_grid;

/// Common georeferencing for test rasters.
pub mod geo {
    /// SIRGAS 2000 / UTM zone 22S
    pub const EPSG_UTM_22S: u16 = 31982;

    /// Upper-left corner of the test raster in UTM 22S meters.
    pub const ORIGIN: (f64, f64) = (250_000.0, 6_960_000.0);

    /// Landsat-like pixel size (meters)
    pub const PIXEL_SIZE: f64 = 30.0;

    /// `.prj` text ArcGIS and GDAL's ESRI driver write for EPSG:31982.
    pub const ESRI_PRJ_UTM_22S: &str = "PROJCS[\"SIRGAS_2000_UTM_Zone_22S\",\
        GEOGCS[\"GCS_SIRGAS_2000\",DATUM[\"D_SIRGAS_2000\",\
        SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],PRIMEM[\"Greenwich\",0.0],\
        UNIT[\"Degree\",0.0174532925199433]],PROJECTION[\"Transverse_Mercator\"],\
        PARAMETER[\"False_Easting\",500000.0],PARAMETER[\"False_Northing\",10000000.0],\
        PARAMETER[\"Central_Meridian\",-51.0],PARAMETER[\"Scale_Factor\",0.9996],\
        PARAMETER[\"Latitude_Of_Origin\",0.0],UNIT[\"Meter\",1.0]]";

    /// A 10 km square under the test raster's corner, in UTM 22S meters,
    /// clockwise as shapefile outer rings are.
    pub const BASIN_RING_UTM: [(f64, f64); 5] = [
        (250_000.0, 6_950_000.0),
        (250_000.0, 6_960_000.0),
        (260_000.0, 6_960_000.0),
        (260_000.0, 6_950_000.0),
        (250_000.0, 6_950_000.0),
    ];

    /// Approximate basin outline in WGS84 lon/lat.
    pub const BASIN_RING: [(f64, f64); 5] = [
        (-53.6, -27.9),
        (-52.9, -27.9),
        (-52.9, -27.1),
        (-53.6, -27.1),
        (-53.6, -27.9),
    ];
}

/// Known classes as written by the upstream steps.
pub mod classes {
    pub const NAMES: [&str; 6] = [
        "Água",
        "Floresta Nativa",
        "Floresta Plantada",
        "Agricultura",
        "Agricultura em Pousio",
        "Solo Exposto",
    ];
}

/// A classified GeoTIFF to write.
#[derive(Debug, Clone)]
pub struct ClassRasterFixture {
    pub width: u32,
    pub height: u32,
    pub values: Vec<u8>,
    /// EPSG code written as ProjectedCSTypeGeoKey; `None` writes no GeoKeys
    pub epsg: Option<u16>,
    /// Upper-left corner in CRS units
    pub origin: (f64, f64),
    pub pixel_size: f64,
    /// Written verbatim as the GDAL_NODATA tag
    pub nodata: Option<String>,
}

impl ClassRasterFixture {
    /// An 8x6 clipped basin raster in UTM 22S with no-data 255.
    pub fn basin() -> Self {
        Self {
            width: 8,
            height: 6,
            values: create_clipped_class_grid(8, 6, 6, 255),
            epsg: Some(geo::EPSG_UTM_22S),
            origin: geo::ORIGIN,
            pixel_size: geo::PIXEL_SIZE,
            nodata: Some("255".to_string()),
        }
    }

    pub fn with_nodata(mut self, nodata: Option<&str>) -> Self {
        self.nodata = nodata.map(str::to_string);
        self
    }

    pub fn with_epsg(mut self, epsg: Option<u16>) -> Self {
        self.epsg = epsg;
        self
    }

    /// Extent as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.origin;
        (
            x0,
            y0 - self.height as f64 * self.pixel_size,
            x0 + self.width as f64 * self.pixel_size,
            y0,
        )
    }
}

/// Write a single-band 8-bit GeoTIFF with pixel scale, tiepoint, GeoKeys
/// and optional GDAL no-data.
pub fn write_class_geotiff(path: &Path, fixture: &ClassRasterFixture) {
    let file = File::create(path).expect("Failed to create GeoTIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("Failed to start TIFF");
    let mut image = encoder
        .new_image::<colortype::Gray8>(fixture.width, fixture.height)
        .expect("Failed to start TIFF image");

    let scale = [fixture.pixel_size, fixture.pixel_size, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, fixture.origin.0, fixture.origin.1, 0.0];
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33550), &scale[..])
        .expect("Failed to write ModelPixelScale");
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33922), &tiepoint[..])
        .expect("Failed to write ModelTiepoint");

    if let Some(epsg) = fixture.epsg {
        // Version 1.1.0, three keys: model type projected, raster is area, CRS
        let geo_keys: [u16; 16] = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, epsg];
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(34735), &geo_keys[..])
            .expect("Failed to write GeoKeyDirectory");
    }
    if let Some(nodata) = &fixture.nodata {
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(42113), nodata.as_str())
            .expect("Failed to write GDAL_NODATA");
    }

    image.write_data(&fixture.values).expect("Failed to write TIFF data");
}

/// Write an RGB GeoTIFF, which the raster reader must reject.
pub fn write_rgb_tiff(path: &Path, width: u32, height: u32) {
    let file = File::create(path).expect("Failed to create TIFF");
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).expect("Failed to start TIFF");
    let data = vec![0u8; (width * height * 3) as usize];
    encoder
        .write_image::<colortype::RGB8>(width, height, &data)
        .expect("Failed to write TIFF");
}

/// Write an area table with the upstream header `Ano,Classe,Área_ha`.
pub fn write_area_csv(path: &Path, rows: &[(i32, &str, f64)]) {
    let mut text = String::from("Ano,Classe,Área_ha\n");
    for (year, class, hectares) in rows {
        text.push_str(&format!("{},{},{}\n", year, class, hectares));
    }
    fs::write(path, text).expect("Failed to write area CSV");
}

/// Write a per-class metrics table with
/// `Classe,precision,recall,f1-score,support`.
pub fn write_metrics_csv(path: &Path, rows: &[(&str, f64, f64, f64, u32)]) {
    let mut text = String::from("Classe,precision,recall,f1-score,support\n");
    for (class, precision, recall, f1, support) in rows {
        text.push_str(&format!("{},{},{},{},{}\n", class, precision, recall, f1, support));
    }
    fs::write(path, text).expect("Failed to write metrics CSV");
}

/// Write a boundary FeatureCollection with a single polygon ring.
///
/// `crs` adds a legacy `crs` member, e.g. `urn:ogc:def:crs:EPSG::31982`.
pub fn write_boundary_geojson(path: &Path, ring: &[(f64, f64)], crs: Option<&str>) {
    let coordinates: Vec<[f64; 2]> = ring.iter().map(|(x, y)| [*x, *y]).collect();
    let mut document = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "nome": "Bacia do Rio da Várzea" },
            "geometry": { "type": "Polygon", "coordinates": [coordinates] }
        }]
    });
    if let Some(name) = crs {
        document["crs"] = json!({ "type": "name", "properties": { "name": name } });
    }
    fs::write(path, document.to_string()).expect("Failed to write boundary GeoJSON");
}

/// Write a single-polygon ESRI shapefile: `.shp`, its `.shx` index and,
/// when given, a `.prj`.
pub fn write_boundary_shapefile(path: &Path, ring: &[(f64, f64)], prj: Option<&str>) {
    let bbox = ring.iter().fold(
        [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        |[x0, y0, x1, y1], &(x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    );

    // Polygon record: type, box, one part starting at point 0, points
    let mut content = Vec::new();
    content.extend_from_slice(&SHAPE_TYPE_POLYGON.to_le_bytes());
    for value in bbox {
        content.extend_from_slice(&value.to_le_bytes());
    }
    content.extend_from_slice(&1i32.to_le_bytes());
    content.extend_from_slice(&(ring.len() as i32).to_le_bytes());
    content.extend_from_slice(&0i32.to_le_bytes());
    for (x, y) in ring {
        content.extend_from_slice(&x.to_le_bytes());
        content.extend_from_slice(&y.to_le_bytes());
    }
    let content_words = (content.len() / 2) as i32;

    let mut shp = shapefile_header(100 + 8 + content.len(), bbox);
    shp.extend_from_slice(&1i32.to_be_bytes());
    shp.extend_from_slice(&content_words.to_be_bytes());
    shp.extend_from_slice(&content);
    fs::write(path, shp).expect("Failed to write .shp");

    let mut shx = shapefile_header(100 + 8, bbox);
    shx.extend_from_slice(&50i32.to_be_bytes());
    shx.extend_from_slice(&content_words.to_be_bytes());
    fs::write(path.with_extension("shx"), shx).expect("Failed to write .shx");

    if let Some(prj) = prj {
        fs::write(path.with_extension("prj"), prj).expect("Failed to write .prj");
    }
}

const SHAPE_TYPE_POLYGON: i32 = 5;

/// 100-byte main file header. Lengths are in 16-bit words, big-endian;
/// everything after the length is little-endian.
fn shapefile_header(file_bytes: usize, bbox: [f64; 4]) -> Vec<u8> {
    let mut header = Vec::with_capacity(100);
    header.extend_from_slice(&9994i32.to_be_bytes());
    header.extend_from_slice(&[0u8; 20]);
    header.extend_from_slice(&((file_bytes / 2) as i32).to_be_bytes());
    header.extend_from_slice(&1000i32.to_le_bytes());
    header.extend_from_slice(&SHAPE_TYPE_POLYGON.to_le_bytes());
    for value in bbox {
        header.extend_from_slice(&value.to_le_bytes());
    }
    // Z and M ranges
    header.extend_from_slice(&[0u8; 32]);
    header
}

/// A complete set of dashboard inputs in a temporary directory.
///
/// Layout mirrors the upstream pipeline:
/// `outputs/maps/classified_<year>.tif`, `outputs/area_por_classe.csv`,
/// `outputs/metrics/metrics_<year>.csv` and `data/bacia/limite_bacia.geojson`.
pub struct DashboardInputs {
    pub dir: tempfile::TempDir,
    pub map_dir: PathBuf,
    pub boundary_path: PathBuf,
    pub area_csv: PathBuf,
    pub metrics_dir: PathBuf,
}

impl DashboardInputs {
    /// Empty directory layout; nothing is written yet.
    pub fn empty() -> Self {
        let dir = crate::paths::temp_test_dir_with_prefix("landcover");
        let root = dir.path().to_path_buf();
        Self {
            map_dir: root.join("outputs/maps"),
            boundary_path: root.join("data/bacia/limite_bacia.geojson"),
            area_csv: root.join("outputs/area_por_classe.csv"),
            metrics_dir: root.join("outputs/metrics"),
            dir,
        }
    }

    /// Rasters for 2019-2021, areas for 2019-2021, metrics for 2019-2020.
    pub fn basin() -> Self {
        let inputs = Self::empty();
        for year in [2019, 2020, 2021] {
            inputs.add_raster(year, &ClassRasterFixture::basin());
        }
        inputs.write_boundary(None);
        inputs.write_areas(&sample_area_rows());
        inputs.add_metrics(2019, &sample_metric_rows(0.80));
        inputs.add_metrics(2020, &sample_metric_rows(0.90));
        inputs
    }

    pub fn add_raster(&self, year: i32, fixture: &ClassRasterFixture) -> PathBuf {
        fs::create_dir_all(&self.map_dir).expect("Failed to create map dir");
        let path = self.map_dir.join(format!("classified_{}.tif", year));
        write_class_geotiff(&path, fixture);
        path
    }

    pub fn write_boundary(&self, crs: Option<&str>) {
        create_parent(&self.boundary_path);
        write_boundary_geojson(&self.boundary_path, &geo::BASIN_RING, crs);
    }

    /// Write the boundary as `data/bacia/limite_bacia.shp` in UTM 22S
    /// and return its path.
    pub fn write_boundary_shapefile(&self) -> PathBuf {
        let path = self.boundary_path.with_extension("shp");
        create_parent(&path);
        write_boundary_shapefile(&path, &geo::BASIN_RING_UTM, Some(geo::ESRI_PRJ_UTM_22S));
        path
    }

    pub fn write_areas(&self, rows: &[(i32, &str, f64)]) {
        create_parent(&self.area_csv);
        write_area_csv(&self.area_csv, rows);
    }

    pub fn add_metrics(&self, year: i32, rows: &[(&str, f64, f64, f64, u32)]) -> PathBuf {
        fs::create_dir_all(&self.metrics_dir).expect("Failed to create metrics dir");
        let path = self.metrics_dir.join(format!("metrics_{}.csv", year));
        write_metrics_csv(&path, rows);
        path
    }
}

fn create_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
}

/// Area rows for 2019-2021. "Solo Exposto" is absent in 2020.
pub fn sample_area_rows() -> Vec<(i32, &'static str, f64)> {
    let mut rows = Vec::new();
    for (offset, year) in [2019, 2020, 2021].into_iter().enumerate() {
        let shift = offset as f64 * 100.0;
        rows.push((year, classes::NAMES[0], 1000.0));
        rows.push((year, classes::NAMES[1], 52_000.0 + shift));
        rows.push((year, classes::NAMES[2], 8_000.0 - shift));
        rows.push((year, classes::NAMES[3], 30_000.0));
        rows.push((year, classes::NAMES[4], 4_000.0));
        if year != 2020 {
            rows.push((year, classes::NAMES[5], 500.0));
        }
    }
    rows
}

/// Metric rows for the six known classes with a constant f1-score.
pub fn sample_metric_rows(f1: f64) -> Vec<(&'static str, f64, f64, f64, u32)> {
    classes::NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| (*name, f1, f1, f1, 10 * (idx as u32 + 1)))
        .collect()
}
