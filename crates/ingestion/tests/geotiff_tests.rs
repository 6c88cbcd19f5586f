//! Round trips through real GeoTIFF files written by the test fixtures.

use ingestion::{read_classified_raster, IngestionError, RasterCatalog};
use landcover_common::{BoundingBox, CrsCode};
use test_utils::{temp_test_dir, write_class_geotiff, write_rgb_tiff, ClassRasterFixture, DashboardInputs};

#[test]
fn test_reads_values_crs_bounds_and_nodata() {
    let dir = temp_test_dir();
    let path = dir.path().join("classified_2020.tif");
    let fixture = ClassRasterFixture::basin();
    write_class_geotiff(&path, &fixture);

    let raster = read_classified_raster(&path).unwrap();
    assert_eq!((raster.width, raster.height), (8, 6));
    assert_eq!(raster.values.len(), 48);
    assert_eq!(raster.values[0], 255);
    assert_eq!(raster.values[8 + 1], 2);
    assert_eq!(raster.nodata, Some(255));
    assert_eq!(raster.crs, CrsCode::from_epsg(31982).unwrap());

    let (min_x, min_y, max_x, max_y) = fixture.bounds();
    assert_eq!(raster.bounds, BoundingBox::new(min_x, min_y, max_x, max_y));
}

#[test]
fn test_missing_nodata_defaults_to_255() {
    let dir = temp_test_dir();
    let path = dir.path().join("classified_2020.tif");
    write_class_geotiff(&path, &ClassRasterFixture::basin().with_nodata(None));

    let raster = read_classified_raster(&path).unwrap();
    assert_eq!(raster.nodata, None);
    assert_eq!(raster.nodata_or_default(), 255);
}

#[test]
fn test_declared_nodata_is_used() {
    let dir = temp_test_dir();
    let path = dir.path().join("classified_2020.tif");
    write_class_geotiff(&path, &ClassRasterFixture::basin().with_nodata(Some("0")));

    let raster = read_classified_raster(&path).unwrap();
    assert_eq!(raster.nodata_or_default(), 0);
}

#[test]
fn test_raster_without_geokeys_is_wgs84() {
    let dir = temp_test_dir();
    let path = dir.path().join("classified_2020.tif");
    let mut fixture = ClassRasterFixture::basin().with_epsg(None);
    fixture.origin = (-53.5, -27.2);
    fixture.pixel_size = 0.001;
    write_class_geotiff(&path, &fixture);

    let raster = read_classified_raster(&path).unwrap();
    assert_eq!(raster.crs, CrsCode::Epsg4326);
    assert!((raster.bounds.min_x + 53.5).abs() < 1e-12);
}

#[test]
fn test_unsupported_rasters_are_rejected() {
    let dir = temp_test_dir();

    let rgb = dir.path().join("rgb.tif");
    write_rgb_tiff(&rgb, 4, 4);
    assert!(matches!(
        read_classified_raster(&rgb),
        Err(IngestionError::UnsupportedRaster { .. })
    ));

    let unknown_crs = dir.path().join("bng.tif");
    write_class_geotiff(&unknown_crs, &ClassRasterFixture::basin().with_epsg(Some(27700)));
    assert!(matches!(
        read_classified_raster(&unknown_crs),
        Err(IngestionError::UnsupportedRaster { .. })
    ));

    let garbage = dir.path().join("garbage.tif");
    std::fs::write(&garbage, b"not a tiff").unwrap();
    assert!(matches!(
        read_classified_raster(&garbage),
        Err(IngestionError::TiffDecode { .. })
    ));
}

#[test]
fn test_catalog_over_fixture_layout() {
    let inputs = DashboardInputs::basin();
    let catalog = RasterCatalog::scan(&inputs.map_dir).unwrap();
    assert_eq!(catalog.years(), vec![2019, 2020, 2021]);

    let raster = read_classified_raster(catalog.path_for(2021).unwrap()).unwrap();
    assert_eq!(raster.width, 8);
}
