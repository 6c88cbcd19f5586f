//! End-to-end tests for class raster overlays: colorize, encode, wrap.

use landcover_common::{ClassEntry, ClassMapping, Rgb};
use renderer::png::PNG_SIGNATURE;
use renderer::{decode_png_data_uri, render_class_overlay, ClassGrid, colorize_classes};

fn basin_grid() -> (Vec<i32>, usize, usize) {
    // 4x3: a river of water, forest banks, one planted patch, no-data corner
    let values = vec![
        1, 0, 0, 1, //
        1, 0, 2, 3, //
        255, 0, 5, 4, //
    ];
    (values, 4, 3)
}

#[test]
fn test_overlay_is_png_data_uri() {
    let (values, width, height) = basin_grid();
    let grid = ClassGrid::new(&values, width, height, None);
    let uri = render_class_overlay(&grid, &ClassMapping::default()).unwrap();

    assert!(uri.starts_with("data:image/png;base64,"));
    let png = decode_png_data_uri(&uri).unwrap();
    assert_eq!(&png[..8], &PNG_SIGNATURE);
    // IHDR follows the signature: length(4) + "IHDR"(4) + width + height
    assert_eq!(&png[12..16], b"IHDR");
    assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 4);
    assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 3);
}

#[test]
fn test_every_class_pixel_gets_its_color() {
    let (values, width, height) = basin_grid();
    let mapping = ClassMapping::default();
    let grid = ClassGrid::new(&values, width, height, None);
    let rgba = colorize_classes(&grid, &mapping).unwrap();

    for (idx, value) in values.iter().enumerate() {
        let px = &rgba[idx * 4..idx * 4 + 4];
        if *value == 255 {
            assert_eq!(px[3], 0, "no-data pixel {} must be transparent", idx);
            continue;
        }
        let color = mapping.color_of(*value as u16);
        assert_eq!(px, &[color.r, color.g, color.b, 255], "pixel {}", idx);
    }
}

#[test]
fn test_declared_nodata_replaces_default() {
    // With no-data declared as 0, 255 is just an unknown value
    let values = [0, 255, 1];
    let grid = ClassGrid::new(&values, 3, 1, Some(0));
    let rgba = colorize_classes(&grid, &ClassMapping::default()).unwrap();
    assert_eq!(rgba[3], 0);
    assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
    assert_eq!(rgba[11], 255);
}

#[test]
fn test_custom_mapping_overrides_table() {
    let mapping = ClassMapping::new(vec![ClassEntry::new(7, "Urbano", Some(Rgb::new(200, 10, 10)))]);
    let values = [7, 0];
    let grid = ClassGrid::new(&values, 2, 1, None);
    let rgba = colorize_classes(&grid, &mapping).unwrap();
    assert_eq!(&rgba[0..4], &[200, 10, 10, 255]);
    // Class 0 is not in this mapping
    assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
}

#[test]
fn test_all_nodata_raster_still_encodes() {
    let values = vec![255; 9];
    let grid = ClassGrid::new(&values, 3, 3, None);
    let uri = render_class_overlay(&grid, &ClassMapping::default()).unwrap();
    assert!(decode_png_data_uri(&uri).is_some());
}
