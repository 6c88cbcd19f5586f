//! Class-id raster → RGBA overlay.
//!
//! Each known class is painted with its table color at full opacity, then
//! every no-data pixel has its alpha cleared. Pixels that match neither stay
//! transparent black.

use landcover_common::ClassMapping;
use rayon::prelude::*;
use tracing::debug;

use crate::data_uri::png_data_uri;
use crate::png::create_png_auto;
use crate::RenderError;

/// No-data value assumed when the raster does not declare one.
pub const DEFAULT_NODATA: i32 = 255;

/// A borrowed class-id grid in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct ClassGrid<'a> {
    pub values: &'a [i32],
    pub width: usize,
    pub height: usize,
    pub nodata: i32,
}

impl<'a> ClassGrid<'a> {
    pub fn new(values: &'a [i32], width: usize, height: usize, nodata: Option<i32>) -> Self {
        Self {
            values,
            width,
            height,
            nodata: nodata.unwrap_or(DEFAULT_NODATA),
        }
    }

    fn check(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage);
        }
        if self.values.len() != self.width * self.height {
            return Err(RenderError::DimensionMismatch {
                expected: self.width * self.height,
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}

/// Map class ids to an RGBA buffer (4 bytes per pixel).
pub fn colorize_classes(grid: &ClassGrid<'_>, mapping: &ClassMapping) -> Result<Vec<u8>, RenderError> {
    grid.check()?;
    let mut rgba = vec![0u8; grid.width * grid.height * 4];

    // Ascending id order; ids are distinct so each pixel is painted at most once
    for entry in mapping.entries() {
        let id = i32::from(entry.id);
        let color = entry.display_color();
        let pixel = [color.r, color.g, color.b, 255];

        rgba.par_chunks_exact_mut(4)
            .zip(grid.values.par_iter())
            .filter(|(_, value)| **value == id)
            .for_each(|(out, _)| out.copy_from_slice(&pixel));
    }

    // No-data wins over any class color
    let nodata = grid.nodata;
    rgba.par_chunks_exact_mut(4)
        .zip(grid.values.par_iter())
        .filter(|(_, value)| **value == nodata)
        .for_each(|(out, _)| out[3] = 0);

    Ok(rgba)
}

/// Colorize a class grid and encode it as a PNG.
pub fn render_class_png(grid: &ClassGrid<'_>, mapping: &ClassMapping) -> Result<Vec<u8>, RenderError> {
    let rgba = colorize_classes(grid, mapping)?;
    let png = create_png_auto(&rgba, grid.width, grid.height)?;
    debug!(
        width = grid.width,
        height = grid.height,
        nodata = grid.nodata,
        bytes = png.len(),
        "Encoded class overlay"
    );
    Ok(png)
}

/// Colorize a class grid and return it as a `data:image/png;base64,` URI.
pub fn render_class_overlay(grid: &ClassGrid<'_>, mapping: &ClassMapping) -> Result<String, RenderError> {
    render_class_png(grid, mapping).map(|png| png_data_uri(&png))
}
