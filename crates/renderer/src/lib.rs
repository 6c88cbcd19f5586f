//! Image rendering for classified land-cover rasters.
//!
//! - Class-id → RGBA colorization with no-data masking
//! - PNG encoding (indexed or RGBA)
//! - Base64 data URIs for inline map overlays

pub mod classified;
pub mod data_uri;
pub mod png;

pub use classified::{colorize_classes, render_class_overlay, render_class_png, ClassGrid, DEFAULT_NODATA};
pub use data_uri::{decode_png_data_uri, png_data_uri};

use thiserror::Error;

/// Errors raised while producing an overlay image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Buffer size mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
