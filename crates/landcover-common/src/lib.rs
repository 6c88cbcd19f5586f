//! Common types shared across the land-cover dashboard crates.

pub mod bbox;
pub mod classes;
pub mod crs;
pub mod error;
pub mod records;

pub use bbox::BoundingBox;
pub use classes::{ClassEntry, ClassMapping, Rgb, DEFAULT_CLASS_COLOR};
pub use crs::CrsCode;
pub use error::{DashboardError, DashboardResult, ErrorKind};
pub use records::{AreaRecord, AreaTable, MetricRecord, MetricTable, Year};
