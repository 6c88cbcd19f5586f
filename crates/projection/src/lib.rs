//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.

pub mod mercator;
pub mod transform;
pub mod transverse_mercator;

pub use transform::{transform_bounds, transform_point, Projection, ProjectionError};
pub use transverse_mercator::TransverseMercator;
