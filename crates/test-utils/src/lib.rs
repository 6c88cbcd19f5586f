//! Shared test utilities for the land-cover dashboard workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary directories for generated inputs
//! - Class grid generators
//! - Writers for GeoTIFF, CSV, GeoJSON and shapefile inputs shaped like the
//!   upstream pipeline's outputs
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{DashboardInputs, write_class_geotiff};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;
