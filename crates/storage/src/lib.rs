//! In-process storage for the land-cover dashboard.
//!
//! Provides [`SourceCache`], the application-owned cache of tables loaded
//! from the upstream pipeline's output files.

pub mod source_cache;

pub use source_cache::{SourceCache, SourceCacheStats};
