//! Scratch directories for generated inputs.

/// A fresh temporary directory, removed when the returned `TempDir` drops.
pub fn temp_test_dir() -> tempfile::TempDir {
    temp_test_dir_with_prefix("landcover-test")
}

/// Like [`temp_test_dir`], with a recognizable name prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
