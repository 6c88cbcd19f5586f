//! Year-indexed catalog of classified rasters on disk.

use landcover_common::Year;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};
use crate::metadata::{detect_file_type, extract_raster_year, FileType};

/// Mapping from year to classified raster path.
#[derive(Debug, Clone)]
pub struct RasterCatalog {
    dir: PathBuf,
    entries: BTreeMap<Year, PathBuf>,
}

impl RasterCatalog {
    /// Scan `dir` for GeoTIFFs named with a 4-digit year.
    ///
    /// Files are visited in filename order, so when two files carry the same
    /// year the later name wins. Files without a year are skipped.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read_dir = match std::fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IngestionError::RasterDirNotFound(dir.to_path_buf()));
            }
            Err(e) => return Err(IngestionError::file_read(dir, e)),
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| IngestionError::file_read(dir, e))?;
            let path = entry.path();
            if path.is_file() && detect_file_type(&path) == FileType::GeoTiff {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut entries = BTreeMap::new();
        for path in files {
            match extract_raster_year(&path) {
                Some(year) => {
                    if let Some(previous) = entries.insert(year, path.clone()) {
                        debug!(
                            year,
                            replaced = %previous.display(),
                            path = %path.display(),
                            "Duplicate raster year"
                        );
                    }
                }
                None => warn!(path = %path.display(), "Skipping raster without a year in its name"),
            }
        }

        if entries.is_empty() {
            return Err(IngestionError::NoRasters(dir.to_path_buf()));
        }

        info!(
            dir = %dir.display(),
            count = entries.len(),
            first = entries.keys().next().copied(),
            last = entries.keys().next_back().copied(),
            "Scanned classified rasters"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Years with a raster, ascending.
    pub fn years(&self) -> Vec<Year> {
        self.entries.keys().copied().collect()
    }

    pub fn contains(&self, year: Year) -> bool {
        self.entries.contains_key(&year)
    }

    pub fn path_for(&self, year: Year) -> Option<&Path> {
        self.entries.get(&year).map(PathBuf::as_path)
    }

    pub fn first_year(&self) -> Option<Year> {
        self.entries.keys().next().copied()
    }

    pub fn latest_year(&self) -> Option<Year> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_scan_orders_years() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "classified_2021.tif");
        touch(tmp.path(), "classified_2019.tif");
        touch(tmp.path(), "classified_2020.tif");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "classified.tif");

        let catalog = RasterCatalog::scan(tmp.path()).unwrap();
        assert_eq!(catalog.years(), vec![2019, 2020, 2021]);
        assert_eq!(catalog.first_year(), Some(2019));
        assert_eq!(catalog.latest_year(), Some(2021));
        assert_eq!(
            catalog.path_for(2020),
            Some(tmp.path().join("classified_2020.tif").as_path())
        );
        assert!(catalog.path_for(2018).is_none());
    }

    #[test]
    fn test_later_filename_wins_for_same_year() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a_2020.tif");
        touch(tmp.path(), "b_2020.tif");

        let catalog = RasterCatalog::scan(tmp.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.path_for(2020), Some(tmp.path().join("b_2020.tif").as_path()));
    }

    #[test]
    fn test_missing_and_empty_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("maps");
        assert!(matches!(
            RasterCatalog::scan(&missing),
            Err(IngestionError::RasterDirNotFound(_))
        ));

        touch(tmp.path(), "readme.md");
        assert!(matches!(
            RasterCatalog::scan(tmp.path()),
            Err(IngestionError::NoRasters(_))
        ));
    }
}
