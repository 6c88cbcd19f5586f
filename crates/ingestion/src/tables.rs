//! Loaders for the area-by-class table and the per-year metrics tables.
//!
//! Header names follow the upstream scripts (Portuguese) with English
//! aliases accepted. Class columns may hold names or raw class ids; ids are
//! translated through the [`ClassMapping`] when every value in a file is an
//! integer.

use landcover_common::{AreaRecord, AreaTable, ClassMapping, MetricRecord, MetricTable, Year};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};
use crate::metadata::{detect_file_type, extract_metrics_year, FileType};

const YEAR_COLUMNS: &[&str] = &["Ano", "Year"];
const CLASS_COLUMNS: &[&str] = &["Classe", "Class"];
const HECTARE_COLUMNS: &[&str] = &["Área_ha", "Area_ha", "area_ha"];

/// Load the area-by-class CSV.
pub fn load_area_table(path: &Path, mapping: &ClassMapping) -> Result<AreaTable> {
    if !path.is_file() {
        return Err(IngestionError::AreaCsvNotFound(path.to_path_buf()));
    }

    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;
    if headers.is_empty() {
        return Err(IngestionError::EmptyAreaCsv(path.to_path_buf()));
    }

    let year_idx = require_column(&headers, YEAR_COLUMNS, path)?;
    let class_idx = require_column(&headers, CLASS_COLUMNS, path)?;
    let area_idx = require_column(&headers, HECTARE_COLUMNS, path)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IngestionError::csv(path, e))?;
        let line = record.position().map_or(idx as u64 + 2, |p| p.line());
        if record.iter().all(str::is_empty) {
            continue;
        }

        let year = parse_year(record.get(year_idx).unwrap_or(""))
            .ok_or_else(|| cell_error(path, line, &headers[year_idx], record.get(year_idx)))?;
        let area_ha = record
            .get(area_idx)
            .and_then(parse_number)
            .ok_or_else(|| cell_error(path, line, &headers[area_idx], record.get(area_idx)))?;
        let class = record.get(class_idx).unwrap_or("").to_string();
        rows.push(AreaRecord::new(year, class, area_ha));
    }

    if rows.is_empty() {
        return Err(IngestionError::EmptyAreaCsv(path.to_path_buf()));
    }

    translate_class_ids(rows.iter_mut().map(|r| &mut r.class), mapping);

    let table = AreaTable::new(rows);
    info!(
        path = %path.display(),
        rows = table.len(),
        years = table.years().len(),
        "Loaded area table"
    );
    Ok(table)
}

/// Load and concatenate every per-year metrics CSV in `dir`.
///
/// A missing directory yields an empty table.
pub fn load_metric_table(dir: &Path, mapping: &ClassMapping) -> Result<MetricTable> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "Metrics directory not found");
            return Ok(MetricTable::default());
        }
        Err(e) => return Err(IngestionError::file_read(dir, e)),
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in read_dir {
        let path = entry.map_err(|e| IngestionError::file_read(dir, e))?.path();
        if path.is_file() && detect_file_type(&path) == FileType::Csv {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut table = MetricTable::default();
    for path in &files {
        let year = extract_metrics_year(path).ok_or_else(|| {
            IngestionError::invalid_table(path, "file name does not end with _<year>")
        })?;
        table.extend(load_metric_file(path, year, mapping)?);
    }

    info!(
        dir = %dir.display(),
        files = files.len(),
        rows = table.len(),
        columns = ?table.columns(),
        "Loaded metrics"
    );
    Ok(table)
}

/// Load one metrics CSV, tagging every row with `year`.
fn load_metric_file(path: &Path, year: Year, mapping: &ClassMapping) -> Result<MetricTable> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;
    let class_idx = require_column(&headers, CLASS_COLUMNS, path)?;

    // Every other named column is a metric; a stray year column is replaced
    // by the year from the file name.
    let metric_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| {
            *idx != class_idx && !name.is_empty() && !YEAR_COLUMNS.contains(&name.as_str())
        })
        .map(|(idx, name)| (idx, name.clone()))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestionError::csv(path, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut row = MetricRecord::new(year, record.get(class_idx).unwrap_or(""));
        for (idx, name) in &metric_columns {
            if let Some(value) = record.get(*idx).and_then(parse_number) {
                row.values.insert(name.clone(), value);
            }
        }
        rows.push(row);
    }

    translate_class_ids(rows.iter_mut().map(|r| &mut r.class), mapping);

    debug!(path = %path.display(), year, rows = rows.len(), "Loaded metrics file");
    Ok(MetricTable::new(
        metric_columns.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}

fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestionError::csv(path, e))
}

fn read_headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<Vec<String>> {
    let headers = reader.headers().map_err(|e| IngestionError::csv(path, e))?;
    Ok(headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect())
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn require_column(headers: &[String], aliases: &[&str], path: &Path) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| {
        IngestionError::invalid_table(path, format!("missing column {}", aliases.join(" / ")))
    })
}

fn cell_error(path: &Path, line: u64, column: &str, value: Option<&str>) -> IngestionError {
    IngestionError::invalid_table(
        path,
        format!(
            "line {}: invalid {} value {:?}",
            line,
            column,
            value.unwrap_or("")
        ),
    )
}

/// Years may be written as floats by spreadsheet tools (`2020.0`).
fn parse_year(raw: &str) -> Option<Year> {
    let raw = raw.trim();
    raw.parse::<Year>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && v.abs() < 1e6)
            .map(|v| v as Year)
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Replace raw class ids with names when every label in the column is an
/// integer. Mixed columns are left untouched.
fn translate_class_ids<'a>(labels: impl Iterator<Item = &'a mut String>, mapping: &ClassMapping) {
    let mut labels: Vec<&mut String> = labels.collect();
    let all_ids = !labels.is_empty() && labels.iter().all(|l| l.trim().parse::<i64>().is_ok());
    if !all_ids {
        return;
    }
    for label in labels.iter_mut() {
        let name = mapping.label_for_id(label);
        **label = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 2020.0 "), Some(2020));
        assert_eq!(parse_year("2020.5"), None);
        assert_eq!(parse_year("vinte"), None);
    }

    #[test]
    fn test_translate_ids_only_when_all_numeric() {
        let mapping = ClassMapping::default();

        let mut ids = vec!["0".to_string(), "5".to_string(), "9".to_string()];
        translate_class_ids(ids.iter_mut(), &mapping);
        assert_eq!(ids, vec!["Água", "Solo Exposto", "9"]);

        let mut mixed = vec!["0".to_string(), "macro avg".to_string()];
        translate_class_ids(mixed.iter_mut(), &mapping);
        assert_eq!(mixed, vec!["0", "macro avg"]);
    }

    #[test]
    fn test_area_table_with_english_headers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("area.csv");
        fs::write(&path, "Year,Class,Area_ha\n2020,0,1000\n2020,1,250.5\n").unwrap();

        let table = load_area_table(&path, &ClassMapping::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].class, "Água");
        assert_eq!(table.records()[1].area_ha, 250.5);
    }

    #[test]
    fn test_area_table_reports_bad_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("area.csv");
        fs::write(&path, "Ano,Classe,Área_ha\n2020,Água,10\n2021,Água,muito\n").unwrap();

        let err = load_area_table(&path, &ClassMapping::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("Área_ha"), "{}", message);
    }

    #[test]
    fn test_metrics_file_skips_year_and_blank_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("metrics_2020.csv");
        fs::write(
            &path,
            ",Classe,precision,f1-score,support,Ano\n0,Água,0.9,0.8,10,1999\n1,Floresta Nativa,0.7,,5,1999\n",
        )
        .unwrap();

        let table = load_metric_file(&path, 2020, &ClassMapping::default()).unwrap();
        assert_eq!(table.columns(), &["precision", "f1-score", "support"]);
        assert_eq!(table.records()[0].year, 2020);
        assert_eq!(table.records()[0].get("f1-score"), Some(0.8));
        assert_eq!(table.records()[1].get("f1-score"), None);
    }
}
