//! Statistics derived from the area and metrics tables.
//!
//! Everything here is a pure function of the loaded tables, so the panel
//! handlers only pick a year and serialize the result.

use landcover_common::{AreaTable, ClassMapping, DashboardError, MetricTable, Year};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Column holding the class label in exported tables.
pub const CLASS_COLUMN: &str = "Classe";
/// Column holding the area in exported tables.
pub const AREA_KM2_COLUMN: &str = "Área_km2";

const F1_COLUMN: &str = "f1-score";
const SUPPORT_COLUMN: &str = "support";

/// Pick `requested` when it is one of `available`, else `default`.
pub fn resolve_year(requested: Option<Year>, available: &[Year], default: Year) -> Year {
    match requested {
        Some(year) if available.contains(&year) => year,
        _ => default,
    }
}

/// One row of the per-year area table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    pub class: String,
    pub area_km2: f64,
}

/// Area rows of one year in class-table order.
pub fn area_for_year(table: &AreaTable, year: Year, mapping: &ClassMapping) -> Vec<AreaRow> {
    let mut rows: Vec<AreaRow> = table
        .records()
        .iter()
        .filter(|r| r.year == year)
        .map(|r| AreaRow {
            class: r.class.clone(),
            area_km2: r.area_km2(),
        })
        .collect();
    rows.sort_by(|a, b| mapping.sort_key(&a.class).cmp(&mapping.sort_key(&b.class)));
    rows
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total classified area per year, ascending.
pub fn total_area_by_year(table: &AreaTable) -> Vec<(Year, f64)> {
    let mut totals: BTreeMap<Year, f64> = BTreeMap::new();
    for record in table.records() {
        *totals.entry(record.year).or_insert(0.0) += record.area_km2();
    }
    totals.into_iter().collect()
}

/// Year x class matrix of areas in km².
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPivot {
    /// Column labels in class-table order
    pub classes: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub year: Year,
    /// One value per entry of [`AreaPivot::classes`]
    pub values: Vec<f64>,
}

impl AreaPivot {
    /// Values of one class across all years.
    pub fn series(&self, class_idx: usize) -> Vec<(Year, f64)> {
        self.rows
            .iter()
            .map(|row| (row.year, row.values[class_idx]))
            .collect()
    }
}

/// Pivot the area table to one row per year and one column per class.
///
/// Missing (year, class) combinations are 0; duplicated ones take the mean.
pub fn area_pivot(table: &AreaTable, mapping: &ClassMapping) -> AreaPivot {
    let mut cells: BTreeMap<(Year, &str), (f64, usize)> = BTreeMap::new();
    let mut years = BTreeSet::new();
    let mut classes: Vec<&str> = Vec::new();

    for record in table.records() {
        years.insert(record.year);
        if !classes.contains(&record.class.as_str()) {
            classes.push(&record.class);
        }
        let cell = cells
            .entry((record.year, record.class.as_str()))
            .or_insert((0.0, 0));
        cell.0 += record.area_km2();
        cell.1 += 1;
    }
    classes.sort_by(|a, b| mapping.sort_key(a).cmp(&mapping.sort_key(b)));

    let rows = years
        .into_iter()
        .map(|year| PivotRow {
            year,
            values: classes
                .iter()
                .map(|class| match cells.get(&(year, *class)) {
                    Some((sum, count)) => sum / *count as f64,
                    None => 0.0,
                })
                .collect(),
        })
        .collect();

    AreaPivot {
        classes: classes.into_iter().map(str::to_string).collect(),
        rows,
    }
}

/// Unweighted mean f1-score per year, ascending.
///
/// `None` unless both the `f1-score` and `support` columns exist. A year
/// whose rows carry no numeric f1-score yields a gap.
pub fn mean_f1_by_year(metrics: &MetricTable) -> Option<Vec<(Year, Option<f64>)>> {
    if !metrics.has_column(F1_COLUMN) || !metrics.has_column(SUPPORT_COLUMN) {
        return None;
    }

    let mut sums: BTreeMap<Year, (f64, usize)> = BTreeMap::new();
    for record in metrics.records() {
        let entry = sums.entry(record.year).or_insert((0.0, 0));
        if let Some(f1) = record.get(F1_COLUMN) {
            entry.0 += f1;
            entry.1 += 1;
        }
    }

    Some(
        sums.into_iter()
            .map(|(year, (sum, count))| (year, (count > 0).then(|| sum / count as f64)))
            .collect(),
    )
}

/// Metrics of one year as displayed: class label then every metric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub year: Year,
    pub columns: Vec<String>,
    pub rows: Vec<MetricsRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub class: String,
    /// One value per metric column; `None` for empty cells
    pub values: Vec<Option<f64>>,
}

impl MetricsView {
    /// f1-score per class in row order, when the column exists.
    pub fn f1_by_class(&self) -> Option<Vec<(String, Option<f64>)>> {
        let idx = self.columns.iter().position(|c| c == F1_COLUMN)?;
        Some(
            self.rows
                .iter()
                .map(|row| (row.class.clone(), row.values[idx]))
                .collect(),
        )
    }
}

/// Rows of one year in file order, or `None` when the year has none.
pub fn metrics_for_year(metrics: &MetricTable, year: Year) -> Option<MetricsView> {
    let columns = metrics.columns().to_vec();
    let rows: Vec<MetricsRow> = metrics
        .for_year(year)
        .map(|record| MetricsRow {
            class: record.class.clone(),
            values: columns.iter().map(|c| record.get(c)).collect(),
        })
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(MetricsView {
        year,
        columns,
        rows,
    })
}

/// Download filename of the area table.
pub fn area_csv_filename(year: Year) -> String {
    format!("area_por_classe_{}.csv", year)
}

/// Download filename of the metrics table.
pub fn metrics_csv_filename(year: Year) -> String {
    format!("metricas_{}.csv", year)
}

/// Serialize area rows as `Classe,Área_km2` with two decimals.
pub fn area_csv(rows: &[AreaRow]) -> Result<String, DashboardError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([CLASS_COLUMN, AREA_KM2_COLUMN]).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([row.class.clone(), format!("{:.2}", row.area_km2)])
            .map_err(csv_error)?;
    }
    finish_csv(writer)
}

/// Serialize a metrics view with the same columns the page displays.
pub fn metrics_csv(view: &MetricsView) -> Result<String, DashboardError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![CLASS_COLUMN.to_string()];
    header.extend(view.columns.iter().cloned());
    writer.write_record(&header).map_err(csv_error)?;

    for row in &view.rows {
        let mut record = vec![row.class.clone()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record).map_err(csv_error)?;
    }
    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, DashboardError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Internal(e.to_string()))
}

fn csv_error(err: csv::Error) -> DashboardError {
    DashboardError::Internal(format!("CSV write failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use landcover_common::{AreaRecord, MetricRecord};

    fn areas() -> AreaTable {
        AreaTable::new(vec![
            AreaRecord::new(2020, "Solo Exposto", 500.0),
            AreaRecord::new(2020, "Água", 1000.0),
            AreaRecord::new(2020, "Pastagem", 200.0),
            AreaRecord::new(2019, "Água", 900.0),
            AreaRecord::new(2019, "Floresta Nativa", 5000.0),
        ])
    }

    #[test]
    fn test_resolve_year_falls_back_to_default() {
        let years = [2019, 2020, 2021];
        assert_eq!(resolve_year(Some(2020), &years, 2021), 2020);
        assert_eq!(resolve_year(Some(1999), &years, 2021), 2021);
        assert_eq!(resolve_year(None, &years, 2019), 2019);
    }

    #[test]
    fn test_area_for_year_in_class_order() {
        let rows = area_for_year(&areas(), 2020, &ClassMapping::default());
        let classes: Vec<&str> = rows.iter().map(|r| r.class.as_str()).collect();
        // Unknown classes sort after the table
        assert_eq!(classes, vec!["Água", "Solo Exposto", "Pastagem"]);
        assert_eq!(rows[0].area_km2, 10.0);
    }

    #[test]
    fn test_area_for_missing_year_is_empty() {
        assert!(area_for_year(&areas(), 2030, &ClassMapping::default()).is_empty());
    }

    #[test]
    fn test_total_area_by_year() {
        let totals = total_area_by_year(&areas());
        assert_eq!(totals, vec![(2019, 59.0), (2020, 17.0)]);
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let pivot = area_pivot(&areas(), &ClassMapping::default());
        assert_eq!(
            pivot.classes,
            vec!["Água", "Floresta Nativa", "Solo Exposto", "Pastagem"]
        );
        assert_eq!(pivot.rows.len(), 2);
        assert_eq!(pivot.rows[0].year, 2019);
        assert_eq!(pivot.rows[0].values, vec![9.0, 50.0, 0.0, 0.0]);
        assert_eq!(pivot.rows[1].values, vec![10.0, 0.0, 5.0, 2.0]);
        assert_eq!(pivot.series(1), vec![(2019, 50.0), (2020, 0.0)]);
    }

    #[test]
    fn test_pivot_averages_duplicates() {
        let table = AreaTable::new(vec![
            AreaRecord::new(2020, "Água", 1000.0),
            AreaRecord::new(2020, "Água", 3000.0),
        ]);
        let pivot = area_pivot(&table, &ClassMapping::default());
        assert_eq!(pivot.rows[0].values, vec![20.0]);
    }

    fn metric_table(columns: &[&str], records: Vec<MetricRecord>) -> MetricTable {
        MetricTable::new(columns.iter().map(|c| c.to_string()).collect(), records)
    }

    #[test]
    fn test_mean_f1_is_unweighted() {
        let table = metric_table(
            &["precision", "f1-score", "support"],
            vec![
                MetricRecord::new(2019, "Água")
                    .with_value("f1-score", 0.6)
                    .with_value("support", 1000.0),
                MetricRecord::new(2019, "Solo Exposto")
                    .with_value("f1-score", 1.0)
                    .with_value("support", 1.0),
                MetricRecord::new(2020, "Água").with_value("support", 5.0),
            ],
        );
        let means = mean_f1_by_year(&table).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].0, 2019);
        assert!((means[0].1.unwrap() - 0.8).abs() < 1e-12);
        // No numeric f1 in 2020
        assert_eq!(means[1], (2020, None));
    }

    #[test]
    fn test_mean_f1_requires_support_column() {
        let table = metric_table(
            &["f1-score"],
            vec![MetricRecord::new(2019, "Água").with_value("f1-score", 0.5)],
        );
        assert!(mean_f1_by_year(&table).is_none());
    }

    #[test]
    fn test_metrics_for_year() {
        let table = metric_table(
            &["precision", "f1-score", "support"],
            vec![
                MetricRecord::new(2019, "Água")
                    .with_value("precision", 0.9)
                    .with_value("f1-score", 0.85)
                    .with_value("support", 12.0),
                MetricRecord::new(2020, "Água").with_value("f1-score", 0.7),
                MetricRecord::new(2019, "Agricultura").with_value("support", 3.0),
            ],
        );

        let view = metrics_for_year(&table, 2019).unwrap();
        assert_eq!(view.columns, vec!["precision", "f1-score", "support"]);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].values, vec![None, None, Some(3.0)]);
        assert_eq!(
            view.f1_by_class().unwrap(),
            vec![("Água".to_string(), Some(0.85)), ("Agricultura".to_string(), None)]
        );

        assert!(metrics_for_year(&table, 2021).is_none());
    }

    #[test]
    fn test_area_csv_format() {
        let rows = vec![
            AreaRow {
                class: "Água".into(),
                area_km2: 10.0,
            },
            AreaRow {
                class: "Floresta Nativa".into(),
                area_km2: 520.456,
            },
        ];
        let csv = area_csv(&rows).unwrap();
        assert_eq!(csv, "Classe,Área_km2\nÁgua,10.00\nFloresta Nativa,520.46\n");
    }

    #[test]
    fn test_metrics_csv_drops_year() {
        let table = metric_table(
            &["precision", "f1-score"],
            vec![MetricRecord::new(2019, "Água")
                .with_value("precision", 0.9)
                .with_value("f1-score", 0.5)],
        );
        let view = metrics_for_year(&table, 2019).unwrap();
        let csv = metrics_csv(&view).unwrap();
        assert_eq!(csv, "Classe,precision,f1-score\nÁgua,0.9,0.5\n");
    }

    #[test]
    fn test_filenames() {
        assert_eq!(area_csv_filename(2020), "area_por_classe_2020.csv");
        assert_eq!(metrics_csv_filename(2019), "metricas_2019.csv");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(10.0), 10.0);
    }
}
