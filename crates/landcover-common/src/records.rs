//! Tabular records loaded from the upstream area and metrics CSVs.

use serde::Serialize;
use std::collections::BTreeMap;

/// Calendar year of a classification.
pub type Year = i32;

/// Hectares per square kilometer.
const HECTARES_PER_KM2: f64 = 100.0;

/// Area of one class in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRecord {
    pub year: Year,
    pub class: String,
    pub area_ha: f64,
}

impl AreaRecord {
    pub fn new(year: Year, class: impl Into<String>, area_ha: f64) -> Self {
        Self {
            year,
            class: class.into(),
            area_ha,
        }
    }

    pub fn area_km2(&self) -> f64 {
        self.area_ha / HECTARES_PER_KM2
    }
}

/// All area records, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaTable {
    records: Vec<AreaRecord>,
}

impl AreaTable {
    pub fn new(records: Vec<AreaRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AreaRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<Year> {
        let mut years: Vec<Year> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Quality metrics of one class in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub year: Year,
    pub class: String,
    pub values: BTreeMap<String, f64>,
}

impl MetricRecord {
    pub fn new(year: Year, class: impl Into<String>) -> Self {
        Self {
            year,
            class: class.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.values.insert(metric.into(), value);
        self
    }

    /// Numeric value of a metric, `None` when the cell was empty or non-numeric.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Metric records concatenated across all yearly files.
///
/// `columns` is the union of metric column names in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    columns: Vec<String>,
    records: Vec<MetricRecord>,
}

impl MetricTable {
    pub fn new(columns: Vec<String>, records: Vec<MetricRecord>) -> Self {
        Self { columns, records }
    }

    /// Append another table, extending the column union.
    pub fn extend(&mut self, other: MetricTable) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.records.extend(other.records);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records of one year, in file order.
    pub fn for_year(&self, year: Year) -> impl Iterator<Item = &MetricRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_conversion_is_exact() {
        let record = AreaRecord::new(2020, "Água", 1000.0);
        assert_eq!(record.area_km2(), 10.0);
        for ha in [0.0, 1.0, 12.5, 98765.4321] {
            assert_eq!(AreaRecord::new(2020, "x", ha).area_km2(), ha / 100.0);
        }
    }

    #[test]
    fn test_metric_table_extend_unions_columns() {
        let mut table = MetricTable::new(
            vec!["precision".into(), "f1-score".into()],
            vec![MetricRecord::new(2019, "Água").with_value("f1-score", 0.9)],
        );
        table.extend(MetricTable::new(
            vec!["f1-score".into(), "support".into()],
            vec![MetricRecord::new(2020, "Água").with_value("support", 10.0)],
        ));

        assert_eq!(table.columns(), &["precision", "f1-score", "support"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.for_year(2020).count(), 1);
        assert_eq!(table.records()[1].get("f1-score"), None);
    }

    #[test]
    fn test_area_years() {
        let table = AreaTable::new(vec![
            AreaRecord::new(2021, "a", 1.0),
            AreaRecord::new(2019, "a", 1.0),
            AreaRecord::new(2021, "b", 1.0),
        ]);
        assert_eq!(table.years(), vec![2019, 2021]);
    }
}
