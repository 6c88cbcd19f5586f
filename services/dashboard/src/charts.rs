//! Plotly figure JSON for the dashboard panels.
//!
//! Each builder returns a `{data, layout}` object the page passes straight to
//! `Plotly.react`.

use landcover_common::{ClassMapping, Year};
use serde_json::{json, Value};

use crate::presenter::{AreaPivot, AreaRow, MetricsView};

const AREA_AXIS: &str = "Area (km²)";

/// Bar chart of area per class for one year, one color per class.
pub fn area_bar_chart(rows: &[AreaRow], year: Year, mapping: &ClassMapping) -> Value {
    let classes: Vec<&str> = rows.iter().map(|r| r.class.as_str()).collect();
    let areas: Vec<f64> = rows.iter().map(|r| r.area_km2).collect();
    let colors: Vec<String> = classes
        .iter()
        .map(|c| mapping.color_for_name(c).to_hex())
        .collect();

    json!({
        "data": [{
            "type": "bar",
            "x": classes,
            "y": areas,
            "marker": { "color": colors },
            "hovertemplate": "%{x}: %{y:.2f} km²<extra></extra>",
        }],
        "layout": {
            "title": { "text": format!("Area by class - {}", year) },
            "xaxis": { "title": { "text": "Class" }, "categoryorder": "array", "categoryarray": classes },
            "yaxis": { "title": { "text": AREA_AXIS } },
            "showlegend": false,
        },
    })
}

/// Line chart of the total classified area per year.
pub fn total_area_chart(totals: &[(Year, f64)]) -> Value {
    let (years, areas): (Vec<Year>, Vec<f64>) = totals.iter().copied().unzip();
    json!({
        "data": [{
            "type": "scatter",
            "mode": "lines+markers",
            "x": years,
            "y": areas,
            "name": "Total",
        }],
        "layout": {
            "title": { "text": "Total classified area by year" },
            "xaxis": { "title": { "text": "Year" }, "dtick": 1 },
            "yaxis": { "title": { "text": "Total area (km²)" } },
        },
    })
}

/// One line per class across years, with a shared hover label.
pub fn class_area_chart(pivot: &AreaPivot, mapping: &ClassMapping) -> Value {
    let years: Vec<Year> = pivot.rows.iter().map(|r| r.year).collect();
    let traces: Vec<Value> = pivot
        .classes
        .iter()
        .enumerate()
        .map(|(idx, class)| {
            let values: Vec<f64> = pivot.rows.iter().map(|r| r.values[idx]).collect();
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "name": class,
                "x": years,
                "y": values,
                "line": { "color": mapping.color_for_name(class).to_hex() },
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "title": { "text": "Area by class over the years" },
            "xaxis": { "title": { "text": "Year" }, "dtick": 1 },
            "yaxis": { "title": { "text": AREA_AXIS } },
            "legend": { "title": { "text": "Class" } },
            "hovermode": "x unified",
        },
    })
}

/// Mean f1-score per year. Years without a value are gaps.
pub fn mean_f1_chart(points: &[(Year, Option<f64>)]) -> Value {
    let years: Vec<Year> = points.iter().map(|(y, _)| *y).collect();
    let values: Vec<Option<f64>> = points.iter().map(|(_, v)| *v).collect();
    json!({
        "data": [{
            "type": "scatter",
            "mode": "lines+markers",
            "x": years,
            "y": values,
            "name": "Mean F1-score",
        }],
        "layout": {
            "title": { "text": "Mean F1-score by year" },
            "xaxis": { "title": { "text": "Year" }, "dtick": 1 },
            "yaxis": { "title": { "text": "F1-score" }, "range": [0, 1] },
        },
    })
}

/// f1-score per class for one year, or `None` without an f1 column.
pub fn f1_bar_chart(view: &MetricsView, mapping: &ClassMapping) -> Option<Value> {
    let f1 = view.f1_by_class()?;
    let classes: Vec<&str> = f1.iter().map(|(c, _)| c.as_str()).collect();
    let values: Vec<Option<f64>> = f1.iter().map(|(_, v)| *v).collect();
    let colors: Vec<String> = classes
        .iter()
        .map(|c| mapping.color_for_name(c).to_hex())
        .collect();

    Some(json!({
        "data": [{
            "type": "bar",
            "x": classes,
            "y": values,
            "marker": { "color": colors },
        }],
        "layout": {
            "title": { "text": format!("F1-score by class - {}", view.year) },
            "xaxis": { "title": { "text": "Class" } },
            "yaxis": { "title": { "text": "F1-score" }, "range": [0, 1] },
            "showlegend": false,
        },
    }))
}
