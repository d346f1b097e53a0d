// Bar chart construction
// Author: Gabriel Demetrios Lafis

use serde::Serialize;

use crate::data::{DataSet, Value};
use crate::processing::{column_index, ProcessingError};

/// Qualitative palette cycled over the X categories
pub const PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

pub const DEFAULT_TEMPLATE: &str = "plotly_dark";
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 500;

/// Bars sharing one X category; they stack on top of each other
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub category: String,
    pub color: String,
    pub values: Vec<f64>,
    pub total: f64,
}

/// A bar chart of one numeric column against another column, with bars
/// colored by X category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x: String,
    pub y: String,
    pub template: String,
    pub width: u32,
    pub height: u32,
    pub series: Vec<BarSeries>,
}

impl BarChart {
    /// Build the chart. `y` must name a numeric column. Rows where either
    /// cell is missing are not plotted.
    pub fn build(dataset: &DataSet, x: &str, y: &str) -> Result<Self, ProcessingError> {
        let x_idx = column_index(&dataset.schema, x)?;
        let y_idx = column_index(&dataset.schema, y)?;

        if !dataset.schema.fields[y_idx].data_type.is_numeric() {
            return Err(ProcessingError::InvalidArgument(format!(
                "Column '{}' is not numeric",
                y
            )));
        }

        let mut series: Vec<BarSeries> = Vec::new();

        for row in &dataset.data {
            let (x_value, y_value) = match (row.get(x_idx), row.get(y_idx).and_then(Value::as_f64)) {
                (Some(x_value), Some(y_value)) if !x_value.is_null() => (x_value, y_value),
                _ => continue,
            };

            let category = x_value.to_string();
            match series.iter_mut().find(|s| s.category == category) {
                Some(existing) => {
                    existing.values.push(y_value);
                    existing.total += y_value;
                }
                None => {
                    let color = PALETTE[series.len() % PALETTE.len()].to_string();
                    series.push(BarSeries {
                        category,
                        color,
                        values: vec![y_value],
                        total: y_value,
                    });
                }
            }
        }

        Ok(BarChart {
            title: format!("{} vs {}", x, y),
            x: x.to_string(),
            y: y.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            series,
        })
    }
}
