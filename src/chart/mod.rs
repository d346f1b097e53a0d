// Chart module for visualizing a pair of columns
// Author: Gabriel Demetrios Lafis

mod bar;
mod svg;

pub use bar::*;

use serde::{Deserialize, Serialize};

use crate::data::DataSet;

/// Warning shown instead of chart controls when nothing can be plotted
pub const NO_NUMERIC_COLUMNS_WARNING: &str = "No numeric columns available for visualization.";

/// Which version of the session's data a chart reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSource {
    /// The dataset as uploaded, before any cleaning
    #[default]
    Original,
    /// The dataset after the cleaning options were applied
    Cleaned,
}

/// Column choices for the chart controls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub available: bool,
    /// Any column can go on the X axis
    pub x_columns: Vec<String>,
    /// Only numeric columns can go on the Y axis
    pub y_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ChartOptions {
    /// Work out the axis choices for a dataset
    pub fn for_dataset(dataset: &DataSet) -> Self {
        let y_columns = dataset.numeric_columns();

        if y_columns.is_empty() {
            return ChartOptions {
                available: false,
                x_columns: Vec::new(),
                y_columns,
                warning: Some(NO_NUMERIC_COLUMNS_WARNING.to_string()),
            };
        }

        ChartOptions {
            available: true,
            x_columns: dataset.column_names(),
            y_columns,
            warning: None,
        }
    }
}
