// API request and response models
// Author: Gabriel Demetrios Lafis

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::chart::{BarChart, ChartSource};
use crate::data::{rows_to_json, DataSet};
use crate::processing::{CleaningOptions, Summary};
use crate::storage::{FileInfo, Session};

/// Query string of an upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

/// Request for the axis choices of a chart
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartOptionsRequest {
    #[serde(default)]
    pub source: ChartSource,
    #[serde(default)]
    pub options: CleaningOptions,
}

/// Request to plot one column against another
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub source: ChartSource,
    /// Cleaning applied first when `source` is `cleaned`
    #[serde(default)]
    pub options: CleaningOptions,
}

/// Schema field as shown to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// A dataset rendered for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<SchemaField>,
    pub rows: usize,
    pub data: Vec<Vec<JsonValue>>,
}

impl TableView {
    pub fn from_dataset(dataset: &DataSet) -> Self {
        TableView {
            columns: dataset
                .schema
                .fields
                .iter()
                .map(|field| SchemaField {
                    name: field.name.clone(),
                    data_type: field.data_type.as_str().to_string(),
                    nullable: field.nullable,
                })
                .collect(),
            rows: dataset.len(),
            data: rows_to_json(dataset),
        }
    }
}

/// File details plus the first rows of the upload
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub file: FileInfo,
    pub size_kb: String,
    pub preview: TableView,
}

impl SessionResponse {
    pub fn new(session: &Session, preview_rows: usize) -> Self {
        SessionResponse {
            id: session.id.clone(),
            file: session.info.clone(),
            size_kb: session.info.size_kb(),
            preview: TableView::from_dataset(&session.original.head(preview_rows)),
        }
    }
}

/// Result of applying the cleaning options
#[derive(Debug, Clone, Serialize)]
pub struct CleanResponse {
    pub id: String,
    pub options: CleaningOptions,
    pub cleaned: TableView,
    /// Columns that can be lowercased
    pub text_columns: Vec<String>,
    pub statistics: Summary,
}

/// A chart, or the warning shown when nothing can be plotted
#[derive(Debug, Clone, Serialize)]
pub struct ChartResponse {
    pub source: ChartSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<BarChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
