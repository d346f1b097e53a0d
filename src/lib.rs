// Data Sweeper
// Author: Gabriel Demetrios Lafis

//! # Data Sweeper
//!
//! Upload tabular files, clean them, chart them and download the result.
//!
//! ## Features
//!
//! - Ingestion of CSV, tab-separated TXT, JSON and Excel (XLSX) files
//! - Column renaming, missing-value and duplicate removal, column selection
//!   and lowercasing
//! - Descriptive statistics and bar charts
//! - Export to `cleaned_data.csv` and `cleaned_data.xlsx`
//! - REST API with per-upload sessions and an ingestion cache
//!
//! ## Example
//!
//! ```rust
//! use data_sweeper::{
//!     data::{ingest, ExportFormat},
//!     processing::CleaningOptions,
//! };
//!
//! let raw = b"name,age\nAnn,30\nBob,\nAnn,30\n";
//! let dataset = ingest(raw, "people.csv").unwrap().unwrap();
//!
//! let options = CleaningOptions {
//!     drop_missing: true,
//!     drop_duplicates: true,
//!     ..CleaningOptions::default()
//! };
//! let cleaned = options.apply(&dataset).unwrap();
//! assert_eq!(cleaned.len(), 1);
//!
//! let artifact = ExportFormat::Csv.render(&cleaned).unwrap();
//! assert_eq!(artifact.file_name, "cleaned_data.csv");
//! ```

pub mod data;
pub mod processing;
pub mod chart;
pub mod storage;
pub mod api;
pub mod utils;

// Re-export main types
pub use data::{ingest, DataSet, DataType, ExportFormat, Field, FileFormat, Row, Schema, Value};
pub use processing::{CleaningOptions, Pipeline};
pub use chart::{BarChart, ChartSource};
pub use storage::SessionStore;
pub use api::Server;
pub use utils::Config;
