// Download artifacts for cleaned datasets
// Author: Gabriel Demetrios Lafis

use log::debug;

use super::{CsvSink, DataError, DataSet, DataSink, XlsxSink, XLSX_MIME_TYPE};

/// Formats a cleaned dataset can be downloaded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Fixed download file name
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "cleaned_data.csv",
            ExportFormat::Xlsx => "cleaned_data.xlsx",
        }
    }

    /// MIME type sent with the download
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => XLSX_MIME_TYPE,
        }
    }

    /// Parse a format from its extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    fn sink(&self) -> Box<dyn DataSink> {
        match self {
            ExportFormat::Csv => Box::new(CsvSink::default()),
            ExportFormat::Xlsx => Box::new(XlsxSink::default()),
        }
    }

    /// Serialize the dataset into a downloadable artifact
    pub fn render(&self, data: &DataSet) -> Result<Artifact, DataError> {
        let sink = self.sink();
        let bytes = sink.write(data)?;

        debug!(
            "rendered {} rows as {} ({} bytes)",
            data.len(),
            sink.name(),
            bytes.len()
        );

        Ok(Artifact {
            file_name: self.file_name(),
            mime_type: self.mime_type(),
            bytes,
        })
    }
}

/// A serialized dataset ready to be offered as a download
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}
