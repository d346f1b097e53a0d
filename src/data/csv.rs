// CSV data source and sink implementation
// Author: Gabriel Demetrios Lafis

use super::schema::{infer_dataset, is_na};
use super::{DataError, DataSet, DataSink, DataSource, Value};

/// Delimited text source (comma for `.csv`, tab for `.txt`)
pub struct CsvSource {
    delimiter: u8,
}

impl CsvSource {
    /// Create a new delimited text source
    pub fn new(delimiter: u8) -> Self {
        CsvSource { delimiter }
    }

    /// Create a tab-delimited source
    pub fn tab_delimited() -> Self {
        Self::new(b'\t')
    }
}

impl DataSource for CsvSource {
    fn read(&self, bytes: &[u8]) -> Result<DataSet, DataError> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(bytes);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| DataError::Parse(e.to_string()))?
            .iter()
            .enumerate()
            .map(|(i, s)| {
                // Spreadsheet programs prefix UTF-8 exports with a byte order mark
                if i == 0 {
                    s.trim_start_matches('\u{feff}').to_string()
                } else {
                    s.to_string()
                }
            })
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DataError::Parse("No columns to parse from file".to_string()));
        }

        let mut raw_rows = Vec::new();

        for result in csv_reader.records() {
            // The reader rejects records whose width differs from the header
            let record = result.map_err(|e| DataError::Parse(e.to_string()))?;

            let values: Vec<Value> = record
                .iter()
                .map(|field| {
                    if is_na(field) {
                        Value::Null
                    } else {
                        Value::Text(field.to_string())
                    }
                })
                .collect();

            raw_rows.push(values);
        }

        infer_dataset(headers, raw_rows)
    }
}

/// CSV data sink
pub struct CsvSink {
    delimiter: u8,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new(delimiter: u8) -> Self {
        CsvSink { delimiter }
    }
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &DataSet) -> Result<Vec<u8>, DataError> {
        let mut csv_writer = ::csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        let headers: Vec<&str> = data
            .schema
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect();

        csv_writer
            .write_record(&headers)
            .map_err(|e| DataError::Write(e.to_string()))?;

        for row in &data.data {
            let record: Vec<String> = row.values.iter().map(Value::to_string).collect();

            csv_writer
                .write_record(&record)
                .map_err(|e| DataError::Write(e.to_string()))?;
        }

        csv_writer
            .into_inner()
            .map_err(|e| DataError::Write(e.to_string()))
    }

    fn name(&self) -> &str {
        "csv"
    }
}
