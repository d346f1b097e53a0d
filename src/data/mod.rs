// Data module for handling data structures and formats
// Author: Gabriel Demetrios Lafis

pub mod csv;
pub mod export;
pub mod json;
pub mod schema;
pub mod xlsx;

pub use self::csv::*;
pub use export::*;
pub use json::*;
pub use schema::*;
pub use xlsx::*;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use log::debug;
use thiserror::Error;

/// Represents a generic data source that parses raw bytes
pub trait DataSource {
    /// Parse a dataset from the given bytes
    fn read(&self, bytes: &[u8]) -> Result<DataSet, DataError>;
}

/// Represents a generic data sink that serializes a dataset to bytes
pub trait DataSink {
    /// Serialize the dataset
    fn write(&self, data: &DataSet) -> Result<Vec<u8>, DataError>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// Supported upload formats, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Json,
    /// Tab-delimited text
    Txt,
}

impl FileFormat {
    /// Parse a format from a bare extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "json" => Some(FileFormat::Json),
            "txt" => Some(FileFormat::Txt),
            _ => None,
        }
    }

    /// Detect the format from a file name. The text after the last dot is the
    /// extension; a name without a dot has none.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Get the canonical extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Json => "json",
            FileFormat::Txt => "txt",
        }
    }

    /// MIME type to report when the uploader did not send one
    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Xlsx => XLSX_MIME_TYPE,
            FileFormat::Json => "application/json",
            FileFormat::Txt => "text/plain",
        }
    }

    /// Build the source that parses this format
    pub fn source(&self) -> Box<dyn DataSource> {
        match self {
            FileFormat::Csv => Box::new(CsvSource::new(b',')),
            FileFormat::Txt => Box::new(CsvSource::tab_delimited()),
            FileFormat::Json => Box::new(JsonSource::new()),
            FileFormat::Xlsx => Box::new(XlsxSource::new()),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse uploaded bytes into a dataset.
///
/// Returns `Ok(None)` when the extension is not one of the supported formats;
/// the caller must stop processing that upload. Malformed content of a
/// supported format is an error.
pub fn ingest(bytes: &[u8], file_name: &str) -> Result<Option<DataSet>, DataError> {
    let format = match FileFormat::from_file_name(file_name) {
        Some(format) => format,
        None => {
            debug!("no reader for '{}'", file_name);
            return Ok(None);
        }
    };

    let mut dataset = format.source().read(bytes)?;
    dataset.metadata.add("source".to_string(), format.to_string());
    dataset.metadata.add("file_name".to_string(), file_name.to_string());

    debug!(
        "ingested '{}' as {}: {} rows x {} columns",
        file_name,
        format,
        dataset.len(),
        dataset.column_count()
    );

    Ok(Some(dataset))
}

/// Represents a dataset with schema and data
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub schema: Schema,
    pub data: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new(schema: Schema) -> Self {
        DataSet {
            schema,
            data: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create an empty dataset that carries over another dataset's metadata
    pub fn derived(schema: Schema, from: &DataSet) -> Self {
        DataSet {
            schema,
            data: Vec::new(),
            metadata: from.metadata.clone(),
        }
    }

    /// Add a row to the dataset
    pub fn add_row(&mut self, row: Row) -> Result<(), DataError> {
        if row.values.len() != self.schema.fields.len() {
            return Err(DataError::SchemaMismatch {
                expected: self.schema.fields.len(),
                found: row.values.len(),
            });
        }

        self.data.push(row);
        Ok(())
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of columns in the dataset
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Get the column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.schema.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Iterate over the values of one column
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.data.iter().filter_map(move |row| row.get(index))
    }

    /// Names of the columns holding integers or floats
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_where(|t| t.is_numeric())
    }

    /// Names of the columns holding text
    pub fn text_columns(&self) -> Vec<String> {
        self.columns_where(|t| *t == DataType::Text)
    }

    fn columns_where<F: Fn(&DataType) -> bool>(&self, predicate: F) -> Vec<String> {
        self.schema
            .fields
            .iter()
            .filter(|f| predicate(&f.data_type))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Copy of the first `n` rows
    pub fn head(&self, n: usize) -> DataSet {
        let mut head = DataSet::derived(self.schema.clone(), self);
        head.data = self.data.iter().take(n).cloned().collect();
        head
    }
}

/// Represents a row in a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Get a reference to a value by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a mutable reference to a value by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    /// Whether any cell of the row is missing
    pub fn has_null(&self) -> bool {
        self.values.iter().any(Value::is_null)
    }
}

/// Represents a value in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Check if the value is missing
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of the value, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

// Floats parsed by the readers are never NaN, so bitwise equality is total here.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => {
                // 0.0 == -0.0 must hash the same
                let bits = if *f == 0.0 { 0u64 } else { f.to_bits() };
                bits.hash(state)
            }
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Represents a schema for a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema with the given fields
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Position of the named field
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Represents a field in a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    /// Create a new field
    pub fn new(name: String, data_type: DataType, nullable: bool) -> Self {
        Field {
            name,
            data_type,
            nullable,
        }
    }
}

/// Represents the inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
}

impl DataType {
    /// Whether the type counts as numeric for statistics and charts
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Lowercase name used in API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }
}

/// Represents metadata for a dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
}

impl Metadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Metadata {
            properties: HashMap::new(),
        }
    }

    /// Add a property to the metadata
    pub fn add(&mut self, key: String, value: String) {
        self.properties.insert(key, value);
    }

    /// Get a property from the metadata
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema mismatch: expected {expected} values, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Write error: {0}")]
    Write(String),
}
