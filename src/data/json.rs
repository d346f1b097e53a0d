// JSON data source and value conversion
// Author: Gabriel Demetrios Lafis

use serde_json::{Map, Value as JsonValue};

use super::schema::infer_dataset;
use super::{DataError, DataSet, DataSource, Value};

/// JSON data source.
///
/// Accepts the layouts a dataframe library commonly writes: an array of
/// records, an object of columns keyed by row label, or an object of
/// equal-length column arrays.
pub struct JsonSource;

impl JsonSource {
    /// Create a new JSON data source
    pub fn new() -> Self {
        JsonSource
    }

    /// Convert a JSON value to a raw (not yet typed) data value
    fn json_to_value(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::Text(s.clone()),
            nested => Value::Text(nested.to_string()),
        }
    }

    fn read_records(array: &[JsonValue]) -> Result<(Vec<String>, Vec<Vec<Value>>), DataError> {
        let mut columns: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(array.len());

        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| DataError::Parse("Array element is not an object".to_string()))?;

            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            objects.push(obj);
        }

        let rows = objects
            .into_iter()
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).map_or(Value::Null, Self::json_to_value))
                    .collect()
            })
            .collect();

        Ok((columns, rows))
    }

    fn read_column_objects(
        obj: &Map<String, JsonValue>,
    ) -> Result<(Vec<String>, Vec<Vec<Value>>), DataError> {
        let mut labels: Vec<&String> = Vec::new();

        for column in obj.values() {
            let cells = column
                .as_object()
                .ok_or_else(|| DataError::Parse("Mixed column layouts in JSON object".to_string()))?;
            for label in cells.keys() {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }

        let columns: Vec<String> = obj.keys().cloned().collect();
        let rows = labels
            .iter()
            .map(|label| {
                obj.values()
                    .map(|column| {
                        column
                            .get(label.as_str())
                            .map_or(Value::Null, Self::json_to_value)
                    })
                    .collect()
            })
            .collect();

        Ok((columns, rows))
    }

    fn read_column_arrays(
        obj: &Map<String, JsonValue>,
    ) -> Result<(Vec<String>, Vec<Vec<Value>>), DataError> {
        let arrays = obj
            .values()
            .map(|column| {
                column
                    .as_array()
                    .ok_or_else(|| DataError::Parse("Mixed column layouts in JSON object".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let len = arrays.first().map_or(0, |a| a.len());
        if arrays.iter().any(|a| a.len() != len) {
            return Err(DataError::Parse("All arrays must be of the same length".to_string()));
        }

        let columns = obj.keys().cloned().collect();
        let rows = (0..len)
            .map(|i| arrays.iter().map(|a| Self::json_to_value(&a[i])).collect())
            .collect();

        Ok((columns, rows))
    }
}

impl Default for JsonSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for JsonSource {
    fn read(&self, bytes: &[u8]) -> Result<DataSet, DataError> {
        let json: JsonValue =
            serde_json::from_slice(bytes).map_err(|e| DataError::Parse(e.to_string()))?;

        let (columns, rows) = match &json {
            JsonValue::Array(array) => Self::read_records(array)?,
            JsonValue::Object(obj) if obj.values().all(JsonValue::is_array) => {
                Self::read_column_arrays(obj)?
            }
            JsonValue::Object(obj) => Self::read_column_objects(obj)?,
            _ => {
                return Err(DataError::Parse(
                    "JSON root must be an array of records or an object of columns".to_string(),
                ))
            }
        };

        infer_dataset(columns, rows)
    }
}

/// Convert a data value to a JSON value
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Date(_) => JsonValue::String(value.to_string()),
    }
}

/// Convert every row of a dataset to a JSON array of values
pub fn rows_to_json(dataset: &DataSet) -> Vec<Vec<JsonValue>> {
    dataset
        .data
        .iter()
        .map(|row| row.values.iter().map(value_to_json).collect())
        .collect()
}
