// Schema inference and construction
// Author: Gabriel Demetrios Lafis

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::{DataError, DataSet, DataType, Field, Row, Schema, Value};

/// Cell contents treated as missing when reading delimited text
pub const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
    "#NA",
];

/// Check whether a raw text cell denotes a missing value.
///
/// Only exact tokens count; a cell of spaces is text.
pub fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Make column names unique by suffixing repeats: `a, a, a` -> `a, a.1, a.2`
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counters: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .map(|name| {
            let mut unique = name.clone();
            while used.contains(&unique) {
                let counter = counters.entry(name.clone()).or_insert(0);
                *counter += 1;
                unique = format!("{}.{}", name, counter);
            }
            used.insert(unique.clone());
            unique
        })
        .collect()
}

/// Kind of a single non-null cell, from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Date,
    Text,
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| !f.is_nan())
}

fn classify(value: &Value) -> Option<CellKind> {
    let kind = match value {
        Value::Null => return None,
        Value::Integer(_) => CellKind::Integer,
        Value::Float(_) => CellKind::Float,
        Value::Boolean(_) => CellKind::Boolean,
        Value::Date(_) => CellKind::Date,
        Value::Text(s) => {
            if s.trim().parse::<i64>().is_ok() {
                CellKind::Integer
            } else if parse_float(s).is_some() {
                CellKind::Float
            } else if parse_bool(s).is_some() {
                CellKind::Boolean
            } else if parse_date(s).is_some() {
                CellKind::Date
            } else {
                CellKind::Text
            }
        }
    };
    Some(kind)
}

/// Infer the type of a column from its raw cells
pub fn infer_type<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen_any = false;
    let mut all_integer = true;
    let mut all_numeric = true;
    let mut all_boolean = true;
    let mut all_date = true;

    for kind in cells.into_iter().filter_map(classify) {
        seen_any = true;
        all_integer &= kind == CellKind::Integer;
        all_numeric &= matches!(kind, CellKind::Integer | CellKind::Float);
        all_boolean &= kind == CellKind::Boolean;
        all_date &= kind == CellKind::Date;
    }

    if !seen_any {
        DataType::Text
    } else if all_integer {
        DataType::Integer
    } else if all_numeric {
        DataType::Float
    } else if all_boolean {
        DataType::Boolean
    } else if all_date {
        DataType::Date
    } else {
        DataType::Text
    }
}

/// Convert a raw cell to the inferred column type.
///
/// Only called with a type produced by `infer_type` over the same cells, so
/// every non-null cell is convertible; anything else falls back to text.
pub fn convert_value(value: Value, data_type: DataType) -> Value {
    match (value, data_type) {
        (Value::Null, _) => Value::Null,
        (Value::Text(s), DataType::Integer) => match s.trim().parse::<i64>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Text(s),
        },
        (Value::Text(s), DataType::Float) => match parse_float(&s) {
            Some(f) => Value::Float(f),
            None => Value::Text(s),
        },
        (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
        (Value::Text(s), DataType::Boolean) => match parse_bool(&s) {
            Some(b) => Value::Boolean(b),
            None => Value::Text(s),
        },
        (Value::Text(s), DataType::Date) => match parse_date(&s) {
            Some(d) => Value::Date(d),
            None => Value::Text(s),
        },
        (Value::Text(s), DataType::Text) => Value::Text(s),
        (other, DataType::Text) => Value::Text(other.to_string()),
        (other, _) => other,
    }
}

/// Build a typed dataset from column names and raw, untyped rows.
///
/// Every row must have exactly one cell per column. Repeated column names
/// are suffixed so every column stays addressable by name.
pub fn infer_dataset(names: Vec<String>, raw_rows: Vec<Vec<Value>>) -> Result<DataSet, DataError> {
    let names = dedupe_names(names);
    let types: Vec<DataType> = (0..names.len())
        .map(|i| infer_type(raw_rows.iter().filter_map(|row| row.get(i))))
        .collect();

    let fields = names
        .into_iter()
        .zip(types.iter())
        .map(|(name, data_type)| Field::new(name, *data_type, true))
        .collect();

    let mut dataset = DataSet::new(Schema::new(fields));

    for raw in raw_rows {
        let values = raw
            .into_iter()
            .zip(types.iter())
            .map(|(value, data_type)| convert_value(value, *data_type))
            .collect();
        dataset.add_row(Row::new(values))?;
    }

    Ok(dataset)
}

/// Schema builder for creating schemas
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Add a field to the schema
    pub fn add_field(mut self, name: &str, data_type: DataType, nullable: bool) -> Self {
        self.fields.push(Field::new(name.to_string(), data_type, nullable));
        self
    }

    /// Add a boolean field
    pub fn add_boolean(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Boolean, nullable)
    }

    /// Add an integer field
    pub fn add_integer(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Integer, nullable)
    }

    /// Add a float field
    pub fn add_float(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Float, nullable)
    }

    /// Add a text field
    pub fn add_text(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Text, nullable)
    }

    /// Add a date field
    pub fn add_date(self, name: &str, nullable: bool) -> Self {
        self.add_field(name, DataType::Date, nullable)
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(&[text("1"), text("2"), Value::Null]), DataType::Integer);
        assert_eq!(infer_type(&[text("1"), text("2.5")]), DataType::Float);
        assert_eq!(infer_type(&[Value::Integer(1), Value::Float(0.5)]), DataType::Float);
        assert_eq!(infer_type(&[text("True"), text("false")]), DataType::Boolean);
        assert_eq!(infer_type(&[text("2024-01-02"), text("2023-12-31")]), DataType::Date);
        assert_eq!(infer_type(&[text("1"), text("x")]), DataType::Text);
        assert_eq!(infer_type(&[Value::Null, Value::Null]), DataType::Text);
    }

    #[test]
    fn test_infer_dataset_converts_cells() {
        let dataset = infer_dataset(
            vec!["name".to_string(), "score".to_string()],
            vec![
                vec![text("a"), text("1")],
                vec![text("b"), text("2.5")],
                vec![text("c"), Value::Null],
            ],
        )
        .unwrap();

        assert_eq!(dataset.schema.fields[0].data_type, DataType::Text);
        assert_eq!(dataset.schema.fields[1].data_type, DataType::Float);
        assert_eq!(dataset.data[0].values[1], Value::Float(1.0));
        assert_eq!(dataset.data[2].values[1], Value::Null);
    }

    #[test]
    fn test_text_column_keeps_original_spelling() {
        let dataset = infer_dataset(
            vec!["code".to_string()],
            vec![vec![text("007")], vec![text("abc")]],
        )
        .unwrap();
        assert_eq!(dataset.data[0].values[0], text("007"));
    }

    #[test]
    fn test_na_values() {
        assert!(is_na(""));
        assert!(is_na("NaN"));
        assert!(!is_na(" NA "));
        assert!(!is_na(" "));
        assert!(!is_na("0"));
    }

    #[test]
    fn test_dedupe_names() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(dedupe_names(names(&["a", "a", "b", "a"])), names(&["a", "a.1", "b", "a.2"]));
        assert_eq!(dedupe_names(names(&["a", "a.1", "a"])), names(&["a", "a.1", "a.2"]));
        assert_eq!(dedupe_names(names(&["x", "y"])), names(&["x", "y"]));
    }
}
