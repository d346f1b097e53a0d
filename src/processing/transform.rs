// Transform operations for data cleaning
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use crate::data::{DataSet, DataType, Row, Schema, Value};
use super::{column_index, DataProcessor, ProcessingError, ProcessorType};

/// Select specific columns from a dataset, in the given order
pub struct SelectTransform {
    columns: Vec<String>,
}

impl SelectTransform {
    /// Create a new select transform with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        SelectTransform { columns }
    }
}

impl DataProcessor for SelectTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let indices = self
            .columns
            .iter()
            .map(|col| column_index(&input.schema, col))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(col) {
                return Err(ProcessingError::InvalidArgument(format!(
                    "Column '{}' selected more than once",
                    col
                )));
            }
        }

        let selected_fields = indices
            .iter()
            .map(|&i| input.schema.fields[i].clone())
            .collect();

        let mut result = DataSet::derived(Schema::new(selected_fields), input);

        for row in &input.data {
            let values: Vec<Value> = indices.iter().map(|&i| row.values[i].clone()).collect();
            result.add_row(Row::new(values))?;
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "select"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

/// Rename columns in a dataset
pub struct RenameTransform {
    renames: Vec<(String, String)>, // (old_name, new_name)
}

impl RenameTransform {
    /// Create a new rename transform with the given column renames.
    ///
    /// Identity entries and blank replacement names leave a column unchanged.
    pub fn new(renames: Vec<(String, String)>) -> Self {
        RenameTransform { renames }
    }
}

impl DataProcessor for RenameTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut fields = input.schema.fields.clone();

        // Resolve against the original names so that swaps (a->b, b->a) work
        for (old_name, new_name) in &self.renames {
            let index = column_index(&input.schema, old_name)?;
            let new_name = new_name.trim();
            if !new_name.is_empty() {
                fields[index].name = new_name.to_string();
            }
        }

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(&field.name) {
                return Err(ProcessingError::InvalidArgument(format!(
                    "Duplicate column name '{}' after rename",
                    field.name
                )));
            }
        }

        let mut result = DataSet::derived(Schema::new(fields), input);
        result.data = input.data.clone();

        Ok(result)
    }

    fn name(&self) -> &str {
        "rename"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

/// Lowercase every value of a text column
pub struct LowercaseTransform {
    column: String,
}

impl LowercaseTransform {
    /// Create a new lowercase transform for the given column
    pub fn new(column: &str) -> Self {
        LowercaseTransform {
            column: column.to_string(),
        }
    }
}

impl DataProcessor for LowercaseTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let col_idx = column_index(&input.schema, &self.column)?;

        if input.schema.fields[col_idx].data_type != DataType::Text {
            return Err(ProcessingError::InvalidArgument(format!(
                "Column '{}' is not a text column",
                self.column
            )));
        }

        let mut result = input.clone();

        for row in &mut result.data {
            if let Some(Value::Text(s)) = row.get_mut(col_idx) {
                *s = s.to_lowercase();
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "lowercase"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}
