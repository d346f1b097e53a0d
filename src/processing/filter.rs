// Row filters for data cleaning
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use crate::data::{DataSet, Row};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Filter rows based on a predicate
pub struct FilterProcessor {
    name: String,
    predicate: Box<dyn Fn(&Row) -> bool + Send + Sync>,
}

impl FilterProcessor {
    /// Create a new filter processor keeping the rows the predicate accepts
    pub fn new<F>(name: &str, predicate: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        FilterProcessor {
            name: name.to_string(),
            predicate: Box::new(predicate),
        }
    }

    /// Keep only rows with no missing value in any column
    pub fn drop_missing() -> Self {
        Self::new("drop_missing", |row| !row.has_null())
    }
}

impl DataProcessor for FilterProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut result = DataSet::derived(input.schema.clone(), input);

        result.data = input
            .data
            .iter()
            .filter(|row| (self.predicate)(row))
            .cloned()
            .collect();

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

/// Drop rows identical to an earlier row across all columns; the first
/// occurrence is kept and row order is preserved
pub struct DropDuplicatesFilter;

impl DropDuplicatesFilter {
    /// Create a new duplicate filter
    pub fn new() -> Self {
        DropDuplicatesFilter
    }
}

impl Default for DropDuplicatesFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProcessor for DropDuplicatesFilter {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut seen: HashSet<&Row> = HashSet::with_capacity(input.len());
        let mut result = DataSet::derived(input.schema.clone(), input);

        for row in &input.data {
            if seen.insert(row) {
                result.data.push(row.clone());
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "drop_duplicates"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ingest, Value};

    #[test]
    fn test_drop_missing() {
        let dataset = ingest(b"name,age\nann,30\nbob,\ncid,41\n", "a.csv")
            .unwrap()
            .unwrap();
        let result = FilterProcessor::drop_missing().process(&dataset).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.column_count(), 2);
        assert!(result.data.iter().all(|row| !row.has_null()));
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let dataset = ingest(b"k,v\na,1\nb,2\na,1\nc,3\nb,2\n", "d.csv")
            .unwrap()
            .unwrap();
        let result = DropDuplicatesFilter::new().process(&dataset).unwrap();

        assert_eq!(result.len(), 3);
        let keys: Vec<&Value> = result.data.iter().map(|r| &r.values[0]).collect();
        assert_eq!(
            keys,
            vec![
                &Value::Text("a".to_string()),
                &Value::Text("b".to_string()),
                &Value::Text("c".to_string())
            ]
        );

        let again = DropDuplicatesFilter::new().process(&result).unwrap();
        assert_eq!(again, result);
    }

    #[test]
    fn test_duplicate_nulls_are_equal() {
        let dataset = ingest(b"k,v\na,\na,\n", "n.csv").unwrap().unwrap();
        let result = DropDuplicatesFilter::new().process(&dataset).unwrap();
        assert_eq!(result.len(), 1);
    }
}
