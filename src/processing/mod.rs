// Processing module for data cleaning and analysis
// Author: Gabriel Demetrios Lafis

mod clean;
mod filter;
mod stats;
mod transform;

pub use clean::*;
pub use filter::*;
pub use stats::*;
pub use transform::*;

use log::debug;
use thiserror::Error;

use crate::data::{DataError, DataSet, Schema};

/// Represents a data processor that transforms data
pub trait DataProcessor {
    /// Process a dataset and return a new dataset
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError>;

    /// Get the processor name
    fn name(&self) -> &str;

    /// Get the processor type
    fn processor_type(&self) -> ProcessorType;
}

/// Represents a processor type
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorType {
    Transform,
    Filter,
    Custom(String),
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Resolve a column name to its index, or fail with a user-facing message
pub fn column_index(schema: &Schema, column: &str) -> Result<usize, ProcessingError> {
    schema
        .index_of(column)
        .ok_or_else(|| ProcessingError::InvalidArgument(format!("Column '{}' not found", column)))
}

/// Pipeline for chaining multiple processors
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn DataProcessor + Send + Sync>>,
}

impl Pipeline {
    /// Create a new pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: Vec::new(),
        }
    }

    /// Add a processor to the pipeline
    pub fn add<P: DataProcessor + Send + Sync + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Number of steps in the pipeline
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Check if the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Names of the steps, in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Execute the pipeline on a dataset
    pub fn execute(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut current = input.clone();

        for processor in &self.processors {
            let before = current.len();
            current = processor.process(&current)?;
            debug!(
                "{}: {} ({:?}) {} -> {} rows",
                self.name,
                processor.name(),
                processor.processor_type(),
                before,
                current.len()
            );
        }

        Ok(current)
    }
}

impl DataProcessor for Pipeline {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        self.execute(input)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Custom("Pipeline".to_string())
    }
}
