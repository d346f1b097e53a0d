// Cleaning plan: the user's edits for one interaction
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::DataSet;
use super::{
    DropDuplicatesFilter, FilterProcessor, LowercaseTransform, Pipeline, ProcessingError,
    RenameTransform, SelectTransform,
};

/// Every edit a user can make to an uploaded dataset.
///
/// The edits always run in the same order: rename, drop missing, drop
/// duplicates, select columns, lowercase. Column names in `columns` and
/// `lowercase` refer to the names after renaming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Original column name -> replacement name
    pub renames: BTreeMap<String, String>,
    pub drop_missing: bool,
    pub drop_duplicates: bool,
    /// Columns to keep, in output order; `None` keeps all columns
    pub columns: Option<Vec<String>>,
    /// Text columns to lowercase
    pub lowercase: Vec<String>,
}

impl CleaningOptions {
    /// Build the processing pipeline for these options
    pub fn pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new("clean");

        let renames: Vec<(String, String)> = self
            .renames
            .iter()
            .filter(|(old, new)| old != new)
            .map(|(old, new)| (old.clone(), new.clone()))
            .collect();
        if !renames.is_empty() {
            pipeline = pipeline.add(RenameTransform::new(renames));
        }

        if self.drop_missing {
            pipeline = pipeline.add(FilterProcessor::drop_missing());
        }

        if self.drop_duplicates {
            pipeline = pipeline.add(DropDuplicatesFilter::new());
        }

        if let Some(columns) = &self.columns {
            pipeline = pipeline.add(SelectTransform::new(columns.clone()));
        }

        for column in &self.lowercase {
            pipeline = pipeline.add(LowercaseTransform::new(column));
        }

        pipeline
    }

    /// Apply the edits to the original dataset, producing a new dataset
    pub fn apply(&self, original: &DataSet) -> Result<DataSet, ProcessingError> {
        self.pipeline().execute(original)
    }
}
