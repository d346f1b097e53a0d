// Storage module for upload sessions and the ingestion cache
// Author: Gabriel Demetrios Lafis

mod cache;
mod memory;

pub use cache::*;
pub use memory::*;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::data::{DataError, DataSet, FileFormat};

/// Identity of an uploaded file: name, size and content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub name: String,
    pub size: usize,
    pub sha256: String,
}

impl FileKey {
    /// Compute the key of an uploaded file
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        FileKey {
            name: name.to_string(),
            size: bytes.len(),
            sha256: hex::encode(Sha256::digest(bytes)),
        }
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.size, &self.sha256[..12.min(self.sha256.len())])
    }
}

/// An uploaded file as received from the client
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub file_name: &'a str,
    /// MIME type sent by the client, if any
    pub mime_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Upload<'a> {
    /// Create an upload without a client-provided MIME type
    pub fn new(file_name: &'a str, bytes: &'a [u8]) -> Self {
        Upload {
            file_name,
            mime_type: None,
            bytes,
        }
    }

    /// Attach the client-provided MIME type
    pub fn with_mime_type(mut self, mime_type: &'a str) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    /// MIME type to report: the client's, else one guessed from the extension
    pub fn resolved_mime_type(&self) -> String {
        self.mime_type
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| FileFormat::from_file_name(self.file_name).map(|f| f.mime_type().to_string()))
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// File metadata reported back to the user after an upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub mime_type: String,
    /// Size in bytes
    pub size: usize,
    pub rows: usize,
    pub columns: usize,
}

impl FileInfo {
    /// Describe an upload and the dataset parsed from it
    pub fn new(upload: &Upload<'_>, dataset: &DataSet) -> Self {
        FileInfo {
            name: upload.file_name.to_string(),
            mime_type: upload.resolved_mime_type(),
            size: upload.bytes.len(),
            rows: dataset.len(),
            columns: dataset.column_count(),
        }
    }

    /// Size in kilobytes with two decimals, as shown to the user
    pub fn size_kb(&self) -> String {
        format!("{:.2}", self.size as f64 / 1024.0)
    }
}

/// State of one uploaded-file interaction
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub info: FileInfo,
    pub key: FileKey,
    /// The dataset exactly as uploaded; cleaning always starts from here
    pub original: Arc<DataSet>,
}

/// Represents an error in the storage module
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Data(#[from] DataError),

    #[error("Unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Session '{0}' not found")]
    NotFound(String),

    #[error("Error: {0}")]
    Other(String),
}
