// Ingestion cache keyed by file identity
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use log::debug;

use crate::data::{ingest, DataSet};
use super::{FileKey, StorageError};

/// Cache entry with expiration
struct CacheEntry {
    data: Arc<DataSet>,
    inserted_at: Instant,
    expires_at: Option<Instant>,
}

/// Cache of parsed uploads, so re-uploading the same file skips parsing
pub struct IngestCache {
    entries: RwLock<HashMap<FileKey, CacheEntry>>,
    capacity: usize,
    default_ttl: Option<Duration>,
}

impl IngestCache {
    /// Create a new cache holding at most `capacity` datasets
    pub fn new(capacity: usize) -> Self {
        IngestCache {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            default_ttl: None,
        }
    }

    /// Set the default time-to-live for cache entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Look up a parsed dataset
    pub fn get(&self, key: &FileKey) -> Result<Option<Arc<DataSet>>, StorageError> {
        let entries = self.entries.read().map_err(|_| {
            StorageError::Other("Failed to acquire read lock".to_string())
        })?;

        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at.map_or(true, |expires| expires > now))
            .map(|entry| entry.data.clone()))
    }

    /// Store a parsed dataset, evicting the oldest entry when full
    pub fn insert(&self, key: FileKey, data: DataSet) -> Result<Arc<DataSet>, StorageError> {
        let mut entries = self.entries.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at.map_or(true, |expires| expires > now));

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("evicting {} from ingest cache", oldest);
                entries.remove(&oldest);
            }
        }

        let data = Arc::new(data);
        entries.insert(
            key,
            CacheEntry {
                data: data.clone(),
                inserted_at: now,
                expires_at: self.default_ttl.map(|ttl| now + ttl),
            },
        );

        Ok(data)
    }

    /// Return the cached dataset for this file, parsing it on a miss.
    ///
    /// `Ok(None)` means the file format is not supported; nothing is cached.
    pub fn get_or_ingest(
        &self,
        key: &FileKey,
        bytes: &[u8],
    ) -> Result<Option<Arc<DataSet>>, StorageError> {
        if let Some(data) = self.get(key)? {
            debug!("ingest cache hit for {}", key);
            return Ok(Some(data));
        }

        // Parse without holding the lock
        match ingest(bytes, &key.name)? {
            Some(dataset) => Ok(Some(self.insert(key.clone(), dataset)?)),
            None => Ok(None),
        }
    }

    /// Drop one file's entry
    pub fn invalidate(&self, key: &FileKey) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        Ok(entries.remove(key).is_some())
    }

    /// Clear all entries from the cache
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        entries.clear();
        Ok(())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
