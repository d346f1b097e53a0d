// In-memory session store
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use log::{debug, info};

use super::{FileInfo, FileKey, IngestCache, Session, StorageError, Upload};

/// Default number of sessions kept open at once
pub const DEFAULT_SESSION_CAPACITY: usize = 64;

/// Session entry with its last use
struct SessionEntry {
    session: Session,
    last_access: Instant,
}

/// Sessions keyed by id, each holding one uploaded dataset.
///
/// Every upload goes through the ingestion cache. Sessions never hold a
/// cleaned copy: cleaning is recomputed from `Session::original` per request.
/// Idle sessions expire, and the least recently used session is evicted when
/// the store is full.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    cache: IngestCache,
    capacity: usize,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    /// Create a new session store backed by the given cache
    pub fn new(cache: IngestCache) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            cache,
            capacity: DEFAULT_SESSION_CAPACITY,
            idle_ttl: None,
        }
    }

    /// Set the maximum number of open sessions
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Expire sessions left unused for longer than `ttl`
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    /// The ingestion cache shared by all sessions
    pub fn cache(&self) -> &IngestCache {
        &self.cache
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        self.idle_ttl
            .map_or(false, |ttl| now.duration_since(entry.last_access) >= ttl)
    }

    /// Drop a file from the cache once no session refers to it
    fn release(
        &self,
        sessions: &HashMap<String, SessionEntry>,
        key: &FileKey,
    ) -> Result<(), StorageError> {
        if !sessions.values().any(|entry| &entry.session.key == key) {
            self.cache.invalidate(key)?;
            debug!("released {} from ingest cache", key);
        }
        Ok(())
    }

    fn load(&self, id: String, upload: &Upload<'_>) -> Result<Session, StorageError> {
        let key = FileKey::new(upload.file_name, upload.bytes);

        let original = self
            .cache
            .get_or_ingest(&key, upload.bytes)?
            .ok_or_else(|| StorageError::UnsupportedFormat(upload.file_name.to_string()))?;

        Ok(Session {
            id,
            info: FileInfo::new(upload, &original),
            key,
            original,
        })
    }

    /// Store a session, expiring idle sessions and evicting the least
    /// recently used one when full. Returns the session it replaced.
    fn insert(&self, session: Session) -> Result<Option<Session>, StorageError> {
        let mut sessions = self.sessions.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        let now = Instant::now();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(id, entry)| **id != session.id && self.is_expired(entry, now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            if let Some(entry) = sessions.remove(&id) {
                debug!("session {} expired", id);
                self.release(&sessions, &entry.session.key)?;
            }
        }

        if !sessions.contains_key(&session.id) && sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| id.clone());
            if let Some(entry) = oldest.and_then(|id| sessions.remove(&id)) {
                info!("session {} evicted", entry.session.id);
                self.release(&sessions, &entry.session.key)?;
            }
        }

        let previous = sessions.insert(
            session.id.clone(),
            SessionEntry {
                session,
                last_access: now,
            },
        );

        if let Some(previous) = &previous {
            self.release(&sessions, &previous.session.key)?;
        }

        Ok(previous.map(|entry| entry.session))
    }

    /// Start a session from a fresh upload
    pub fn open(&self, upload: &Upload<'_>) -> Result<Session, StorageError> {
        let id = format!("{:016x}", rand::random::<u64>());
        let session = self.load(id, upload)?;
        self.insert(session.clone())?;

        info!(
            "session {} opened with '{}' ({} rows x {} columns)",
            session.id, session.info.name, session.info.rows, session.info.columns
        );
        Ok(session)
    }

    /// Replace the file of an existing session, dropping the previous file
    /// from the ingestion cache
    pub fn replace(&self, id: &str, upload: &Upload<'_>) -> Result<Session, StorageError> {
        self.get(id)?;
        let session = self.load(id.to_string(), upload)?;
        self.insert(session.clone())?;

        info!("session {} now holds '{}'", id, session.info.name);
        Ok(session)
    }

    /// Look up a session and mark it as used
    pub fn get(&self, id: &str) -> Result<Session, StorageError> {
        let mut sessions = self.sessions.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        let now = Instant::now();
        match sessions.get_mut(id) {
            None => return Err(StorageError::NotFound(id.to_string())),
            Some(entry) if !self.is_expired(&*entry, now) => {
                entry.last_access = now;
                return Ok(entry.session.clone());
            }
            Some(_) => {}
        }

        if let Some(entry) = sessions.remove(id) {
            debug!("session {} expired", id);
            self.release(&sessions, &entry.session.key)?;
        }
        Err(StorageError::NotFound(id.to_string()))
    }

    /// End a session and drop its file from the cache
    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().map_err(|_| {
            StorageError::Other("Failed to acquire write lock".to_string())
        })?;

        let entry = sessions
            .remove(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        self.release(&sessions, &entry.session.key)?;

        info!("session {} closed", id);
        Ok(())
    }

    /// Number of open sessions
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if no session is open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(IngestCache::new(32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_get() {
        let store = SessionStore::default();
        let session = store
            .open(&Upload::new("people.csv", b"name,age\na,1\nb,2\n"))
            .unwrap();

        assert_eq!(session.id.len(), 16);
        assert_eq!(session.info.rows, 2);
        assert_eq!(session.info.columns, 2);
        assert_eq!(session.info.mime_type, "text/csv");

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.key, session.key);
    }

    #[test]
    fn test_unsupported_upload_opens_nothing() {
        let store = SessionStore::default();
        let err = store.open(&Upload::new("image.png", b"\x89PNG")).unwrap_err();

        assert!(matches!(err, StorageError::UnsupportedFormat(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_invalidates_previous_file() {
        let store = SessionStore::default();
        let first = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();
        let second = store
            .replace(&first.id, &Upload::new("b.csv", b"y\n2\n3\n"))
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.info.rows, 2);
        assert_eq!(store.len(), 1);
        assert!(store.cache().get(&first.key).unwrap().is_none());
        assert!(store.cache().get(&second.key).unwrap().is_some());
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::default();
        let session = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();

        store.remove(&session.id).unwrap();
        assert!(matches!(store.get(&session.id), Err(StorageError::NotFound(_))));
        assert!(matches!(store.remove(&session.id), Err(StorageError::NotFound(_))));
        assert!(store.cache().is_empty());
    }

    #[test]
    fn test_shared_file_stays_cached_until_last_session_ends() {
        let store = SessionStore::default();
        let first = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();
        let second = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();

        store.remove(&first.id).unwrap();
        assert!(store.cache().get(&second.key).unwrap().is_some());

        store.remove(&second.id).unwrap();
        assert!(store.cache().is_empty());
    }

    #[test]
    fn test_idle_sessions_expire() {
        let store = SessionStore::default().with_idle_ttl(Duration::from_millis(0));
        let session = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();

        assert!(matches!(store.get(&session.id), Err(StorageError::NotFound(_))));
        assert!(store.is_empty());
        assert!(store.cache().is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let store = SessionStore::default().with_capacity(2);
        let a = store.open(&Upload::new("a.csv", b"x\n1\n")).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let b = store.open(&Upload::new("b.csv", b"x\n2\n")).unwrap();
        std::thread::sleep(Duration::from_millis(2));

        // Touching `a` makes `b` the eviction candidate
        store.get(&a.id).unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let c = store.open(&Upload::new("c.csv", b"x\n3\n")).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(&a.id).is_ok());
        assert!(matches!(store.get(&b.id), Err(StorageError::NotFound(_))));
        assert!(store.get(&c.id).is_ok());
        assert!(store.cache().get(&b.key).unwrap().is_none());
    }
}
