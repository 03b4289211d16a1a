// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session persistence
//!
//! The session is a game id plus a display-only move counter. Both live in a
//! small key/value store whose lifetime matches the browsing session; the
//! default file sits in the temp directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key of the persisted game id
pub const GAME_ID_KEY: &str = "xionghan_game_id";

/// Misspelled key written by older clients; removed together with [`GAME_ID_KEY`]
pub const LEGACY_GAME_ID_KEY: &str = "xionhan_game_id";

/// Game id the stored move counter belongs to
pub const MOVE_COUNT_GAME_KEY: &str = "xionghan_move_count_game_id";

pub const MOVE_COUNT_KEY: &str = "xionghan_move_count";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage for session data
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// In-process store; the session ends with the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON-file store, written through on every change.
///
/// A missing or unreadable file starts an empty session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt session file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!(path = %path.display(), keys = entries.len(), "Session store opened");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The active session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub game_id: Option<String>,
    pub move_count: u32,
}

/// Keeps [`Session`] and its persisted copy in step.
///
/// Storage failures are logged and otherwise ignored: the session only
/// affects resumption and the move counter display.
#[derive(Debug)]
pub struct SessionManager<S> {
    store: S,
    session: Session,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn game_id(&self) -> Option<&str> {
        self.session.game_id.as_deref()
    }

    pub fn move_count(&self) -> u32 {
        self.session.move_count
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Game id persisted by a previous run
    pub fn stored_game_id(&self) -> Option<String> {
        self.store.get(GAME_ID_KEY).filter(|id| !id.is_empty())
    }

    /// Drop the persisted game id under both the current and the legacy key
    pub fn forget_game_id(&mut self) {
        self.write(|store| store.remove(GAME_ID_KEY));
        self.write(|store| store.remove(LEGACY_GAME_ID_KEY));
        self.session.game_id = None;
    }

    /// A new game was created: persist its id and reset the counter
    pub fn start(&mut self, game_id: &str) {
        self.session = Session {
            game_id: Some(game_id.to_string()),
            move_count: 0,
        };
        self.write(|store| store.set(GAME_ID_KEY, game_id));
        self.persist_count();
    }

    /// An existing game was resumed; the stored counter is trusted only if
    /// it was written for this game id
    pub fn resume(&mut self, game_id: &str) {
        let owner = self.store.get(MOVE_COUNT_GAME_KEY);
        let move_count = match owner.as_deref() {
            Some(owner) if owner == game_id => self
                .store
                .get(MOVE_COUNT_KEY)
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
            _ => 0,
        };

        self.session = Session {
            game_id: Some(game_id.to_string()),
            move_count,
        };
        self.write(|store| store.set(GAME_ID_KEY, game_id));
        self.persist_count();
    }

    /// A move was applied; returns the new count
    pub fn record_move(&mut self) -> u32 {
        self.session.move_count += 1;
        self.persist_count();
        self.session.move_count
    }

    fn persist_count(&mut self) {
        let Some(game_id) = self.session.game_id.clone() else {
            return;
        };
        let count = self.session.move_count.to_string();
        self.write(|store| store.set(MOVE_COUNT_GAME_KEY, &game_id));
        self.write(|store| store.set(MOVE_COUNT_KEY, &count));
    }

    fn write(&mut self, op: impl FnOnce(&mut S) -> Result<(), SessionError>) {
        if let Err(e) = op(&mut self.store) {
            warn!("Failed to update session storage: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn start_resets_counter() {
        let mut manager = SessionManager::new(MemoryStore::new());
        manager.start("g1");
        manager.record_move();
        manager.record_move();
        assert_eq!(manager.move_count(), 2);

        manager.start("g2");
        assert_eq!(manager.move_count(), 0);
        assert_eq!(manager.stored_game_id().as_deref(), Some("g2"));
        assert_eq!(manager.store().get(MOVE_COUNT_GAME_KEY).as_deref(), Some("g2"));
    }

    #[test]
    fn counter_is_keyed_by_game_id() {
        let mut store = MemoryStore::new();
        store.set(GAME_ID_KEY, "other").unwrap();
        store.set(MOVE_COUNT_GAME_KEY, "other").unwrap();
        store.set(MOVE_COUNT_KEY, "17").unwrap();

        let mut manager = SessionManager::new(store.clone());
        manager.resume("other");
        assert_eq!(manager.move_count(), 17);

        let mut manager = SessionManager::new(store);
        manager.resume("mine");
        assert_eq!(manager.move_count(), 0);
        assert_eq!(manager.store().get(MOVE_COUNT_GAME_KEY).as_deref(), Some("mine"));
    }

    #[test]
    fn forget_removes_legacy_key() {
        let mut store = MemoryStore::new();
        store.set(GAME_ID_KEY, "g").unwrap();
        store.set(LEGACY_GAME_ID_KEY, "g").unwrap();

        let mut manager = SessionManager::new(store);
        manager.forget_game_id();
        assert_eq!(manager.stored_game_id(), None);
        assert_eq!(manager.store().get(LEGACY_GAME_ID_KEY), None);
        assert_eq!(manager.game_id(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session").join("session.json");

        let mut manager = SessionManager::new(FileStore::open(&path));
        manager.start("abc");
        manager.record_move();

        let mut reopened = SessionManager::new(FileStore::open(&path));
        let id = reopened.stored_game_id().unwrap();
        assert_eq!(id, "abc");
        reopened.resume(&id);
        assert_eq!(reopened.move_count(), 1);
    }

    #[test]
    fn corrupt_file_is_empty_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get(GAME_ID_KEY), None);
    }
}
