//! Durable key-value storage for the session.
//!
//! Entries carry expiry, path and same-site metadata so they behave like the
//! cookies a browser client would use. An expired entry reads as absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const TOKEN_KEY: &str = "recipe_vault_token";
pub const USER_KEY: &str = "recipe_vault_user";
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub path: String,
    pub same_site: SameSite,
}

impl StoredEntry {
    /// Entry with the session horizon: 7 days, path `/`, same-site strict.
    pub fn session(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            path: "/".to_string(),
            same_site: SameSite::Strict,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Backing store for persisted session entries.
///
/// Only the session layer writes through this trait. Calls are synchronous and are made
/// from async tool handlers, so an implementation must finish quickly: the file backend
/// rewrites one small JSON document and renames it into place.
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<StoredEntry>>;

    fn store(&self, key: &str, entry: StoredEntry) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Value of a live (unexpired) entry.
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .load(key)?
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store(key, StoredEntry::session(value))
    }
}

/// In-process storage. Nothing survives a restart; used by tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> Result<Option<StoredEntry>> {
        Ok(self.entries().get(key).cloned())
    }

    fn store(&self, key: &str, entry: StoredEntry) -> Result<()> {
        self.entries().insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Session entries persisted as one JSON document on disk.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, StoredEntry>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Session file {} is corrupted", self.path.display()))
    }

    fn write_all(&self, entries: &HashMap<String, StoredEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace session file {}", self.path.display()))?;
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, key: &str) -> Result<Option<StoredEntry>> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read_all()?.get(key).cloned())
    }

    fn store(&self, key: &str, entry: StoredEntry) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable session file: {:#}", e);
            HashMap::new()
        });
        entries.retain(|_, entry| !entry.is_expired());
        entries.insert(key.to_string(), entry);
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable session file: {:#}", e);
            HashMap::new()
        });
        entries.remove(key);
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_entries_expire_in_seven_days() {
        let entry = StoredEntry::session("T");
        let horizon = entry.expires_at - Utc::now();
        assert!(horizon <= Duration::days(7));
        assert!(horizon > Duration::days(7) - Duration::minutes(1));
        assert_eq!(entry.path, "/");
        assert_eq!(entry.same_site, SameSite::Strict);
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let storage = MemorySessionStorage::new();
        let mut entry = StoredEntry::session("stale");
        entry.expires_at = Utc::now() - Duration::seconds(1);
        storage.store(TOKEN_KEY, entry).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(storage.load(TOKEN_KEY).unwrap().is_some());
    }

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemorySessionStorage::new();
        storage.set(TOKEN_KEY, "T").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("T"));
        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileSessionStorage::new(&path).set(TOKEN_KEY, "T").unwrap();

        let reopened = FileSessionStorage::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("T"));
        let entry = reopened.load(TOKEN_KEY).unwrap().unwrap();
        assert_eq!(entry.same_site, SameSite::Strict);
    }

    #[test]
    fn corrupted_file_errors_on_read_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(storage.get(USER_KEY).is_err());

        storage.remove(USER_KEY).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        storage.set(USER_KEY, "{}").unwrap();
        assert!(storage.path().exists());
    }
}
