//! Session persistence
//!
//! Only the logged-in identity survives a restart. It is stored as a JSON
//! string under a single key; everything else is rebuilt from fixtures.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{CoreError, Result};

/// Storage key for the persisted identity
pub const DEFAULT_SESSION_KEY: &str = "mediConnectUser";

static SESSION_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("session key pattern is valid"));

/// Keys double as file names, so only letters, digits, `-` and `_` are allowed
pub fn is_valid_session_key(key: &str) -> bool {
    SESSION_KEY_RE.is_match(key)
}

/// Key-value storage for serialized session state
#[async_trait]
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<String>>;

    async fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Stores each key as `<directory>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    directory: PathBuf,
}

impl FileSessionStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The platform data directory, then `~/.mediconnect/session`, then a
    /// relative directory
    pub fn default_directory() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("mediconnect").join("session"))
            .or_else(|| dirs::home_dir().map(|home| home.join(".mediconnect").join("session")))
            .unwrap_or_else(|| PathBuf::from(".mediconnect/session"))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, operation: &'static str, key: &str) -> Result<PathBuf> {
        if !is_valid_session_key(key) {
            return Err(CoreError::SessionStorage {
                operation,
                location: format!("key {:?}", key),
                cause: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "session keys may only contain letters, digits, '-' or '_'",
                ),
            });
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

fn storage_error(operation: &'static str, path: &Path, cause: std::io::Error) -> CoreError {
    CoreError::SessionStorage {
        operation,
        location: path.display().to_string(),
        cause,
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for("read", key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for("write", key)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| storage_error("create the directory for", &path, e))?;

        // write-then-rename so a crash never leaves a half-written session
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| storage_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| storage_error("write", &path, e))?;

        tracing::debug!("Saved session key {} to {}", key, path.display());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for("remove", key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &path, e)),
        }
    }
}

/// Process-local storage, for tests and throwaway stores
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for `key`, without going through the async interface
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
