//! Configuration system for MediConnect
//!
//! Settings live in a TOML file. Every section is optional; a missing file
//! yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::appointment::LifecyclePolicy;
use crate::credentials::HashingConfig;
use crate::error::{ConfigError, CoreError};
use crate::session::{DEFAULT_SESSION_KEY, FileSessionStorage, is_valid_session_key};

/// Resolve a path relative to a base directory
/// If the path is absolute, return it as-is
fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Top-level configuration for a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Load the demo accounts and records on open
    #[serde(default = "default_seed_fixtures")]
    pub seed_fixtures: bool,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub hashing: HashingConfig,
}

fn default_seed_fixtures() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_fixtures: true,
            session: SessionConfig::default(),
            lifecycle: LifecycleConfig::default(),
            hashing: HashingConfig::default(),
        }
    }
}

/// Where the logged-in identity is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory for session files; the platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Storage key for the identity
    #[serde(default = "default_session_key")]
    pub key: String,
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            directory: None,
            key: default_session_key(),
        }
    }
}

impl SessionConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(FileSessionStorage::default_directory)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub policy: LifecyclePolicy,
}

impl StoreConfig {
    /// Check values serde can't express
    fn validate(&self, path: &Path) -> Result<()> {
        let key = &self.session.key;
        if key.is_empty() {
            return Err(CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field: "session.key".to_string(),
                expected: "non-empty storage key".to_string(),
                cause: ConfigError::InvalidValue("empty session key".to_string()),
            });
        }
        if !is_valid_session_key(key) {
            return Err(CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field: "session.key".to_string(),
                expected: "letters, digits, '-' or '_'".to_string(),
                cause: ConfigError::InvalidValue(format!("session key {:?}", key)),
            });
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<StoreConfig> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field: "file".to_string(),
                expected: "readable TOML file".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;

    let mut config: StoreConfig =
        toml::from_str(&content).map_err(|e| CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "content".to_string(),
            expected: "valid TOML configuration".to_string(),
            cause: ConfigError::TomlParse(e.to_string()),
        })?;

    config.validate(path)?;

    // Resolve the session directory relative to the config file's directory
    let base_dir = path.parent().unwrap_or(Path::new("."));
    if let Some(ref directory) = config.session.directory {
        config.session.directory = Some(resolve_path(base_dir, directory));
    }

    Ok(config)
}

/// Save configuration to a TOML file
pub async fn save_config(config: &StoreConfig, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::ConfigurationError {
                config_path: parent.display().to_string(),
                field: "directory".to_string(),
                expected: "writable directory".to_string(),
                cause: ConfigError::Io(e.to_string()),
            })?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| CoreError::ConfigurationError {
        config_path: path.display().to_string(),
        field: "serialization".to_string(),
        expected: "serializable config structure".to_string(),
        cause: ConfigError::TomlSerialize(e.to_string()),
    })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "file".to_string(),
            expected: "writable file location".to_string(),
            cause: ConfigError::Io(e.to_string()),
        })?;

    Ok(())
}

/// Standard configuration file locations, most specific first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Project-specific config
    paths.push(PathBuf::from("mediconnect.toml"));

    // User config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mediconnect").join("config.toml"));
    }

    // Home directory fallback
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".mediconnect").join("config.toml"));
    }

    paths
}

/// Load configuration from standard locations
pub async fn load_config_from_standard_locations() -> Result<StoreConfig> {
    for path in config_paths() {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            return load_config(&path).await;
        }
    }

    // No config found, return default
    Ok(StoreConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.seed_fixtures);
        assert_eq!(config.session.key, "mediConnectUser");
        assert_eq!(config.lifecycle.policy, LifecyclePolicy::Enforced);
    }

    #[test]
    fn test_config_serialization() {
        let config = StoreConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[session]"));
        assert!(toml.contains("[lifecycle]"));
        assert!(toml.contains("[hashing]"));
        assert!(toml.contains("policy = \"enforced\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [lifecycle]
            policy = "permissive"
            "#,
        )
        .unwrap();

        assert_eq!(config.lifecycle.policy, LifecyclePolicy::Permissive);
        assert!(config.seed_fixtures);
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.hashing, HashingConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load_resolves_session_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("mediconnect.toml");

        let mut config = StoreConfig::default();
        config.session.directory = Some(PathBuf::from("sessions"));
        config.hashing = HashingConfig::low_cost();
        save_config(&config, &path).await.unwrap();

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(
            loaded.session.directory,
            Some(dir.path().join("conf").join("sessions"))
        );
        assert_eq!(loaded.hashing, HashingConfig::low_cost());
    }

    #[tokio::test]
    async fn test_empty_session_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        tokio::fs::write(&path, "[session]\nkey = \"  \"\n")
            .await
            .unwrap();

        match load_config(&path).await {
            Err(CoreError::ConfigurationError { field, .. }) => assert_eq!(field, "session.key"),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_key_charset_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.toml");

        for key in ["user.a", "...", "a/b"] {
            tokio::fs::write(&path, format!("[session]\nkey = {:?}\n", key))
                .await
                .unwrap();
            match load_config(&path).await {
                Err(CoreError::ConfigurationError { field, .. }) => {
                    assert_eq!(field, "session.key")
                }
                other => panic!("{:?} should be rejected, got {:?}", key, other),
            }
        }

        tokio::fs::write(&path, "[session]\nkey = \"user_a-2\"\n")
            .await
            .unwrap();
        assert_eq!(load_config(&path).await.unwrap().session.key, "user_a-2");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).await.is_err());
    }
}
