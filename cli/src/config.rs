use crate::storage::{FileStore, KEYRING_SERVICE, KeyringStore, TokenStore};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Environment variable that overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "MEMBER_API_URL";

/// Where the session token is kept between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// System keychain.
    #[default]
    Keyring,
    /// `storage.toml` next to the config file.
    File,
}

/// Contents of `config.toml`. Missing keys fall back to defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub storage: StorageBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage: StorageBackend::default(),
        }
    }
}

impl AppConfig {
    /// Platform config directory, created on first use.
    pub fn dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "member", "member")
            .context("Could not determine config directory")?;
        let config_dir = proj_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Reads a config file. A file that doesn't exist yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// File, then `MEMBER_API_URL`, then the `--api-url` flag. Later wins.
    pub fn resolve(flag: Option<String>) -> Result<Self> {
        let config = Self::load_from(&Self::path()?)?;
        Ok(config.with_overrides(std::env::var(API_URL_ENV).ok(), flag))
    }

    pub fn with_overrides(mut self, env: Option<String>, flag: Option<String>) -> Self {
        if let Some(url) = env.into_iter().chain(flag).filter(|u| !u.trim().is_empty()).last() {
            self.api_url = url.trim().to_string();
        }
        self
    }

    /// Opens the configured token backend.
    pub fn token_store(&self) -> Result<TokenStore> {
        let store = match self.storage {
            StorageBackend::Keyring => TokenStore::new(Arc::new(KeyringStore::new(KEYRING_SERVICE))),
            StorageBackend::File => {
                TokenStore::new(Arc::new(FileStore::new(Self::dir()?.join("storage.toml"))))
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.storage, StorageBackend::Keyring);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "storage = \"file\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn full_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://members.example.com/api\"\nstorage = \"keyring\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();

        assert_eq!(config.api_url, "https://members.example.com/api");
        assert_eq!(config.storage, StorageBackend::Keyring);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "storage = \"floppy\"\n").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let base = AppConfig::default();

        let env_only = base.clone().with_overrides(Some("http://env/api".into()), None);
        assert_eq!(env_only.api_url, "http://env/api");

        let both = base
            .clone()
            .with_overrides(Some("http://env/api".into()), Some("http://flag/api".into()));
        assert_eq!(both.api_url, "http://flag/api");

        let none = base.with_overrides(None, None);
        assert_eq!(none.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = AppConfig::default().with_overrides(Some("  ".into()), Some(String::new()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
