//! # Edge Configuration
//!
//! ## Configuration Sources (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults                                                            │
//! │     data_dir   = platform data dir (fallback ./data)                    │
//! │     store      = sqlite                                                 │
//! │     env        = dev                                                    │
//! │     public_dir = web/public                                             │
//! │                                                                         │
//! │  2. TOML file: $UT_CONFIG, else <data_dir>/edge.toml if present         │
//! │                                                                         │
//! │  3. Environment: UT_DATA_DIR, UT_STORE, UT_ENV, UT_PUBLIC_DIR,          │
//! │     UT_CURRENCY                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! store = "file"
//! env = "prod"
//! public_dir = "/srv/till/public"
//! currency = "EUR"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use till_db::{StorageBackend, UnknownBackend};
use tracing::{debug, info};

/// Name of the config file looked up inside the data directory.
pub const CONFIG_FILE: &str = "edge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Backend(#[from] UnknownBackend),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// On-disk shape: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    store: Option<String>,
    env: Option<String>,
    public_dir: Option<PathBuf>,
    currency: Option<String>,
}

/// Resolved configuration of one edge terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    /// Root for settings, buttons, the database and plugin directories.
    pub data_dir: PathBuf,

    /// Store backend. Default: sqlite.
    pub store: StorageBackend,

    /// Deployment label (`dev`, `prod`, ...). Only logged.
    pub env: String,

    /// Where `/public/...` bundle sources resolve.
    pub public_dir: PathBuf,

    /// Display currency override. `None` follows the saved settings.
    pub currency: Option<String>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        EdgeConfig {
            data_dir: default_data_dir(),
            store: StorageBackend::default(),
            env: "dev".to_string(),
            public_dir: PathBuf::from("web").join("public"),
            currency: None,
        }
    }
}

impl EdgeConfig {
    /// Loads from the process environment.
    pub fn load() -> ConfigResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let env = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = EdgeConfig::default();

        if let Some(dir) = env("UT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        let explicit = env("UT_CONFIG").map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| config.data_dir.join(CONFIG_FILE));

        if explicit.is_some() || path.exists() {
            info!(path = %path.display(), "Loading edge config file");
            config.apply_file(read_file(&path)?)?;
        } else {
            debug!(path = %path.display(), "No edge config file, using defaults");
        }

        // Environment wins over the file.
        if let Some(dir) = env("UT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(store) = env("UT_STORE") {
            config.store = store.parse()?;
        }
        if let Some(name) = env("UT_ENV") {
            config.env = name;
        }
        if let Some(dir) = env("UT_PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }
        if let Some(code) = env("UT_CURRENCY") {
            config.currency = Some(code);
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) -> ConfigResult<()> {
        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(store) = file.store {
            self.store = store.parse()?;
        }
        if let Some(name) = file.env.filter(|v| !v.trim().is_empty()) {
            self.env = name;
        }
        if let Some(dir) = file.public_dir {
            self.public_dir = dir;
        }
        if let Some(code) = file.currency.filter(|v| !v.trim().is_empty()) {
            self.currency = Some(code);
        }
        Ok(())
    }

    /// `<data_dir>/plugins`.
    pub fn plugins_dir(&self) -> PathBuf {
        self.data_dir.join("plugins")
    }
}

fn read_file(path: &Path) -> ConfigResult<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Platform data directory, or `./data` when there is none.
///
/// - **Linux**: `~/.local/share/unitill-edge`
/// - **macOS**: `~/Library/Application Support/com.unitill.edge`
/// - **Windows**: `%APPDATA%\unitill\edge\data`
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "unitill", "edge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_str().unwrap();
        let config = EdgeConfig::load_with(env_of(&[("UT_DATA_DIR", data)])).unwrap();

        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.store, StorageBackend::Sqlite);
        assert_eq!(config.env, "dev");
        assert_eq!(config.public_dir, PathBuf::from("web/public"));
        assert_eq!(config.currency, None);
        assert_eq!(config.plugins_dir(), dir.path().join("plugins"));
    }

    #[test]
    fn test_file_in_data_dir_then_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "store = \"file\"\nenv = \"prod\"\ncurrency = \"EUR\"\n",
        )
        .unwrap();
        let data = dir.path().to_str().unwrap();

        let config = EdgeConfig::load_with(env_of(&[("UT_DATA_DIR", data)])).unwrap();
        assert_eq!(config.store, StorageBackend::Document);
        assert_eq!(config.env, "prod");
        assert_eq!(config.currency.as_deref(), Some("EUR"));

        let config = EdgeConfig::load_with(env_of(&[
            ("UT_DATA_DIR", data),
            ("UT_STORE", "sqlite"),
            ("UT_CURRENCY", "USD"),
            ("UT_ENV", "  "),
        ]))
        .unwrap();
        assert_eq!(config.store, StorageBackend::Sqlite);
        assert_eq!(config.currency.as_deref(), Some("USD"));
        assert_eq!(config.env, "prod");
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "public_dir = \"/srv/public\"\n").unwrap();

        let config = EdgeConfig::load_with(env_of(&[
            ("UT_DATA_DIR", dir.path().to_str().unwrap()),
            ("UT_CONFIG", path.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.public_dir, PathBuf::from("/srv/public"));
    }

    #[test]
    fn test_errors() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().to_str().unwrap();

        let err = EdgeConfig::load_with(env_of(&[("UT_DATA_DIR", data), ("UT_STORE", "mongo")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Backend(_)));

        std::fs::write(dir.path().join(CONFIG_FILE), "store = [").unwrap();
        let err = EdgeConfig::load_with(env_of(&[("UT_DATA_DIR", data)])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = dir.path().join("nope.toml");
        let err = EdgeConfig::load_with(env_of(&[
            ("UT_DATA_DIR", data),
            ("UT_CONFIG", missing.to_str().unwrap()),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
