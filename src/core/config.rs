//! Client configuration.
//!
//! Built from defaults, then an optional `~/.vaultage.toml`, then
//! command-line overrides. The resulting [`Config`] is passed explicitly to
//! the store client; nothing here is process-global.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Version of the key/value secrets engine behind the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KvVersion {
    #[default]
    V1,
    V2,
}

impl TryFrom<u8> for KvVersion {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(KvVersion::V1),
            2 => Ok(KvVersion::V2),
            other => Err(format!("unsupported kv version {}", other)),
        }
    }
}

impl From<KvVersion> for u8 {
    fn from(value: KvVersion) -> Self {
        match value {
            KvVersion::V1 => 1,
            KvVersion::V2 => 2,
        }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Vault server address, e.g. `https://vault.example.com:8200`
    pub address: String,
    /// Secrets engine mount path
    pub mount: String,
    /// KV engine version behind `mount`
    pub kv_version: KvVersion,
    /// Userpass login name
    pub username: String,
    /// Where the session token is persisted. `None` when there is no home
    /// directory and the config file names no path.
    pub token_path: Option<PathBuf>,
    /// Per-request timeout
    pub timeout: Duration,
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub address: Option<String>,
    pub mount: Option<String>,
    pub kv_version: Option<KvVersion>,
    pub username: Option<String>,
    pub token_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub address: Option<String>,
    pub mount: Option<String>,
    pub username: Option<String>,
}

impl Config {
    /// Built-in defaults for the current user.
    pub fn defaults() -> Self {
        Self::defaults_in(dirs::home_dir().as_deref())
    }

    fn defaults_in(home: Option<&Path>) -> Self {
        Self {
            address: constants::DEFAULT_ADDRESS.to_string(),
            mount: constants::DEFAULT_MOUNT.to_string(),
            kv_version: KvVersion::default(),
            username: whoami::username(),
            token_path: home.map(|home| home.join(constants::TOKEN_FILE)),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Default location of the config file.
    ///
    /// `VAULTAGE_CONFIG` wins over `~/.vaultage.toml`.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(constants::CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(constants::CONFIG_FILE))
    }

    /// Load configuration: defaults, then the config file if present, then
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file can't be read or parsed, or if
    /// the merged configuration is invalid.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut config = Self::defaults();

        if let Some(path) = Self::config_path() {
            if path.exists() {
                config.apply_file(read_file(&path)?);
            } else {
                debug!(path = %path.display(), "no config file");
            }
        }

        config.apply_overrides(overrides);
        config.validate()?;

        debug!(
            address = %config.address,
            mount = %config.mount,
            username = %config.username,
            "config loaded"
        );

        Ok(config)
    }

    /// Merge values from a config file over the current ones.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(address) = file.address {
            self.address = address;
        }
        if let Some(mount) = file.mount {
            self.mount = mount;
        }
        if let Some(kv_version) = file.kv_version {
            self.kv_version = kv_version;
        }
        if let Some(username) = file.username {
            self.username = username;
        }
        if let Some(token_path) = file.token_path {
            self.token_path = Some(token_path);
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
    }

    /// Merge command-line overrides over the current values.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(address) = &overrides.address {
            self.address = address.clone();
        }
        if let Some(mount) = &overrides.mount {
            self.mount = mount.clone();
        }
        if let Some(username) = &overrides.username {
            self.username = username.clone();
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "address",
                reason: format!("'{}' must start with http:// or https://", self.address),
            }
            .into());
        }

        if self.mount.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid {
                field: "mount",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if self.username.is_empty() {
            return Err(ConfigError::Invalid {
                field: "username",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let file: FileConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok(file)
}
