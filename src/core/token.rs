//! Persisted session token.
//!
//! The token lives in a plain file (`~/.vault-token` by default), readable
//! only by its owner on Unix. Without a home directory there may be no file
//! at all; such a cache holds nothing and refuses to save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::types::SessionToken;
use crate::error::{ConfigError, Result};

/// Token file on disk.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: Option<PathBuf>,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A cache with no backing file.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the persisted token.
    ///
    /// A missing or blank file means no token.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<SessionToken>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no token file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let token = contents.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SessionToken::new(token)))
    }

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if there is no backing file, or an
    /// IO error if it cannot be written.
    pub fn save(&self, token: &SessionToken) -> Result<()> {
        let path = self.path.as_deref().ok_or(ConfigError::NoHomeDir)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        write_private(path, token.expose())?;
        debug!(path = %path.display(), "token saved");
        Ok(())
    }

    /// Remove the persisted token. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to `path`, readable only by the owner on Unix.
#[cfg(unix)]
pub(crate) fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
pub(crate) fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}
