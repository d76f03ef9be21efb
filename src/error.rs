//! Error types.
//!
//! Each concern gets its own enum; [`Error`] wraps them for the CLI.

use std::fmt;

use thiserror::Error;

use crate::core::types::SecretPath;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("unable to determine home directory; set token_path in the config file")]
    NoHomeDir,
}

/// Secret store errors.
///
/// Returned by every [`SecretStore`](crate::core::store::SecretStore)
/// operation. `Clone` so a failure can be kept per path in a resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("secret not found: {path}")]
    NotFound { path: String },

    #[error("not authorized: missing or invalid token")]
    Unauthorized,

    #[error("permission denied writing {path}")]
    PermissionDenied { path: String },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response from vault: {0}")]
    InvalidResponse(String),
}

/// Template rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Parse(String),

    #[error("{}", SecretFailures(.0))]
    SecretsUnavailable(Vec<SecretFailure>),

    #[error("not authenticated: run `vaultage login`")]
    Unauthenticated,

    #[error("render cancelled")]
    Cancelled,

    #[error("template execution failed: {0}")]
    Render(String),
}

impl RenderError {
    /// Paths that failed to resolve, sorted. Empty for other variants.
    pub fn failed_paths(&self) -> Vec<&SecretPath> {
        match self {
            RenderError::SecretsUnavailable(failures) => {
                failures.iter().map(|f| &f.path).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// One secret that could not be read during a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFailure {
    pub path: SecretPath,
    pub cause: StoreError,
}

impl fmt::Display for SecretFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read secret '{}': {}", self.path, self.cause)
    }
}

struct SecretFailures<'a>(&'a [SecretFailure]);

impl fmt::Display for SecretFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read all secrets:")?;
        for failure in self.0 {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret path cannot be empty")]
    EmptyPath,

    #[error("value for {0} cannot be empty")]
    EmptyValue(String),

    #[error("passwords don't match")]
    PasswordMismatch,
}

pub type Result<T> = std::result::Result<T, Error>;
