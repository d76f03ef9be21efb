//! Secret lookup strategies.
//!
//! The template's `secret` function delegates to whichever strategy is
//! active for the current pass.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::trace;

use super::resolution::{DiscoverySet, ResolvedSecrets};
use crate::core::types::SecretPath;

/// A path the substitution pass asked for that discovery never saw.
///
/// Happens when a template computes a path from another secret's value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("secret '{0}' was not discovered before rendering (paths computed from secret values are unsupported)")]
pub struct Undiscovered(pub SecretPath);

/// Resolve a secret path to the text the template should see.
pub trait SecretLookup: Send + Sync {
    /// # Errors
    ///
    /// Returns `Undiscovered` if the strategy has no value for `path`.
    fn lookup(&self, path: &SecretPath) -> Result<&str, Undiscovered>;
}

/// Discovery strategy: records every path and yields an empty string.
#[derive(Debug, Default)]
pub struct RecordingLookup {
    discovered: Mutex<DiscoverySet>,
}

impl RecordingLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// The paths recorded so far.
    pub fn into_discovered(self) -> DiscoverySet {
        self.discovered
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretLookup for RecordingLookup {
    fn lookup(&self, path: &SecretPath) -> Result<&str, Undiscovered> {
        let mut discovered = self
            .discovered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if discovered.insert(path.clone()) {
            trace!(path = %path, "discovered secret reference");
        }
        Ok("")
    }
}

/// Substitution strategy: yields the resolved value for each path.
#[derive(Debug)]
pub struct ResolvingLookup<'a> {
    secrets: &'a ResolvedSecrets,
}

impl<'a> ResolvingLookup<'a> {
    pub fn new(secrets: &'a ResolvedSecrets) -> Self {
        Self { secrets }
    }
}

impl SecretLookup for ResolvingLookup<'_> {
    fn lookup(&self, path: &SecretPath) -> Result<&str, Undiscovered> {
        self.secrets
            .get(path.as_str())
            .map(|value| value.expose())
            .ok_or_else(|| Undiscovered(path.clone()))
    }
}
