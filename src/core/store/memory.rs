//! In-memory secret store.
//!
//! Map-backed implementation of [`SecretStore`] that counts every call.
//! Useful for tests and for exercising the resolver without a server.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{Credentials, SecretStore};
use crate::core::types::{SecretPath, SecretValue, SessionToken};
use crate::error::StoreError;

/// In-memory store.
///
/// Starts with a session unless [`require_login`](Self::require_login) is
/// called.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: RefCell<BTreeMap<String, String>>,
    failures: BTreeMap<String, StoreError>,
    users: BTreeMap<String, String>,
    tokens: Vec<String>,
    session: Option<SessionToken>,
    locked: bool,
    reads: RefCell<BTreeMap<String, usize>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret.
    pub fn with(self, path: &str, value: &str) -> Self {
        self.secrets
            .borrow_mut()
            .insert(path.to_string(), value.to_string());
        self
    }

    /// Make reads of `path` fail with `error`.
    pub fn failing(mut self, path: &str, error: StoreError) -> Self {
        self.failures.insert(path.to_string(), error);
        self
    }

    /// Drop the session; calls fail with `Unauthorized` until
    /// [`authenticate`](SecretStore::authenticate) succeeds.
    pub fn require_login(mut self) -> Self {
        self.locked = true;
        self.session = None;
        self
    }

    /// Register a userpass account.
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }

    /// Register a token that `Credentials::Token` will accept.
    pub fn with_token(mut self, token: &str) -> Self {
        self.tokens.push(token.to_string());
        self
    }

    /// Number of reads of `path`.
    pub fn reads_of(&self, path: &str) -> usize {
        self.reads.borrow().get(path).copied().unwrap_or(0)
    }

    /// Number of reads across all paths.
    pub fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }

    /// Number of writes.
    pub fn total_writes(&self) -> usize {
        *self.writes.borrow()
    }

    /// Current value at `path`, bypassing the counters.
    pub fn get(&self, path: &str) -> Option<String> {
        self.secrets.borrow().get(path).cloned()
    }

    fn check_session(&self) -> Result<(), StoreError> {
        if self.locked && self.session.is_none() {
            return Err(StoreError::Unauthorized);
        }
        Ok(())
    }
}

impl SecretStore for MemoryStore {
    fn read(&self, path: &SecretPath) -> Result<SecretValue, StoreError> {
        *self
            .reads
            .borrow_mut()
            .entry(path.as_str().to_string())
            .or_insert(0) += 1;

        self.check_session()?;

        if let Some(error) = self.failures.get(path.as_str()) {
            return Err(error.clone());
        }

        self.secrets
            .borrow()
            .get(path.as_str())
            .map(SecretValue::new)
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn write(&self, path: &SecretPath, value: &str) -> Result<(), StoreError> {
        *self.writes.borrow_mut() += 1;
        self.check_session()?;

        self.secrets
            .borrow_mut()
            .insert(path.as_str().to_string(), value.to_string());
        Ok(())
    }

    fn authenticate(&mut self, credentials: &Credentials) -> Result<SessionToken, StoreError> {
        let token = match credentials {
            Credentials::UserPass { username, password } => {
                match self.users.get(username) {
                    Some(expected) if expected == password.as_str() => {
                        SessionToken::new(format!("token-{}", username))
                    }
                    _ => return Err(StoreError::InvalidCredentials),
                }
            }
            Credentials::Token(token) => {
                if !self.tokens.iter().any(|t| t == token.expose()) {
                    return Err(StoreError::InvalidCredentials);
                }
                token.clone()
            }
        };

        self.session = Some(token.clone());
        Ok(token)
    }

    fn has_session(&self) -> bool {
        !self.locked || self.session.is_some()
    }
}
