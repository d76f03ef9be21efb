//! Session gate.
//!
//! Makes sure a store holds a session before secrets are touched: reuse the
//! persisted token when the server still accepts it, otherwise ask for the
//! password and persist the new token.

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::store::{Credentials, SecretStore};
use crate::core::token::TokenCache;
use crate::error::{RenderError, Result, StoreError};

/// Interactive input.
pub trait Prompt {
    /// Ask for a value without echoing it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no terminal or input is aborted.
    fn hidden(&self, message: &str) -> Result<Zeroizing<String>>;
}

/// Login strategy for one user.
pub struct Login<'a> {
    username: &'a str,
    cache: &'a TokenCache,
    prompt: &'a dyn Prompt,
}

impl<'a> Login<'a> {
    pub fn new(username: &'a str, cache: &'a TokenCache, prompt: &'a dyn Prompt) -> Self {
        Self {
            username,
            cache,
            prompt,
        }
    }

    /// Obtain a session if `store` has none.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Unauthenticated` if neither the persisted token
    /// nor the interactive login succeed. Transport failures propagate as
    /// `StoreError`.
    pub fn ensure<S: SecretStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        if store.has_session() {
            return Ok(());
        }

        if self.try_cached(store)? {
            return Ok(());
        }

        match self.interactive(store) {
            Ok(()) => Ok(()),
            Err(crate::error::Error::Store(StoreError::InvalidCredentials)) => {
                Err(RenderError::Unauthenticated.into())
            }
            Err(crate::error::Error::Prompt(e)) => {
                warn!("interactive login failed: {}", e);
                Err(RenderError::Unauthenticated.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Prompt for the password and log in, replacing any persisted token.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCredentials` if the password is rejected.
    pub fn interactive<S: SecretStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        let password = self.prompt.hidden("Enter your vault password")?;
        let credentials = Credentials::UserPass {
            username: self.username.to_string(),
            password,
        };

        let token = store.authenticate(&credentials)?;
        self.cache.save(&token)?;
        info!(username = self.username, "logged in");
        Ok(())
    }

    fn try_cached<S: SecretStore + ?Sized>(&self, store: &mut S) -> Result<bool> {
        let Some(token) = self.cache.load()? else {
            return Ok(false);
        };

        match store.authenticate(&Credentials::Token(token)) {
            Ok(_) => {
                debug!(path = ?self.cache.path(), "reusing persisted token");
                Ok(true)
            }
            Err(StoreError::InvalidCredentials | StoreError::Unauthorized) => {
                warn!("persisted token was rejected, logging in again");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
