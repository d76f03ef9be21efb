//! Secret store client.
//!
//! Abstracts authenticated access to a key/value secret backend.
//!
//! ## Adding a New Store Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `consul.rs`)
//! 3. Re-export from this module

use zeroize::Zeroizing;

use crate::core::types::{SecretPath, SecretValue, SessionToken};
use crate::error::StoreError;

mod memory;
mod vault;

pub use memory::MemoryStore;
pub use vault::VaultClient;

/// What to exchange for a session token.
pub enum Credentials {
    /// Username and password for the userpass auth method.
    UserPass {
        username: String,
        password: Zeroizing<String>,
    },
    /// A previously issued token to validate and reuse.
    Token(SessionToken),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

/// Secret store trait.
///
/// Every operation either succeeds completely or returns a `StoreError`.
pub trait SecretStore {
    /// Read the value stored at `path`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the backend holds no data at `path`
    /// - `StoreError::Unauthorized` if there is no session or it was rejected
    /// - `StoreError::Transport` on connectivity failures or timeouts
    fn read(&self, path: &SecretPath) -> Result<SecretValue, StoreError>;

    /// Store `value` at `path`, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read), plus `StoreError::PermissionDenied` if
    /// the session lacks write grants.
    fn write(&self, path: &SecretPath, value: &str) -> Result<(), StoreError>;

    /// Exchange credentials for a session token.
    ///
    /// On success the store keeps the token for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCredentials` if the backend rejects them.
    fn authenticate(&mut self, credentials: &Credentials) -> Result<SessionToken, StoreError>;

    /// Whether the store currently holds a session token.
    fn has_session(&self) -> bool;
}

impl<S: SecretStore + ?Sized> SecretStore for &mut S {
    fn read(&self, path: &SecretPath) -> Result<SecretValue, StoreError> {
        (**self).read(path)
    }

    fn write(&self, path: &SecretPath, value: &str) -> Result<(), StoreError> {
        (**self).write(path, value)
    }

    fn authenticate(&mut self, credentials: &Credentials) -> Result<SessionToken, StoreError> {
        (**self).authenticate(credentials)
    }

    fn has_session(&self) -> bool {
        (**self).has_session()
    }
}
