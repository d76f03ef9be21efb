//! Test support utilities for vaultage integration tests.
//!
//! Provides an isolated home directory per test and a mock Vault server.

#![allow(dead_code)]

pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;
use wiremock::MockServer;

/// Test environment with an isolated home and a mock Vault.
///
/// No process-global state is mutated; child processes get `HOME` and
/// `VAULT_ADDR` through their environment.
pub struct Test {
    /// Temporary working directory for templates and outputs
    pub dir: TempDir,
    /// Temporary home directory holding `.vault-token`
    pub home: TempDir,
    /// Mock Vault server
    pub vault: MockServer,
}

impl Test {
    /// Create a new environment with no persisted token.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        let vault = MockServer::start().await;

        Self { dir, home, vault }
    }

    /// Create an environment whose persisted token the server accepts.
    pub async fn logged_in() -> Self {
        let t = Self::new().await;
        t.persist_token(TOKEN);
        accept_token(&t.vault, TOKEN).await;
        t
    }

    /// Path of the persisted token file.
    pub fn token_path(&self) -> PathBuf {
        self.home.path().join(".vault-token")
    }

    /// Write `token` to the token file.
    pub fn persist_token(&self, token: &str) {
        std::fs::write(self.token_path(), token).expect("failed to write token");
    }

    /// Write a file into the working directory and return its path.
    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }
}
