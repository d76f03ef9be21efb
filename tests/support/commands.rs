//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a vaultage command pointed at the mock server.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - VAULT_ADDR set to the mock server
    /// - Current directory set to the test working directory
    pub fn cmd(&self) -> Command {
        Command::from_std(self.std_cmd())
    }

    /// Same environment as [`cmd`](Self::cmd), for tests that need to
    /// spawn the process and signal it.
    pub fn std_cmd(&self) -> std::process::Command {
        #[allow(deprecated)]
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("vaultage"));
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("VAULT_ADDR", self.vault.uri());
        cmd.env("VAULTAGE_USER", "alice");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("VAULT_TOKEN");
        cmd.env_remove("VAULT_MOUNT");
        cmd.env_remove("VAULTAGE_CONFIG");
        cmd.env_remove("VAULTAGE_LOG");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run vaultage with `args` off the async runtime.
    pub async fn run(&self, args: &[&str]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(args);
        blocking(move || cmd.output().expect("failed to run vaultage")).await
    }

    /// Run vaultage with `args`, feeding `input` on stdin.
    pub async fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut cmd = self.cmd();
        cmd.args(args).write_stdin(input.to_string());
        blocking(move || cmd.output().expect("failed to run vaultage")).await
    }

    /// Shortcut for `vaultage stamp <file>` on a template written to disk.
    pub async fn stamp(&self, template: &str) -> Output {
        let path = self.file("config.tmpl", template);
        self.run(&["stamp", path.to_str().expect("utf-8 path")]).await
    }

    /// Shortcut for `vaultage read <path>`.
    pub async fn read(&self, path: &str) -> Output {
        self.run(&["read", path]).await
    }

    /// Shortcut for `vaultage write <path> <value>`.
    pub async fn write(&self, path: &str, value: &str) -> Output {
        self.run(&["write", path, value]).await
    }
}

/// Run blocking work without stalling the mock server.
pub async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}
