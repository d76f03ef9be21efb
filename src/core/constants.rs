//! Constants used throughout vaultage.
//!
//! Centralizes default values and well-known names.

/// Default Vault server address.
pub const DEFAULT_ADDRESS: &str = "https://127.0.0.1:8200";

/// Default secrets engine mount.
pub const DEFAULT_MOUNT: &str = "secret";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Token file name relative to HOME (~/.vault-token).
pub const TOKEN_FILE: &str = ".vault-token";

/// Config file name relative to HOME (~/.vaultage.toml).
pub const CONFIG_FILE: &str = ".vaultage.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "VAULTAGE_CONFIG";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "VAULTAGE_LOG";

/// Name of the template function that looks up a secret.
pub const SECRET_HELPER: &str = "secret";

/// Field holding the secret payload in a Vault secret.
pub const VALUE_FIELD: &str = "value";
