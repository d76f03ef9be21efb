//! Vaultage - a simple Vault CLI.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── login         # login, logout, set-password
//! │   ├── secrets       # read and write secrets
//! │   ├── stamp         # render templates with secrets interpolated
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # defaults, ~/.vaultage.toml, overrides
//!     ├── store/        # Secret store backends
//!     │   ├── mod       # SecretStore trait
//!     │   ├── vault     # Vault HTTP client
//!     │   └── memory    # In-memory store
//!     ├── session       # Login gate
//!     ├── token         # Persisted session token
//!     └── template/     # Two-pass secret resolution
//! ```
//!
//! # Rendering
//!
//! ```no_run
//! use vaultage::core::store::MemoryStore;
//! use vaultage::core::template::Resolver;
//!
//! let store = MemoryStore::new().with("db/user", "alice");
//! let text = Resolver::new(&store)
//!     .render(r#"user={{secret "db/user"}}"#, &serde_json::Value::Null)?;
//! assert_eq!(text, "user=alice");
//! # Ok::<(), vaultage::error::RenderError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
