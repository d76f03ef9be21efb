//! Core library components.
//!
//! Secret store access, session handling, and template rendering.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod session;
pub mod store;
pub mod template;
pub mod token;
pub mod types;
