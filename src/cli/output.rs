//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, commands, hints
//!
//! Everything here writes to stderr. Stdout is reserved for secret values
//! and rendered templates so they can be piped.

use console::style;

use crate::error::{Error, RenderError, StoreError};

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err() && console::colors_enabled_stderr()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ logged in as alice`
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message (red).
///
/// Multi-line messages keep their line breaks.
///
/// Example: `✗ failed to read all secrets:`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
///
/// Example: `⚠ no token to remove`
pub fn warn(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("⚠").yellow(), msg);
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run: vaultage login`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Format a secret path in cyan.
///
/// Returns a colored string that can be used inline.
pub fn path(p: &str) -> String {
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Follow-up hint for a failed command, if one applies.
pub fn suggestion(error: &Error) -> Option<&'static str> {
    const LOGIN: &str = "run: vaultage login";

    match error {
        Error::Render(RenderError::Unauthenticated)
        | Error::Store(StoreError::Unauthorized | StoreError::InvalidCredentials) => Some(LOGIN),
        Error::Render(RenderError::SecretsUnavailable(failures))
            if !failures.is_empty()
                && failures
                    .iter()
                    .all(|f| f.cause == StoreError::Unauthorized) =>
        {
            Some(LOGIN)
        }
        Error::Store(StoreError::Transport(_)) => Some("check --address or VAULT_ADDR"),
        Error::Render(RenderError::Parse(_)) => {
            Some("templates use Handlebars syntax: {{secret \"path\"}}")
        }
        _ => None,
    }
}
