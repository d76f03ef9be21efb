//! Session commands (login, logout, set-password).

use tracing::info;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::prompt::Terminal;
use crate::cli::Connection;
use crate::core::session::{Login, Prompt};
use crate::error::{Result, ValidationError};

/// Prompt for the password and persist a fresh token.
pub fn login(conn: &mut Connection) -> Result<()> {
    let prompt = Terminal;
    Login::new(&conn.config.username, &conn.cache, &prompt).interactive(&mut conn.client)?;
    output::success(&format!("logged in as {}", conn.config.username));
    Ok(())
}

/// Remove the persisted token.
pub fn logout(conn: &Connection) -> Result<()> {
    if conn.cache.clear()? {
        let path = conn
            .cache
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        output::success(&format!("removed {}", output::path(&path)));
    } else {
        output::warn("no persisted token");
    }
    Ok(())
}

/// Change the current user's password.
pub fn set_password(conn: &mut Connection) -> Result<()> {
    let prompt = Terminal;
    Login::new(&conn.config.username, &conn.cache, &prompt).ensure(&mut conn.client)?;

    let password = new_password(&prompt)?;
    conn.client
        .set_password(&conn.config.username, &password)?;

    info!(username = %conn.config.username, "password changed");
    output::success("password updated");
    Ok(())
}

/// Ask for a new password twice.
pub(crate) fn new_password(prompt: &dyn Prompt) -> Result<Zeroizing<String>> {
    let password = prompt.hidden("Enter new password")?;
    let confirmation = prompt.hidden("Confirm new password")?;

    if password != confirmation {
        return Err(ValidationError::PasswordMismatch.into());
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyValue("password".to_string()).into());
    }
    Ok(password)
}
