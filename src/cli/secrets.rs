//! Secret commands (read, write).

use std::io::{self, IsTerminal, Read};

use tracing::info;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::prompt::Terminal;
use crate::cli::Connection;
use crate::core::session::{Login, Prompt};
use crate::core::store::SecretStore;
use crate::core::types::SecretPath;
use crate::error::{Result, ValidationError};

/// Print the value stored at `path`.
pub fn read(conn: &mut Connection, path: &str) -> Result<()> {
    let path = SecretPath::new(path)?;
    let prompt = Terminal;
    Login::new(&conn.config.username, &conn.cache, &prompt).ensure(&mut conn.client)?;

    let value = conn.client.read(&path)?;
    println!("{}", value.expose());
    Ok(())
}

/// Store a value at `path`.
///
/// Without a value argument, reads all of piped stdin or prompts with
/// hidden input.
pub fn write(conn: &mut Connection, path: &str, value: Option<String>) -> Result<()> {
    let path = SecretPath::new(path)?;
    let prompt = Terminal;

    let value = match value {
        Some(v) => Zeroizing::new(v),
        None if !io::stdin().is_terminal() => {
            let mut input = Zeroizing::new(String::new());
            io::stdin().read_to_string(&mut input)?;
            Zeroizing::new(strip_final_newline(&input).to_string())
        }
        None => prompt.hidden("Enter the secret (it will be hidden)")?,
    };

    if value.is_empty() {
        return Err(ValidationError::EmptyValue(path.to_string()).into());
    }

    Login::new(&conn.config.username, &conn.cache, &prompt).ensure(&mut conn.client)?;
    conn.client.write(&path, &value)?;

    info!(path = %path, "secret written");
    output::success(&format!("wrote {}", output::path(path.as_str())));
    Ok(())
}

/// Drop the single line ending `echo` and heredocs append.
fn strip_final_newline(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}
