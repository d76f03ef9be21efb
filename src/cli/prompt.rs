//! Terminal prompts.

use dialoguer::Password;
use zeroize::Zeroizing;

use crate::core::session::Prompt;
use crate::error::Result;

/// Hidden-input prompt on the controlling terminal.
pub struct Terminal;

impl Prompt for Terminal {
    fn hidden(&self, message: &str) -> Result<Zeroizing<String>> {
        let value = Password::new()
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()?;
        Ok(Zeroizing::new(value))
    }
}
