//! Stamp command.
//!
//! Renders a template with secrets interpolated. Nothing is written unless
//! every referenced secret resolved.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::cli::output;
use crate::cli::prompt::Terminal;
use crate::cli::Connection;
use crate::core::cancel::CancelToken;
use crate::core::session::Login;
use crate::core::template::{self, RenderOptions};
use crate::core::token::write_private;
use crate::error::Result;

/// Arguments of `vaultage stamp`.
#[derive(Debug)]
pub struct StampArgs {
    pub template: PathBuf,
    pub data: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

/// Render the template and print or save the result.
pub fn execute(conn: &mut Connection, args: StampArgs) -> Result<()> {
    let text = read_template(&args.template)?;
    let data = match &args.data {
        Some(path) => read_data(path)?,
        None => Json::Null,
    };

    let prompt = Terminal;
    let login = Login::new(&conn.config.username, &conn.cache, &prompt);

    // installed after login so Ctrl-C still aborts the password prompt
    login.ensure(&mut conn.client)?;
    let cancel = CancelToken::new();
    if let Err(e) = cancel.cancel_on_interrupt() {
        warn!("failed to install interrupt handler: {}", e);
    }

    let options = RenderOptions {
        strict: args.strict,
        cancel,
    };
    let rendered = template::stamp(&mut conn.client, &login, &text, &data, options)?;

    match &args.output {
        Some(path) => {
            write_private(path, &rendered)?;
            output::success(&format!(
                "stamped {}",
                output::path(&path.display().to_string())
            ));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn read_template(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        debug!("reading template from stdin");
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    debug!(path = %path.display(), "reading template");
    Ok(std::fs::read_to_string(path)?)
}

fn read_data(path: &Path) -> Result<Json> {
    debug!(path = %path.display(), "reading template data");
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
