//! Command-line interface.

pub mod completions;
pub mod login;
pub mod output;
pub mod prompt;
pub mod secrets;
pub mod stamp;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::core::config::{Config, Overrides};
use crate::core::store::VaultClient;
use crate::core::token::TokenCache;
use crate::core::types::SessionToken;
use crate::error::Result;

/// Vaultage - a simple Vault CLI.
#[derive(Parser)]
#[command(
    name = "vaultage",
    about = "A simple Vault CLI",
    version,
    after_help = "Templates use Handlebars syntax: {{secret \"path/to/secret\"}}"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub globals: Globals,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct Globals {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Vault server address
    #[arg(long, global = true, env = "VAULT_ADDR")]
    pub address: Option<String>,

    /// Secrets engine mount
    #[arg(long, global = true, env = "VAULT_MOUNT")]
    pub mount: Option<String>,

    /// Userpass login name (defaults to the current user)
    #[arg(long, global = true, env = "VAULTAGE_USER")]
    pub user: Option<String>,

    /// Session token to use instead of the persisted one
    #[arg(long, global = true, env = "VAULT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Log in with your userpass password
    Login,

    /// Forget the persisted session token
    Logout,

    /// Print a secret value
    Read {
        /// Secret path (e.g., db/password)
        path: String,
    },

    /// Write or update a secret
    Write {
        /// Secret path (e.g., db/password)
        path: String,
        /// Secret value (prompted with hidden input if omitted)
        value: Option<String>,
    },

    /// Set your password
    SetPassword,

    /// Render a template with secrets interpolated
    Stamp {
        /// Template file, or `-` for stdin
        template: PathBuf,
        /// JSON file providing template data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write the result to a file (mode 0600) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on references to missing data fields
        #[arg(long)]
        strict: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// A configured client plus the token file it logs in with.
pub struct Connection {
    pub config: Config,
    pub client: VaultClient,
    pub cache: TokenCache,
}

impl Connection {
    /// Load configuration and build the client.
    ///
    /// A `--token` / `VAULT_TOKEN` value is installed as the session
    /// directly; otherwise login happens on demand.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid configuration, or a store error if
    /// the HTTP client cannot be created.
    pub fn open(globals: &Globals) -> Result<Self> {
        let overrides = Overrides {
            address: globals.address.clone(),
            mount: globals.mount.clone(),
            username: globals.user.clone(),
        };
        let config = Config::load(&overrides)?;
        let cache = match &config.token_path {
            Some(path) => TokenCache::new(path),
            None => TokenCache::unavailable(),
        };
        let mut client = VaultClient::new(config.clone())?;

        if let Some(token) = &globals.token {
            debug!("using token from --token/VAULT_TOKEN");
            client.set_token(SessionToken::new(token.as_str()));
        }

        Ok(Self {
            config,
            client,
            cache,
        })
    }
}

/// Execute a command.
///
/// # Errors
///
/// Returns whatever error the command produced.
pub fn execute(cli: Cli) -> Result<()> {
    let globals = cli.globals;

    match cli.command {
        Command::Completions { shell } => completions::execute(shell),
        Command::Logout => login::logout(&Connection::open(&globals)?),
        Command::Login => login::login(&mut Connection::open(&globals)?),
        Command::SetPassword => login::set_password(&mut Connection::open(&globals)?),
        Command::Read { path } => secrets::read(&mut Connection::open(&globals)?, &path),
        Command::Write { path, value } => {
            secrets::write(&mut Connection::open(&globals)?, &path, value)
        }
        Command::Stamp {
            template,
            data,
            output,
            strict,
        } => stamp::execute(
            &mut Connection::open(&globals)?,
            stamp::StampArgs {
                template,
                data,
                output,
                strict,
            },
        ),
    }
}
