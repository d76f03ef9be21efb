//! Two-pass template rendering.
//!
//! Templates use Handlebars syntax plus one function, `secret`:
//!
//! ```text
//! user={{secret "db/user"}}
//! {{#if tls}}cert={{secret "tls/cert"}}{{/if}}
//! ```
//!
//! 1. **Discovery**: the template runs once with a `secret` that records its
//!    argument and returns `""`. No store calls happen.
//! 2. **Fetch**: every distinct path is read once. Failures are collected;
//!    one failing path does not stop the others.
//! 3. **Substitution**: if nothing failed, the template runs again with a
//!    `secret` that returns the fetched values.
//!
//! Any failure aborts with no output. Only paths reachable with a neutral
//! `""` value for every secret are discovered, so a path computed from
//! another secret's value is unsupported and fails the substitution pass.

mod helper;
mod lookup;
mod resolution;

use handlebars::{no_escape, Handlebars, Template};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::core::cancel::CancelToken;
use crate::core::constants::SECRET_HELPER;
use crate::core::session::Login;
use crate::core::store::SecretStore;
use crate::error::RenderError;

pub use helper::SecretHelper;
pub use lookup::{RecordingLookup, ResolvingLookup, SecretLookup, Undiscovered};
pub use resolution::{DiscoverySet, ResolutionResult, ResolvedSecrets};

const TEMPLATE_NAME: &str = "template";

/// Rendering options shared by both passes.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Fail on references to missing data fields instead of rendering `""`.
    pub strict: bool,
    /// Checked before each fetch and before substitution.
    pub cancel: CancelToken,
}

/// Compile template text.
///
/// # Errors
///
/// Returns `RenderError::Parse` on invalid syntax.
pub fn compile(text: &str) -> Result<Template, RenderError> {
    Template::compile(text).map_err(|e| RenderError::Parse(e.to_string()))
}

/// Run the discovery pass over template text.
///
/// # Errors
///
/// Returns `RenderError::Parse` if the template is invalid or fails to
/// execute.
pub fn discover(text: &str, data: &Json) -> Result<DiscoverySet, RenderError> {
    discover_compiled(&compile(text)?, data, false)
}

fn discover_compiled(
    template: &Template,
    data: &Json,
    strict: bool,
) -> Result<DiscoverySet, RenderError> {
    let recorder = RecordingLookup::new();
    {
        let registry = registry(template, &recorder, strict);
        registry
            .render(TEMPLATE_NAME, data)
            .map_err(|e| RenderError::Parse(e.to_string()))?;
    }
    let discovered = recorder.into_discovered();
    debug!(secrets = discovered.len(), "discovery pass complete");
    Ok(discovered)
}

fn registry<'a>(template: &Template, lookup: &'a dyn SecretLookup, strict: bool) -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(no_escape);
    registry.set_strict_mode(strict);
    registry.register_helper(SECRET_HELPER, Box::new(SecretHelper::new(lookup)));
    registry.register_template(TEMPLATE_NAME, template.clone());
    registry
}

/// Renders templates against a secret store.
pub struct Resolver<'s, S: SecretStore + ?Sized> {
    store: &'s S,
    options: RenderOptions,
}

impl<'s, S: SecretStore + ?Sized> Resolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render `text` with secrets substituted.
    ///
    /// # Errors
    ///
    /// - `RenderError::Unauthenticated` if the store has no session
    /// - `RenderError::Parse` if the template is invalid
    /// - `RenderError::SecretsUnavailable` listing every path that failed
    /// - `RenderError::Cancelled` if cancelled before completion
    /// - `RenderError::Render` if the substitution pass fails
    pub fn render(&self, text: &str, data: &Json) -> Result<String, RenderError> {
        if !self.store.has_session() {
            return Err(RenderError::Unauthenticated);
        }

        let template = compile(text)?;
        let discovered = discover_compiled(&template, data, self.options.strict)?;

        let resolution = self.fetch(&discovered)?;
        let resolved = resolution
            .into_resolved()
            .map_err(RenderError::SecretsUnavailable)?;

        self.check_cancelled()?;
        self.substitute(&template, data, &resolved)
    }

    /// Read every discovered path once, collecting each outcome.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Cancelled` if cancellation is requested; store
    /// failures are recorded in the result, not returned.
    pub fn fetch(&self, discovered: &DiscoverySet) -> Result<ResolutionResult, RenderError> {
        let mut result = ResolutionResult::new();

        for path in discovered {
            self.check_cancelled()?;

            let outcome = self.options.cancel.busy(|| self.store.read(path));
            match &outcome {
                Ok(_) => debug!(path = %path, "secret resolved"),
                Err(e) => debug!(path = %path, error = %e, "secret unavailable"),
            }
            result.record(path.clone(), outcome);
        }

        info!(
            fetched = result.len(),
            failed = result.failures().len(),
            "fetch complete"
        );
        Ok(result)
    }

    fn substitute(
        &self,
        template: &Template,
        data: &Json,
        resolved: &ResolvedSecrets,
    ) -> Result<String, RenderError> {
        let lookup = ResolvingLookup::new(resolved);
        let registry = registry(template, &lookup, self.options.strict);
        registry
            .render(TEMPLATE_NAME, data)
            .map_err(|e| RenderError::Render(e.to_string()))
    }

    fn check_cancelled(&self) -> Result<(), RenderError> {
        if self.options.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        Ok(())
    }
}

/// Log in if necessary, then render `text`.
///
/// # Errors
///
/// Returns `RenderError::Unauthenticated` if no session can be obtained, or
/// any error from [`Resolver::render`].
pub fn stamp<S: SecretStore + ?Sized>(
    store: &mut S,
    login: &Login<'_>,
    text: &str,
    data: &Json,
    options: RenderOptions,
) -> crate::error::Result<String> {
    login.ensure(store)?;
    let output = Resolver::new(&*store)
        .with_options(options)
        .render(text, data)?;
    Ok(output)
}
