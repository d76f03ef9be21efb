//! The `secret` template helper.

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson,
};
use serde_json::Value as Json;

use super::lookup::SecretLookup;
use crate::core::constants::SECRET_HELPER;
use crate::core::types::SecretPath;

/// `{{secret "path"}}`, backed by the active lookup strategy.
///
/// Works inline and as a subexpression (`{{#if (secret "flag")}}`).
pub struct SecretHelper<'a> {
    lookup: &'a dyn SecretLookup,
}

impl<'a> SecretHelper<'a> {
    pub fn new(lookup: &'a dyn SecretLookup) -> Self {
        Self { lookup }
    }
}

impl HelperDef for SecretHelper<'_> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        if h.params().len() != 1 {
            return Err(RenderErrorReason::Other(format!(
                "{} takes exactly one argument, got {}",
                SECRET_HELPER,
                h.params().len()
            ))
            .into());
        }

        let param = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(SECRET_HELPER, 0))?;
        let raw = param
            .value()
            .as_str()
            .ok_or(RenderErrorReason::InvalidParamType("string"))?;

        let path = SecretPath::new(raw)
            .map_err(|e| RenderErrorReason::Other(format!("{}: {}", SECRET_HELPER, e)))?;
        let value = self
            .lookup
            .lookup(&path)
            .map_err(|e| RenderErrorReason::Other(e.to_string()))?;

        Ok(ScopedJson::Derived(Json::String(value.to_string())))
    }
}
