//! Discovery and resolution bookkeeping for one render.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{SecretPath, SecretValue};
use crate::error::{SecretFailure, StoreError};

/// Secret paths referenced by a template, deduplicated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoverySet(BTreeSet<SecretPath>);

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`. Returns `false` if it was already present.
    pub fn insert(&mut self, path: SecretPath) -> bool {
        self.0.insert(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &SecretPath> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a DiscoverySet {
    type Item = &'a SecretPath;
    type IntoIter = std::collections::btree_set::Iter<'a, SecretPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<SecretPath> for DiscoverySet {
    fn from_iter<I: IntoIterator<Item = SecretPath>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of fetching every discovered path: one entry per path.
#[derive(Debug, Default)]
pub struct ResolutionResult(BTreeMap<SecretPath, Result<SecretValue, StoreError>>);

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `path`, replacing an earlier one.
    pub fn record(&mut self, path: SecretPath, outcome: Result<SecretValue, StoreError>) {
        self.0.insert(path, outcome);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Result<SecretValue, StoreError>> {
        self.0.get(path)
    }

    /// Whether there is exactly one entry per discovered path.
    pub fn covers(&self, discovered: &DiscoverySet) -> bool {
        self.0.len() == discovered.len() && discovered.iter().all(|p| self.0.contains_key(p))
    }

    /// Failed paths with their causes, sorted by path.
    pub fn failures(&self) -> Vec<SecretFailure> {
        self.0
            .iter()
            .filter_map(|(path, outcome)| {
                outcome.as_ref().err().map(|cause| SecretFailure {
                    path: path.clone(),
                    cause: cause.clone(),
                })
            })
            .collect()
    }

    /// Split into resolved values, or every failure if any path failed.
    ///
    /// # Errors
    ///
    /// Returns all failures, sorted by path, if at least one fetch failed.
    pub fn into_resolved(self) -> Result<ResolvedSecrets, Vec<SecretFailure>> {
        let failures = self.failures();
        if !failures.is_empty() {
            return Err(failures);
        }

        let values = self
            .0
            .into_iter()
            .filter_map(|(path, outcome)| outcome.ok().map(|value| (path, value)))
            .collect();
        Ok(ResolvedSecrets(values))
    }
}

/// Successfully resolved secrets, consumed by the substitution pass.
#[derive(Debug, Default)]
pub struct ResolvedSecrets(BTreeMap<SecretPath, SecretValue>);

impl ResolvedSecrets {
    pub fn get(&self, path: &str) -> Option<&SecretValue> {
        self.0.get(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
