//! Service Configuration
//!
//! The static input of a container: parameters available for interpolation,
//! service definitions by id, and aliases mapping alternate ids onto
//! canonical ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::definition::Definition;
use super::value::Value;

/// Parameters, definitions and aliases of one object graph
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub parameters: BTreeMap<String, Value>,
    pub definitions: BTreeMap<String, Arc<Definition>>,
    pub aliases: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_definition(mut self, id: impl Into<String>, definition: Definition) -> Self {
        self.definitions.insert(id.into(), Arc::new(definition));
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    /// Canonical form of `id` (aliases resolve in a single hop)
    pub fn canonical_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map_or(id, String::as_str)
    }

    /// Definition registered for `id` or its alias target
    pub fn definition(&self, id: &str) -> Option<&Arc<Definition>> {
        self.definitions.get(self.canonical_id(id))
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Reject aliases that point to themselves or to another alias
    pub fn validate_aliases(&self) -> Result<()> {
        for (alias, target) in &self.aliases {
            if alias == target || self.aliases.contains_key(target) {
                return Err(Error::AliasChain {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}
