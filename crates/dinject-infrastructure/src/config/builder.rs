//! Configuration builder
//!
//! Collects a [`Configuration`] and lets registered passes rewrite it
//! (add definitions, wire tagged services together) before parameters are
//! interpolated.
//!
//! ## Example
//!
//! ```ignore
//! struct CollectListeners;
//!
//! impl BuilderPass for CollectListeners {
//!     fn process(&self, builder: &mut ConfigurationBuilder) -> Result<()> {
//!         let listeners: Vec<Argument> = builder
//!             .find_tagged_definitions("event.listener")
//!             .map(|(id, _)| Argument::reference(id))
//!             .collect();
//!         if let Some(dispatcher) = builder.definition_mut("dispatcher") {
//!             dispatcher.arguments.insert("listeners".into(), Argument::List(listeners));
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use dinject_domain::error::Result;
use dinject_domain::{Configuration, Definition, Value};
use tracing::debug;

use super::parameters::ConfigurationProcessor;

/// A rewrite step run by [`ConfigurationBuilder::build`]
pub trait BuilderPass: Send + Sync {
    fn process(&self, builder: &mut ConfigurationBuilder) -> Result<()>;
}

/// Mutable configuration plus the passes that finish it
pub struct ConfigurationBuilder {
    configuration: Configuration,
    passes: Vec<Box<dyn BuilderPass>>,
    processor: ConfigurationProcessor,
    built: Option<Configuration>,
}

impl ConfigurationBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            passes: Vec::new(),
            processor: ConfigurationProcessor::new(),
            built: None,
        }
    }

    /// Register a pass; passes run in registration order
    #[must_use]
    pub fn with_pass<P: BuilderPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn add_pass(&mut self, pass: Box<dyn BuilderPass>) {
        self.passes.push(pass);
    }

    /// Run every pass, then interpolate parameters
    ///
    /// Only the first call does any work; later calls return the same result.
    pub fn build(&mut self) -> Result<Configuration> {
        if let Some(built) = &self.built {
            return Ok(built.clone());
        }

        let passes = std::mem::take(&mut self.passes);
        let outcome = passes.iter().try_for_each(|pass| pass.process(self));
        self.passes = passes;
        outcome?;

        let built = self.processor.process(self.configuration.clone())?;
        debug!(
            passes = self.passes.len(),
            definitions = built.definitions.len(),
            "configuration built"
        );
        self.built = Some(built.clone());
        Ok(built)
    }

    /// Definitions carrying `tag`, with their ids
    pub fn find_tagged_definitions<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Arc<Definition>)> + 'a {
        self.configuration
            .definitions
            .iter()
            .filter(move |(_, definition)| definition.has_tag(tag))
            .map(|(id, definition)| (id.as_str(), definition))
    }

    pub fn definition(&self, id: &str) -> Option<&Arc<Definition>> {
        self.configuration.definition(id)
    }

    /// Mutable access to a registered definition (copy-on-write)
    pub fn definition_mut(&mut self, id: &str) -> Option<&mut Definition> {
        let id = self.configuration.canonical_id(id).to_owned();
        self.configuration
            .definitions
            .get_mut(&id)
            .map(Arc::make_mut)
    }

    pub fn set_definition(&mut self, id: impl Into<String>, definition: Definition) {
        self.configuration
            .definitions
            .insert(id.into(), Arc::new(definition));
    }

    pub fn set_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.configuration
            .aliases
            .insert(alias.into(), target.into());
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.configuration.parameter(name)
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.configuration
            .parameters
            .insert(name.into(), value.into());
    }

    /// The configuration as rewritten so far, before interpolation
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }
}
