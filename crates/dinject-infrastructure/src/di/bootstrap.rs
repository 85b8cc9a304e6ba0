//! Container bootstrap
//!
//! Assembles a [`Container`] from a configuration and settings: builder
//! passes run, parameters are interpolated, and the definition provider is
//! chosen by [`ContainerSettings::autowire`].
//!
//! ```ignore
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register(mailer_type());
//! let settings = SettingsLoader::new().load()?;
//! let document = Document::from_path("services.toml")?;
//! let container = ContainerBuilder::new(resolve(document, &*registry)?)
//!     .with_settings(settings)
//!     .with_directory(registry)
//!     .build()?;
//! ```

use std::sync::Arc;

use dinject_domain::error::{Error, Result};
use dinject_domain::ports::TypeDirectory;
use dinject_domain::Configuration;
use tracing::info;

use super::container::{Container, DefinitionProvider, StaticDefinitions};
use super::live::Autowiring;
use crate::config::loader::validate_settings;
use crate::config::{BuilderPass, ConfigurationBuilder, ContainerSettings};

/// Builder for [`Container`]
pub struct ContainerBuilder {
    configuration: ConfigurationBuilder,
    directory: Option<Arc<dyn TypeDirectory>>,
    settings: ContainerSettings,
}

impl ContainerBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: ConfigurationBuilder::new(configuration),
            directory: None,
            settings: ContainerSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Type directory used for autowiring
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn TypeDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Pass run over the configuration before interpolation
    #[must_use]
    pub fn with_pass<P: BuilderPass + 'static>(mut self, pass: P) -> Self {
        self.configuration.add_pass(Box::new(pass));
        self
    }

    /// Build the container
    ///
    /// Fails on invalid settings, on autowiring without a type directory,
    /// and on any error raised by passes or parameter interpolation.
    pub fn build(mut self) -> Result<Arc<Container>> {
        validate_settings(&self.settings)?;
        let configuration = self.configuration.build()?;

        let provider: Box<dyn DefinitionProvider> = if self.settings.autowire {
            let directory = self.directory.ok_or_else(|| {
                Error::configuration("Autowiring is enabled but no type directory was provided")
            })?;
            Box::new(Autowiring::new(directory).with_abstract_suffix(&self.settings.abstract_suffix))
        } else {
            Box::new(StaticDefinitions)
        };

        info!(
            autowire = self.settings.autowire,
            definitions = configuration.definitions.len(),
            "container built"
        );
        Container::with_provider(configuration, provider, &self.settings)
    }
}
