//! # dinject
//!
//! A dependency-injection container: services are described by
//! [`Definition`]s, wired together through [`Reference`]s, configured with
//! `%parameter%` placeholders and, optionally, autowired from constructor
//! signatures registered in a [`TypeRegistry`].
//!
//! ## Example
//!
//! ```ignore
//! use dinject::prelude::*;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register(
//!     TypeInfo::builder("app.Mailer")
//!         .parameter(Parameter::builtin("sender", BuiltinKind::Str).with_default("noreply"))
//!         .constructor(|args: Arguments| Ok(Mailer::new(args.string("sender")?)))
//!         .build(),
//! );
//!
//! let settings = ContainerSettings { autowire: true, ..ContainerSettings::default() };
//! let container = ContainerBuilder::new(Configuration::new())
//!     .with_settings(settings)
//!     .with_directory(registry)
//!     .build()?;
//! let mailer = container.get_as::<Mailer>("app.Mailer")?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - values, definitions, type metadata, ports and errors
//! - `infrastructure` - resolution engine, autowiring, configuration
//!   loading and logging

use std::path::Path;
use std::sync::Arc;

/// Domain layer - values, definitions and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use dinject_domain::*;
}

/// Infrastructure layer - containers, configuration and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use dinject_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use infrastructure::config::{
    BuilderPass, ConfigurationBuilder, ContainerSettings, Document, SettingsLoader,
};
pub use infrastructure::di::{Container, ContainerBuilder, TypeRegistry};
pub use infrastructure::logging::init_logging;

/// Everything needed to describe and build a container
pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::domain::error::{Error, ErrorKind, Result};
    pub use crate::domain::ports::{ServiceLocator, TypeDirectory};
    pub use crate::domain::{
        Argument, Arguments, BuiltinKind, Call, Callable, Configuration, Definition, Factory,
        Function, Holder, Parameter, Reference, Tag, TypeInfo, Value,
    };
    pub use crate::infrastructure::config::{
        BuilderPass, ConfigurationBuilder, ContainerSettings, Document, SettingsLoader,
    };
    pub use crate::infrastructure::di::{Container, ContainerBuilder, TypeRegistry};
}

/// Build a container from a services document and settings
///
/// Settings come from `loader`. A [`TypeRegistry`] honouring the configured
/// implicit modules is handed to `register`; classes named by the document
/// are located in it, and it backs autowiring when the settings enable it.
pub fn load_container<P, F>(
    loader: &SettingsLoader,
    services: P,
    register: F,
) -> error::Result<Arc<Container>>
where
    P: AsRef<Path>,
    F: FnOnce(&TypeRegistry),
{
    let settings = loader.load()?;
    let registry = TypeRegistry::with_settings(&settings);
    register(&registry);
    let registry = Arc::new(registry);

    let document = Document::from_path(services)?;
    let configuration = infrastructure::config::document::resolve(document, &*registry)?;
    ContainerBuilder::new(configuration)
        .with_settings(settings)
        .with_directory(registry)
        .build()
}
