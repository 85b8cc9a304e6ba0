//! Configuration
//!
//! Two kinds of configuration live here: the container's own settings
//! (figment-loaded, see [`loader`]) and the service configuration it
//! resolves (documents, builder passes and parameter interpolation).

pub mod builder;
pub mod document;
pub mod loader;
pub mod parameters;
pub mod types;

pub use builder::{BuilderPass, ConfigurationBuilder};
pub use document::{CallDocument, Document, ServiceDocument};
pub use loader::SettingsLoader;
pub use parameters::ConfigurationProcessor;
pub use types::*;
