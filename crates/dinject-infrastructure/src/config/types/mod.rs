//! Settings types

pub mod logging;
pub mod settings;

pub use logging::LoggingConfig;
pub use settings::ContainerSettings;
