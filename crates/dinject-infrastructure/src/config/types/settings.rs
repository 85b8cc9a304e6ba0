//! Container settings

use dinject_domain::constants::{
    ABSTRACT_TYPE_SUFFIX, BUILTIN_MODULE, CONTAINER_ALIAS, CONTAINER_SERVICE_ID,
    SERVICE_LOCATOR_ALIAS,
};
use serde::{Deserialize, Serialize};

use super::LoggingConfig;

/// How a container is assembled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Derive missing definitions from constructor signatures
    pub autowire: bool,

    /// Id under which the container registers itself
    pub container_id: String,

    /// Extra ids resolving to the container itself
    pub container_aliases: Vec<String>,

    /// Case-insensitive suffix marking ids that name abstract types
    pub abstract_suffix: String,

    /// Modules whose types may be referenced by bare name
    pub implicit_modules: Vec<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            autowire: false,
            container_id: CONTAINER_SERVICE_ID.to_string(),
            container_aliases: vec![
                CONTAINER_ALIAS.to_string(),
                SERVICE_LOCATOR_ALIAS.to_string(),
            ],
            abstract_suffix: ABSTRACT_TYPE_SUFFIX.to_string(),
            implicit_modules: vec![BUILTIN_MODULE.to_string()],
            logging: LoggingConfig::default(),
        }
    }
}
