//! Settings loader
//!
//! Loads [`ContainerSettings`] from defaults, an optional TOML file and
//! environment variables, in that order of precedence (later wins).

use crate::config::ContainerSettings;
use crate::constants::{DEFAULT_SETTINGS_FILENAME, SETTINGS_ENV_PREFIX, SETTINGS_ENV_SEPARATOR};
use crate::error_ext::ErrorContext;
use crate::logging::{log_settings_loaded, parse_log_level};
use dinject_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};

/// Settings loader service
#[derive(Clone)]
pub struct SettingsLoader {
    /// Settings file path
    settings_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl SettingsLoader {
    /// Create a new settings loader with default settings
    pub fn new() -> Self {
        Self {
            settings_path: None,
            env_prefix: SETTINGS_ENV_PREFIX.to_string(),
        }
    }

    /// Set the settings file path
    pub fn with_settings_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load settings from all sources
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values from `ContainerSettings::default()`
    /// 2. TOML settings file (explicit path, else `dinject.toml` in the current directory)
    /// 3. Environment variables with prefix (e.g., `DINJECT__AUTOWIRE`, `DINJECT__LOGGING__LEVEL`)
    pub fn load(&self) -> Result<ContainerSettings> {
        let mut figment = Figment::new().merge(Serialized::defaults(ContainerSettings::default()));

        let path = self
            .settings_path
            .clone()
            .or_else(|| env::current_dir().ok().map(|dir| dir.join(DEFAULT_SETTINGS_FILENAME)));
        if let Some(path) = path {
            let found = path.exists();
            if found {
                figment = figment.merge(Toml::file(&path));
            }
            log_settings_loaded(&path, found);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}{SETTINGS_ENV_SEPARATOR}", self.env_prefix))
                .split(SETTINGS_ENV_SEPARATOR),
        );

        let settings: ContainerSettings = figment
            .extract()
            .config_context("Failed to extract container settings")?;

        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, settings: &ContainerSettings, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(settings).config_context("Failed to serialize settings")?;
        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write settings file")?;
        Ok(())
    }

    /// Get the explicit settings file path
    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate container settings
pub fn validate_settings(settings: &ContainerSettings) -> Result<()> {
    validate_container_ids(settings)?;
    validate_abstract_suffix(settings)?;
    parse_log_level(&settings.logging.level)?;
    Ok(())
}

fn validate_container_ids(settings: &ContainerSettings) -> Result<()> {
    if settings.container_id.trim().is_empty() {
        return Err(Error::configuration("Container id cannot be empty"));
    }
    if let Some(alias) = settings
        .container_aliases
        .iter()
        .find(|alias| alias.trim().is_empty() || **alias == settings.container_id)
    {
        return Err(Error::configuration(format!(
            "Invalid container alias `{alias}`: aliases must be non-empty and differ from the container id"
        )));
    }
    Ok(())
}

fn validate_abstract_suffix(settings: &ContainerSettings) -> Result<()> {
    if settings.autowire && settings.abstract_suffix.trim().is_empty() {
        return Err(Error::configuration(
            "Abstract type suffix cannot be empty when autowiring is enabled",
        ));
    }
    Ok(())
}
