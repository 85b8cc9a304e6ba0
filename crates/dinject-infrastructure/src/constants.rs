//! Infrastructure layer constants
//!
//! Domain-level markers (service ids, document syntax) live in
//! `dinject_domain::constants`.

// ============================================================================
// SETTINGS CONSTANTS
// ============================================================================

/// Default settings file name
pub const DEFAULT_SETTINGS_FILENAME: &str = "dinject.toml";

/// Environment variable prefix for settings
pub const SETTINGS_ENV_PREFIX: &str = "DINJECT";

/// Separator between nested keys in environment variable names
pub const SETTINGS_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "DINJECT_LOG";

// ============================================================================
// PARAMETER INTERPOLATION CONSTANTS
// ============================================================================

/// Placeholder pattern: `%name%`, not preceded by another `%`
///
/// Group 1 captures the preceding character (or start of input) so it can be
/// written back; group 2 captures the parameter name.
pub const PLACEHOLDER_PATTERN: &str = r"(^|[^%])%([^%]+)%";
