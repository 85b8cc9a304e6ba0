//! Domain constants
//!
//! Well-known service ids and the markers recognised inside configuration
//! documents and parameter strings.

// ============================================================================
// SYNTHETIC SERVICES
// ============================================================================

/// Id under which every container registers itself
pub const CONTAINER_SERVICE_ID: &str = "dinject.Container";

/// Short alias for the container's own service
pub const CONTAINER_ALIAS: &str = "container";

/// Alias exposing the container through its locator port
pub const SERVICE_LOCATOR_ALIAS: &str = "dinject.ServiceLocator";

// ============================================================================
// DOCUMENT SYNTAX
// ============================================================================

/// Prefix marking a string argument as a service reference (`@logger`)
pub const REFERENCE_PREFIX: char = '@';

/// Prefixes escaping a literal string that starts with `@`
pub const ESCAPED_REFERENCE_PREFIXES: [&str; 2] = ["\\@", "@@"];

/// Separator between a type and one of its associated functions (`Type::create`)
pub const FUNCTION_SEPARATOR: &str = "::";

/// Delimiter of parameter placeholders (`%name%`)
pub const PARAMETER_DELIMITER: char = '%';

// ============================================================================
// TYPE NAMING
// ============================================================================

/// Module holding the well-known built-in kinds
pub const BUILTIN_MODULE: &str = "builtins";

/// Case-insensitive suffix of ids that name abstract types
pub const ABSTRACT_TYPE_SUFFIX: &str = "interface";

/// Separator between module path segments in qualified type names
pub const MODULE_SEPARATOR: char = '.';

/// Prefix of cache keys derived for inline (anonymous) definitions
pub const INLINE_DEFINITION_PREFIX: &str = "inline#";
