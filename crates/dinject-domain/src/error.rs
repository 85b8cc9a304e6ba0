//! Error handling types

use thiserror::Error;

use crate::value_objects::BoxError;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of container failures
///
/// Several variants of [`Error`] share a kind; callers that only care about
/// the category match on [`Error::kind`] instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No definition or type could be found for an id
    NotFound,
    /// A private definition was requested directly
    PrivateAccess,
    /// A service or parameter chain revisits itself
    CircularReference,
    /// A definition, alias or setting is malformed, or construction failed
    InvalidConfiguration,
    /// A placeholder names an undeclared parameter
    ParameterNotFound,
    /// Reading a document or settings source failed
    Io,
}

/// Main error type for dinject
#[derive(Error, Debug)]
pub enum Error {
    /// No definition is registered (or derivable) for the id
    #[error("Service not found: {id}")]
    ServiceNotFound {
        /// The requested service id
        id: String,
    },

    /// A type name could not be located in the type directory
    #[error("Class not found: `{name}`: {reason}")]
    ClassNotFound {
        /// The qualified type name
        name: String,
        /// Why the lookup failed
        reason: String,
    },

    /// The definition exists but is not public
    #[error("Definition `{id}` is private")]
    PrivateService {
        /// The requested service id
        id: String,
    },

    /// A service depends on itself through its arguments
    #[error("The service `{}` has a circular reference to itself: {}", .chain.last().map_or("", String::as_str), .chain.join(" -> "))]
    ServiceCircularReference {
        /// Loading chain, ending with the revisited id
        chain: Vec<String>,
    },

    /// A parameter placeholder expands into itself
    #[error("The parameter `{}` has a circular reference to itself: {}", .chain.last().map_or("", String::as_str), .chain.join(" -> "))]
    ParameterCircularReference {
        /// Interpolation chain, ending with the revisited parameter
        chain: Vec<String>,
    },

    /// A placeholder names a parameter that does not exist
    #[error("The parameter definition `{name}` does not exist")]
    ParameterNotFound {
        /// The missing parameter name
        name: String,
    },

    /// A placeholder names a parameter holding a non-string value
    #[error("The parameter `{name}` is not a string and cannot be interpolated")]
    ParameterNotString {
        /// The offending parameter name
        name: String,
    },

    /// Malformed definition or unresolvable wiring
    #[error("Invalid definition: {message}")]
    InvalidDefinition {
        /// Description of the problem
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// The constructor, factory or post-construction call of a service failed
    #[error("Unable to initialize service `{id}`: {source}")]
    Construction {
        /// The service being built
        id: String,
        /// Error raised by the service code itself
        #[source]
        source: BoxError,
    },

    /// An alias targets another alias
    #[error("Alias `{alias}` points to `{target}`, which is itself an alias")]
    AliasChain {
        /// The alias being declared
        alias: String,
        /// Its target, which is also an alias
        target: String,
    },

    /// Settings or document parsing error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceNotFound { .. } | Self::ClassNotFound { .. } => ErrorKind::NotFound,
            Self::PrivateService { .. } => ErrorKind::PrivateAccess,
            Self::ServiceCircularReference { .. } | Self::ParameterCircularReference { .. } => {
                ErrorKind::CircularReference
            }
            Self::ParameterNotFound { .. } => ErrorKind::ParameterNotFound,
            Self::ParameterNotString { .. }
            | Self::InvalidDefinition { .. }
            | Self::Construction { .. }
            | Self::AliasChain { .. }
            | Self::Configuration { .. } => ErrorKind::InvalidConfiguration,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Error raised by a service's own constructor or factory, if any
    ///
    /// Lets callers tell "bad wiring" apart from a domain failure during
    /// construction and downcast to the concrete error type.
    pub fn construction_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// Lookup error creation methods
impl Error {
    /// Create a service not found error
    pub fn service_not_found<S: Into<String>>(id: S) -> Self {
        Self::ServiceNotFound { id: id.into() }
    }

    /// Create a class not found error
    pub fn class_not_found<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::ClassNotFound {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a private service error
    pub fn private_service<S: Into<String>>(id: S) -> Self {
        Self::PrivateService { id: id.into() }
    }
}

// Definition error creation methods
impl Error {
    /// Create an invalid definition error
    pub fn invalid_definition<S: Into<String>>(message: S) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid definition error with source
    pub fn invalid_definition_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        Self::InvalidDefinition {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a construction error wrapping the service's own failure
    pub fn construction<S: Into<String>>(id: S, source: BoxError) -> Self {
        Self::Construction {
            id: id.into(),
            source,
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
