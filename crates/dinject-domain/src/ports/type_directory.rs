//! Type Directory Port
//!
//! The only way the autowiring strategy learns about types. Implementations
//! may be backed by explicit registration, generated code or anything else
//! that can answer "what does this type's constructor take".

use crate::error::Result;
use crate::value_objects::{Parameter, TypeHandle};

/// Naming mode for [`TypeDirectory::qualified_name_of`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// Always include the module path
    Explicit,
    /// Omit the module path of well-known modules
    Implicit,
}

/// Type directory port
///
/// # Example
///
/// ```ignore
/// let handle = directory.locate("app.Mailer")?;
/// for parameter in directory.signature_of(&handle) {
///     println!("{}", parameter.name);
/// }
/// ```
pub trait TypeDirectory: Send + Sync {
    /// Find a type by qualified name
    ///
    /// Fails with [`Error::ClassNotFound`](crate::Error::ClassNotFound) when
    /// the name is unknown or does not denote a type.
    fn locate(&self, qualified_name: &str) -> Result<TypeHandle>;

    /// Constructor parameters in declaration order
    fn signature_of<'a>(&self, handle: &'a TypeHandle) -> &'a [Parameter] {
        handle.parameters()
    }

    /// Name under which `handle` is addressed as a service id
    fn qualified_name_of(&self, handle: &TypeHandle, naming: Naming) -> String;
}
