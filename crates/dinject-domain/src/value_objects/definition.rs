//! Service Definitions
//!
//! A [`Definition`] is the recipe for one service: how to build it, what to
//! pass to its constructor, which methods to call afterwards and whether the
//! built instance is shared.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::types::TypeHandle;
use super::value::{Function, Value};

/// Lazy pointer to another service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub id: String,
}

impl Reference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.id)
    }
}

/// What a [`Callable`] binds its method on
#[derive(Debug, Clone)]
pub enum Holder {
    /// Another service
    Reference(Reference),
    /// A type; its associated functions are bound
    Type(TypeHandle),
    /// A bare callable
    Function(Function),
}

/// A method bound on a holder, or the holder itself when `method` is empty
#[derive(Debug, Clone)]
pub struct Callable {
    pub holder: Holder,
    pub method: String,
}

impl Callable {
    pub fn new(holder: Holder, method: impl Into<String>) -> Self {
        Self {
            holder,
            method: method.into(),
        }
    }

    /// The holder used as the value
    pub fn bare(holder: Holder) -> Self {
        Self::new(holder, String::new())
    }

    /// `@service::method`
    pub fn service_method(id: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(Holder::Reference(Reference::new(id)), method)
    }
}

/// A constructor or call argument before resolution
#[derive(Debug, Clone)]
pub enum Argument {
    /// Literal value passed through unchanged
    Value(Value),
    /// Another service, resolved when the owner is built
    Reference(Reference),
    /// Anonymous inline service
    Definition(Arc<Definition>),
    /// Result of binding a method on a holder
    Callable(Callable),
    List(Vec<Argument>),
    Map(BTreeMap<String, Argument>),
}

impl Argument {
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Reference(Reference::new(id))
    }

    /// The literal value, if this argument is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Reference> for Argument {
    fn from(reference: Reference) -> Self {
        Self::Reference(reference)
    }
}

impl From<Definition> for Argument {
    fn from(definition: Definition) -> Self {
        Self::Definition(Arc::new(definition))
    }
}

impl From<Arc<Definition>> for Argument {
    fn from(definition: Arc<Definition>) -> Self {
        Self::Definition(definition)
    }
}

impl From<Callable> for Argument {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<Vec<Argument>> for Argument {
    fn from(arguments: Vec<Argument>) -> Self {
        Self::List(arguments)
    }
}

impl From<BTreeMap<String, Argument>> for Argument {
    fn from(arguments: BTreeMap<String, Argument>) -> Self {
        Self::Map(arguments)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for Argument {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

/// How a service is produced by a factory
#[derive(Debug, Clone)]
pub enum Factory {
    /// Method bound on a holder (`@id::method`, `Type::function`)
    Callable(Callable),
    /// A bare callable
    Function(Function),
    /// A service that must itself be callable
    Reference(Reference),
}

/// Build method of a definition
#[derive(Debug, Clone)]
pub enum Constructor {
    Class(TypeHandle),
    Factory(Factory),
}

/// A post-construction method call
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub method: String,
    pub positional: Vec<Argument>,
    pub named: BTreeMap<String, Argument>,
}

impl Call {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, argument: impl Into<Argument>) -> Self {
        self.positional.push(argument.into());
        self
    }

    #[must_use]
    pub fn named_arg(mut self, name: impl Into<String>, argument: impl Into<Argument>) -> Self {
        self.named.insert(name.into(), argument.into());
        self
    }
}

/// A named tag with free-form attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Recipe for building one service
///
/// Definitions are private and shared unless stated otherwise.
#[derive(Debug, Clone)]
pub struct Definition {
    pub constructor: Constructor,
    /// Keyword-style constructor arguments
    pub arguments: BTreeMap<String, Argument>,
    /// Post-construction calls, in order
    pub calls: Vec<Call>,
    pub public: bool,
    pub shared: bool,
    pub tags: Vec<Tag>,
}

impl Definition {
    fn with_constructor(constructor: Constructor) -> Self {
        Self {
            constructor,
            arguments: BTreeMap::new(),
            calls: Vec::new(),
            public: false,
            shared: true,
            tags: Vec::new(),
        }
    }

    /// Service built by calling a type's constructor
    pub fn class(handle: TypeHandle) -> Self {
        Self::with_constructor(Constructor::Class(handle))
    }

    /// Service built by a factory
    pub fn factory(factory: Factory) -> Self {
        Self::with_constructor(Constructor::Factory(factory))
    }

    /// Exactly one of `class` and `factory` must be given
    pub fn try_new(class: Option<TypeHandle>, factory: Option<Factory>) -> Result<Self> {
        match (class, factory) {
            (Some(handle), None) => Ok(Self::class(handle)),
            (None, Some(factory)) => Ok(Self::factory(factory)),
            (Some(_), Some(_)) => Err(Error::invalid_definition(
                "class and factory are mutually exclusive",
            )),
            (None, None) => Err(Error::invalid_definition(
                "either a class or a factory is required",
            )),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, argument: impl Into<Argument>) -> Self {
        self.arguments.insert(name.into(), argument.into());
        self
    }

    #[must_use]
    pub fn with_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    #[must_use]
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The type built by a class definition
    pub fn class_handle(&self) -> Option<&TypeHandle> {
        match &self.constructor {
            Constructor::Class(handle) => Some(handle),
            Constructor::Factory(_) => None,
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Tags named `name`, in declaration order
    pub fn find_tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + Clone + 'a {
        self.tags.iter().filter(move |tag| tag.name == name)
    }
}
