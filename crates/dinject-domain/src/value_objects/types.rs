//! Type Metadata
//!
//! What a type directory knows about a constructible type: where it lives,
//! the ordered parameters of its constructor, how to call that constructor,
//! and the methods and associated functions its instances expose.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::MODULE_SEPARATOR;

use super::value::{Arguments, BoxError, Function, InvocationError, Method, Object, Value};

/// Constructor of a registered type
pub type ConstructorFn = dyn Fn(Arguments) -> Result<Object, BoxError> + Send + Sync;

/// Shared handle to a located type
pub type TypeHandle = Arc<TypeInfo>;

/// Well-known built-in kinds
///
/// A constructor parameter declared with one of these kinds can only be
/// satisfied by a literal; it is never autowired to another service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Str,
    Int,
    Float,
    Complex,
    Bool,
    Bytes,
    ByteArray,
    List,
    Tuple,
    Set,
    FrozenSet,
    Dict,
    Object,
    Type,
}

impl BuiltinKind {
    /// Every builtin kind
    pub const ALL: [Self; 14] = [
        Self::Str,
        Self::Int,
        Self::Float,
        Self::Complex,
        Self::Bool,
        Self::Bytes,
        Self::ByteArray,
        Self::List,
        Self::Tuple,
        Self::Set,
        Self::FrozenSet,
        Self::Dict,
        Self::Object,
        Self::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::ByteArray => "bytearray",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Set => "set",
            Self::FrozenSet => "frozenset",
            Self::Dict => "dict",
            Self::Object => "object",
            Self::Type => "type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether a literal of this runtime kind satisfies the builtin
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Object => true,
            Self::Str => matches!(value, Value::String(_)),
            Self::Int => matches!(value, Value::Int(_)),
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Float | Self::Complex => matches!(value, Value::Float(_) | Value::Int(_)),
            Self::Bytes
            | Self::ByteArray
            | Self::List
            | Self::Tuple
            | Self::Set
            | Self::FrozenSet => matches!(value, Value::List(_)),
            Self::Dict => matches!(value, Value::Map(_)),
            Self::Type => matches!(value, Value::Function(_)),
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared kind of a constructor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// A built-in scalar or collection kind
    Builtin(BuiltinKind),
    /// A service type, by qualified name
    Type(String),
    /// A service type named relative to the owning type's module
    Forward(String),
    /// A generic or placeholder type that cannot be resolved to one service
    Generic(String),
    /// No declared type
    Unannotated,
}

/// Arity of a constructor parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    #[default]
    Single,
    /// Catch-all positional parameter
    VarPositional,
    /// Catch-all keyword parameter
    VarKeyword,
}

/// One constructor or method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub arity: Arity,
    pub default: Option<Value>,
}

impl Parameter {
    fn new(name: impl Into<String>, kind: ParameterKind, arity: Arity) -> Self {
        Self {
            name: name.into(),
            kind,
            arity,
            default: None,
        }
    }

    /// Parameter typed as another service
    pub fn service(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Type(type_name.into()), Arity::Single)
    }

    pub fn builtin(name: impl Into<String>, kind: BuiltinKind) -> Self {
        Self::new(name, ParameterKind::Builtin(kind), Arity::Single)
    }

    /// Parameter typed by a name relative to the owner's module
    pub fn forward(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Forward(annotation.into()), Arity::Single)
    }

    pub fn generic(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            ParameterKind::Generic(description.into()),
            Arity::Single,
        )
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Unannotated, Arity::Single)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Unannotated, Arity::VarPositional)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Unannotated, Arity::VarKeyword)
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.arity != Arity::Single
    }
}

/// Metadata of one constructible type
///
/// Instances produced by [`TypeInfo::instantiate`] carry the type's qualified
/// name and method table.
pub struct TypeInfo {
    module: String,
    name: String,
    parameters: Vec<Parameter>,
    constructor: Option<Arc<ConstructorFn>>,
    methods: Arc<BTreeMap<String, Method>>,
    functions: BTreeMap<String, Function>,
    is_abstract: bool,
}

impl TypeInfo {
    /// Start describing the type `module.Name`
    pub fn builder(qualified_name: impl AsRef<str>) -> TypeInfoBuilder {
        let qualified_name = qualified_name.as_ref();
        let (module, name) = qualified_name
            .rsplit_once(MODULE_SEPARATOR)
            .unwrap_or(("", qualified_name));
        TypeInfoBuilder {
            module: module.to_owned(),
            name: name.to_owned(),
            parameters: Vec::new(),
            constructor: None,
            methods: BTreeMap::new(),
            functions: BTreeMap::new(),
            is_abstract: false,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}{MODULE_SEPARATOR}{}", self.module, self.name)
        }
    }

    /// Constructor parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Associated function (`Type::name`)
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Call the constructor with keyword-style arguments
    pub fn instantiate(&self, arguments: Arguments) -> Result<Object, BoxError> {
        let constructor = self
            .constructor
            .as_ref()
            .ok_or_else(|| InvocationError::NotConstructible(self.qualified_name()))?;
        let object = constructor(arguments.bind(&self.parameters))?;
        Ok(object.with_methods(self.qualified_name(), Arc::clone(&self.methods)))
    }

    /// The type used as a plain callable (calling it constructs an instance)
    pub fn as_function(handle: &TypeHandle) -> Function {
        let target = Arc::clone(handle);
        Function::new(handle.qualified_name(), move |arguments| {
            target.instantiate(arguments).map(Value::Object)
        })
        .with_signature(handle.parameters.clone())
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.qualified_name())
            .field("parameters", &self.parameters)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("abstract", &self.is_abstract)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeInfo`]
pub struct TypeInfoBuilder {
    module: String,
    name: String,
    parameters: Vec<Parameter>,
    constructor: Option<Arc<ConstructorFn>>,
    methods: BTreeMap<String, Method>,
    functions: BTreeMap<String, Function>,
    is_abstract: bool,
}

impl TypeInfoBuilder {
    /// Append a constructor parameter
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Constructor returning the concrete instance
    #[must_use]
    pub fn constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(move |arguments| {
            constructor(arguments).map(Object::new)
        }));
        self
    }

    /// Instance method dispatched on a receiver of type `T`
    #[must_use]
    pub fn method<T, F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Method::typed(body));
        self
    }

    /// Instance method with declared parameters
    #[must_use]
    pub fn method_with_signature<T, F>(
        mut self,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        body: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Method::typed(body).with_signature(parameters));
        self
    }

    /// Associated function reachable as `Type::name`
    #[must_use]
    pub fn function(mut self, name: impl Into<String>, function: Function) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// Mark the type as abstract (locatable, never autowired)
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo {
            module: self.module,
            name: self.name,
            parameters: self.parameters,
            constructor: self.constructor,
            methods: Arc::new(self.methods),
            functions: self.functions,
            is_abstract: self.is_abstract,
        }
    }
}
