//! Runtime Values
//!
//! Everything the container hands around at runtime is a [`Value`]: literal
//! scalars coming from configuration documents, collections of them, service
//! instances ([`Object`]) and callables ([`Function`]).
//!
//! Service instances are type-erased behind `Arc<dyn Any + Send + Sync>` and
//! compared by identity, never structurally.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::types::Parameter;

/// Error type returned by user constructors, factories and methods
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type FunctionBody = dyn Fn(Arguments) -> Result<Value, BoxError> + Send + Sync;
type MethodBody = dyn Fn(&Object, Arguments) -> Result<Value, BoxError> + Send + Sync;

/// Failure raised while unpacking arguments or dispatching a call
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A required argument was not supplied
    #[error("missing argument `{0}`")]
    MissingArgument(String),

    /// An argument was supplied with the wrong runtime kind
    #[error("argument `{name}` expected {expected}, found {found}")]
    ArgumentType {
        /// Argument name
        name: String,
        /// Expected kind or type
        expected: String,
        /// Kind actually supplied
        found: String,
    },

    /// A method was called on an instance of another type
    #[error("receiver is `{found}`, expected `{expected}`")]
    Receiver {
        /// Type the method was registered for
        expected: &'static str,
        /// Type of the actual receiver
        found: String,
    },

    /// The type carries no constructor
    #[error("type `{0}` has no constructor")]
    NotConstructible(String),
}

/// A runtime value
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// String-keyed map
    Map(BTreeMap<String, Value>),
    /// Service instance
    Object(Object),
    /// Callable
    Function(Function),
}

impl Value {
    /// Wrap a service instance
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Object::new(value))
    }

    /// Name of the value's kind, as used in error messages and builtin checks
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "dict",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }

    /// Whether the value is [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Floating point view; integers are widened
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Downcast a service instance to its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_object().and_then(Object::downcast)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(value) => write!(f, "Bool({value})"),
            Self::Int(value) => write!(f, "Int({value})"),
            Self::Float(value) => write!(f, "Float({value})"),
            Self::String(value) => write!(f, "String({value:?})"),
            Self::List(values) => f.debug_tuple("List").field(values).finish(),
            Self::Map(values) => f.debug_tuple("Map").field(values).finish(),
            Self::Object(object) => fmt::Debug::fmt(object, f),
            Self::Function(function) => fmt::Debug::fmt(function, f),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self::Map(values)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(values) => {
                Self::List(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(values) => Self::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// A shared, type-erased service instance
///
/// Cloning an `Object` clones the handle, not the instance. Objects built by
/// a [`TypeInfo`](super::TypeInfo) carry that type's method table so
/// post-construction calls and bound callables can be dispatched by name.
#[derive(Clone)]
pub struct Object {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
    methods: Arc<BTreeMap<String, Method>>,
}

impl Object {
    /// Wrap a value without any callable methods
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            type_name: Arc::from(type_name::<T>()),
            inner: value,
            methods: Arc::default(),
        }
    }

    /// Attach a type name and method table
    pub fn with_methods(
        mut self,
        type_name: impl Into<Arc<str>>,
        methods: Arc<BTreeMap<String, Method>>,
    ) -> Self {
        self.type_name = type_name.into();
        self.methods = methods;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Bind a method to this instance, producing a standalone callable
    pub fn bind(&self, name: &str) -> Option<Function> {
        let method = self.method(name)?.clone();
        let receiver = self.clone();
        let qualified = format!("{}.{name}", self.type_name);
        let signature = method.signature.clone();
        let mut function = Function::new(qualified, move |arguments| {
            method.invoke(&receiver, arguments)
        });
        function.signature = signature;
        Some(function)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

/// An instance method registered on a type
#[derive(Clone)]
pub struct Method {
    body: Arc<MethodBody>,
    signature: Option<Arc<[Parameter]>>,
}

impl Method {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Object, Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            signature: None,
        }
    }

    /// Method whose receiver is downcast to `T` before the body runs
    pub fn typed<T, F>(body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::new(move |object, arguments| {
            let receiver =
                object
                    .downcast_ref::<T>()
                    .ok_or_else(|| InvocationError::Receiver {
                        expected: type_name::<T>(),
                        found: object.type_name().to_owned(),
                    })?;
            body(receiver, arguments)
        })
    }

    #[must_use]
    pub fn with_signature(mut self, parameters: Vec<Parameter>) -> Self {
        self.signature = Some(parameters.into());
        self
    }

    pub fn signature(&self) -> Option<&[Parameter]> {
        self.signature.as_deref()
    }

    /// Call the method; positional arguments are bound to the signature's names
    pub fn invoke(&self, receiver: &Object, arguments: Arguments) -> Result<Value, BoxError> {
        let arguments = match self.signature() {
            Some(parameters) => arguments.bind(parameters),
            None => arguments,
        };
        (self.body)(receiver, arguments)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A shared callable
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    body: Arc<FunctionBody>,
    signature: Option<Arc<[Parameter]>>,
}

impl Function {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
            signature: None,
        }
    }

    /// Declare the parameters the function accepts
    #[must_use]
    pub fn with_signature(mut self, parameters: Vec<Parameter>) -> Self {
        self.signature = Some(parameters.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> Option<&[Parameter]> {
        self.signature.as_deref()
    }

    pub fn call(&self, arguments: Arguments) -> Result<Value, BoxError> {
        let arguments = match self.signature() {
            Some(parameters) => arguments.bind(parameters),
            None => arguments,
        };
        (self.body)(arguments)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// Resolved call arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already resolved parts
    pub fn from_parts(positional: Vec<Value>, named: BTreeMap<String, Value>) -> Self {
        Self { positional, named }
    }

    /// Append a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Positional argument by index
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Match arguments to `parameters` the way a call does
    ///
    /// Leading positional values take the parameter names in order, up to
    /// the first variadic parameter; values left over stay positional.
    /// Parameters still missing take their default. Explicitly named values
    /// are never overwritten.
    #[must_use]
    pub fn bind(mut self, parameters: &[Parameter]) -> Self {
        let mut remaining = std::mem::take(&mut self.positional).into_iter();
        for parameter in parameters.iter().take_while(|p| !p.is_variadic()) {
            let Some(value) = remaining.next() else {
                break;
            };
            self.named.entry(parameter.name.clone()).or_insert(value);
        }
        self.positional = remaining.collect();

        for parameter in parameters.iter().filter(|p| !p.is_variadic()) {
            if let Some(default) = &parameter.default {
                self.named
                    .entry(parameter.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        self
    }

    pub fn value(&self, name: &str) -> Result<&Value, InvocationError> {
        self.get(name)
            .ok_or_else(|| InvocationError::MissingArgument(name.to_owned()))
    }

    pub fn string(&self, name: &str) -> Result<&str, InvocationError> {
        let value = self.value(name)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(name, "str", value.kind_name()))
    }

    pub fn int(&self, name: &str) -> Result<i64, InvocationError> {
        let value = self.value(name)?;
        value
            .as_int()
            .ok_or_else(|| mismatch(name, "int", value.kind_name()))
    }

    pub fn float(&self, name: &str) -> Result<f64, InvocationError> {
        let value = self.value(name)?;
        value
            .as_float()
            .ok_or_else(|| mismatch(name, "float", value.kind_name()))
    }

    pub fn bool(&self, name: &str) -> Result<bool, InvocationError> {
        let value = self.value(name)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(name, "bool", value.kind_name()))
    }

    /// Named service instance downcast to `T`
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, InvocationError> {
        let value = self.value(name)?;
        value.downcast::<T>().ok_or_else(|| match value {
            Value::Object(object) => mismatch(name, type_name::<T>(), object.type_name()),
            other => mismatch(name, type_name::<T>(), other.kind_name()),
        })
    }
}

fn mismatch(name: &str, expected: &str, found: &str) -> InvocationError {
    InvocationError::ArgumentType {
        name: name.to_owned(),
        expected: expected.to_owned(),
        found: found.to_owned(),
    }
}
