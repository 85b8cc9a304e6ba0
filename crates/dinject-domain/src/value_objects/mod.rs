//! Domain Value Objects
//!
//! Data exchanged between configuration sources, the type directory and the
//! resolution engine. None of these types resolve anything by themselves.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`Value`] | Runtime value: scalar, collection, service instance or callable |
//! | [`Object`] | Type-erased shared service instance with a method table |
//! | [`Function`] | Shared callable taking [`Arguments`] |
//! | [`TypeInfo`] | Constructible type metadata returned by a type directory |
//! | [`Definition`] | Recipe for building one service |
//! | [`Configuration`] | Parameters, definitions and aliases of one object graph |

/// Service configuration (parameters, definitions, aliases)
pub mod configuration;
/// Service definitions and argument values
pub mod definition;
/// Type metadata and constructor signatures
pub mod types;
/// Runtime values and callables
pub mod value;

pub use configuration::Configuration;
pub use definition::{
    Argument, Call, Callable, Constructor, Definition, Factory, Holder, Reference, Tag,
};
pub use types::{
    Arity, BuiltinKind, ConstructorFn, Parameter, ParameterKind, TypeHandle, TypeInfo,
    TypeInfoBuilder,
};
pub use value::{Arguments, BoxError, Function, InvocationError, Method, Object, Value};
