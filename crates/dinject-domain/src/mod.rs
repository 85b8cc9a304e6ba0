//! # Domain Layer
//!
//! Pure data describing an object graph and the ports the engines are written
//! against. Nothing in this crate resolves or constructs anything on its own.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value_objects`] | Runtime values, service definitions, configuration, type metadata |
//! | [`ports`] | `TypeDirectory` and `ServiceLocator` traits |
//! | [`error`] | Error enum shared by every layer |
//! | [`constants`] | Well-known service ids and syntax markers |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, ErrorKind, Result};
pub use value_objects::*;
