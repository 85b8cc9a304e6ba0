//! Domain Port Interfaces
//!
//! Boundary contracts between the engines and their collaborators.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`TypeDirectory`] | Locates types and exposes their constructor signatures |
//! | [`ServiceLocator`] | Read-only view of a container (`get`, `has`) |

/// Service locator port
pub mod locator;
/// Type directory port
pub mod type_directory;

pub use locator::ServiceLocator;
pub use type_directory::{Naming, TypeDirectory};
