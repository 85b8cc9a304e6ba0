//! Dependency Injection
//!
//! The resolution engine and the strategies feeding it definitions.
//!
//! ```text
//! Container ── DefinitionProvider ──┬── StaticDefinitions
//!                                   └── Autowiring ── TypeDirectory (TypeRegistry)
//! ```
//!
//! [`ContainerBuilder`] assembles a container from settings.

pub mod bootstrap;
pub mod container;
pub mod live;
pub mod loading;
pub mod registry;

pub use bootstrap::ContainerBuilder;
pub use container::{Container, DefinitionProvider, StaticDefinitions};
pub use live::Autowiring;
pub use loading::LoadingStack;
pub use registry::TypeRegistry;
