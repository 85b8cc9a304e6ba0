//! # Infrastructure Layer
//!
//! The engines that turn a [`Configuration`](dinject_domain::Configuration)
//! into live services, plus the cross-cutting concerns around them.
//!
//! ### Resolution
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Container, autowiring strategy, type registry, bootstrap |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Settings loading, document loader, builder passes, parameter interpolation |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;

pub use error_ext::ErrorContext;
