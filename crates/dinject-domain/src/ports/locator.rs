//! Service Locator Port

use crate::error::Result;
use crate::value_objects::Value;

/// Read-only access to the services of a container
///
/// Services that need to look up other services at runtime depend on this
/// port instead of on the concrete container.
pub trait ServiceLocator: Send + Sync {
    /// Resolve a public service
    fn get(&self, id: &str) -> Result<Value>;

    /// Whether `id` names a public, shared, resolvable service
    fn has(&self, id: &str) -> bool;
}
