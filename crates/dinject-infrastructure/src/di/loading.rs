//! Loading stack
//!
//! The chain of service ids whose arguments are being resolved in one call
//! tree. Each top-level resolution owns its own stack, so concurrent
//! resolutions never see each other's entries.

use dinject_domain::error::{Error, Result};

/// In-flight resolution chain
#[derive(Debug, Default)]
pub struct LoadingStack {
    ids: Vec<String>,
}

impl LoadingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing if it is already being resolved
    ///
    /// The error carries the full chain ending with `id` (`a -> b -> a`).
    pub fn enter(&mut self, id: &str) -> Result<()> {
        if self.contains(id) {
            let mut chain = self.ids.clone();
            chain.push(id.to_owned());
            return Err(Error::ServiceCircularReference { chain });
        }
        self.ids.push(id.to_owned());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.ids.pop();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|loading| loading == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
