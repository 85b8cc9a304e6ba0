//! In-memory type directory
//!
//! Types are registered explicitly with their constructor signatures; this
//! is what autowiring reads instead of runtime reflection.

use std::sync::Arc;

use dashmap::DashMap;
use dinject_domain::constants::{BUILTIN_MODULE, MODULE_SEPARATOR};
use dinject_domain::error::{Error, Result};
use dinject_domain::ports::{Naming, TypeDirectory};
use dinject_domain::{BuiltinKind, TypeHandle, TypeInfo};

use crate::config::ContainerSettings;

/// Registry of constructible types keyed by qualified name
pub struct TypeRegistry {
    types: DashMap<String, TypeHandle>,
    implicit_modules: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
            implicit_modules: vec![BUILTIN_MODULE.to_owned()],
        }
    }

    /// Registry using the implicit modules named in `settings`
    pub fn with_settings(settings: &ContainerSettings) -> Self {
        Self::new().with_implicit_modules(settings.implicit_modules.clone())
    }

    /// Replace the modules whose types may be named without their module
    #[must_use]
    pub fn with_implicit_modules(mut self, modules: Vec<String>) -> Self {
        self.implicit_modules = modules;
        self
    }

    /// Register a type, replacing any type with the same qualified name
    pub fn register(&self, info: TypeInfo) -> TypeHandle {
        let handle = Arc::new(info);
        self.types
            .insert(handle.qualified_name(), Arc::clone(&handle));
        handle
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn find(&self, qualified_name: &str) -> Option<TypeHandle> {
        self.types
            .get(qualified_name)
            .map(|handle| Arc::clone(handle.value()))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDirectory for TypeRegistry {
    fn locate(&self, qualified_name: &str) -> Result<TypeHandle> {
        if let Some(handle) = self.find(qualified_name) {
            return Ok(handle);
        }
        if !qualified_name.contains(MODULE_SEPARATOR) {
            let implicit = self
                .implicit_modules
                .iter()
                .find_map(|module| self.find(&format!("{module}{MODULE_SEPARATOR}{qualified_name}")));
            if let Some(handle) = implicit {
                return Ok(handle);
            }
        }

        let bare_name = qualified_name
            .strip_prefix(BUILTIN_MODULE)
            .and_then(|rest| rest.strip_prefix(MODULE_SEPARATOR))
            .unwrap_or(qualified_name);
        if BuiltinKind::from_name(bare_name).is_some() {
            return Err(Error::class_not_found(
                qualified_name,
                "builtin kinds are not constructible services",
            ));
        }
        Err(Error::class_not_found(qualified_name, "type is not registered"))
    }

    fn qualified_name_of(&self, handle: &TypeHandle, naming: Naming) -> String {
        let implicit = naming == Naming::Implicit
            && self
                .implicit_modules
                .iter()
                .any(|module| module == handle.module());
        if implicit {
            handle.name().to_owned()
        } else {
            handle.qualified_name()
        }
    }
}
