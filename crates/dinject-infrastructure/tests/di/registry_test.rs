//! Type Registry Tests

use dinject_domain::error::Error;
use dinject_domain::ports::{Naming, TypeDirectory};
use dinject_domain::TypeInfo;
use dinject_infrastructure::config::ContainerSettings;
use dinject_infrastructure::di::TypeRegistry;

use crate::test_utils::{logger_type, registry};

fn unit(name: &str) -> TypeInfo {
    TypeInfo::builder(name).constructor(|_| Ok(())).build()
}

#[test]
fn test_locate_by_qualified_name() {
    let registry = registry();

    let handle = registry.locate("app.Logger").unwrap();

    assert_eq!(handle.module(), "app");
    assert_eq!(handle.name(), "Logger");
    assert_eq!(registry.signature_of(&handle)[0].name, "name");
}

#[test]
fn test_bare_names_search_implicit_modules() {
    let registry = TypeRegistry::new();
    registry.register(unit("builtins.Clock"));
    registry.register(unit("app.Clock"));

    let handle = registry.locate("Clock").unwrap();

    assert_eq!(handle.qualified_name(), "builtins.Clock");
    assert!(registry.locate("Logger").is_err());
}

#[test]
fn test_custom_implicit_modules() {
    let registry = TypeRegistry::new().with_implicit_modules(vec!["app".to_owned()]);
    let handle = registry.register(logger_type());

    assert!(registry.locate("Logger").is_ok());
    assert_eq!(registry.qualified_name_of(&handle, Naming::Implicit), "Logger");
    assert_eq!(registry.qualified_name_of(&handle, Naming::Explicit), "app.Logger");
}

#[test]
fn test_builtin_kinds_are_not_services() {
    let registry = TypeRegistry::new();

    for name in ["int", "builtins.str", "dict"] {
        let err = registry.locate(name).unwrap_err();
        assert!(
            matches!(&err, Error::ClassNotFound { reason, .. } if reason.contains("builtin")),
            "{name}: {err}"
        );
    }
}

#[test]
fn test_unknown_types_are_not_found() {
    let err = registry().locate("app.Missing").unwrap_err();

    assert!(matches!(err, Error::ClassNotFound { ref name, .. } if name == "app.Missing"));
}

#[test]
fn test_registration_replaces_by_name() {
    let registry = TypeRegistry::new();
    assert!(registry.is_empty());

    registry.register(unit("app.Logger"));
    let replacement = registry.register(logger_type());

    assert_eq!(registry.len(), 1);
    assert!(registry.contains("app.Logger"));
    let located = registry.locate("app.Logger").unwrap();
    assert!(std::sync::Arc::ptr_eq(&located, &replacement));
}

#[test]
fn test_implicit_modules_from_settings() {
    let settings = ContainerSettings {
        implicit_modules: vec!["app".to_owned()],
        ..ContainerSettings::default()
    };
    let registry = TypeRegistry::with_settings(&settings);
    registry.register(logger_type());

    assert_eq!(registry.locate("Logger").unwrap().qualified_name(), "app.Logger");
}
