//! Autowiring strategy
//!
//! A [`DefinitionProvider`] that derives missing definitions from
//! constructor signatures found in a [`TypeDirectory`], and completes
//! static definitions whose arguments are only partially declared.
//!
//! For each constructor parameter without an explicit argument, in
//! declaration order:
//!
//! | Parameter | Argument |
//! |-----------|----------|
//! | variadic | skipped |
//! | has a default | the default literal |
//! | generic type | error, ambiguous |
//! | builtin kind | error, needs a literal |
//! | no declared type | error |
//! | service type | `Reference` to the type's qualified name |
//!
//! Derived and completed definitions are memoized per id; the static
//! configuration is never modified. Every id naming the same type maps to
//! one service id, so a type has a single shared instance however it is
//! requested.

use std::sync::Arc;

use dashmap::DashMap;
use dinject_domain::constants::{ABSTRACT_TYPE_SUFFIX, BUILTIN_MODULE, MODULE_SEPARATOR};
use dinject_domain::error::{Error, Result};
use dinject_domain::ports::{Naming, TypeDirectory};
use dinject_domain::{
    Argument, Arity, BuiltinKind, Callable, Configuration, Constructor, Definition, Factory,
    Holder, Parameter, ParameterKind, Reference, Value,
};
use tracing::debug;

use super::container::DefinitionProvider;

/// Derives definitions from constructor signatures
pub struct Autowiring {
    directory: Arc<dyn TypeDirectory>,
    derived: DashMap<String, Derived>,
    abstract_suffix: String,
}

/// Memoized definition and the service id it is shared under
#[derive(Clone)]
struct Derived {
    service_id: String,
    definition: Arc<Definition>,
}

/// Parameters of whatever a definition invokes, and the module forward
/// annotations are relative to
struct Signature {
    parameters: Vec<Parameter>,
    module: String,
}

impl Autowiring {
    pub fn new(directory: Arc<dyn TypeDirectory>) -> Self {
        Self {
            directory,
            derived: DashMap::new(),
            abstract_suffix: ABSTRACT_TYPE_SUFFIX.to_owned(),
        }
    }

    /// Ids ending with `suffix` (case-insensitive) are never derived
    #[must_use]
    pub fn with_abstract_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.abstract_suffix = suffix.into();
        self
    }

    fn names_abstract_type(&self, id: &str) -> bool {
        id.to_lowercase()
            .ends_with(&self.abstract_suffix.to_lowercase())
    }

    /// Definition for an id with no static registration
    ///
    /// Completes the static definition registered under the type's implicit
    /// name when there is one, otherwise derives a definition shared under
    /// the type's qualified name.
    fn derive(&self, configuration: &Configuration, id: &str) -> Result<Derived> {
        if self.names_abstract_type(id) {
            return Err(Error::class_not_found(
                id,
                "abstract types need a concrete definition",
            ));
        }
        let handle = self.directory.locate(id)?;
        if handle.is_abstract() {
            return Err(Error::class_not_found(
                id,
                "abstract types need a concrete definition",
            ));
        }

        let implicit = self.directory.qualified_name_of(&handle, Naming::Implicit);
        if implicit != id {
            if let Some(existing) = configuration.definition(&implicit) {
                let same_class = existing
                    .class_handle()
                    .is_some_and(|class| class.qualified_name() == handle.qualified_name());
                if same_class {
                    if let Some(known) = self.derived.get(&implicit) {
                        return Ok(known.value().clone());
                    }
                    let completed = self.complete(configuration, &implicit, existing)?;
                    return Ok(self.remember(&implicit, &implicit, Arc::new(completed)));
                }
            }
        }

        let qualified = self.directory.qualified_name_of(&handle, Naming::Explicit);
        if let Some(known) = self.derived.get(&qualified) {
            return Ok(known.value().clone());
        }

        let definition = Definition::class(Arc::clone(&handle)).with_public(true);
        let signature = Signature {
            parameters: self.directory.signature_of(&handle).to_vec(),
            module: handle.module().to_owned(),
        };
        let definition = self.autowire(id, definition, &signature)?;
        debug!(service = %qualified, requested = id, "definition created");
        Ok(self.remember(&qualified, &qualified, Arc::new(definition)))
    }

    /// Validate the explicit arguments of a static definition and autowire the rest
    fn complete(
        &self,
        configuration: &Configuration,
        id: &str,
        definition: &Definition,
    ) -> Result<Definition> {
        let Some(signature) = self.signature(configuration, definition) else {
            return Ok(definition.clone());
        };
        validate_arguments(id, definition, &signature.parameters)?;
        self.autowire(id, definition.clone(), &signature)
    }

    fn signature(&self, configuration: &Configuration, definition: &Definition) -> Option<Signature> {
        let (parameters, module) = match &definition.constructor {
            Constructor::Class(handle) => (
                self.directory.signature_of(handle).to_vec(),
                handle.module(),
            ),
            Constructor::Factory(Factory::Function(function)) => (function.signature()?.to_vec(), ""),
            Constructor::Factory(Factory::Callable(Callable { holder, method })) => match holder {
                Holder::Type(handle) if method.is_empty() => (
                    self.directory.signature_of(handle).to_vec(),
                    handle.module(),
                ),
                Holder::Type(handle) => (
                    handle.function(method)?.signature()?.to_vec(),
                    handle.module(),
                ),
                Holder::Reference(reference) => {
                    let target = configuration.definition(&reference.id)?;
                    let handle = target.class_handle()?;
                    let parameters = handle.method(method)?.signature()?.to_vec();
                    return Some(Signature {
                        parameters,
                        module: handle.module().to_owned(),
                    });
                }
                Holder::Function(function) => (function.signature()?.to_vec(), ""),
            },
            Constructor::Factory(Factory::Reference(_)) => return None,
        };
        Some(Signature {
            parameters,
            module: module.to_owned(),
        })
    }

    fn autowire(&self, id: &str, mut definition: Definition, signature: &Signature) -> Result<Definition> {
        for parameter in &signature.parameters {
            if parameter.is_variadic() || definition.arguments.contains_key(&parameter.name) {
                continue;
            }
            let argument = match (&parameter.default, &parameter.kind) {
                (Some(default), _) => Argument::Value(default.clone()),
                (None, ParameterKind::Generic(description)) => {
                    return Err(Error::invalid_definition(format!(
                        "Cannot autowire `{}` of `{id}`: generic type `{description}` is ambiguous",
                        parameter.name
                    )));
                }
                (None, ParameterKind::Builtin(kind)) => {
                    return Err(builtin_parameter(id, &parameter.name, kind.name()));
                }
                (None, ParameterKind::Unannotated) => {
                    return Err(Error::invalid_definition(format!(
                        "Cannot autowire `{}` of `{id}`: no declared type",
                        parameter.name
                    )));
                }
                (None, ParameterKind::Type(type_name)) => {
                    if is_builtin_name(type_name) {
                        return Err(builtin_parameter(id, &parameter.name, type_name));
                    }
                    Argument::Reference(Reference::new(type_name.clone()))
                }
                (None, ParameterKind::Forward(annotation)) => Argument::Reference(Reference::new(
                    self.resolve_forward(id, &signature.module, &parameter.name, annotation)?,
                )),
            };
            definition.arguments.insert(parameter.name.clone(), argument);
        }
        Ok(definition)
    }

    /// Service id for a type named relative to `module`
    fn resolve_forward(
        &self,
        id: &str,
        module: &str,
        parameter: &str,
        annotation: &str,
    ) -> Result<String> {
        if is_builtin_name(annotation) {
            return Err(builtin_parameter(id, parameter, annotation));
        }
        let qualified = if annotation.contains(MODULE_SEPARATOR) || module.is_empty() {
            annotation.to_owned()
        } else {
            format!("{module}{MODULE_SEPARATOR}{annotation}")
        };
        let handle = self.directory.locate(&qualified).map_err(|err| {
            Error::invalid_definition_with_source(
                format!("Cannot autowire `{parameter}` of `{id}`: unknown type `{annotation}`"),
                err,
            )
        })?;
        Ok(self.directory.qualified_name_of(&handle, Naming::Explicit))
    }

    fn remember(&self, id: &str, service_id: &str, definition: Arc<Definition>) -> Derived {
        self.derived
            .entry(id.to_owned())
            .or_insert(Derived {
                service_id: service_id.to_owned(),
                definition,
            })
            .value()
            .clone()
    }
}

impl DefinitionProvider for Autowiring {
    fn definition(&self, configuration: &Configuration, id: &str) -> Result<Arc<Definition>> {
        let id = configuration.canonical_id(id);
        if let Some(known) = self.derived.get(id) {
            return Ok(Arc::clone(&known.value().definition));
        }

        let derived = match configuration.definitions.get(id) {
            Some(definition) => {
                let completed = self.complete(configuration, id, definition)?;
                self.remember(id, id, Arc::new(completed))
            }
            None => {
                let derived = self.derive(configuration, id)?;
                self.remember(id, &derived.service_id, derived.definition)
            }
        };
        Ok(derived.definition)
    }

    fn service_id(&self, configuration: &Configuration, id: &str) -> String {
        let id = configuration.canonical_id(id);
        self.derived
            .get(id)
            .map_or_else(|| id.to_owned(), |known| known.value().service_id.clone())
    }
}

/// Literal arguments must fit the declared parameter they are passed to
fn validate_arguments(id: &str, definition: &Definition, parameters: &[Parameter]) -> Result<()> {
    let accepts_any = parameters
        .iter()
        .any(|parameter| parameter.arity == Arity::VarKeyword);

    for (name, argument) in &definition.arguments {
        let declared = parameters
            .iter()
            .find(|parameter| !parameter.is_variadic() && parameter.name == *name);
        let Some(parameter) = declared else {
            if accepts_any {
                continue;
            }
            return Err(Error::invalid_definition(format!(
                "Service `{id}` has no parameter `{name}`"
            )));
        };
        let Argument::Value(value) = argument else {
            continue;
        };
        match &parameter.kind {
            ParameterKind::Builtin(kind) if !kind.accepts(value) => {
                return Err(Error::invalid_definition(format!(
                    "Argument `{name}` of `{id}` must be {kind}, got {}",
                    value.kind_name()
                )));
            }
            ParameterKind::Type(type_name) | ParameterKind::Forward(type_name)
                if !matches!(value, Value::Object(_) | Value::Null) =>
            {
                return Err(Error::invalid_definition(format!(
                    "Argument `{name}` of `{id}` expects a `{type_name}` service, got a {} literal",
                    value.kind_name()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_builtin_name(name: &str) -> bool {
    let bare = name
        .strip_prefix(BUILTIN_MODULE)
        .and_then(|rest| rest.strip_prefix(MODULE_SEPARATOR))
        .unwrap_or(name);
    BuiltinKind::from_name(bare).is_some()
}

fn builtin_parameter(id: &str, parameter: &str, kind: &str) -> Error {
    Error::invalid_definition(format!(
        "Cannot autowire `{parameter}` of `{id}`: builtin `{kind}` requires a value"
    ))
}
