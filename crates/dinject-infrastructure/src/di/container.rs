//! Resolution engine
//!
//! [`Container`] turns definitions into live instances: it resolves
//! arguments recursively, invokes constructors and factories, runs
//! post-construction calls and caches shared instances.
//!
//! ## Resolution order
//!
//! 1. The id is pushed on the loading stack; arguments and the factory are
//!    resolved; the id is popped. Re-entering an id inside that window is a
//!    circular reference.
//! 2. The constructor or factory is invoked.
//! 3. A shared instance is cached, then post-construction calls run in order.
//!    If a call fails the instance is evicted again.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dinject_domain::constants::INLINE_DEFINITION_PREFIX;
use dinject_domain::error::{Error, ErrorKind, Result};
use dinject_domain::ports::{ServiceLocator, TypeDirectory};
use dinject_domain::{
    Argument, Arguments, BoxError, BuiltinKind, Call, Callable, Configuration, Constructor,
    Definition, Factory, Function, Holder, Method, Object, Parameter, TypeHandle, TypeInfo, Value,
};
use tracing::{debug, trace};

use super::live::Autowiring;
use super::loading::LoadingStack;
use crate::config::ContainerSettings;

/// Source of the definition used to build a service
pub trait DefinitionProvider: Send + Sync {
    /// Definition for `id`, which may be an alias
    fn definition(&self, configuration: &Configuration, id: &str) -> Result<Arc<Definition>>;

    /// Id the shared instance of `id` is cached under
    fn service_id(&self, configuration: &Configuration, id: &str) -> String {
        configuration.canonical_id(id).to_owned()
    }
}

/// Serves only the definitions registered in the configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDefinitions;

impl DefinitionProvider for StaticDefinitions {
    fn definition(&self, configuration: &Configuration, id: &str) -> Result<Arc<Definition>> {
        configuration
            .definition(id)
            .cloned()
            .ok_or_else(|| Error::service_not_found(id))
    }
}

/// The dependency-injection container
///
/// Shared as `Arc<Container>`. The container registers itself as a public
/// service (see [`ContainerSettings::container_id`]) so it can be injected
/// into the services it builds.
pub struct Container {
    configuration: Configuration,
    provider: Box<dyn DefinitionProvider>,
    instances: DashMap<String, Value>,
    container_id: String,
}

impl Container {
    /// Container serving only statically registered definitions
    pub fn new(configuration: Configuration) -> Result<Arc<Self>> {
        Self::with_provider(
            configuration,
            Box::new(StaticDefinitions),
            &ContainerSettings::default(),
        )
    }

    /// Container deriving missing definitions from `directory`
    pub fn autowiring(
        configuration: Configuration,
        directory: Arc<dyn TypeDirectory>,
    ) -> Result<Arc<Self>> {
        Self::with_provider(
            configuration,
            Box::new(Autowiring::new(directory)),
            &ContainerSettings::default(),
        )
    }

    /// Container whose definitions come from `provider`
    ///
    /// Fails when the configuration holds alias chains.
    pub fn with_provider(
        mut configuration: Configuration,
        provider: Box<dyn DefinitionProvider>,
        settings: &ContainerSettings,
    ) -> Result<Arc<Self>> {
        let container_id = settings.container_id.clone();
        for alias in &settings.container_aliases {
            configuration
                .aliases
                .insert(alias.clone(), container_id.clone());
        }
        configuration.validate_aliases()?;

        Ok(Arc::new_cyclic(|this: &Weak<Self>| {
            let definition = self_definition(&container_id, this.clone());
            configuration
                .definitions
                .insert(container_id.clone(), Arc::new(definition));
            Self {
                configuration,
                provider,
                instances: DashMap::new(),
                container_id,
            }
        }))
    }

    /// Resolve a public service
    pub fn get(&self, id: &str) -> Result<Value> {
        let mut loading = LoadingStack::new();
        self.resolve_service(id, true, &mut loading)
    }

    /// Resolve a public service and downcast it to `T`
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        let value = self.get(id)?;
        value.downcast::<T>().ok_or_else(|| {
            let found = match &value {
                Value::Object(object) => object.type_name().to_owned(),
                other => other.kind_name().to_owned(),
            };
            Error::invalid_definition(format!(
                "Service `{id}` is `{found}`, not `{}`",
                type_name::<T>()
            ))
        })
    }

    /// Whether `id` names a public, shared service
    ///
    /// Non-shared services are reported absent, as is any id whose
    /// definition lookup fails.
    pub fn has(&self, id: &str) -> bool {
        self.provider
            .definition(&self.configuration, id)
            .is_ok_and(|definition| definition.public && definition.shared)
    }

    /// Inject a pre-built instance, bypassing construction
    pub fn set(&self, id: &str, instance: impl Into<Value>) {
        let id = self.configuration.canonical_id(id).to_owned();
        self.instances.insert(id, instance.into());
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Id under which the container serves itself
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    fn cached(&self, id: &str) -> Option<Value> {
        let id = self.configuration.canonical_id(id);
        self.instances.get(id).map(|instance| instance.value().clone())
    }

    fn resolve_service(
        &self,
        id: &str,
        require_public: bool,
        loading: &mut LoadingStack,
    ) -> Result<Value> {
        let definition = match self.provider.definition(&self.configuration, id) {
            Ok(definition) => definition,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return self.cached(id).ok_or(err);
            }
            Err(err) => return Err(err),
        };
        if require_public && !definition.public {
            return Err(Error::private_service(id));
        }
        let service_id = self.provider.service_id(&self.configuration, id);
        self.resolve_instance(&service_id, &definition, loading)
    }

    fn resolve_instance(
        &self,
        id: &str,
        definition: &Definition,
        loading: &mut LoadingStack,
    ) -> Result<Value> {
        if !definition.shared {
            return self.build(id, definition, loading);
        }
        if let Some(instance) = self.instances.get(id) {
            trace!(service = id, "cache hit");
            return Ok(instance.value().clone());
        }
        self.build(id, definition, loading)
    }

    fn build(&self, id: &str, definition: &Definition, loading: &mut LoadingStack) -> Result<Value> {
        loading.enter(id)?;
        let resolved = self
            .resolve_arguments(&definition.arguments, loading)
            .and_then(|arguments| {
                let target = self.resolve_constructor(&definition.constructor, loading)?;
                Ok((arguments, target))
            });
        loading.leave();
        let (arguments, target) = resolved?;

        let instance = target
            .invoke(Arguments::from_parts(Vec::new(), arguments))
            .map_err(|source| Error::construction(id, source))?;
        debug!(service = id, shared = definition.shared, "service instantiated");

        let cached = definition.shared && id != self.container_id;
        if cached {
            match self.instances.entry(id.to_owned()) {
                Entry::Occupied(existing) => return Ok(existing.get().clone()),
                Entry::Vacant(slot) => {
                    slot.insert(instance.clone());
                }
            }
        }

        let called = definition
            .calls
            .iter()
            .try_for_each(|call| self.invoke_call(id, &instance, call, loading));
        if let Err(err) = called {
            if cached {
                self.instances
                    .remove_if(id, |_, stored| *stored == instance);
                debug!(service = id, "evicted after failed call");
            }
            return Err(err);
        }
        Ok(instance)
    }

    fn invoke_call(
        &self,
        id: &str,
        instance: &Value,
        call: &Call,
        loading: &mut LoadingStack,
    ) -> Result<()> {
        let (object, method) = instance
            .as_object()
            .and_then(|object| Some((object, object.method(&call.method)?)))
            .ok_or_else(|| {
                Error::invalid_definition(format!(
                    "Service `{id}` has no method `{}`",
                    call.method
                ))
            })?;
        let positional = call
            .positional
            .iter()
            .map(|argument| self.resolve_argument(argument, loading))
            .collect::<Result<Vec<_>>>()?;
        let named = self.resolve_arguments(&call.named, loading)?;

        method
            .invoke(object, Arguments::from_parts(positional, named))
            .map_err(|source| Error::construction(id, source))?;
        Ok(())
    }

    fn resolve_arguments(
        &self,
        arguments: &BTreeMap<String, Argument>,
        loading: &mut LoadingStack,
    ) -> Result<BTreeMap<String, Value>> {
        arguments
            .iter()
            .map(|(name, argument)| Ok((name.clone(), self.resolve_argument(argument, loading)?)))
            .collect()
    }

    fn resolve_argument(&self, argument: &Argument, loading: &mut LoadingStack) -> Result<Value> {
        match argument {
            Argument::Value(value) => Ok(value.clone()),
            Argument::Reference(reference) => self.resolve_service(&reference.id, false, loading),
            Argument::Definition(definition) => {
                let key = format!("{INLINE_DEFINITION_PREFIX}{:p}", Arc::as_ptr(definition));
                self.resolve_instance(&key, definition, loading)
            }
            Argument::Callable(callable) => self.resolve_callable(callable, loading),
            Argument::List(arguments) => arguments
                .iter()
                .map(|argument| self.resolve_argument(argument, loading))
                .collect::<Result<_>>()
                .map(Value::List),
            Argument::Map(arguments) => self.resolve_arguments(arguments, loading).map(Value::Map),
        }
    }

    /// Bind `callable.method` on its holder; an empty method yields the holder
    fn resolve_callable(&self, callable: &Callable, loading: &mut LoadingStack) -> Result<Value> {
        let method = callable.method.as_str();
        match &callable.holder {
            Holder::Reference(reference) => {
                let holder = self.resolve_service(&reference.id, false, loading)?;
                if method.is_empty() {
                    return Ok(holder);
                }
                holder
                    .as_object()
                    .and_then(|object| object.bind(method))
                    .map(Value::Function)
                    .ok_or_else(|| {
                        Error::invalid_definition(format!(
                            "Service `{}` has no method `{method}`",
                            reference.id
                        ))
                    })
            }
            Holder::Type(handle) if method.is_empty() => {
                Ok(Value::Function(TypeInfo::as_function(handle)))
            }
            Holder::Type(handle) => handle
                .function(method)
                .cloned()
                .map(Value::Function)
                .ok_or_else(|| {
                    Error::invalid_definition(format!(
                        "Type `{}` has no function `{method}`",
                        handle.qualified_name()
                    ))
                }),
            Holder::Function(function) if method.is_empty() => {
                Ok(Value::Function(function.clone()))
            }
            Holder::Function(function) => Err(Error::invalid_definition(format!(
                "Cannot bind `{method}` on function `{}`",
                function.name()
            ))),
        }
    }

    fn resolve_constructor(
        &self,
        constructor: &Constructor,
        loading: &mut LoadingStack,
    ) -> Result<Invocable> {
        let value = match constructor {
            Constructor::Class(handle) => return Ok(Invocable::Type(Arc::clone(handle))),
            Constructor::Factory(Factory::Function(function)) => {
                return Ok(Invocable::Function(function.clone()));
            }
            Constructor::Factory(Factory::Callable(callable)) => {
                self.resolve_callable(callable, loading)?
            }
            Constructor::Factory(Factory::Reference(reference)) => {
                self.resolve_service(&reference.id, false, loading)?
            }
        };
        match value {
            Value::Function(function) => Ok(Invocable::Function(function)),
            other => Err(Error::invalid_definition(format!(
                "Factory resolved to a {} value, which is not callable",
                other.kind_name()
            ))),
        }
    }
}

impl ServiceLocator for Container {
    fn get(&self, id: &str) -> Result<Value> {
        Container::get(self, id)
    }

    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }
}

/// A resolved constructor or factory
enum Invocable {
    Type(TypeHandle),
    Function(Function),
}

impl Invocable {
    fn invoke(self, arguments: Arguments) -> std::result::Result<Value, BoxError> {
        match self {
            Self::Type(handle) => handle.instantiate(arguments).map(Value::Object),
            Self::Function(function) => function.call(arguments),
        }
    }
}

/// Public factory definition serving the container itself
///
/// The factory holds a weak reference; the instance is never cached, so the
/// container does not keep itself alive.
fn self_definition(container_id: &str, this: Weak<Container>) -> Definition {
    let type_name = container_id.to_owned();
    let factory = Function::new(container_id, move |_| {
        let container = this.upgrade().ok_or("container has been dropped")?;
        Ok(Value::Object(
            Object::from_arc(container).with_methods(type_name.as_str(), locator_methods()),
        ))
    });
    Definition::factory(Factory::Function(factory)).with_public(true)
}

/// `get` and `has`, callable on the injected container
fn locator_methods() -> Arc<BTreeMap<String, Method>> {
    let id = || vec![Parameter::builtin("id", BuiltinKind::Str)];
    let get = Method::typed(|container: &Container, arguments| {
        Ok(container.get(arguments.string("id")?)?)
    })
    .with_signature(id());
    let has = Method::typed(|container: &Container, arguments| {
        Ok(Value::Bool(container.has(arguments.string("id")?)))
    })
    .with_signature(id());
    Arc::new(BTreeMap::from([
        ("get".to_owned(), get),
        ("has".to_owned(), has),
    ]))
}
