//! Resolution Engine Tests

use std::sync::Arc;

use dinject_domain::error::{Error, ErrorKind};
use dinject_domain::{
    Arguments, BoxError, Call, Callable, Configuration, Definition, Factory, Function, Holder,
    Reference, TypeInfo, Value,
};
use dinject_infrastructure::di::Container;

use crate::test_utils::{
    Logger, Recorder, Service, left_type, logger_type, recorder_type, right_type, service_type,
};

fn logger() -> Definition {
    Definition::class(Arc::new(logger_type()))
}

fn service() -> Definition {
    Definition::class(Arc::new(service_type()))
}

fn recorder() -> Definition {
    Definition::class(Arc::new(recorder_type()))
}

fn container(configuration: Configuration) -> Arc<Container> {
    Container::new(configuration).unwrap()
}

#[test]
fn test_shared_services_are_built_once() {
    let container = container(
        Configuration::new()
            .with_definition("app.Logger", logger().with_public(true))
            .with_definition(
                "app.Service",
                service()
                    .with_public(true)
                    .with_argument("logger", Reference::new("app.Logger")),
            ),
    );

    let service = container.get_as::<Service>("app.Service").unwrap();
    let logger = container.get_as::<Logger>("app.Logger").unwrap();

    assert!(Arc::ptr_eq(&service.logger, &logger));
    assert!(Arc::ptr_eq(&logger, &container.get_as::<Logger>("app.Logger").unwrap()));
    assert_eq!(logger.name, "app");
}

#[test]
fn test_non_shared_services_are_built_per_request() {
    let container = container(
        Configuration::new().with_definition("recorder", recorder().with_public(true).with_shared(false)),
    );

    let first = container.get("recorder").unwrap();
    let second = container.get("recorder").unwrap();

    assert!(!first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));
}

#[test]
fn test_concurrent_gets_share_one_instance() {
    let container = container(Configuration::new().with_definition("log", logger().with_public(true)));

    let instances: Vec<Arc<Logger>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| container.get_as::<Logger>("log").unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_circular_reference_reports_the_chain() {
    let container = container(
        Configuration::new()
            .with_definition(
                "a",
                Definition::class(Arc::new(left_type()))
                    .with_public(true)
                    .with_argument("right", Reference::new("b")),
            )
            .with_definition(
                "b",
                Definition::class(Arc::new(right_type())).with_argument("left", Reference::new("a")),
            ),
    );

    let err = container.get("a").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CircularReference);
    assert!(matches!(&err, Error::ServiceCircularReference { chain } if chain == &["a", "b", "a"]));
    assert_eq!(
        err.to_string(),
        "The service `a` has a circular reference to itself: a -> b -> a"
    );
    // the loading stack does not leak into the next request
    assert_eq!(container.get("a").unwrap_err().kind(), ErrorKind::CircularReference);
}

#[test]
fn test_private_services_are_injectable_but_not_gettable() {
    let container = container(
        Configuration::new()
            .with_definition("logger", logger())
            .with_definition(
                "service",
                service()
                    .with_public(true)
                    .with_argument("logger", Reference::new("logger")),
            ),
    );

    assert!(container.get_as::<Service>("service").is_ok());
    let err = container.get("logger").unwrap_err();
    assert!(matches!(err, Error::PrivateService { ref id } if id == "logger"));
    assert_eq!(err.kind(), ErrorKind::PrivateAccess);
}

#[test]
fn test_has_reports_public_shared_services() {
    let container = container(
        Configuration::new()
            .with_definition("public", logger().with_public(true))
            .with_definition("private", logger())
            .with_definition("prototype", logger().with_public(true).with_shared(false)),
    );

    assert!(container.has("public"));
    assert!(!container.has("private"));
    assert!(!container.has("prototype"));
    assert!(!container.has("missing"));
}

#[test]
fn test_unknown_service_is_not_found() {
    let container = container(Configuration::new());

    let err = container.get("missing").unwrap_err();

    assert!(matches!(err, Error::ServiceNotFound { ref id } if id == "missing"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_set_injects_instances() {
    let container = container(
        Configuration::new()
            .with_definition("app.Logger", logger().with_public(true))
            .with_alias("log", "app.Logger"),
    );

    container.set(
        "log",
        Value::object(Logger {
            name: "injected".to_owned(),
        }),
    );
    container.set("answer", 42);

    assert_eq!(container.get_as::<Logger>("app.Logger").unwrap().name, "injected");
    assert_eq!(container.get("answer").unwrap(), Value::Int(42));
    // injected instances are not registered services
    assert!(!container.has("answer"));
    assert!(container.has("log"));
}

#[test]
fn test_aliases_resolve_to_the_same_instance() {
    let container = container(
        Configuration::new()
            .with_definition("app.Logger", logger().with_public(true))
            .with_alias("log", "app.Logger"),
    );

    let by_alias = container.get_as::<Logger>("log").unwrap();
    let by_id = container.get_as::<Logger>("app.Logger").unwrap();

    assert!(Arc::ptr_eq(&by_alias, &by_id));
}

#[test]
fn test_alias_chains_are_rejected() {
    let configuration = Configuration::new()
        .with_definition("c", logger())
        .with_alias("a", "b")
        .with_alias("b", "c");

    let err = Container::new(configuration).err().unwrap();

    assert!(matches!(err, Error::AliasChain { .. }));
}

#[test]
fn test_calls_run_in_declaration_order() {
    let container = container(Configuration::new().with_definition(
        "recorder",
        recorder()
            .with_public(true)
            .with_call(Call::new("setA").arg(1))
            .with_call(Call::new("setB").named_arg("value", 2)),
    ));

    let recorder = container.get_as::<Recorder>("recorder").unwrap();

    assert_eq!(recorder.events(), vec!["setA(Int(1))", "setB(Int(2))"]);
}

#[test]
fn test_call_to_missing_method_is_invalid() {
    let container = container(Configuration::new().with_definition(
        "recorder",
        recorder().with_public(true).with_call(Call::new("setC").arg(1)),
    ));

    let err = container.get("recorder").unwrap_err();

    assert!(matches!(err, Error::InvalidDefinition { .. }));
    assert!(err.to_string().contains("setC"));
}

#[test]
fn test_failed_call_does_not_cache_the_instance() {
    let container = container(Configuration::new().with_definition(
        "recorder",
        recorder().with_public(true).with_call(Call::new("setA")),
    ));

    let first = container.get("recorder").unwrap_err();
    let second = container.get("recorder").unwrap_err();

    assert!(matches!(first, Error::Construction { ref id, .. } if id == "recorder"));
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_constructor_failures_keep_their_cause() {
    let broken = TypeInfo::builder("app.Broken")
        .constructor(|_| -> Result<Logger, BoxError> { Err(std::io::Error::other("disk full").into()) })
        .build();
    let container = container(
        Configuration::new().with_definition("broken", Definition::class(Arc::new(broken)).with_public(true)),
    );

    let err = container.get("broken").unwrap_err();

    assert!(matches!(err, Error::Construction { ref id, .. } if id == "broken"));
    let cause = err.construction_cause().unwrap();
    assert!(cause.downcast_ref::<std::io::Error>().is_some());
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_static_definitions_are_not_autowired() {
    let container = container(Configuration::new().with_definition("service", service().with_public(true)));

    let err = container.get("service").unwrap_err();

    assert!(matches!(err, Error::Construction { .. }));
    assert!(err.construction_cause().is_some());
}

#[test]
fn test_get_as_rejects_other_types() {
    let container = container(Configuration::new().with_definition("log", logger().with_public(true)));

    let err = container.get_as::<Service>("log").err().unwrap();

    assert!(matches!(err, Error::InvalidDefinition { .. }));
}

#[test]
fn test_container_serves_itself() {
    let container = container(Configuration::new().with_definition("log", logger().with_public(true)));

    let by_id = container.get_as::<Container>(container.container_id()).unwrap();
    let by_alias = container.get_as::<Container>("container").unwrap();
    let as_locator = container.get_as::<Container>("dinject.ServiceLocator").unwrap();

    assert!(Arc::ptr_eq(&by_id, &container));
    assert!(Arc::ptr_eq(&by_alias, &container));
    assert!(Arc::ptr_eq(&as_locator, &container));
    assert!(container.has("container"));
}

#[test]
fn test_injected_container_exposes_get_and_has() {
    let container = container(Configuration::new().with_definition("log", logger().with_public(true)));

    let injected = container.get("container").unwrap();
    let object = injected.as_object().unwrap();
    let get = object.bind("get").unwrap();
    let has = object.bind("has").unwrap();

    let logger = get.call(Arguments::new().arg("log")).unwrap();
    assert!(logger.downcast::<Logger>().is_some());
    assert_eq!(has.call(Arguments::new().arg("log")).unwrap(), Value::Bool(true));
    assert_eq!(has.call(Arguments::new().arg("nope")).unwrap(), Value::Bool(false));
}

#[test]
fn test_container_can_be_injected_as_a_dependency() {
    let holder = TypeInfo::builder("app.Holder")
        .constructor(|args: Arguments| args.service::<Container>("locator").map_err(Into::into))
        .build();
    let container = container(Configuration::new().with_definition(
        "holder",
        Definition::class(Arc::new(holder))
            .with_public(true)
            .with_argument("locator", Reference::new("container")),
    ));

    let injected = container.get_as::<Arc<Container>>("holder").unwrap();

    assert!(Arc::ptr_eq(&*injected, &container));
}

#[test]
fn test_inline_definitions_are_shared_by_identity() {
    let inline = Arc::new(logger().with_argument("name", "inline"));
    let container = container(
        Configuration::new()
            .with_definition(
                "first",
                service().with_public(true).with_argument("logger", Arc::clone(&inline)),
            )
            .with_definition(
                "second",
                service().with_public(true).with_argument("logger", Arc::clone(&inline)),
            )
            .with_definition(
                "third",
                service()
                    .with_public(true)
                    .with_argument("logger", logger().with_argument("name", "inline")),
            ),
    );

    let first = container.get_as::<Service>("first").unwrap();
    let second = container.get_as::<Service>("second").unwrap();
    let third = container.get_as::<Service>("third").unwrap();

    assert_eq!(first.logger.name, "inline");
    assert!(Arc::ptr_eq(&first.logger, &second.logger));
    assert!(!Arc::ptr_eq(&first.logger, &third.logger));
}

#[test]
fn test_callable_arguments_bind_service_methods() {
    let echo = Function::new("echo", |args: Arguments| Ok(args.value("callback")?.clone()));
    let container = container(
        Configuration::new()
            .with_definition("recorder", recorder().with_public(true))
            .with_definition(
                "hook",
                Definition::factory(Factory::Function(echo))
                    .with_public(true)
                    .with_argument("callback", Callable::service_method("recorder", "setA")),
            ),
    );

    let hook = container.get("hook").unwrap();
    hook.as_function().unwrap().call(Arguments::new().arg(7)).unwrap();

    let recorder = container.get_as::<Recorder>("recorder").unwrap();
    assert_eq!(recorder.events(), vec!["setA(Int(7))"]);
}

#[test]
fn test_type_function_factory() {
    let logger_type = Arc::new(logger_type());
    let container = container(Configuration::new().with_definition(
        "named",
        Definition::factory(Factory::Callable(Callable::new(Holder::Type(logger_type), "named")))
            .with_public(true)
            .with_argument("name", "made"),
    ));

    assert_eq!(container.get_as::<Logger>("named").unwrap().name, "made");
}

#[test]
fn test_reference_factory_invokes_the_referenced_callable() {
    let maker = Function::new("maker", |_| {
        Ok(Value::Function(Function::new("make", |args: Arguments| {
            Ok(Value::object(Logger {
                name: args.string("name")?.to_owned(),
            }))
        })))
    });
    let container = container(
        Configuration::new()
            .with_definition("maker", Definition::factory(Factory::Function(maker)))
            .with_definition(
                "built",
                Definition::factory(Factory::Reference(Reference::new("maker")))
                    .with_public(true)
                    .with_argument("name", "by-reference"),
            ),
    );

    assert_eq!(container.get_as::<Logger>("built").unwrap().name, "by-reference");
}

#[test]
fn test_factory_must_resolve_to_a_callable() {
    let container = container(
        Configuration::new()
            .with_definition(
                "number",
                Definition::factory(Factory::Function(Function::new("number", |_| Ok(Value::Int(1))))),
            )
            .with_definition(
                "bad",
                Definition::factory(Factory::Reference(Reference::new("number"))).with_public(true),
            ),
    );

    let err = container.get("bad").unwrap_err();

    assert!(matches!(err, Error::InvalidDefinition { .. }));
}

#[test]
fn test_factory_referencing_itself_is_a_cycle() {
    let container = container(Configuration::new().with_definition(
        "loop",
        Definition::factory(Factory::Reference(Reference::new("loop"))).with_public(true),
    ));

    let err = container.get("loop").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CircularReference);
}
