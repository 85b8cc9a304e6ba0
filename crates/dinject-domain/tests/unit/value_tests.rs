//! Unit tests for runtime values and type metadata

use std::sync::Mutex;

use dinject_domain::{Arguments, BuiltinKind, Function, Object, Parameter, TypeInfo, Value};

struct Greeter {
    greeting: String,
    calls: Mutex<Vec<String>>,
}

fn greeter_type() -> TypeInfo {
    TypeInfo::builder("app.Greeter")
        .parameter(Parameter::builtin("greeting", BuiltinKind::Str).with_default("hello"))
        .constructor(|args: Arguments| {
            Ok(Greeter {
                greeting: args.string("greeting")?.to_owned(),
                calls: Mutex::new(Vec::new()),
            })
        })
        .method_with_signature(
            "greet",
            vec![Parameter::builtin("name", BuiltinKind::Str)],
            |greeter: &Greeter, args| {
                let name = args.string("name")?;
                greeter.calls.lock().expect("lock").push(name.to_owned());
                Ok(Value::from(format!("{} {name}", greeter.greeting)))
            },
        )
        .build()
}

#[test]
fn test_instantiate_binds_positional_arguments() {
    let object = greeter_type()
        .instantiate(Arguments::new().arg("hi"))
        .expect("constructed");
    let greeter = object.downcast::<Greeter>().expect("greeter");
    assert_eq!(greeter.greeting, "hi");
}

#[test]
fn test_bound_method_dispatches_on_receiver() {
    let object = greeter_type()
        .instantiate(Arguments::new().with("greeting", "hey"))
        .expect("constructed");
    let greet = object.bind("greet").expect("method");

    let result = greet.call(Arguments::new().arg("ana")).expect("called");
    assert_eq!(result, Value::from("hey ana"));

    let greeter = object.downcast::<Greeter>().expect("greeter");
    assert_eq!(*greeter.calls.lock().expect("lock"), vec!["ana".to_owned()]);
}

#[test]
fn test_missing_arguments_take_declared_defaults() {
    let object = greeter_type()
        .instantiate(Arguments::new())
        .expect("constructed");
    let greeter = object.downcast::<Greeter>().expect("greeter");
    assert_eq!(greeter.greeting, "hello");
}

#[test]
fn test_missing_method_argument_is_reported() {
    let object = greeter_type()
        .instantiate(Arguments::new())
        .expect("constructed");
    let greet = object.bind("greet").expect("method");
    let error = greet.call(Arguments::new()).expect_err("name is required");
    assert!(error.to_string().contains("name"));
}

#[test]
fn test_abstract_type_without_constructor_cannot_be_built() {
    let info = TypeInfo::builder("app.MailerInterface").abstract_type().build();
    assert!(info.is_abstract());
    assert!(info.instantiate(Arguments::new()).is_err());
}

#[test]
fn test_functions_compare_by_identity() {
    let f = Function::new("f", |_| Ok(Value::Null));
    let g = Function::new("f", |_| Ok(Value::Null));
    assert_eq!(Value::Function(f.clone()), Value::Function(f));
    assert_ne!(
        Value::Function(g),
        Value::Function(Function::new("f", |_| Ok(Value::Null)))
    );
}

#[test]
fn test_builtin_kinds_accept_matching_literals() {
    assert!(BuiltinKind::Int.accepts(&Value::Int(1)));
    assert!(!BuiltinKind::Int.accepts(&Value::from("1")));
    assert!(BuiltinKind::Float.accepts(&Value::Int(1)));
    assert!(BuiltinKind::Dict.accepts(&Value::Map(Default::default())));
    assert!(BuiltinKind::Object.accepts(&Value::object(1_u8)));
}

#[test]
fn test_arguments_typed_accessors() {
    let args = Arguments::new()
        .with("name", "x")
        .with("count", 2)
        .with("flag", true)
        .with("service", Object::new(5_u32));

    assert_eq!(args.string("name").ok(), Some("x"));
    assert_eq!(args.int("count").ok(), Some(2));
    assert_eq!(args.bool("flag").ok(), Some(true));
    assert_eq!(args.service::<u32>("service").ok().as_deref(), Some(&5));
    assert!(args.int("name").is_err());
    assert!(args.value("missing").is_err());
}
