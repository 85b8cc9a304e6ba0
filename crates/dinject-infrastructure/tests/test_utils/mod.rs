//! Fixture types shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dinject_domain::{Arguments, BoxError, BuiltinKind, Function, Parameter, TypeInfo, Value};
use dinject_infrastructure::di::TypeRegistry;

/// Leaf service
pub struct Logger {
    pub name: String,
}

/// Service depending on a logger
pub struct Service {
    pub logger: Arc<Logger>,
}

/// Records the methods called on it, in order
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("recorder lock").clone()
    }
}

/// Two services needing each other
pub struct Left;
pub struct Right;

pub fn logger_type() -> TypeInfo {
    TypeInfo::builder("app.Logger")
        .parameter(Parameter::builtin("name", BuiltinKind::Str).with_default("app"))
        .constructor(|args: Arguments| {
            Ok(Logger {
                name: args.string("name")?.to_owned(),
            })
        })
        .function(
            "named",
            Function::new("app.Logger.named", |args| {
                Ok(Value::object(Logger {
                    name: args.string("name")?.to_owned(),
                }))
            })
            .with_signature(vec![Parameter::builtin("name", BuiltinKind::Str)]),
        )
        .build()
}

pub fn service_type() -> TypeInfo {
    TypeInfo::builder("app.Service")
        .parameter(Parameter::service("logger", "app.Logger"))
        .constructor(|args: Arguments| {
            Ok(Service {
                logger: args.service::<Logger>("logger")?,
            })
        })
        .build()
}

pub fn recorder_type() -> TypeInfo {
    let record = |label: &'static str| {
        move |recorder: &Recorder, args: Arguments| -> Result<Value, BoxError> {
            let value = args.value("value")?;
            recorder
                .events
                .lock()
                .expect("recorder lock")
                .push(format!("{label}({value:?})"));
            Ok(Value::Null)
        }
    };
    TypeInfo::builder("app.Recorder")
        .constructor(|_| Ok(Recorder::default()))
        .method_with_signature("setA", vec![Parameter::untyped("value")], record("setA"))
        .method_with_signature("setB", vec![Parameter::untyped("value")], record("setB"))
        .build()
}

pub fn left_type() -> TypeInfo {
    TypeInfo::builder("app.Left")
        .parameter(Parameter::service("right", "app.Right"))
        .constructor(|_| Ok(Left))
        .build()
}

pub fn right_type() -> TypeInfo {
    TypeInfo::builder("app.Right")
        .parameter(Parameter::service("left", "app.Left"))
        .constructor(|_| Ok(Right))
        .build()
}

/// Registry holding every fixture type
pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::new();
    registry.register(logger_type());
    registry.register(service_type());
    registry.register(recorder_type());
    registry.register(left_type());
    registry.register(right_type());
    Arc::new(registry)
}
