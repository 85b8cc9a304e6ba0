//! Unit tests for service definitions

use std::sync::Arc;

use dinject_domain::{
    Argument, Call, Definition, Error, Factory, Function, Reference, Tag, TypeInfo, Value,
};

fn handle(name: &str) -> Arc<TypeInfo> {
    Arc::new(TypeInfo::builder(name).build())
}

#[test]
fn test_definitions_default_to_private_and_shared() {
    let definition = Definition::class(handle("app.Logger"));
    assert!(!definition.public);
    assert!(definition.shared);
    assert!(definition.arguments.is_empty());
    assert!(definition.calls.is_empty());
}

#[test]
fn test_class_and_factory_are_mutually_exclusive() {
    let factory = Factory::Function(Function::new("make", |_| Ok(Value::Null)));
    let both = Definition::try_new(Some(handle("app.Logger")), Some(factory));
    assert!(matches!(both, Err(Error::InvalidDefinition { .. })));

    let neither = Definition::try_new(None, None);
    assert!(matches!(neither, Err(Error::InvalidDefinition { .. })));

    let class_only = Definition::try_new(Some(handle("app.Logger")), None);
    assert!(class_only.is_ok_and(|d| d.class_handle().is_some()));
}

#[test]
fn test_has_tag_is_case_sensitive() {
    let definition = Definition::class(handle("app.Listener")).with_tag(Tag::new("event.listener"));
    assert!(definition.has_tag("event.listener"));
    assert!(!definition.has_tag("Event.Listener"));
    assert!(!definition.has_tag("other"));
}

#[test]
fn test_find_tags_in_declaration_order_and_restartable() {
    let definition = Definition::class(handle("app.Listener"))
        .with_tag(Tag::new("listener").with_attribute("event", "start"))
        .with_tag(Tag::new("other"))
        .with_tag(Tag::new("listener").with_attribute("event", "stop"));

    let tags = definition.find_tags("listener");
    let events: Vec<_> = tags
        .clone()
        .map(|tag| tag.attributes["event"].clone())
        .collect();
    assert_eq!(events, vec![Value::from("start"), Value::from("stop")]);
    assert_eq!(tags.count(), 2);
    assert_eq!(definition.find_tags("missing").count(), 0);
}

#[test]
fn test_builders_accumulate_arguments_and_calls() {
    let definition = Definition::class(handle("app.Service"))
        .with_argument("logger", Reference::new("app.Logger"))
        .with_argument("retries", 3)
        .with_call(Call::new("setA").arg(1))
        .with_call(Call::new("setB").arg(2))
        .with_public(true)
        .with_shared(false);

    assert!(definition.public);
    assert!(!definition.shared);
    assert_eq!(
        definition.arguments["logger"].as_reference(),
        Some(&Reference::new("app.Logger"))
    );
    assert_eq!(
        definition.arguments["retries"].as_value(),
        Some(&Value::Int(3))
    );
    let methods: Vec<_> = definition.calls.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(methods, ["setA", "setB"]);
}

#[test]
fn test_reference_display() {
    assert_eq!(Reference::new("logger").to_string(), "@logger");
    assert!(matches!(Argument::reference("x"), Argument::Reference(_)));
}
