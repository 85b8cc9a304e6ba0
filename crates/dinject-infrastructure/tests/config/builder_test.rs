//! Configuration Builder Tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dinject_domain::error::{Error, Result};
use dinject_domain::{Argument, Configuration, Definition, Tag, Value};
use dinject_infrastructure::config::{BuilderPass, ConfigurationBuilder};

use crate::test_utils::{logger_type, service_type};

/// Collects services tagged `listener` into the `listeners` argument of `dispatcher`
struct CollectListeners {
    runs: Arc<AtomicUsize>,
}

impl BuilderPass for CollectListeners {
    fn process(&self, builder: &mut ConfigurationBuilder) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let listeners: Vec<Argument> = builder
            .find_tagged_definitions("listener")
            .map(|(id, _)| Argument::reference(id))
            .collect();
        if let Some(dispatcher) = builder.definition_mut("dispatcher") {
            dispatcher
                .arguments
                .insert("listeners".to_owned(), Argument::List(listeners));
        }
        Ok(())
    }
}

struct Failing;

impl BuilderPass for Failing {
    fn process(&self, _builder: &mut ConfigurationBuilder) -> Result<()> {
        Err(Error::invalid_definition("pass refused the configuration"))
    }
}

fn tagged_configuration() -> Configuration {
    let logger = Arc::new(logger_type());
    Configuration::new()
        .with_parameter("channel", "audit")
        .with_definition(
            "audit",
            Definition::class(Arc::clone(&logger))
                .with_argument("name", "%channel%")
                .with_tag(Tag::new("listener")),
        )
        .with_definition(
            "mail",
            Definition::class(Arc::clone(&logger)).with_tag(Tag::new("listener")),
        )
        .with_definition("dispatcher", Definition::class(Arc::new(service_type())))
}

#[test]
fn test_passes_rewrite_before_interpolation() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut builder = ConfigurationBuilder::new(tagged_configuration()).with_pass(CollectListeners {
        runs: Arc::clone(&runs),
    });

    let configuration = builder.build().unwrap();

    let Argument::List(listeners) = &configuration.definition("dispatcher").unwrap().arguments["listeners"]
    else {
        panic!("expected the listeners list");
    };
    let ids: Vec<&str> = listeners
        .iter()
        .filter_map(|argument| argument.as_reference())
        .map(|reference| reference.id.as_str())
        .collect();
    assert_eq!(ids, vec!["audit", "mail"]);
    assert_eq!(
        configuration.definition("audit").unwrap().arguments["name"].as_value(),
        Some(&Value::from("audit"))
    );
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_build_is_idempotent() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut builder = ConfigurationBuilder::new(tagged_configuration()).with_pass(CollectListeners {
        runs: Arc::clone(&runs),
    });

    let first = builder.build().unwrap();
    let second = builder.build().unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(first.parameters, second.parameters);
    assert_eq!(first.definitions.len(), second.definitions.len());
}

#[test]
fn test_failing_pass_aborts_build() {
    let mut builder = ConfigurationBuilder::new(tagged_configuration()).with_pass(Failing);

    let err = builder.build().unwrap_err();

    assert!(err.to_string().contains("pass refused"));
}

#[test]
fn test_definition_mut_copies_on_write() {
    let configuration = tagged_configuration();
    let original = Arc::clone(configuration.definition("mail").unwrap());
    let mut builder = ConfigurationBuilder::new(configuration);

    builder
        .definition_mut("mail")
        .unwrap()
        .arguments
        .insert("name".to_owned(), Argument::from("mailer"));

    assert!(original.arguments.is_empty());
    assert_eq!(
        builder.definition("mail").unwrap().arguments["name"].as_value(),
        Some(&Value::from("mailer"))
    );
}

#[test]
fn test_builder_edits_definitions_aliases_and_parameters() {
    let mut builder = ConfigurationBuilder::new(Configuration::new());

    builder.set_parameter("level", "debug");
    builder.set_definition("logger", Definition::class(Arc::new(logger_type())));
    builder.set_alias("log", "logger");

    assert_eq!(builder.parameter("level"), Some(&Value::from("debug")));
    assert!(builder.definition("log").is_some());
    assert!(builder.definition_mut("missing").is_none());
    let configuration = builder.into_configuration();
    assert_eq!(configuration.canonical_id("log"), "logger");
}
