//! Services document loader
//!
//! Turns a plain TOML or JSON document into a [`Configuration`]:
//!
//! ```toml
//! [parameters]
//! dsn = "postgres://%host%/app"
//! host = "localhost"
//!
//! [services.mailer]
//! class = "app.Mailer"
//! public = true
//! arguments = { transport = "@transport", sender = "@@noreply" }
//! calls = [{ method = "set_retries", arguments = [3] }]
//! tags = ["monitored", { name = "event.listener", event = "sent" }]
//!
//! [services.transport]
//! factory = "app.SmtpTransport::from_dsn"
//! arguments = { dsn = "%dsn%" }
//!
//! [aliases]
//! "app.Mailer" = "mailer"
//! ```
//!
//! A string argument starting with `@` references another service; `\@` and
//! `@@` escape a literal leading `@`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dinject_domain::constants::{ESCAPED_REFERENCE_PREFIXES, FUNCTION_SEPARATOR, REFERENCE_PREFIX};
use dinject_domain::error::{Error, Result};
use dinject_domain::ports::TypeDirectory;
use dinject_domain::{
    Argument, Call, Callable, Configuration, Definition, Factory, Holder, Reference, Tag, Value,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use crate::error_ext::ErrorContext;

/// Top-level services document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub parameters: BTreeMap<String, Json>,
    pub services: BTreeMap<String, ServiceDocument>,
    pub aliases: BTreeMap<String, String>,
}

/// One service entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDocument {
    /// Qualified type name; defaults to the service id
    pub class: Option<String>,
    /// `"@id"`, `"@id::method"`, `"Type::function"` or `[holder, method]`
    pub factory: Option<Json>,
    pub arguments: BTreeMap<String, Json>,
    pub calls: Vec<CallDocument>,
    pub public: bool,
    pub shared: bool,
    /// Tag names, or tables with a `name` key and free-form attributes
    pub tags: Vec<Json>,
}

impl Default for ServiceDocument {
    fn default() -> Self {
        Self {
            class: None,
            factory: None,
            arguments: BTreeMap::new(),
            calls: Vec::new(),
            public: false,
            shared: true,
            tags: Vec::new(),
        }
    }
}

/// A post-construction call entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDocument {
    pub method: String,
    #[serde(default)]
    pub arguments: Vec<Json>,
    #[serde(default)]
    pub named: BTreeMap<String, Json>,
}

impl Document {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).config_context("Invalid TOML services document")
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).config_context("Invalid JSON services document")
    }

    /// Read a document; `.json` files are parsed as JSON, anything else as TOML
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .io_context(format!("Failed to read services document {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }
}

/// Resolve a document into a configuration, locating classes in `directory`
pub fn resolve(document: Document, directory: &dyn TypeDirectory) -> Result<Configuration> {
    let mut configuration = Configuration::new();
    for (name, value) in document.parameters {
        configuration.parameters.insert(name, Value::from(value));
    }
    for (id, service) in document.services {
        let definition = resolve_service(&id, service, directory)?;
        configuration.definitions.insert(id, Arc::new(definition));
    }
    configuration.aliases = document.aliases;
    configuration.validate_aliases()?;

    debug!(
        services = configuration.definitions.len(),
        parameters = configuration.parameters.len(),
        "services document resolved"
    );
    Ok(configuration)
}

fn resolve_service(
    id: &str,
    service: ServiceDocument,
    directory: &dyn TypeDirectory,
) -> Result<Definition> {
    let mut definition = match (service.class, service.factory) {
        (Some(_), Some(_)) => {
            return Err(Error::invalid_definition(format!(
                "Service `{id}`: class and factory are mutually exclusive"
            )));
        }
        (None, Some(factory)) => Definition::factory(resolve_factory(id, factory, directory)?),
        (class, None) => {
            let class = class.unwrap_or_else(|| id.to_owned());
            Definition::class(directory.locate(&class)?)
        }
    };

    definition.arguments = service
        .arguments
        .into_iter()
        .map(|(name, value)| (name, resolve_argument(value)))
        .collect();
    definition.calls = service
        .calls
        .into_iter()
        .map(|call| Call {
            method: call.method,
            positional: call.arguments.into_iter().map(resolve_argument).collect(),
            named: call
                .named
                .into_iter()
                .map(|(name, value)| (name, resolve_argument(value)))
                .collect(),
        })
        .collect();
    definition.public = service.public;
    definition.shared = service.shared;
    definition.tags = service
        .tags
        .into_iter()
        .map(|tag| resolve_tag(id, tag))
        .collect::<Result<_>>()?;
    Ok(definition)
}

/// Scalar document value to argument; `@id` strings become references
pub fn resolve_argument(value: Json) -> Argument {
    match value {
        Json::String(text) => resolve_string(text),
        Json::Array(values) => Argument::List(values.into_iter().map(resolve_argument).collect()),
        Json::Object(values) => Argument::Map(
            values
                .into_iter()
                .map(|(key, value)| (key, resolve_argument(value)))
                .collect(),
        ),
        other => Argument::Value(Value::from(other)),
    }
}

fn resolve_string(text: String) -> Argument {
    if ESCAPED_REFERENCE_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
    {
        return Argument::Value(Value::String(text[1..].to_owned()));
    }
    match text.strip_prefix(REFERENCE_PREFIX) {
        Some(id) => Argument::Reference(Reference::new(id)),
        None => Argument::Value(Value::String(text)),
    }
}

fn resolve_factory(id: &str, factory: Json, directory: &dyn TypeDirectory) -> Result<Factory> {
    match factory {
        Json::String(text) => {
            if let Some(target) = text.strip_prefix(REFERENCE_PREFIX) {
                return Ok(match target.split_once(FUNCTION_SEPARATOR) {
                    Some((service, method)) => {
                        Factory::Callable(Callable::service_method(service, method))
                    }
                    None => Factory::Reference(Reference::new(target)),
                });
            }
            let Some((type_name, function)) = text.split_once(FUNCTION_SEPARATOR) else {
                return Err(invalid_factory(id));
            };
            let holder = Holder::Type(directory.locate(type_name)?);
            Ok(Factory::Callable(Callable::new(holder, function)))
        }
        Json::Array(parts) => match parts.as_slice() {
            [Json::String(holder), Json::String(method)] => {
                let holder = match holder.strip_prefix(REFERENCE_PREFIX) {
                    Some(service) => Holder::Reference(Reference::new(service)),
                    None => Holder::Type(directory.locate(holder)?),
                };
                Ok(Factory::Callable(Callable::new(holder, method.clone())))
            }
            _ => Err(invalid_factory(id)),
        },
        _ => Err(invalid_factory(id)),
    }
}

fn invalid_factory(id: &str) -> Error {
    Error::invalid_definition(format!(
        "Service `{id}`: factory must be `@service`, `@service::method`, `Type::function` or [holder, method]"
    ))
}

fn resolve_tag(id: &str, tag: Json) -> Result<Tag> {
    match tag {
        Json::String(name) => Ok(Tag::new(name)),
        Json::Object(mut attributes) => {
            let Some(Json::String(name)) = attributes.remove("name") else {
                return Err(Error::invalid_definition(format!(
                    "Service `{id}`: tag tables need a string `name`"
                )));
            };
            Ok(Tag {
                name,
                attributes: attributes
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            })
        }
        _ => Err(Error::invalid_definition(format!(
            "Service `{id}`: a tag is either a name or a table"
        ))),
    }
}
