//! Parameter interpolation
//!
//! Expands `%name%` placeholders inside string parameters and string
//! arguments of every definition. A parameter's own value is interpolated
//! before it is substituted, so chains such as `%url%` → `http://%host%`
//! resolve fully. `%%` is never a placeholder boundary.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use dinject_domain::error::{Error, Result};
use dinject_domain::{Argument, Call, Configuration, Definition, Value};
use regex::Regex;
use tracing::debug;

use crate::constants::PLACEHOLDER_PATTERN;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("Invalid regex"));

/// Interpolates parameters into a configuration
///
/// Running the processor over its own output is a no-op: once expanded, no
/// placeholder is left to match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationProcessor;

impl ConfigurationProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Return a copy of `configuration` with every placeholder expanded
    ///
    /// Fails on the first missing parameter, circular parameter chain or
    /// placeholder naming a non-string parameter.
    pub fn process(&self, configuration: Configuration) -> Result<Configuration> {
        let Configuration {
            parameters,
            definitions,
            aliases,
        } = configuration;

        let mut interpolator = Interpolator::new(&parameters);
        let mut processed_parameters = BTreeMap::new();
        for (name, value) in &parameters {
            let value = match value {
                Value::String(_) => Value::String(interpolator.parameter(name)?),
                other => interpolator.value(other)?,
            };
            processed_parameters.insert(name.clone(), value);
        }

        let mut processed_definitions = BTreeMap::new();
        for (id, definition) in &definitions {
            processed_definitions.insert(id.clone(), interpolator.definition(definition)?);
        }

        debug!(
            parameters = processed_parameters.len(),
            definitions = processed_definitions.len(),
            "parameters interpolated"
        );
        Ok(Configuration {
            parameters: processed_parameters,
            definitions: processed_definitions,
            aliases,
        })
    }
}

struct Interpolator<'a> {
    parameters: &'a BTreeMap<String, Value>,
    resolved: HashMap<String, String>,
    loading: Vec<String>,
    definitions: HashMap<*const Definition, Arc<Definition>>,
}

impl<'a> Interpolator<'a> {
    fn new(parameters: &'a BTreeMap<String, Value>) -> Self {
        Self {
            parameters,
            resolved: HashMap::new(),
            loading: Vec::new(),
            definitions: HashMap::new(),
        }
    }

    /// Fully interpolated value of a string parameter
    fn parameter(&mut self, name: &str) -> Result<String> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if self.loading.iter().any(|loading| loading == name) {
            let mut chain = self.loading.clone();
            chain.push(name.to_owned());
            return Err(Error::ParameterCircularReference { chain });
        }
        let raw = match self.parameters.get(name) {
            Some(Value::String(raw)) => raw,
            Some(_) => {
                return Err(Error::ParameterNotString {
                    name: name.to_owned(),
                });
            }
            None => {
                return Err(Error::ParameterNotFound {
                    name: name.to_owned(),
                });
            }
        };

        self.loading.push(name.to_owned());
        let interpolated = self.interpolate(raw);
        self.loading.pop();

        let interpolated = interpolated?;
        self.resolved.insert(name.to_owned(), interpolated.clone());
        Ok(interpolated)
    }

    fn interpolate(&mut self, text: &str) -> Result<String> {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(2)) else {
                continue;
            };
            // keep everything up to the opening delimiter, including the
            // character the pattern consumed in front of it
            output.push_str(&text[last..name.start() - 1]);
            output.push_str(&self.parameter(name.as_str())?);
            last = whole.end();
        }
        output.push_str(&text[last..]);
        Ok(output)
    }

    fn value(&mut self, value: &Value) -> Result<Value> {
        Ok(match value {
            Value::String(text) => Value::String(self.interpolate(text)?),
            Value::List(values) => Value::List(
                values
                    .iter()
                    .map(|value| self.value(value))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(values) => Value::Map(
                values
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.value(value)?)))
                    .collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }

    fn argument(&mut self, argument: &Argument) -> Result<Argument> {
        Ok(match argument {
            Argument::Value(value) => Argument::Value(self.value(value)?),
            Argument::Definition(definition) => Argument::Definition(self.definition(definition)?),
            Argument::List(arguments) => Argument::List(
                arguments
                    .iter()
                    .map(|argument| self.argument(argument))
                    .collect::<Result<_>>()?,
            ),
            Argument::Map(arguments) => Argument::Map(self.arguments(arguments)?),
            Argument::Reference(_) | Argument::Callable(_) => argument.clone(),
        })
    }

    fn arguments(
        &mut self,
        arguments: &BTreeMap<String, Argument>,
    ) -> Result<BTreeMap<String, Argument>> {
        arguments
            .iter()
            .map(|(name, argument)| Ok((name.clone(), self.argument(argument)?)))
            .collect()
    }

    /// Processed copy of a definition; the same inline definition maps to the same copy
    fn definition(&mut self, definition: &Arc<Definition>) -> Result<Arc<Definition>> {
        let key = Arc::as_ptr(definition);
        if let Some(processed) = self.definitions.get(&key) {
            return Ok(Arc::clone(processed));
        }

        let mut processed = Definition::clone(definition);
        processed.arguments = self.arguments(&definition.arguments)?;
        processed.calls = definition
            .calls
            .iter()
            .map(|call| {
                Ok(Call {
                    method: call.method.clone(),
                    positional: call
                        .positional
                        .iter()
                        .map(|argument| self.argument(argument))
                        .collect::<Result<_>>()?,
                    named: self.arguments(&call.named)?,
                })
            })
            .collect::<Result<_>>()?;

        let processed = Arc::new(processed);
        self.definitions.insert(key, Arc::clone(&processed));
        Ok(processed)
    }
}
