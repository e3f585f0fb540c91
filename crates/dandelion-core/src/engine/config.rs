use crate::core::overrides::OverrideSet;
use crate::core::schema::ParameterSchema;
use crate::core::value::{ParameterValue, ValueKind};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter '{name}' for '{schema}'")]
    MissingParameter { schema: String, name: String },

    #[error("Unknown parameter '{name}' for '{schema}'")]
    UnknownParameter { schema: String, name: String },

    #[error("Parameter '{name}' for '{schema}' expects a {expected}, got '{value}'")]
    KindMismatch {
        schema: String,
        name: String,
        expected: ValueKind,
        value: String,
    },
}

/// What to do with override keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeyPolicy {
    /// Drop the key and log a warning.
    #[default]
    Ignore,
    Reject,
}

/// The fully resolved parameter set handed to one phase invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfiguration {
    schema: String,
    entries: Vec<(String, ParameterValue)>,
    index: HashMap<String, usize>,
}

impl EffectiveConfiguration {
    fn from_entries(schema: &str, entries: Vec<(String, ParameterValue)>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            schema: schema.to_string(),
            entries,
            index,
        }
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParameterValue::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_integer)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_float)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParameterValue::as_bool)
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(ParameterValue::as_path)
    }

    /// Entries in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    unknown_keys: UnknownKeyPolicy,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self::with_policy(UnknownKeyPolicy::Reject)
    }

    pub fn with_policy(unknown_keys: UnknownKeyPolicy) -> Self {
        Self { unknown_keys }
    }

    pub fn policy(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }

    /// Resolves the effective configuration for one phase invocation.
    ///
    /// Every parameter first takes its relaxed value (declared default, or `Unset`),
    /// overrides are laid over it, and only then is requiredness checked against
    /// the combined result. A required parameter is satisfied by a default or by
    /// an override, never by the relaxed empty value.
    pub fn resolve(
        &self,
        schema: &ParameterSchema,
        overrides: &OverrideSet,
    ) -> Result<EffectiveConfiguration, ConfigError> {
        for key in overrides.keys() {
            if schema.contains(key) {
                continue;
            }
            match self.unknown_keys {
                UnknownKeyPolicy::Ignore => {
                    warn!(
                        schema = schema.name(),
                        parameter = key,
                        "Ignoring override for undeclared parameter."
                    );
                }
                UnknownKeyPolicy::Reject => {
                    return Err(ConfigError::UnknownParameter {
                        schema: schema.name().to_string(),
                        name: key.to_string(),
                    });
                }
            }
        }

        let mut entries = Vec::with_capacity(schema.len());
        for decl in schema {
            let (value, overridden) = match overrides.get(&decl.name) {
                Some(value) => (value.clone(), true),
                None => (decl.relaxed_value(), false),
            };

            if decl.required && value.is_unset() {
                return Err(ConfigError::MissingParameter {
                    schema: schema.name().to_string(),
                    name: decl.name.clone(),
                });
            }

            let rendered = value.to_string();
            let value = value
                .coerce_to(decl.kind)
                .ok_or_else(|| ConfigError::KindMismatch {
                    schema: schema.name().to_string(),
                    name: decl.name.clone(),
                    expected: decl.kind,
                    value: rendered,
                })?;

            debug!(
                schema = schema.name(),
                parameter = decl.name.as_str(),
                value = %value,
                overridden,
                "Resolved parameter."
            );
            entries.push((decl.name.clone(), value));
        }

        Ok(EffectiveConfiguration::from_entries(schema.name(), entries))
    }
}

/// Resolves with the default [`Resolver`].
pub fn resolve(
    schema: &ParameterSchema,
    overrides: &OverrideSet,
) -> Result<EffectiveConfiguration, ConfigError> {
    Resolver::default().resolve(schema, overrides)
}
