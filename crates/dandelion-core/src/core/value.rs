use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValueParseError {
    #[error("Cannot parse '{text}' as {kind}")]
    Invalid { kind: ValueKind, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Bool,
    Path,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Path => "path",
        };
        f.write_str(name)
    }
}

/// A single parameter value as handed to a phase.
///
/// `Unset` is the empty value of an optional parameter that declares no default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    #[serde(skip_deserializing)]
    Path(PathBuf),
    #[serde(skip_deserializing)]
    Unset,
}

impl ParameterValue {
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            ParameterValue::String(_) => Some(ValueKind::String),
            ParameterValue::Integer(_) => Some(ValueKind::Integer),
            ParameterValue::Float(_) => Some(ValueKind::Float),
            ParameterValue::Bool(_) => Some(ValueKind::Bool),
            ParameterValue::Path(_) => Some(ValueKind::Path),
            ParameterValue::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ParameterValue::Unset)
    }

    /// Parses command-line text into a value of the requested kind.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, ValueParseError> {
        let invalid = || ValueParseError::Invalid {
            kind,
            text: text.to_string(),
        };
        match kind {
            ValueKind::String => Ok(ParameterValue::String(text.to_string())),
            ValueKind::Path => Ok(ParameterValue::Path(PathBuf::from(text))),
            ValueKind::Integer => text
                .trim()
                .parse()
                .map(ParameterValue::Integer)
                .map_err(|_| invalid()),
            ValueKind::Float => text
                .trim()
                .parse()
                .map(ParameterValue::Float)
                .map_err(|_| invalid()),
            ValueKind::Bool => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(ParameterValue::Bool(true)),
                "false" | "no" | "0" | "off" => Ok(ParameterValue::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }

    /// Converts the value to the declared kind, if the two are compatible.
    ///
    /// Integers widen to floats and strings are accepted where a path is declared
    /// (file-based overrides carry paths as plain TOML strings).
    pub fn coerce_to(self, kind: ValueKind) -> Option<Self> {
        match (self, kind) {
            (ParameterValue::Unset, _) => Some(ParameterValue::Unset),
            (ParameterValue::Integer(i), ValueKind::Float) => Some(ParameterValue::Float(i as f64)),
            (ParameterValue::String(s), ValueKind::Path) => Some(ParameterValue::Path(s.into())),
            (value, kind) if value.kind() == Some(kind) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(f) => Some(*f),
            ParameterValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ParameterValue::Path(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::String(s) => f.write_str(s),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Path(p) => write!(f, "{}", p.display()),
            ParameterValue::Unset => f.write_str("<unset>"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        ParameterValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<PathBuf> for ParameterValue {
    fn from(value: PathBuf) -> Self {
        ParameterValue::Path(value)
    }
}

impl From<&Path> for ParameterValue {
    fn from(value: &Path) -> Self {
        ParameterValue::Path(value.to_path_buf())
    }
}
