use super::value::{ParameterValue, ValueKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SchemaError {
    #[error("Parameter '{0}' is declared more than once")]
    DuplicateParameter(String),

    #[error("Default for parameter '{name}' is a {found}, but the parameter is declared as {expected}")]
    DefaultKindMismatch {
        name: String,
        expected: ValueKind,
        found: String,
    },
}

/// Declaration of a single configurable parameter of a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub name: String,
    pub kind: ValueKind,
    pub help: String,
    pub default: Option<ParameterValue>,
    pub required: bool,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            help: String::new(),
            default: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    /// The value this parameter takes when nothing overrides it and requiredness is relaxed.
    pub fn relaxed_value(&self) -> ParameterValue {
        self.default.clone().unwrap_or(ParameterValue::Unset)
    }
}

/// The ordered parameter declarations of one phase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSchema {
    name: String,
    params: Vec<ParameterDecl>,
}

impl ParameterSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Builder form of [`ParameterSchema::declare`].
    pub fn with(mut self, decl: ParameterDecl) -> Result<Self, SchemaError> {
        self.declare(decl)?;
        Ok(self)
    }

    pub fn declare(&mut self, decl: ParameterDecl) -> Result<(), SchemaError> {
        if self.contains(&decl.name) {
            return Err(SchemaError::DuplicateParameter(decl.name));
        }
        if let Some(found) = mismatched_default(&decl) {
            return Err(SchemaError::DefaultKindMismatch {
                name: decl.name,
                expected: decl.kind,
                found,
            });
        }
        self.params.push(decl);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDecl> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDecl> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn mismatched_default(decl: &ParameterDecl) -> Option<String> {
    let default = decl.default.as_ref()?;
    if default.clone().coerce_to(decl.kind).is_some() {
        return None;
    }
    Some(
        default
            .kind()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "unset value".to_string()),
    )
}

impl<'a> IntoIterator for &'a ParameterSchema {
    type Item = &'a ParameterDecl;
    type IntoIter = std::slice::Iter<'a, ParameterDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neb_schema() -> ParameterSchema {
        ParameterSchema::new("run_neb")
            .with(ParameterDecl::new("input_path", ValueKind::Path).required())
            .unwrap()
            .with(ParameterDecl::new("max_workers", ValueKind::Integer).default_value(1i64))
            .unwrap()
            .with(ParameterDecl::new("fmax", ValueKind::Float).default_value(0.05))
            .unwrap()
    }

    #[test]
    fn declarations_keep_their_order() {
        let schema = neb_schema();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["input_path", "max_workers", "fmax"]);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.name(), "run_neb");
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let result = neb_schema().with(ParameterDecl::new("fmax", ValueKind::Float));
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateParameter("fmax".to_string())
        );
    }

    #[test]
    fn default_of_wrong_kind_is_rejected() {
        let result = ParameterSchema::new("bad")
            .with(ParameterDecl::new("max_workers", ValueKind::Integer).default_value("four"));
        assert!(matches!(
            result,
            Err(SchemaError::DefaultKindMismatch { ref name, .. }) if name == "max_workers"
        ));
    }

    #[test]
    fn relaxed_value_falls_back_to_unset() {
        let schema = neb_schema();
        assert_eq!(
            schema.get("input_path").unwrap().relaxed_value(),
            ParameterValue::Unset
        );
        assert_eq!(
            schema.get("max_workers").unwrap().relaxed_value(),
            ParameterValue::Integer(1)
        );
    }

    #[test]
    fn cloned_schemas_are_independent() {
        let first = neb_schema();
        let mut second = first.clone();
        second
            .declare(ParameterDecl::new("climb", ValueKind::Bool))
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 4);
    }
}
