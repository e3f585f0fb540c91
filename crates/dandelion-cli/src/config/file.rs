use crate::error::{CliError, Result};
use dandelion::core::schema::ParameterDecl;
use dandelion::core::value::{ParameterValue, ValueKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub pause_seconds: Option<f64>,
    pub strict: Option<bool>,
    #[serde(default)]
    pub stages: BTreeMap<String, FileStageConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStageConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: Vec<FileParameter>,
    #[serde(default)]
    pub values: BTreeMap<String, ParameterValue>,
}

/// A parameter a stage's program accepts beyond the ones the pipeline wires.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileParameter {
    pub name: String,
    pub kind: ValueKind,
    pub default: Option<ParameterValue>,
    #[serde(default)]
    pub required: bool,
    pub help: Option<String>,
}

impl From<FileParameter> for ParameterDecl {
    fn from(p: FileParameter) -> Self {
        let mut decl = ParameterDecl::new(p.name, p.kind);
        if let Some(default) = p.default {
            decl = decl.default_value(default);
        }
        if p.required {
            decl = decl.required();
        }
        if let Some(help) = p.help {
            decl = decl.help(help);
        }
        decl
    }
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading pipeline configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
