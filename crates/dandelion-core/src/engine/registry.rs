use super::phase::Phase;
use crate::core::layout::{Location, OutputLayout};
use crate::core::overrides::OverrideSet;
use crate::core::value::ParameterValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegistryError {
    #[error("Stage '{0}' is registered more than once")]
    DuplicateStage(String),

    #[error("Stage '{stage}' reads from unknown stage '{source_stage}'")]
    UnknownStage { stage: String, source_stage: String },

    #[error("Stage '{stage}' reads from '{source_stage}', which runs after it")]
    ForwardReference { stage: String, source_stage: String },

    #[error("Stage '{stage}' reads from '{source_stage}', which declares no output location")]
    NoDeclaredOutput { stage: String, source_stage: String },

    #[error("Parameter '{param}' of stage '{stage}' is supplied by the pipeline and cannot be overridden")]
    WiredParameter { stage: String, param: String },

    #[error("Overrides given for unknown stage '{0}'")]
    UnknownOverrideTarget(String),
}

/// One entry of the phase registry: a phase bound to its title and overrides.
pub struct PhaseDescriptor {
    key: String,
    title: String,
    phase: Box<dyn Phase>,
    overrides: OverrideSet,
    output: Option<PathBuf>,
}

impl PhaseDescriptor {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        phase: Box<dyn Phase>,
        overrides: OverrideSet,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            phase,
            overrides,
            output: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phase(&self) -> &dyn Phase {
        self.phase.as_ref()
    }

    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    /// The location this phase produces, when it declares one.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

impl fmt::Debug for PhaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseDescriptor")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("overrides", &self.overrides)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// The static, ordered list of phases making up one pipeline run.
#[derive(Debug, Default)]
pub struct PhaseRegistry {
    descriptors: Vec<PhaseDescriptor>,
}

impl PhaseRegistry {
    pub fn from_descriptors(descriptors: Vec<PhaseDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.key.as_str()) {
                return Err(RegistryError::DuplicateStage(descriptor.key.clone()));
            }
        }
        Ok(Self { descriptors })
    }

    pub fn get(&self, key: &str) -> Option<&PhaseDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseDescriptor> {
        self.descriptors.iter()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.title.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[derive(Debug, Clone)]
struct InputRef {
    param: String,
    source: String,
    file: Option<PathBuf>,
}

/// A phase as declared to the [`RegistryBuilder`], before its locations are resolved.
pub struct Stage {
    key: String,
    title: String,
    phase: Box<dyn Phase>,
    fixed: OverrideSet,
    extra: OverrideSet,
    output: Option<(String, Location)>,
    inputs: Vec<InputRef>,
}

impl Stage {
    pub fn new(key: impl Into<String>, title: impl Into<String>, phase: Box<dyn Phase>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            phase,
            fixed: OverrideSet::new(),
            extra: OverrideSet::new(),
            output: None,
            inputs: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> &dyn Phase {
        self.phase.as_ref()
    }

    /// Supplies a pipeline-owned value for `param`.
    pub fn set(mut self, param: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.fixed.insert(param, value);
        self
    }

    /// Declares the location this stage writes, passed to it through `param`.
    pub fn output(mut self, param: impl Into<String>, location: Location) -> Self {
        self.output = Some((param.into(), location));
        self
    }

    /// Passes the declared output of an earlier stage through `param`.
    pub fn input_from(mut self, param: impl Into<String>, source: impl Into<String>) -> Self {
        self.inputs.push(InputRef {
            param: param.into(),
            source: source.into(),
            file: None,
        });
        self
    }

    /// Passes a named file inside the declared output of an earlier stage through `param`.
    pub fn input_from_file(
        mut self,
        param: impl Into<String>,
        source: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        self.inputs.push(InputRef {
            param: param.into(),
            source: source.into(),
            file: Some(file.into()),
        });
        self
    }

    /// User-supplied values; these may not touch anything the pipeline wires itself.
    pub fn extend(mut self, extra: OverrideSet) -> Self {
        self.extra = self.extra.merge(extra);
        self
    }

    fn is_wired(&self, param: &str) -> bool {
        self.fixed.contains(param)
            || self.inputs.iter().any(|i| i.param == param)
            || self.output.as_ref().is_some_and(|(p, _)| p == param)
    }
}

/// Assembles a [`PhaseRegistry`], resolving every symbolic input against the
/// output declared by the stage it names.
pub struct RegistryBuilder {
    layout: OutputLayout,
    stages: Vec<Stage>,
}

impl RegistryBuilder {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> Result<PhaseRegistry, RegistryError> {
        let all_keys: HashSet<String> = self.stages.iter().map(|s| s.key.clone()).collect();
        let mut outputs: HashMap<String, Option<PathBuf>> = HashMap::new();
        let mut descriptors = Vec::with_capacity(self.stages.len());

        for stage in self.stages {
            if outputs.contains_key(&stage.key) {
                return Err(RegistryError::DuplicateStage(stage.key));
            }

            if let Some(param) = stage.extra.keys().find(|k| stage.is_wired(k)) {
                return Err(RegistryError::WiredParameter {
                    stage: stage.key.clone(),
                    param: param.to_string(),
                });
            }

            let mut overrides = stage.extra.clone().merge(stage.fixed.clone());

            for input in &stage.inputs {
                let source_output = match outputs.get(&input.source) {
                    Some(Some(path)) => path,
                    Some(None) => {
                        return Err(RegistryError::NoDeclaredOutput {
                            stage: stage.key.clone(),
                            source_stage: input.source.clone(),
                        });
                    }
                    None if all_keys.contains(&input.source) => {
                        return Err(RegistryError::ForwardReference {
                            stage: stage.key.clone(),
                            source_stage: input.source.clone(),
                        });
                    }
                    None => {
                        return Err(RegistryError::UnknownStage {
                            stage: stage.key.clone(),
                            source_stage: input.source.clone(),
                        });
                    }
                };
                let path = match &input.file {
                    Some(file) => source_output.join(file),
                    None => source_output.clone(),
                };
                overrides.insert(input.param.clone(), path);
            }

            let output = stage.output.as_ref().map(|(param, location)| {
                let path = self.layout.resolve(location);
                overrides.insert(param.clone(), path.clone());
                path
            });

            debug!(stage = stage.key.as_str(), ?overrides, "Registered stage.");
            outputs.insert(stage.key.clone(), output.clone());
            descriptors.push(PhaseDescriptor {
                key: stage.key,
                title: stage.title,
                phase: stage.phase,
                overrides,
                output,
            });
        }

        Ok(PhaseRegistry { descriptors })
    }
}
