use crate::core::schema::ParameterSchema;
use crate::core::value::ParameterValue;
use crate::engine::config::EffectiveConfiguration;
use crate::engine::error::PhaseError;
use crate::engine::phase::Phase;
use crate::engine::progress::{Progress, ProgressReporter};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A phase implemented by an external program.
///
/// The effective configuration is passed as `--name value` arguments in schema
/// order. Boolean parameters become a bare `--name` flag when true and unset
/// parameters are left out. The program inherits the caller's stdio.
#[derive(Debug, Clone)]
pub struct CommandPhase {
    program: PathBuf,
    args: Vec<String>,
    schema: ParameterSchema,
    required_inputs: Vec<String>,
}

impl CommandPhase {
    pub fn new(program: impl Into<PathBuf>, schema: ParameterSchema) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            schema,
            required_inputs: Vec::new(),
        }
    }

    /// Arguments placed before the rendered parameters (e.g. a subcommand).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Path parameter that must name an existing file or directory before the
    /// program is launched.
    pub fn with_required_input(mut self, param: impl Into<String>) -> Self {
        self.required_inputs.push(param.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self, config: &EffectiveConfiguration) -> Vec<OsString> {
        let mut out: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        for (name, value) in config.iter() {
            let flag = OsString::from(format!("--{}", name));
            match value {
                ParameterValue::Unset | ParameterValue::Bool(false) => {}
                ParameterValue::Bool(true) => out.push(flag),
                ParameterValue::Path(path) => {
                    out.push(flag);
                    out.push(path.as_os_str().to_os_string());
                }
                other => {
                    out.push(flag);
                    out.push(OsString::from(other.to_string()));
                }
            }
        }
        out
    }
}

impl Phase for CommandPhase {
    fn schema(&self) -> ParameterSchema {
        self.schema.clone()
    }

    fn run(
        &self,
        config: EffectiveConfiguration,
        reporter: &ProgressReporter,
    ) -> Result<(), PhaseError> {
        for param in &self.required_inputs {
            if let Some(path) = config.path(param).filter(|p| !p.exists()) {
                return Err(PhaseError::MissingInput {
                    path: path.to_path_buf(),
                });
            }
        }

        let program = self.program.display().to_string();
        let args = self.arguments(&config);
        debug!(program = program.as_str(), ?args, "Launching external phase.");
        reporter.report(Progress::Message(format!("Running {}", program)));

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| PhaseError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PhaseError::ExitStatus {
                program,
                status: status.to_string(),
            });
        }
        info!(program = program.as_str(), "External phase exited successfully.");
        Ok(())
    }
}
