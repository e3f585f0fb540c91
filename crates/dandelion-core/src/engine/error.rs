use super::config::ConfigError;
use super::registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a phase's entry point.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    ExitStatus { program: String, status: String },

    #[error("Required input is missing: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to resolve configuration for phase '{phase}': {source}")]
    SchemaResolution {
        phase: String,
        #[source]
        source: ConfigError,
    },

    #[error("Phase '{phase}' failed: {source}")]
    PhaseExecution {
        phase: String,
        #[source]
        source: PhaseError,
    },

    #[error("Cannot prepare output directory '{}': {source}", path.display())]
    Environment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid phase registry: {0}")]
    Registry(#[from] RegistryError),
}

impl EngineError {
    /// Title of the phase the error belongs to, if any.
    pub fn phase(&self) -> Option<&str> {
        match self {
            EngineError::SchemaResolution { phase, .. }
            | EngineError::PhaseExecution { phase, .. } => Some(phase),
            _ => None,
        }
    }
}
