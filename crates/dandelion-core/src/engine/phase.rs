use super::config::EffectiveConfiguration;
use super::error::PhaseError;
use super::progress::ProgressReporter;
use crate::core::schema::ParameterSchema;

/// An externally implemented processing stage.
///
/// `schema` must return a fresh schema on every call; the sequencer asks for it
/// once per invocation and never hands it back.
pub trait Phase: Send + Sync {
    fn schema(&self) -> ParameterSchema;

    fn run(
        &self,
        config: EffectiveConfiguration,
        reporter: &ProgressReporter,
    ) -> Result<(), PhaseError>;
}

/// Adapts a schema closure and an entry-point closure into a [`Phase`].
pub struct FnPhase<S, R> {
    schema: S,
    run: R,
}

impl<S, R> FnPhase<S, R>
where
    S: Fn() -> ParameterSchema + Send + Sync,
    R: Fn(EffectiveConfiguration) -> Result<(), PhaseError> + Send + Sync,
{
    pub fn new(schema: S, run: R) -> Self {
        Self { schema, run }
    }
}

impl<S, R> Phase for FnPhase<S, R>
where
    S: Fn() -> ParameterSchema + Send + Sync,
    R: Fn(EffectiveConfiguration) -> Result<(), PhaseError> + Send + Sync,
{
    fn schema(&self) -> ParameterSchema {
        (self.schema)()
    }

    fn run(
        &self,
        config: EffectiveConfiguration,
        _reporter: &ProgressReporter,
    ) -> Result<(), PhaseError> {
        (self.run)(config)
    }
}
