use crate::error::{CliError, Result};
use dandelion::core::schema::ParameterSchema;
use dandelion::engine::config::Resolver;
use dandelion::engine::phase::Phase;
use dandelion::engine::sequencer::Sequencer;
use dandelion::workflows::command::CommandPhase;
use dandelion::workflows::sample::{self, SamplePhases, SampleRequest, StageOverrides};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// How one stage's external program is invoked.
#[derive(Debug, Clone)]
pub struct StageCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub schema: ParameterSchema,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub request: SampleRequest,
    pub commands: BTreeMap<String, StageCommand>,
    pub overrides: StageOverrides,
    pub resolver: Resolver,
    pub pause: Duration,
}

impl AppConfig {
    pub fn sequencer(&self) -> Sequencer {
        Sequencer::new(self.resolver).with_pause(self.pause)
    }

    pub fn command_phase(&self, stage: &str) -> Result<CommandPhase> {
        let cmd = self.commands.get(stage).ok_or_else(|| {
            CliError::Config(format!("No program configured for stage '{}'", stage))
        })?;
        Ok(CommandPhase::new(&cmd.program, cmd.schema.clone())
            .with_args(cmd.args.clone())
            .with_required_input(sample::INPUT_PATH))
    }

    pub fn phases(&self) -> Result<SamplePhases> {
        let phase =
            |key: &str| -> Result<Box<dyn Phase>> { Ok(Box::new(self.command_phase(key)?)) };
        Ok(SamplePhases {
            create_gsm: phase(sample::CREATE_GSM)?,
            run_gsm: phase(sample::RUN_GSM)?,
            filter_gsm: phase(sample::FILTER_GSM)?,
            run_neb: phase(sample::RUN_NEB)?,
            filter_neb: phase(sample::FILTER_NEB)?,
            compile_neb: phase(sample::COMPILE_NEB)?,
        })
    }
}
