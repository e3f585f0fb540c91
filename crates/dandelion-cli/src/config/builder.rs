use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileStageConfig};
use super::models::{AppConfig, StageCommand};
use crate::cli::PipelineArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use dandelion::core::overrides::OverrideSet;
use dandelion::core::schema::ParameterSchema;
use dandelion::core::value::ParameterValue;
use dandelion::engine::config::Resolver;
use dandelion::workflows::sample::{self, SampleRequest, StageOverrides};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Layers built-in defaults, the optional pipeline file and the command line.
pub fn build_config(args: &PipelineArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    if let Some(unknown) = file_config
        .stages
        .keys()
        .find(|k| sample::base_schema(k).is_none())
    {
        return Err(CliError::Config(format!(
            "Config file names unknown stage '{}'",
            unknown
        )));
    }

    let max_workers = match u32::try_from(args.max_workers) {
        Ok(0) => {
            return Err(CliError::Argument(
                "--max-workers must be at least 1".to_string(),
            ));
        }
        Ok(n) => n,
        Err(_) => {
            return Err(CliError::Argument(format!(
                "--max-workers must be at most {}, got {}",
                u32::MAX,
                args.max_workers
            )));
        }
    };

    let strict = args.strict || file_config.strict.unwrap_or(defaults.strict);
    let pause = resolve_pause(args.pause.or(file_config.pause_seconds), &defaults)?;

    let mut commands = BTreeMap::new();
    let mut overrides = StageOverrides::new();
    for (key, _) in sample::STAGES {
        let stage_file = file_config.stages.remove(key).unwrap_or_default();
        let (command, values) = build_stage(key, stage_file, &defaults)?;
        commands.insert(key.to_string(), command);
        if !values.is_empty() {
            overrides.insert(key.to_string(), values);
        }
    }

    apply_set_values(&mut overrides, &commands, &args.set_values, strict)?;
    debug!(?overrides, strict, "Stage overrides assembled.");

    let resolver = if strict {
        Resolver::strict()
    } else {
        Resolver::new()
    };

    Ok(AppConfig {
        request: SampleRequest {
            input_path: args.input_path.clone(),
            output_path: args.output_path.clone(),
            max_workers,
        },
        commands,
        overrides,
        resolver,
        pause,
    })
}

fn resolve_pause(seconds: Option<f64>, defaults: &DefaultsConfig) -> Result<Duration> {
    let seconds = seconds.unwrap_or(defaults.pause_seconds);
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        CliError::Argument(format!(
            "Pause must be a non-negative number of seconds, got {}",
            seconds
        ))
    })
}

fn build_stage(
    key: &str,
    file: FileStageConfig,
    defaults: &DefaultsConfig,
) -> Result<(StageCommand, OverrideSet)> {
    let mut schema = sample::base_schema(key).unwrap_or_else(|| ParameterSchema::new(key));
    for param in file.parameters {
        schema
            .declare(param.into())
            .map_err(|e| CliError::Config(format!("Stage '{}': {}", key, e)))?;
    }

    let values: OverrideSet = file.values.into_iter().collect();

    let command = StageCommand {
        program: PathBuf::from(
            file.program.unwrap_or_else(|| defaults.program_for(key)),
        ),
        args: file.args.unwrap_or_default(),
        schema,
    };
    Ok((command, values))
}

fn apply_set_values(
    overrides: &mut StageOverrides,
    commands: &BTreeMap<String, StageCommand>,
    set_values: &[String],
    strict: bool,
) -> Result<()> {
    for text in set_values {
        let set =
            parser::parse_set_value(text).map_err(|e| CliError::Argument(e.to_string()))?;

        let command = commands.get(&set.stage).ok_or_else(|| {
            CliError::Config(format!("Unsupported stage for --set: '{}'", set.stage))
        })?;

        let value = match command.schema.get(&set.param) {
            Some(decl) => ParameterValue::parse(decl.kind, &set.value).map_err(|e| {
                CliError::Config(format!(
                    "Invalid value for {}.{}: {}",
                    set.stage, set.param, e
                ))
            })?,
            None if strict => {
                return Err(CliError::Config(format!(
                    "Stage '{}' declares no parameter '{}'",
                    set.stage, set.param
                )));
            }
            None => ParameterValue::String(set.value.clone()),
        };

        overrides
            .entry(set.stage.clone())
            .or_default()
            .insert(set.param.clone(), value);
    }
    Ok(())
}
