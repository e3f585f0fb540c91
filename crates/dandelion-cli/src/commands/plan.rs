use crate::cli::PipelineArgs;
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use dandelion::engine::error::EngineError;
use dandelion::engine::sequencer::PlannedPhase;
use dandelion::workflows::sample;
use std::fmt::Write;
use tracing::info;

pub fn run(args: PipelineArgs) -> Result<()> {
    let config = build_config(&args)?;
    let registry = sample::build_registry(
        &config.request,
        config.phases()?,
        config.overrides.clone(),
    )
    .map_err(EngineError::from)?;

    info!("Resolving {} stages without running them.", registry.len());
    let planned = config.sequencer().plan(&registry)?;
    print!("{}", render_plan(&planned, &config)?);
    Ok(())
}

/// Lists each stage's effective parameters and the command it would run.
pub fn render_plan(planned: &[PlannedPhase], config: &AppConfig) -> Result<String> {
    let mut out = String::new();
    for phase in planned {
        let command = config.command_phase(&phase.key)?;
        let mut line = vec![command.program().display().to_string()];
        line.extend(
            command
                .arguments(&phase.config)
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} [{}]", phase.title, phase.key);
        for (name, value) in phase.config.iter() {
            let _ = writeln!(out, "    {} = {}", name, value);
        }
        let _ = writeln!(out, "    $ {}", line.join(" "));
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn plan_for(extra: &[&str]) -> String {
        let mut argv = vec!["dandelion", "plan", "-i", "in", "-o", "out", "-n", "8"];
        argv.extend_from_slice(extra);
        let Commands::Plan(args) = Cli::parse_from(argv).command else {
            panic!("Expected 'plan' subcommand");
        };
        let config = build_config(&args).unwrap();
        let registry = sample::build_registry(
            &config.request,
            config.phases().unwrap(),
            config.overrides.clone(),
        )
        .unwrap();
        let planned = config.sequencer().plan(&registry).unwrap();
        render_plan(&planned, &config).unwrap()
    }

    #[test]
    fn plan_lists_every_stage_in_order() {
        let text = plan_for(&[]);
        let positions: Vec<usize> = sample::STAGES
            .iter()
            .map(|(_, title)| text.find(title).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn plan_shows_wired_paths_and_command_lines() {
        let text = plan_for(&[]);
        let neb_input = std::path::Path::new("out").join("2_gsm_filtered");
        assert!(text.contains(&format!("input_path = {}", neb_input.display())));
        assert!(text.contains("max_workers = 8"));
        assert!(text.contains("$ dandelion-run-neb --input_path"));
        assert!(text.contains("--max_workers 8"));
    }

    #[test]
    fn plan_drops_values_the_stage_does_not_declare() {
        let text = plan_for(&["-S", "filter_gsm.cutoff=5"]);
        assert!(!text.contains("cutoff"));
    }
}
