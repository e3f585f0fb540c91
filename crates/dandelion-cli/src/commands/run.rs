use crate::cli::PipelineArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::ui;
use crate::utils::progress::CliProgressHandler;
use dandelion::engine::progress::ProgressReporter;
use dandelion::workflows::sample;
use tracing::info;

pub fn run(args: PipelineArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;
    let phases = config.phases()?;
    let sequencer = config.sequencer();

    ui::print_header();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the sampling workflow...");
    let report = sample::run(
        &config.request,
        phases,
        config.overrides,
        &sequencer,
        &reporter,
    )?;

    println!(
        "Sampling complete: {} stages in {:.1}s. Samples written to {}",
        report.phases.len(),
        report.total_elapsed().as_secs_f64(),
        config
            .request
            .output_path
            .join(sample::COMPILED_FILE)
            .display()
    );
    Ok(())
}
