use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Dandelion CLI - Chemical compound space sampling near transition states using xTB, SE-GSM and NEB.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every sampling stage, from GSM creation to compiling the samples.
    Run(PipelineArgs),
    /// Resolve and print each stage's configuration without running anything.
    Plan(PipelineArgs),
}

/// Arguments shared by `run` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Input path of mother structures.
    #[arg(short, long, alias = "input_path", required = true, value_name = "PATH")]
    pub input_path: PathBuf,

    /// Output path of dandelion. Created if it does not exist.
    #[arg(short, long, alias = "output_path", required = true, value_name = "PATH")]
    pub output_path: PathBuf,

    /// Number of worker processes, passed to every stage that accepts it.
    #[arg(short = 'n', long, alias = "max_workers", required = true, value_name = "INT")]
    pub max_workers: usize,

    /// Pipeline configuration file in TOML format (stage programs, extra parameters).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a stage parameter, overriding the config file.
    /// Can be used multiple times. Example: -S run_neb.fmax=0.03
    #[arg(short = 'S', long = "set", value_name = "STAGE.PARAM=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Reject overrides naming parameters a stage does not declare.
    #[arg(long)]
    pub strict: bool,

    /// Seconds to wait between stages.
    #[arg(long, value_name = "SECONDS")]
    pub pause: Option<f64>,
}
