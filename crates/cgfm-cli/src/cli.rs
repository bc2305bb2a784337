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
    about = "CGFM CLI - Interaction setup and basis evaluation for coarse-grained force matching.",
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
    /// Run the interaction setup and print a per-class summary.
    Setup(SetupArgs),
    /// Load tabulated interactions and print their evaluation grids.
    Tables(TablesArgs),
}

/// Input files shared by every subcommand.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the model settings file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub settings: PathBuf,

    /// Path to the topology summary file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub topology: PathBuf,

    /// Directory holding the range files (rmin.in, rmin_b.in, ...).
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub ranges: PathBuf,
}

/// Arguments for the `setup` subcommand.
#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Optional table file with tabulated interactions.
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,
}

/// Arguments for the `tables` subcommand.
#[derive(Args, Debug)]
pub struct TablesArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Table file with tabulated interactions.
    #[arg(long, required = true, value_name = "PATH")]
    pub table: PathBuf,
}
