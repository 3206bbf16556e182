use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "molpipe - featurize molecular datasets and select regression models by validation-set grid search.",
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

    /// Set the number of threads for parallel trials.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: featurize, split, normalize, and grid-search.
    Run(RunArgs),
    /// Featurize an input file and export the feature table as CSV.
    Featurize(FeaturizeArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the input structure file (extended XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the pipeline configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the full trial score table to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    // --- Config overrides ---
    /// Override the split seed from the config file.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the maximum atom count from the config file.
    #[arg(long, value_name = "INT")]
    pub max_atoms: Option<usize>,

    /// Override the scoring metric from the config file (rmse, mae, r2).
    #[arg(long, value_name = "NAME")]
    pub metric: Option<String>,
}

/// Arguments for the `featurize` subcommand.
#[derive(Args, Debug)]
pub struct FeaturizeArgs {
    /// Path to the input structure file (extended XYZ).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output CSV feature table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Maximum atom count per record; larger records are skipped.
    #[arg(long, value_name = "INT", default_value_t = 23)]
    pub max_atoms: usize,

    /// Keep hydrogens instead of dropping them before featurization.
    #[arg(long)]
    pub keep_hydrogens: bool,

    /// Name of the record property holding the regression label.
    #[arg(long, value_name = "NAME", default_value = "energy")]
    pub label_field: String,
}
