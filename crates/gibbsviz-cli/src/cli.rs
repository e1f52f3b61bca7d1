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
    about = "gibbsviz - Compute and visualize Gibbs free-energy surfaces of binary alloys from CALPHAD thermodynamic databases.",
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
    /// Compute free-energy surfaces and render them as an interactive 3D figure.
    Plot(PlotArgs),
    /// Parse a thermodynamic database and print its contents.
    Inspect(InspectArgs),
}

/// Arguments for the `plot` subcommand.
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Path to the thermodynamic database (TDB) file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub database: PathBuf,

    /// Path for the rendered HTML figure.
    #[arg(short, long, value_name = "PATH", default_value = "gibbs_surfaces.html")]
    pub output: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The two substitutional elements; the first is the composition axis.
    #[arg(short, long, value_name = "EL,EL", value_delimiter = ',', num_args = 2)]
    pub elements: Option<Vec<String>>,

    /// Phases to evaluate (defaults to LIQUID, FCC_A1, BCC_A2).
    #[arg(short, long, value_name = "NAME", value_delimiter = ',')]
    pub phases: Option<Vec<String>>,

    // --- Grid overrides ---
    /// Override the minimum mole fraction of the first element.
    #[arg(long, value_name = "FLOAT")]
    pub comp_min: Option<f64>,

    /// Override the maximum mole fraction of the first element.
    #[arg(long, value_name = "FLOAT")]
    pub comp_max: Option<f64>,

    /// Override the composition sampling interval.
    #[arg(long, value_name = "FLOAT")]
    pub comp_interval: Option<f64>,

    /// Override the minimum temperature in kelvin.
    #[arg(long, value_name = "FLOAT")]
    pub t_min: Option<f64>,

    /// Override the maximum temperature in kelvin.
    #[arg(long, value_name = "FLOAT")]
    pub t_max: Option<f64>,

    /// Override the number of temperature samples.
    #[arg(long, value_name = "INT")]
    pub t_points: Option<usize>,

    /// Also write the computed surfaces as CSV (long format).
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Open the rendered figure in the default browser.
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the thermodynamic database (TDB) file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub database: PathBuf,

    /// Also list every FUNCTION with its temperature range.
    #[arg(long)]
    pub functions: bool,
}
