use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "flexcalc - Scores the flexibility of a molecular-dynamics trajectory as the mean RMSD of every frame to the frame closest to the average structure.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Path to the input trajectory: '>'-headed frames of "x y z" coordinate lines.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the character that starts a frame header line.
    #[arg(long, value_name = "CHAR")]
    pub header_marker: Option<char>,

    /// Number of decimal digits used to print the score.
    #[arg(short, long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Also print the frame count, atom count and the frame closest to the mean.
    #[arg(short, long)]
    pub details: bool,

    /// Write the mean (average) frame to this path in trajectory format.
    #[arg(long, value_name = "PATH")]
    pub write_mean: Option<PathBuf>,

    /// Write the frame closest to the mean to this path in trajectory format.
    #[arg(long, value_name = "PATH")]
    pub write_closest: Option<PathBuf>,

    /// Disable the progress display on stderr.
    #[arg(long)]
    pub no_progress: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S output.precision=6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
