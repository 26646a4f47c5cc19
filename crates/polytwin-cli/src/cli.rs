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
    author = "Polytwin Developers",
    version,
    about = "Polytwin CLI - generates twin lamellae, orientation pairs and tessellator input for twinned polycrystals.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build twin lamellae and orientation files from first-pass grain statistics.
    Generate(GenerateArgs),
    /// Compute the disorientation between two orientations.
    Misorientation(MisorientationArgs),
    /// Produce a single parent/twin orientation pair.
    Pair(PairArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// First-pass grain statistics file (`diameter sphericity` per line).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub grains: PathBuf,

    /// Directory receiving twin_width, crystal_ori, CSV statistics and run.sh.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Microstructure statistics file (TOML with twin-thickness and parent tables).
    #[arg(long, value_name = "PATH")]
    pub statistics: Option<PathBuf>,

    /// Seed of the run; identical seeds reproduce identical output.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    // --- Orientation Overrides ---
    /// Pair orientations with an exact CSL relation of this sigma (3, 5, 7, 9 or 11).
    #[arg(long, value_name = "SIGMA", conflicts_with = "misorientation")]
    pub sigma: Option<u32>,

    /// Pair orientations by solving for this disorientation angle, in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub misorientation: Option<f64>,

    /// Crystal family used by the misorientation solver.
    #[arg(long, value_name = "FAMILY")]
    pub crystal_family: Option<String>,

    // --- Layout Overrides ---
    /// Twin count assigned to the largest grain.
    #[arg(long, value_name = "INT")]
    pub max_twins: Option<usize>,

    /// Reference length written for untwinned grains and used as the domain size.
    #[arg(long, value_name = "FLOAT")]
    pub domain_length: Option<f64>,

    /// Dimensionality of the tessellation domain (2 or 3).
    #[arg(long, value_name = "2|3")]
    pub dimensions: Option<u8>,

    /// Length the parent gaps of a grain are normalized to: 'diameter' or 'sphericity-scaled'.
    #[arg(long, value_name = "POLICY")]
    pub gap_policy: Option<String>,

    // --- Output Toggles ---
    /// Skip writing stats_parent.csv and stats_twin.csv.
    #[arg(long)]
    pub no_csv: bool,

    /// Skip writing the tessellator script.
    #[arg(long)]
    pub no_script: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S layout.max-expected-twins=8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `misorientation` subcommand.
#[derive(Args, Debug)]
pub struct MisorientationArgs {
    /// First orientation as Euler-Bunge degrees, e.g. '10,20,30'.
    #[arg(long, required = true, value_name = "PHI1,PHI,PHI2", allow_hyphen_values = true)]
    pub from: String,

    /// Second orientation as Euler-Bunge degrees.
    #[arg(long, required = true, value_name = "PHI1,PHI,PHI2", allow_hyphen_values = true)]
    pub to: String,

    /// Crystal family whose symmetry operators are applied.
    #[arg(long, default_value = "cubic", value_name = "FAMILY")]
    pub crystal_family: String,

    /// Print the angle obtained with every symmetry operator.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `pair` subcommand.
#[derive(Args, Debug)]
pub struct PairArgs {
    /// Exact CSL relation of this sigma.
    #[arg(long, value_name = "SIGMA", conflicts_with = "angle", required_unless_present = "angle")]
    pub sigma: Option<u32>,

    /// Target disorientation angle in degrees, solved numerically.
    #[arg(long, value_name = "DEGREES")]
    pub angle: Option<f64>,

    /// Parent orientation as Euler-Bunge degrees; drawn at random when omitted.
    #[arg(long, value_name = "PHI1,PHI,PHI2", allow_hyphen_values = true)]
    pub reference: Option<String>,

    /// Seed for the random parent orientation.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub seed: u64,

    #[arg(long, default_value = "cubic", value_name = "FAMILY")]
    pub crystal_family: String,

    /// Solver tolerance in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub tolerance: Option<f64>,

    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,
}
