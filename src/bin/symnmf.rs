//! symnmf: print the similarity, degree, normalized or factor matrix of a point set.

use clap::error::ErrorKind;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use symcluster::{format_matrix, load_points, logging, run_goal, Goal, Result, DEFAULT_SEED};

const GENERIC_ERROR: &str = "An Error Has Occurred";

#[derive(Parser, Debug)]
#[command(name = "symnmf")]
#[command(about = "Compute sym, ddg, norm or symnmf matrices for a CSV of points")]
struct Cli {
    /// Number of clusters (used by the symnmf goal)
    k: usize,

    /// Matrix to compute: sym, ddg, norm or symnmf
    goal: Goal,

    /// Headerless CSV, one point per row
    input: PathBuf,

    /// Seed for the factor initialisation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Increase log verbosity (stderr)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<String> {
    let points = load_points(&cli.input)?;
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let matrix = run_goal(cli.goal, &points, cli.k, &mut rng)?;
    Ok(format_matrix(&matrix))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            println!("{}", GENERIC_ERROR);
            return;
        }
    };

    logging::init(cli.verbose);

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::debug!(error = %e, goal = %cli.goal, "symnmf failed");
            println!("{}", GENERIC_ERROR);
        }
    }
}
