//! analysis: compare SymNMF and K-means clusterings by silhouette score.

use clap::error::ErrorKind;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use symcluster::{compare, load_points, logging, Comparison, Result, Silhouette, DEFAULT_SEED};

const GENERIC_ERROR: &str = "An Error Has Occurred";

#[derive(Parser, Debug)]
#[command(name = "analysis")]
#[command(about = "Score SymNMF against K-means on a CSV of points")]
struct Cli {
    /// Number of clusters
    k: usize,

    /// Headerless CSV, one point per row
    input: PathBuf,

    /// Seed for the SymNMF factor initialisation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Increase log verbosity (stderr)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<Comparison> {
    let points = load_points(&cli.input)?;
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    compare(&points, cli.k, &mut rng, &Silhouette)
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
        Ok(result) => {
            tracing::info!(
                nmf_labels = ?result.nmf_labels,
                kmeans_labels = ?result.kmeans_labels,
                "clustering finished"
            );
            println!("nmf: {:.4}", result.nmf_score);
            println!("kmeans: {:.4}", result.kmeans_score);
        }
        Err(e) => {
            tracing::debug!(error = %e, "analysis failed");
            println!("{}", GENERIC_ERROR);
        }
    }
}
