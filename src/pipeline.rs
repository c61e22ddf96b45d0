//! End-to-end pipelines behind the command-line tools.

use crate::decomposition::factorize;
use crate::metrics::Evaluator;
use crate::{affinity, cluster, ClusterError, KMeans, Matrix, Result};
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Matrix the `symnmf` tool can compute from a point set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Similarity matrix `A`.
    Sym,
    /// Diagonal degree matrix `D`.
    Ddg,
    /// Normalized similarity matrix `W`.
    Norm,
    /// Factor matrix `H`.
    SymNmf,
}

impl FromStr for Goal {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sym" => Ok(Goal::Sym),
            "ddg" => Ok(Goal::Ddg),
            "norm" => Ok(Goal::Norm),
            "symnmf" => Ok(Goal::SymNmf),
            _ => Err(ClusterError::invalid(format!(
                "Invalid goal: {}. Must be one of: sym, ddg, norm, symnmf",
                s
            ))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Goal::Sym => "sym",
            Goal::Ddg => "ddg",
            Goal::Norm => "norm",
            Goal::SymNmf => "symnmf",
        };
        f.write_str(name)
    }
}

/// Compute the matrix selected by `goal`. `k` is only used by [`Goal::SymNmf`].
pub fn run_goal<R: Rng + ?Sized>(goal: Goal, points: &Matrix, k: usize, rng: &mut R) -> Result<Matrix> {
    debug!(%goal, n_samples = points.nrows(), k, "running goal");
    match goal {
        Goal::Sym => affinity::sym(points),
        Goal::Ddg => affinity::ddg(points),
        Goal::Norm => affinity::norm(points),
        Goal::SymNmf => {
            let w = affinity::norm(points)?;
            factorize(&w, k, rng)
        }
    }
}

/// Labels from both algorithms and their scores.
#[derive(Clone, Debug)]
pub struct Comparison {
    pub nmf_labels: Vec<usize>,
    pub kmeans_labels: Vec<usize>,
    pub nmf_score: f64,
    pub kmeans_score: f64,
}

/// Cluster `points` with SymNMF and K-means and score both labelings.
pub fn compare<R, E>(points: &Matrix, k: usize, rng: &mut R, evaluator: &E) -> Result<Comparison>
where
    R: Rng + ?Sized,
    E: Evaluator + ?Sized,
{
    let mut kmeans = KMeans::new(k);
    let kmeans_labels = kmeans.fit_predict(points)?;

    let h = run_goal(Goal::SymNmf, points, k, rng)?;
    let nmf_labels = cluster::labels_from_factor(&h);

    let nmf_score = evaluator.score(points, &nmf_labels)?;
    let kmeans_score = evaluator.score(points, &kmeans_labels)?;

    Ok(Comparison {
        nmf_labels,
        kmeans_labels,
        nmf_score,
        kmeans_score,
    })
}

/// One row per line, values comma-separated with four decimals.
pub fn format_matrix(m: &Matrix) -> String {
    m.rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{:.4}", v))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
