use crate::linalg::euclidean_distance;
use crate::{ClusterError, Matrix, Result};
use std::collections::BTreeMap;

/// Scores a clustering of `x`. Higher is better.
pub trait Evaluator {
    fn score(&self, x: &Matrix, labels: &[usize]) -> Result<f64>;
}

/// Mean silhouette coefficient with Euclidean distances.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silhouette;

impl Evaluator for Silhouette {
    fn score(&self, x: &Matrix, labels: &[usize]) -> Result<f64> {
        silhouette_score(x, labels)
    }
}

/// Check that `labels` describes a clustering of `x` that can be scored:
/// one label per point and between 2 and `n - 1` distinct labels.
pub fn check_labels(x: &Matrix, labels: &[usize]) -> Result<usize> {
    if x.nrows() != labels.len() {
        return Err(ClusterError::invalid(format!(
            "got {} labels for {} samples",
            labels.len(),
            x.nrows()
        )));
    }

    let mut distinct: Vec<usize> = labels.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let n_labels = distinct.len();

    if n_labels < 2 || n_labels >= x.nrows() {
        return Err(ClusterError::invalid(format!(
            "number of labels is {}, valid values are 2 to n_samples - 1 ({})",
            n_labels,
            x.nrows().saturating_sub(1)
        )));
    }
    Ok(n_labels)
}

/// Mean over all points of `(b - a) / max(a, b)`, where `a` is the mean
/// distance to the rest of the point's own cluster and `b` the smallest mean
/// distance to another cluster. Points alone in their cluster score 0.
pub fn silhouette_score(x: &Matrix, labels: &[usize]) -> Result<f64> {
    check_labels(x, labels)?;

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(i);
    }

    let n = x.nrows();
    let mut total = 0.0;

    for i in 0..n {
        let own = &members[&labels[i]];
        if own.len() == 1 {
            continue;
        }

        let mut a = 0.0;
        let mut b = f64::INFINITY;
        for (&label, points) in &members {
            let sum: f64 = points
                .iter()
                .map(|&j| euclidean_distance(&x.row(i), &x.row(j)))
                .sum();
            if label == labels[i] {
                a = sum / (points.len() - 1) as f64;
            } else {
                b = f64::min(b, sum / points.len() as f64);
            }
        }

        let denom = f64::max(a, b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Ok(total / n as f64)
}
