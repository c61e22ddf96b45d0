//! Affinity graph construction for SymNMF.
//!
//! The pipeline is `points -> A -> D -> W` where
//! - `A[i][j] = exp(-||p_i - p_j||² / 2)` for `i != j` and `A[i][i] = 0`,
//! - `D` is diagonal with `D[i][i] = Σ_j A[i][j]`,
//! - `W = D^(-1/2) · A · D^(-1/2)`.

use crate::linalg::squared_euclidean;
use crate::{ClusterError, Matrix, Result, Vector};
use ndarray::Axis;
use tracing::debug;

/// Denominator of the Gaussian kernel exponent.
const KERNEL_BANDWIDTH: f64 = 2.0;

/// Pairwise Gaussian similarity matrix of `points` (rows are points).
pub fn similarity(points: &Matrix) -> Result<Matrix> {
    if points.nrows() == 0 || points.ncols() == 0 {
        return Err(ClusterError::invalid(
            "Input matrix must have at least one sample and one feature",
        ));
    }

    let n = points.nrows();
    let mut a = Matrix::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d2 = squared_euclidean(&points.row(i), &points.row(j));
            let value = (-d2 / KERNEL_BANDWIDTH).exp();
            a[[i, j]] = value;
            a[[j, i]] = value;
        }
    }

    debug!(n_samples = n, "built similarity matrix");
    Ok(a)
}

/// Diagonal degree matrix of a similarity matrix.
pub fn degree(a: &Matrix) -> Result<Matrix> {
    ensure_square("similarity", a)?;
    let row_sums: Vector = a.sum_axis(Axis(1));
    Ok(Matrix::from_diag(&row_sums))
}

/// Symmetric normalisation `D^(-1/2) · A · D^(-1/2)`.
///
/// Only the diagonal of `d` is read. A zero (or negative) degree makes the
/// inverse square root undefined and is reported as `DegenerateInput`.
pub fn normalize(a: &Matrix, d: &Matrix) -> Result<Matrix> {
    ensure_square("similarity", a)?;
    if a.shape() != d.shape() {
        return Err(ClusterError::invalid(format!(
            "degree matrix shape {:?} doesn't match similarity shape {:?}",
            d.shape(),
            a.shape()
        )));
    }

    let inv_sqrt = d
        .diag()
        .iter()
        .enumerate()
        .map(|(i, &deg)| {
            if deg > 0.0 {
                Ok(1.0 / deg.sqrt())
            } else {
                Err(ClusterError::degenerate(format!(
                    "point {} has zero similarity to every other point",
                    i
                )))
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    let n = a.nrows();
    let mut w = Matrix::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            w[[i, j]] = a[[i, j]] * inv_sqrt[i] * inv_sqrt[j];
        }
    }
    Ok(w)
}

/// Similarity matrix straight from points.
pub fn sym(points: &Matrix) -> Result<Matrix> {
    similarity(points)
}

/// Degree matrix straight from points.
pub fn ddg(points: &Matrix) -> Result<Matrix> {
    degree(&similarity(points)?)
}

/// Normalised similarity matrix straight from points.
pub fn norm(points: &Matrix) -> Result<Matrix> {
    let a = similarity(points)?;
    let d = degree(&a)?;
    normalize(&a, &d)
}

fn ensure_square(name: &str, m: &Matrix) -> Result<()> {
    if m.nrows() != m.ncols() {
        return Err(ClusterError::invalid(format!(
            "{} matrix must be square, got {:?}",
            name,
            m.shape()
        )));
    }
    Ok(())
}
