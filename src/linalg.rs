//! Dense matrix primitives used by the clustering pipelines.
//!
//! Every operation that combines two matrices checks shapes up front and
//! reports a mismatch as [`ClusterError::InvalidArgument`] instead of
//! relying on ndarray's panicking operator overloads.

use crate::{ClusterError, Matrix, Result};
use ndarray::{ArrayView1, Zip};

/// Named, shape-checked operations on [`Matrix`].
pub trait MatrixExt {
    /// Bounds-checked element access.
    fn try_at(&self, row: usize, col: usize) -> Result<f64>;

    /// Matrix product `self · other`.
    fn matmul(&self, other: &Matrix) -> Result<Matrix>;

    /// Elementwise product.
    fn hadamard(&self, other: &Matrix) -> Result<Matrix>;

    /// Elementwise quotient. Denominators whose magnitude is below `epsilon`
    /// are replaced by `epsilon`.
    fn divide_guarded(&self, other: &Matrix, epsilon: f64) -> Result<Matrix>;

    /// Squared Frobenius norm of `self - other`.
    fn squared_distance_to(&self, other: &Matrix) -> Result<f64>;

    fn frobenius_norm_sq(&self) -> f64;

    /// Mean over all entries.
    fn mean_value(&self) -> Result<f64>;

    /// Column index of the largest entry of each row. Ties go to the lowest index.
    fn row_argmax(&self) -> Vec<usize>;

    fn is_non_negative(&self) -> bool;

    fn is_finite(&self) -> bool;
}

fn ensure_same_shape(op: &str, a: &Matrix, b: &Matrix) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(ClusterError::invalid(format!(
            "{}: shape {:?} doesn't match {:?}",
            op,
            a.shape(),
            b.shape()
        )));
    }
    Ok(())
}

impl MatrixExt for Matrix {
    fn try_at(&self, row: usize, col: usize) -> Result<f64> {
        self.get((row, col)).copied().ok_or_else(|| {
            ClusterError::invalid(format!(
                "index ({}, {}) out of bounds for shape {:?}",
                row,
                col,
                self.shape()
            ))
        })
    }

    fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.ncols() != other.nrows() {
            return Err(ClusterError::invalid(format!(
                "matmul: cannot multiply {:?} by {:?}",
                self.shape(),
                other.shape()
            )));
        }
        Ok(self.dot(other))
    }

    fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        ensure_same_shape("hadamard", self, other)?;
        Ok(Zip::from(self).and(other).map_collect(|&a, &b| a * b))
    }

    fn divide_guarded(&self, other: &Matrix, epsilon: f64) -> Result<Matrix> {
        ensure_same_shape("divide", self, other)?;
        Ok(Zip::from(self).and(other).map_collect(|&a, &b| {
            let denom = if b.abs() < epsilon { epsilon } else { b };
            a / denom
        }))
    }

    fn squared_distance_to(&self, other: &Matrix) -> Result<f64> {
        ensure_same_shape("distance", self, other)?;
        Ok(Zip::from(self)
            .and(other)
            .fold(0.0, |acc, &a, &b| acc + (a - b) * (a - b)))
    }

    fn frobenius_norm_sq(&self) -> f64 {
        self.iter().map(|x| x * x).sum()
    }

    fn mean_value(&self) -> Result<f64> {
        self.mean()
            .ok_or_else(|| ClusterError::invalid("mean of an empty matrix is undefined"))
    }

    fn row_argmax(&self) -> Vec<usize> {
        self.rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                let mut best_value = f64::NEG_INFINITY;
                for (j, &value) in row.iter().enumerate() {
                    if value > best_value {
                        best_value = value;
                        best = j;
                    }
                }
                best
            })
            .collect()
    }

    fn is_non_negative(&self) -> bool {
        self.iter().all(|&x| x >= 0.0)
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}

pub fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
}

pub fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    squared_euclidean(a, b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_matmul_shape_check() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0], [1.0]];
        let c = a.matmul(&b).unwrap();
        assert_eq!(c, array![[3.0], [7.0]]);

        assert!(matches!(b.matmul(&b), Err(ClusterError::InvalidArgument(_))));
    }

    #[test]
    fn test_hadamard_and_divide() {
        let a = array![[2.0, 4.0], [6.0, 8.0]];
        let b = array![[2.0, 0.0], [3.0, 4.0]];

        assert_eq!(a.hadamard(&b).unwrap(), array![[4.0, 0.0], [18.0, 32.0]]);

        let q = a.divide_guarded(&b, 1e-3).unwrap();
        assert_abs_diff_eq!(q[[0, 0]], 1.0);
        assert_abs_diff_eq!(q[[0, 1]], 4000.0, epsilon = 1e-9);
        assert!(q.is_finite());

        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(a.hadamard(&wrong).is_err());
        assert!(a.divide_guarded(&wrong, 1e-3).is_err());
    }

    #[test]
    fn test_reductions() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        assert_abs_diff_eq!(a.mean_value().unwrap(), 2.5);
        assert_abs_diff_eq!(a.frobenius_norm_sq(), 30.0);

        let b = array![[1.0, 2.0], [3.0, 6.0]];
        assert_abs_diff_eq!(a.squared_distance_to(&b).unwrap(), 4.0);

        assert!(Matrix::zeros((0, 3)).mean_value().is_err());
    }

    #[test]
    fn test_try_at_bounds() {
        let a = array![[1.0, 2.0]];
        assert_abs_diff_eq!(a.try_at(0, 1).unwrap(), 2.0);
        assert!(a.try_at(1, 0).is_err());
    }

    #[test]
    fn test_row_argmax_ties_lowest_index() {
        let h = array![[0.2, 0.9, 0.1], [0.5, 0.5, 0.1], [0.0, 0.0, 0.3]];
        assert_eq!(h.row_argmax(), vec![1, 0, 2]);
    }

    #[test]
    fn test_distances() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_abs_diff_eq!(squared_euclidean(&a.view(), &b.view()), 25.0);
        assert_abs_diff_eq!(euclidean_distance(&a.view(), &b.view()), 5.0);
    }
}
