use crate::linalg::euclidean_distance;
use crate::{ClusterError, Matrix, MatrixExt, Result};
use ndarray::ArrayView1;

/// Index of the centroid closest to `point`. Ties go to the lowest index.
pub(crate) fn nearest_centroid(point: &ArrayView1<f64>, centroids: &Matrix) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut closest_cluster = 0;

    for (k, centroid) in centroids.rows().into_iter().enumerate() {
        let distance = euclidean_distance(point, &centroid);
        if distance < min_distance {
            min_distance = distance;
            closest_cluster = k;
        }
    }

    closest_cluster
}

/// Nearest-centroid label for every row of `x`.
pub fn labels_from_centroids(x: &Matrix, centroids: &Matrix) -> Result<Vec<usize>> {
    if centroids.nrows() == 0 {
        return Err(ClusterError::invalid("at least one centroid is required"));
    }
    if x.ncols() != centroids.ncols() {
        return Err(ClusterError::invalid(format!(
            "Number of features in X ({}) doesn't match centroids ({})",
            x.ncols(),
            centroids.ncols()
        )));
    }

    Ok(x.rows()
        .into_iter()
        .map(|point| nearest_centroid(&point, centroids))
        .collect())
}

/// Row-wise arg-max of a factor matrix.
pub fn labels_from_factor(h: &Matrix) -> Vec<usize> {
    h.row_argmax()
}
