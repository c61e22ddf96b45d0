use crate::cluster::labels::{labels_from_centroids, nearest_centroid};
use crate::linalg::euclidean_distance;
use crate::{ClusterError, Matrix, Result};
use ndarray::s;
use tracing::{debug, trace, warn};

/// What happens to a centroid that received no points in an iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// The centroid stays where it was.
    #[default]
    KeepPrevious,
    /// The centroid is reset to the origin.
    Zero,
}

#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    pub labels: Option<Vec<usize>>,
    pub inertia: Option<f64>,
    pub n_iter: Option<usize>,
    n_clusters: usize,
    max_iter: usize,
    tolerance: f64,
    empty_cluster: EmptyClusterPolicy,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            n_clusters,
            max_iter: 300,
            tolerance: 1e-4,
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ClusterError::invalid(
                "Input matrix must have at least one sample and one feature",
            ));
        }

        if self.n_clusters == 0 || x.nrows() < self.n_clusters {
            return Err(ClusterError::invalid(format!(
                "n_clusters={} must be in [1, n_samples={}]",
                self.n_clusters,
                x.nrows()
            )));
        }

        // Deterministic start: the first k points.
        let mut centroids = x.slice(s![..self.n_clusters, ..]).to_owned();
        let mut n_iter = 0;
        let mut converged = false;

        while n_iter < self.max_iter {
            let assignments = self.assign(x, &centroids);
            let updated = self.update_centroids(x, &centroids, &assignments);
            n_iter += 1;

            let centroid_shift = self.max_centroid_shift(&centroids, &updated);
            trace!(iteration = n_iter, centroid_shift, "kmeans update");
            centroids = updated;

            if centroid_shift < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged && self.max_iter > 0 {
            warn!(max_iter = self.max_iter, "kmeans stopped at iteration cap");
        }

        // Labels come from the final centroids, not the last assignment pass.
        let labels = labels_from_centroids(x, &centroids)?;

        // Calculate inertia (within-cluster sum of squares)
        let mut inertia = 0.0;
        for (i, &cluster_idx) in labels.iter().enumerate() {
            let distance = euclidean_distance(&x.row(i), &centroids.row(cluster_idx));
            inertia += distance * distance;
        }

        debug!(n_iter, inertia, "kmeans finished");

        self.cluster_centers = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        self.n_iter = Some(n_iter);

        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or_else(|| ClusterError::invalid("KMeans not fitted. Call fit() first."))?;

        labels_from_centroids(x, centroids)
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Vec<usize>> {
        self.fit(x)?;
        self.labels
            .clone()
            .ok_or_else(|| ClusterError::invalid("KMeans produced no labels"))
    }

    /// Distance of every point to every centroid, shape `(n_samples, n_clusters)`.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or_else(|| ClusterError::invalid("KMeans not fitted. Call fit() first."))?;

        if x.ncols() != centroids.ncols() {
            return Err(ClusterError::invalid(format!(
                "Number of features in X ({}) doesn't match training data ({})",
                x.ncols(),
                centroids.ncols()
            )));
        }

        let mut distances = Matrix::zeros((x.nrows(), centroids.nrows()));
        for i in 0..x.nrows() {
            for k in 0..centroids.nrows() {
                distances[[i, k]] = euclidean_distance(&x.row(i), &centroids.row(k));
            }
        }

        Ok(distances)
    }

    fn assign(&self, x: &Matrix, centroids: &Matrix) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|point| nearest_centroid(&point, centroids))
            .collect()
    }

    fn update_centroids(&self, x: &Matrix, centroids: &Matrix, assignments: &[usize]) -> Matrix {
        let mut sums = Matrix::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; centroids.nrows()];

        for (i, &k) in assignments.iter().enumerate() {
            let mut row = sums.row_mut(k);
            row += &x.row(i);
            counts[k] += 1;
        }

        let mut updated = centroids.clone();
        for (k, &count) in counts.iter().enumerate() {
            if count > 0 {
                updated.row_mut(k).assign(&(&sums.row(k) / count as f64));
            } else if self.empty_cluster == EmptyClusterPolicy::Zero {
                updated.row_mut(k).fill(0.0);
            }
        }
        updated
    }

    fn max_centroid_shift(&self, old_centroids: &Matrix, new_centroids: &Matrix) -> f64 {
        let mut max_shift = 0.0;

        for k in 0..old_centroids.nrows() {
            let shift = euclidean_distance(&old_centroids.row(k), &new_centroids.row(k));
            max_shift = f64::max(max_shift, shift);
        }

        max_shift
    }
}

/// Run K-means with default settings and return the `k` final centroids.
pub fn fit_centroids(x: &Matrix, k: usize) -> Result<Matrix> {
    let mut kmeans = KMeans::new(k);
    kmeans.fit(x)?;
    kmeans
        .cluster_centers
        .ok_or_else(|| ClusterError::invalid("KMeans produced no centroids"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_kmeans_reference_example() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];

        let mut kmeans = KMeans::new(2);
        let labels = kmeans.fit_predict(&x).unwrap();
        let centers = kmeans.cluster_centers.as_ref().unwrap();

        assert_eq!(labels, vec![0, 0, 1, 1]);
        assert_abs_diff_eq!(centers[[0, 0]], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(centers[[0, 1]], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(centers[[1, 0]], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(centers[[1, 1]], 10.5, epsilon = 1e-9);
        assert_abs_diff_eq!(kmeans.inertia.unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(kmeans.n_iter, Some(3));
    }

    #[test]
    fn test_kmeans_returns_k_centroids() {
        let x = array![
            [1.0, 1.0, 0.0],
            [1.5, 2.0, 0.5],
            [3.0, 4.0, 1.0],
            [5.0, 7.0, 2.0],
            [3.5, 5.0, 1.5],
            [4.5, 5.0, 0.0],
            [3.5, 4.5, 1.0]
        ];

        for k in 1..=x.nrows() {
            let centers = fit_centroids(&x, k).unwrap();
            assert_eq!(centers.shape(), &[k, 3]);
        }
    }

    #[test]
    fn test_kmeans_idempotent_on_converged() {
        let x = array![
            [1.0, 1.0],
            [1.5, 2.0],
            [3.0, 4.0],
            [5.0, 7.0],
            [3.5, 5.0],
            [4.5, 5.0],
            [3.5, 4.5]
        ];

        let mut kmeans = KMeans::new(2).tolerance(1e-12);
        kmeans.fit(&x).unwrap();
        let centers = kmeans.cluster_centers.clone().unwrap();

        let assignments = kmeans.assign(&x, &centers);
        let again = kmeans.update_centroids(&x, &centers, &assignments);
        assert!(kmeans.max_centroid_shift(&centers, &again) < 1e-9);
    }

    #[test]
    fn test_kmeans_duplicate_initial_centroids() {
        // Every point ties on the first pass and goes to centroid 0; the
        // untouched centroid 1 picks the duplicates up on the next pass.
        let x = array![[1.0, 1.0], [1.0, 1.0], [3.0, 3.0]];

        let mut kmeans = KMeans::new(2);
        let labels = kmeans.fit_predict(&x).unwrap();
        assert_eq!(labels, vec![1, 1, 0]);
        assert_eq!(kmeans.n_iter, Some(3));
    }

    #[test]
    fn test_empty_cluster_policies() {
        let x = array![[1.0, 1.0], [1.0, 1.0], [3.0, 3.0]];
        let centers = x.slice(s![..2, ..]).to_owned();

        let keep = KMeans::new(2);
        let assignments = keep.assign(&x, &centers);
        assert_eq!(assignments, vec![0, 0, 0]);

        let kept = keep.update_centroids(&x, &centers, &assignments);
        assert_eq!(kept.row(1), array![1.0, 1.0]);

        let zero = KMeans::new(2).empty_cluster(EmptyClusterPolicy::Zero);
        let zeroed = zero.update_centroids(&x, &centers, &assignments);
        assert_eq!(zeroed.row(1), array![0.0, 0.0]);
        assert_abs_diff_eq!(zeroed[[0, 0]], 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kmeans_max_iter_cap() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
        let mut kmeans = KMeans::new(2).max_iter(1);
        kmeans.fit(&x).unwrap();
        assert_eq!(kmeans.n_iter, Some(1));
        assert_eq!(kmeans.labels.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_kmeans_transform() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [10.0, 10.0]];

        let mut kmeans = KMeans::new(2);
        kmeans.fit(&x).unwrap();

        let distances = kmeans.transform(&x).unwrap();
        assert_eq!(distances.shape(), &[3, 2]);
        assert!(distances.iter().all(|&d| d >= 0.0));
    }

    #[test]
    fn test_kmeans_invalid_clusters() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(matches!(
            KMeans::new(0).fit(&x),
            Err(ClusterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_kmeans_insufficient_samples() {
        let x = array![[1.0, 2.0]];
        let mut kmeans = KMeans::new(2);

        assert!(matches!(kmeans.fit(&x), Err(ClusterError::InvalidArgument(_))));
    }

    #[test]
    fn test_kmeans_predict_without_fit() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let kmeans = KMeans::new(2);

        assert!(kmeans.predict(&x).is_err());
        assert!(kmeans.transform(&x).is_err());
    }

    #[test]
    fn test_kmeans_dimension_mismatch() {
        let x_train = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let x_test = array![[1.0, 2.0], [3.0, 4.0]];

        let mut kmeans = KMeans::new(2);
        kmeans.fit(&x_train).unwrap();

        assert!(kmeans.predict(&x_test).is_err());
    }
}
