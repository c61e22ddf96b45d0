use crate::{ClusterError, Matrix, MatrixExt, Result};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use tracing::{debug, trace, warn};

/// Symmetric non-negative matrix factorization `W ≈ H·Hᵀ`.
///
/// `H` is initialised with `Uniform(0, 2·sqrt(mean(W)/k))` draws taken from
/// the caller's random source in row-major order, then refined with
/// multiplicative updates until the squared Frobenius norm of the change
/// drops below `tolerance` or `max_iter` updates have been applied.
/// Updates are damped with `beta = 0.5` unless configured otherwise.
#[derive(Clone, Debug)]
pub struct SymNMF {
    pub components: Option<Matrix>,
    pub n_iter: Option<usize>,
    pub reconstruction_err: Option<f64>,
    n_components: usize,
    max_iter: usize,
    tolerance: f64,
    beta: f64,
    denominator_epsilon: f64,
}

impl SymNMF {
    pub fn new(n_components: usize) -> Self {
        Self {
            components: None,
            n_iter: None,
            reconstruction_err: None,
            n_components,
            max_iter: 300,
            tolerance: 1e-4,
            beta: 0.5,
            denominator_epsilon: 1e-12,
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

    /// Damping of the update: `H ⊙ (1 - β + β·(WH)/(HHᵀH))`.
    /// `β = 1` is the undamped rule `H ⊙ (WH)/(HHᵀH)`, which can settle into
    /// a two-cycle and never meet the tolerance.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Floor applied to vanishing entries of the update denominator.
    pub fn denominator_epsilon(mut self, epsilon: f64) -> Self {
        self.denominator_epsilon = epsilon;
        self
    }

    pub fn fit<R: Rng + ?Sized>(&mut self, w: &Matrix, rng: &mut R) -> Result<()> {
        self.validate(w)?;

        let mut h = self.initialize(w, rng)?;
        let mut n_iter = 0;
        let mut converged = false;

        while n_iter < self.max_iter {
            let new_h = self.step(w, &h)?;
            n_iter += 1;

            let delta = new_h.squared_distance_to(&h)?;
            trace!(iteration = n_iter, delta, "symnmf update");
            h = new_h;

            if delta < self.tolerance {
                converged = true;
                break;
            }
        }

        if !converged && self.max_iter > 0 {
            warn!(max_iter = self.max_iter, "symnmf stopped at iteration cap");
        }

        let hht = h.matmul(&h.t().to_owned())?;
        let reconstruction_err = w.squared_distance_to(&hht)?;
        debug!(n_iter, reconstruction_err, "symnmf finished");

        self.components = Some(h);
        self.n_iter = Some(n_iter);
        self.reconstruction_err = Some(reconstruction_err);
        Ok(())
    }

    /// Fit and return the row-wise arg-max of `H` as cluster labels.
    pub fn fit_predict<R: Rng + ?Sized>(&mut self, w: &Matrix, rng: &mut R) -> Result<Vec<usize>> {
        self.fit(w, rng)?;
        let h = self
            .components
            .as_ref()
            .ok_or_else(|| ClusterError::invalid("SymNMF not fitted. Call fit() first."))?;
        Ok(crate::cluster::labels_from_factor(h))
    }

    /// Random non-negative starting point for `H`.
    pub fn initialize<R: Rng + ?Sized>(&self, w: &Matrix, rng: &mut R) -> Result<Matrix> {
        let mean = w.mean_value()?;
        let upper = 2.0 * (mean / self.n_components as f64).sqrt();
        if !(upper > 0.0 && upper.is_finite()) {
            return Err(ClusterError::degenerate(format!(
                "cannot initialise factor from a matrix with mean {}",
                mean
            )));
        }
        Ok(Matrix::random_using(
            (w.nrows(), self.n_components),
            Uniform::new(0.0, upper),
            rng,
        ))
    }

    /// One multiplicative update of `h`.
    pub fn step(&self, w: &Matrix, h: &Matrix) -> Result<Matrix> {
        let numerator = w.matmul(h)?;
        // H·(HᵀH) equals (H·Hᵀ)·H and keeps the inner product k×k.
        let gram = h.t().to_owned().matmul(h)?;
        let denominator = h.matmul(&gram)?;

        let ratio = numerator.divide_guarded(&denominator, self.denominator_epsilon)?;
        let beta = self.beta;
        let factor = ratio.mapv(|r| 1.0 - beta + beta * r);
        let new_h = h.hadamard(&factor)?;

        if !new_h.is_finite() {
            return Err(ClusterError::NumericInstability(
                "factor matrix contains non-finite values".to_string(),
            ));
        }
        Ok(new_h)
    }

    fn validate(&self, w: &Matrix) -> Result<()> {
        let n = w.nrows();
        if n == 0 || n != w.ncols() {
            return Err(ClusterError::invalid(format!(
                "normalized matrix must be square and non-empty, got {:?}",
                w.shape()
            )));
        }
        if self.n_components == 0 || self.n_components > n {
            return Err(ClusterError::invalid(format!(
                "k={} must be in [1, n_samples={}]",
                self.n_components, n
            )));
        }
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return Err(ClusterError::invalid(format!(
                "beta={} must be in (0, 1]",
                self.beta
            )));
        }
        if !(self.denominator_epsilon > 0.0) {
            return Err(ClusterError::invalid("denominator_epsilon must be > 0"));
        }
        if !w.is_finite() || !w.is_non_negative() {
            return Err(ClusterError::invalid(
                "normalized matrix must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Factorize `w` into an `n × k` non-negative matrix with default settings.
pub fn factorize<R: Rng + ?Sized>(w: &Matrix, k: usize, rng: &mut R) -> Result<Matrix> {
    let mut model = SymNMF::new(k);
    model.fit(w, rng)?;
    model
        .components
        .ok_or_else(|| ClusterError::invalid("SymNMF produced no factor"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_blobs() -> Matrix {
        array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [5.0, 5.0],
            [5.0, 6.0],
            [6.0, 5.0]
        ]
    }

    #[test]
    fn test_symnmf_shape_and_sign() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        let mut nmf = SymNMF::new(2);
        nmf.fit(&w, &mut rng).unwrap();

        let h = nmf.components.as_ref().unwrap();
        assert_eq!(h.shape(), &[6, 2]);
        assert!(h.is_non_negative());
        assert!(nmf.n_iter.unwrap() <= 300);
        assert!(nmf.reconstruction_err.unwrap() >= 0.0);
    }

    #[test]
    fn test_symnmf_deterministic_for_seed() {
        let w = affinity::norm(&two_blobs()).unwrap();

        let a = factorize(&w, 2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = factorize(&w, 2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initialization_bounds() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let nmf = SymNMF::new(3);
        let h = nmf.initialize(&w, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();

        let upper = 2.0 * (w.mean().unwrap() / 3.0).sqrt();
        assert_eq!(h.shape(), &[6, 3]);
        assert!(h.iter().all(|&v| (0.0..upper).contains(&v)));
    }

    #[test]
    fn test_non_negative_after_every_step() {
        let w = affinity::norm(&two_blobs()).unwrap();

        for seed in 0..5 {
            let nmf = SymNMF::new(2);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut h = nmf.initialize(&w, &mut rng).unwrap();
            for _ in 0..50 {
                h = nmf.step(&w, &h).unwrap();
                assert!(h.is_non_negative());
            }
        }
    }

    #[test]
    fn test_zero_denominator_is_guarded() {
        let w = array![[0.0, 0.5], [0.5, 0.0]];
        let h = array![[0.0, 0.0], [0.3, 0.1]];

        let nmf = SymNMF::new(2);
        let next = nmf.step(&w, &h).unwrap();
        assert!(next.is_finite());
        assert_eq!(next.row(0).sum(), 0.0);
    }

    #[test]
    fn test_separates_blobs() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        let mut nmf = SymNMF::new(2).tolerance(1e-12).max_iter(2000);
        let labels = nmf.fit_predict(&w, &mut rng).unwrap();

        assert_eq!(labels.len(), 6);
        assert!(labels.iter().all(|&l| l < 2));
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_undamped_update() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut nmf = SymNMF::new(2).beta(1.0);
        nmf.fit(&w, &mut rng).unwrap();
        assert!(nmf.components.as_ref().unwrap().is_non_negative());
        assert!(nmf.n_iter.unwrap() <= 300);
    }

    #[test]
    fn test_max_iter_cap_is_not_an_error() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut nmf = SymNMF::new(2).max_iter(1).tolerance(0.0);
        nmf.fit(&w, &mut rng).unwrap();
        assert_eq!(nmf.n_iter, Some(1));
    }

    #[test]
    fn test_invalid_arguments() {
        let w = affinity::norm(&two_blobs()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(matches!(
            SymNMF::new(0).fit(&w, &mut rng),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(matches!(
            SymNMF::new(7).fit(&w, &mut rng),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(SymNMF::new(2).beta(1.5).fit(&w, &mut rng).is_err());
        assert!(SymNMF::new(1).fit(&Matrix::zeros((2, 3)), &mut rng).is_err());
        assert!(SymNMF::new(1).fit(&array![[0.0, -1.0], [-1.0, 0.0]], &mut rng).is_err());
    }

    #[test]
    fn test_zero_matrix_is_degenerate() {
        let w = Matrix::zeros((3, 3));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            SymNMF::new(2).fit(&w, &mut rng),
            Err(ClusterError::DegenerateInput(_))
        ));
    }
}
