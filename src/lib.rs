pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod error;
pub mod linalg;
pub mod dataset;
pub mod affinity;
pub mod decomposition;
pub mod cluster;
pub mod metrics;
pub mod pipeline;
pub mod logging;

pub use error::{ClusterError, Result};
pub use linalg::MatrixExt;
pub use dataset::load_points;
pub use affinity::{ddg, degree, norm, normalize, similarity, sym};
pub use decomposition::{factorize, SymNMF};
pub use cluster::{fit_centroids, labels_from_centroids, labels_from_factor, EmptyClusterPolicy, KMeans};
pub use metrics::{silhouette_score, Evaluator, Silhouette};
pub use pipeline::{compare, format_matrix, run_goal, Comparison, Goal};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

/// Seed used by the command-line tools when none is given.
pub const DEFAULT_SEED: u64 = 1234;
