//! Centroid clustering and label extraction.
//!
//! This module provides:
//! - `KMeans`: Lloyd iterations seeded with the first `k` points
//! - `labels_from_centroids` / `labels_from_factor`: flat per-point labels
//!   from a centroid set or a SymNMF factor matrix
//!
//! # Examples
//!
//! ```rust
//! use symcluster::KMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [10.0, 10.0],
//!     [10.0, 11.0]
//! ];
//!
//! let mut kmeans = KMeans::new(2).max_iter(300);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels, vec![0, 0, 1, 1]);
//!
//! // Within-cluster sum of squares
//! let inertia = kmeans.inertia.unwrap();
//! println!("Inertia: {:.4}", inertia);
//! ```

mod kmeans;
mod labels;

pub use kmeans::{fit_centroids, EmptyClusterPolicy, KMeans};
pub use labels::{labels_from_centroids, labels_from_factor};
