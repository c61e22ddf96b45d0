//! Matrix factorization used for graph clustering.
//!
//! `SymNMF` approximates a normalized similarity matrix `W` by `H·Hᵀ` with
//! `H` entrywise non-negative. The arg-max of each row of `H` is that point's
//! cluster.
//!
//! # Examples
//!
//! ```rust
//! use symcluster::{affinity, SymNMF};
//! use ndarray::array;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let x = array![
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [4.0, 4.0],
//!     [4.0, 5.0]
//! ];
//!
//! let w = affinity::norm(&x).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(1234);
//!
//! let mut nmf = SymNMF::new(2);
//! let labels = nmf.fit_predict(&w, &mut rng).unwrap();
//! assert_eq!(labels.len(), 4);
//!
//! let h = nmf.components.as_ref().unwrap();
//! println!("H = {:?}", h);
//! ```

mod symnmf;

pub use symnmf::{factorize, SymNMF};
