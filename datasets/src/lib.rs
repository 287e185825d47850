//! `kstep-datasets` provides synthetic datasets for the `kstep` clustering toolkit.
//!
//! ## The Big Picture
//!
//! Clustering engines are easiest to reason about on data whose structure is known up front.
//! This crate generates "blobs": groups of points sampled from isotropic normal distributions
//! around a handful of centers, the best-case input for k-means.
//!
//! ## Using a generator
//!
//! ```
//! use kstep_datasets::generate::make_blobs;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_isaac::Isaac64Rng;
//!
//! let mut rng = Isaac64Rng::seed_from_u64(42);
//! // 500 points in the plane, grouped around 3 random centers
//! let points = make_blobs(500, 3, 2, 1.0, (-10., 10.), &mut rng).unwrap();
//! assert_eq!(points.dim(), (500, 2));
//! ```

pub mod generate;
