//! `kstep` provides the shared building blocks of the step-wise k-means toolkit.
//!
//! ## The big picture
//!
//! The workspace is split the same way a classical ML toolkit is:
//! * `kstep` (this crate) holds the floating point bound, the Euclidean distance primitive,
//!   hyperparameter checking and the core error type;
//! * `kstep-datasets` generates synthetic 2-D (or D-dimensional) blob datasets;
//! * `kstep-clustering` implements the k-means engine itself, with random, farthest-first,
//!   k-means++ and manual centroid initialization and a single-step execution model.
//!
//! Every crate works with `ndarray` matrices of shape `(n_observations, n_features)`.

pub mod distance;
pub mod error;
mod float;
mod param_guard;

pub use distance::{Distance, L2Dist, Point};
pub use float::Float;
pub use param_guard::ParamGuard;
