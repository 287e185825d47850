//! `kstep-clustering` provides a pure Rust k-means engine meant to be driven one step at
//! a time, typically by an interactive front-end animating the algorithm.
//!
//! ## The big picture
//!
//! `kstep-clustering` is built on top of `kstep`, which holds the shared numeric traits,
//! the distance and the error types, and `kstep-datasets`, which generates the synthetic
//! datasets the engine clusters.
//!
//! ## Current state
//!
//! Right now `kstep-clustering` provides:
//! * the [K-Means](KMeans) engine, with single-step execution and a tolerance-based
//!   convergence test;
//! * four [initialization strategies](KMeansInit): random, farthest-first, k-means++ and
//!   manual;
//! * a [coordinator](ManualInit) collecting manually chosen centers one at a time;
//! * a [session](KMeansSession) tying an engine and its coordinator together.
//!
//! Implementation choices, algorithmic details and tutorials can be found in the page
//! dedicated to [`KMeans`].
#[allow(clippy::new_ret_no_self)]
mod k_means;

pub use k_means::*;
pub use kstep_datasets::generate::{blobs as generate_blobs, make_blobs};
