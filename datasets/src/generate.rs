//! Utility functions for randomly generating datasets

use kstep::error::{Error, Result};
use ndarray::{s, Array, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::{
    rand::{seq::SliceRandom, Rng},
    rand_distr::{Distribution, Normal, StandardNormal, Uniform},
    RandomExt,
};

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob centroids.
///
/// Each blob is sampled from a standard normal distribution centered in the blob centroid.
/// Rows are laid out blob after blob, in the order of `blob_centroids`.
pub fn blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<f64> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = make_blob(blob_size, &blob_centroid, StandardNormal, rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    blobs
}

/// Generate `n_samples` points in `n_features` dimensions grouped in `n_centers` isotropic
/// gaussian blobs.
///
/// Blob centers are drawn uniformly inside `center_box` (the same bounds on every axis) and
/// each point is sampled from a normal distribution with standard deviation `cluster_std`
/// around its center. Samples are split as evenly as possible: the first
/// `n_samples % n_centers` blobs receive one extra point. The rows of the result are shuffled,
/// so blob membership cannot be read from the row order.
pub fn make_blobs(
    n_samples: usize,
    n_centers: usize,
    n_features: usize,
    cluster_std: f64,
    center_box: (f64, f64),
    rng: &mut impl Rng,
) -> Result<Array2<f64>> {
    if n_samples == 0 {
        return Err(Error::NotEnoughSamples {
            needed: 1,
            got: n_samples,
        });
    }
    if n_centers == 0 {
        return Err(Error::Parameters("n_centers must be at least 1".to_string()));
    }
    if n_features == 0 {
        return Err(Error::Parameters("n_features must be at least 1".to_string()));
    }
    if !(cluster_std > 0.) || !cluster_std.is_finite() {
        return Err(Error::Parameters(format!(
            "cluster_std must be a positive number, got {}",
            cluster_std
        )));
    }
    let (low, high) = center_box;
    if !(low < high) || !low.is_finite() || !high.is_finite() {
        return Err(Error::Parameters(format!(
            "center_box must be a non-empty interval, got ({}, {})",
            low, high
        )));
    }

    let centers = Array2::random_using((n_centers, n_features), Uniform::new(low, high), rng);
    let noise = Normal::new(0., cluster_std).map_err(|e| Error::Parameters(e.to_string()))?;

    let mut points = Array2::zeros((n_samples, n_features));
    let mut start = 0;
    for (center_index, center) in centers.rows().into_iter().enumerate() {
        let size = n_samples / n_centers + usize::from(center_index < n_samples % n_centers);
        let blob = make_blob(size, &center, noise, rng);
        points.slice_mut(s![start..start + size, ..]).assign(&blob);
        start += size;
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(rng);
    Ok(points.select(Axis(0), &order))
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid` using the given distribution.
fn make_blob(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    distribution: impl Distribution<f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<f64> = Array::random_using(shape, distribution, rng);
    origin_blob + blob_centroid
}
