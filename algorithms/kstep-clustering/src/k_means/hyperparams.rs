use crate::{DataSource, KMeans, KMeansInit, KMeansParamsError};

use kstep::{Float, ParamGuard};
use ndarray::Array2;
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The set of hyperparameters that can be specified for the execution of
/// the [K-means engine](crate::KMeans).
pub struct KMeansValidParams<F: Float, R: Rng> {
    /// A step is considered a fixpoint if no coordinate of any centroid moved by more
    /// than `tolerance`.
    tolerance: F,
    /// The number of clusters we will be looking for in the dataset.
    n_clusters: usize,
    /// The initialization strategy used to initialize the centroids.
    init: KMeansInit,
    /// Where observations come from when the dataset is (re)generated.
    data: DataSource<F>,
    /// The random number generator
    rng: R,
}

#[derive(Clone, Debug, PartialEq)]
/// An helper struct used to construct a set of [valid hyperparameters](KMeansValidParams) for
/// the [K-means engine](crate::KMeans) (using the builder pattern).
pub struct KMeansParams<F: Float, R: Rng>(KMeansValidParams<F, R>);

impl<F: Float, R: Rng> KMeansParams<F, R> {
    /// `new` lets us configure our engine parameters:
    /// * we will be looking for `n_clusters` in the dataset;
    /// * a step that moves no centroid coordinate by more than `tolerance`
    ///   marks the engine as converged;
    /// * centroids are seeded with `init`, or supplied by hand with [`KMeansInit::Manual`].
    ///
    /// Defaults are provided if optional parameters are not specified:
    /// * `tolerance = 1e-8`
    /// * `init = KMeansPlusPlus`
    /// * data source: 500 planar points in `n_clusters` blobs of unit standard deviation
    pub fn new(n_clusters: usize, rng: R) -> Self {
        Self(KMeansValidParams {
            tolerance: F::cast(1e-8),
            n_clusters,
            init: KMeansInit::KMeansPlusPlus,
            data: DataSource::default(),
            rng,
        })
    }

    /// Change the value of `tolerance`. A tolerance of `0` only accepts bit-for-bit
    /// identical centroid sets as a fixpoint.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Change the value of `init`
    pub fn init_method(mut self, init: KMeansInit) -> Self {
        self.0.init = init;
        self
    }

    /// Change where the engine takes its observations from
    pub fn data_source(mut self, data: DataSource<F>) -> Self {
        self.0.data = data;
        self
    }

    /// Cluster a fixed set of observations, with shape `(n_observations, n_features)`,
    /// instead of generated blobs
    pub fn observations(self, observations: Array2<F>) -> Self {
        self.data_source(DataSource::Fixed(observations))
    }

    /// Check the hyperparameters and create an engine from them
    pub fn build(self) -> Result<KMeans<F, R>, KMeansParamsError>
    where
        R: Clone,
    {
        self.check().map(KMeans::new)
    }
}

impl<F: Float, R: Rng> ParamGuard for KMeansParams<F, R> {
    type Checked = KMeansValidParams<F, R>;
    type Error = KMeansParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_clusters == 0 {
            Err(KMeansParamsError::NClusters)
        } else if self.0.tolerance.is_nan() || self.0.tolerance < F::zero() {
            Err(KMeansParamsError::Tolerance)
        } else {
            self.0.data.check()?;
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, R: Rng> KMeansValidParams<F, R> {
    /// A step is considered a fixpoint if no coordinate of any centroid moved by more
    /// than `tolerance`.
    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    /// The number of clusters we will be looking for in the dataset.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster initialization strategy
    pub fn init_method(&self) -> KMeansInit {
        self.init
    }

    /// Where observations come from
    pub fn data_source(&self) -> &DataSource<F> {
        &self.data
    }

    /// Returns the random generator
    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub(crate) fn set_init_method(&mut self, init: KMeansInit) {
        self.init = init;
    }
}
