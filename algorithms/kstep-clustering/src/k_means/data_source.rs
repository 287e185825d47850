use crate::{KMeansError, KMeansParamsError};
use kstep::Float;
use kstep_datasets::generate::make_blobs;
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
/// Settings of the synthetic blob generator used when the engine (re)generates its dataset.
///
/// One blob is generated per cluster, so the dataset holds roughly `n_clusters` groups.
pub struct Blobs {
    n_samples: usize,
    n_features: usize,
    cluster_std: f64,
    center_box: (f64, f64),
}

impl Default for Blobs {
    /// 500 points in the plane, unit standard deviation, centers inside `(-10, 10)`.
    fn default() -> Self {
        Self {
            n_samples: 500,
            n_features: 2,
            cluster_std: 1.,
            center_box: (-10., 10.),
        }
    }
}

impl Blobs {
    /// Change the total number of generated points
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Change the dimensionality of the generated points
    pub fn n_features(mut self, n_features: usize) -> Self {
        self.n_features = n_features;
        self
    }

    /// Change the standard deviation of every blob
    pub fn cluster_std(mut self, cluster_std: f64) -> Self {
        self.cluster_std = cluster_std;
        self
    }

    /// Change the bounds blob centers are drawn from
    pub fn center_box(mut self, low: f64, high: f64) -> Self {
        self.center_box = (low, high);
        self
    }

    fn check(&self) -> Result<(), KMeansParamsError> {
        let (low, high) = self.center_box;
        if self.n_samples == 0 {
            Err(KMeansParamsError::NSamples)
        } else if self.n_features == 0 {
            Err(KMeansParamsError::NFeatures)
        } else if !(self.cluster_std > 0.) || !self.cluster_std.is_finite() {
            Err(KMeansParamsError::ClusterStd)
        } else if !(low < high) || !low.is_finite() || !high.is_finite() {
            Err(KMeansParamsError::CenterBox)
        } else {
            Ok(())
        }
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Where the engine takes its observations from on every (re)generation.
pub enum DataSource<F: Float> {
    /// Draw a fresh blob dataset with one blob per cluster
    Blobs(Blobs),
    /// Always use the same observations, with shape `(n_observations, n_features)`
    Fixed(Array2<F>),
}

impl<F: Float> Default for DataSource<F> {
    fn default() -> Self {
        DataSource::Blobs(Blobs::default())
    }
}

impl<F: Float> DataSource<F> {
    /// Dimensionality of the observations this source yields
    pub fn n_features(&self) -> usize {
        match self {
            DataSource::Blobs(blobs) => blobs.n_features,
            DataSource::Fixed(observations) => observations.ncols(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), KMeansParamsError> {
        match self {
            DataSource::Blobs(blobs) => blobs.check(),
            DataSource::Fixed(observations) if observations.nrows() == 0 => {
                Err(KMeansParamsError::NSamples)
            }
            DataSource::Fixed(observations) if observations.ncols() == 0 => {
                Err(KMeansParamsError::NFeatures)
            }
            DataSource::Fixed(_) => Ok(()),
        }
    }

    /// Produce a dataset for an engine looking for `n_clusters` clusters
    pub(crate) fn generate(
        &self,
        n_clusters: usize,
        rng: &mut impl Rng,
    ) -> Result<Array2<F>, KMeansError> {
        match self {
            DataSource::Blobs(blobs) => {
                let points = make_blobs(
                    blobs.n_samples,
                    n_clusters,
                    blobs.n_features,
                    blobs.cluster_std,
                    blobs.center_box,
                    rng,
                )?;
                Ok(points.mapv(|x| F::cast(x)))
            }
            DataSource::Fixed(observations) => Ok(observations.clone()),
        }
    }
}
