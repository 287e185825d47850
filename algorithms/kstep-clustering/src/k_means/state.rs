use kstep::Float;
use ndarray::{Array1, Array2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Label of an observation that has not been through an assignment step yet
pub const UNASSIGNED: isize = -1;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Owned snapshot of a [`KMeans`](crate::KMeans) engine, for consumption by a presentation
/// layer. Later steps never affect an exported snapshot.
pub struct KMeansState<F: Float> {
    /// The dataset, with shape `(n_observations, n_features)`
    pub points: Array2<F>,
    /// The centroids, with shape `(n_clusters, n_features)`, or `None` while unset
    pub centroids: Option<Array2<F>>,
    /// Cluster index of every observation, [`UNASSIGNED`] before the first step
    pub assignment: Array1<isize>,
    pub converged: bool,
}

impl<F: Float> KMeansState<F> {
    pub(crate) fn new(
        points: &Array2<F>,
        centroids: Option<&Array2<F>>,
        memberships: Option<&Array1<usize>>,
        converged: bool,
    ) -> Self {
        let assignment = match memberships {
            Some(memberships) => memberships.mapv(|m| m as isize),
            None => Array1::from_elem(points.nrows(), UNASSIGNED),
        };
        Self {
            points: points.clone(),
            centroids: centroids.cloned(),
            assignment,
            converged,
        }
    }

    /// Number of observations that went through an assignment step
    pub fn n_assigned(&self) -> usize {
        self.assignment.iter().filter(|&&m| m != UNASSIGNED).count()
    }
}
