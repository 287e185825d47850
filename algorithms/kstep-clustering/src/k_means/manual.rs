use crate::{KMeans, KMeansError};
use kstep::Float;
use ndarray::{stack, Array1, ArrayView1, Axis};
use ndarray_rand::rand::Rng;

/// Progress of a manual centroid selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManualState {
    /// Fewer than `n_clusters` candidates so far
    Collecting,
    /// Exactly `n_clusters` candidates, not yet pushed into the engine
    Ready,
    /// The candidates are the engine's centroid set
    Committed,
}

/// Outcome of submitting one candidate center
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManualSubmission {
    /// The candidate was accepted, `missing` more are needed
    StillCollecting { missing: usize },
    /// The candidate was accepted and completed the set
    Ready,
    /// The set was already complete, the candidate was dropped
    RejectedFull,
}

/// Accumulates externally chosen centers, one at a time, until `n_clusters` of them are
/// gathered, then commits them as the centroid set of a [`KMeans`] engine, in arrival order.
///
/// ```
/// use kstep_clustering::{KMeans, KMeansInit, ManualInit, ManualState, ManualSubmission};
/// use ndarray::array;
///
/// let mut engine = KMeans::params(2)
///     .init_method(KMeansInit::Manual)
///     .observations(array![[0., 0.], [0., 1.], [5., 5.], [5., 6.]])
///     .build()
///     .unwrap();
/// engine.initialize().unwrap();
///
/// let mut manual = ManualInit::new(2);
/// assert_eq!(
///     manual.submit(array![0., 0.]),
///     ManualSubmission::StillCollecting { missing: 1 }
/// );
/// assert_eq!(manual.submit(array![5., 5.]), ManualSubmission::Ready);
/// manual.commit(&mut engine).unwrap();
/// assert_eq!(manual.state(), ManualState::Committed);
/// assert_eq!(engine.centroids(), Some(&array![[0., 0.], [5., 5.]]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ManualInit<F: Float> {
    n_clusters: usize,
    candidates: Vec<Array1<F>>,
    committed: bool,
}

impl<F: Float> ManualInit<F> {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            candidates: Vec::with_capacity(n_clusters),
            committed: false,
        }
    }

    pub fn state(&self) -> ManualState {
        if self.committed {
            ManualState::Committed
        } else if self.candidates.len() < self.n_clusters {
            ManualState::Collecting
        } else {
            ManualState::Ready
        }
    }

    /// Candidates gathered so far, in arrival order
    pub fn candidates(&self) -> &[Array1<F>] {
        &self.candidates
    }

    /// How many more candidates are needed
    pub fn missing(&self) -> usize {
        self.n_clusters - self.candidates.len()
    }

    /// Append one candidate if the set is not complete yet
    pub fn submit(&mut self, center: Array1<F>) -> ManualSubmission {
        if self.candidates.len() == self.n_clusters {
            return ManualSubmission::RejectedFull;
        }
        self.candidates.push(center);
        match self.missing() {
            0 => ManualSubmission::Ready,
            missing => ManualSubmission::StillCollecting { missing },
        }
    }

    /// Copy the candidates into `engine` as its centroid set.
    ///
    /// Happens at most once: committing again is a no-op. Fails with `InsufficientCenters`
    /// while candidates are missing, and with the engine's error if it rejects the set.
    pub fn commit<R: Rng + Clone>(&mut self, engine: &mut KMeans<F, R>) -> Result<(), KMeansError> {
        match self.state() {
            ManualState::Committed => Ok(()),
            ManualState::Collecting => Err(KMeansError::InsufficientCenters {
                missing: self.missing(),
            }),
            ManualState::Ready => {
                let views: Vec<ArrayView1<F>> = self.candidates.iter().map(|c| c.view()).collect();
                let centroids = stack(Axis(0), &views).map_err(kstep::error::Error::from)?;
                engine.commit_centroids(centroids)?;
                self.committed = true;
                Ok(())
            }
        }
    }

    /// Forget every candidate and start collecting again
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.committed = false;
    }
}
