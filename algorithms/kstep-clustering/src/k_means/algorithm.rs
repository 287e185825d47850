use crate::k_means::{KMeansParams, KMeansValidParams};
use crate::{KMeansError, KMeansInit, KMeansParamsError, KMeansState};
use kstep::{Distance, Float, L2Dist};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, DataMut, Ix1, Ix2, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;
use tracing::{debug, info};

#[derive(Clone, Debug)]
/// K-means clustering partitions a set of observations into clusters, where each
/// observation belongs to the cluster with the nearest mean.
///
/// The mean of the points within a cluster is called *centroid*.
///
/// `KMeans` is an engine meant to be driven from the outside: rather than fitting a model
/// in one call, it exposes every phase of the standard algorithm (also known as Lloyd's
/// Algorithm) so that an interactive front-end can animate convergence or pause it.
///
/// ## Lifecycle
///
/// - creation: an engine is built from [`KMeansParams`], it holds no data yet;
/// - [`initialize`](KMeans::initialize): (re)generates the dataset, forgets every previous
///   result and seeds the centroids with the configured [`KMeansInit`] strategy. With
///   [`KMeansInit::Manual`] the centroid set stays unset until the caller commits one with
///   [`commit_centroids`](KMeans::commit_centroids) (usually through a
///   [`KMeansSession`](crate::KMeansSession));
/// - [`step`](KMeans::step): one assignment step followed by one update step;
/// - [`run_to_convergence`](KMeans::run_to_convergence): steps until convergence, with an
///   iteration cap;
/// - [`reset`](KMeans::reset): starts over, with the same dataset or a new one.
///
/// ## Step
///
/// - assignment: every observation joins the cluster of its nearest centroid, ties going
///   to the lowest centroid index;
/// - update: every centroid moves to the mean of its observations. A centroid without
///   observations keeps its position.
///
/// The engine is converged when an update moves no centroid coordinate by more than
/// `tolerance`. Further steps are no-ops until the engine is reinitialized.
///
/// ## Tutorial
///
/// ```
/// use kstep_clustering::{KMeans, KMeansInit};
///
/// let mut engine = KMeans::<f64, _>::params(3)
///     .init_method(KMeansInit::FarthestFirst)
///     .build()
///     .expect("valid hyperparameters");
///
/// // 500 points in three blobs, and three centroids picked among them
/// engine.initialize().expect("k is smaller than the dataset");
/// assert_eq!(engine.centroids().map(|c| c.nrows()), Some(3));
/// assert!(engine.memberships().is_none());
///
/// // One step at a time...
/// engine.step().unwrap();
/// assert_eq!(engine.memberships().map(|m| m.len()), Some(500));
///
/// // ...or all the way
/// engine.run_to_convergence(1000).unwrap();
/// assert!(engine.is_converged());
///
/// // The snapshot is what a plotting front-end consumes
/// let state = engine.export_state();
/// assert!(state.assignment.iter().all(|&label| (0..3).contains(&label)));
/// ```
pub struct KMeans<F: Float, R: Rng> {
    params: KMeansValidParams<F, R>,
    rng: R,
    dist_fn: L2Dist,
    initialized: bool,
    observations: Array2<F>,
    centroids: Option<Array2<F>>,
    memberships: Option<Array1<usize>>,
    converged: bool,
    n_iterations: u64,
}

impl<F: Float> KMeans<F, Isaac64Rng> {
    pub fn params(nclusters: usize) -> KMeansParams<F, Isaac64Rng> {
        KMeansParams::new(nclusters, Isaac64Rng::seed_from_u64(42))
    }
}

impl<F: Float, R: Rng> KMeans<F, R> {
    pub fn params_with_rng(nclusters: usize, rng: R) -> KMeansParams<F, R> {
        KMeansParams::new(nclusters, rng)
    }
}

impl<F: Float, R: Rng + Clone> KMeans<F, R> {
    /// Create an engine without any data. Call [`initialize`](KMeans::initialize) next.
    pub fn new(params: KMeansValidParams<F, R>) -> Self {
        let n_features = params.data_source().n_features();
        Self {
            rng: params.rng().clone(),
            params,
            dist_fn: L2Dist,
            initialized: false,
            observations: Array2::zeros((0, n_features)),
            centroids: None,
            memberships: None,
            converged: false,
            n_iterations: 0,
        }
    }

    /// Generate a new dataset, forget every result and seed the centroids.
    ///
    /// Fails with an invalid configuration if `n_clusters` exceeds the number of
    /// observations of an algorithmically seeded engine. The new dataset is kept in that
    /// case and the centroid set stays unset.
    pub fn initialize(&mut self) -> Result<(), KMeansError> {
        let observations = self
            .params
            .data_source()
            .generate(self.params.n_clusters(), &mut self.rng)?;
        self.observations = observations;
        self.initialized = true;
        self.clear();
        self.seed()
    }

    /// Start over. With `keep_dataset` the current observations are clustered again from
    /// scratch; otherwise a new dataset is generated first.
    ///
    /// Assignment, convergence and centroids are cleared. Algorithmic init methods then
    /// seed a fresh centroid set, the manual method leaves it unset.
    pub fn reset(&mut self, keep_dataset: bool) -> Result<(), KMeansError> {
        if !keep_dataset || !self.initialized {
            return self.initialize();
        }
        self.clear();
        self.seed()
    }

    /// Perform one assignment step and one update step.
    ///
    /// No-op once converged. Leaves the state untouched if the centroid set is unset, failing
    /// with `InsufficientCenters` while manual centers are awaited and with `NotInitialized`
    /// otherwise.
    pub fn step(&mut self) -> Result<(), KMeansError> {
        if self.converged {
            return Ok(());
        }
        let centroids = match &self.centroids {
            Some(centroids) => centroids,
            None if self.initialized && self.init_method() == KMeansInit::Manual => {
                return Err(KMeansError::InsufficientCenters {
                    missing: self.n_clusters(),
                })
            }
            None => return Err(KMeansError::NotInitialized),
        };

        let mut memberships = Array1::zeros(self.observations.nrows());
        update_cluster_memberships(
            &self.dist_fn,
            centroids,
            &self.observations,
            &mut memberships,
        );
        let new_centroids = compute_centroids(centroids, &self.observations, &memberships);
        let delta = max_coordinate_delta(centroids, &new_centroids);

        self.n_iterations += 1;
        self.converged = delta <= self.params.tolerance();
        debug!(
            "k-means step {}: largest centroid shift {}",
            self.n_iterations, delta
        );
        if self.converged {
            info!("k-means converged after {} steps", self.n_iterations);
        }
        self.centroids = Some(new_centroids);
        self.memberships = Some(memberships);
        Ok(())
    }

    /// Step until convergence, performing at most `max_n_iterations` steps. Returns the
    /// number of steps performed, `0` if the engine was already converged.
    pub fn run_to_convergence(&mut self, max_n_iterations: u64) -> Result<u64, KMeansError> {
        if max_n_iterations == 0 {
            return Err(KMeansParamsError::MaxIterations.into());
        }
        let mut n_steps = 0;
        while !self.converged {
            if n_steps == max_n_iterations {
                return Err(KMeansError::NonConvergence { max_n_iterations });
            }
            self.step()?;
            n_steps += 1;
        }
        Ok(n_steps)
    }

    /// Install an externally chosen centroid set, with shape `(n_clusters, n_features)`.
    ///
    /// Only allowed once a dataset exists and while the centroid set is unset, i.e. with the
    /// manual init method. Every coordinate must be finite.
    pub fn commit_centroids(&mut self, centroids: Array2<F>) -> Result<(), KMeansError> {
        if !self.initialized {
            return Err(KMeansError::NotInitialized);
        }
        if self.centroids.is_some() {
            return Err(KMeansError::CentroidsAlreadySet);
        }
        let expected = (self.n_clusters(), self.n_features());
        if centroids.dim() != expected {
            return Err(KMeansError::CentroidShape {
                expected,
                found: centroids.dim(),
            });
        }
        if !centroids.iter().all(|x| x.is_finite()) {
            return Err(KMeansError::NonFiniteCenter);
        }
        info!("committed {} manual centroids", expected.0);
        self.centroids = Some(centroids);
        Ok(())
    }

    /// Change the initialization strategy. It is used from the next
    /// [`initialize`](KMeans::initialize) or [`reset`](KMeans::reset) on.
    pub fn set_init_method(&mut self, init: KMeansInit) {
        self.params.set_init_method(init);
    }

    /// Immutable snapshot of the dataset, centroids, assignment and convergence flag
    pub fn export_state(&self) -> KMeansState<F> {
        KMeansState::new(
            &self.observations,
            self.centroids.as_ref(),
            self.memberships.as_ref(),
            self.converged,
        )
    }

    fn clear(&mut self) {
        self.centroids = None;
        self.memberships = None;
        self.converged = false;
        self.n_iterations = 0;
    }

    fn seed(&mut self) -> Result<(), KMeansError> {
        let init = self.params.init_method();
        if init == KMeansInit::Manual {
            return Ok(());
        }
        let (n_clusters, n_samples) = (self.n_clusters(), self.observations.nrows());
        if n_clusters > n_samples {
            return Err(KMeansParamsError::TooManyClusters {
                n_clusters,
                n_samples,
            }
            .into());
        }
        self.centroids = init.run(
            &self.dist_fn,
            n_clusters,
            self.observations.view(),
            &mut self.rng,
        );
        info!(
            "seeded {} centroids with {} over {} observations",
            n_clusters, init, n_samples
        );
        Ok(())
    }
}

impl<F: Float, R: Rng> KMeans<F, R> {
    /// Whether a dataset has been generated
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The number of clusters the engine is looking for
    pub fn n_clusters(&self) -> usize {
        self.params.n_clusters()
    }

    /// Dimensionality of the observations
    pub fn n_features(&self) -> usize {
        self.observations.ncols()
    }

    /// The current initialization strategy
    pub fn init_method(&self) -> KMeansInit {
        self.params.init_method()
    }

    /// Largest centroid coordinate shift still considered a fixpoint
    pub fn tolerance(&self) -> F {
        self.params.tolerance()
    }

    /// The dataset, with shape `(n_observations, n_features)`. Empty before the first
    /// [`initialize`](KMeans::initialize).
    pub fn observations(&self) -> &Array2<F> {
        &self.observations
    }

    /// The current centroids, with shape `(n_clusters, n_features)`, if set
    pub fn centroids(&self) -> Option<&Array2<F>> {
        self.centroids.as_ref()
    }

    /// The index of the cluster of every observation, once a step has run
    pub fn memberships(&self) -> Option<&Array1<usize>> {
        self.memberships.as_ref()
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Number of steps performed since the centroids were last seeded
    pub fn n_iterations(&self) -> u64 {
        self.n_iterations
    }

    /// Sum of the squared distances between each observation and its closest centroid,
    /// if the centroid set is set
    pub fn inertia(&self) -> Option<F> {
        self.centroids.as_ref().map(|centroids| {
            let mut dists = Array1::zeros(self.observations.nrows());
            update_min_dists(&self.dist_fn, centroids, &self.observations, &mut dists);
            dists.sum()
        })
    }
}

/// K-means is an iterative algorithm.
/// We will perform the assignment and update steps until we are satisfied
/// (according to our convergence criteria).
///
/// `compute_centroids` returns a 2-dimensional array,
/// where the i-th row corresponds to the i-th cluster.
/// Clusters without any observation keep their old centroid.
pub(crate) fn compute_centroids<F: Float>(
    old_centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_observations, n_features)
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_observations,)
    cluster_memberships: &ArrayBase<impl Data<Elem = usize>, Ix1>,
) -> Array2<F> {
    let n_clusters = old_centroids.nrows();
    let mut counts: Array1<usize> = Array1::zeros(n_clusters);
    let mut centroids = Array2::zeros((n_clusters, observations.ncols()));

    Zip::from(observations.rows())
        .and(cluster_memberships)
        .for_each(|observation, &cluster_membership| {
            let mut centroid = centroids.row_mut(cluster_membership);
            centroid += &observation;
            counts[cluster_membership] += 1;
        });

    Zip::from(centroids.rows_mut())
        .and(old_centroids.rows())
        .and(&counts)
        .for_each(|mut centroid, old_centroid, &cnt| {
            if cnt == 0 {
                centroid.assign(&old_centroid);
            } else {
                centroid /= F::cast(cnt);
            }
        });
    centroids
}

/// Largest absolute difference between matching coordinates of two centroid sets.
/// NaN as soon as any difference is NaN, so it never passes a tolerance check.
pub(crate) fn max_coordinate_delta<F: Float>(
    old_centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    new_centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> F {
    Zip::from(old_centroids)
        .and(new_centroids)
        .fold(F::zero(), |acc, &old, &new| {
            let delta = (new - old).abs();
            if !acc.is_nan() && (delta.is_nan() || delta > acc) {
                delta
            } else {
                acc
            }
        })
}

// Update `cluster_memberships` with the index of the cluster each observation belongs to.
pub(crate) fn update_cluster_memberships<F: Float, D: Distance<F>>(
    dist_fn: &D,
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
    cluster_memberships: &mut ArrayBase<impl DataMut<Elem = usize>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(cluster_memberships)
        .for_each(|observation, cluster_membership| {
            *cluster_membership = closest_centroid(dist_fn, centroids, &observation).0
        });
}

// Updates `dists` with the squared distance of each observation from its closest centroid.
pub(crate) fn update_min_dists<F: Float, D: Distance<F>>(
    dist_fn: &D,
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
    dists: &mut ArrayBase<impl DataMut<Elem = F>, Ix1>,
) {
    Zip::from(observations.axis_iter(Axis(0)))
        .and(dists)
        .for_each(|observation, dist| {
            *dist = closest_centroid(dist_fn, centroids, &observation).1
        });
}

/// Given a matrix of centroids with shape (n_centroids, n_features) and an observation,
/// return the index of the closest centroid (the index of the corresponding row in `centroids`)
/// and its squared distance. Ties go to the lowest index.
pub(crate) fn closest_centroid<F: Float, D: Distance<F>>(
    dist_fn: &D,
    // (n_centroids, n_features)
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_features)
    observation: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> (usize, F) {
    let first_centroid = centroids.row(0);
    let (mut closest_index, mut minimum_distance) = (
        0,
        dist_fn.rdistance(first_centroid.view(), observation.view()),
    );

    for (centroid_index, centroid) in centroids.rows().into_iter().enumerate().skip(1) {
        let distance = dist_fn.rdistance(centroid.view(), observation.view());
        if distance < minimum_distance {
            closest_index = centroid_index;
            minimum_distance = distance;
        }
    }
    (closest_index, minimum_distance)
}
