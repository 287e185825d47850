use crate::{
    KMeans, KMeansError, KMeansInit, KMeansState, KMeansValidParams, ManualInit, ManualState,
    ManualSubmission,
};
use kstep::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1};
use ndarray_rand::rand::Rng;
use tracing::debug;

/// An engine paired with its manual-initialization coordinator, owned by one driving
/// context (typically one user session of an interactive front-end).
///
/// Every operation runs to completion before returning. Sharing a session between
/// threads requires external locking.
///
/// ```
/// use kstep_clustering::{KMeans, KMeansError, KMeansInit, KMeansSession, ManualSubmission};
/// use ndarray::array;
///
/// let params = KMeans::params(2).init_method(KMeansInit::Manual).check_unwrap();
/// let mut session = KMeansSession::new(params);
/// session.initialize().unwrap();
///
/// session.submit_manual_center(&array![-5., -5.]).unwrap();
/// assert!(matches!(
///     session.step(),
///     Err(KMeansError::InsufficientCenters { missing: 1 })
/// ));
///
/// let outcome = session.submit_manual_center(&array![5., 5.]).unwrap();
/// assert_eq!(outcome, ManualSubmission::Ready);
/// session.step().unwrap();
/// assert_eq!(session.export_state().n_assigned(), 500);
/// # use kstep::ParamGuard;
/// ```
#[derive(Clone, Debug)]
pub struct KMeansSession<F: Float, R: Rng> {
    engine: KMeans<F, R>,
    manual: ManualInit<F>,
}

impl<F: Float, R: Rng + Clone> KMeansSession<F, R> {
    pub fn new(params: KMeansValidParams<F, R>) -> Self {
        let manual = ManualInit::new(params.n_clusters());
        Self {
            engine: KMeans::new(params),
            manual,
        }
    }

    /// Generate a new dataset and start over. Pending manual candidates are dropped.
    pub fn initialize(&mut self) -> Result<(), KMeansError> {
        self.manual.reset();
        self.engine.initialize()
    }

    /// Offer one manual center. The centroid set is committed into the engine as soon as
    /// the last missing center arrives.
    ///
    /// Centers are only accepted once a dataset exists, with the dataset's dimensionality and
    /// finite coordinates.
    pub fn submit_manual_center(
        &mut self,
        center: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<ManualSubmission, KMeansError> {
        if self.engine.init_method() != KMeansInit::Manual {
            return Err(KMeansError::NotManual);
        }
        if !self.engine.is_initialized() {
            return Err(KMeansError::NotInitialized);
        }
        let expected = self.engine.n_features();
        if center.len() != expected {
            return Err(KMeansError::Dimensions {
                expected,
                found: center.len(),
            });
        }
        if !center.iter().all(|x| x.is_finite()) {
            return Err(KMeansError::NonFiniteCenter);
        }

        let outcome = self.manual.submit(center.to_owned());
        debug!("manual center submitted: {:?}", outcome);
        if outcome == ManualSubmission::Ready && self.engine.centroids().is_none() {
            self.manual.commit(&mut self.engine)?;
        }
        Ok(outcome)
    }

    /// Perform one k-means step. Fails with `InsufficientCenters` while manual centers are
    /// missing.
    pub fn step(&mut self) -> Result<(), KMeansError> {
        self.ensure_centroids()?;
        self.engine.step()
    }

    /// Step until convergence, performing at most `max_n_iterations` steps.
    pub fn run_to_convergence(&mut self, max_n_iterations: u64) -> Result<u64, KMeansError> {
        self.ensure_centroids()?;
        self.engine.run_to_convergence(max_n_iterations)
    }

    /// Start over, on the same dataset if `keep_dataset` is set. Pending manual candidates
    /// are dropped.
    pub fn reset(&mut self, keep_dataset: bool) -> Result<(), KMeansError> {
        self.manual.reset();
        self.engine.reset(keep_dataset)
    }

    /// Switch the initialization strategy and restart on the current dataset.
    ///
    /// Switching to [`KMeansInit::Manual`] also drops manual candidates and any centroid set,
    /// committed or seeded. Before the first [`initialize`](Self::initialize) the strategy is
    /// only recorded.
    pub fn set_init_method(&mut self, init: KMeansInit) -> Result<(), KMeansError> {
        self.engine.set_init_method(init);
        self.manual.reset();
        if !self.engine.is_initialized() {
            return Ok(());
        }
        self.engine.reset(true)
    }

    pub fn export_state(&self) -> KMeansState<F> {
        self.engine.export_state()
    }

    pub fn engine(&self) -> &KMeans<F, R> {
        &self.engine
    }

    /// Manual candidates gathered so far, for display before they are committed
    pub fn manual_candidates(&self) -> &[Array1<F>] {
        self.manual.candidates()
    }

    pub fn manual_state(&self) -> ManualState {
        self.manual.state()
    }

    fn ensure_centroids(&mut self) -> Result<(), KMeansError> {
        if !self.engine.is_initialized()
            || self.engine.centroids().is_some()
            || self.engine.init_method() != KMeansInit::Manual
        {
            return Ok(());
        }
        self.manual.commit(&mut self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNASSIGNED;
    use kstep::ParamGuard;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::Isaac64Rng;

    fn session(init: KMeansInit, n_clusters: usize) -> KMeansSession<f64, Isaac64Rng> {
        let params = KMeans::params_with_rng(n_clusters, Isaac64Rng::seed_from_u64(42))
            .init_method(init)
            .check()
            .unwrap();
        let mut session = KMeansSession::new(params);
        session.initialize().unwrap();
        session
    }

    #[test]
    fn manual_flow() {
        let mut session = session(KMeansInit::Manual, 2);
        assert_eq!(
            session.submit_manual_center(&array![-3., 0.]).unwrap(),
            ManualSubmission::StillCollecting { missing: 1 }
        );
        assert!(matches!(
            session.step(),
            Err(KMeansError::InsufficientCenters { missing: 1 })
        ));
        assert!(matches!(
            session.run_to_convergence(10),
            Err(KMeansError::InsufficientCenters { missing: 1 })
        ));
        assert!(session.engine().centroids().is_none());

        assert_eq!(
            session.submit_manual_center(&array![3., 0.]).unwrap(),
            ManualSubmission::Ready
        );
        assert_eq!(session.manual_state(), ManualState::Committed);
        assert_eq!(
            session.engine().centroids(),
            Some(&array![[-3., 0.], [3., 0.]])
        );

        session.step().unwrap();
        let state = session.export_state();
        assert!(state.assignment.iter().all(|&m| m == 0 || m == 1));
        assert_eq!(
            session.submit_manual_center(&array![0., 0.]).unwrap(),
            ManualSubmission::RejectedFull
        );
        session.run_to_convergence(1000).unwrap();
        assert!(session.export_state().converged);
    }

    #[test]
    fn submissions_are_validated() {
        let mut manual = session(KMeansInit::Manual, 2);
        assert!(matches!(
            manual.submit_manual_center(&array![1., 2., 3.]),
            Err(KMeansError::Dimensions {
                expected: 2,
                found: 3
            })
        ));
        assert!(manual.manual_candidates().is_empty());

        let mut random = session(KMeansInit::Random, 2);
        assert!(matches!(
            random.submit_manual_center(&array![1., 2.]),
            Err(KMeansError::NotManual)
        ));
    }

    #[test]
    fn non_finite_centers_are_rejected() {
        let mut session = session(KMeansInit::Manual, 2);
        for bad in [array![f64::NAN, f64::NAN], array![0., f64::INFINITY]].iter() {
            assert!(matches!(
                session.submit_manual_center(bad),
                Err(KMeansError::NonFiniteCenter)
            ));
        }
        assert!(session.manual_candidates().is_empty());

        session.submit_manual_center(&array![-5., -5.]).unwrap();
        session.submit_manual_center(&array![5., 5.]).unwrap();
        session.step().unwrap();
        let state = session.export_state();
        assert!(state.centroids.unwrap().iter().all(|x| x.is_finite()));
        assert!(state.assignment.iter().all(|&m| m == 0 || m == 1));
    }

    #[test]
    fn nothing_is_accepted_before_initialize() {
        let params = KMeans::<f64, _>::params(2)
            .init_method(KMeansInit::Manual)
            .check()
            .unwrap();
        let mut session = KMeansSession::new(params);
        assert!(matches!(
            session.submit_manual_center(&array![0., 0.]),
            Err(KMeansError::NotInitialized)
        ));
        assert!(session.manual_candidates().is_empty());
        assert!(matches!(session.step(), Err(KMeansError::NotInitialized)));
        assert!(!session.export_state().converged);

        session.initialize().unwrap();
        assert_eq!(
            session.submit_manual_center(&array![0., 0.]).unwrap(),
            ManualSubmission::StillCollecting { missing: 1 }
        );
    }

    #[test]
    fn reset_drops_manual_progress() {
        let mut session = session(KMeansInit::Manual, 2);
        session.submit_manual_center(&array![0., 0.]).unwrap();
        session.submit_manual_center(&array![1., 1.]).unwrap();
        session.step().unwrap();
        let points = session.export_state().points;

        session.reset(true).unwrap();
        let state = session.export_state();
        assert_eq!(state.points, points);
        assert!(state.centroids.is_none());
        assert!(state.assignment.iter().all(|&m| m == UNASSIGNED));
        assert!(session.manual_candidates().is_empty());
        assert_eq!(session.manual_state(), ManualState::Collecting);

        session.submit_manual_center(&array![0., 0.]).unwrap();
        session.reset(false).unwrap();
        assert_ne!(session.export_state().points, points);
        assert!(session.manual_candidates().is_empty());
    }

    #[test]
    fn initialize_drops_manual_progress() {
        let mut session = session(KMeansInit::Manual, 3);
        session.submit_manual_center(&array![0., 0.]).unwrap();
        session.initialize().unwrap();
        assert!(session.manual_candidates().is_empty());
        assert!(session.export_state().centroids.is_none());
    }

    #[test]
    fn switching_init_method() {
        let mut session = session(KMeansInit::KMeansPlusPlus, 3);
        session.step().unwrap();
        let points = session.export_state().points;

        session.set_init_method(KMeansInit::Manual).unwrap();
        let state = session.export_state();
        assert_eq!(state.points, points);
        assert!(state.centroids.is_none());
        assert_eq!(state.n_assigned(), 0);
        assert!(session.step().is_err());

        session.submit_manual_center(&array![0., 0.]).unwrap();
        session.set_init_method(KMeansInit::FarthestFirst).unwrap();
        assert!(session.manual_candidates().is_empty());
        assert_eq!(session.export_state().points, points);
        assert_eq!(session.engine().centroids().unwrap().nrows(), 3);
        session.run_to_convergence(1000).unwrap();
    }

    #[test]
    fn switching_before_initialize_only_records_the_method() {
        let params = KMeans::<f64, _>::params(2).check().unwrap();
        let mut session = KMeansSession::new(params);
        session.set_init_method(KMeansInit::Manual).unwrap();
        assert_eq!(session.engine().init_method(), KMeansInit::Manual);
        assert_eq!(session.export_state().points.nrows(), 0);
        session.initialize().unwrap();
        assert!(session.engine().centroids().is_none());
    }
}
