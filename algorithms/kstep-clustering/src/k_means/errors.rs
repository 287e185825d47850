use thiserror::Error;

/// An error when building or initializing with an invalid hyperparameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansParamsError {
    #[error("n_clusters cannot be 0")]
    NClusters,
    #[error("tolerance must be a non-negative number")]
    Tolerance,
    #[error("the data source must provide at least one observation")]
    NSamples,
    #[error("the data source must provide at least one feature")]
    NFeatures,
    #[error("cluster_std must be greater than 0")]
    ClusterStd,
    #[error("center_box must be a non-empty, finite interval")]
    CenterBox,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("n_clusters ({n_clusters}) cannot exceed the number of observations ({n_samples})")]
    TooManyClusters { n_clusters: usize, n_samples: usize },
    #[error("unknown init method `{0}`, expected one of random, farthest, kmeans++, manual")]
    UnknownInit(String),
}

/// An error when driving a KMeans engine
#[derive(Error, Debug)]
pub enum KMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] KMeansParamsError),
    /// When stepping before every manual center has been supplied. Recoverable by submitting
    /// `missing` more centers.
    #[error("Select {missing} more center(s) before stepping")]
    InsufficientCenters { missing: usize },
    /// When `run_to_convergence` exhausts its iteration cap
    #[error("Did not converge within {max_n_iterations} iterations")]
    NonConvergence { max_n_iterations: u64 },
    /// When a manual center is submitted while another init method is selected
    #[error("Centers can only be submitted with the manual init method")]
    NotManual,
    /// When stepping, or supplying centers, before a dataset was generated, or after
    /// an initialization that failed to seed the centroids
    #[error("The engine has no dataset or no seeded centroids, call initialize first")]
    NotInitialized,
    /// When a center has a NaN or infinite coordinate
    #[error("Center coordinates must be finite")]
    NonFiniteCenter,
    /// When a point does not have the dimensionality of the dataset
    #[error("Expected a point with {expected} coordinates, got {found}")]
    Dimensions { expected: usize, found: usize },
    /// When committed centroids do not have shape `(n_clusters, n_features)`
    #[error("Expected centroids of shape {expected:?}, got {found:?}")]
    CentroidShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// When committing centroids into an engine that already has a centroid set
    #[error("The centroid set is already initialized")]
    CentroidsAlreadySet,
    #[error(transparent)]
    KStepError(#[from] kstep::error::Error),
}
