use std::fmt;
use std::str::FromStr;

use super::algorithm::update_min_dists;
use crate::KMeansParamsError;
use kstep::{Distance, Float};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix1};
use ndarray_rand::rand;
use ndarray_rand::rand::distributions::{Distribution, WeightedIndex};
use ndarray_rand::rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use tracing::warn;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Specifies centroid initialization algorithm for KMeans.
pub enum KMeansInit {
    /// Pick random points as centroids, without replacement.
    Random,
    /// Start from a random point, then repeatedly pick the point farthest from every
    /// centroid chosen so far. Ties go to the point stored first.
    FarthestFirst,
    /// K-means++ algorithm. Start from a random point, then sample each following centroid
    /// with probability proportional to its squared distance from the closest centroid
    /// chosen so far.
    KMeansPlusPlus,
    /// Centroids are supplied one at a time by the caller, see
    /// [`ManualInit`](crate::ManualInit).
    Manual,
}

impl KMeansInit {
    /// Runs the chosen initialization routine. Returns `None` for [`KMeansInit::Manual`],
    /// which produces no centroids by itself.
    ///
    /// `n_clusters` must not exceed the number of observations.
    pub(crate) fn run<F: Float, D: Distance<F>>(
        &self,
        dist_fn: &D,
        n_clusters: usize,
        observations: ArrayView2<F>,
        rng: &mut impl Rng,
    ) -> Option<Array2<F>> {
        match self {
            Self::Random => Some(random_init(n_clusters, observations, rng)),
            Self::FarthestFirst => Some(farthest_first(dist_fn, n_clusters, observations, rng)),
            Self::KMeansPlusPlus => Some(k_means_pp(dist_fn, n_clusters, observations, rng)),
            Self::Manual => None,
        }
    }
}

impl fmt::Display for KMeansInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Random => "random",
            Self::FarthestFirst => "farthest",
            Self::KMeansPlusPlus => "kmeans++",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl FromStr for KMeansInit {
    type Err = KMeansParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "farthest" | "farthest-first" | "farthest_first" => Ok(Self::FarthestFirst),
            "kmeans++" | "k-means++" | "kmeanspp" => Ok(Self::KMeansPlusPlus),
            "manual" => Ok(Self::Manual),
            _ => Err(KMeansParamsError::UnknownInit(s.to_string())),
        }
    }
}

/// Pick random points from the input matrix as centroids
fn random_init<F: Float>(
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, _) = observations.dim();
    let indices = rand::seq::index::sample(rng, n_samples, n_clusters).into_vec();
    observations.select(Axis(0), &indices)
}

/// Greedy farthest-first traversal: each new centroid is the observation whose squared
/// distance to its closest centroid so far is the largest.
fn farthest_first<F: Float, D: Distance<F>>(
    dist_fn: &D,
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));
    let n = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(n));

    let mut dists = Array1::zeros(n_samples);
    for c_cnt in 1..n_clusters {
        update_min_dists(
            dist_fn,
            &centroids.slice(s![0..c_cnt, ..]),
            &observations,
            &mut dists,
        );
        let centroid_idx = first_argmax(&dists);
        centroids
            .row_mut(c_cnt)
            .assign(&observations.row(centroid_idx));
    }
    centroids
}

fn k_means_pp<F: Float, D: Distance<F>>(
    dist_fn: &D,
    n_clusters: usize,
    observations: ArrayView2<F>,
    rng: &mut impl Rng,
) -> Array2<F> {
    let (n_samples, n_features) = observations.dim();
    let mut centroids = Array2::zeros((n_clusters, n_features));
    let n = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&observations.row(n));

    let mut dists = Array1::zeros(n_samples);
    for c_cnt in 1..n_clusters {
        update_min_dists(
            dist_fn,
            &centroids.slice(s![0..c_cnt, ..]),
            &observations,
            &mut dists,
        );
        // Points sitting on a centroid have weight 0. If every point does, the remaining
        // centroids can only repeat existing positions.
        let centroid_idx = match WeightedIndex::new(dists.iter()) {
            Ok(weights) => weights.sample(rng),
            Err(err) => {
                warn!(
                    "k-means++ weights are degenerate ({}), picking centroid {} uniformly",
                    err, c_cnt
                );
                rng.gen_range(0..n_samples)
            }
        };
        centroids
            .row_mut(c_cnt)
            .assign(&observations.row(centroid_idx));
    }
    centroids
}

/// Index of the largest value, the first one on ties
fn first_argmax<F: Float>(values: &ArrayBase<impl Data<Elem = F>, Ix1>) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kstep::L2Dist;
    use kstep_datasets::generate::blobs;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_isaac::Isaac64Rng;
    use std::collections::HashSet;

    const ALGORITHMIC: [KMeansInit; 3] = [
        KMeansInit::Random,
        KMeansInit::FarthestFirst,
        KMeansInit::KMeansPlusPlus,
    ];

    fn row_set(centroids: &Array2<f64>) -> HashSet<Vec<u64>> {
        centroids
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|x| x.to_bits()).collect())
            .collect()
    }

    #[test]
    fn manual_produces_no_centroids() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let obs = array![[0., 0.], [1., 1.]];
        assert!(KMeansInit::Manual
            .run(&L2Dist, 2, obs.view(), &mut rng)
            .is_none());
    }

    #[test]
    fn every_method_yields_k_dataset_points() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let obs = Array::random_using((200, 2), Uniform::new(-5., 5.), &mut rng);
        let dataset_rows = row_set(&obs);
        for init in ALGORITHMIC.iter() {
            for k in 1..8 {
                let centroids = init.run(&L2Dist, k, obs.view(), &mut rng).unwrap();
                assert_eq!(centroids.dim(), (k, 2));
                // Continuous random data: no duplicate points, so the seeds are distinct
                let seeds = row_set(&centroids);
                assert_eq!(seeds.len(), k);
                assert!(seeds.is_subset(&dataset_rows));
            }
        }
    }

    #[test]
    fn k_equal_to_n_takes_every_point() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let obs = array![[0., 0.], [3., 0.], [0., 4.], [10., 10.]];
        for init in ALGORITHMIC.iter() {
            let centroids = init.run(&L2Dist, 4, obs.view(), &mut rng).unwrap();
            assert_eq!(row_set(&centroids), row_set(&obs));
        }
    }

    #[test]
    fn farthest_first_picks_the_farthest_point() {
        let obs = array![[0., 0.], [1., 0.], [2., 0.], [10., 0.], [-4., 0.]];
        for seed in 0..20 {
            let mut rng = Isaac64Rng::seed_from_u64(seed);
            let centroids = farthest_first(&L2Dist, 3, obs.view(), &mut rng);
            // Whatever the seed, the two extremes are part of the three centers
            let picked = row_set(&centroids);
            assert!(picked.contains(&vec![10f64.to_bits(), 0f64.to_bits()]));
            assert!(picked.contains(&vec![(-4f64).to_bits(), 0f64.to_bits()]));
        }
    }

    #[test]
    fn farthest_first_breaks_ties_by_storage_order() {
        // Both [-1, 0] and [1, 0] are at distance 1 from the origin
        let obs = array![[0., 0.], [-1., 0.], [1., 0.]];
        let mut rng = Isaac64Rng::seed_from_u64(1);
        loop {
            let centroids = farthest_first(&L2Dist, 2, obs.view(), &mut rng);
            if centroids.row(0) == obs.row(0) {
                assert_abs_diff_eq!(centroids.row(1), obs.row(1));
                break;
            }
        }
    }

    #[test]
    fn k_means_pp_never_repeats_a_seed_when_points_are_distinct() {
        // Points coinciding with a chosen centroid have zero weight
        let obs = array![[0., 0.], [0., 0.1], [50., 50.], [50., 50.1]];
        for seed in 0..50 {
            let mut rng = Isaac64Rng::seed_from_u64(seed);
            let centroids = k_means_pp(&L2Dist, 4, obs.view(), &mut rng);
            assert_eq!(row_set(&centroids).len(), 4);
        }
    }

    #[test]
    fn k_means_pp_survives_duplicate_only_datasets() {
        let obs = array![[1., 1.], [1., 1.], [1., 1.]];
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let centroids = k_means_pp(&L2Dist, 3, obs.view(), &mut rng);
        assert_eq!(centroids, array![[1., 1.], [1., 1.], [1., 1.]]);
    }

    #[test]
    fn k_means_pp_spreads_over_blobs() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let expected = array![[-100., -100.], [0., 0.], [100., 100.]];
        let obs = blobs(100, &expected, &mut rng);
        let centroids = k_means_pp(&L2Dist, 3, obs.view(), &mut rng);
        // Each blob receives exactly one seed
        let mut hits = [0; 3];
        for centroid in centroids.rows() {
            let blob = (0..3)
                .min_by(|&a, &b| {
                    let da = L2Dist.rdistance(centroid, expected.row(a));
                    let db = L2Dist.rdistance(centroid, expected.row(b));
                    da.partial_cmp(&db).unwrap()
                })
                .unwrap();
            hits[blob] += 1;
        }
        assert_eq!(hits, [1, 1, 1]);
    }

    #[test]
    fn parse_and_display() {
        for init in ALGORITHMIC.iter().chain(std::iter::once(&KMeansInit::Manual)) {
            assert_eq!(init.to_string().parse::<KMeansInit>().unwrap(), *init);
        }
        assert_eq!(
            "K-Means++".parse::<KMeansInit>().unwrap(),
            KMeansInit::KMeansPlusPlus
        );
        assert_eq!(
            "sideways".parse::<KMeansInit>(),
            Err(KMeansParamsError::UnknownInit("sideways".to_string()))
        );
    }
}
