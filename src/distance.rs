//! Euclidean distance between points.
use ndarray::ArrayView1;
use ndarray_stats::DeviationExt;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::Float;

/// A single observation, borrowed as a row of the dataset
pub type Point<'a, F> = ArrayView1<'a, F>;

pub trait Distance<F: Float> {
    // Panics if a and b are not of equal dimension
    fn distance(&self, a: Point<F>, b: Point<F>) -> F;

    // Fast distance metric that keeps the order of the distance function
    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        self.distance(a, b)
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist
    }
}

/// Euclidean distance. `rdistance` is the squared distance.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    fn distance(&self, a: Point<F>, b: Point<F>) -> F {
        self.rdist_to_dist(self.rdistance(a, b))
    }

    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        a.sq_l2_dist(&b)
            .expect("points must have the same number of coordinates")
    }

    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.sqrt()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    use super::*;

    #[test]
    fn l2_dist() {
        let a = arr1(&[0.5, 6.6]);
        let b = arr1(&[4.4, 3.0]);
        let ab = L2Dist.distance(a.view(), b.view());
        assert_abs_diff_eq!(ab, 5.3075, epsilon = 1e-3);
        assert_abs_diff_eq!(L2Dist.rdistance(a.view(), b.view()), 28.17, epsilon = 1e-9);
        assert_abs_diff_eq!(L2Dist.rdist_to_dist(28.17), ab, epsilon = 1e-9);

        let a = arr1(&[f64::INFINITY, 6.6]);
        let b = arr1(&[4.4, f64::NEG_INFINITY]);
        assert!(L2Dist.distance(a.view(), b.view()).is_infinite());

        // Triangle equality
        let a = arr1(&[0.5, 6.6]);
        let b = arr1(&[4.4, 3.0]);
        let c = arr1(&[-4.5, 3.3]);
        let ab = L2Dist.distance(a.view(), b.view());
        let bc = L2Dist.distance(b.view(), c.view());
        let ac = L2Dist.distance(a.view(), c.view());
        assert!(ab + bc > ac)
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = arr1(&[-1.25f32, 7.5]);
        assert_eq!(L2Dist.distance(a.view(), a.view()), 0.0);
    }

    #[test]
    #[should_panic]
    fn dimension_mismatch_panics() {
        let a = arr1(&[1.0, 2.0]);
        let b = arr1(&[1.0, 2.0, 3.0]);
        L2Dist.distance(a.view(), b.view());
    }
}
