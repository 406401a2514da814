//! Distance metrics.
//!
//! Every metric is built from per-axis differences, and on wrapped axes a
//! difference takes the shorter way round.
//!
//! | Metric | Distance |
//! |---|---|
//! | `Euclidean` | `sqrt(sum dx^2)` |
//! | `WeightedEuclidean(w)` | `sqrt(sum w[d] * dx^2)` |
//! | `Manhattan` | `sum abs(dx)` |

use super::util::axis_delta;
use crate::error::{Error, Result};

/// Distance between two points.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Metric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Euclidean distance with a non-negative scale per axis.
    WeightedEuclidean(Vec<f32>),
    /// Sum of per-axis differences.
    Manhattan,
}

impl Metric {
    /// Weighted Euclidean metric.
    pub fn weighted_euclidean(weights: Vec<f32>) -> Self {
        Metric::WeightedEuclidean(weights)
    }

    /// Short metric name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::WeightedEuclidean(_) => "weighted euclidean",
            Metric::Manhattan => "manhattan",
        }
    }

    /// Check the metric against the dimensionality of a point set.
    pub fn validate(&self, n_dim: usize) -> Result<()> {
        if let Metric::WeightedEuclidean(weights) = self {
            if weights.len() != n_dim {
                return Err(Error::LengthMismatch {
                    what: "metric weights",
                    expected: n_dim,
                    found: weights.len(),
                });
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(Error::InvalidParameter {
                    name: "metric weights",
                    message: "must be finite and non-negative",
                });
            }
        }
        Ok(())
    }

    /// Distance between `a` and `b`; `periods[d]` is set on wrapped axes.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32], periods: &[Option<f32>]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        debug_assert_eq!(a.len(), periods.len());
        let deltas = a
            .iter()
            .zip(b)
            .zip(periods)
            .map(|((&x, &y), &period)| axis_delta(x, y, period));
        match self {
            Metric::Euclidean => deltas.map(|d| d * d).sum::<f32>().sqrt(),
            Metric::WeightedEuclidean(weights) => deltas
                .zip(weights)
                .map(|(d, w)| w * d * d)
                .sum::<f32>()
                .sqrt(),
            Metric::Manhattan => deltas.sum(),
        }
    }

    /// Largest difference along `dim` between two points at distance one.
    ///
    /// Infinite when the axis does not contribute to the distance.
    pub(crate) fn axis_reach(&self, dim: usize) -> f32 {
        match self {
            Metric::Euclidean | Metric::Manhattan => 1.0,
            Metric::WeightedEuclidean(weights) => match weights.get(dim) {
                Some(&w) if w > 0.0 => 1.0 / w.sqrt(),
                _ => f32::INFINITY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_and_manhattan() {
        let p = [None, None];
        assert!((Metric::Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0], &p) - 5.0).abs() < 1e-6);
        assert!((Metric::Manhattan.distance(&[0.0, 0.0], &[3.0, -4.0], &p) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn weighted_scales_each_axis() {
        let m = Metric::weighted_euclidean(vec![4.0, 0.0]);
        let d = m.distance(&[0.0, 0.0], &[1.0, 100.0], &[None, None]);
        assert!((d - 2.0).abs() < 1e-6);
        assert!((m.axis_reach(0) - 0.5).abs() < 1e-6);
        assert!(m.axis_reach(1).is_infinite());
    }

    #[test]
    fn wrapped_axes_apply_to_every_metric() {
        let p = [Some(10.0)];
        for m in [Metric::Euclidean, Metric::Manhattan, Metric::weighted_euclidean(vec![1.0])] {
            let d = m.distance(&[0.5], &[9.5], &p);
            assert!((d - 1.0).abs() < 1e-5, "{}", m.name());
        }
    }

    #[test]
    fn weights_must_fit_the_points() {
        let m = Metric::weighted_euclidean(vec![1.0, 2.0]);
        assert!(m.validate(2).is_ok());
        assert!(matches!(
            m.validate(3),
            Err(Error::LengthMismatch { expected: 3, found: 2, .. })
        ));
        assert!(Metric::weighted_euclidean(vec![-1.0]).validate(1).is_err());
        assert!(Metric::weighted_euclidean(vec![f32::NAN]).validate(1).is_err());
        assert!(Metric::Manhattan.validate(7).is_ok());
    }
}
