//! Seed / outlier / follower decision.

use super::nearest::NearestHigher;

/// Role of a point once densities and nearest-higher links are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Local density peak; starts a cluster.
    Seed,
    /// Noise.
    Outlier,
    /// Joins the cluster of its nearest higher neighbour.
    Follower,
}

/// Classify one point.
///
/// A point with a higher neighbour no farther than `seed_radius` follows it.
/// Otherwise it is a seed when dense enough and an outlier when not.
#[inline]
pub(crate) fn classify(
    rho: f32,
    nh: NearestHigher,
    density_threshold: f32,
    seed_radius: f32,
) -> Role {
    let has_close_higher = nh.index.is_some() && nh.delta <= seed_radius;
    if has_close_higher {
        Role::Follower
    } else if rho >= density_threshold {
        Role::Seed
    } else {
        Role::Outlier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nh(delta: f32, index: usize) -> NearestHigher {
        NearestHigher {
            delta,
            index: Some(index),
        }
    }

    #[test]
    fn peak_without_higher_neighbour() {
        assert_eq!(classify(6.0, NearestHigher::NONE, 5.0, 1.0), Role::Seed);
        assert_eq!(classify(4.0, NearestHigher::NONE, 5.0, 1.0), Role::Outlier);
    }

    #[test]
    fn distant_higher_neighbour_does_not_count() {
        assert_eq!(classify(6.0, nh(1.2, 3), 5.0, 1.0), Role::Seed);
        assert_eq!(classify(4.0, nh(1.2, 3), 5.0, 1.0), Role::Outlier);
    }

    #[test]
    fn close_higher_neighbour_makes_follower() {
        assert_eq!(classify(6.0, nh(0.3, 3), 5.0, 1.0), Role::Follower);
        assert_eq!(classify(0.1, nh(1.0, 3), 5.0, 1.0), Role::Follower);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(classify(5.0, NearestHigher::NONE, 5.0, 1.0), Role::Seed);
    }
}
