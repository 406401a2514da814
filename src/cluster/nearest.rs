//! Nearest-higher search.
//!
//! For each point, find the closest point that ranks above it in the
//! `(rho, index)` order and lies within the follower radius. Ties in
//! distance go to the smaller index, so the answer does not depend on the
//! order in which tiles are scanned.

use super::points::PointSet;
use super::tiles::TileIndex;
use super::util::ranks_above;

/// Nearest higher-density neighbour of a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHigher {
    /// Distance to the neighbour, `f32::INFINITY` when none was found.
    pub delta: f32,
    /// Index of the neighbour.
    pub index: Option<usize>,
}

impl NearestHigher {
    /// No higher-density neighbour within the follower radius.
    pub const NONE: NearestHigher = NearestHigher {
        delta: f32::INFINITY,
        index: None,
    };
}

/// Nearest higher neighbour of point `i`, given every point's density.
pub(crate) fn nearest_higher(
    i: usize,
    points: &PointSet,
    tiles: &TileIndex,
    rho: &[f32],
    follower_radius: f32,
) -> NearestHigher {
    let xi = points.coords(i);
    let rho_i = rho[i];

    let mut best: Option<(f32, usize)> = None;
    tiles.for_each_candidate(xi, |j| {
        if !ranks_above(rho[j], j, rho_i, i) {
            return;
        }
        let d = tiles.distance(xi, points.coords(j));
        if d > follower_radius {
            return;
        }
        let closer = match best {
            None => true,
            Some((bd, bj)) => d < bd || (d == bd && j < bj),
        };
        if closer {
            best = Some((d, j));
        }
    });

    match best {
        Some((delta, j)) => NearestHigher {
            delta,
            index: Some(j),
        },
        None => NearestHigher::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::domain::Domain;
    use crate::cluster::metric::Metric;

    fn line(xs: &[f32], radius: f32) -> (PointSet, TileIndex) {
        let rows: Vec<Vec<f32>> = xs.iter().map(|&x| vec![x]).collect();
        let points = PointSet::from_rows_unweighted(&rows).unwrap();
        let tiles = TileIndex::build(&points, &Domain::unbounded(1), &Metric::Euclidean, radius, 1);
        (points, tiles)
    }

    #[test]
    fn picks_closest_higher() {
        let (points, tiles) = line(&[0.0, 0.4, 0.9, 1.0], 1.0);
        let rho = [1.0, 3.0, 5.0, 2.0];
        let nh = nearest_higher(0, &points, &tiles, &rho, 1.0);
        assert_eq!(nh.index, Some(1));
        assert!((nh.delta - 0.4).abs() < 1e-6);

        // Point 2 has the highest density.
        assert_eq!(nearest_higher(2, &points, &tiles, &rho, 1.0), NearestHigher::NONE);
    }

    #[test]
    fn respects_follower_radius() {
        let (points, tiles) = line(&[0.0, 2.0], 1.0);
        let rho = [1.0, 2.0];
        assert_eq!(nearest_higher(0, &points, &tiles, &rho, 1.0), NearestHigher::NONE);
    }

    #[test]
    fn equal_density_breaks_ties_by_index() {
        let (points, tiles) = line(&[0.0, 0.5, 1.0], 1.0);
        let rho = [2.0, 2.0, 2.0];
        assert_eq!(nearest_higher(0, &points, &tiles, &rho, 1.0).index, Some(1));
        assert_eq!(nearest_higher(1, &points, &tiles, &rho, 1.0).index, Some(2));
        assert_eq!(nearest_higher(2, &points, &tiles, &rho, 1.0).index, None);
    }

    #[test]
    fn equal_distance_prefers_smaller_index() {
        let (points, tiles) = line(&[-0.5, 0.0, 0.5], 1.0);
        let rho = [3.0, 1.0, 3.0];
        assert_eq!(nearest_higher(1, &points, &tiles, &rho, 1.0).index, Some(0));
    }

    #[test]
    fn delta_uses_the_metric() {
        let points = PointSet::from_rows_unweighted(&[vec![0.0, 0.0], vec![0.3, 0.4]]).unwrap();
        let metric = Metric::Manhattan;
        let tiles = TileIndex::build(&points, &Domain::unbounded(2), &metric, 1.0, 1);
        let nh = nearest_higher(0, &points, &tiles, &[1.0, 2.0], 1.0);
        assert_eq!(nh.index, Some(1));
        assert!((nh.delta - 0.7).abs() < 1e-6);
    }
}
