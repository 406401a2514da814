//! Local density estimation.
//!
//! `rho(i) = sum of weight(j) * K(distance(i, j))` over every tile
//! neighbour `j` within the critical distance. Point `i` itself is always in
//! range and contributes `weight(i)` regardless of the kernel.

use super::kernel::Kernel;
use super::points::PointSet;
use super::tiles::TileIndex;

/// Density of point `i`.
///
/// Reads only coordinates and weights, so it can run for all points at once.
/// The sum is kept in `f64`; the caller narrows it after checking that it
/// fits in an `f32`.
pub(crate) fn local_density(
    i: usize,
    points: &PointSet,
    tiles: &TileIndex,
    kernel: &Kernel,
    critical_distance: f32,
) -> f64 {
    let xi = points.coords(i);
    let mut rho = 0.0f64;
    tiles.for_each_candidate(xi, |j| {
        if j == i {
            rho += f64::from(points.weight(i));
            return;
        }
        let d = tiles.distance(xi, points.coords(j));
        if d <= critical_distance {
            rho += f64::from(kernel.eval(d)) * f64::from(points.weight(j));
        }
    });
    rho
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::domain::Domain;
    use crate::cluster::metric::Metric;

    fn setup(rows: &[Vec<f32>], weights: Vec<f32>, dc: f32) -> (PointSet, TileIndex) {
        setup_with(rows, weights, &Metric::Euclidean, dc)
    }

    fn setup_with(
        rows: &[Vec<f32>],
        weights: Vec<f32>,
        metric: &Metric,
        dc: f32,
    ) -> (PointSet, TileIndex) {
        let points = PointSet::from_rows(rows, weights).unwrap();
        let domain = Domain::unbounded(points.n_dim());
        let tiles = TileIndex::build(&points, &domain, metric, dc, 2);
        (points, tiles)
    }

    #[test]
    fn isolated_point_has_its_own_weight() {
        let (points, tiles) = setup(&[vec![0.0], vec![10.0]], vec![2.5, 1.0], 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(0.5), 1.0);
        assert!((rho - 2.5).abs() < 1e-6);
    }

    #[test]
    fn flat_kernel_counts_weighted_neighbours() {
        let rows = vec![vec![0.0, 0.0], vec![0.5, 0.0], vec![0.0, 0.5], vec![3.0, 3.0]];
        let (points, tiles) = setup(&rows, vec![1.0, 2.0, 4.0, 8.0], 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(0.5), 1.0);
        // self (1) + 0.5 * 2 + 0.5 * 4
        assert!((rho - 4.0).abs() < 1e-6);
    }

    #[test]
    fn neighbour_on_the_radius_counts() {
        let (points, tiles) = setup(&[vec![0.0], vec![1.0]], vec![1.0, 1.0], 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(1.0), 1.0);
        assert!((rho - 2.0).abs() < 1e-6);
    }

    #[test]
    fn exponential_kernel_weights_by_distance() {
        let (points, tiles) = setup(&[vec![0.0], vec![0.5]], vec![1.0, 1.0], 1.0);
        let kernel = Kernel::exponential(1.0, 2.0);
        let rho = local_density(0, &points, &tiles, &kernel, 1.0);
        assert!((rho - (1.0 + f64::from((-1.0f32).exp()))).abs() < 1e-6);
    }

    #[test]
    fn custom_kernel_is_used_for_neighbours_only() {
        let (points, tiles) = setup(&[vec![0.0], vec![0.25]], vec![1.0, 1.0], 1.0);
        let kernel = Kernel::custom(|d| 10.0 * d);
        let rho = local_density(0, &points, &tiles, &kernel, 1.0);
        assert!((rho - 3.5).abs() < 1e-6);
    }

    #[test]
    fn metric_decides_who_is_in_range() {
        let rows = vec![vec![0.0, 0.0], vec![0.6, 0.6]];
        let (points, tiles) = setup_with(&rows, vec![1.0, 1.0], &Metric::Euclidean, 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(1.0), 1.0);
        assert!((rho - 2.0).abs() < 1e-6);

        let (points, tiles) = setup_with(&rows, vec![1.0, 1.0], &Metric::Manhattan, 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(1.0), 1.0);
        assert!((rho - 1.0).abs() < 1e-6);
    }

    #[test]
    fn large_weights_do_not_saturate() {
        let (points, tiles) = setup(&[vec![0.0], vec![0.1]], vec![3e38, 3e38], 1.0);
        let rho = local_density(0, &points, &tiles, &Kernel::flat(1.0), 1.0);
        assert!(rho.is_finite());
        assert!(rho > f64::from(f32::MAX));
    }
}
