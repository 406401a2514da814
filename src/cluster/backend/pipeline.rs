//! Stage sequence shared by every backend.

use super::PointMap;
use crate::cluster::classify::{classify, Role};
use crate::cluster::clue::{Clue, ClueResult};
use crate::cluster::density::local_density;
use crate::cluster::domain::Domain;
use crate::cluster::nearest::{nearest_higher, NearestHigher};
use crate::cluster::points::PointSet;
use crate::cluster::propagate::seed_labels;
use crate::cluster::tiles::{TileIndex, TileLayout};
use crate::error::{Error, Result};

/// Run all stages, scheduling per-point work through `map`.
///
/// The clue, domain and metric are checked against `points` first, so every
/// backend rejects inconsistent input the same way.
pub(crate) fn run<M: PointMap>(
    map: &M,
    clue: &Clue,
    points: &PointSet,
    domain: &Domain,
) -> Result<ClueResult> {
    clue.validate()?;
    domain.validate(points.n_dim())?;
    clue.metric().validate(points.n_dim())?;

    let n = points.len();
    if n == 0 {
        return Ok(ClueResult::empty());
    }

    let dc = clue.critical_distance();
    let dm = clue.follower_radius();

    let layout = TileLayout::new(
        points,
        domain,
        clue.metric(),
        dc.max(dm),
        clue.points_per_tile(),
    );
    let tile_ids = map.map_points(n, |i| layout.tile_of(points.coords(i)));
    let tiles = TileIndex::from_assignments(layout, &tile_ids);

    let kernel = clue.kernel();
    let sums = map.map_points(n, |i| local_density(i, points, &tiles, kernel, dc));
    let rho = narrow_densities(&sums)?;
    tracing::debug!(n_points = n, "computed local densities");

    let nh: Vec<NearestHigher> = map.map_points(n, |i| nearest_higher(i, points, &tiles, &rho, dm));
    tracing::debug!(
        linked = nh.iter().filter(|h| h.index.is_some()).count(),
        "found nearest-higher neighbours"
    );

    let threshold = clue.density_threshold();
    let seed_radius = clue.seed_radius();
    let roles: Vec<Role> = map.map_points(n, |i| classify(rho[i], nh[i], threshold, seed_radius));

    let (mut labels, n_clusters) = seed_labels(&roles);
    let links: Vec<Option<usize>> = nh.iter().map(|h| h.index).collect();
    map.resolve_followers(&mut labels, &links, &rho);

    let result = ClueResult::from_stages(labels, &roles, rho, nh, n_clusters);
    tracing::debug!(
        n_clusters = result.n_clusters(),
        n_outliers = result.n_outliers(),
        "clustering finished"
    );
    Ok(result)
}

/// Convert `f64` density sums to `f32`, blaming NaN or infinity on the kernel
/// and finite values past `f32::MAX` on the weights.
fn narrow_densities(sums: &[f64]) -> Result<Vec<f32>> {
    let max = f64::from(f32::MAX);
    sums.iter()
        .enumerate()
        .map(|(index, &rho)| {
            if !rho.is_finite() {
                tracing::debug!(index, "kernel produced a non-finite density");
                Err(Error::InvalidParameter {
                    name: "kernel",
                    message: "produced a non-finite density",
                })
            } else if rho.abs() > max {
                tracing::debug!(index, rho, "density overflows f32");
                Err(Error::DensityOverflow { index })
            } else {
                Ok(rho as f32)
            }
        })
        .collect()
}
