//! Cluster-id propagation along nearest-higher links.
//!
//! Seeds receive dense, zero-based ids in ascending point order; outliers
//! get [`OUTLIER`]. Every follower then takes the label found at the end of
//! its nearest-higher chain, so a chain ending at an outlier makes the whole
//! chain noise.
//!
//! Chains always climb the `(rho, index)` order, so they cannot cycle. Two
//! resolution strategies are provided: a single pass in descending density
//! order (each link target is labelled before the points that follow it),
//! and pointer jumping, where every round replaces a point's link by its
//! link's link. The second needs only whole-array maps and suits
//! data-parallel backends.

use super::classify::Role;
use super::util::ranks_above;
use std::cmp::Ordering;

/// Cluster id given to outliers.
pub const OUTLIER: i32 = -1;

const UNRESOLVED: i32 = -2;

/// Initial labels: seed ids in index order, `OUTLIER`, or unresolved.
///
/// Returns the labels and the number of clusters.
pub(crate) fn seed_labels(roles: &[Role]) -> (Vec<i32>, usize) {
    let mut next = 0i32;
    let labels = roles
        .iter()
        .map(|role| match role {
            Role::Seed => {
                let id = next;
                next += 1;
                id
            }
            Role::Outlier => OUTLIER,
            Role::Follower => UNRESOLVED,
        })
        .collect();
    (labels, next as usize)
}

/// Resolve followers in one pass over points sorted by descending density.
///
/// `nh[i]` must be set for every follower and rank above `i`.
pub(crate) fn resolve_by_density_order(labels: &mut [i32], nh: &[Option<usize>], rho: &[f32]) {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        if a == b {
            Ordering::Equal
        } else if ranks_above(rho[a], a, rho[b], b) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    });

    for i in order {
        if labels[i] != UNRESOLVED {
            continue;
        }
        labels[i] = match nh[i] {
            Some(parent) => labels[parent],
            None => OUTLIER,
        };
    }
}

/// Resolve followers by pointer jumping.
///
/// `map` evaluates a per-point function over `0..n` and collects the
/// results in index order; it may run the calls in any order or in
/// parallel.
pub(crate) fn resolve_by_relaxation<M>(labels: &mut [i32], nh: &[Option<usize>], map: M)
where
    M: Fn(&(dyn Fn(usize) -> usize + Sync)) -> Vec<usize>,
{
    let mut parent: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| match (label, nh[i]) {
            (UNRESOLVED, Some(p)) => p,
            _ => i,
        })
        .collect();

    let mut rounds = 0usize;
    loop {
        let current = &parent;
        let next = map(&|i| current[current[i]]);
        rounds += 1;
        if next == parent {
            break;
        }
        parent = next;
    }
    tracing::trace!(rounds, "pointer jumping converged");

    let roots: Vec<i32> = parent.iter().map(|&root| labels[root]).collect();
    for (label, root) in labels.iter_mut().zip(roots) {
        *label = if root == UNRESOLVED { OUTLIER } else { root };
    }
}
