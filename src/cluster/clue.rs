//! CLUE: CLUstering of Energy, a tiled density-peak clustering algorithm.
//!
//! # The Algorithm (Rovere et al., 2020)
//!
//! CLUE belongs to the density-peak family (Rodriguez and Laio, 2014). Each
//! point gets a local density `rho` and a link to its nearest neighbour of
//! higher density. Density peaks become cluster seeds, and every other point
//! inherits the cluster of the neighbour it links to.
//!
//! ## Parameters
//!
//! - **Critical distance (dc)**: radius of the density estimate.
//! - **Density threshold (rhoc)**: minimum density for a seed.
//! - **Follower radius (dm)**: how far a point looks for a higher neighbour.
//! - **Seed radius**: a point with a higher neighbour this close is never a
//!   seed or an outlier. Defaults to `dc`.
//!
//! ## Algorithm Steps
//!
//! 1. Bucket points into tiles at least `max(dc, dm)` wide.
//! 2. `rho(i)`: own weight plus kernel-weighted neighbours within `dc`.
//! 3. `delta(i)`: distance to the closest point of higher `(rho, index)`
//!    within `dm`.
//! 4. Classify:
//!    - follower if `delta(i) <= seed_radius`
//!    - otherwise seed if `rho(i) >= rhoc`
//!    - otherwise outlier
//! 5. Number seeds in index order and propagate ids down the
//!    nearest-higher links. Followers of outliers are outliers.
//!
//! ## Complexity
//!
//! - **Time**: O(n * k) where `k` is the number of points in a `3^d` tile
//!   block; near-linear for roughly uniform data.
//! - **Space**: O(n).
//!
//! Every stage except propagation is independent per point, which is what
//! the parallel backend exploits.
//!
//! ## References
//!
//! Rovere, Chen, Di Pilato, Pantaleo, Seez (2020). "CLUE: A Fast Parallel
//! Clustering Algorithm for High Granularity Calorimeters in High-Energy
//! Physics." Frontiers in Big Data 3:591315.
//!
//! Rodriguez, Laio (2014). "Clustering by fast search and find of density
//! peaks." Science 344(6191).

use std::f64::consts::TAU;

use super::backend::{self, ExecutionConfig, SerialBackend};
use super::classify::Role;
use super::domain::Domain;
use super::kernel::Kernel;
use super::metric::Metric;
use super::nearest::NearestHigher;
use super::points::PointSet;
use super::propagate::OUTLIER;
use super::traits::{Backend, Clustering};
use crate::error::{Error, Result};

/// Label returned by [`Clustering::fit_predict`] for outliers.
pub const NOISE: usize = usize::MAX;

/// CLUE parameter set.
///
/// Values are plain data: builders consume and return a new value, so one
/// configuration can be shared across runs and threads.
#[derive(Debug, Clone)]
pub struct Clue {
    critical_distance: f32,
    density_threshold: f32,
    follower_radius: f32,
    seed_radius: Option<f32>,
    points_per_tile: usize,
    kernel: Kernel,
    metric: Metric,
}

impl Clue {
    /// Create a CLUE configuration.
    ///
    /// # Arguments
    ///
    /// * `critical_distance` - Radius of the density estimate.
    /// * `density_threshold` - Minimum density of a seed.
    /// * `follower_radius` - Search radius for the nearest higher neighbour.
    ///
    /// # Typical Values
    ///
    /// - `follower_radius` somewhat larger than `critical_distance` lets
    ///   sparse cluster edges attach to their core.
    /// - With the default flat kernel of amplitude 0.5 and unit weights,
    ///   `rho = 1 + 0.5 * neighbours`.
    pub fn new(critical_distance: f32, density_threshold: f32, follower_radius: f32) -> Self {
        Self {
            critical_distance,
            density_threshold,
            follower_radius,
            seed_radius: None,
            points_per_tile: 128,
            kernel: Kernel::default(),
            metric: Metric::default(),
        }
    }

    /// Set the critical distance.
    pub fn with_critical_distance(mut self, critical_distance: f32) -> Self {
        self.critical_distance = critical_distance;
        self
    }

    /// Set the density threshold.
    pub fn with_density_threshold(mut self, density_threshold: f32) -> Self {
        self.density_threshold = density_threshold;
        self
    }

    /// Set the follower radius.
    pub fn with_follower_radius(mut self, follower_radius: f32) -> Self {
        self.follower_radius = follower_radius;
        self
    }

    /// Set the seed radius independently of the critical distance.
    pub fn with_seed_radius(mut self, seed_radius: f32) -> Self {
        self.seed_radius = Some(seed_radius);
        self
    }

    /// Set the target average number of points per tile.
    pub fn with_points_per_tile(mut self, points_per_tile: usize) -> Self {
        self.points_per_tile = points_per_tile;
        self
    }

    /// Set the density kernel.
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the distance metric. Every radius is measured with it.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Radius of the density estimate.
    pub fn critical_distance(&self) -> f32 {
        self.critical_distance
    }

    /// Minimum density of a seed.
    pub fn density_threshold(&self) -> f32 {
        self.density_threshold
    }

    /// Search radius for the nearest higher neighbour.
    pub fn follower_radius(&self) -> f32 {
        self.follower_radius
    }

    /// Seed radius; the critical distance unless set explicitly.
    pub fn seed_radius(&self) -> f32 {
        self.seed_radius.unwrap_or(self.critical_distance)
    }

    /// Target average tile occupancy.
    pub fn points_per_tile(&self) -> usize {
        self.points_per_tile
    }

    /// Density kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Distance metric.
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Check every parameter that does not depend on the points.
    ///
    /// Metric weights are checked against the points when a run starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.critical_distance.is_finite() && self.critical_distance > 0.0) {
            return Err(Error::InvalidParameter {
                name: "critical_distance",
                message: "must be positive and finite",
            });
        }
        if !self.density_threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "density_threshold",
                message: "must be finite",
            });
        }
        if !(self.follower_radius.is_finite() && self.follower_radius >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "follower_radius",
                message: "must be non-negative and finite",
            });
        }
        let seed_radius = self.seed_radius();
        if !(seed_radius.is_finite() && seed_radius >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "seed_radius",
                message: "must be non-negative and finite",
            });
        }
        if self.points_per_tile == 0 {
            return Err(Error::InvalidParameter {
                name: "points_per_tile",
                message: "must be at least 1",
            });
        }
        self.kernel.validate()
    }

    /// Cluster `points` with the serial backend.
    pub fn cluster(&self, points: &PointSet, domain: &Domain) -> Result<ClueResult> {
        self.cluster_with(points, domain, &SerialBackend)
    }

    /// Cluster `points` with the given backend.
    ///
    /// The backend checks parameters, domain and metric before any stage
    /// runs.
    pub fn cluster_with(
        &self,
        points: &PointSet,
        domain: &Domain,
        backend: &dyn Backend,
    ) -> Result<ClueResult> {
        tracing::debug!(
            backend = backend.kind().name(),
            metric = self.metric.name(),
            n_points = points.len(),
            n_dim = points.n_dim(),
            "running clue"
        );
        backend.run(self, points, domain)
    }
}

impl Default for Clue {
    fn default() -> Self {
        Self::new(1.0, 5.0, 1.5)
    }
}

/// Output of one CLUE run.
///
/// `cluster_ids` and `is_seed` are the primary outputs; the remaining
/// vectors expose the intermediate per-point quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ClueResult {
    /// Cluster id per point, [`OUTLIER`] (-1) for noise.
    pub cluster_ids: Vec<i32>,
    /// 1 for seeds, 0 otherwise.
    pub is_seed: Vec<u8>,
    /// Local density per point.
    pub densities: Vec<f32>,
    /// Distance to the nearest higher neighbour, infinite when there is none.
    pub deltas: Vec<f32>,
    /// Index of the nearest higher neighbour.
    pub nearest_higher: Vec<Option<usize>>,
    n_clusters: usize,
}

impl ClueResult {
    pub(crate) fn empty() -> Self {
        Self {
            cluster_ids: Vec::new(),
            is_seed: Vec::new(),
            densities: Vec::new(),
            deltas: Vec::new(),
            nearest_higher: Vec::new(),
            n_clusters: 0,
        }
    }

    pub(crate) fn from_stages(
        cluster_ids: Vec<i32>,
        roles: &[Role],
        densities: Vec<f32>,
        nh: Vec<NearestHigher>,
        n_clusters: usize,
    ) -> Self {
        Self {
            cluster_ids,
            is_seed: roles.iter().map(|&r| u8::from(r == Role::Seed)).collect(),
            densities,
            deltas: nh.iter().map(|h| h.delta).collect(),
            nearest_higher: nh.iter().map(|h| h.index).collect(),
            n_clusters,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.cluster_ids.len()
    }

    /// True when the run had no points.
    pub fn is_empty(&self) -> bool {
        self.cluster_ids.is_empty()
    }

    /// Number of clusters (equal to the number of seeds).
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Number of points labelled as outliers.
    pub fn n_outliers(&self) -> usize {
        self.cluster_ids.iter().filter(|&&id| id == OUTLIER).count()
    }

    /// Indices of the seed points, ascending.
    pub fn seeds(&self) -> Vec<usize> {
        self.is_seed
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Member indices of each cluster, indexed by cluster id.
    pub fn clusters(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.n_clusters];
        for (i, &id) in self.cluster_ids.iter().enumerate() {
            if id >= 0 {
                members[id as usize].push(i);
            }
        }
        members
    }

    /// Weighted centroid of each cluster, indexed by cluster id.
    ///
    /// Wrapped axes use a circular mean, so a cluster straddling the seam
    /// gets a centroid near the seam rather than in the middle of the
    /// domain. A cluster whose total weight is zero falls back to equal
    /// weights.
    pub fn centroids(&self, points: &PointSet, domain: &Domain) -> Result<Vec<Vec<f32>>> {
        self.check_points(points, domain)?;
        let dims = domain.dims();
        let n_dim = points.n_dim();
        let mut weight = vec![0.0f64; self.n_clusters];
        for (i, &id) in self.cluster_ids.iter().enumerate() {
            if id >= 0 {
                weight[id as usize] += f64::from(points.weight(i));
            }
        }
        let unit = |c: usize| weight[c] <= 0.0;

        // Per cluster and axis: linear sum, or (sin, cos) sums on wrapped axes.
        let mut sums = vec![vec![(0.0f64, 0.0f64); n_dim]; self.n_clusters];
        let mut norm = vec![0.0f64; self.n_clusters];
        for (i, &id) in self.cluster_ids.iter().enumerate() {
            if id < 0 {
                continue;
            }
            let c = id as usize;
            let w = if unit(c) { 1.0 } else { f64::from(points.weight(i)) };
            norm[c] += w;
            for (d, &x) in points.coords(i).iter().enumerate() {
                let acc = &mut sums[c][d];
                match dims[d].period() {
                    Some(period) => {
                        let theta = angle(x, dims[d].min, period);
                        acc.0 += w * theta.sin();
                        acc.1 += w * theta.cos();
                    }
                    None => acc.0 += w * f64::from(x),
                }
            }
        }

        Ok(sums
            .iter()
            .zip(&norm)
            .map(|(axes, &norm)| {
                axes.iter()
                    .zip(dims)
                    .map(|(&(s, c), dim)| match dim.period() {
                        Some(period) => {
                            let theta = s.atan2(c).rem_euclid(TAU);
                            let x = f64::from(dim.min) + theta / TAU * f64::from(period);
                            dim.normalize(x as f32)
                        }
                        None => (s / norm.max(f64::MIN_POSITIVE)) as f32,
                    })
                    .collect()
            })
            .collect())
    }

    /// Mean silhouette coefficient over clustered points.
    ///
    /// For point `i`, `a` is its mean distance to the rest of its cluster
    /// and `b` the smallest mean distance to another cluster; the score is
    /// `(b - a) / max(a, b)`. Outliers and members of single-point clusters
    /// are skipped. `None` when fewer than two clusters exist or no point is
    /// eligible. Quadratic in the number of clustered points.
    pub fn silhouette(
        &self,
        points: &PointSet,
        domain: &Domain,
        metric: &Metric,
    ) -> Result<Option<f32>> {
        self.check_points(points, domain)?;
        metric.validate(points.n_dim())?;
        if self.n_clusters < 2 {
            return Ok(None);
        }
        let periods = domain.periods();
        let clusters = self.clusters();

        let mut total = 0.0f64;
        let mut count = 0usize;
        for (i, &id) in self.cluster_ids.iter().enumerate() {
            let Ok(own) = usize::try_from(id) else {
                continue;
            };
            if clusters[own].len() < 2 {
                continue;
            }
            let xi = points.coords(i);
            let mean_distance = |members: &[usize]| {
                let sum: f64 = members
                    .iter()
                    .filter(|&&j| j != i)
                    .map(|&j| f64::from(metric.distance(xi, points.coords(j), &periods)))
                    .sum();
                let n = members.iter().filter(|&&j| j != i).count();
                sum / n as f64
            };
            let a = mean_distance(&clusters[own]);
            let b = clusters
                .iter()
                .enumerate()
                .filter(|(c, members)| *c != own && !members.is_empty())
                .map(|(_, members)| mean_distance(members))
                .fold(f64::INFINITY, f64::min);
            let scale = a.max(b);
            total += if scale > 0.0 { (b - a) / scale } else { 0.0 };
            count += 1;
        }
        Ok((count > 0).then(|| (total / count as f64) as f32))
    }

    /// Davies-Bouldin index; lower is better.
    ///
    /// Scatter `S_i` is the mean distance of cluster `i`'s members to its
    /// centroid. The index averages, over clusters, the worst ratio
    /// `(S_i + S_j) / distance(centroid_i, centroid_j)`. Coincident
    /// centroids give an infinite ratio. `None` when fewer than two clusters
    /// exist.
    pub fn davies_bouldin(
        &self,
        points: &PointSet,
        domain: &Domain,
        metric: &Metric,
    ) -> Result<Option<f32>> {
        metric.validate(points.n_dim())?;
        let centroids = self.centroids(points, domain)?;
        if self.n_clusters < 2 {
            return Ok(None);
        }
        let periods = domain.periods();

        let mut scatter = vec![0.0f64; self.n_clusters];
        let mut size = vec![0usize; self.n_clusters];
        for (i, &id) in self.cluster_ids.iter().enumerate() {
            if id >= 0 {
                let c = id as usize;
                scatter[c] += f64::from(metric.distance(points.coords(i), &centroids[c], &periods));
                size[c] += 1;
            }
        }
        for (s, &n) in scatter.iter_mut().zip(&size) {
            *s /= n.max(1) as f64;
        }

        let worst: f64 = (0..self.n_clusters)
            .map(|i| {
                (0..self.n_clusters)
                    .filter(|&j| j != i)
                    .map(|j| {
                        let separation =
                            f64::from(metric.distance(&centroids[i], &centroids[j], &periods));
                        if separation > 0.0 {
                            (scatter[i] + scatter[j]) / separation
                        } else {
                            f64::INFINITY
                        }
                    })
                    .fold(0.0, f64::max)
            })
            .sum();
        Ok(Some((worst / self.n_clusters as f64) as f32))
    }

    fn check_points(&self, points: &PointSet, domain: &Domain) -> Result<()> {
        if points.len() != self.len() {
            return Err(Error::LengthMismatch {
                what: "points",
                expected: self.len(),
                found: points.len(),
            });
        }
        domain.validate(points.n_dim())
    }

    /// Split into `(cluster_ids, is_seed)`.
    pub fn into_parts(self) -> (Vec<i32>, Vec<u8>) {
        (self.cluster_ids, self.is_seed)
    }
}

/// Position of `x` on a wrapped axis, in radians from `min`.
fn angle(x: f32, min: f32, period: f32) -> f64 {
    TAU * f64::from(x - min) / f64::from(period)
}

/// Cluster per-dimension coordinate arrays with a backend chosen by name.
///
/// `columns[d][i]` is coordinate `d` of point `i`. Configuration and shape
/// errors are reported before the backend is created; an unavailable
/// backend is reported as [`Error::BackendUnavailable`].
pub fn run(
    clue: &Clue,
    columns: &[Vec<f32>],
    weights: Vec<f32>,
    domain: &Domain,
    backend_name: &str,
    config: &ExecutionConfig,
) -> Result<(Vec<i32>, Vec<u8>)> {
    clue.validate()?;
    let points = PointSet::from_columns(columns, weights)?;
    domain.validate(points.n_dim())?;
    clue.metric().validate(points.n_dim())?;
    let backend = backend::create(backend_name, config)?;
    Ok(clue
        .cluster_with(&points, domain, backend.as_ref())?
        .into_parts())
}

impl Clue {
    fn cluster_rows(&self, data: &[Vec<f32>]) -> Result<Option<ClueResult>> {
        if data.is_empty() {
            return Ok(None);
        }
        let points = PointSet::from_rows_unweighted(data)?;
        let domain = Domain::unbounded(points.n_dim());
        self.cluster(&points, &domain).map(Some)
    }
}

impl Clustering for Clue {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let Some(result) = self.cluster_rows(data)? else {
            return Ok(Vec::new());
        };
        Ok(result
            .cluster_ids
            .iter()
            .map(|&id| if id < 0 { NOISE } else { id as usize })
            .collect())
    }

    fn n_clusters(&self) -> usize {
        // Discovered from the data.
        0
    }
}

/// Extension trait for CLUE-specific functionality.
pub trait ClueExt {
    /// Fit and predict, returning labels where outliers are `None`.
    fn fit_predict_with_noise(&self, data: &[Vec<f32>]) -> Result<Vec<Option<usize>>>;

    /// Check if a label represents noise.
    fn is_noise(label: usize) -> bool {
        label == NOISE
    }
}

impl ClueExt for Clue {
    fn fit_predict_with_noise(&self, data: &[Vec<f32>]) -> Result<Vec<Option<usize>>> {
        let Some(result) = self.cluster_rows(data)? else {
            return Ok(Vec::new());
        };
        Ok(result
            .cluster_ids
            .iter()
            .map(|&id| usize::try_from(id).ok())
            .collect())
    }
}
