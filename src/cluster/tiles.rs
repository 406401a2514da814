//! Uniform spatial tiling of the point cloud.
//!
//! The bounded coordinate space is cut into axis-aligned hyper-rectangular
//! tiles. The number of tiles follows the requested average occupancy
//! (`points_per_tile`), but each tile is kept at least as wide as the
//! largest search radius of a run, measured along the axis under the run's
//! [`Metric`]. Any two points within that radius therefore sit in the same
//! tile or in tiles one step apart along every axis, and a neighbourhood
//! query only has to visit the `3^n_dim` block of tiles around the query
//! point. An axis the metric ignores gets a single tile.
//!
//! Construction is split in two so that backends can parallelize it:
//!
//! 1. [`TileLayout`] fixes the geometry and maps a coordinate to a tile id.
//! 2. [`TileIndex::from_assignments`] buckets the per-point tile ids into a
//!    compact offsets/entries table (counting sort).
//!
//! Periodic axes span the domain period, and their first and last tiles are
//! neighbours.

use super::domain::{DimDomain, Domain};
use super::metric::Metric;
use super::points::{PointSet, MAX_DIM};

/// Widens the radius slightly when capping the tile count, so rounding in
/// `extent / bins` never yields a tile narrower than the radius.
const WIDTH_MARGIN: f32 = 1.0 + 1e-4;

/// Smallest `k` with `k^n_dim >= target`.
fn bins_for(target: usize, n_dim: usize) -> usize {
    let mut k = ((target as f64).powf(1.0 / n_dim as f64).floor() as usize).max(1);
    while k.checked_pow(n_dim as u32).is_some_and(|p| p < target) {
        k += 1;
    }
    k
}

/// Tile geometry: bins per axis, their origin and width.
#[derive(Debug, Clone)]
pub struct TileLayout {
    bins: Vec<usize>,
    strides: Vec<usize>,
    origin: Vec<f32>,
    width: Vec<f32>,
    dims: Vec<DimDomain>,
    metric: Metric,
}

impl TileLayout {
    /// Compute the tile geometry for a point set.
    ///
    /// `radius` is the largest distance a neighbourhood query must cover.
    /// `domain` and `metric` must already be validated against `points`.
    pub fn new(
        points: &PointSet,
        domain: &Domain,
        metric: &Metric,
        radius: f32,
        points_per_tile: usize,
    ) -> Self {
        let n_dim = points.n_dim();
        let target_tiles = points.len().div_ceil(points_per_tile.max(1)).max(1);
        let per_dim = bins_for(target_tiles, n_dim);

        let mut bins = Vec::with_capacity(n_dim);
        let mut origin = Vec::with_capacity(n_dim);
        let mut width = Vec::with_capacity(n_dim);
        for (dim, range) in domain.dims().iter().enumerate() {
            let (lo, extent) = match range.period() {
                Some(period) => (range.min, period),
                None => match points.extent(dim) {
                    Some((lo, hi)) => (lo, hi - lo),
                    None => (0.0, 0.0),
                },
            };

            let reach = metric.axis_reach(dim);
            let cap = if reach.is_infinite() {
                1
            } else if radius > 0.0 {
                ((extent / (radius * reach * WIDTH_MARGIN)).floor() as usize).max(1)
            } else {
                per_dim
            };
            let n_bins = per_dim.min(cap).max(1);
            let w = if extent > 0.0 {
                extent / n_bins as f32
            } else {
                1.0
            };

            bins.push(n_bins);
            origin.push(lo);
            width.push(w);
        }

        let mut strides = vec![1usize; n_dim];
        for d in 1..n_dim {
            strides[d] = strides[d - 1].saturating_mul(bins[d - 1]);
        }

        Self {
            bins,
            strides,
            origin,
            width,
            dims: domain.dims().to_vec(),
            metric: metric.clone(),
        }
    }

    /// Total number of tiles.
    pub fn n_tiles(&self) -> usize {
        self.bins.iter().product()
    }

    /// Number of tiles along each axis.
    pub fn bins_per_dim(&self) -> &[usize] {
        &self.bins
    }

    /// Tile width along each axis.
    pub fn tile_width(&self) -> &[f32] {
        &self.width
    }

    /// Bin of coordinate `x` along `dim`; out-of-range values clamp to the
    /// edge bins.
    #[inline]
    fn bin(&self, dim: usize, x: f32) -> usize {
        let x = self.dims[dim].normalize(x);
        let b = ((x - self.origin[dim]) / self.width[dim]) as usize;
        b.min(self.bins[dim] - 1)
    }

    /// Global tile id of a coordinate vector.
    #[inline]
    pub fn tile_of(&self, coords: &[f32]) -> usize {
        coords
            .iter()
            .enumerate()
            .map(|(dim, &x)| self.bin(dim, x) * self.strides[dim])
            .sum()
    }

    /// Bins adjacent to `b` along `dim` (including `b`), wrap-aware.
    #[inline]
    fn adjacent_bins(&self, dim: usize, b: usize, out: &mut [usize; 3]) -> usize {
        let n = self.bins[dim];
        if self.dims[dim].wrapped {
            if n <= 3 {
                for (slot, bin) in out.iter_mut().zip(0..n) {
                    *slot = bin;
                }
                return n;
            }
            *out = [(b + n - 1) % n, b, (b + 1) % n];
            return 3;
        }
        let lo = b.saturating_sub(1);
        let hi = (b + 1).min(n - 1);
        for (slot, bin) in out.iter_mut().zip(lo..=hi) {
            *slot = bin;
        }
        hi - lo + 1
    }
}

/// Spatial index: point ids bucketed by tile.
#[derive(Debug, Clone)]
pub struct TileIndex {
    layout: TileLayout,
    periods: Vec<Option<f32>>,
    offsets: Vec<usize>,
    entries: Vec<usize>,
}

impl TileIndex {
    /// Build the index serially.
    pub fn build(
        points: &PointSet,
        domain: &Domain,
        metric: &Metric,
        radius: f32,
        points_per_tile: usize,
    ) -> Self {
        let layout = TileLayout::new(points, domain, metric, radius, points_per_tile);
        let tile_ids: Vec<usize> = (0..points.len())
            .map(|i| layout.tile_of(points.coords(i)))
            .collect();
        Self::from_assignments(layout, &tile_ids)
    }

    /// Bucket precomputed per-point tile ids.
    ///
    /// Within a tile, point ids are stored in ascending order, so the result
    /// does not depend on how `tile_ids` was produced.
    pub fn from_assignments(layout: TileLayout, tile_ids: &[usize]) -> Self {
        let n_tiles = layout.n_tiles();

        let mut counts = vec![0usize; n_tiles];
        for &t in tile_ids {
            counts[t] += 1;
        }

        let mut offsets = Vec::with_capacity(n_tiles + 1);
        offsets.push(0);
        let mut sum = 0usize;
        for &count in &counts {
            sum += count;
            offsets.push(sum);
        }

        let mut entries = vec![0usize; tile_ids.len()];
        let mut cursors = offsets[..n_tiles].to_vec();
        for (i, &t) in tile_ids.iter().enumerate() {
            entries[cursors[t]] = i;
            cursors[t] += 1;
        }

        let periods = layout.dims.iter().map(DimDomain::period).collect();
        tracing::debug!(
            n_points = tile_ids.len(),
            n_tiles,
            bins = ?layout.bins,
            "built tile index"
        );

        Self {
            layout,
            periods,
            offsets,
            entries,
        }
    }

    /// Tile geometry.
    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Number of tiles.
    pub fn n_tiles(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no point is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point ids stored in tile `t`.
    #[inline]
    pub fn tile(&self, t: usize) -> &[usize] {
        &self.entries[self.offsets[t]..self.offsets[t + 1]]
    }

    /// Number of tiles holding at least one point.
    pub fn occupied_tiles(&self) -> usize {
        self.offsets.windows(2).filter(|w| w[1] > w[0]).count()
    }

    /// Distance between two coordinate vectors under this index's metric
    /// and periodic axes.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.layout.metric.distance(a, b, &self.periods)
    }

    /// Candidate neighbour ids of `coords`: every point in its tile and in
    /// the adjacent tiles.
    pub fn query(&self, coords: &[f32]) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_candidate(coords, |j| out.push(j));
        out
    }

    /// Visit every candidate neighbour of `coords` in a fixed order.
    pub fn for_each_candidate(&self, coords: &[f32], mut visit: impl FnMut(usize)) {
        let n_dim = coords.len();
        debug_assert!(n_dim <= MAX_DIM);
        let layout = &self.layout;

        let mut lists = [[0usize; 3]; MAX_DIM];
        let mut lens = [0usize; MAX_DIM];
        for dim in 0..n_dim {
            let b = layout.bin(dim, coords[dim]);
            lens[dim] = layout.adjacent_bins(dim, b, &mut lists[dim]);
        }

        let mut cursor = [0usize; MAX_DIM];
        loop {
            let tile: usize = (0..n_dim)
                .map(|d| lists[d][cursor[d]] * layout.strides[d])
                .sum();
            for &j in self.tile(tile) {
                visit(j);
            }

            let mut d = 0;
            loop {
                if d == n_dim {
                    return;
                }
                cursor[d] += 1;
                if cursor[d] < lens[d] {
                    break;
                }
                cursor[d] = 0;
                d += 1;
            }
        }
    }
}
