//! Density-peak clustering of weighted point clouds.
//!
//! This module implements CLUE, a density-peak algorithm that uses a uniform
//! tile index to keep every neighbourhood query local.
//!
//! ## Pipeline
//!
//! ```text
//! points -> tiles -> rho -> nearest higher -> seed/follower/outlier -> cluster ids
//! ```
//!
//! Each arrow except the last is an independent map over points. The last
//! follows nearest-higher links, which always climb in density and so
//! never cycle.
//!
//! ## Periodic axes
//!
//! A [`Domain`] marks axes as wrapped (angles, for instance). Distances on a
//! wrapped axis take the shorter way round, and the first and last tiles of
//! the axis are neighbours.
//!
//! ## Metrics
//!
//! Radii are measured with the run's [`Metric`]: Euclidean (the default),
//! weighted Euclidean or Manhattan. [`ClueResult`] can score a finished run
//! with the silhouette coefficient or the Davies-Bouldin index.
//!
//! ## Backends
//!
//! [`Backend`] implementations schedule the same stages differently. The
//! serial backend is always present; the rayon-based parallel backend is
//! built with the `parallel` feature. See [`backend`] for names and
//! availability.
//!
//! ## Usage
//!
//! ```rust
//! use clue::cluster::{Clue, Domain, PointSet};
//!
//! let rows = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.0],
//!     vec![0.0, 0.1],
//!     vec![8.0, 8.0],
//!     vec![8.1, 8.0],
//!     vec![8.0, 8.1],
//! ];
//! let points = PointSet::from_rows_unweighted(&rows).unwrap();
//!
//! let result = Clue::new(0.5, 1.5, 1.0)
//!     .cluster(&points, &Domain::unbounded(2))
//!     .unwrap();
//! assert_eq!(result.n_clusters(), 2);
//! assert_eq!(result.cluster_ids[0], result.cluster_ids[2]);
//! assert_ne!(result.cluster_ids[0], result.cluster_ids[3]);
//! ```

pub mod backend;
mod classify;
mod clue;
mod density;
mod domain;
mod kernel;
mod metric;
mod nearest;
mod points;
mod propagate;
mod tiles;
mod traits;
mod util;

pub use backend::{BackendKind, ExecutionConfig};
pub use classify::Role;
pub use clue::{run, Clue, ClueExt, ClueResult, NOISE};
pub use domain::{DimDomain, Domain};
pub use kernel::{Kernel, KernelFn};
pub use metric::Metric;
pub use nearest::NearestHigher;
pub use points::{PointSet, MAX_DIM};
pub use propagate::OUTLIER;
pub use tiles::{TileIndex, TileLayout};
pub use traits::{Backend, Clustering};
