//! Density-peak clustering on a spatial tile index.
//!
//! `clue` groups a weighted point cloud of up to ten dimensions into clusters
//! around local density peaks and marks sparse points as outliers, using
//! the CLUE algorithm.
//!
//! The primary public API is under [`cluster`], which provides:
//! - [`Clue`]: the parameter set and entry points
//! - [`PointSet`] and [`Domain`]: validated input, with periodic axes
//! - [`Kernel`]: flat, exponential, gaussian, or custom density kernels
//! - serial and thread-parallel backends with identical results

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;

pub use cluster::{
    run, Backend, BackendKind, Clue, ClueExt, ClueResult, Clustering, DimDomain, Domain,
    ExecutionConfig, Kernel, Metric, PointSet, NOISE, OUTLIER,
};
pub use error::{Error, Result};
