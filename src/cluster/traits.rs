use std::fmt;

use super::backend::BackendKind;
use super::clue::{Clue, ClueResult};
use super::domain::Domain;
use super::points::PointSet;
use crate::error::Result;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model (if needed) and return one cluster label per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters (if applicable).
    ///
    /// For algorithms that discover the number of clusters dynamically,
    /// this returns 0.
    fn n_clusters(&self) -> usize;
}

/// An execution strategy for one CLUE run.
///
/// Backends differ only in how they schedule the per-point stages; every
/// backend produces the same partition for the same input. A backend owns
/// its resources (thread pools, device handles) and is not reentrant.
/// [`Backend::run`] checks the clue, domain and metric against the points
/// before any stage runs.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Run the full pipeline.
    fn run(&self, clue: &Clue, points: &PointSet, domain: &Domain) -> Result<ClueResult>;
}
