use super::{pipeline, BackendKind, ExecutionConfig, PointMap};
use crate::cluster::clue::{Clue, ClueResult};
use crate::cluster::domain::Domain;
use crate::cluster::points::PointSet;
use crate::cluster::traits::Backend;
use crate::error::Result;

/// Single-threaded reference backend.
///
/// Followers are resolved in one pass over the points in descending
/// density order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

pub(super) fn create(_config: &ExecutionConfig) -> Result<Box<dyn Backend>> {
    Ok(Box::new(SerialBackend))
}

struct Sequential;

impl PointMap for Sequential {
    fn map_points<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        (0..n).map(f).collect()
    }
}

impl Backend for SerialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Serial
    }

    fn run(&self, clue: &Clue, points: &PointSet, domain: &Domain) -> Result<ClueResult> {
        pipeline::run(&Sequential, clue, points, domain)
    }
}
