use rayon::prelude::*;

use super::{pipeline, BackendKind, ExecutionConfig, PointMap};
use crate::cluster::clue::{Clue, ClueResult};
use crate::cluster::domain::Domain;
use crate::cluster::points::PointSet;
use crate::cluster::propagate::resolve_by_relaxation;
use crate::cluster::traits::Backend;
use crate::error::{Error, Result};

/// CPU backend running every per-point stage on a rayon thread pool.
///
/// The pool belongs to the backend and is reused across runs. Followers
/// are resolved by pointer jumping, which needs only whole-array maps.
#[derive(Debug)]
pub struct ParallelBackend {
    pool: rayon::ThreadPool,
    block_size: usize,
}

impl ParallelBackend {
    /// Create a backend with its own thread pool.
    pub fn new(config: &ExecutionConfig) -> Result<Self> {
        config.validate()?;
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("clue-worker-{i}"));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        tracing::debug!(
            threads = pool.current_num_threads(),
            block_size = config.block_size,
            "created thread pool"
        );
        Ok(Self {
            pool,
            block_size: config.block_size,
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

pub(super) fn create(config: &ExecutionConfig) -> Result<Box<dyn Backend>> {
    Ok(Box::new(ParallelBackend::new(config)?))
}

struct Threaded {
    min_len: usize,
}

impl PointMap for Threaded {
    fn map_points<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        (0..n)
            .into_par_iter()
            .with_min_len(self.min_len)
            .map(f)
            .collect()
    }

    fn resolve_followers(&self, labels: &mut [i32], nh: &[Option<usize>], _rho: &[f32]) {
        let n = labels.len();
        resolve_by_relaxation(labels, nh, |f| self.map_points(n, f));
    }
}

impl Backend for ParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Parallel
    }

    fn run(&self, clue: &Clue, points: &PointSet, domain: &Domain) -> Result<ClueResult> {
        let map = Threaded {
            min_len: self.block_size,
        };
        self.pool
            .install(|| pipeline::run(&map, clue, points, domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::backend::SerialBackend;

    fn grid(n: usize) -> PointSet {
        let rows: Vec<Vec<f32>> = (0..n)
            .map(|i| {
                let block = (i % 3) as f32 * 20.0;
                vec![block + (i % 7) as f32 * 0.1, (i % 5) as f32 * 0.1]
            })
            .collect();
        PointSet::from_rows_unweighted(&rows).unwrap()
    }

    #[test]
    fn matches_serial_backend() {
        let points = grid(300);
        let domain = Domain::unbounded(2);
        let clue = Clue::new(0.5, 3.0, 1.0).with_points_per_tile(16);

        let serial = SerialBackend.run(&clue, &points, &domain).unwrap();
        let config = ExecutionConfig::default().with_threads(3).with_block_size(7);
        let parallel = ParallelBackend::new(&config)
            .unwrap()
            .run(&clue, &points, &domain)
            .unwrap();

        assert_eq!(serial.cluster_ids, parallel.cluster_ids);
        assert_eq!(serial.is_seed, parallel.is_seed);
        assert!(serial.n_clusters() >= 3);
    }

    #[test]
    fn honours_thread_count() {
        let config = ExecutionConfig::default().with_threads(2);
        let backend = ParallelBackend::new(&config).unwrap();
        assert_eq!(backend.threads(), 2);
    }
}
