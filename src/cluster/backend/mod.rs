//! Backend selection and the shared stage pipeline.
//!
//! Backends are looked up by name in a fixed capability table. Each entry
//! maps a [`BackendKind`] to an optional factory; an entry without a factory
//! names a backend that exists in principle but was not compiled into this
//! build, and asking for it yields [`Error::BackendUnavailable`].
//!
//! | Backend | Names | Availability |
//! |---|---|---|
//! | serial | `serial`, `cpu serial` | always |
//! | parallel | `parallel`, `cpu parallel`, `cpu tbb`, `cpu openmp`, `rayon` | `parallel` feature |
//! | gpu | `gpu`, `gpu cuda`, `gpu hip` | not built |

mod pipeline;
#[cfg(feature = "parallel")]
mod parallel;
mod serial;

use std::fmt;
use std::str::FromStr;

use super::traits::Backend;
use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
pub use parallel::ParallelBackend;
pub use serial::SerialBackend;

/// Identifier of an execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Single-threaded reference implementation.
    Serial,
    /// CPU thread pool.
    Parallel,
    /// GPU device.
    Gpu,
}

impl BackendKind {
    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Serial => "serial",
            BackendKind::Parallel => "parallel",
            BackendKind::Gpu => "gpu",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "serial" | "cpu serial" => Ok(BackendKind::Serial),
            "parallel" | "cpu parallel" | "cpu tbb" | "cpu openmp" | "rayon" => {
                Ok(BackendKind::Parallel)
            }
            "gpu" | "gpu cuda" | "gpu hip" | "cuda" | "hip" => Ok(BackendKind::Gpu),
            _ => Err(Error::UnknownBackend(s.to_string())),
        }
    }
}

/// Settings meaningful only to parallel and GPU backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Minimum number of points handed to one task.
    pub block_size: usize,
    /// Device ordinal for GPU backends.
    pub device_id: usize,
    /// Worker thread count; `None` lets the pool decide.
    pub threads: Option<usize>,
}

impl ExecutionConfig {
    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the device id.
    pub fn with_device_id(mut self, device_id: usize) -> Self {
        self.device_id = device_id;
        self
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Check the settings.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidParameter {
                name: "block_size",
                message: "must be at least 1",
            });
        }
        if self.threads == Some(0) {
            return Err(Error::InvalidParameter {
                name: "threads",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            block_size: 256,
            device_id: 0,
            threads: None,
        }
    }
}

type Factory = fn(&ExecutionConfig) -> Result<Box<dyn Backend>>;

struct Entry {
    kind: BackendKind,
    factory: Option<Factory>,
}

#[cfg(feature = "parallel")]
const PARALLEL_FACTORY: Option<Factory> = Some(parallel::create as Factory);
#[cfg(not(feature = "parallel"))]
const PARALLEL_FACTORY: Option<Factory> = None;

const REGISTRY: &[Entry] = &[
    Entry {
        kind: BackendKind::Serial,
        factory: Some(serial::create as Factory),
    },
    Entry {
        kind: BackendKind::Parallel,
        factory: PARALLEL_FACTORY,
    },
    Entry {
        kind: BackendKind::Gpu,
        factory: None,
    },
];

fn factory(kind: BackendKind) -> Option<Factory> {
    REGISTRY
        .iter()
        .find(|entry| entry.kind == kind)
        .and_then(|entry| entry.factory)
}

/// True if `kind` was compiled into this build.
pub fn is_available(kind: BackendKind) -> bool {
    factory(kind).is_some()
}

/// Backends compiled into this build.
pub fn available() -> Vec<BackendKind> {
    REGISTRY
        .iter()
        .filter(|entry| entry.factory.is_some())
        .map(|entry| entry.kind)
        .collect()
}

/// Instantiate a backend by kind.
pub fn create_kind(kind: BackendKind, config: &ExecutionConfig) -> Result<Box<dyn Backend>> {
    config.validate()?;
    let make = factory(kind).ok_or(Error::BackendUnavailable {
        backend: kind.name(),
    })?;
    tracing::debug!(backend = kind.name(), ?config, "creating backend");
    make(config)
}

/// Instantiate a backend by name.
pub fn create(name: &str, config: &ExecutionConfig) -> Result<Box<dyn Backend>> {
    create_kind(name.parse()?, config)
}

/// Per-point scheduling used by the pipeline.
///
/// `map_points` evaluates `f` for every index in `0..n` and returns the
/// results in index order. Implementations choose how the calls are
/// scheduled; `f` only ever writes its own output slot.
pub(crate) trait PointMap {
    fn map_points<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;

    /// Resolve follower labels; see [`super::propagate`].
    fn resolve_followers(&self, labels: &mut [i32], nh: &[Option<usize>], rho: &[f32]) {
        super::propagate::resolve_by_density_order(labels, nh, rho);
    }
}
