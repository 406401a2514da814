use thiserror::Error;

/// Errors returned by the clustering engine.
///
/// Configuration and shape errors are reported before any stage runs, so a
/// failed call never leaves partially written output behind.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A kernel was given the wrong number of parameters.
    #[error("kernel {kernel} takes {expected} parameter(s), got {found}")]
    KernelParameterCount {
        /// Kernel name.
        kernel: &'static str,
        /// Number of parameters the kernel requires.
        expected: usize,
        /// Number of parameters supplied.
        found: usize,
    },

    /// The kernel name is not one of `flat`, `exp`, `gaus`, `custom`.
    #[error("unknown kernel {0:?}: expected one of flat, exp, gaus, custom")]
    UnknownKernel(String),

    /// The backend name does not match any known backend.
    #[error("unknown backend {0:?}")]
    UnknownBackend(String),

    /// The backend is known but was not compiled into this build.
    #[error("backend {backend} is not available in this build")]
    BackendUnavailable {
        /// Canonical backend name.
        backend: &'static str,
    },

    /// The backend's worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Dimension count outside the supported range.
    #[error("dimension count {found} is outside the supported range 1..={max}")]
    DimensionOutOfRange {
        /// Requested number of dimensions.
        found: usize,
        /// Largest supported number of dimensions.
        max: usize,
    },

    /// Points or per-dimension settings have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Parallel input arrays disagree in length.
    #[error("length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        /// Which array is inconsistent.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// A coordinate or weight is NaN, infinite, or (for weights) negative.
    #[error("invalid {what} at point {index}")]
    NonFiniteInput {
        /// `"coordinate"` or `"weight"`.
        what: &'static str,
        /// Offending point index.
        index: usize,
    },

    /// A point's density does not fit in an `f32`.
    ///
    /// Raised when weights are large enough that their sum overflows.
    #[error("density of point {index} overflows f32")]
    DensityOverflow {
        /// Offending point index.
        index: usize,
    },

    /// A dimension's domain cannot be used as configured.
    #[error("invalid domain for dimension {dim}: {message}")]
    InvalidDomain {
        /// Dimension index.
        dim: usize,
        /// Human-readable explanation.
        message: &'static str,
    },
}

impl Error {
    /// True for errors caused by the requested backend rather than the input.
    ///
    /// Callers can recover from these by picking another backend.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Error::BackendUnavailable { .. } | Error::ThreadPool(_))
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
