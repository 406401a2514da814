//! Per-dimension coordinate domains, including periodic (wrapped) axes.

use crate::error::{Error, Result};

/// Coordinate range of one dimension.
///
/// Unbounded dimensions use the representable `f32` extremes. A wrapped
/// dimension treats `min` and `max` as the same location, so the distance
/// between two coordinates is the shorter of the direct and wrap-around
/// differences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimDomain {
    /// Lower bound of the axis.
    pub min: f32,
    /// Upper bound of the axis.
    pub max: f32,
    /// Whether the axis is periodic.
    pub wrapped: bool,
}

impl DimDomain {
    /// An unbounded, non-periodic axis.
    pub const UNBOUNDED: DimDomain = DimDomain {
        min: f32::MIN,
        max: f32::MAX,
        wrapped: false,
    };

    /// A bounded, non-periodic axis.
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            wrapped: false,
        }
    }

    /// A periodic axis of period `max - min`.
    pub fn wrapped(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            wrapped: true,
        }
    }

    /// Period of a wrapped axis, `None` for a non-periodic one.
    #[inline]
    pub fn period(&self) -> Option<f32> {
        self.wrapped.then(|| self.max - self.min)
    }

    /// Map a coordinate of a wrapped axis into `[min, max)`.
    ///
    /// Non-periodic coordinates are returned unchanged.
    #[inline]
    pub fn normalize(&self, x: f32) -> f32 {
        match self.period() {
            Some(period) => self.min + (x - self.min).rem_euclid(period),
            None => x,
        }
    }

    fn validate(&self, dim: usize) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err(Error::InvalidDomain {
                dim,
                message: "bounds must not be NaN",
            });
        }
        if self.min > self.max {
            return Err(Error::InvalidDomain {
                dim,
                message: "min must not exceed max",
            });
        }
        if self.wrapped {
            let period = self.max - self.min;
            if !period.is_finite() || period <= 0.0 {
                return Err(Error::InvalidDomain {
                    dim,
                    message: "wrapped dimensions need a finite, non-empty range",
                });
            }
        }
        Ok(())
    }
}

impl Default for DimDomain {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Domain of a point cloud: one [`DimDomain`] per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    dims: Vec<DimDomain>,
}

impl Domain {
    /// A domain whose dimensions are all unbounded and non-periodic.
    pub fn unbounded(n_dim: usize) -> Self {
        Self {
            dims: vec![DimDomain::UNBOUNDED; n_dim],
        }
    }

    /// Build a domain from explicit per-dimension ranges.
    pub fn new(dims: Vec<DimDomain>) -> Self {
        Self { dims }
    }

    /// Replace the range of one dimension.
    ///
    /// Indices past the current dimension count are ignored; shape checks
    /// happen when the domain is used against a point set.
    pub fn with_dim(mut self, dim: usize, range: DimDomain) -> Self {
        if let Some(slot) = self.dims.get_mut(dim) {
            *slot = range;
        }
        self
    }

    /// Make one dimension periodic over `[min, max)`.
    pub fn with_wrapped(self, dim: usize, min: f32, max: f32) -> Self {
        self.with_dim(dim, DimDomain::wrapped(min, max))
    }

    /// Number of dimensions.
    pub fn n_dim(&self) -> usize {
        self.dims.len()
    }

    /// Per-dimension ranges.
    pub fn dims(&self) -> &[DimDomain] {
        &self.dims
    }

    /// Wrapped flag of every dimension.
    pub fn wrapped_flags(&self) -> Vec<bool> {
        self.dims.iter().map(|d| d.wrapped).collect()
    }

    /// Period of each dimension (`None` where the axis is not wrapped).
    pub fn periods(&self) -> Vec<Option<f32>> {
        self.dims.iter().map(DimDomain::period).collect()
    }

    /// Check the domain against the dimensionality of a point set.
    pub fn validate(&self, n_dim: usize) -> Result<()> {
        if self.dims.len() != n_dim {
            return Err(Error::DimensionMismatch {
                expected: n_dim,
                found: self.dims.len(),
            });
        }
        for (dim, range) in self.dims.iter().enumerate() {
            range.validate(dim)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_range() {
        let d = DimDomain::wrapped(0.0, 10.0);
        assert!((d.normalize(12.5) - 2.5).abs() < 1e-6);
        assert!((d.normalize(-1.0) - 9.0).abs() < 1e-6);
        assert_eq!(d.normalize(3.0), 3.0);

        let plain = DimDomain::new(0.0, 10.0);
        assert_eq!(plain.normalize(12.5), 12.5);
    }

    #[test]
    fn wrapped_unbounded_is_rejected() {
        let domain = Domain::unbounded(2).with_dim(1, DimDomain {
            wrapped: true,
            ..DimDomain::UNBOUNDED
        });
        assert!(matches!(
            domain.validate(2),
            Err(Error::InvalidDomain { dim: 1, .. })
        ));
    }

    #[test]
    fn dimension_count_must_match() {
        let domain = Domain::unbounded(3);
        assert!(matches!(
            domain.validate(2),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let domain = Domain::new(vec![DimDomain::new(5.0, 1.0)]);
        assert!(domain.validate(1).is_err());
    }
}
