//! Weighted point clouds.

use crate::error::{Error, Result};

/// Largest supported number of dimensions.
pub const MAX_DIM: usize = 10;

/// A validated, weighted point cloud stored row-major.
///
/// Every coordinate and weight is finite, weights are non-negative, and the
/// dimensionality lies in `1..=MAX_DIM`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    n_dim: usize,
    coords: Vec<f32>,
    weights: Vec<f32>,
}

impl PointSet {
    /// Build from one coordinate array per dimension plus a weight array.
    ///
    /// This is the column layout handed over by ingestion: `columns[d][i]`
    /// is coordinate `d` of point `i`.
    pub fn from_columns(columns: &[Vec<f32>], weights: Vec<f32>) -> Result<Self> {
        let n_dim = columns.len();
        check_dim(n_dim)?;
        let n = weights.len();
        for column in columns {
            if column.len() != n {
                return Err(Error::LengthMismatch {
                    what: "coordinates",
                    expected: n,
                    found: column.len(),
                });
            }
        }

        let mut coords = Vec::with_capacity(n * n_dim);
        for i in 0..n {
            coords.extend(columns.iter().map(|column| column[i]));
        }
        Self::from_flat(n_dim, coords, weights)
    }

    /// Build from row-major points (`rows[i][d]`) plus a weight array.
    ///
    /// The dimensionality is taken from the first row, so `rows` must not
    /// be empty. Use [`PointSet::from_rows_with_dim`] when it may be.
    pub fn from_rows(rows: &[Vec<f32>], weights: Vec<f32>) -> Result<Self> {
        let n_dim = rows.first().map_or(0, Vec::len);
        Self::from_rows_with_dim(n_dim, rows, weights)
    }

    /// Build from row-major points of a known dimensionality.
    ///
    /// Accepts an empty `rows`, like [`PointSet::from_columns`] with empty
    /// columns.
    pub fn from_rows_with_dim(n_dim: usize, rows: &[Vec<f32>], weights: Vec<f32>) -> Result<Self> {
        if rows.len() != weights.len() {
            return Err(Error::LengthMismatch {
                what: "weights",
                expected: rows.len(),
                found: weights.len(),
            });
        }
        check_dim(n_dim)?;

        let mut coords = Vec::with_capacity(rows.len() * n_dim);
        for row in rows {
            if row.len() != n_dim {
                return Err(Error::DimensionMismatch {
                    expected: n_dim,
                    found: row.len(),
                });
            }
            coords.extend_from_slice(row);
        }
        Self::from_flat(n_dim, coords, weights)
    }

    /// Row-major points, every weight set to one.
    pub fn from_rows_unweighted(rows: &[Vec<f32>]) -> Result<Self> {
        Self::from_rows(rows, vec![1.0; rows.len()])
    }

    /// Build from a flat row-major coordinate buffer of `n * n_dim` values.
    pub fn from_flat(n_dim: usize, coords: Vec<f32>, weights: Vec<f32>) -> Result<Self> {
        check_dim(n_dim)?;
        if coords.len() != weights.len() * n_dim {
            return Err(Error::LengthMismatch {
                what: "coordinates",
                expected: weights.len() * n_dim,
                found: coords.len(),
            });
        }
        if let Some(pos) = coords.iter().position(|x| !x.is_finite()) {
            return Err(Error::NonFiniteInput {
                what: "coordinate",
                index: pos / n_dim,
            });
        }
        if let Some(index) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::NonFiniteInput {
                what: "weight",
                index,
            });
        }

        Ok(Self {
            n_dim,
            coords,
            weights,
        })
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if the set holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of dimensions.
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Coordinates of point `i`.
    #[inline]
    pub fn coords(&self, i: usize) -> &[f32] {
        &self.coords[i * self.n_dim..(i + 1) * self.n_dim]
    }

    /// Weight of point `i`.
    #[inline]
    pub fn weight(&self, i: usize) -> f32 {
        self.weights[i]
    }

    /// All weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Smallest and largest coordinate along `dim`.
    ///
    /// Returns `None` for an empty set.
    pub(crate) fn extent(&self, dim: usize) -> Option<(f32, f32)> {
        self.coords
            .iter()
            .skip(dim)
            .step_by(self.n_dim)
            .fold(None, |acc, &x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }
}

fn check_dim(n_dim: usize) -> Result<()> {
    if n_dim == 0 || n_dim > MAX_DIM {
        return Err(Error::DimensionOutOfRange {
            found: n_dim,
            max: MAX_DIM,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_and_rows_agree() {
        let by_cols =
            PointSet::from_columns(&[vec![0.0, 1.0, 2.0], vec![5.0, 6.0, 7.0]], vec![1.0; 3])
                .unwrap();
        let by_rows = PointSet::from_rows(
            &[vec![0.0, 5.0], vec![1.0, 6.0], vec![2.0, 7.0]],
            vec![1.0; 3],
        )
        .unwrap();
        assert_eq!(by_cols, by_rows);
        assert_eq!(by_rows.coords(1), &[1.0, 6.0]);
        assert_eq!(by_rows.extent(1), Some((5.0, 7.0)));
    }

    #[test]
    fn rejects_bad_dimension_counts() {
        assert!(matches!(
            PointSet::from_columns(&[], vec![]),
            Err(Error::DimensionOutOfRange { found: 0, .. })
        ));
        let eleven = vec![vec![0.0]; 11];
        assert!(matches!(
            PointSet::from_columns(&eleven, vec![1.0]),
            Err(Error::DimensionOutOfRange { found: 11, .. })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = PointSet::from_columns(&[vec![0.0, 1.0], vec![0.0]], vec![1.0, 1.0]);
        assert!(matches!(err, Err(Error::LengthMismatch { .. })));

        let err = PointSet::from_rows(&[vec![0.0], vec![1.0]], vec![1.0]);
        assert!(matches!(err, Err(Error::LengthMismatch { what: "weights", .. })));

        let err = PointSet::from_rows(&[vec![0.0, 1.0], vec![1.0]], vec![1.0, 1.0]);
        assert!(matches!(err, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = PointSet::from_rows(&[vec![0.0], vec![f32::NAN]], vec![1.0, 1.0]);
        assert!(matches!(
            err,
            Err(Error::NonFiniteInput {
                what: "coordinate",
                index: 1
            })
        ));

        let err = PointSet::from_rows(&[vec![0.0], vec![1.0]], vec![1.0, -2.0]);
        assert!(matches!(
            err,
            Err(Error::NonFiniteInput {
                what: "weight",
                index: 1
            })
        ));
    }

    #[test]
    fn empty_rows_with_known_dimension() {
        let empty = PointSet::from_rows_with_dim(2, &[], vec![]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.n_dim(), 2);
        assert_eq!(empty, PointSet::from_columns(&[vec![], vec![]], vec![]).unwrap());

        // Without a first row the dimension cannot be inferred.
        assert!(matches!(
            PointSet::from_rows(&[], vec![]),
            Err(Error::DimensionOutOfRange { found: 0, .. })
        ));

        let err = PointSet::from_rows_with_dim(3, &[vec![0.0, 1.0]], vec![1.0]);
        assert!(matches!(err, Err(Error::DimensionMismatch { expected: 3, found: 2 })));
    }
}
