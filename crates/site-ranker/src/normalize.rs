//! Direction-aware min-max normalization
//!
//! ```text
//! Maximize: x = (v - min) / (max - min)
//! Minimize: x = (max - v) / (max - min)
//! ```
//!
//! After normalization a higher value is always more desirable, the best
//! record of each criterion maps to exactly 1 and the worst to exactly 0.

use crate::criteria::Direction;
use crate::records::RecordTable;
use crate::{RankerError, Result};
use nalgebra::DMatrix;
use tracing::debug;

/// Records × criteria matrix with entries in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatrix {
    matrix: DMatrix<f64>,
}

impl NormalizedMatrix {
    /// Wrap an already-normalized matrix (rows = records, columns = criteria).
    ///
    /// Every entry must be finite and within [0, 1], otherwise
    /// [`RankerError::OutOfRange`] names the first offending cell.
    pub fn new(matrix: DMatrix<f64>) -> Result<Self> {
        for j in 0..matrix.ncols() {
            for i in 0..matrix.nrows() {
                let value = matrix[(i, j)];
                if !(0.0..=1.0).contains(&value) {
                    return Err(RankerError::OutOfRange {
                        row: i,
                        column: j,
                        value,
                    });
                }
            }
        }
        Ok(Self { matrix })
    }

    pub fn from_rows(nrows: usize, ncols: usize, data: &[f64]) -> Result<Self> {
        Self::new(DMatrix::from_row_slice(nrows, ncols, data))
    }

    #[cfg(test)]
    pub(crate) fn unchecked(nrows: usize, ncols: usize, data: &[f64]) -> Self {
        Self {
            matrix: DMatrix::from_row_slice(nrows, ncols, data),
        }
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

/// Normalize every selected criterion of `table`.
///
/// Fails with [`RankerError::DegenerateColumn`] when a criterion has the same
/// value for every record.
pub fn normalize(table: &RecordTable) -> Result<NormalizedMatrix> {
    let criteria = table.criteria();
    let mut ranges = Vec::with_capacity(criteria.len());

    for (j, criterion) in criteria.iter().enumerate() {
        let (min, max) = table
            .column(j)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;

        if range == 0.0 {
            return Err(RankerError::DegenerateColumn(criterion.name.clone(), min));
        }
        if !range.is_finite() {
            return Err(RankerError::MalformedTable(format!(
                "criterion '{}' range {} .. {} overflows",
                criterion.name, min, max
            )));
        }

        debug!(
            "Normalizing {} ({}): min={}, max={}",
            criterion.name, criterion.direction, min, max
        );
        ranges.push((criterion.direction, min, max, range));
    }

    let records = table.records();
    let matrix = DMatrix::from_fn(records.len(), ranges.len(), |i, j| {
        let (direction, min, max, range) = ranges[j];
        let v = records[i].values[j];
        match direction {
            Direction::Maximize => (v - min) / range,
            Direction::Minimize => (max - v) / range,
        }
    });

    NormalizedMatrix::new(matrix)
}
