//! TOPSIS closeness ratio
//!
//! ```text
//! V[i,j] = X[i,j] · w[j]
//! Z⁺[j]  = maxᵢ V[i,j]            Z⁻[j] = minᵢ V[i,j]
//! D⁺[i]  = ‖V[i,·] - Z⁺‖₂         D⁻[i] = ‖V[i,·] - Z⁻‖₂
//! CR[i]  = D⁻[i] / (D⁺[i] + D⁻[i])
//! ```

use crate::entropy::WeightVector;
use crate::normalize::NormalizedMatrix;
use crate::{RankerError, Result};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::debug;

/// Per-record TOPSIS output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Closeness {
    /// Distance to the ideal point
    pub d_plus: f64,
    /// Distance to the anti-ideal point
    pub d_minus: f64,
    /// Closeness ratio (0-1)
    pub ratio: f64,
}

/// Build `V = X · diag(w)`
pub fn weighted_matrix(matrix: &NormalizedMatrix, weights: &WeightVector) -> Result<DMatrix<f64>> {
    if weights.len() != matrix.ncols() {
        return Err(RankerError::DimensionMismatch(format!(
            "{} weights for {} criteria",
            weights.len(),
            matrix.ncols()
        )));
    }

    let x = matrix.as_matrix();
    Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
        x[(i, j)] * weights.get(j)
    }))
}

/// Ideal (`Z⁺`) and anti-ideal (`Z⁻`) points of a weighted matrix
pub fn ideal_points(v: &DMatrix<f64>) -> (DVector<f64>, DVector<f64>) {
    let ideal = DVector::from_fn(v.ncols(), |j, _| {
        v.column(j).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    });
    let anti_ideal = DVector::from_fn(v.ncols(), |j, _| {
        v.column(j).iter().copied().fold(f64::INFINITY, f64::min)
    });
    (ideal, anti_ideal)
}

/// Closeness of every record to the weighted ideal point
pub fn closeness(matrix: &NormalizedMatrix, weights: &WeightVector) -> Result<Vec<Closeness>> {
    let v = weighted_matrix(matrix, weights)?;
    let (ideal, anti_ideal) = ideal_points(&v);

    debug!("Ideal point: {:?}", ideal.as_slice());
    debug!("Anti-ideal point: {:?}", anti_ideal.as_slice());

    let mut out = Vec::with_capacity(v.nrows());

    for i in 0..v.nrows() {
        let row = v.row(i);
        let d_plus = row
            .iter()
            .zip(ideal.iter())
            .map(|(x, z)| (x - z).powi(2))
            .sum::<f64>()
            .sqrt();
        let d_minus = row
            .iter()
            .zip(anti_ideal.iter())
            .map(|(x, z)| (x - z).powi(2))
            .sum::<f64>()
            .sqrt();

        let denominator = d_plus + d_minus;
        if !(denominator > 0.0) {
            return Err(RankerError::DegenerateWeights(format!(
                "record {} coincides with both the ideal and anti-ideal point",
                i + 1
            )));
        }

        out.push(Closeness {
            d_plus,
            d_minus,
            ratio: d_minus / denominator,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Criterion, CriterionSpec};
    use crate::entropy::entropy_weights;

    fn weights_for(m: &NormalizedMatrix) -> WeightVector {
        let spec = CriterionSpec::new(
            (0..m.ncols())
                .map(|j| Criterion::maximize(format!("c{}", j)))
                .collect(),
        )
        .unwrap();
        entropy_weights(m, &spec).unwrap()
    }

    #[test]
    fn test_single_criterion_closeness_equals_normalized_value() {
        let m = NormalizedMatrix::from_rows(3, 1, &[0.0, 0.5, 1.0]).unwrap();
        let w = weights_for(&m);
        let cr: Vec<f64> = closeness(&m, &w).unwrap().iter().map(|c| c.ratio).collect();
        assert_eq!(cr[0], 0.0);
        assert!((cr[1] - 0.5).abs() < 1e-12);
        assert_eq!(cr[2], 1.0);
    }

    #[test]
    fn test_ideal_record_scores_one_anti_ideal_scores_zero() {
        // Record 0 is best on both criteria, record 2 is worst on both
        let m = NormalizedMatrix::from_rows(
            3,
            2,
            &[
                1.0, 1.0, //
                0.3, 0.7, //
                0.0, 0.0,
            ],
        )
        .unwrap();
        let w = weights_for(&m);
        let c = closeness(&m, &w).unwrap();
        assert_eq!(c[0].d_plus, 0.0);
        assert_eq!(c[0].ratio, 1.0);
        assert_eq!(c[2].d_minus, 0.0);
        assert_eq!(c[2].ratio, 0.0);
        assert!(c[1].ratio > 0.0 && c[1].ratio < 1.0);
    }

    #[test]
    fn test_ideal_points() {
        let v = DMatrix::from_row_slice(2, 2, &[0.1, 0.4, 0.3, 0.2]);
        let (ideal, anti) = ideal_points(&v);
        assert_eq!(ideal.as_slice(), &[0.3, 0.4]);
        assert_eq!(anti.as_slice(), &[0.1, 0.2]);
    }

    #[test]
    fn test_weight_length_mismatch() {
        let m2 = NormalizedMatrix::from_rows(2, 2, &[0.0, 1.0, 1.0, 0.0]).unwrap();
        let w1 = weights_for(&NormalizedMatrix::from_rows(2, 1, &[0.0, 1.0]).unwrap());
        assert!(matches!(
            closeness(&m2, &w1),
            Err(RankerError::DimensionMismatch(_))
        ));
    }
}
