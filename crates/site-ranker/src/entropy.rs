//! Entropy weighting
//!
//! Derives an objective weight per criterion from how evenly its normalized
//! values are spread across records:
//!
//! ```text
//! P[i,j] = X[i,j] / Σᵢ X[i,j]
//! E[j]   = -1/ln(n) · Σᵢ P[i,j] · ln(P[i,j] + ε)
//! d[j]   = 1 - E[j]
//! w[j]   = d[j] / Σ d
//! ```
//!
//! A criterion whose values are spread evenly carries maximal entropy and
//! gets (close to) zero weight; a criterion concentrated on few records is
//! discriminating and gets a large weight.

use crate::criteria::CriterionSpec;
use crate::normalize::NormalizedMatrix;
use crate::{RankerError, Result};
use serde::Serialize;
use tracing::debug;

/// Added inside the logarithm so zero entries give `0 · ln(ε) = 0` instead
/// of `0 · ln(0) = NaN`. Numerical guard only, not a model parameter.
const LN_EPSILON: f64 = 1e-12;

/// Criterion weights, aligned with the criterion order. Sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightVector {
    weights: Vec<f64>,
    entropies: Vec<f64>,
}

impl WeightVector {
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Normalized entropy `E[j]` each weight was derived from
    pub fn entropies(&self) -> &[f64] {
        &self.entropies
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, j: usize) -> f64 {
        self.weights[j]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Compute entropy weights for a normalized matrix.
///
/// `criteria` names the matrix columns for error messages and logging.
pub fn entropy_weights(matrix: &NormalizedMatrix, criteria: &CriterionSpec) -> Result<WeightVector> {
    let n = matrix.nrows();
    let m = matrix.ncols();

    if m != criteria.len() {
        return Err(RankerError::DimensionMismatch(format!(
            "matrix has {} columns for {} criteria",
            m,
            criteria.len()
        )));
    }
    if n < 2 {
        return Err(RankerError::TooFewRecords(n));
    }

    let k = 1.0 / (n as f64).ln();
    let x = matrix.as_matrix();

    let mut entropies = Vec::with_capacity(m);
    let mut divergences = Vec::with_capacity(m);

    for j in 0..m {
        let column = x.column(j);
        let total: f64 = column.iter().sum();

        if !(total > 0.0) || !total.is_finite() {
            return Err(RankerError::DegenerateWeights(format!(
                "criterion '{}' sums to {}",
                criteria.name(j),
                total
            )));
        }

        let entropy = -k
            * column
                .iter()
                .map(|&v| {
                    let p = v / total;
                    p * (p + LN_EPSILON).ln()
                })
                .sum::<f64>();

        if !entropy.is_finite() {
            return Err(RankerError::DegenerateWeights(format!(
                "criterion '{}' has entropy {}",
                criteria.name(j),
                entropy
            )));
        }

        // An evenly spread column has d = 0 exactly; ε would otherwise leave
        // a residue of order ε·n/ln(n).
        let (lo, hi) = column
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let divergence = if lo == hi { 0.0 } else { (1.0 - entropy).max(0.0) };

        debug!(
            "Criterion {}: entropy={:.6}, divergence={:.6}",
            criteria.name(j),
            entropy,
            divergence
        );

        entropies.push(entropy);
        divergences.push(divergence);
    }

    let total_divergence: f64 = divergences.iter().sum();
    if !(total_divergence > 0.0) || !total_divergence.is_finite() {
        return Err(RankerError::DegenerateWeights(format!(
            "total divergence is {}; every criterion is evenly distributed",
            total_divergence
        )));
    }

    let weights = divergences.iter().map(|d| d / total_divergence).collect();

    Ok(WeightVector { weights, entropies })
}
