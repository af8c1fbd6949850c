//! Final result ordering by proximity to the reference corner
//!
//! The ranked table is presented sorted by planar distance (in degrees) to
//! the point (minimum longitude, minimum latitude) of the table. Ties keep
//! input order.

use crate::records::RecordTable;
use crate::{RankerError, Result, ScoreResult};
use serde::Serialize;
use tracing::debug;

/// The table's south-west corner in coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl ReferencePoint {
    /// Table-wide minimum longitude and minimum latitude
    pub fn corner_of(table: &RecordTable) -> Self {
        let (longitude, latitude) = table.records().iter().fold(
            (f64::INFINITY, f64::INFINITY),
            |(lon, lat), r| (lon.min(r.longitude), lat.min(r.latitude)),
        );
        Self {
            longitude,
            latitude,
        }
    }

    /// Euclidean distance in degree space, longitude against longitude and
    /// latitude against latitude
    pub fn distance(&self, longitude: f64, latitude: f64) -> f64 {
        ((longitude - self.longitude).powi(2) + (latitude - self.latitude).powi(2)).sqrt()
    }
}

/// Pair each record with its closeness ratio and sort by reference distance
pub fn order_results(table: &RecordTable, scores: &[f64]) -> Result<Vec<ScoreResult>> {
    if scores.len() != table.len() {
        return Err(RankerError::DimensionMismatch(format!(
            "{} scores for {} records",
            scores.len(),
            table.len()
        )));
    }

    let corner = ReferencePoint::corner_of(table);
    debug!(
        "Reference corner: ({:.6}, {:.6})",
        corner.longitude, corner.latitude
    );

    let mut rows: Vec<(f64, ScoreResult)> = table
        .records()
        .iter()
        .zip(scores)
        .map(|(r, &score)| {
            (
                corner.distance(r.longitude, r.latitude),
                ScoreResult {
                    id: r.id.clone(),
                    longitude: r.longitude,
                    latitude: r.latitude,
                    score,
                },
            )
        })
        .collect();

    // sort_by is stable: equal distances keep input order
    rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    Ok(rows.into_iter().map(|(_, row)| row).collect())
}
