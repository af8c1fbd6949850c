//! End-to-end ranking: request in, report out

use crate::criteria::{Criterion, CriterionSpec, Direction};
use crate::entropy::entropy_weights;
use crate::normalize::normalize;
use crate::ordering::order_results;
use crate::records::RecordTable;
use crate::table::DataTable;
use crate::topsis::closeness;
use crate::{ColumnSchema, Result, ScoreResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Everything the pipeline needs besides the table itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRequest {
    #[serde(default)]
    pub schema: ColumnSchema,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

impl RankingRequest {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self {
            schema: ColumnSchema::default(),
            criteria,
        }
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }
}

/// Derived weight of one criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub criterion: String,
    pub direction: Direction,
    pub entropy: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub total_records: usize,
    pub criteria_count: usize,
    pub generated_at: String,
}

/// Ranked sites plus the weights that produced them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub weights: Vec<CriterionWeight>,
    /// Sorted by distance to the reference corner
    pub results: Vec<ScoreResult>,
    pub metadata: ReportMetadata,
}

/// Validate `table` against `request` and rank it
pub fn rank(table: &DataTable, request: &RankingRequest) -> Result<RankingReport> {
    let criteria = CriterionSpec::new(request.criteria.clone())?;
    let records = RecordTable::from_table(table, &request.schema, criteria)?;
    rank_records(&records)
}

/// Run normalization, entropy weighting, TOPSIS and ordering
pub fn rank_records(records: &RecordTable) -> Result<RankingReport> {
    let criteria = records.criteria();

    let normalized = normalize(records)?;
    let weights = entropy_weights(&normalized, criteria)?;

    for (c, w) in criteria.iter().zip(weights.weights()) {
        info!("Weight {:>24} ({}): {:.6}", c.name, c.direction, w);
    }

    let scores = closeness(&normalized, &weights)?;
    for (r, s) in records.records().iter().zip(&scores) {
        debug!(
            "{}: D+={:.6} D-={:.6} CR={:.6}",
            r.id, s.d_plus, s.d_minus, s.ratio
        );
    }

    let ratios: Vec<f64> = scores.iter().map(|s| s.ratio).collect();
    let results = order_results(records, &ratios)?;

    info!("Ranked {} records", results.len());

    let weights = criteria
        .iter()
        .zip(weights.weights().iter().zip(weights.entropies()))
        .map(|(c, (&weight, &entropy))| CriterionWeight {
            criterion: c.name.clone(),
            direction: c.direction,
            entropy,
            weight,
        })
        .collect();

    Ok(RankingReport {
        weights,
        metadata: ReportMetadata {
            total_records: results.len(),
            criteria_count: criteria.len(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        results,
    })
}
