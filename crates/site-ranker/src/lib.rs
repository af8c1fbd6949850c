//! Facility Site Ranker
//!
//! Ranks candidate facility sites by multi-criteria desirability using
//! entropy-weighted TOPSIS, then orders the ranked table by proximity to
//! the dataset's south-west corner.
//!
//! # Pipeline
//!
//! ```text
//! RecordTable ──► normalize ──► entropy_weights ──► closeness ──► order_results
//!                 X ∈ [0,1]     w, Σw = 1           CR ∈ [0,1]    sorted by distance
//! ```
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Min-max normalization (direction-aware) | [`normalize`] | [`NormalizedMatrix`] |
//! | Entropy weighting | [`entropy`] | [`WeightVector`] |
//! | TOPSIS closeness | [`topsis`] | closeness ratio per record |
//! | Reference-corner ordering | [`ordering`] | [`ScoreResult`] rows |
//!
//! # Column Schema
//!
//! The default schema matches the facility survey workbook:
//!
//! | Role | Column |
//! |------|--------|
//! | Identifier | `FCIL_CDE` |
//! | Longitude | `经度` |
//! | Latitude | `纬度` |
//! | Score (output) | `TOPSIS得分` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod criteria;
pub mod entropy;
pub mod export;
pub mod loader;
pub mod normalize;
pub mod ordering;
pub mod pipeline;
pub mod records;
pub mod table;
pub mod topsis;


pub use criteria::{Criterion, CriterionSpec, Direction};
pub use entropy::WeightVector;
pub use normalize::NormalizedMatrix;
pub use pipeline::{rank, rank_records, RankingReport, RankingRequest};
pub use records::{Record, RecordTable};
pub use table::{Cell, DataTable};

/// Default identifier column
pub const DEFAULT_ID_COLUMN: &str = "FCIL_CDE";
/// Default longitude column
pub const DEFAULT_LONGITUDE_COLUMN: &str = "经度";
/// Default latitude column
pub const DEFAULT_LATITUDE_COLUMN: &str = "纬度";
/// Default score column written to the output table
pub const DEFAULT_SCORE_COLUMN: &str = "TOPSIS得分";

#[derive(Error, Debug)]
pub enum RankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),
    #[error("Excel write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Malformed table: {0}")]
    MalformedTable(String),
    #[error("No criteria selected")]
    NoCriteria,
    #[error("Criterion selected more than once: {0}")]
    DuplicateCriterion(String),
    #[error("Invalid criterion direction: {0}")]
    InvalidDirection(String),
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Non-numeric value in column '{column}' at row {row}: {value:?}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Missing identifier at row {0}")]
    EmptyId(usize),
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),
    #[error("Need at least 2 records, have {0}")]
    TooFewRecords(usize),
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Normalized value at row {row}, column {column} is outside [0, 1]: {value}")]
    OutOfRange { row: usize, column: usize, value: f64 },
    #[error("Criterion column '{0}' is constant ({1}); min-max normalization is undefined")]
    DegenerateColumn(String, f64),
    #[error("Entropy weights are undefined: {0}")]
    DegenerateWeights(String),
}

impl RankerError {
    /// True for errors caused by the request or table contents rather than
    /// by the numeric pipeline or the filesystem.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoCriteria
                | Self::DuplicateCriterion(_)
                | Self::InvalidDirection(_)
                | Self::MissingColumn(_)
                | Self::NonNumeric { .. }
                | Self::EmptyId(_)
                | Self::DuplicateId(_)
                | Self::TooFewRecords(_)
                | Self::DimensionMismatch(_)
                | Self::OutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RankerError>;

/// Names of the fixed columns of a site table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Unique facility identifier
    pub id: String,
    /// Longitude in decimal degrees
    pub longitude: String,
    /// Latitude in decimal degrees
    pub latitude: String,
    /// Header used for the closeness ratio in exported tables
    pub score: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_COLUMN.to_string(),
            longitude: DEFAULT_LONGITUDE_COLUMN.to_string(),
            latitude: DEFAULT_LATITUDE_COLUMN.to_string(),
            score: DEFAULT_SCORE_COLUMN.to_string(),
        }
    }
}

impl ColumnSchema {
    /// Output header in export order: identifier, longitude, latitude, score
    pub fn output_header(&self) -> [&str; 4] {
        [&self.id, &self.longitude, &self.latitude, &self.score]
    }
}

/// A ranked site: the externally visible result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// TOPSIS closeness ratio (0-1, higher = closer to the ideal site)
    pub score: f64,
}
