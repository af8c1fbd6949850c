//! Typed site records extracted from a [`DataTable`]
//!
//! All input validation happens here so the numeric stages can assume a
//! well-formed table: at least two records, unique non-empty identifiers,
//! finite coordinates and finite criterion values.

use crate::criteria::CriterionSpec;
use crate::table::{Cell, DataTable};
use crate::{ColumnSchema, RankerError, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Minimum table size: min-max ranges and `ln(n)` need two records
pub const MIN_RECORDS: usize = 2;

/// One candidate site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Criterion values, aligned with the table's [`CriterionSpec`]
    pub values: Vec<f64>,
}

/// Validated records plus the criteria their `values` are aligned with
#[derive(Debug, Clone, Serialize)]
pub struct RecordTable {
    criteria: CriterionSpec,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new(criteria: CriterionSpec, records: Vec<Record>) -> Result<Self> {
        if records.len() < MIN_RECORDS {
            return Err(RankerError::TooFewRecords(records.len()));
        }

        let mut ids = HashSet::new();
        for (i, r) in records.iter().enumerate() {
            if r.id.is_empty() {
                return Err(RankerError::EmptyId(i + 1));
            }
            if !ids.insert(r.id.as_str()) {
                return Err(RankerError::DuplicateId(r.id.clone()));
            }
            if r.values.len() != criteria.len() {
                return Err(RankerError::DimensionMismatch(format!(
                    "record '{}' has {} values for {} criteria",
                    r.id,
                    r.values.len(),
                    criteria.len()
                )));
            }
            check_finite(r.longitude, "longitude", i + 1)?;
            check_finite(r.latitude, "latitude", i + 1)?;
            for (j, v) in r.values.iter().enumerate() {
                check_finite(*v, criteria.name(j), i + 1)?;
            }
        }

        Ok(Self { criteria, records })
    }

    /// Extract the schema columns and selected criteria from a loaded table
    pub fn from_table(table: &DataTable, schema: &ColumnSchema, criteria: CriterionSpec) -> Result<Self> {
        if table.len() < MIN_RECORDS {
            return Err(RankerError::TooFewRecords(table.len()));
        }

        let id_col = table.require_column(&schema.id)?;
        let lon_col = table.require_column(&schema.longitude)?;
        let lat_col = table.require_column(&schema.latitude)?;
        let criterion_cols = criteria
            .iter()
            .map(|c| table.require_column(&c.name))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(table.len());

        for (i, row) in table.rows().iter().enumerate() {
            let row_no = i + 1;
            let id = row[id_col]
                .label()
                .ok_or(RankerError::EmptyId(row_no))?
                .to_string();
            let longitude = numeric(&row[lon_col], &schema.longitude, row_no)?;
            let latitude = numeric(&row[lat_col], &schema.latitude, row_no)?;
            let values = criteria
                .iter()
                .zip(&criterion_cols)
                .map(|(c, &col)| numeric(&row[col], &c.name, row_no))
                .collect::<Result<Vec<_>>>()?;

            debug!("Record {}: ({:.6}, {:.6}) {:?}", id, longitude, latitude, values);

            records.push(Record {
                id,
                longitude,
                latitude,
                values,
            });
        }

        info!(
            "Extracted {} records with {} criteria",
            records.len(),
            criteria.len()
        );

        Self::new(criteria, records)
    }

    pub fn criteria(&self) -> &CriterionSpec {
        &self.criteria
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false once constructed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of criterion `j` across all records
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(move |r| r.values[j])
    }
}

fn numeric(cell: &Cell, column: &str, row: usize) -> Result<f64> {
    let value = cell.as_f64().ok_or_else(|| RankerError::NonNumeric {
        column: column.to_string(),
        row,
        value: cell.label().unwrap_or("").to_string(),
    })?;
    check_finite(value, column, row)?;
    Ok(value)
}

fn check_finite(value: f64, column: &str, row: usize) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RankerError::NonNumeric {
            column: column.to_string(),
            row,
            value: value.to_string(),
        })
    }
}
