//! Untyped tabular data as read from a spreadsheet export

use crate::{RankerError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Empty,
    /// Numeric cell; `text` keeps the source spelling (e.g. leading zeros)
    Number { value: f64, text: String },
    Text(String),
}

impl Cell {
    /// Classify a raw text cell. Only finite numbers count as numeric;
    /// `NaN` and `inf` stay text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number {
                value,
                text: trimmed.to_string(),
            },
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn number(value: f64) -> Self {
        Cell::Number {
            value,
            text: value.to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Cell contents as an identifier label
    pub fn label(&self) -> Option<&str> {
        match self {
            Cell::Empty => None,
            Cell::Number { text, .. } => Some(text),
            Cell::Text(text) => Some(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Rectangular table with a header row
#[derive(Debug, Clone, Serialize)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(RankerError::MalformedTable(format!(
                    "duplicate column header '{}'",
                    name
                )));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(RankerError::MalformedTable(format!(
                    "row {} has {} cells, header has {}",
                    i + 1,
                    row.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| RankerError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Columns usable as criteria: every non-empty cell is a number and at
    /// least one cell is non-empty
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(j, _)| {
                let mut any = false;
                for row in &self.rows {
                    match &row[*j] {
                        Cell::Empty => {}
                        Cell::Number { .. } => any = true,
                        Cell::Text(_) => return false,
                    }
                }
                any
            })
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("  "), Cell::Empty);
        assert_eq!(Cell::parse("12.5").as_f64(), Some(12.5));
        assert_eq!(Cell::parse("-3").as_f64(), Some(-3.0));
        assert_eq!(Cell::parse("Beijing"), text("Beijing"));
        // Source spelling survives for identifiers
        assert_eq!(Cell::parse("007").label(), Some("007"));
    }

    #[test]
    fn test_non_finite_text_is_not_numeric() {
        assert_eq!(Cell::parse("NaN"), text("NaN"));
        assert_eq!(Cell::parse("inf"), text("inf"));
        assert_eq!(Cell::parse("-Infinity"), text("-Infinity"));

        let table = DataTable::new(
            vec!["area".into(), "ratio".into()],
            vec![
                vec![Cell::parse("1.5"), Cell::parse("0.2")],
                vec![Cell::parse("2.5"), Cell::parse("NaN")],
            ],
        )
        .unwrap();
        assert_eq!(table.numeric_columns(), ["area"]);
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::number(1.0)]],
        );
        assert!(matches!(result, Err(RankerError::MalformedTable(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_headers() {
        let result = DataTable::new(vec!["a".into(), "a".into()], vec![]);
        assert!(matches!(result, Err(RankerError::MalformedTable(_))));
    }

    #[test]
    fn test_numeric_columns() {
        let table = DataTable::new(
            vec!["id".into(), "area".into(), "note".into(), "blank".into(), "cost".into()],
            vec![
                vec![text("A"), Cell::number(1.0), text("x"), Cell::Empty, Cell::number(4.0)],
                vec![text("B"), Cell::number(2.0), Cell::Empty, Cell::Empty, Cell::Empty],
            ],
        )
        .unwrap();

        assert_eq!(table.numeric_columns(), ["area", "cost"]);
    }

    #[test]
    fn test_require_column() {
        let table = DataTable::new(vec!["id".into()], vec![]).unwrap();
        assert_eq!(table.require_column("id").unwrap(), 0);
        assert!(matches!(
            table.require_column("area"),
            Err(RankerError::MissingColumn(ref c)) if c == "area"
        ));
    }
}
