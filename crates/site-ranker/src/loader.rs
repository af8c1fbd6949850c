//! Table loading from Excel workbooks and CSV / JSON spreadsheet exports

use crate::table::{Cell, DataTable};
use crate::{RankerError, Result};
use calamine::{Data, Reader, Xlsx};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Array of flat objects, or `{"records": [...]}`
    Json,
    /// Excel workbook; the first worksheet is read, its first row is the header
    Xlsx,
}

impl TableFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for TableFormat {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            other => Err(RankerError::UnsupportedFormat(format!(
                "'{}' (expected csv, json or xlsx)",
                other
            ))),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::Xlsx => f.write_str("xlsx"),
        }
    }
}

/// Load a table from disk. `format` overrides the extension-based guess.
pub fn load_table(path: impl AsRef<Path>, format: Option<TableFormat>) -> Result<DataTable> {
    let path = path.as_ref();
    let format = match format {
        Some(f) => f,
        None => TableFormat::from_path(path)?,
    };
    info!("Loading {} table from {:?}", format, path);

    let reader = BufReader::new(File::open(path)?);
    let table = match format {
        TableFormat::Csv => read_csv(reader)?,
        TableFormat::Json => read_json(reader)?,
        TableFormat::Xlsx => read_xlsx(reader)?,
    };

    info!(
        "Loaded {} rows x {} columns",
        table.len(),
        table.columns().len()
    );

    Ok(table)
}

/// Read CSV with a header row. Cells are trimmed; numeric text becomes
/// [`Cell::Number`].
pub fn read_csv<R: Read>(reader: R) -> Result<DataTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect());
    }

    DataTable::new(columns, rows)
}

/// Read a JSON array of flat objects. Columns appear in first-seen order;
/// keys missing from an object become [`Cell::Empty`].
pub fn read_json<R: Read>(reader: R) -> Result<DataTable> {
    let raw: Value = serde_json::from_reader(reader)?;

    let objects: Vec<Map<String, Value>> = if let Some(records) = raw.get("records") {
        serde_json::from_value(records.clone())?
    } else if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        return Err(RankerError::MalformedTable(
            "expected an array of objects or {\"records\": [...]}".to_string(),
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut nested = 0;
    let rows: Vec<Vec<Cell>> = objects
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|c| match obj.get(c) {
                    None | Some(Value::Null) => Cell::Empty,
                    Some(Value::Number(n)) => match n.as_f64() {
                        Some(value) => Cell::Number {
                            value,
                            text: n.to_string(),
                        },
                        None => Cell::Text(n.to_string()),
                    },
                    Some(Value::String(s)) => Cell::Text(s.clone()),
                    Some(Value::Bool(b)) => Cell::Text(b.to_string()),
                    Some(other) => {
                        nested += 1;
                        Cell::Text(other.to_string())
                    }
                })
                .collect()
        })
        .collect();

    if nested > 0 {
        warn!("{} nested JSON values treated as text", nested);
    }

    DataTable::new(columns, rows)
}

/// Read the first worksheet of an Excel workbook. Blank header cells are
/// named `Unnamed: <index>`.
pub fn read_xlsx<RS: Read + Seek>(reader: RS) -> Result<DataTable> {
    let mut workbook: Xlsx<RS> = Xlsx::new(reader)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RankerError::MalformedTable("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| RankerError::MalformedTable("worksheet is empty".to_string()))?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(j, data)| match xlsx_cell(data).label() {
            Some(name) => name.to_string(),
            None => format!("Unnamed: {}", j),
        })
        .collect();

    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(xlsx_cell).collect()).collect();

    DataTable::new(columns, rows)
}

fn xlsx_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number {
            value: *i as f64,
            text: i.to_string(),
        },
        Data::Float(f) if f.is_finite() => Cell::number(*f),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.trim().to_string()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::io::{Cursor, Write};
    use tempfile::Builder;

    const CSV: &str = "FCIL_CDE,经度,纬度,area,owner\n\
                       A001, 116.40 ,39.90,10,city\n\
                       A002,121.47,31.23,,state\n";

    #[test]
    fn test_read_csv() {
        let table = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["FCIL_CDE", "经度", "纬度", "area", "owner"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1).and_then(Cell::as_f64), Some(116.40));
        assert_eq!(table.cell(1, 3), Some(&Cell::Empty));
        assert_eq!(table.numeric_columns(), ["经度", "纬度", "area"]);
    }

    #[test]
    fn test_read_csv_ragged_row() {
        let result = read_csv("a,b\n1,2\n3\n".as_bytes());
        assert!(matches!(result, Err(RankerError::Csv(_))));
    }

    #[test]
    fn test_read_json_array() {
        let json = r#"[
            {"FCIL_CDE": "A", "经度": 116.4, "纬度": 39.9, "area": 10},
            {"FCIL_CDE": "B", "经度": 121.47, "纬度": 31.23, "area": null, "note": "new"}
        ]"#;
        let table = read_json(json.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["FCIL_CDE", "经度", "纬度", "area", "note"]);
        assert_eq!(table.cell(0, 3).and_then(Cell::as_f64), Some(10.0));
        assert_eq!(table.cell(1, 3), Some(&Cell::Empty));
        assert_eq!(table.cell(0, 4), Some(&Cell::Empty));
    }

    #[test]
    fn test_read_json_records_wrapper() {
        let json = r#"{"records": [{"FCIL_CDE": 7, "area": 1.5}]}"#;
        let table = read_json(json.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0).and_then(Cell::label), Some("7"));
    }

    #[test]
    fn test_read_json_rejects_scalar() {
        assert!(matches!(
            read_json("42".as_bytes()),
            Err(RankerError::MalformedTable(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("sites.CSV")).unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("sites.json")).unwrap(), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("sites.xlsx")).unwrap(), TableFormat::Xlsx);
        assert!(matches!(
            TableFormat::from_path(Path::new("sites.ods")),
            Err(RankerError::UnsupportedFormat(_))
        ));
    }

    fn survey_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (j, name) in ["FCIL_CDE", "经度", "纬度", "area", "owner"].iter().enumerate() {
            sheet.write_string(0, j as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "A001").unwrap();
        sheet.write_number(1, 1, 116.40).unwrap();
        sheet.write_number(1, 2, 39.90).unwrap();
        sheet.write_number(1, 3, 10.0).unwrap();
        sheet.write_string(1, 4, "city").unwrap();
        sheet.write_number(2, 0, 7.0).unwrap();
        sheet.write_number(2, 1, 121.47).unwrap();
        sheet.write_number(2, 2, 31.23).unwrap();
        sheet.write_string(2, 4, "state").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_xlsx() {
        let table = read_xlsx(Cursor::new(survey_workbook())).unwrap();
        assert_eq!(table.columns(), ["FCIL_CDE", "经度", "纬度", "area", "owner"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0).and_then(Cell::label), Some("A001"));
        assert_eq!(table.cell(1, 0).and_then(Cell::label), Some("7"));
        assert_eq!(table.cell(0, 1).and_then(Cell::as_f64), Some(116.40));
        assert_eq!(table.cell(1, 3), Some(&Cell::Empty));
        assert_eq!(table.numeric_columns(), ["经度", "纬度", "area"]);
    }

    #[test]
    fn test_read_xlsx_rejects_non_workbook() {
        let result = read_xlsx(Cursor::new(b"FCIL_CDE,area\nA,1\n".to_vec()));
        assert!(matches!(result, Err(RankerError::XlsxRead(_))));
    }

    #[test]
    fn test_load_xlsx_from_file() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&survey_workbook()).unwrap();

        let table = load_table(file.path(), None).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.require_column("area").unwrap(), 3);
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let table = load_table(file.path(), None).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_table_format_override() {
        let mut file = Builder::new().suffix(".dat").tempfile().unwrap();
        file.write_all(br#"[{"a": 1}]"#).unwrap();

        let table = load_table(file.path(), Some(TableFormat::Json)).unwrap();
        assert_eq!(table.columns(), ["a"]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_table("/nonexistent/sites.csv", None);
        assert!(matches!(result, Err(RankerError::Io(_))));
    }
}
