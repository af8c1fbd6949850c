//! Export of ranked results
//!
//! Every format writes the same four columns in the same order:
//! identifier, longitude, latitude, score, named by the [`ColumnSchema`].

use crate::pipeline::RankingReport;
use crate::{ColumnSchema, RankerError, Result, ScoreResult};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    GeoJson,
    Xlsx,
}

impl OutputFormat {
    /// Guess from a file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or(Self::Csv)
    }
}

impl FromStr for OutputFormat {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "geojson" => Ok(Self::GeoJson),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(RankerError::UnsupportedFormat(format!(
                "'{}' (expected csv, json, geojson or xlsx)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::GeoJson => f.write_str("geojson"),
            Self::Xlsx => f.write_str("xlsx"),
        }
    }
}

/// Write results as CSV with a header row
pub fn write_csv<W: Write>(writer: W, results: &[ScoreResult], schema: &ColumnSchema) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(schema.output_header())?;
    for r in results {
        wtr.write_record([
            r.id.clone(),
            r.longitude.to_string(),
            r.latitude.to_string(),
            r.score.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serialize results as a single-sheet Excel workbook
pub fn to_xlsx(results: &[ScoreResult], schema: &ColumnSchema) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in schema.output_header().iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, r) in results.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, r.id.as_str())?;
        sheet.write_number(row, 1, r.longitude)?;
        sheet.write_number(row, 2, r.latitude)?;
        sheet.write_number(row, 3, r.score)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// One JSON object per result, keyed by the schema column names
pub fn to_json_rows(results: &[ScoreResult], schema: &ColumnSchema) -> Value {
    Value::Array(
        results
            .iter()
            .map(|r| {
                let mut row = Map::new();
                row.insert(schema.id.clone(), Value::String(r.id.clone()));
                row.insert(schema.longitude.clone(), serde_json::json!(r.longitude));
                row.insert(schema.latitude.clone(), serde_json::json!(r.latitude));
                row.insert(schema.score.clone(), serde_json::json!(r.score));
                Value::Object(row)
            })
            .collect(),
    )
}

/// Export a ranking report to GeoJSON
pub fn to_geojson(report: &RankingReport, schema: &ColumnSchema) -> Value {
    let features: Vec<Value> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut properties = Map::new();
            properties.insert(schema.id.clone(), Value::String(r.id.clone()));
            properties.insert(schema.score.clone(), serde_json::json!(r.score));
            properties.insert("order".to_string(), serde_json::json!(i + 1));

            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.longitude, r.latitude]
                },
                "properties": properties
            })
        })
        .collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
        "weights": report.weights,
        "metadata": report.metadata
    })
}

/// Write a report to `path` in the given format
pub fn write_report(
    path: impl AsRef<Path>,
    format: OutputFormat,
    report: &RankingReport,
    schema: &ColumnSchema,
) -> Result<()> {
    let path = path.as_ref();
    info!("Writing {} results to {:?}", format, path);

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Csv => write_csv(&mut writer, &report.results, schema)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &to_json_rows(&report.results, schema))?
        }
        OutputFormat::GeoJson => {
            serde_json::to_writer_pretty(&mut writer, &to_geojson(report, schema))?
        }
        OutputFormat::Xlsx => writer.write_all(&to_xlsx(&report.results, schema)?)?,
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CriterionWeight, ReportMetadata};
    use crate::Direction;

    fn report() -> RankingReport {
        RankingReport {
            weights: vec![CriterionWeight {
                criterion: "area".into(),
                direction: Direction::Maximize,
                entropy: 0.5,
                weight: 1.0,
            }],
            results: vec![
                ScoreResult {
                    id: "A".into(),
                    longitude: 0.0,
                    latitude: 0.0,
                    score: 0.0,
                },
                ScoreResult {
                    id: "B".into(),
                    longitude: 1.5,
                    latitude: 2.5,
                    score: 0.75,
                },
            ],
            metadata: ReportMetadata {
                total_records: 2,
                criteria_count: 1,
                generated_at: "2026-01-01T00:00:00+00:00".into(),
            },
        }
    }

    #[test]
    fn test_csv_column_order() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &report().results, &ColumnSchema::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "FCIL_CDE,经度,纬度,TOPSIS得分");
        assert_eq!(lines[1], "A,0,0,0");
        assert_eq!(lines[2], "B,1.5,2.5,0.75");
    }

    #[test]
    fn test_json_rows_use_schema_names() {
        let schema = ColumnSchema {
            score: "score".into(),
            ..ColumnSchema::default()
        };
        let rows = to_json_rows(&report().results, &schema);
        assert_eq!(rows[1]["FCIL_CDE"], "B");
        assert_eq!(rows[1]["score"], 0.75);
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["FCIL_CDE", "经度", "纬度", "score"]);
    }

    #[test]
    fn test_geojson_feature_collection() {
        let geojson = to_geojson(&report(), &ColumnSchema::default());
        assert_eq!(geojson["type"], "FeatureCollection");
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1]["geometry"]["coordinates"][0], 1.5);
        assert_eq!(features[1]["geometry"]["coordinates"][1], 2.5);
        assert_eq!(features[1]["properties"]["order"], 2);
        assert_eq!(geojson["weights"][0]["criterion"], "area");
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.geojson")), OutputFormat::GeoJson);
        assert_eq!(OutputFormat::from_path(Path::new("out.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("topsis_result.xlsx")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topsis_result.csv");
        write_report(&path, OutputFormat::Csv, &report(), &ColumnSchema::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("FCIL_CDE,"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_xlsx_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topsis_result.xlsx");
        write_report(&path, OutputFormat::Xlsx, &report(), &ColumnSchema::default()).unwrap();

        let table = crate::loader::load_table(&path, None).unwrap();
        assert_eq!(table.columns(), ["FCIL_CDE", "经度", "纬度", "TOPSIS得分"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0).and_then(crate::Cell::label), Some("A"));
        assert_eq!(table.cell(1, 1).and_then(crate::Cell::as_f64), Some(1.5));
        assert_eq!(table.cell(1, 2).and_then(crate::Cell::as_f64), Some(2.5));
        assert_eq!(table.cell(1, 3).and_then(crate::Cell::as_f64), Some(0.75));
    }
}
