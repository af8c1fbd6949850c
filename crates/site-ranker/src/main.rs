//! Facility Site Ranking CLI
//!
//! Ranks candidate sites with entropy-weighted TOPSIS.
//!
//! Usage:
//!   rank-sites --input data/facilities.xlsx \
//!              --criterion area:max --criterion cost:min \
//!              --output data/topsis_result.xlsx
//!
//!   rank-sites --input data/facilities.csv --request data/request.json
//!
//!   rank-sites --input data/facilities.csv --list-columns

use anyhow::{bail, Context, Result};
use clap::Parser;
use site_ranker::export::{self, OutputFormat};
use site_ranker::loader::{self, TableFormat};
use site_ranker::{rank, Criterion, RankingRequest};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "rank-sites",
    about = "Rank candidate facility sites with entropy-weighted TOPSIS"
)]
struct Args {
    /// Input table (xlsx, CSV or JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format, overrides the file extension
    #[arg(long)]
    input_format: Option<TableFormat>,

    /// Output file
    #[arg(short, long, default_value = "topsis_result.xlsx")]
    output: PathBuf,

    /// Output format (xlsx, csv, json, geojson), overrides the file extension
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// JSON request file with "schema" and "criteria"
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Criterion as NAME or NAME:max / NAME:min (repeatable, in order)
    #[arg(short = 'c', long = "criterion")]
    criteria: Vec<Criterion>,

    /// Identifier column
    #[arg(long)]
    id_column: Option<String>,

    /// Longitude column
    #[arg(long)]
    lon_column: Option<String>,

    /// Latitude column
    #[arg(long)]
    lat_column: Option<String>,

    /// Score column header in the output
    #[arg(long)]
    score_column: Option<String>,

    /// List numeric columns usable as criteria and exit
    #[arg(long)]
    list_columns: bool,

    /// Number of top-scoring sites to log
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Request file values, overridden by command-line flags
    fn build_request(&self) -> Result<RankingRequest> {
        let mut request: RankingRequest = match &self.request {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading request file {:?}", path))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing request file {:?}", path))?
            }
            None => RankingRequest::default(),
        };

        if !self.criteria.is_empty() {
            request.criteria = self.criteria.clone();
        }
        if let Some(c) = &self.id_column {
            request.schema.id = c.clone();
        }
        if let Some(c) = &self.lon_column {
            request.schema.longitude = c.clone();
        }
        if let Some(c) = &self.lat_column {
            request.schema.latitude = c.clone();
        }
        if let Some(c) = &self.score_column {
            request.schema.score = c.clone();
        }

        Ok(request)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Facility Site Ranker (entropy-weighted TOPSIS)");
    info!("{}", "=".repeat(60));

    let table = loader::load_table(&args.input, args.input_format)?;

    if args.list_columns {
        let numeric = table.numeric_columns();
        info!("{} numeric columns:", numeric.len());
        for name in numeric {
            println!("{}", name);
        }
        return Ok(());
    }

    let request = args.build_request()?;
    if request.criteria.is_empty() {
        bail!("no criteria selected; pass --criterion or --request (see --list-columns)");
    }
    for c in &request.criteria {
        info!("Criterion: {} ({})", c.name, c.direction);
    }

    let report = rank(&table, &request).map_err(|e| {
        if e.is_input_error() {
            error!("Request rejected: {}", e);
        } else {
            error!("Ranking failed: {}", e);
        }
        e
    })?;

    // Show top sites by score
    let mut by_score: Vec<_> = report.results.iter().collect();
    by_score.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    info!("Top {} sites by score:", args.top.min(by_score.len()));
    for r in by_score.iter().take(args.top) {
        info!(
            "  {:.4} | {:24} | ({:.6}, {:.6})",
            r.score, r.id, r.longitude, r.latitude
        );
    }

    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from_path(&args.output));
    export::write_report(&args.output, format, &report, &request.schema)?;

    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Records ranked: {}", report.metadata.total_records);
    for w in &report.weights {
        info!("  {}: weight {:.4} (entropy {:.4})", w.criterion, w.weight, w.entropy);
    }

    Ok(())
}
