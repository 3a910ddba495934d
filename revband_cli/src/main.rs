use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use revband_core::analyzer::diff::diff_series;
use revband_core::policy::bollinger::BollingerPolicy;
use revband_core::policy::control_policy::ControlPolicy;
use revband_core::policy::zscore::ZScorePolicy;
use revband_core::series::observation::ValueRow;
use revband_core::series::splitter;
use revband_core::{
    PolicyKind, RevisionAggregator, RevisionConfig, RevisionError, RevisionRecord, Series,
    SeriesKey,
};

#[derive(Parser)]
#[command(name = "revband")]
#[command(about = "Control-band revision analysis over product time series")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a revision pass over a CSV table and report flagged series
    Analyze {
        /// Input CSV with date,product,location,value columns
        input: PathBuf,

        /// Control policy, bollinger or zscore
        #[arg(long, default_value = "bollinger")]
        policy: String,

        /// Rolling window length
        #[arg(long)]
        window: Option<usize>,

        /// Band half-width in standard deviations
        #[arg(long)]
        multiplier: Option<f64>,

        /// Z-score threshold
        #[arg(long)]
        z_threshold: Option<f64>,

        /// Directory for per-series and combined audit CSVs
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a sample table for trying the analyzer
    Generate {
        /// Output CSV path
        output: PathBuf,

        /// Weekly observations per series
        #[arg(long, default_value_t = 130)]
        weeks: usize,

        /// Seed for reproducible values
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            input,
            policy,
            window,
            multiplier,
            z_threshold,
            out_dir,
            json,
        } => run_analyze(
            &input,
            &policy,
            window,
            multiplier,
            z_threshold,
            out_dir.as_deref(),
            json,
        ),
        Command::Generate {
            output,
            weeks,
            seed,
        } => run_generate(&output, weeks, seed),
    }
}

fn run_analyze(
    input: &Path,
    policy: &str,
    window: Option<usize>,
    multiplier: Option<f64>,
    z_threshold: Option<f64>,
    out_dir: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let kind = PolicyKind::from_str(policy)
        .map_err(|_| RevisionError::InvalidParameter(format!("unknown policy '{}'", policy)))?;
    let config = RevisionConfig::new(window, multiplier, z_threshold, None)?;

    let rows = load_rows(input)?;
    let series_map = splitter::split_rows(rows)?;
    info!(
        "loaded {} series from {}",
        series_map.len(),
        input.display()
    );

    match kind {
        PolicyKind::Bollinger => run_pass(BollingerPolicy::new(config), &series_map, out_dir, json),
        PolicyKind::ZScore => run_pass(ZScorePolicy::new(config), &series_map, out_dir, json),
    }
}

fn run_pass<P: ControlPolicy + Sync>(
    policy: P,
    series_map: &BTreeMap<SeriesKey, Series>,
    out_dir: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let kind = policy.kind();
    let aggregator = RevisionAggregator::new(policy);
    let records = aggregator.run(series_map)?;

    if json {
        print_json_summary(kind, &records)?;
    } else {
        print_report(kind, &records);
    }
    if let Some(dir) = out_dir {
        export_audit(dir, &records)?;
    }
    Ok(())
}

fn load_rows(path: &Path) -> Result<Vec<ValueRow>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let header_fields: Vec<&str> = headers.iter().collect();
    splitter::check_schema(&header_fields)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: ValueRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

fn print_report(kind: PolicyKind, records: &[RevisionRecord]) {
    println!("Revision report ({} policy)", kind);
    if records.is_empty() {
        println!("No series need a revision.");
        return;
    }
    for record in records {
        println!("{} needs a revision.", record.key);
        if let (Some(before), Some(after)) = (record.original.last(), record.corrected.last()) {
            println!(
                "  latest value {:.2} -> {:.2} (delta {:.2})",
                before.value, after.value, record.last_point_delta
            );
        }
        println!("  {}", record.status.message());
    }
}

#[derive(Serialize)]
struct SummaryEntry {
    product: String,
    location: String,
    last_point_delta: f64,
    status: String,
}

#[derive(Serialize)]
struct Summary {
    policy: String,
    flagged: usize,
    records: Vec<SummaryEntry>,
}

fn print_json_summary(kind: PolicyKind, records: &[RevisionRecord]) -> Result<(), Box<dyn Error>> {
    let summary = Summary {
        policy: kind.to_string(),
        flagged: records.len(),
        records: records
            .iter()
            .map(|r| SummaryEntry {
                product: r.key.product.clone(),
                location: r.key.location.clone(),
                last_point_delta: r.last_point_delta,
                status: r.status.to_string(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[derive(Serialize)]
struct AuditRow<'a> {
    date: NaiveDate,
    product: &'a str,
    location: &'a str,
    original: f64,
    corrected: f64,
    difference: f64,
}

/// One CSV per flagged series plus a combined revision_audit.csv, every row
/// carrying the original value, the corrected value, and their difference.
fn export_audit(dir: &Path, records: &[RevisionRecord]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let mut combined = csv::Writer::from_path(dir.join("revision_audit.csv"))?;

    for record in records {
        let diff = diff_series(&record.original, &record.corrected)?;
        let file_name = format!(
            "{}_{}.csv",
            slug(&record.key.product),
            slug(&record.key.location)
        );
        let mut writer = csv::Writer::from_path(dir.join(file_name))?;

        for ((original, corrected), difference) in record
            .original
            .lst
            .iter()
            .zip(&record.corrected.lst)
            .zip(&diff.lst)
        {
            let row = AuditRow {
                date: original.date,
                product: &record.key.product,
                location: &record.key.location,
                original: original.value,
                corrected: corrected.value,
                difference: difference.value,
            };
            writer.serialize(&row)?;
            combined.serialize(&row)?;
        }
        writer.flush()?;
    }
    combined.flush()?;
    info!("audit files written to {}", dir.display());
    Ok(())
}

fn slug(text: &str) -> String {
    text.to_lowercase().replace(' ', "_")
}

const SAMPLE_PRODUCTS: [&str; 4] = ["Product A", "Product B", "Product C", "Product D"];
const SAMPLE_LOCATIONS: [&str; 4] = ["Location 1", "Location 2", "Location 3", "Location 4"];

/// Weekly random values in 1..=100 for every product and location pair.
fn run_generate(output: &Path, weeks: usize, seed: u64) -> Result<(), Box<dyn Error>> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).ok_or("invalid start date")?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = csv::Writer::from_path(output)?;

    let mut written = 0usize;
    for product in SAMPLE_PRODUCTS {
        for location in SAMPLE_LOCATIONS {
            for week in 0..weeks {
                let row = ValueRow {
                    date: start + chrono::Duration::weeks(week as i64),
                    product: product.to_string(),
                    location: location.to_string(),
                    value: rng.gen_range(1..=100) as f64,
                };
                writer.serialize(&row)?;
                written += 1;
            }
        }
    }
    writer.flush()?;
    println!("wrote {} rows to {}", written, output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use revband_core::common::enums::TrimStatus;
    use revband_core::series::observation::Observation;
    use tempfile::tempdir;

    #[test]
    fn test_generate_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        run_generate(&path, 12, 7).unwrap();

        let rows = load_rows(&path).unwrap();
        assert_eq!(rows.len(), 4 * 4 * 12);
        let series_map = splitter::split_rows(rows).unwrap();
        assert_eq!(series_map.len(), 16);
        for series in series_map.values() {
            assert_eq!(series.len(), 12);
            for obs in &series.lst {
                assert!((1.0..=100.0).contains(&obs.value));
            }
        }
    }

    #[test]
    fn test_generate_is_seed_stable() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        run_generate(&first, 5, 99).unwrap();
        run_generate(&second, 5, 99).unwrap();
        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            fs::read_to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_load_rows_rejects_bad_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "date,product,value\n2024-01-01,Product A,5\n").unwrap();

        let err = load_rows(&path).unwrap_err();
        assert!(err.to_string().contains("missing column 'location'"));
    }

    #[test]
    fn test_export_audit_writes_expected_files() {
        let dir = tempdir().unwrap();
        let key = SeriesKey::new("Product A", "Location 1");
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let original = Series {
            key: key.clone(),
            lst: vec![
                Observation::new(day(1), 10.0),
                Observation::new(day(2), 20.0),
            ],
        };
        let corrected = Series {
            key: key.clone(),
            lst: vec![
                Observation::new(day(1), 8.0),
                Observation::new(day(2), 16.0),
            ],
        };
        let records = vec![RevisionRecord {
            key,
            last_point_delta: 4.0,
            status: TrimStatus::Trimmed,
            original,
            corrected,
        }];

        export_audit(dir.path(), &records).unwrap();

        let per_series = fs::read_to_string(dir.path().join("product_a_location_1.csv")).unwrap();
        assert!(per_series.starts_with("date,product,location,original,corrected,difference"));
        assert!(per_series.contains("2024-01-02,Product A,Location 1,20.0,16.0,4.0"));

        let combined = fs::read_to_string(dir.path().join("revision_audit.csv")).unwrap();
        assert_eq!(combined, per_series);
    }
}
