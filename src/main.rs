//! `dataset-ingest` command line: ingest files and print the resulting datasets as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use dataset_ingest::ingestion::{ingest_batch, IngestionOptions, TracingObserver};
use dataset_ingest::types::{Dataset, MAX_FILE_SIZE};

#[derive(Debug, Parser)]
#[command(name = "dataset-ingest", version, about = "Normalize CSV, Excel, JSON and PDF files into datasets")]
struct Args {
    /// Files to ingest.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Largest accepted file, in bytes.
    #[arg(long, default_value_t = MAX_FILE_SIZE)]
    max_size: u64,

    /// Field delimiter for CSV files.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Print a summary (type, record count, columns) instead of the full payload.
    #[arg(long)]
    summary: bool,
}

fn summary(ds: &Dataset) -> serde_json::Value {
    json!({
        "id": ds.id(),
        "name": ds.name(),
        "type": ds.dataset_type(),
        "records": ds.record_count(),
        "columns": ds.column_names(),
        "numericColumns": ds.numeric_columns(),
        "sheets": ds.sheet_names(),
        "uploadedAt": ds.uploaded_at().timestamp_millis(),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .context("--delimiter must be a single ASCII character")?;

    let options = IngestionOptions {
        max_file_size: args.max_size,
        csv_delimiter: delimiter,
        observer: Some(Arc::new(TracingObserver)),
        ..Default::default()
    };

    let mut failed = 0usize;
    for (path, result) in args.files.iter().zip(ingest_batch(&args.files, &options)) {
        let ds = match result {
            Ok(ds) => ds,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let value = if args.summary {
            summary(&ds)
        } else {
            serde_json::to_value(&ds)?
        };
        let out = if args.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        println!("{out}");
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) failed to ingest", args.files.len());
    }
    Ok(())
}
