pub mod accessibility;
pub mod batch;
pub mod mobility;
pub mod nearest;
pub mod score;

use anyhow::{bail, Context, Result};
use homefree::{Record, UpstreamClient, UpstreamConfig};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Create the upstream client.
fn client(upstream: UpstreamConfig) -> Result<UpstreamClient> {
    UpstreamClient::new(upstream).context("Failed to create HTTP client")
}

/// Load building records from a local file, or fetch them from the open-data API.
async fn buildings(upstream: UpstreamConfig, path: Option<&Path>) -> Result<Vec<Record>> {
    match path {
        Some(path) => load_records(path),
        None => client(upstream)?
            .fetch_buildings()
            .await
            .context("Failed to fetch buildings"),
    }
}

/// Load records from a JSON or CSV file.
///
/// JSON may be an array of objects or an open-data page with a `results`
/// array. CSV rows become records with string values.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => load_json_records(path),
        "csv" => load_csv_records(path),
        _ => bail!(
            "Unsupported buildings file format: {}. Use .json or .csv",
            extension
        ),
    }
}

fn load_json_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).context("Failed to open buildings file")?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse buildings JSON")?;

    let rows = match &value {
        Value::Array(rows) => rows,
        Value::Object(page) => match page.get("results") {
            Some(Value::Array(rows)) => rows,
            _ => bail!("Buildings JSON object has no 'results' array"),
        },
        _ => bail!("Buildings JSON must be an array or an object with 'results'"),
    };

    Ok(rows
        .iter()
        .filter_map(|row| row.as_object().cloned())
        .collect())
}

fn load_csv_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).context("Failed to open buildings file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("Failed to read buildings CSV")?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}
