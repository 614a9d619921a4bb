use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use flight_distance_engine::data::{
    read_airports_csv, write_airports_to_file, write_distance_table_csv,
};
use flight_distance_engine::distances::table::build_distance_table;
use log::info;
use reqwest::blocking::Client;
use serde::Serialize;
use tempfile::NamedTempFile;

const DEFAULT_AIRPORTS_URL: &str =
    "https://gitlab.com/adpro1/adpro2024/-/raw/main/Files/airports.csv";

#[derive(Debug, Serialize)]
struct DatasetMetadata {
    source_url: String,
    airports: usize,
    airports_with_code: usize,
    distance_rows: Option<usize>,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let source_url =
        env::var("AIRPORTS_CSV_URL").unwrap_or_else(|_| DEFAULT_AIRPORTS_URL.to_string());
    let output_dir =
        PathBuf::from(env::var("DATASET_OUTPUT_DIR").unwrap_or_else(|_| "data".to_string()));
    let write_distances = env::var("WRITE_DISTANCE_TABLE").is_ok_and(|v| v == "1");

    let client = Client::builder()
        .user_agent("flight-distance-engine-dataset-builder/0.1")
        .build()?;

    info!("Downloading airports from {source_url}");
    let temp_file = download_csv(&client, &source_url)?;
    let airports = read_airports_csv(temp_file.path())
        .with_context(|| format!("failed to parse airports CSV from {source_url}"))?;

    fs::create_dir_all(&output_dir).context("failed to create data output directory")?;
    let dataset_path = output_dir.join("airports.bin");
    write_airports_to_file(&airports, &dataset_path)
        .with_context(|| format!("failed to write dataset to {}", dataset_path.display()))?;

    let distance_rows = if write_distances {
        let table =
            build_distance_table(&airports).context("failed to build distance table")?;
        let csv_path = output_dir.join("airport_distances.csv");
        let file = fs::File::create(&csv_path)
            .with_context(|| format!("failed to create {}", csv_path.display()))?;
        write_distance_table_csv(&table, file)
            .with_context(|| format!("failed to write {}", csv_path.display()))?;
        info!("Wrote {} distance rows to {}", table.len(), csv_path.display());
        Some(table.len())
    } else {
        None
    };

    let metadata = DatasetMetadata {
        source_url,
        airports: airports.len(),
        airports_with_code: airports.known().count(),
        distance_rows,
        generated_at_epoch: current_epoch_seconds(),
    };

    let metadata_path = output_dir.join("airports.meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote compact dataset to {} ({} airports, {} with IATA code)",
        dataset_path.display(),
        metadata.airports,
        metadata.airports_with_code
    );

    Ok(())
}

fn download_csv(client: &Client, url: &str) -> Result<NamedTempFile> {
    let mut response = client
        .get(url)
        .send()
        .with_context(|| format!("failed to download {url}"))?
        .error_for_status()
        .context("dataset download returned an error status")?;
    let mut file = NamedTempFile::new()?;
    response.copy_to(&mut file)?;
    Ok(file)
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
