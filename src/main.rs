use std::env;
use std::path::{Path, PathBuf};

use flight_distance_engine::airport::lookup::distance_between;
use flight_distance_engine::airport::table::{Airport, AirportTable, UNKNOWN_IATA};
use flight_distance_engine::data::read_airports_from_file;
use flight_distance_engine::distances::table::{
    build_distance_table, build_distance_table_by_pair, build_full_distance_table, DistanceRow,
};
use flight_distance_engine::Coordinate;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Env var naming an `airports.bin` snapshot written by `build_dataset`.
const SNAPSHOT_ENV: &str = "AIRPORTS_SNAPSHOT";

static AIRPORTS: Lazy<AirportTable> =
    Lazy::new(|| load_airports(env::var_os(SNAPSHOT_ENV).map(PathBuf::from).as_deref()));

fn load_airports(snapshot: Option<&Path>) -> AirportTable {
    let Some(path) = snapshot else {
        return sample_airports();
    };
    match read_airports_from_file(path) {
        Ok(table) => {
            info!("Loaded {} airports from {}", table.len(), path.display());
            table
        }
        Err(err) => {
            warn!(
                "Falling back to sample airports, cannot read {}: {err}",
                path.display()
            );
            sample_airports()
        }
    }
}

fn sample_airports() -> AirportTable {
    AirportTable::new(vec![
        Airport::new("JFK", 40.6398, -73.7789),
        Airport::new("LGA", 40.7769, -73.8740),
        Airport::new("LHR", 51.4706, -0.461941),
        Airport::new("MAG", -5.207083, 145.7887),
        Airport::new(UNKNOWN_IATA, 64.19, -51.68),
    ])
}

#[derive(Debug, Default, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum TableMode {
    #[default]
    ByValue,
    ByPair,
    Full,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DistanceRequest {
    Coordinates {
        from: [f64; 2],
        to: [f64; 2],
    },
    Airports {
        source: String,
        destination: String,
    },
    Table {
        #[serde(default)]
        mode: TableMode,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DistanceResponse {
    Distance { kilometres: f64 },
    Table { rows: Vec<DistanceRow> },
    Error { message: String },
}

async fn handler(event: LambdaEvent<DistanceRequest>) -> Result<DistanceResponse, Error> {
    Ok(respond(event.payload))
}

fn respond(req: DistanceRequest) -> DistanceResponse {
    match req {
        DistanceRequest::Coordinates { from, to } => {
            let kilometres = Coordinate::from(from).distance_to(&Coordinate::from(to));
            DistanceResponse::Distance { kilometres }
        }
        DistanceRequest::Airports {
            source,
            destination,
        } => match distance_between(&AIRPORTS, &source, &destination) {
            Ok(kilometres) => DistanceResponse::Distance { kilometres },
            Err(err) => DistanceResponse::Error {
                message: err.to_string(),
            },
        },
        DistanceRequest::Table { mode } => {
            let airports = &*AIRPORTS;
            let table = match mode {
                TableMode::ByValue => build_distance_table(airports),
                TableMode::ByPair => build_distance_table_by_pair(airports),
                TableMode::Full => build_full_distance_table(airports),
            };
            match table {
                Ok(table) => DistanceResponse::Table {
                    rows: table.into_iter().collect(),
                },
                Err(err) => DistanceResponse::Error {
                    message: err.to_string(),
                },
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}
