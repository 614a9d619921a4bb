use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use bincode::ErrorKind;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::airport::lookup::Route;
use crate::airport::table::{Airport, AirportTable};
use crate::distances::table::DistanceTable;
use crate::Coordinate;

/// Compression level used when encoding serialized airport snapshots.
const SNAPSHOT_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the airports CSV. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct AirportRecord {
    #[serde(rename = "IATA")]
    iata: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(rename = "Country", default)]
    country: String,
}

impl From<AirportRecord> for Airport {
    fn from(r: AirportRecord) -> Self {
        Airport {
            iata: r.iata,
            name: r.name,
            city: r.city,
            country: r.country,
            position: Coordinate::new(r.latitude, r.longitude),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    #[serde(rename = "Source airport")]
    source: String,
    #[serde(rename = "Destination airport")]
    destination: String,
}

/// Parses a headered airports CSV into a table, keeping file order.
pub fn parse_airports_csv<R: Read>(reader: R) -> Result<AirportTable, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let airports = rdr
        .deserialize::<AirportRecord>()
        .map(|row| row.map(Airport::from))
        .collect::<Result<Vec<_>, _>>()?;
    let table = AirportTable::new(airports);
    let unknown = table.len() - table.known().count();
    if unknown > 0 {
        warn!("{unknown} airports have no IATA code and will be left out of distance tables");
    }
    debug!("parsed {} airports", table.len());
    Ok(table)
}

/// Parses a headered routes CSV.
pub fn parse_routes_csv<R: Read>(reader: R) -> Result<Vec<Route>, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let routes = rdr
        .deserialize::<RouteRecord>()
        .map(|row| row.map(|r| Route::new(r.source, r.destination)))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("parsed {} routes", routes.len());
    Ok(routes)
}

pub fn read_airports_csv<P: AsRef<Path>>(path: P) -> Result<AirportTable, DataError> {
    let file = fs::File::open(path)?;
    parse_airports_csv(file)
}

/// Writes the table as `Origin,Destination,Distance` CSV.
pub fn write_distance_table_csv<W: Write>(
    table: &DistanceTable,
    writer: W,
) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table.iter() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn serialize_airports(table: &AirportTable) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(table)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, SNAPSHOT_COMPRESSION_LEVEL)
        .map_err(DataError::Compression)
}

pub fn deserialize_airports(bytes: &[u8]) -> Result<AirportTable, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    let mut table: AirportTable = bincode::deserialize(&decoded)?;
    table.rebuild_indices();
    Ok(table)
}

pub fn write_airports_to_file<P: AsRef<Path>>(
    table: &AirportTable,
    path: P,
) -> Result<(), DataError> {
    let bytes = serialize_airports(table)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_airports_from_file<P: AsRef<Path>>(path: P) -> Result<AirportTable, DataError> {
    let bytes = fs::read(path)?;
    deserialize_airports(&bytes)
}
