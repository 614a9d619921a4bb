use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::airport::table::{Airport, AirportTable};
use crate::geo::vectorized::{pairwise_distance_matrix, BroadcastError};
use crate::Coordinate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DistanceRow {
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    /// Kilometres.
    #[serde(rename = "Distance")]
    pub distance: f64,
}

/// Immutable (origin, destination, distance) rows derived from one airport
/// table snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DistanceTable {
    rows: Vec<DistanceRow>,
}

impl DistanceTable {
    pub fn rows(&self) -> &[DistanceRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistanceRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distance of the first row joining the two codes, in either direction.
    pub fn distance(&self, origin: &str, destination: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| {
                (r.origin == origin && r.destination == destination)
                    || (r.origin == destination && r.destination == origin)
            })
            .map(|r| r.distance)
    }
}

impl IntoIterator for DistanceTable {
    type Item = DistanceRow;
    type IntoIter = std::vec::IntoIter<DistanceRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Every ordered pair of distinct airports with a known IATA code.
///
/// Rows follow the row-major order of the distance matrix: all destinations
/// of the first airport, then the second, and so on. Pairs whose codes are
/// equal are dropped along with the diagonal.
pub fn build_full_distance_table(
    airports: &AirportTable,
) -> Result<DistanceTable, BroadcastError> {
    let table = collect_rows(airports, |_, _, _| true)?;
    debug!("full distance table: {} rows", table.len());
    Ok(table)
}

/// Distance table keeping one row per distinct distance value.
///
/// Two different airport pairs that land on the same distance collapse into
/// whichever comes first. Downstream consumers of the airport distance
/// dataset rely on this shape; use [`build_distance_table_by_pair`] when
/// every pair is wanted once.
pub fn build_distance_table(airports: &AirportTable) -> Result<DistanceTable, BroadcastError> {
    let mut seen = HashSet::new();
    let table = collect_rows(airports, |_, _, distance| seen.insert(distance.to_bits()))?;
    debug!("distance table deduplicated by value: {} rows", table.len());
    Ok(table)
}

/// Distance table keeping one row per unordered airport pair.
pub fn build_distance_table_by_pair(
    airports: &AirportTable,
) -> Result<DistanceTable, BroadcastError> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let table = collect_rows(airports, |origin, destination, _| {
        let (a, b) = (origin.iata.as_str(), destination.iata.as_str());
        seen.insert(if a <= b { (a, b) } else { (b, a) })
    })?;
    debug!("distance table deduplicated by pair: {} rows", table.len());
    Ok(table)
}

/// Walks the all-pairs matrix in row-major order and materialises only the
/// off-diagonal cells `keep` accepts, so codes are cloned for surviving rows
/// alone.
fn collect_rows<'a, F>(
    airports: &'a AirportTable,
    mut keep: F,
) -> Result<DistanceTable, BroadcastError>
where
    F: FnMut(&'a Airport, &'a Airport, f64) -> bool,
{
    let known: Vec<&'a Airport> = airports.known().collect();
    let coords: Vec<Coordinate> = known.iter().map(|a| a.position).collect();
    let matrix = pairwise_distance_matrix(&coords)?;
    debug!(
        "distance matrix over {} airports ({} skipped without code)",
        known.len(),
        airports.len() - known.len()
    );

    let rows = matrix
        .indexed_iter()
        .filter_map(|((i, j), &distance)| {
            let (origin, destination) = (known[i], known[j]);
            if origin.iata == destination.iata || !keep(origin, destination, distance) {
                return None;
            }
            Some(DistanceRow {
                origin: origin.iata.clone(),
                destination: destination.iata.clone(),
                distance,
            })
        })
        .collect();
    Ok(DistanceTable { rows })
}
