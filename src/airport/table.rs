use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// IATA value the source dataset uses for airports without a code.
pub const UNKNOWN_IATA: &str = "\\N";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub position: Coordinate,
}

impl Airport {
    pub fn new(iata: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Airport {
            iata: iata.into(),
            name: String::new(),
            city: String::new(),
            country: String::new(),
            position: Coordinate::new(latitude, longitude),
        }
    }

    pub fn has_known_code(&self) -> bool {
        self.iata != UNKNOWN_IATA
    }
}

/// Read-only snapshot of the airport dataset in source order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirportTable {
    airports: Vec<Airport>,
    /// First row index for each IATA code.
    #[serde(skip)]
    iata_index: HashMap<String, usize>,
}

impl AirportTable {
    pub fn new(airports: Vec<Airport>) -> Self {
        let mut table = AirportTable {
            airports,
            iata_index: HashMap::new(),
        };
        table.rebuild_indices();
        table
    }

    /// Rows in source order.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Row index of the first airport carrying `iata`, in table order.
    pub fn index_of_iata(&self, iata: &str) -> Option<usize> {
        self.iata_index.get(iata).copied()
    }

    pub fn find(&self, iata: &str) -> Option<&Airport> {
        self.index_of_iata(iata).and_then(|idx| self.airports.get(idx))
    }

    /// Airports with a real IATA code, table order preserved.
    pub fn known(&self) -> impl Iterator<Item = &Airport> {
        self.airports.iter().filter(|a| a.has_known_code())
    }

    pub fn rebuild_indices(&mut self) {
        let mut index = HashMap::with_capacity(self.airports.len());
        for (idx, airport) in self.airports.iter().enumerate() {
            index.entry(airport.iata.clone()).or_insert(idx);
        }
        self.iata_index = index;
    }
}

impl FromIterator<Airport> for AirportTable {
    fn from_iter<I: IntoIterator<Item = Airport>>(iter: I) -> Self {
        AirportTable::new(iter.into_iter().collect())
    }
}
