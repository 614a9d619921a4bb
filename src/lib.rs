pub mod airport;
pub mod data;
pub mod distances;
pub mod geo;

use serde::{Deserialize, Serialize};

/// A point on the Earth's surface in decimal degrees.
///
/// Ranges are not validated: latitude is expected in [-90, 90] and
/// longitude in [-180, 180], anything else flows through the formula as is.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        geo::haversine::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Coordinate::new(latitude, longitude)
    }
}
