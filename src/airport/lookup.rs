use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::airport::table::AirportTable;
use crate::Coordinate;

#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("airport code not found: {code}")]
    NotFound { code: String },
}

/// A flight leg between two airports, identified by IATA code.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub source: String,
    pub destination: String,
}

impl Route {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Route {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

pub fn resolve(airports: &AirportTable, iata: &str) -> Result<Coordinate, LookupError> {
    airports
        .find(iata)
        .map(|a| a.position)
        .ok_or_else(|| LookupError::NotFound {
            code: iata.to_string(),
        })
}

/// Great-circle distance in kilometres between two airports of the table.
///
/// Duplicate codes resolve to their first row in table order.
pub fn distance_between(
    airports: &AirportTable,
    source: &str,
    destination: &str,
) -> Result<f64, LookupError> {
    let from = resolve(airports, source)?;
    let to = resolve(airports, destination)?;
    Ok(from.distance_to(&to))
}

/// Distances for every route whose endpoints both resolve, in route order.
pub fn route_distances(airports: &AirportTable, routes: &[Route]) -> Vec<f64> {
    let distances: Vec<f64> = routes
        .iter()
        .filter_map(
            |route| match distance_between(airports, &route.source, &route.destination) {
                Ok(d) => Some(d),
                Err(err) => {
                    debug!("skipping route {} -> {}: {err}", route.source, route.destination);
                    None
                }
            },
        )
        .collect();
    debug!(
        "resolved {} of {} routes",
        distances.len(),
        routes.len()
    );
    distances
}

/// Aggregate view over a set of distances.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct DistanceSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl DistanceSummary {
    pub fn from_distances(distances: &[f64]) -> Option<Self> {
        if distances.is_empty() {
            return None;
        }
        let (min, max, sum) = distances.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &d| (min.min(d), max.max(d), sum + d),
        );
        Some(DistanceSummary {
            count: distances.len(),
            min,
            max,
            mean: sum / distances.len() as f64,
        })
    }
}

/// Routes shorter than this are short-haul unless a cutoff is given.
pub const DEFAULT_SHORT_HAUL_CUTOFF_KM: f64 = 1000.0;
/// CO2 per passenger-kilometre by air.
pub const FLIGHT_CO2_KG_PER_KM: f64 = 0.115;
/// CO2 per passenger-kilometre by rail.
pub const RAIL_CO2_KG_PER_KM: f64 = 0.025;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Haul {
    ShortHaul,
    LongHaul,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClassifiedRoute {
    pub route: Route,
    pub distance: f64,
    /// Both endpoints lie in the same country.
    pub internal: bool,
    pub haul: Haul,
}

/// Emissions of flying the short-haul distance versus taking the train.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct EmissionsSummary {
    pub short_haul_km: f64,
    pub flight_co2_kg: f64,
    pub rail_co2_kg: f64,
    pub savings_co2_kg: f64,
}

impl EmissionsSummary {
    pub fn for_short_haul(short_haul_km: f64) -> Self {
        let flight_co2_kg = short_haul_km * FLIGHT_CO2_KG_PER_KM;
        let rail_co2_kg = short_haul_km * RAIL_CO2_KG_PER_KM;
        EmissionsSummary {
            short_haul_km,
            flight_co2_kg,
            rail_co2_kg,
            savings_co2_kg: flight_co2_kg - rail_co2_kg,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CountryRouteReport {
    pub country: String,
    pub cutoff_km: f64,
    /// Routes departing from `country`, in route order.
    pub routes: Vec<ClassifiedRoute>,
    pub emissions: EmissionsSummary,
}

impl CountryRouteReport {
    pub fn internal(&self) -> impl Iterator<Item = &ClassifiedRoute> {
        self.routes.iter().filter(|r| r.internal)
    }
}

/// Classifies every resolvable route departing from `country` as short- or
/// long-haul and totals the short-haul emissions, internal or not.
///
/// Routes with an unresolved endpoint are skipped. A route is short-haul when
/// its distance is strictly below the cutoff.
pub fn classify_routes(
    airports: &AirportTable,
    routes: &[Route],
    country: &str,
    short_haul_cutoff_km: Option<f64>,
) -> CountryRouteReport {
    let cutoff_km = short_haul_cutoff_km.unwrap_or(DEFAULT_SHORT_HAUL_CUTOFF_KM);

    let classified: Vec<ClassifiedRoute> = routes
        .iter()
        .filter_map(|route| {
            let source = airports.find(&route.source)?;
            let destination = airports.find(&route.destination)?;
            if source.country != country {
                return None;
            }
            let distance = source.position.distance_to(&destination.position);
            Some(ClassifiedRoute {
                route: route.clone(),
                distance,
                internal: source.country == destination.country,
                haul: if distance < cutoff_km {
                    Haul::ShortHaul
                } else {
                    Haul::LongHaul
                },
            })
        })
        .collect();

    let short_haul_km: f64 = classified
        .iter()
        .filter(|r| r.haul == Haul::ShortHaul)
        .map(|r| r.distance)
        .sum();
    debug!(
        "{} of {} routes depart from {country}",
        classified.len(),
        routes.len()
    );

    CountryRouteReport {
        country: country.to_string(),
        cutoff_km,
        routes: classified,
        emissions: EmissionsSummary::for_short_haul(short_haul_km),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::table::Airport;
    use crate::geo::haversine::haversine_distance;
    use assert_approx_eq::assert_approx_eq;

    fn new_york() -> AirportTable {
        AirportTable::new(vec![
            Airport::new("JFK", 40.6398, -73.7789),
            Airport::new("LGA", 40.7769, -73.8740),
            Airport::new("MAG", -5.207083, 145.7887),
        ])
    }

    #[test]
    fn same_airport_is_zero() {
        let table = new_york();
        assert_eq!(distance_between(&table, "JFK", "JFK"), Ok(0.0));
    }

    #[test]
    fn close_and_distant_airports() {
        let table = new_york();
        let close = distance_between(&table, "JFK", "LGA").expect("known codes");
        assert_approx_eq!(close, 17.0, 17.0 * 0.05);
        let far = distance_between(&table, "JFK", "MAG").expect("known codes");
        assert_approx_eq!(far, 14400.0, 14400.0 * 0.05);
    }

    #[test]
    fn missing_code_is_not_found() {
        let table = new_york();
        let err = distance_between(&table, "JFK", "XXX").unwrap_err();
        assert_eq!(
            err,
            LookupError::NotFound {
                code: "XXX".into()
            }
        );
        assert_eq!(err.to_string(), "airport code not found: XXX");

        let err = distance_between(&table, "ZZZ", "XXX").unwrap_err();
        assert_eq!(
            err,
            LookupError::NotFound {
                code: "ZZZ".into()
            }
        );
    }

    #[test]
    fn unresolved_routes_are_skipped() {
        let table = new_york();
        let routes = vec![
            Route::new("JFK", "LGA"),
            Route::new("JFK", "\\N"),
            Route::new("MAG", "JFK"),
        ];
        let distances = route_distances(&table, &routes);
        assert_eq!(distances.len(), 2);
        assert_eq!(distances[0], distance_between(&table, "JFK", "LGA").unwrap());

        let summary = DistanceSummary::from_distances(&distances).expect("non-empty");
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min, distances[0]);
        assert_eq!(summary.max, distances[1]);
        assert_approx_eq!(summary.mean, (distances[0] + distances[1]) / 2.0);
    }

    #[test]
    fn empty_summary_is_none() {
        assert_eq!(DistanceSummary::from_distances(&[]), None);
    }

    fn france() -> AirportTable {
        let mut airports = vec![
            Airport::new("CDG", 49.0097, 2.5479),
            Airport::new("LYS", 45.7256, 5.0811),
            Airport::new("NCE", 43.6584, 7.2159),
            Airport::new("JFK", 40.6398, -73.7789),
        ];
        for airport in &mut airports {
            airport.country = if airport.iata == "JFK" {
                "United States".into()
            } else {
                "France".into()
            };
        }
        AirportTable::new(airports)
    }

    fn french_routes() -> Vec<Route> {
        vec![
            Route::new("CDG", "LYS"),
            Route::new("CDG", "NCE"),
            Route::new("CDG", "JFK"),
            Route::new("JFK", "CDG"),
            Route::new("LYS", "XXX"),
        ]
    }

    #[test]
    fn classify_routes_from_country() {
        let table = france();
        let report = classify_routes(&table, &french_routes(), "France", None);
        assert_eq!(report.cutoff_km, DEFAULT_SHORT_HAUL_CUTOFF_KM);

        let summary: Vec<(&str, bool, Haul)> = report
            .routes
            .iter()
            .map(|r| (r.route.destination.as_str(), r.internal, r.haul))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("LYS", true, Haul::ShortHaul),
                ("NCE", true, Haul::ShortHaul),
                ("JFK", false, Haul::LongHaul),
            ]
        );
        assert_eq!(report.internal().count(), 2);

        let short = distance_between(&table, "CDG", "LYS").unwrap()
            + distance_between(&table, "CDG", "NCE").unwrap();
        assert_approx_eq!(report.emissions.short_haul_km, short);
        assert_approx_eq!(report.emissions.flight_co2_kg, short * 0.115);
        assert_approx_eq!(report.emissions.rail_co2_kg, short * 0.025);
        assert_approx_eq!(report.emissions.savings_co2_kg, short * 0.09);
    }

    #[test]
    fn custom_cutoff_moves_routes_to_long_haul() {
        let table = france();
        let report = classify_routes(&table, &french_routes(), "France", Some(500.0));
        let hauls: Vec<Haul> = report.routes.iter().map(|r| r.haul).collect();
        assert_eq!(hauls, vec![Haul::ShortHaul, Haul::LongHaul, Haul::LongHaul]);
        assert_approx_eq!(
            report.emissions.short_haul_km,
            distance_between(&table, "CDG", "LYS").unwrap()
        );
    }

    #[test]
    fn no_routes_from_country_gives_zero_emissions() {
        let report = classify_routes(&france(), &french_routes(), "Germany", None);
        assert!(report.routes.is_empty());
        assert_eq!(report.emissions, EmissionsSummary::for_short_haul(0.0));
        assert_eq!(report.emissions.savings_co2_kg, 0.0);
    }

    #[test]
    fn duplicated_code_uses_first_row() {
        let table = AirportTable::new(vec![
            Airport::new("JFK", 40.6398, -73.7789),
            Airport::new("LGA", 40.7769, -73.8740),
            Airport::new("JFK", -5.207083, 145.7887),
        ]);
        let d = distance_between(&table, "LGA", "JFK").expect("known codes");
        assert_eq!(d, haversine_distance(40.7769, -73.8740, 40.6398, -73.7789));
        assert!(d < 100.0);
    }

    #[test]
    fn symmetric_and_zero_on_self_across_the_globe() {
        let mut airports = Vec::new();
        for (n, lat) in [-89.5, -45.0, 0.0, 33.3, 89.9].into_iter().enumerate() {
            for (m, lon) in [-179.9, -90.0, 0.0, 77.7, 180.0].into_iter().enumerate() {
                airports.push(Airport::new(format!("P{n}{m}"), lat, lon));
            }
        }
        let table = AirportTable::new(airports);
        for a in table.airports() {
            assert_eq!(distance_between(&table, &a.iata, &a.iata), Ok(0.0));
            for b in table.airports() {
                let ab = distance_between(&table, &a.iata, &b.iata).expect("known");
                let ba = distance_between(&table, &b.iata, &a.iata).expect("known");
                assert_eq!(ab, ba);
                assert!(ab >= 0.0);
            }
        }
    }
}
