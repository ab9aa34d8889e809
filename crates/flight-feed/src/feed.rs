// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Upstream feed access.
//!
//! Primary source is the FlightRadar24 zone feed, which carries route
//! information (origin/destination). Fallback is airplanes.live, which is
//! plain ADS-B and has no route data; it is only consulted when the
//! primary errors, not when it legitimately reports zero aircraft.
//!
//! Both feeds return a mix of well-formed and junk records. Malformed
//! records are skipped individually; they never abort the whole fetch.

use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::geo::slant_range_km;
use crate::model::{normalise_field, Flight};

const FR24_URL: &str = "https://data-cloud.flightradar24.com/zones/fcgi/feed.js";
const AIRPLANES_LIVE_URL: &str = "https://api.airplanes.live/v2/point";

/// FR24 positional row layout (see `parse_fr24_row`).
const FR24_ROW_MIN_LEN: usize = 17;

/// airplanes.live caps point queries at 250 nm.
const MAX_RADIUS_NM: f64 = 250.0;

/// Errors from a feed fetch.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(&'static str),
}

/// Geographic bounding box, top-left / bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub tl_lat: f64,
    pub tl_lon: f64,
    pub br_lat: f64,
    pub br_lon: f64,
}

impl Zone {
    /// Centre point of the zone.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.tl_lat + self.br_lat) / 2.0,
            (self.tl_lon + self.br_lon) / 2.0,
        )
    }

    /// Approximate covering radius in nautical miles, capped at the
    /// fallback feed's 250 nm limit.
    #[must_use]
    pub fn radius_nm(&self) -> f64 {
        let (center_lat, _) = self.center();
        let lat_span_nm = (self.tl_lat - self.br_lat).abs() * 60.0;
        let lon_span_nm =
            (self.br_lon - self.tl_lon).abs() * 60.0 * center_lat.to_radians().cos();
        (lat_span_nm.max(lon_span_nm) / 2.0).min(MAX_RADIUS_NM)
    }
}

/// Configuration for a feed fetch.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Zone to search for aircraft.
    pub zone: Zone,
    /// Observer location for nearest-first ordering (lat, lon).
    pub home: (f64, f64),
    /// Exclusive lower altitude bound in feet.
    pub min_altitude_ft: i32,
    /// Exclusive upper altitude bound in feet.
    pub max_altitude_ft: i32,
    /// Keep at most this many of the closest aircraft.
    pub max_flights: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            // Central Scotland
            zone: Zone {
                tl_lat: 56.1,
                tl_lon: -4.7,
                br_lat: 55.6,
                br_lon: -3.8,
            },
            home: (55.8617, -4.2583),
            min_altitude_ft: 0,
            max_altitude_ft: 45_000,
            max_flights: 5,
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Fetch nearby flights, trying the primary feed then the fallback.
///
/// The returned list is filtered to the configured altitude band, sorted
/// nearest-first by slant range from `home`, and truncated to
/// `max_flights`. An `Ok(vec![])` is a valid answer (quiet sky).
pub async fn fetch_nearby(
    client: &reqwest::Client,
    config: &FeedConfig,
) -> Result<Vec<Flight>, FeedError> {
    let mut flights = match fetch_fr24(client, config).await {
        Ok(flights) => {
            info!("fr24 returned {} aircraft", flights.len());
            flights
        }
        Err(e) => {
            warn!("fr24 failed ({e}), trying airplanes.live fallback");
            let flights = fetch_airplanes_live(client, config).await?;
            info!("airplanes.live returned {} aircraft", flights.len());
            flights
        }
    };

    flights.retain(|f| f.altitude > config.min_altitude_ft && f.altitude < config.max_altitude_ft);

    let (home_lat, home_lon) = config.home;
    flights.sort_by(|a, b| {
        let da = slant_range_km(a.latitude, a.longitude, a.altitude, home_lat, home_lon);
        let db = slant_range_km(b.latitude, b.longitude, b.altitude, home_lat, home_lon);
        da.total_cmp(&db)
    });
    flights.truncate(config.max_flights);

    Ok(flights)
}

async fn fetch_fr24(
    client: &reqwest::Client,
    config: &FeedConfig,
) -> Result<Vec<Flight>, FeedError> {
    let zone = &config.zone;
    // FR24 bounds order: tl_lat, br_lat, tl_lon, br_lon
    let bounds = format!(
        "{},{},{},{}",
        zone.tl_lat, zone.br_lat, zone.tl_lon, zone.br_lon
    );

    let body: Value = client
        .get(FR24_URL)
        .query(&[
            ("bounds", bounds.as_str()),
            ("faa", "1"),
            ("satellite", "1"),
            ("mlat", "1"),
            ("flarm", "1"),
            ("adsb", "1"),
            ("gnd", "0"),
            ("air", "1"),
            ("vehicles", "0"),
            ("estimated", "1"),
            ("gliders", "1"),
            ("stats", "0"),
        ])
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let object = body
        .as_object()
        .ok_or(FeedError::UnexpectedShape("fr24 body is not an object"))?;

    // The response mixes flight rows with scalar bookkeeping keys
    // ("full_count", "version"); non-array values are skipped below.
    let flights = object
        .iter()
        .filter_map(|(id, row)| parse_fr24_row(id, row))
        .collect();

    Ok(flights)
}

/// Parse one FR24 positional row.
///
/// Layout: `[icao, lat, lon, track, altitude, speed, squawk, radar, type,
/// registration, timestamp, origin, destination, flight_number, on_ground,
/// vertical_speed, callsign, ...]`. Returns `None` for bookkeeping keys,
/// short rows, on-ground aircraft and rows without a position.
fn parse_fr24_row(id: &str, row: &Value) -> Option<Flight> {
    let row = row.as_array()?;
    if row.len() < FR24_ROW_MIN_LEN {
        debug!("skipping short fr24 row {id}");
        return None;
    }

    let latitude = row[1].as_f64()?;
    let longitude = row[2].as_f64()?;
    let on_ground = row[14].as_i64().unwrap_or(0) != 0;
    if on_ground {
        return None;
    }

    let text = |index: usize| normalise_field(row[index].as_str().unwrap_or(""));

    Some(Flight {
        id: id.to_string(),
        callsign: text(16),
        flight_number: text(13),
        origin: text(11),
        destination: text(12),
        aircraft_type: text(8),
        registration: text(9),
        altitude: row[4].as_i64().unwrap_or(0) as i32,
        ground_speed: row[5].as_f64().unwrap_or(0.0),
        heading: row[3].as_f64().unwrap_or(0.0),
        vertical_speed: row[15].as_i64().unwrap_or(0) as i32,
        squawk: text(6),
        latitude,
        longitude,
    })
}

/// One aircraft record in the airplanes.live / ADS-B Exchange v2 shape.
#[derive(Debug, Deserialize)]
struct AdsbRecord {
    hex: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    /// Number, or the literal string "ground".
    #[serde(default)]
    alt_baro: Option<Value>,
    #[serde(default)]
    alt_geom: Option<i32>,
    #[serde(default)]
    flight: Option<String>,
    #[serde(default)]
    r: Option<String>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    gs: Option<f64>,
    #[serde(default)]
    track: Option<f64>,
    #[serde(default)]
    baro_rate: Option<i32>,
    #[serde(default)]
    geom_rate: Option<i32>,
    #[serde(default)]
    squawk: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdsbResponse {
    #[serde(default)]
    ac: Vec<AdsbRecord>,
}

async fn fetch_airplanes_live(
    client: &reqwest::Client,
    config: &FeedConfig,
) -> Result<Vec<Flight>, FeedError> {
    let (center_lat, center_lon) = config.zone.center();
    let radius_nm = config.zone.radius_nm() as i64;
    let url = format!("{AIRPLANES_LIVE_URL}/{center_lat}/{center_lon}/{radius_nm}");

    let body: AdsbResponse = client
        .get(&url)
        .timeout(config.request_timeout)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(body.ac.into_iter().filter_map(parse_adsb_record).collect())
}

fn parse_adsb_record(record: AdsbRecord) -> Option<Flight> {
    let latitude = record.lat?;
    let longitude = record.lon?;

    let altitude = match record.alt_baro {
        Some(Value::String(s)) if s == "ground" => return None,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) as i32,
        _ => record.alt_geom.unwrap_or(0),
    };

    let hex = record.hex.unwrap_or_default();
    let callsign = normalise_field(record.flight.as_deref().unwrap_or(""));
    let registration = normalise_field(record.r.as_deref().unwrap_or(""));

    Some(Flight {
        id: hex.clone(),
        callsign: if callsign.is_empty() {
            registration.clone()
        } else {
            callsign
        },
        // ADS-B carries no route or flight-number data
        flight_number: String::new(),
        origin: String::new(),
        destination: String::new(),
        aircraft_type: normalise_field(record.t.as_deref().unwrap_or("")),
        registration,
        altitude,
        ground_speed: record.gs.unwrap_or(0.0),
        heading: record.track.unwrap_or(0.0),
        vertical_speed: record.baro_rate.or(record.geom_rate).unwrap_or(0),
        squawk: normalise_field(record.squawk.as_deref().unwrap_or("")),
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fr24_row() {
        let row = json!([
            "4CA123", 55.9, -4.1, 270.0, 35000, 450.0, "2345", "radar", "A320",
            "G-EZBA", 1_700_000_000, "LHR", "JFK", "BA123", 0, -640, "BAW123 ", ""
        ]);
        let flight = parse_fr24_row("2f0a1b2c", &row).unwrap();
        assert_eq!(flight.id, "2f0a1b2c");
        assert_eq!(flight.callsign, "BAW123");
        assert_eq!(flight.flight_number, "BA123");
        assert_eq!(flight.origin, "LHR");
        assert_eq!(flight.destination, "JFK");
        assert_eq!(flight.aircraft_type, "A320");
        assert_eq!(flight.altitude, 35000);
        assert_eq!(flight.vertical_speed, -640);
        assert!((flight.heading - 270.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_fr24_skips_bookkeeping_and_ground() {
        assert!(parse_fr24_row("full_count", &json!(142)).is_none());
        assert!(parse_fr24_row("version", &json!("4")).is_none());

        let grounded = json!([
            "4CA123", 55.9, -4.1, 0.0, 0, 12.0, "", "radar", "A320",
            "G-EZBA", 0, "", "", "", 1, 0, "BAW123", ""
        ]);
        assert!(parse_fr24_row("abc", &grounded).is_none());

        let short = json!(["4CA123", 55.9, -4.1]);
        assert!(parse_fr24_row("abc", &short).is_none());
    }

    #[test]
    fn test_parse_fr24_requires_position() {
        let row = json!([
            "4CA123", null, null, 0.0, 35000, 450.0, "", "radar", "A320",
            "G-EZBA", 0, "LHR", "JFK", "BA123", 0, 0, "BAW123", ""
        ]);
        assert!(parse_fr24_row("abc", &row).is_none());
    }

    #[test]
    fn test_parse_adsb_record_ground_literal() {
        let record: AdsbRecord = serde_json::from_value(json!({
            "hex": "4ca123", "lat": 55.9, "lon": -4.1, "alt_baro": "ground"
        }))
        .unwrap();
        assert!(parse_adsb_record(record).is_none());
    }

    #[test]
    fn test_parse_adsb_record_falls_back_to_registration() {
        let record: AdsbRecord = serde_json::from_value(json!({
            "hex": "4ca123", "lat": 55.9, "lon": -4.1, "alt_baro": 12000,
            "r": "G-EZBA", "t": "A320", "gs": 310.5, "track": 88.0,
            "baro_rate": 1200
        }))
        .unwrap();
        let flight = parse_adsb_record(record).unwrap();
        assert_eq!(flight.callsign, "G-EZBA");
        assert_eq!(flight.altitude, 12000);
        assert_eq!(flight.vertical_speed, 1200);
        assert!(flight.origin.is_empty());
    }

    #[test]
    fn test_zone_radius_capped() {
        let huge = Zone {
            tl_lat: 70.0,
            tl_lon: -20.0,
            br_lat: 40.0,
            br_lon: 20.0,
        };
        assert!((huge.radius_nm() - 250.0).abs() < f64::EPSILON);

        let small = Zone {
            tl_lat: 56.0,
            tl_lon: -4.5,
            br_lat: 55.5,
            br_lon: -4.0,
        };
        assert!(small.radius_nm() < 30.0);
        assert!(small.radius_nm() > 0.0);
    }
}
