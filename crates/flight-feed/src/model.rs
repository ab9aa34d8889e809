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

//! Flight data model.
//!
//! A [`Flight`] is one tracked aircraft's snapshot as reported by a feed.
//! Identity for change-detection purposes deliberately ignores anything
//! that varies continuously (position, altitude, speed): two flight lists
//! are "the same" when their [`FlightKey`] sets match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Feed values that mean "no data" and are normalised to an empty string.
const BLANK_FIELDS: [&str; 3] = ["", "N/A", "NONE"];

/// One tracked flight's current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Feed-assigned unique identifier (FR24 flight id or ICAO hex).
    pub id: String,
    /// Aircraft callsign (e.g. "BAW123"). Empty when unknown.
    pub callsign: String,
    /// Commercial flight number (e.g. "BA123"). Empty when unknown.
    pub flight_number: String,
    /// Origin airport IATA code. Empty when unknown.
    pub origin: String,
    /// Destination airport IATA code. Empty when unknown.
    pub destination: String,
    /// ICAO aircraft type designator (e.g. "A320").
    pub aircraft_type: String,
    /// Registration / tail number.
    pub registration: String,
    /// Barometric altitude in feet.
    pub altitude: i32,
    /// Ground speed in knots.
    pub ground_speed: f64,
    /// Track heading in degrees (0-360, north = 0).
    pub heading: f64,
    /// Vertical rate in feet per minute (positive = climb).
    pub vertical_speed: i32,
    /// Transponder squawk code.
    pub squawk: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Flight {
    /// Identity key used for change detection.
    ///
    /// Only the route information participates: position and altitude
    /// change every update and must not count as "new data", while an
    /// origin/destination arriving late for a known callsign must.
    #[must_use]
    pub fn key(&self) -> FlightKey<'_> {
        FlightKey {
            callsign: &self.callsign,
            origin: &self.origin,
            destination: &self.destination,
        }
    }

    /// Preferred display label: flight number, falling back to callsign.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.flight_number.is_empty() {
            &self.callsign
        } else {
            &self.flight_number
        }
    }
}

/// `(callsign, origin, destination)` identity triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlightKey<'a> {
    pub callsign: &'a str,
    pub origin: &'a str,
    pub destination: &'a str,
}

/// Compare two flight lists for change-detection purposes.
///
/// True iff the *sets* of identity triples match: order-independent, and
/// duplicate triples collapse.
#[must_use]
pub fn flights_match(a: &[Flight], b: &[Flight]) -> bool {
    let keys_a: HashSet<FlightKey<'_>> = a.iter().map(Flight::key).collect();
    let keys_b: HashSet<FlightKey<'_>> = b.iter().map(Flight::key).collect();
    keys_a == keys_b
}

/// Normalise a feed text field: trim, and map the feed's "no data"
/// placeholders to an empty string.
#[must_use]
pub fn normalise_field(value: &str) -> String {
    let trimmed = value.trim();
    if BLANK_FIELDS.contains(&trimmed.to_ascii_uppercase().as_str()) {
        String::new()
    } else {
        trimmed.to_owned()
    }
}
