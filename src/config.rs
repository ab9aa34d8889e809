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

//! Application configuration management.
//!
//! Persistent TOML configuration via confy. Every field has a default, so
//! a missing or partial file never fails startup; unknown values fall
//! back field by field.

use std::time::Duration;

use flight_feed::feed::{FeedConfig, Zone};
use serde::{Deserialize, Serialize};

use crate::display::DisplayPreset;

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Panel geometry
    #[serde(default = "default_display")]
    pub display: DisplayPreset,

    /// Observer latitude, used for distance ranking and weather
    #[serde(default = "default_home_latitude")]
    pub home_latitude: f64,

    /// Observer longitude
    #[serde(default = "default_home_longitude")]
    pub home_longitude: f64,

    /// IATA code drawn in bold when it appears in a route
    #[serde(default = "default_home_airport")]
    pub home_airport: String,

    /// Search zone, top-left corner latitude
    #[serde(default = "default_zone_top_lat")]
    pub zone_top_latitude: f64,

    /// Search zone, top-left corner longitude
    #[serde(default = "default_zone_left_lon")]
    pub zone_left_longitude: f64,

    /// Search zone, bottom-right corner latitude
    #[serde(default = "default_zone_bottom_lat")]
    pub zone_bottom_latitude: f64,

    /// Search zone, bottom-right corner longitude
    #[serde(default = "default_zone_right_lon")]
    pub zone_right_longitude: f64,

    /// Exclusive lower altitude bound in feet
    #[serde(default)]
    pub min_altitude_ft: i32,

    /// Exclusive upper altitude bound in feet
    #[serde(default = "default_max_altitude")]
    pub max_altitude_ft: i32,

    /// Keep at most this many of the closest aircraft
    #[serde(default = "default_max_flights")]
    pub max_flights: usize,

    /// Play the notification chime when new flights arrive.
    /// Toggled at runtime by switch B and persisted.
    #[serde(default = "default_true")]
    pub audio_enabled: bool,

    /// Celsius and km/h when true, Fahrenheit and mph otherwise
    #[serde(default = "default_true")]
    pub metric_units: bool,

    /// Frame period in milliseconds (10 fps by default)
    #[serde(default = "default_frame_period_ms")]
    pub frame_period_ms: u64,
}

// Default value functions for serde
fn default_display() -> DisplayPreset {
    DisplayPreset::Wide64
}

fn default_home_latitude() -> f64 {
    55.8617
}

fn default_home_longitude() -> f64 {
    -4.2583
}

fn default_home_airport() -> String {
    "GLA".to_string()
}

fn default_zone_top_lat() -> f64 {
    56.1
}

fn default_zone_left_lon() -> f64 {
    -4.7
}

fn default_zone_bottom_lat() -> f64 {
    55.6
}

fn default_zone_right_lon() -> f64 {
    -3.8
}

fn default_max_altitude() -> i32 {
    45_000
}

fn default_max_flights() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_frame_period_ms() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: default_display(),
            home_latitude: default_home_latitude(),
            home_longitude: default_home_longitude(),
            home_airport: default_home_airport(),
            zone_top_latitude: default_zone_top_lat(),
            zone_left_longitude: default_zone_left_lon(),
            zone_bottom_latitude: default_zone_bottom_lat(),
            zone_right_longitude: default_zone_right_lon(),
            min_altitude_ft: 0,
            max_altitude_ft: default_max_altitude(),
            max_flights: default_max_flights(),
            audio_enabled: true,
            metric_units: true,
            frame_period_ms: default_frame_period_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating a default file if absent
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("flightdeck", "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("flightdeck", "config", self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("flightdeck", "config")
    }

    /// Frame period as a [`Duration`].
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    /// The flight-feed view of this configuration.
    #[must_use]
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            zone: Zone {
                tl_lat: self.zone_top_latitude,
                tl_lon: self.zone_left_longitude,
                br_lat: self.zone_bottom_latitude,
                br_lon: self.zone_right_longitude,
            },
            home: (self.home_latitude, self.home_longitude),
            min_altitude_ft: self.min_altitude_ft,
            max_altitude_ft: self.max_altitude_ft,
            max_flights: self.max_flights,
            ..FeedConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = AppConfig::default();
        assert_eq!(config.display, DisplayPreset::Wide64);
        assert_eq!(config.max_flights, 5);
        assert!(config.audio_enabled);
        assert_eq!(config.frame_period(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_toml_falls_back_per_field() {
        let config: AppConfig = toml::from_str("home_airport = \"EDI\"").unwrap();
        assert_eq!(config.home_airport, "EDI");
        assert_eq!(config.max_flights, default_max_flights());
        assert!(config.metric_units);
    }

    #[test]
    fn test_feed_config_mapping() {
        let config = AppConfig::default();
        let feed = config.feed_config();
        assert_eq!(feed.home, (config.home_latitude, config.home_longitude));
        assert_eq!(feed.max_flights, config.max_flights);
        assert!(feed.zone.tl_lat > feed.zone.br_lat);
    }
}
