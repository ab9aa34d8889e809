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

//! Local weather service.
//!
//! Fetches the Open-Meteo forecast (no API key required) on a background
//! task every five minutes and keeps the latest result behind a lock.
//! Scenes only ever read the snapshot; they never wait on the network.
//! A failed refresh keeps the previous snapshot.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// One complete weather reading.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Current temperature, in the configured unit.
    pub temperature: f64,
    /// Today's high.
    pub high: f64,
    /// Today's low.
    pub low: f64,
    /// Probability of precipitation today, percent.
    pub rain_chance_pct: u8,
    /// Wind speed in km/h (metric) or mph (imperial).
    pub wind_speed: f64,
    /// Wind direction in degrees, north = 0.
    pub wind_direction_deg: f64,
    /// Relative humidity, percent.
    pub humidity_pct: u8,
    /// WMO weather interpretation code.
    pub weather_code: u8,
}

impl WeatherSnapshot {
    /// Human-readable condition for the snapshot's WMO code.
    #[must_use]
    pub fn condition(&self) -> &'static str {
        wmo_condition(self.weather_code)
    }
}

/// Map a WMO weather interpretation code to display text.
#[must_use]
pub fn wmo_condition(code: u8) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mostly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing Drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing Rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow Grains",
        80 | 81 | 82 => "Showers",
        85 | 86 => "Snow Showers",
        95 => "Thunderstorm",
        96 | 99 => "Hail Storm",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u8,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

impl ForecastResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let current = self.current;
        WeatherSnapshot {
            temperature: current.temperature_2m,
            high: self
                .daily
                .temperature_2m_max
                .first()
                .copied()
                .unwrap_or(current.temperature_2m),
            low: self
                .daily
                .temperature_2m_min
                .first()
                .copied()
                .unwrap_or(current.temperature_2m),
            rain_chance_pct: self
                .daily
                .precipitation_probability_max
                .first()
                .copied()
                .flatten()
                .unwrap_or(0.0)
                .round() as u8,
            wind_speed: current.wind_speed_10m,
            wind_direction_deg: current.wind_direction_10m,
            humidity_pct: current.relative_humidity_2m.round() as u8,
            weather_code: current.weather_code,
        }
    }
}

async fn fetch_forecast(
    client: &reqwest::Client,
    latitude: f64,
    longitude: f64,
    metric: bool,
) -> Result<WeatherSnapshot, reqwest::Error> {
    let latitude = latitude.to_string();
    let longitude = longitude.to_string();
    let mut query = vec![
        ("latitude", latitude.as_str()),
        ("longitude", longitude.as_str()),
        (
            "current",
            "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,wind_direction_10m",
        ),
        (
            "daily",
            "temperature_2m_max,temperature_2m_min,precipitation_probability_max",
        ),
        ("forecast_days", "1"),
        ("timezone", "auto"),
    ];
    if !metric {
        query.push(("temperature_unit", "fahrenheit"));
        query.push(("wind_speed_unit", "mph"));
    }

    let body: ForecastResponse = client
        .get(FORECAST_URL)
        .query(&query)
        .timeout(Duration::from_secs(15))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(body.into_snapshot())
}

/// Handle to the background weather task.
pub struct WeatherService {
    snapshot: Arc<RwLock<Option<WeatherSnapshot>>>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("has_snapshot", &self.snapshot().is_some())
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Spawn the refresh task for the given location.
    #[must_use]
    pub fn spawn(latitude: f64, longitude: f64, metric: bool) -> Self {
        let snapshot = Arc::new(RwLock::new(None));
        let cancel_token = CancellationToken::new();

        let task_snapshot = Arc::clone(&snapshot);
        let task_cancel = cancel_token.clone();
        tokio::spawn(async move {
            refresh_loop(latitude, longitude, metric, task_snapshot, task_cancel).await;
        });

        Self {
            snapshot,
            cancel_token,
        }
    }

    /// Latest reading, if any refresh has succeeded yet.
    #[must_use]
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.snapshot.read().ok().and_then(|guard| guard.clone())
    }

    /// Inject a reading directly. Used by tests and embedders.
    pub fn publish(&self, reading: WeatherSnapshot) {
        if let Ok(mut guard) = self.snapshot.write() {
            *guard = Some(reading);
        }
    }

    /// Stop the background task.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for WeatherService {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn refresh_loop(
    latitude: f64,
    longitude: f64,
    metric: bool,
    snapshot: Arc<RwLock<Option<WeatherSnapshot>>>,
    cancel_token: CancellationToken,
) {
    let client = match reqwest::Client::builder().build() {
        Ok(client) => client,
        Err(e) => {
            warn!("could not build http client, weather disabled: {e}");
            return;
        }
    };

    // First tick fires immediately, so the panel has weather soon after
    // boot.
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match fetch_forecast(&client, latitude, longitude, metric).await {
                    Ok(reading) => {
                        info!(
                            "weather refresh: {} {:.1} deg",
                            reading.condition(),
                            reading.temperature
                        );
                        if let Ok(mut guard) = snapshot.write() {
                            *guard = Some(reading);
                        }
                    }
                    Err(e) => warn!("weather refresh failed: {e}"),
                }
            }

            () = cancel_token.cancelled() => return,
        }
    }
}
