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

//! Panel scenes.
//!
//! Each scene is a small struct owning only its own drawing state (diff
//! caches, scroll positions). The app composes them explicitly and calls
//! them from its keyframe callbacks; scenes never talk to the network or
//! to each other. Idle scenes (clock, date, weather) run when no flights
//! are tracked; flight scenes (journey, flight details, plane details)
//! when at least one is.

pub mod clock;
pub mod date;
pub mod flight_details;
pub mod journey;
pub mod loading_pulse;
pub mod plane_details;
pub mod weather;

pub use clock::ClockScene;
pub use date::DateScene;
pub use journey::JourneyScene;
pub use plane_details::PlaneScene;
pub use weather::WeatherScene;

/// Eight-point compass labels, clockwise from north.
pub const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Map a heading in degrees to its compass sector index.
///
/// Sectors are 45 degrees wide and centred on the cardinal points, so
/// 0-22.4 and 337.5-360 are both north.
#[must_use]
pub fn compass_sector(degrees: f64) -> usize {
    (((degrees + 22.5) / 45.0) as usize) % 8
}

/// Compass label for a heading.
#[must_use]
pub fn compass_point(degrees: f64) -> &'static str {
    COMPASS_POINTS[compass_sector(degrees)]
}

/// All scene state, bundled for the app to own.
#[derive(Debug, Default)]
pub struct Scenes {
    pub clock: ClockScene,
    pub date: DateScene,
    pub weather: WeatherScene,
    pub journey: JourneyScene,
    pub plane: PlaneScene,
}

impl Scenes {
    /// Clear every scene's drawing cache; the next draw starts from a
    /// blank panel.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.date.reset();
        self.weather.reset();
        self.journey.reset();
        self.plane.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_sectors() {
        assert_eq!(compass_sector(0.0), 0);
        assert_eq!(compass_sector(44.0), 1);
        assert_eq!(compass_sector(45.0), 1);
        assert_eq!(compass_sector(359.0), 0);
        assert_eq!(compass_sector(180.0), 4);
        assert_eq!(compass_sector(22.4), 0);
        assert_eq!(compass_sector(22.5), 1);
    }

    #[test]
    fn test_compass_points() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(270.0), "W");
        assert_eq!(compass_point(359.0), "N");
    }
}
