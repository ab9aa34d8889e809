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

//! The tracker application: the scheduler host that wires scenes,
//! provider, weather, audio and switches together.
//!
//! All cross-scene state lives here: the tracked flight list, which
//! flight is currently showing, and whether every flight has had a full
//! scroll since the list last changed. Scenes read what they are handed
//! and own only their drawing caches.

use std::time::{Duration, Instant};

use chrono::Local;
use flight_feed::{flights_match, Flight, FlightProvider};
use log::{info, warn};

use crate::animator::{Animator, AnimatorBuilder, AnimatorHost};
use crate::audio;
use crate::config::AppConfig;
use crate::display::{palette, DisplaySink};
use crate::input::{Debouncer, Switch, SwitchSource};
use crate::scenes::{flight_details, loading_pulse, Scenes};
use crate::weather::WeatherService;

/// Scheduler frames per second.
pub const PER_SECOND: u32 = 10;

/// Whether a fetch may start now.
///
/// Never while one is already running; otherwise only once every tracked
/// flight has had a full scroll, or when there are so few flights (one or
/// none) that a swap cannot interrupt anything worth watching.
#[must_use]
pub fn should_fetch(processing: bool, all_shown: bool, count: usize) -> bool {
    !processing && (all_shown || count <= 1)
}

/// Scheduler host owning the panel and all shared state.
#[derive(Debug)]
pub struct TrackerApp<S, W> {
    panel: S,
    switches: W,
    provider: FlightProvider,
    weather: WeatherService,
    config: AppConfig,
    scenes: Scenes,
    debouncer: Debouncer,
    flights: Vec<Flight>,
    flight_index: usize,
    all_flights_shown: bool,
    reset_pending: bool,
    scale: u32,
}

impl<S, W> AnimatorHost for TrackerApp<S, W> {
    fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_pending)
    }
}

impl<S: DisplaySink, W: SwitchSource> TrackerApp<S, W> {
    #[must_use]
    pub fn new(
        panel: S,
        switches: W,
        provider: FlightProvider,
        weather: WeatherService,
        config: AppConfig,
    ) -> Self {
        let scale = config.display.text_scale();
        Self {
            panel,
            switches,
            provider,
            weather,
            config,
            scenes: Scenes::default(),
            debouncer: Debouncer::new(),
            flights: Vec::new(),
            flight_index: 0,
            all_flights_shown: false,
            reset_pending: false,
            scale,
        }
    }

    /// Build the keyframe registry. Order matters: data callbacks run
    /// before the drawing ones, and `sync` presents last.
    #[must_use]
    pub fn animator(period: Duration) -> Animator<Self> {
        AnimatorBuilder::new(period)
            .on_reset("clear_screen", Self::clear_screen)
            .on_reset("reset_scenes", Self::reset_scenes)
            .on_reset("flight_details", Self::flight_details)
            .every(1, "check_switches", Self::check_switches)
            .every(5 * PER_SECOND, "check_for_loaded_data", Self::check_for_loaded_data)
            .every(30 * PER_SECOND, "grab_new_data", Self::grab_new_data)
            .every(1, "journey", Self::journey)
            .every(2, "journey_arrow", Self::journey_arrow)
            .every(1, "plane_details", Self::plane_details)
            .every(PER_SECOND, "clock", Self::clock)
            .every(PER_SECOND, "date", Self::date)
            .every(1, "weather", Self::weather)
            .every(1, "loading_pulse", Self::loading_pulse)
            .every(1, "sync", Self::sync)
            .build()
    }

    #[must_use]
    pub fn provider(&self) -> &FlightProvider {
        &self.provider
    }

    #[must_use]
    pub fn panel(&self) -> &S {
        &self.panel
    }

    #[must_use]
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    #[must_use]
    pub fn flight_index(&self) -> usize {
        self.flight_index
    }

    #[must_use]
    pub fn all_flights_shown(&self) -> bool {
        self.all_flights_shown
    }

    /// Blank the panel and stop the background services.
    pub fn shutdown(&mut self) {
        self.panel.set_pen(palette::BLACK);
        self.panel.clear();
        self.panel.present();
        self.provider.shutdown();
        self.weather.shutdown();
    }

    /// Step to the next flight after a completed scroll. Wrapping back
    /// to the first flight marks the whole list as shown.
    fn advance_flight(&mut self) {
        if self.flights.is_empty() {
            return;
        }
        self.flight_index = (self.flight_index + 1) % self.flights.len();
        if self.flight_index == 0 {
            self.all_flights_shown = true;
        }
        self.reset_pending = true;
    }

    // Reset-only keyframes

    fn clear_screen(app: &mut Self) {
        app.panel.set_pen(palette::BLACK);
        app.panel.clear();
    }

    fn reset_scenes(app: &mut Self) {
        app.scenes.reset();
    }

    fn flight_details(app: &mut Self) {
        flight_details::draw(&mut app.panel, &app.flights, app.flight_index, app.scale);
    }

    // Periodic keyframes

    fn check_switches(app: &mut Self, _count: u32) -> bool {
        let now = Instant::now();
        for switch in app.switches.poll() {
            if !app.debouncer.accept(switch, now) {
                continue;
            }
            match switch {
                Switch::A => {
                    if app.config.audio_enabled {
                        audio::play_chime();
                    }
                }
                Switch::B => {
                    app.config.audio_enabled = !app.config.audio_enabled;
                    info!(
                        "audio {}",
                        if app.config.audio_enabled { "enabled" } else { "disabled" }
                    );
                    if let Err(e) = app.config.save() {
                        warn!("could not persist config: {e}");
                    }
                }
            }
        }
        false
    }

    fn check_for_loaded_data(app: &mut Self, _count: u32) -> bool {
        if !app.provider.has_new_data() {
            return false;
        }

        let incoming = app.provider.take_data();
        if flights_match(&app.flights, &incoming) {
            return false;
        }

        // Something on screen is about to change unless both the old and
        // new lists are effectively blank.
        let visible_change = !app.flights.is_empty() || !incoming.is_empty();
        let arrivals = !incoming.is_empty();

        info!(
            "flight list changed: {} -> {}",
            app.flights.len(),
            incoming.len()
        );
        app.flights = incoming;
        app.flight_index = 0;
        app.all_flights_shown = false;

        if visible_change {
            app.reset_pending = true;
            if arrivals && app.config.audio_enabled {
                audio::play_chime();
            }
        }
        true
    }

    fn grab_new_data(app: &mut Self, _count: u32) -> bool {
        if should_fetch(
            app.provider.is_processing(),
            app.all_flights_shown,
            app.flights.len(),
        ) {
            app.provider.trigger_fetch();
            true
        } else {
            false
        }
    }

    fn journey(app: &mut Self, _count: u32) -> bool {
        if app.flights.is_empty() {
            return false;
        }
        app.scenes.journey.draw(
            &mut app.panel,
            app.flights.get(app.flight_index),
            &app.config.home_airport,
            app.scale,
        )
    }

    fn journey_arrow(app: &mut Self, count: u32) -> bool {
        if app.flights.is_empty() {
            return false;
        }
        app.scenes.journey.draw_arrow(&mut app.panel, count, app.scale);
        false
    }

    fn plane_details(app: &mut Self, _count: u32) -> bool {
        if app.flights.is_empty() {
            return false;
        }
        let done = app.scenes.plane.draw(
            &mut app.panel,
            app.flights.get(app.flight_index),
            app.scale,
        );
        if done {
            app.advance_flight();
        }
        done
    }

    fn clock(app: &mut Self, _count: u32) -> bool {
        if !app.flights.is_empty() {
            return false;
        }
        app.scenes
            .clock
            .draw(&mut app.panel, Local::now().time(), app.scale)
    }

    fn date(app: &mut Self, _count: u32) -> bool {
        if !app.flights.is_empty() {
            return false;
        }
        app.scenes
            .date
            .draw(&mut app.panel, Local::now().date_naive(), app.scale)
    }

    fn weather(app: &mut Self, _count: u32) -> bool {
        if !app.flights.is_empty() {
            return false;
        }
        let snapshot = app.weather.snapshot();
        app.scenes.weather.draw(
            &mut app.panel,
            snapshot.as_ref(),
            app.config.metric_units,
            app.scale,
        )
    }

    fn loading_pulse(app: &mut Self, count: u32) -> bool {
        loading_pulse::draw(&mut app.panel, app.provider.is_processing(), count);
        false
    }

    fn sync(app: &mut Self, _count: u32) -> bool {
        app.panel.present();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};
    use crate::input::NullSwitches;
    use crate::weather::WeatherSnapshot;
    use flight_feed::FeedConfig;

    fn flight(callsign: &str, origin: &str, destination: &str) -> Flight {
        Flight {
            callsign: callsign.to_string(),
            flight_number: callsign.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            aircraft_type: "A320".to_string(),
            altitude: 30_000,
            ..Flight::default()
        }
    }

    fn test_app() -> TrackerApp<MatrixPanel<NullPresenter>, NullSwitches> {
        let panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        let config = AppConfig {
            audio_enabled: false,
            ..AppConfig::default()
        };
        TrackerApp::new(
            panel,
            NullSwitches::default(),
            FlightProvider::spawn(FeedConfig::default()),
            WeatherService::spawn(0.0, 0.0, true),
            config,
        )
    }

    fn lit_pixels(panel: &MatrixPanel<NullPresenter>) -> usize {
        let mut lit = 0;
        for y in 0..32 {
            for x in 0..64 {
                if panel.frame().get(x, y) != Some(palette::BLACK) {
                    lit += 1;
                }
            }
        }
        lit
    }

    #[test]
    fn test_fetch_gate() {
        // Idle and everything shown: fetch
        assert!(should_fetch(false, true, 5));
        // Few flights allow a fetch even mid-cycle
        assert!(should_fetch(false, false, 0));
        assert!(should_fetch(false, false, 1));
        // Mid-cycle with several flights: wait
        assert!(!should_fetch(false, false, 2));
        // Never while a fetch is running
        assert!(!should_fetch(true, true, 0));
    }

    #[tokio::test]
    async fn test_index_cycles_and_flags_on_wrap() {
        let mut app = test_app();
        app.flights = vec![
            flight("BAW1", "LHR", "JFK"),
            flight("EZY2", "GLA", "AMS"),
            flight("TOM3", "EDI", "PMI"),
        ];

        app.advance_flight();
        assert_eq!(app.flight_index(), 1);
        assert!(!app.all_flights_shown());

        app.advance_flight();
        assert_eq!(app.flight_index(), 2);
        assert!(!app.all_flights_shown());

        app.advance_flight();
        assert_eq!(app.flight_index(), 0);
        assert!(app.all_flights_shown());
        assert!(app.take_reset_request());
    }

    #[tokio::test]
    async fn test_new_data_resets_cycle_state() {
        let mut app = test_app();
        let mut animator = TrackerApp::animator(Duration::from_millis(100));

        app.provider.publish(vec![
            flight("BAW1", "LHR", "JFK"),
            flight("EZY2", "GLA", "AMS"),
        ]);
        app.all_flights_shown = true;
        app.flight_index = 1;

        // check_for_loaded_data runs at frame 50
        for _ in 0..=50 {
            animator.tick(&mut app);
        }

        assert_eq!(app.flights().len(), 2);
        assert_eq!(app.flight_index(), 0);
        assert!(!app.all_flights_shown());
        // The reset repainted the flight details band
        assert!(lit_pixels(app.panel()) > 0);
    }

    #[tokio::test]
    async fn test_same_flight_set_does_not_reset() {
        let mut app = test_app();
        let mut animator = TrackerApp::animator(Duration::from_millis(100));

        app.provider.publish(vec![flight("BAW1", "LHR", "JFK")]);
        for _ in 0..=50 {
            animator.tick(&mut app);
        }
        app.flight_index = 0;
        app.all_flights_shown = true;

        // Same identity triple, different position
        let mut moved = flight("BAW1", "LHR", "JFK");
        moved.latitude = 55.0;
        app.provider.publish(vec![moved]);
        for _ in 0..50 {
            animator.tick(&mut app);
        }

        // Cycle state survives; the matching list was ignored
        assert!(app.all_flights_shown());
        assert_eq!(app.flights().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_sky_renders_idle_scenes() {
        let mut app = test_app();
        app.weather.publish(WeatherSnapshot {
            temperature: 14.0,
            high: 16.0,
            low: 9.0,
            rain_chance_pct: 20,
            wind_speed: 12.0,
            wind_direction_deg: 180.0,
            humidity_pct: 70,
            weather_code: 2,
        });
        let mut animator = TrackerApp::animator(Duration::from_millis(100));

        // Clock and date fire at frame 10
        for _ in 0..=10 {
            animator.tick(&mut app);
        }
        assert!(app.flights().is_empty());
        assert!(lit_pixels(app.panel()) > 0);
    }
}
