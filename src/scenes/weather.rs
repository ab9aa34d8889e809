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

//! Weather scene: static temperature top-right, scrolling detail ticker
//! along the bottom edge.

use embedded_graphics::pixelcolor::Rgb888;

use crate::display::{measure_text, palette, DisplaySink, Font};
use crate::scenes::compass_point;
use crate::weather::WeatherSnapshot;

const TEMP_FONT: Font = Font::Regular;
const TICKER_FONT: Font = Font::Tiny;

/// Colour for a temperature in Celsius: blue when freezing, through
/// green and yellow, red at 30 and above.
#[must_use]
pub fn temperature_colour(celsius: f64) -> Rgb888 {
    // Gradient stops; linear blend between neighbours.
    const STOPS: [(f64, (u8, u8, u8)); 5] = [
        (0.0, (0, 90, 205)),    // blue
        (10.0, (0, 255, 128)),  // green
        (20.0, (255, 255, 0)),  // yellow
        (25.0, (255, 140, 0)),  // orange
        (30.0, (255, 0, 0)),    // red
    ];

    if celsius <= STOPS[0].0 {
        let (r, g, b) = STOPS[0].1;
        return Rgb888::new(r, g, b);
    }
    for pair in STOPS.windows(2) {
        let (low_t, low_c) = pair[0];
        let (high_t, high_c) = pair[1];
        if celsius < high_t {
            let blend = (celsius - low_t) / (high_t - low_t);
            let channel = |a: u8, b: u8| {
                (f64::from(a) + (f64::from(b) - f64::from(a)) * blend).round() as u8
            };
            return Rgb888::new(
                channel(low_c.0, high_c.0),
                channel(low_c.1, high_c.1),
                channel(low_c.2, high_c.2),
            );
        }
    }
    let (r, g, b) = STOPS[STOPS.len() - 1].1;
    Rgb888::new(r, g, b)
}

/// Colour for a wind speed in km/h: grey calm, white breeze, yellow
/// strong, red gale.
#[must_use]
pub fn wind_colour(speed_kmh: f64) -> Rgb888 {
    if speed_kmh < 10.0 {
        palette::GREY
    } else if speed_kmh < 30.0 {
        palette::WHITE
    } else if speed_kmh < 50.0 {
        palette::YELLOW
    } else {
        palette::RED
    }
}

/// Weather scene state.
#[derive(Debug, Default)]
pub struct WeatherScene {
    shown_temp: Option<String>,
    ticker: Vec<(String, Rgb888)>,
    ticker_source: Option<WeatherSnapshot>,
    /// `None` means "start from the right edge on the next draw".
    ticker_x: Option<i32>,
}

impl WeatherScene {
    pub fn reset(&mut self) {
        self.shown_temp = None;
        self.ticker_x = None;
    }

    /// Draw the temperature and advance the ticker one pixel.
    ///
    /// Returns true when the ticker has completed a full pass.
    pub fn draw(
        &mut self,
        sink: &mut dyn DisplaySink,
        snapshot: Option<&WeatherSnapshot>,
        metric: bool,
        scale: u32,
    ) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };

        self.draw_temperature(sink, snapshot, metric, scale);

        if self.ticker_source.as_ref() != Some(snapshot) {
            self.ticker = build_ticker(snapshot, metric);
            self.ticker_source = Some(snapshot.clone());
        }
        self.draw_ticker(sink, scale)
    }

    fn draw_temperature(
        &mut self,
        sink: &mut dyn DisplaySink,
        snapshot: &WeatherSnapshot,
        metric: bool,
        scale: u32,
    ) {
        let unit = if metric { "c" } else { "f" };
        let text = format!("{}{unit}", snapshot.temperature.round() as i64);
        if self.shown_temp.as_deref() == Some(text.as_str()) {
            return;
        }

        if let Some(old) = self.shown_temp.take() {
            sink.set_pen(palette::BLACK);
            sink.text(&old, right_x(sink, &old, scale), 1, TEMP_FONT, scale);
        }
        let celsius = if metric {
            snapshot.temperature
        } else {
            (snapshot.temperature - 32.0) * 5.0 / 9.0
        };
        sink.set_pen(temperature_colour(celsius));
        sink.text(&text, right_x(sink, &text, scale), 1, TEMP_FONT, scale);
        self.shown_temp = Some(text);
    }

    fn draw_ticker(&mut self, sink: &mut dyn DisplaySink, scale: u32) -> bool {
        let band_height = TICKER_FONT.height() * scale;
        let y = (sink.height() - band_height) as i32 - 1;
        let total_width: i32 = self
            .ticker
            .iter()
            .map(|(text, _)| measure_text(text, TICKER_FONT, scale) as i32)
            .sum();

        let x = self.ticker_x.unwrap_or(sink.width() as i32);

        sink.set_pen(palette::BLACK);
        sink.rectangle(0, y, sink.width(), band_height);

        let mut cursor = x;
        for (text, colour) in &self.ticker {
            sink.set_pen(*colour);
            sink.text(text, cursor, y, TICKER_FONT, scale);
            cursor += measure_text(text, TICKER_FONT, scale) as i32;
        }

        if x + total_width < 0 {
            self.ticker_x = None;
            true
        } else {
            self.ticker_x = Some(x - 1);
            false
        }
    }
}

fn right_x(sink: &dyn DisplaySink, text: &str, scale: u32) -> i32 {
    sink.width() as i32 - measure_text(text, TEMP_FONT, scale) as i32 - 1
}

fn build_ticker(snapshot: &WeatherSnapshot, metric: bool) -> Vec<(String, Rgb888)> {
    let wind_unit = if metric { "kmh" } else { "mph" };
    let wind_kmh = if metric {
        snapshot.wind_speed
    } else {
        snapshot.wind_speed * 1.609
    };

    vec![
        (snapshot.condition().to_string(), palette::WHITE),
        (
            format!("  Hi:{}", snapshot.high.round() as i64),
            palette::ORANGE,
        ),
        (
            format!("  Lo:{}", snapshot.low.round() as i64),
            palette::SKY_BLUE,
        ),
        (
            format!("  Rain:{}%", snapshot.rain_chance_pct),
            palette::CYAN,
        ),
        (
            format!(
                "  Wind:{}{wind_unit} {}",
                snapshot.wind_speed.round() as i64,
                compass_point(snapshot.wind_direction_deg),
            ),
            wind_colour(wind_kmh),
        ),
        (
            format!("  Hum:{}%", snapshot.humidity_pct),
            palette::LIGHT_GREEN,
        ),
    ]
}
