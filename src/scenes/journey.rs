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

//! Journey scene: origin and destination codes across the top row, with
//! an animated arrow between them.

use flight_feed::Flight;

use crate::display::{measure_text, palette, DisplaySink, Font};

/// Placeholder for a missing airport code, padded to sit where a
/// three-letter code would.
const UNKNOWN_CODE: &str = " ? ";

/// Top-row route display.
#[derive(Debug, Default)]
pub struct JourneyScene {
    shown: Option<(String, String)>,
}

impl JourneyScene {
    pub fn reset(&mut self) {
        self.shown = None;
    }

    /// Draw the route codes if they changed. The home airport code is
    /// drawn bold and gold.
    pub fn draw(
        &mut self,
        sink: &mut dyn DisplaySink,
        flight: Option<&Flight>,
        home_airport: &str,
        scale: u32,
    ) -> bool {
        let Some(flight) = flight else {
            return false;
        };

        let origin = code_or_unknown(&flight.origin);
        let destination = code_or_unknown(&flight.destination);
        if self
            .shown
            .as_ref()
            .is_some_and(|(o, d)| o.as_str() == origin && d.as_str() == destination)
        {
            return false;
        }

        // Repaint the whole band rather than diffing two fonts.
        let band_height = Font::Bold.height() * scale;
        sink.set_pen(palette::BLACK);
        sink.rectangle(0, 0, sink.width(), band_height);

        draw_code(sink, origin, 1, home_airport, scale);
        let dest_font = code_font(destination, home_airport);
        let dest_x = sink.width() as i32 - measure_text(destination, dest_font, scale) as i32 - 1;
        draw_code(sink, destination, dest_x, home_airport, scale);

        self.shown = Some((origin.to_string(), destination.to_string()));
        true
    }

    /// Redraw the arrow between the codes, alternating its colour so it
    /// reads as motion.
    pub fn draw_arrow(&self, sink: &mut dyn DisplaySink, count: u32, scale: u32) {
        if self.shown.is_none() {
            return;
        }

        let cx = sink.width() as i32 / 2;
        let cy = (Font::Regular.height() * scale) as i32 / 2;
        let reach = 3 * scale as i32;

        sink.set_pen(if count % 2 == 0 {
            palette::WHITE
        } else {
            palette::DARK_GREY
        });
        sink.line(cx - reach, cy, cx + reach - 1, cy);
        sink.line(cx + reach - 3, cy - 2, cx + reach - 1, cy);
        sink.line(cx + reach - 3, cy + 2, cx + reach - 1, cy);
    }
}

fn code_or_unknown(code: &str) -> &str {
    if code.is_empty() {
        UNKNOWN_CODE
    } else {
        code
    }
}

fn code_font(code: &str, home_airport: &str) -> Font {
    if code == home_airport {
        Font::Bold
    } else {
        Font::Regular
    }
}

fn draw_code(sink: &mut dyn DisplaySink, code: &str, x: i32, home_airport: &str, scale: u32) {
    let home = code == home_airport;
    sink.set_pen(if home { palette::GOLD } else { palette::WHITE });
    sink.text(code, x, 1, code_font(code, home_airport), scale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};
    use embedded_graphics::pixelcolor::Rgb888;

    fn flight(origin: &str, destination: &str) -> Flight {
        Flight {
            origin: origin.to_string(),
            destination: destination.to_string(),
            ..Flight::default()
        }
    }

    fn count_colour(panel: &MatrixPanel<NullPresenter>, colour: Rgb888) -> usize {
        let mut lit = 0;
        for y in 0..32 {
            for x in 0..64 {
                if panel.frame().get(x, y) == Some(colour) {
                    lit += 1;
                }
            }
        }
        lit
    }

    #[test]
    fn test_no_flight_is_a_no_op() {
        let mut scene = JourneyScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        assert!(!scene.draw(&mut panel, None, "GLA", 1));
    }

    #[test]
    fn test_unchanged_route_is_cached() {
        let mut scene = JourneyScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        let f = flight("LHR", "JFK");
        assert!(scene.draw(&mut panel, Some(&f), "GLA", 1));
        assert!(!scene.draw(&mut panel, Some(&f), "GLA", 1));
    }

    #[test]
    fn test_missing_codes_show_placeholder() {
        let mut scene = JourneyScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        assert!(scene.draw(&mut panel, Some(&flight("", "")), "GLA", 1));
        assert_eq!(
            scene.shown,
            Some((UNKNOWN_CODE.to_string(), UNKNOWN_CODE.to_string()))
        );
    }

    #[test]
    fn test_home_airport_is_gold() {
        let mut scene = JourneyScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        assert!(scene.draw(&mut panel, Some(&flight("GLA", "AMS")), "GLA", 1));
        assert!(count_colour(&panel, palette::GOLD) > 0);
        assert!(count_colour(&panel, palette::WHITE) > 0);
    }

    #[test]
    fn test_arrow_waits_for_route() {
        let scene = JourneyScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default());
        scene.draw_arrow(&mut panel, 0, 1);
        assert_eq!(count_colour(&panel, palette::WHITE), 0);
    }
}
