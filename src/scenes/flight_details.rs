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

//! Flight details band: flight number with per-character colouring, the
//! position in the tracked list, and a dividing rule.
//!
//! Drawn only on scene reset; nothing in the band animates, so repainting
//! it every frame would be wasted work.

use flight_feed::Flight;

use crate::display::{measure_text, palette, DisplaySink, Font};

const LABEL_FONT: Font = Font::Regular;
const COUNTER_FONT: Font = Font::Tiny;

/// Draw the middle band for the current flight. A no-op when `index` is
/// out of range (empty list, or a list that shrank under us).
pub fn draw(sink: &mut dyn DisplaySink, flights: &[Flight], index: usize, scale: u32) {
    let Some(flight) = flights.get(index) else {
        return;
    };

    let y = band_y(sink);

    // Flight number, digits and letters in different pens so the number
    // reads at a glance.
    let mut x = 1;
    let advance = measure_text("0", LABEL_FONT, scale) as i32;
    for ch in flight.label().chars() {
        sink.set_pen(if ch.is_ascii_digit() {
            palette::YELLOW
        } else {
            palette::WHITE
        });
        sink.text(ch.encode_utf8(&mut [0u8; 4]), x, y, LABEL_FONT, scale);
        x += advance;
    }

    // "n/m" position in the tracked list, 1-based
    let counter = format!("{}/{}", index + 1, flights.len());
    let counter_x = sink.width() as i32 - measure_text(&counter, COUNTER_FONT, scale) as i32 - 1;
    sink.set_pen(palette::GREY);
    sink.text(&counter, counter_x, y, COUNTER_FONT, scale);

    // Rule separating the band from the scroller below
    let rule_y = y + (LABEL_FONT.height() * scale) as i32 + 1;
    sink.set_pen(palette::DARK_GREY);
    sink.line(0, rule_y, sink.width() as i32 - 1, rule_y);
}

fn band_y(sink: &dyn DisplaySink) -> i32 {
    // Sits clear of the journey band above (bold glyphs) and the
    // scroller below.
    sink.height() as i32 / 2 - 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};
    use embedded_graphics::pixelcolor::Rgb888;

    fn panel() -> MatrixPanel<NullPresenter> {
        MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default())
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

    fn flight(flight_number: &str) -> Flight {
        Flight {
            flight_number: flight_number.to_string(),
            ..Flight::default()
        }
    }

    #[test]
    fn test_empty_list_draws_nothing() {
        let mut p = panel();
        draw(&mut p, &[], 0, 1);
        assert_eq!(count_colour(&p, palette::WHITE), 0);
        assert_eq!(count_colour(&p, palette::DARK_GREY), 0);
    }

    #[test]
    fn test_out_of_range_index_draws_nothing() {
        let mut p = panel();
        draw(&mut p, &[flight("BA123")], 3, 1);
        assert_eq!(count_colour(&p, palette::WHITE), 0);
    }

    #[test]
    fn test_digits_and_letters_use_different_pens() {
        let mut p = panel();
        draw(&mut p, &[flight("BA123")], 0, 1);
        assert!(count_colour(&p, palette::WHITE) > 0);
        assert!(count_colour(&p, palette::YELLOW) > 0);
        // Rule is present
        assert!(count_colour(&p, palette::DARK_GREY) >= 64);
    }

    #[test]
    fn test_counter_uses_one_based_position() {
        let flights = vec![flight("BA123"), flight("EZY45"), flight("TOM99")];
        // Just exercise the formatting path for the last entry
        let mut p = panel();
        draw(&mut p, &flights, 2, 1);
        assert!(count_colour(&p, palette::GREY) > 0);
    }
}
