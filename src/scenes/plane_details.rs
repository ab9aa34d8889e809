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

//! Plane details scene: a one-pixel-per-frame scrolling line along the
//! bottom with the aircraft type, speed, heading and altitude. A
//! completed scroll is how the app knows to advance to the next flight.

use embedded_graphics::pixelcolor::Rgb888;
use flight_feed::Flight;

use crate::display::{measure_text, palette, DisplaySink, Font};
use crate::scenes::compass_point;

const FONT: Font = Font::Tiny;

/// ICAO type designator to friendly name. Types not listed scroll as
/// their raw designator.
const AIRCRAFT_NAMES: [(&str, &str); 78] = [
    ("A19N", "Airbus A319neo"),
    ("A20N", "Airbus A320neo"),
    ("A21N", "Airbus A321neo"),
    ("A306", "Airbus A300-600"),
    ("A310", "Airbus A310"),
    ("A318", "Airbus A318"),
    ("A319", "Airbus A319"),
    ("A320", "Airbus A320"),
    ("A321", "Airbus A321"),
    ("A332", "Airbus A330-200"),
    ("A333", "Airbus A330-300"),
    ("A339", "Airbus A330-900neo"),
    ("A343", "Airbus A340-300"),
    ("A346", "Airbus A340-600"),
    ("A359", "Airbus A350-900"),
    ("A35K", "Airbus A350-1000"),
    ("A388", "Airbus A380"),
    ("A400", "Airbus A400M"),
    ("AT72", "ATR 72"),
    ("AT75", "ATR 72-500"),
    ("AT76", "ATR 72-600"),
    ("B06", "Bell JetRanger"),
    ("B190", "Beechcraft 1900"),
    ("B350", "King Air 350"),
    ("B37M", "Boeing 737 MAX 7"),
    ("B38M", "Boeing 737 MAX 8"),
    ("B39M", "Boeing 737 MAX 9"),
    ("B712", "Boeing 717"),
    ("B732", "Boeing 737-200"),
    ("B733", "Boeing 737-300"),
    ("B734", "Boeing 737-400"),
    ("B735", "Boeing 737-500"),
    ("B736", "Boeing 737-600"),
    ("B737", "Boeing 737-700"),
    ("B738", "Boeing 737-800"),
    ("B739", "Boeing 737-900"),
    ("B744", "Boeing 747-400"),
    ("B748", "Boeing 747-8"),
    ("B752", "Boeing 757-200"),
    ("B753", "Boeing 757-300"),
    ("B762", "Boeing 767-200"),
    ("B763", "Boeing 767-300"),
    ("B764", "Boeing 767-400"),
    ("B772", "Boeing 777-200"),
    ("B773", "Boeing 777-300"),
    ("B77L", "Boeing 777-200LR"),
    ("B77W", "Boeing 777-300ER"),
    ("B788", "Boeing 787-8"),
    ("B789", "Boeing 787-9"),
    ("B78X", "Boeing 787-10"),
    ("BCS1", "Airbus A220-100"),
    ("BCS3", "Airbus A220-300"),
    ("BE20", "King Air 200"),
    ("C130", "Hercules"),
    ("C152", "Cessna 152"),
    ("C172", "Cessna 172"),
    ("C208", "Cessna Caravan"),
    ("C25A", "Citation CJ2"),
    ("C56X", "Citation Excel"),
    ("CL60", "Challenger 600"),
    ("CRJ2", "CRJ-200"),
    ("CRJ7", "CRJ-700"),
    ("CRJ9", "CRJ-900"),
    ("DA40", "Diamond Star"),
    ("DA42", "Diamond Twin Star"),
    ("DH8D", "Dash 8 Q400"),
    ("E145", "Embraer ERJ-145"),
    ("E170", "Embraer E170"),
    ("E190", "Embraer E190"),
    ("E195", "Embraer E195"),
    ("E75L", "Embraer E175"),
    ("EC35", "Airbus H135"),
    ("F100", "Fokker 100"),
    ("GLEX", "Global Express"),
    ("GLF5", "Gulfstream V"),
    ("PC12", "Pilatus PC-12"),
    ("R44", "Robinson R44"),
    ("SF34", "Saab 340"),
];

/// Friendly name for an ICAO type designator.
#[must_use]
pub fn aircraft_name(type_code: &str) -> Option<&'static str> {
    // Kept sorted by designator
    AIRCRAFT_NAMES
        .binary_search_by_key(&type_code, |&(code, _)| code)
        .ok()
        .map(|index| AIRCRAFT_NAMES[index].1)
}

/// Bottom-band scroller state.
#[derive(Debug, Default)]
pub struct PlaneScene {
    /// `None` means "start from the right edge on the next draw".
    scroll_x: Option<i32>,
}

impl PlaneScene {
    pub fn reset(&mut self) {
        self.scroll_x = None;
    }

    /// Draw the details line one pixel further left.
    ///
    /// Returns true once the whole line has scrolled off the left edge;
    /// the caller advances to the next flight and resets the scene.
    pub fn draw(&mut self, sink: &mut dyn DisplaySink, flight: Option<&Flight>, scale: u32) -> bool {
        let Some(flight) = flight else {
            return false;
        };

        let segments = build_line(flight);
        let total_width: i32 = segments
            .iter()
            .map(|(text, _)| measure_text(text, FONT, scale) as i32)
            .sum();

        let band_height = FONT.height() * scale;
        let y = (sink.height() - band_height) as i32 - 1;
        let x = self.scroll_x.unwrap_or(sink.width() as i32);

        sink.set_pen(palette::BLACK);
        sink.rectangle(0, y, sink.width(), band_height);

        let mut cursor = x;
        for (text, colour) in &segments {
            sink.set_pen(*colour);
            sink.text(text, cursor, y, FONT, scale);
            cursor += measure_text(text, FONT, scale) as i32;
        }

        if x + total_width < 0 {
            self.scroll_x = None;
            true
        } else {
            self.scroll_x = Some(x - 1);
            false
        }
    }
}

fn build_line(flight: &Flight) -> Vec<(String, Rgb888)> {
    let name = aircraft_name(&flight.aircraft_type)
        .map(str::to_owned)
        .unwrap_or_else(|| {
            if flight.aircraft_type.is_empty() {
                "Plane".to_string()
            } else {
                flight.aircraft_type.clone()
            }
        });

    let mut segments = vec![
        (name, palette::WHITE),
        (
            format!("  {}kts", flight.ground_speed.round() as i64),
            palette::CYAN,
        ),
        (
            format!("  {}", compass_point(flight.heading)),
            palette::LIGHT_GREEN,
        ),
    ];

    // Climb/descend glyph only when the aircraft is actually moving
    // vertically and an altitude is known.
    if flight.altitude > 0 {
        if flight.vertical_speed > 0 {
            segments.push(("  ^".to_string(), palette::LIGHT_GREEN));
        } else if flight.vertical_speed < 0 {
            segments.push(("  v".to_string(), palette::RED));
        } else {
            segments.push(("  ".to_string(), palette::GREY));
        }
        segments.push((format!("{}ft", flight.altitude), palette::GREY));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};

    fn flight() -> Flight {
        Flight {
            aircraft_type: "A320".to_string(),
            ground_speed: 447.3,
            heading: 92.0,
            altitude: 36_000,
            vertical_speed: -704,
            ..Flight::default()
        }
    }

    #[test]
    fn test_aircraft_name_lookup() {
        assert_eq!(aircraft_name("A320"), Some("Airbus A320"));
        assert_eq!(aircraft_name("B77W"), Some("Boeing 777-300ER"));
        assert_eq!(aircraft_name("ZZZZ"), None);
    }

    #[test]
    fn test_name_table_is_sorted_for_binary_search() {
        for pair in AIRCRAFT_NAMES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} out of order", pair[1].0);
        }
    }

    #[test]
    fn test_line_content() {
        let joined: String = build_line(&flight())
            .iter()
            .map(|(text, _)| text.as_str())
            .collect();
        assert!(joined.contains("Airbus A320"));
        assert!(joined.contains("447kts"));
        assert!(joined.contains("E"));
        assert!(joined.contains("v"));
        assert!(joined.contains("36000ft"));
    }

    #[test]
    fn test_no_altitude_suppresses_climb_glyph() {
        let mut f = flight();
        f.altitude = 0;
        f.vertical_speed = 1500;
        let joined: String = build_line(&f)
            .iter()
            .map(|(text, _)| text.as_str())
            .collect();
        assert!(!joined.contains('^'));
        assert!(!joined.contains("ft"));
    }

    #[test]
    fn test_unknown_type_scrolls_raw_code() {
        let mut f = flight();
        f.aircraft_type = "ZZZZ".to_string();
        let joined: String = build_line(&f)
            .iter()
            .map(|(text, _)| text.as_str())
            .collect();
        assert!(joined.contains("ZZZZ"));
    }

    #[test]
    fn test_scroll_completes_and_rearms() {
        let mut scene = PlaneScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Square32, NullPresenter::default());
        let f = flight();

        let mut frames = 0;
        while !scene.draw(&mut panel, Some(&f), 1) {
            frames += 1;
            assert!(frames < 2000, "scroll never completed");
        }
        // One pixel per frame: at least panel width + text width frames
        assert!(frames > 32);
        assert!(scene.scroll_x.is_none());
    }

    #[test]
    fn test_no_flight_is_a_no_op() {
        let mut scene = PlaneScene::default();
        let mut panel = MatrixPanel::new(DisplayPreset::Square32, NullPresenter::default());
        assert!(!scene.draw(&mut panel, None, 1));
    }
}
