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

//! Date scene, centred mid-panel.

use chrono::{Datelike, NaiveDate};

use crate::display::{measure_text, palette, DisplaySink, Font};

const FONT: Font = Font::Tiny;

/// "Mon 3/8" style date, redrawn only when the day changes.
#[derive(Debug, Default)]
pub struct DateScene {
    shown: Option<String>,
}

impl DateScene {
    pub fn reset(&mut self) {
        self.shown = None;
    }

    /// Draw the date if it changed. Returns whether anything was drawn.
    pub fn draw(&mut self, sink: &mut dyn DisplaySink, today: NaiveDate, scale: u32) -> bool {
        let text = format!("{} {}/{}", today.format("%a"), today.day(), today.month());
        if self.shown.as_deref() == Some(text.as_str()) {
            return false;
        }

        let y = sink.height() as i32 / 2 - (FONT.height() * scale) as i32 / 2;
        if let Some(old) = self.shown.take() {
            let old_x = centred_x(sink, &old, scale);
            sink.set_pen(palette::BLACK);
            sink.text(&old, old_x, y, FONT, scale);
        }
        let x = centred_x(sink, &text, scale);
        sink.set_pen(palette::GREY);
        sink.text(&text, x, y, FONT, scale);
        self.shown = Some(text);
        true
    }
}

fn centred_x(sink: &dyn DisplaySink, text: &str, scale: u32) -> i32 {
    (sink.width() as i32 - measure_text(text, FONT, scale) as i32) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};

    fn panel() -> MatrixPanel<NullPresenter> {
        MatrixPanel::new(DisplayPreset::Wide64, NullPresenter::default())
    }

    fn any_grey(panel: &MatrixPanel<NullPresenter>) -> bool {
        for y in 0..32 {
            for x in 0..64 {
                if panel.frame().get(x, y) == Some(palette::GREY) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn test_draws_once_per_day() {
        let mut scene = DateScene::default();
        let mut panel = panel();
        let day = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert!(scene.draw(&mut panel, day, 1));
        assert!(any_grey(&panel));
        assert!(!scene.draw(&mut panel, day, 1));
        assert!(scene.draw(&mut panel, day.succ_opt().unwrap(), 1));
    }
}
