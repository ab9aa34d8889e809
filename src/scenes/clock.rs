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

//! Wall-clock scene, top-left corner.

use chrono::NaiveTime;

use crate::display::{palette, DisplaySink, Font};

const FONT: Font = Font::Regular;

/// HH:MM, redrawn only when the minute changes.
#[derive(Debug, Default)]
pub struct ClockScene {
    shown: Option<String>,
}

impl ClockScene {
    /// Forget what is on the panel; the next draw repaints from scratch.
    pub fn reset(&mut self) {
        self.shown = None;
    }

    /// Draw the time if it changed. Returns whether anything was drawn.
    pub fn draw(&mut self, sink: &mut dyn DisplaySink, now: NaiveTime, scale: u32) -> bool {
        let text = now.format("%H:%M").to_string();
        if self.shown.as_deref() == Some(text.as_str()) {
            return false;
        }

        if let Some(old) = self.shown.take() {
            sink.set_pen(palette::BLACK);
            sink.text(&old, 1, 1, FONT, scale);
        }
        sink.set_pen(palette::WHITE);
        sink.text(&text, 1, 1, FONT, scale);
        self.shown = Some(text);
        true
    }
}
