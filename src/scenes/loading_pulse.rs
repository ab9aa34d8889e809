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

//! Fetch-in-progress indicator: a single corner pixel blinking while the
//! provider is working.

use crate::display::{palette, DisplaySink};

/// Draw the indicator pixel. Lit on odd invocation counts while a fetch
/// is in flight; dark otherwise.
pub fn draw(sink: &mut dyn DisplaySink, processing: bool, count: u32) {
    let x = sink.width() as i32 - 1;
    let y = sink.height() as i32 - 1;
    sink.set_pen(if processing && count % 2 == 1 {
        palette::GREEN
    } else {
        palette::BLACK
    });
    sink.pixel(x, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayPreset, MatrixPanel, NullPresenter};

    #[test]
    fn test_blinks_only_while_processing() {
        let mut panel = MatrixPanel::new(DisplayPreset::Square32, NullPresenter::default());

        draw(&mut panel, true, 1);
        assert_eq!(panel.frame().get(31, 31), Some(palette::GREEN));
        draw(&mut panel, true, 2);
        assert_eq!(panel.frame().get(31, 31), Some(palette::BLACK));
        draw(&mut panel, false, 3);
        assert_eq!(panel.frame().get(31, 31), Some(palette::BLACK));
    }
}
