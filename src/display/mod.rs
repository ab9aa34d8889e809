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

//! Panel drawing surface.
//!
//! Scenes draw through [`DisplaySink`]: a stateful pen, filled
//! rectangles, lines, pixels and bitmap text, with an explicit
//! [`DisplaySink::present`] that pushes the finished frame to the output
//! backend. Nothing reaches the output device until `present`, so a scene
//! can erase and redraw freely within one frame without flicker.

pub mod framebuffer;
pub mod terminal;

use clap::ValueEnum;
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_5X8, FONT_6X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use log::warn;
use serde::{Deserialize, Serialize};

pub use framebuffer::MatrixBuffer;
pub use terminal::{NullPresenter, Presenter, TerminalPresenter};

/// Named pens used by the scenes.
pub mod palette {
    use embedded_graphics::pixelcolor::Rgb888;

    pub const BLACK: Rgb888 = Rgb888::new(0, 0, 0);
    pub const WHITE: Rgb888 = Rgb888::new(255, 255, 255);
    pub const RED: Rgb888 = Rgb888::new(255, 0, 0);
    pub const GREEN: Rgb888 = Rgb888::new(0, 255, 0);
    pub const BLUE: Rgb888 = Rgb888::new(0, 90, 205);
    pub const YELLOW: Rgb888 = Rgb888::new(255, 255, 0);
    pub const ORANGE: Rgb888 = Rgb888::new(255, 140, 0);
    pub const CYAN: Rgb888 = Rgb888::new(0, 255, 255);
    pub const MAGENTA: Rgb888 = Rgb888::new(255, 0, 255);
    pub const PINK: Rgb888 = Rgb888::new(250, 125, 180);
    pub const GREY: Rgb888 = Rgb888::new(140, 140, 140);
    pub const DARK_GREY: Rgb888 = Rgb888::new(60, 60, 60);
    pub const GOLD: Rgb888 = Rgb888::new(255, 215, 0);
    pub const SKY_BLUE: Rgb888 = Rgb888::new(100, 180, 255);
    pub const LIGHT_GREEN: Rgb888 = Rgb888::new(130, 255, 130);
}

/// Bitmap fonts available to scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// 4x6, for dense panels and ticker lines.
    Tiny,
    /// 5x8 general-purpose.
    Regular,
    /// 6x13 bold, for emphasis (home airport code, titles).
    Bold,
}

impl Font {
    fn glyphs(self) -> &'static MonoFont<'static> {
        match self {
            Font::Tiny => &FONT_4X6,
            Font::Regular => &FONT_5X8,
            Font::Bold => &FONT_6X13_BOLD,
        }
    }

    /// Glyph height in pixels at scale 1.
    #[must_use]
    pub fn height(self) -> u32 {
        self.glyphs().character_size.height
    }
}

/// Pixel width of `text` rendered in `font` at integer `scale`.
#[must_use]
pub fn measure_text(text: &str, font: Font, scale: u32) -> u32 {
    let glyphs = font.glyphs();
    let count = text.chars().count() as u32;
    if count == 0 {
        return 0;
    }
    let advance = glyphs.character_size.width + glyphs.character_spacing;
    (count * advance - glyphs.character_spacing) * scale
}

/// Supported panel geometries.
///
/// The half-height variant is a 64x32 image on a 64x64 driver chain (the
/// panel skips alternate rows); logically it is just 64x32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum DisplayPreset {
    #[value(name = "32x32")]
    #[serde(rename = "32x32")]
    Square32,
    #[value(name = "64x32")]
    #[serde(rename = "64x32")]
    Wide64,
    #[value(name = "64x32-half")]
    #[serde(rename = "64x32-half")]
    HalfHeight64,
    #[value(name = "64x64")]
    #[serde(rename = "64x64")]
    Square64,
    #[value(name = "128x64")]
    #[serde(rename = "128x64")]
    Wide128,
}

impl DisplayPreset {
    #[must_use]
    pub fn width(self) -> u32 {
        match self {
            DisplayPreset::Square32 => 32,
            DisplayPreset::Wide64 | DisplayPreset::HalfHeight64 | DisplayPreset::Square64 => 64,
            DisplayPreset::Wide128 => 128,
        }
    }

    #[must_use]
    pub fn height(self) -> u32 {
        match self {
            DisplayPreset::Square32 | DisplayPreset::Wide64 | DisplayPreset::HalfHeight64 => 32,
            DisplayPreset::Square64 | DisplayPreset::Wide128 => 64,
        }
    }

    /// Default text scale for this geometry.
    #[must_use]
    pub fn text_scale(self) -> u32 {
        match self {
            DisplayPreset::Wide128 => 2,
            _ => 1,
        }
    }
}

/// Drawing surface handed to scenes.
///
/// All drawing goes to a back buffer; `present` pushes it out. Every
/// operation is infallible from the caller's side: output errors are
/// logged by the implementation, never propagated into scene callbacks.
pub trait DisplaySink {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Set the current drawing colour.
    fn set_pen(&mut self, colour: Rgb888);

    /// Flood the whole buffer with the current pen.
    fn clear(&mut self);

    fn pixel(&mut self, x: i32, y: i32);

    /// Filled axis-aligned rectangle.
    fn rectangle(&mut self, x: i32, y: i32, width: u32, height: u32);

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn text(&mut self, text: &str, x: i32, y: i32, font: Font, scale: u32);

    /// Push the back buffer to the output device.
    fn present(&mut self);
}

/// The standard sink: framebuffer plus a presenter backend.
#[derive(Debug)]
pub struct MatrixPanel<P> {
    buffer: MatrixBuffer,
    pen: Rgb888,
    presenter: P,
}

impl<P: Presenter> MatrixPanel<P> {
    #[must_use]
    pub fn new(preset: DisplayPreset, presenter: P) -> Self {
        Self {
            buffer: MatrixBuffer::new(preset.width(), preset.height()),
            pen: palette::WHITE,
            presenter,
        }
    }

    /// The current back buffer. Tests inspect this.
    #[must_use]
    pub fn frame(&self) -> &MatrixBuffer {
        &self.buffer
    }
}

impl<P: Presenter> DisplaySink for MatrixPanel<P> {
    fn width(&self) -> u32 {
        self.buffer.width()
    }

    fn height(&self) -> u32 {
        self.buffer.height()
    }

    fn set_pen(&mut self, colour: Rgb888) {
        self.pen = colour;
    }

    fn clear(&mut self) {
        self.buffer.fill(self.pen);
    }

    fn pixel(&mut self, x: i32, y: i32) {
        self.buffer.set(x, y, self.pen);
    }

    fn rectangle(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let shape = Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_fill(self.pen));
        let _ = shape.draw(&mut self.buffer);
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let shape = Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(self.pen, 1));
        let _ = shape.draw(&mut self.buffer);
    }

    fn text(&mut self, text: &str, x: i32, y: i32, font: Font, scale: u32) {
        if text.is_empty() {
            return;
        }

        if scale <= 1 {
            let style = MonoTextStyle::new(font.glyphs(), self.pen);
            let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                .draw(&mut self.buffer);
            return;
        }

        // Mono fonts only render at 1x; rasterise into a scratch buffer
        // and integer-scale the lit pixels with the current pen.
        let width = measure_text(text, font, 1);
        let height = font.height();
        let mut scratch = MatrixBuffer::new(width, height);
        let style = MonoTextStyle::new(font.glyphs(), Rgb888::WHITE);
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scratch);

        let scale = scale as i32;
        for sy in 0..height as i32 {
            for sx in 0..width as i32 {
                if scratch.get(sx, sy) == Some(Rgb888::WHITE) {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.buffer
                                .set(x + sx * scale + dx, y + sy * scale + dy, self.pen);
                        }
                    }
                }
            }
        }
    }

    fn present(&mut self) {
        if let Err(e) = self.presenter.present(&self.buffer) {
            warn!("present failed: {e}");
        }
    }
}
