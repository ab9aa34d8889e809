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

//! In-memory RGB framebuffer sized to the panel.
//!
//! This is the back buffer every scene draws into; a presenter copies it
//! out on `present`. It implements [`DrawTarget`] so the
//! `embedded-graphics` text and primitive pipeline draws straight into it.
//! Out-of-bounds pixels are silently dropped, which is what a scrolling
//! scene wants when its text is partly off-panel.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// A width x height grid of [`Rgb888`] pixels.
#[derive(Debug, Clone)]
pub struct MatrixBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl MatrixBuffer {
    /// A buffer of the given dimensions, all black.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` when off-panel.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgb888> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.pixels[(y as u32 * self.width + x as u32) as usize])
    }

    /// Set one pixel; off-panel coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, colour: Rgb888) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize] = colour;
    }

    /// Flood the whole buffer with one colour.
    pub fn fill(&mut self, colour: Rgb888) {
        self.pixels.fill(colour);
    }
}

impl OriginDimensions for MatrixBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for MatrixBuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, colour) in pixels {
            self.set(point.x, point.y, colour);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_black() {
        let buffer = MatrixBuffer::new(8, 4);
        assert_eq!(buffer.get(0, 0), Some(Rgb888::BLACK));
        assert_eq!(buffer.get(7, 3), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_set_and_get() {
        let mut buffer = MatrixBuffer::new(8, 4);
        buffer.set(3, 2, Rgb888::new(10, 20, 30));
        assert_eq!(buffer.get(3, 2), Some(Rgb888::new(10, 20, 30)));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut buffer = MatrixBuffer::new(8, 4);
        buffer.set(-1, 0, Rgb888::WHITE);
        buffer.set(8, 0, Rgb888::WHITE);
        buffer.set(0, 4, Rgb888::WHITE);
        assert_eq!(buffer.get(-1, 0), None);
        assert_eq!(buffer.get(8, 0), None);
        assert!(buffer.get(0, 0) == Some(Rgb888::BLACK));
    }

    #[test]
    fn test_fill() {
        let mut buffer = MatrixBuffer::new(4, 4);
        buffer.fill(Rgb888::new(1, 2, 3));
        assert_eq!(buffer.get(0, 0), Some(Rgb888::new(1, 2, 3)));
        assert_eq!(buffer.get(3, 3), Some(Rgb888::new(1, 2, 3)));
    }
}
