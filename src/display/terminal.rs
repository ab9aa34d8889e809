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

//! Presenter backends.
//!
//! A [`Presenter`] is the seam between the framebuffer and real output
//! hardware. The shipped backend paints the panel into a terminal with
//! half-block glyphs (each character cell carries two vertically stacked
//! pixels); a HUB75 driver would implement the same trait.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Colors, Print, ResetColor, SetColors};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::warn;

use super::framebuffer::MatrixBuffer;

/// Output backend that a completed frame is handed to.
pub trait Presenter {
    /// Push one finished frame to the output device.
    fn present(&mut self, frame: &MatrixBuffer) -> io::Result<()>;
}

/// Terminal backend: one character cell per two pixels, upper half block
/// glyph with independent foreground/background colours.
///
/// Owns the terminal for its lifetime: alternate screen, hidden cursor,
/// raw mode (so key presses reach the switch reader without echo). All of
/// it is undone on drop.
#[derive(Debug)]
pub struct TerminalPresenter {
    out: Stdout,
}

impl TerminalPresenter {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { out })
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, frame: &MatrixBuffer) -> io::Result<()> {
        for row in 0..frame.height().div_ceil(2) {
            queue!(self.out, MoveTo(0, row as u16))?;
            let top = (row * 2) as i32;
            for x in 0..frame.width() as i32 {
                let upper = frame.get(x, top).unwrap_or(Rgb888::BLACK);
                let lower = frame.get(x, top + 1).unwrap_or(Rgb888::BLACK);
                queue!(
                    self.out,
                    SetColors(Colors::new(to_term(upper), to_term(lower))),
                    Print('▀'),
                )?;
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, Show, LeaveAlternateScreen) {
            warn!("could not restore terminal screen: {e}");
        }
        if let Err(e) = disable_raw_mode() {
            warn!("could not disable raw mode: {e}");
        }
    }
}

fn to_term(colour: Rgb888) -> Color {
    Color::Rgb {
        r: colour.r(),
        g: colour.g(),
        b: colour.b(),
    }
}

/// Backend that discards frames. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct NullPresenter {
    /// Frames presented so far.
    pub frames: u64,
}

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &MatrixBuffer) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
