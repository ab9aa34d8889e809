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

//! Switch input.
//!
//! The panel has two momentary switches. A [`SwitchSource`] is polled
//! once per frame and must never block; the shipped source maps terminal
//! keys (`a`, `b`) onto the switches, with `q` / Esc / Ctrl-C wired to
//! shutdown (raw mode swallows the usual Ctrl-C signal). Presses pass
//! through a per-switch debounce window before they act.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::warn;
use tokio_util::sync::CancellationToken;

/// Debounce window per switch.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// The two physical switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// Plays the notification chime.
    A,
    /// Toggles (and persists) the audio-enabled flag.
    B,
}

/// Per-switch press rate limiter.
///
/// A press is accepted when at least [`DEBOUNCE_WINDOW`] has passed since
/// the last accepted press of the same switch. The two switches debounce
/// independently.
#[derive(Debug, Default)]
pub struct Debouncer {
    last_accepted: [Option<Instant>; 2],
}

impl Debouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a press of `switch` at time `now` should act.
    pub fn accept(&mut self, switch: Switch, now: Instant) -> bool {
        let slot = &mut self.last_accepted[switch as usize];
        match slot {
            Some(last) if now.duration_since(*last) < DEBOUNCE_WINDOW => false,
            _ => {
                *slot = Some(now);
                true
            }
        }
    }
}

/// Non-blocking provider of switch presses.
pub trait SwitchSource {
    /// Presses observed since the last poll. Must not block.
    fn poll(&mut self) -> Vec<Switch>;
}

/// Terminal keyboard as the switch panel.
#[derive(Debug)]
pub struct KeyboardSwitches {
    cancel_token: CancellationToken,
}

impl KeyboardSwitches {
    #[must_use]
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self { cancel_token }
    }
}

impl SwitchSource for KeyboardSwitches {
    fn poll(&mut self) -> Vec<Switch> {
        let mut presses = Vec::new();

        // Drain everything queued; poll with a zero timeout never blocks.
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("keyboard poll failed: {e}");
                    break;
                }
            }

            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match key.code {
                KeyCode::Char('a' | 'A') => presses.push(Switch::A),
                KeyCode::Char('b' | 'B') => presses.push(Switch::B),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.cancel_token.cancel();
                }
                KeyCode::Char('q' | 'Q') | KeyCode::Esc => self.cancel_token.cancel(),
                _ => {}
            }
        }

        presses
    }
}

/// Scripted source for tests and headless runs.
#[derive(Debug, Default)]
pub struct NullSwitches {
    queued: Vec<Switch>,
}

impl NullSwitches {
    /// Queue a press to be returned by the next poll.
    pub fn press(&mut self, switch: Switch) {
        self.queued.push(switch);
    }
}

impl SwitchSource for NullSwitches {
    fn poll(&mut self) -> Vec<Switch> {
        std::mem::take(&mut self.queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_press_accepted() {
        let mut debouncer = Debouncer::new();
        assert!(debouncer.accept(Switch::A, Instant::now()));
    }

    #[test]
    fn test_press_within_window_rejected() {
        let mut debouncer = Debouncer::new();
        let start = Instant::now();
        assert!(debouncer.accept(Switch::A, start));
        assert!(!debouncer.accept(Switch::A, start + Duration::from_millis(100)));
        assert!(!debouncer.accept(Switch::A, start + Duration::from_millis(299)));
    }

    #[test]
    fn test_press_after_window_accepted() {
        let mut debouncer = Debouncer::new();
        let start = Instant::now();
        assert!(debouncer.accept(Switch::A, start));
        assert!(debouncer.accept(Switch::A, start + DEBOUNCE_WINDOW));
    }

    #[test]
    fn test_switches_debounce_independently() {
        let mut debouncer = Debouncer::new();
        let start = Instant::now();
        assert!(debouncer.accept(Switch::A, start));
        assert!(debouncer.accept(Switch::B, start + Duration::from_millis(50)));
        assert!(!debouncer.accept(Switch::A, start + Duration::from_millis(100)));
    }

    #[test]
    fn test_null_source_drains() {
        let mut source = NullSwitches::default();
        source.press(Switch::A);
        source.press(Switch::B);
        assert_eq!(source.poll(), vec![Switch::A, Switch::B]);
        assert!(source.poll().is_empty());
    }
}
