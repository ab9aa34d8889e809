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

//! Keyframe animation scheduler.
//!
//! A single-threaded cooperative frame loop: a fixed-period clock advances
//! an integer frame counter, and each tick every registered callback is
//! checked against its `(divisor, offset)` schedule. Callbacks run
//! strictly sequentially in registration order; there is no preemption and
//! no locking, because exactly one callback executes at a time.
//!
//! Two kinds of keyframe exist:
//!
//! - **Reset-only** (`divisor == 0`): run once at frame 0 and once per
//!   scene reset, never during steady-state ticks.
//! - **Periodic** (`divisor > 0`): run when `frame > 0` and
//!   `(frame - offset) % divisor == 0`. Each periodic keyframe carries a
//!   private invocation counter, passed to the callback on every run;
//!   returning `true` ("cycle complete") resets it to 0, returning
//!   `false` increments it.
//!
//! Callbacks must not block: anything slow (network, disk, audio) belongs
//! on a background task that a callback merely signals and polls.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Scheduler host. Implemented by the state struct the callbacks mutate.
///
/// A callback cannot call back into the [`Animator`] that is driving it,
/// so an in-callback scene reset is expressed as a request on the host;
/// the animator services it immediately after the requesting callback
/// returns, before the next callback of the same frame runs.
pub trait AnimatorHost {
    /// Take a pending scene-reset request, clearing it.
    fn take_reset_request(&mut self) -> bool {
        false
    }
}

enum Action<H> {
    Reset(fn(&mut H)),
    Periodic(fn(&mut H, u32) -> bool),
}

impl<H> Clone for Action<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Action<H> {}

/// One registered callback plus its scheduling descriptor.
///
/// `(name, divisor, offset)` are fixed for the life of the animator; only
/// the invocation counter mutates, and only the scheduler mutates it.
struct Keyframe<H> {
    name: &'static str,
    divisor: u32,
    offset: i64,
    count: u32,
    action: Action<H>,
}

/// Builder assembling the ordered keyframe registry.
///
/// Registration is explicit: every callback is named and given its
/// schedule at composition time. Names must be unique within one
/// animator; a duplicate is a programming error and panics.
pub struct AnimatorBuilder<H> {
    period: Duration,
    keyframes: Vec<Keyframe<H>>,
}

impl<H> std::fmt::Debug for AnimatorBuilder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatorBuilder")
            .field("period", &self.period)
            .field("keyframes", &self.keyframes.len())
            .finish()
    }
}

impl<H> AnimatorBuilder<H> {
    /// Start a registry with the given frame period.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            keyframes: Vec::new(),
        }
    }

    /// Register a reset-only callback (divisor 0).
    #[must_use]
    pub fn on_reset(mut self, name: &'static str, callback: fn(&mut H)) -> Self {
        self.assert_unique(name);
        self.keyframes.push(Keyframe {
            name,
            divisor: 0,
            offset: 0,
            count: 0,
            action: Action::Reset(callback),
        });
        self
    }

    /// Register a periodic callback running every `divisor` frames.
    #[must_use]
    pub fn every(self, divisor: u32, name: &'static str, callback: fn(&mut H, u32) -> bool) -> Self {
        self.every_at(divisor, 0, name, callback)
    }

    /// Register a periodic callback with a frame offset.
    #[must_use]
    pub fn every_at(
        mut self,
        divisor: u32,
        offset: i64,
        name: &'static str,
        callback: fn(&mut H, u32) -> bool,
    ) -> Self {
        assert!(divisor > 0, "periodic keyframe '{name}' needs divisor > 0");
        self.assert_unique(name);
        self.keyframes.push(Keyframe {
            name,
            divisor,
            offset,
            count: 0,
            action: Action::Periodic(callback),
        });
        self
    }

    /// Finish registration.
    #[must_use]
    pub fn build(self) -> Animator<H> {
        Animator {
            period: self.period,
            keyframes: self.keyframes,
            frame: 0,
        }
    }

    fn assert_unique(&self, name: &str) {
        assert!(
            self.keyframes.iter().all(|kf| kf.name != name),
            "duplicate keyframe name '{name}'"
        );
    }
}

/// The cooperative frame-loop scheduler.
pub struct Animator<H> {
    period: Duration,
    keyframes: Vec<Keyframe<H>>,
    frame: u64,
}

impl<H> std::fmt::Debug for Animator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("frame", &self.frame)
            .field("keyframes", &self.keyframes.len())
            .field("period", &self.period)
            .finish()
    }
}

impl<H: AnimatorHost> Animator<H> {
    /// Current frame counter.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every reset-only callback, in registration order.
    ///
    /// Independent of the frame clock; does not reset `frame`.
    pub fn reset_scene(&self, host: &mut H) {
        for keyframe in &self.keyframes {
            if let Action::Reset(callback) = keyframe.action {
                callback(host);
            }
        }
    }

    /// Run one scheduler pass and advance the frame counter.
    pub fn tick(&mut self, host: &mut H) {
        for index in 0..self.keyframes.len() {
            let (divisor, offset, count, action) = {
                let kf = &self.keyframes[index];
                (kf.divisor, kf.offset, kf.count, kf.action)
            };

            match action {
                Action::Reset(callback) => {
                    if self.frame == 0 {
                        callback(host);
                    }
                }
                Action::Periodic(callback) => {
                    let due = self.frame > 0
                        && (self.frame as i64 - offset).rem_euclid(i64::from(divisor)) == 0;
                    if due {
                        let cycle_complete = callback(host, count);
                        self.keyframes[index].count =
                            if cycle_complete { 0 } else { count + 1 };

                        // Service an in-callback reset before the next
                        // callback of this frame runs.
                        if host.take_reset_request() {
                            self.reset_scene(host);
                        }
                    }
                }
            }
        }

        self.frame += 1;
    }

    /// Drive the loop until cancelled.
    ///
    /// One pass per period; the cancellation token is observed between
    /// iterations, never mid-callback.
    pub async fn play(&mut self, host: &mut H, cancel_token: &CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(host),
                () = cancel_token.cancelled() => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestHost {
        log: Vec<String>,
        counts_seen: Vec<u32>,
        /// Scripted return values for the counting callback.
        returns: Vec<bool>,
        reset_requested: bool,
    }

    impl AnimatorHost for TestHost {
        fn take_reset_request(&mut self) -> bool {
            std::mem::take(&mut self.reset_requested)
        }
    }

    fn log_reset(host: &mut TestHost) {
        host.log.push("reset".to_string());
    }

    fn log_tick(host: &mut TestHost, _count: u32) -> bool {
        host.log.push("tick".to_string());
        false
    }

    fn record_count(host: &mut TestHost, count: u32) -> bool {
        host.counts_seen.push(count);
        let index = host.counts_seen.len() - 1;
        host.returns.get(index).copied().unwrap_or(false)
    }

    #[test]
    fn test_reset_only_runs_at_frame_zero_and_on_reset() {
        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .on_reset("setup", log_reset)
            .build();

        for _ in 0..10 {
            animator.tick(&mut host);
        }
        assert_eq!(host.log, vec!["reset"]);

        animator.reset_scene(&mut host);
        animator.reset_scene(&mut host);
        assert_eq!(host.log.len(), 3);
    }

    #[test]
    fn test_divisor_five_fires_every_fifth_frame() {
        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .every(5, "fifth", log_tick)
            .build();

        // Frames 0..=100: due at 5, 10, ..., 100
        for _ in 0..=100 {
            animator.tick(&mut host);
        }
        assert_eq!(host.log.len(), 20);
    }

    #[test]
    fn test_not_due_at_frame_zero() {
        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .every(1, "always", log_tick)
            .build();

        animator.tick(&mut host); // frame 0
        assert!(host.log.is_empty());
        animator.tick(&mut host); // frame 1
        assert_eq!(host.log.len(), 1);
    }

    #[test]
    fn test_offset_shifts_schedule() {
        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .every_at(5, 2, "shifted", log_tick)
            .build();

        // Due at frames 2, 7, 12
        for _ in 0..=12 {
            animator.tick(&mut host);
        }
        assert_eq!(host.log.len(), 3);
    }

    #[test]
    fn test_count_resets_on_truthy_return() {
        let mut host = TestHost {
            returns: vec![false, false, false, true, false, false],
            ..TestHost::default()
        };
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .every(1, "counter", record_count)
            .build();

        for _ in 0..7 {
            animator.tick(&mut host);
        }
        assert_eq!(host.counts_seen, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_registration_order_preserved() {
        fn log_a(host: &mut TestHost, _count: u32) -> bool {
            host.log.push("a".to_string());
            false
        }
        fn log_b(host: &mut TestHost, _count: u32) -> bool {
            host.log.push("b".to_string());
            false
        }

        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .every(1, "a", log_a)
            .every(1, "b", log_b)
            .build();

        animator.tick(&mut host);
        animator.tick(&mut host);
        assert_eq!(host.log, vec!["a", "b"]);
    }

    #[test]
    fn test_in_callback_reset_runs_before_next_callback() {
        fn request_reset(host: &mut TestHost, _count: u32) -> bool {
            host.log.push("requester".to_string());
            host.reset_requested = true;
            false
        }
        fn log_after(host: &mut TestHost, _count: u32) -> bool {
            host.log.push("after".to_string());
            false
        }

        let mut host = TestHost::default();
        let mut animator = AnimatorBuilder::new(Duration::from_millis(100))
            .on_reset("setup", log_reset)
            .every(1, "requester", request_reset)
            .every(1, "after", log_after)
            .build();

        animator.tick(&mut host); // frame 0: reset only
        animator.tick(&mut host); // frame 1: requester, reset, after
        assert_eq!(host.log, vec!["reset", "requester", "reset", "after"]);
    }

    #[test]
    #[should_panic(expected = "duplicate keyframe name")]
    fn test_duplicate_name_panics() {
        let _ = AnimatorBuilder::<TestHost>::new(Duration::from_millis(100))
            .every(1, "same", log_tick)
            .every(2, "same", log_tick);
    }
}
