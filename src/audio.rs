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

//! Notification chime.
//!
//! Two-tone "bing-bong": D5 for 750 ms, a 225 ms rest, then B4 for
//! 670 ms, each note shaped with a short attack/release envelope so the
//! speaker does not click. Synthesis is pure and testable; playback runs
//! on its own thread behind the `audio` cargo feature and never touches
//! the frame loop.

use std::time::Duration;

/// First note ("bing"), D5.
const NOTE_ONE_HZ: f32 = 587.0;
const NOTE_ONE_MS: u64 = 750;

/// Silence between the notes.
const GAP_MS: u64 = 225;

/// Second note ("bong"), B4.
const NOTE_TWO_HZ: f32 = 494.0;
const NOTE_TWO_MS: u64 = 670;

const AMPLITUDE: f32 = 0.4;
const ATTACK_MS: u64 = 15;
const RELEASE_MS: u64 = 60;

/// Render one sine note with a linear attack and release envelope.
fn render_note(frequency_hz: f32, duration: Duration, sample_rate: u32) -> Vec<f32> {
    let total = (duration.as_secs_f32() * sample_rate as f32) as usize;
    let attack = (ATTACK_MS as f32 / 1000.0 * sample_rate as f32) as usize;
    let release = (RELEASE_MS as f32 / 1000.0 * sample_rate as f32) as usize;

    (0..total)
        .map(|n| {
            let envelope = if n < attack {
                n as f32 / attack as f32
            } else if n + release > total {
                (total - n) as f32 / release as f32
            } else {
                1.0
            };
            let phase = 2.0 * std::f32::consts::PI * frequency_hz * n as f32 / sample_rate as f32;
            AMPLITUDE * envelope * phase.sin()
        })
        .collect()
}

/// Render the complete chime at the given sample rate.
#[must_use]
pub fn render_chime(sample_rate: u32) -> Vec<f32> {
    let mut samples = render_note(NOTE_ONE_HZ, Duration::from_millis(NOTE_ONE_MS), sample_rate);
    let gap = (GAP_MS as f32 / 1000.0 * sample_rate as f32) as usize;
    samples.extend(std::iter::repeat(0.0).take(gap));
    samples.extend(render_note(
        NOTE_TWO_HZ,
        Duration::from_millis(NOTE_TWO_MS),
        sample_rate,
    ));
    samples
}

/// Play the chime on the default output device, without blocking.
#[cfg(feature = "audio")]
pub fn play_chime() {
    std::thread::spawn(|| {
        if let Err(e) = play_on_default_device() {
            log::warn!("chime playback failed: {e}");
        }
    });
}

/// Built without the `audio` feature: the chime is a no-op.
#[cfg(not(feature = "audio"))]
pub fn play_chime() {
    log::debug!("audio feature disabled, skipping chime");
}

#[cfg(feature = "audio")]
fn play_on_default_device() -> Result<(), Box<dyn std::error::Error>> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("no audio output device")?;
    let config = device.default_output_config()?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err("output device does not accept f32 samples".into());
    }

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let samples = render_chime(sample_rate);
    let playback_time =
        Duration::from_secs_f64(samples.len() as f64 / f64::from(sample_rate));

    let mut position = 0usize;
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                // Past the end of the chime the stream plays silence
                // until it is dropped.
                let sample = samples.get(position).copied().unwrap_or(0.0);
                for out in frame.iter_mut() {
                    *out = sample;
                }
                position += 1;
            }
        },
        |e| log::warn!("audio stream error: {e}"),
        None,
    )?;

    stream.play()?;
    std::thread::sleep(playback_time + Duration::from_millis(100));
    Ok(())
}
