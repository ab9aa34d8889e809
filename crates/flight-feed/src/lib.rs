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

//! Flight feed client library.
//!
//! Fetches nearby flights from public feeds and hands them to a display
//! (or any other consumer) without ever blocking the consumer's thread.
//! The layers can be used independently:
//!
//! - **Model layer**: the [`Flight`] record and [`flights_match`]
//!   change detection
//! - **Feed layer**: one-shot [`fetch_nearby`] against the upstream
//!   sources, with fallback and per-record error tolerance
//! - **Provider layer**: [`FlightProvider`], a background task the
//!   consumer signals (`trigger_fetch`) and polls (`has_new_data`,
//!   `is_processing`, `take_data`, `is_data_empty`)
//!
//! # Quick Start
//!
//! ```no_run
//! use flight_feed::{FeedConfig, FlightProvider};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let provider = FlightProvider::spawn(FeedConfig::default());
//!     provider.trigger_fetch();
//!
//!     loop {
//!         if provider.has_new_data() {
//!             for flight in provider.take_data() {
//!                 println!("{}: {} -> {}", flight.label(), flight.origin, flight.destination);
//!             }
//!         }
//!         tokio::time::sleep(Duration::from_secs(1)).await;
//!     }
//! }
//! ```

pub mod feed;
pub mod geo;
pub mod model;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use feed::{fetch_nearby, FeedConfig, FeedError, Zone};
pub use geo::slant_range_km;
pub use model::{flights_match, Flight, FlightKey};

/// Shared state between the provider handle and its fetch task.
#[derive(Debug, Default)]
struct ProviderState {
    data: Mutex<Vec<Flight>>,
    new_data: AtomicBool,
    processing: AtomicBool,
}

/// Handle to a background flight-fetching task.
///
/// Fetches run on their own tokio task; the handle's accessors never
/// block beyond a short mutex hold, so a frame loop can poll them every
/// tick. Fetch failures are logged and leave the previous flight list
/// (and the `has_new_data` flag) untouched.
pub struct FlightProvider {
    state: Arc<ProviderState>,
    fetch_tx: mpsc::Sender<()>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for FlightProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightProvider")
            .field("processing", &self.is_processing())
            .field("new_data", &self.has_new_data())
            .finish_non_exhaustive()
    }
}

impl FlightProvider {
    /// Spawn the fetch task with the given feed configuration.
    #[must_use]
    pub fn spawn(config: FeedConfig) -> Self {
        let state = Arc::new(ProviderState::default());
        // Capacity 1: a trigger while a fetch is queued or running
        // collapses into the pending one.
        let (fetch_tx, fetch_rx) = mpsc::channel(1);
        let cancel_token = CancellationToken::new();

        let task_state = Arc::clone(&state);
        let task_cancel = cancel_token.clone();
        tokio::spawn(async move {
            fetch_loop(config, task_state, fetch_rx, task_cancel).await;
        });

        Self {
            state,
            fetch_tx,
            cancel_token,
        }
    }

    /// Ask the background task to start a fetch if one is not already
    /// queued. Never blocks.
    pub fn trigger_fetch(&self) {
        let _ = self.fetch_tx.try_send(());
    }

    /// Whether a fetch completed since the last [`take_data`](Self::take_data).
    #[must_use]
    pub fn has_new_data(&self) -> bool {
        self.state.new_data.load(Ordering::Acquire)
    }

    /// Whether a fetch is currently in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.state.processing.load(Ordering::Acquire)
    }

    /// Take the current flight list, clearing the new-data flag.
    #[must_use]
    pub fn take_data(&self) -> Vec<Flight> {
        self.state.new_data.store(false, Ordering::Release);
        self.state
            .data
            .lock()
            .map(|data| data.clone())
            .unwrap_or_default()
    }

    /// Whether the current flight list is empty.
    #[must_use]
    pub fn is_data_empty(&self) -> bool {
        self.state.data.lock().map(|data| data.is_empty()).unwrap_or(true)
    }

    /// Publish a flight list directly, as a completed fetch would.
    ///
    /// Useful for embedders with their own data source.
    pub fn publish(&self, flights: Vec<Flight>) {
        if let Ok(mut data) = self.state.data.lock() {
            *data = flights;
        }
        self.state.new_data.store(true, Ordering::Release);
    }

    /// Stop the background task.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for FlightProvider {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn fetch_loop(
    config: FeedConfig,
    state: Arc<ProviderState>,
    mut fetch_rx: mpsc::Receiver<()>,
    cancel_token: CancellationToken,
) {
    let client = match reqwest::Client::builder().build() {
        Ok(client) => client,
        Err(e) => {
            warn!("could not build http client, flight fetching disabled: {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            request = fetch_rx.recv() => {
                if request.is_none() {
                    return; // Handle dropped
                }

                state.processing.store(true, Ordering::Release);
                match fetch_nearby(&client, &config).await {
                    Ok(flights) => {
                        info!("fetch complete: {} flights in range", flights.len());
                        if let Ok(mut data) = state.data.lock() {
                            *data = flights;
                        }
                        state.new_data.store(true, Ordering::Release);
                    }
                    Err(e) => {
                        // Keep the previous list; the display carries on
                        // with what it has.
                        warn!("flight fetch failed: {e}");
                    }
                }
                state.processing.store(false, Ordering::Release);
            }

            () = cancel_token.cancelled() => {
                info!("flight provider cancelled");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(callsign: &str) -> Flight {
        Flight {
            callsign: callsign.to_string(),
            ..Flight::default()
        }
    }

    #[tokio::test]
    async fn test_publish_and_take() {
        let provider = FlightProvider::spawn(FeedConfig::default());
        assert!(!provider.has_new_data());
        assert!(provider.is_data_empty());

        provider.publish(vec![flight("BAW123")]);
        assert!(provider.has_new_data());
        assert!(!provider.is_data_empty());

        let data = provider.take_data();
        assert_eq!(data.len(), 1);
        // Reading clears the flag but not the data
        assert!(!provider.has_new_data());
        assert!(!provider.is_data_empty());
    }

    #[tokio::test]
    async fn test_idle_provider_is_not_processing() {
        let provider = FlightProvider::spawn(FeedConfig::default());
        assert!(!provider.is_processing());
        provider.shutdown();
    }
}
