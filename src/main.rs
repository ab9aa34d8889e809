mod animator;
mod app;
mod audio;
mod config;
mod display;
mod input;
mod scenes;
mod weather;

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use embedded_graphics::pixelcolor::Rgb888;
use flight_feed::FlightProvider;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::TrackerApp;
use crate::config::AppConfig;
use crate::display::{
    palette, DisplayPreset, DisplaySink, Font, MatrixPanel, TerminalPresenter,
};
use crate::input::KeyboardSwitches;
use crate::weather::WeatherService;

/// Connectivity probe target; any HTTP answer counts as online.
const PROBE_URL: &str = "https://api.open-meteo.com/v1/forecast?latitude=0&longitude=0";
const CONNECT_ATTEMPTS: u32 = 3;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(
    name = "flightdeck",
    version,
    about = "Flight tracker display for HUB75-style LED matrices"
)]
struct Args {
    /// Panel geometry, overriding the configured preset
    #[arg(long, value_enum)]
    display: Option<DisplayPreset>,

    /// Print the configuration file path and exit
    #[arg(long)]
    config_path: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load()?;
    if let Some(preset) = args.display {
        config.display = preset;
    }

    let cancel_token = CancellationToken::new();
    let signal_cancel = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let presenter = TerminalPresenter::new()?;
    let mut panel = MatrixPanel::new(config.display, presenter);

    status_screen(
        &mut panel,
        &[
            ("flightdeck", palette::SKY_BLUE),
            ("Connecting...", palette::GREY),
        ],
    );
    if !probe_network().await {
        status_screen(
            &mut panel,
            &[("flightdeck", palette::SKY_BLUE), ("Offline!", palette::RED)],
        );
        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(panel);
        error!("no network connectivity after {CONNECT_ATTEMPTS} attempts");
        return Err("no network connectivity".into());
    }
    status_screen(
        &mut panel,
        &[
            ("flightdeck", palette::SKY_BLUE),
            ("Connected!", palette::GREEN),
        ],
    );
    tokio::time::sleep(Duration::from_millis(750)).await;
    status_screen(&mut panel, &[("Scanning...", palette::GREY)]);

    let provider = FlightProvider::spawn(config.feed_config());
    provider.trigger_fetch();
    let weather = WeatherService::spawn(
        config.home_latitude,
        config.home_longitude,
        config.metric_units,
    );
    let switches = KeyboardSwitches::new(cancel_token.clone());

    let period = config.frame_period();
    let mut app = TrackerApp::new(panel, switches, provider, weather, config);
    let mut animator = TrackerApp::animator(period);

    info!("starting frame loop at {period:?} per frame");
    animator.play(&mut app, &cancel_token).await;

    app.shutdown();
    info!("shut down cleanly");
    Ok(())
}

/// Paint a full-panel status message, one line per entry.
fn status_screen(sink: &mut impl DisplaySink, lines: &[(&str, Rgb888)]) {
    sink.set_pen(palette::BLACK);
    sink.clear();
    let mut y = 2;
    for (text, colour) in lines {
        sink.set_pen(*colour);
        sink.text(text, 1, y, Font::Regular, 1);
        y += Font::Regular.height() as i32 + 2;
    }
    sink.present();
}

/// Check we can reach the internet at all, with bounded retries, so a
/// dead uplink shows up as an on-screen message instead of a silent hang.
async fn probe_network() -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("could not build http client: {e}");
            return false;
        }
    };

    for attempt in 1..=CONNECT_ATTEMPTS {
        match client.get(PROBE_URL).send().await {
            Ok(_) => return true,
            Err(e) => warn!("connectivity probe {attempt}/{CONNECT_ATTEMPTS} failed: {e}"),
        }
        if attempt < CONNECT_ATTEMPTS {
            tokio::time::sleep(CONNECT_RETRY_DELAY).await;
        }
    }
    false
}
