//! Console harness hosting one panel instance.
//!
//! Stands in for a real taskbar host: it wires the panel's repaint hook to
//! a flag, paints to the log whenever the flag is set, and prints the
//! channel name a controller needs to connect. Enter stops the panel and
//! exits.

use bandhost::error::BandhostError;
use bandhost::hooks::RepaintFlag;
use bandhost::logger::initialize as logger_initialize;
use bandhost::surface::LogSurface;

use band_core::config::{PanelConfig, default_config_dir};
use band_core::panel::Panel;
use band_core::transport::derive_endpoint;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::io::BufRead;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::info;

/// Cadence of the harness's paint loop.
const PAINT_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), BandhostError> {
    let config_dir = default_config_dir().ok_or_else(|| BandhostError::Bandhost {
        message: String::from("no platform config directory available"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    create_dir_all(&config_dir).map_err(|e| BandhostError::Bandhost {
        message: format!("Failed to create config directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    logger_initialize(&config_dir)?;

    info!("bandhost starting");
    info!("Config directory: {}", config_dir.display());

    let config = PanelConfig::load(&config_dir).map_err(|e| BandhostError::Core {
        message: format!("Failed to load config: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // First run has no config file yet; persist the defaults so the user
    // has something to edit.
    config.save(&config_dir).map_err(|e| BandhostError::Core {
        message: format!("Failed to save config: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let repaint = Arc::new(RepaintFlag::new());
    let mut panel = Panel::new(config, repaint.clone());

    let channel_name = Panel::generate_channel_name();
    let endpoint = derive_endpoint(&channel_name, &panel.config().channel);

    panel
        .start(&channel_name)
        .map_err(|e| BandhostError::Core {
            message: format!("Failed to start panel: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("panel listening on channel {channel_name:?} ({endpoint})");
    println!("channel: {channel_name}");
    println!("endpoint: {endpoint}");
    println!("press Enter to stop");

    // Stdin watcher; Enter requests shutdown.
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_for_stdin = Arc::clone(&shutdown);
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        shutdown_for_stdin.store(true, Ordering::Release);
    });

    // Paint loop: drain the repaint flag the way a message pump drains
    // WM_PAINT.
    let mut surface = LogSurface::new();
    while !shutdown.load(Ordering::Acquire) {
        if repaint.take() {
            panel.on_paint(&mut surface);
        }
        std::thread::sleep(PAINT_POLL_INTERVAL);
    }

    info!("shutting down");
    panel.stop();
    info!("bandhost stopped");
    Ok(())
}
