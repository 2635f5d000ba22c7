// src/main.rs
// Entry point for the waypoint updater node: wires ROS 2 subscriptions into
// the shared state and runs the planning loop until Ctrl+C.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{error, info};
use waypoint_updater::ros_interface::RosInterface;
use waypoint_updater::{SharedState, UpdaterConfig, WaypointUpdater};

/// Spin timeout of the node thread
const SPIN_TIMEOUT: Duration = Duration::from_millis(50);

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging; RUST_LOG controls verbosity
    env_logger::init();
    info!("Starting waypoint updater...");

    // Optional config file as first argument, defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => UpdaterConfig::load(&path)?,
        None => UpdaterConfig::default(),
    };

    let state = SharedState::new();
    let mut ros = RosInterface::new(&config.ros_config, &state)?;

    // A missing or empty stop line list is fatal before the loop starts
    let traffic_lights = ros.traffic_light_config(&config).inspect_err(|e| {
        error!("Cannot load traffic light config: {}", e);
    })?;
    let mut updater = WaypointUpdater::new(
        Arc::clone(&state),
        &config.navigation_config,
        &traffic_lights,
    )?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })?;

    let publisher = ros.lane_publisher();
    let loop_running = running.clone();
    let planning = thread::spawn(move || updater.run(&loop_running, &publisher));

    while running.load(Ordering::Relaxed) {
        ros.spin_once(SPIN_TIMEOUT);
    }

    if planning.join().is_err() {
        error!("Planning loop panicked");
    }
    info!("Waypoint updater shutdown complete");
    Ok(())
}
