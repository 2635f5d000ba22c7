//! Planning for the waypoint updater
//!
//! This module turns the latest snapshot into the published lane:
//! - Selecting the lookahead window from the circular base path
//! - Shaping the target speeds for a stop line
//! - Driving both at the publishing rate

mod planner;
mod updater;
mod window;

pub use planner::{DecelerationPlanner, LanePlan};
pub use updater::{LanePublisher, Rate, WaypointUpdater};
pub use window::{LookaheadWindow, WindowSelector};
