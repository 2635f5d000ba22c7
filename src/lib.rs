//! Waypoint Updater - lookahead waypoint publisher
//!
//! This library computes, at a fixed rate, the window of path waypoints just
//! ahead of the vehicle and assigns a target speed to each. When a red light
//! requires stopping, the cruise speeds are replaced by a smooth deceleration
//! profile ending at the configured stop line.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod core;
pub mod navigation;
#[cfg(feature = "ros")]
pub mod ros_interface;

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Re-export commonly used items for easier access
pub use crate::core::{
    Mode, PathStore, Point2D, Point3D, SharedState, SpatialIndex, VehiclePose, Waypoint,
};
pub use navigation::{DecelerationPlanner, LanePublisher, WaypointUpdater};

/// Main configuration structure for the waypoint updater
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// ROS 2 configuration
    pub ros_config: RosConfig,
    /// Planning parameters
    pub navigation_config: NavigationConfig,
    /// Fallback location of the stop line file when the node parameter is unset
    pub traffic_light_config_path: Option<String>,
}

/// ROS 2 specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosConfig {
    /// Node name
    pub node_name: String,
    /// Vehicle pose input
    pub pose_topic: String,
    /// Base path input
    pub base_waypoints_topic: String,
    /// Stop-line waypoint index input
    pub traffic_waypoint_topic: String,
    /// Lookahead output
    pub final_waypoints_topic: String,
    /// Node parameter holding the traffic light YAML document
    pub traffic_light_param: String,
    /// QoS settings
    pub qos_depth: usize,
}

impl Default for RosConfig {
    fn default() -> Self {
        RosConfig {
            node_name: "waypoint_updater".to_string(),
            pose_topic: "/current_pose".to_string(),
            base_waypoints_topic: "/base_waypoints".to_string(),
            traffic_waypoint_topic: "/traffic_waypoint".to_string(),
            final_waypoints_topic: "final_waypoints".to_string(),
            traffic_light_param: "traffic_light_config".to_string(),
            qos_depth: 1,
        }
    }
}

/// Lookahead and braking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Number of waypoints published per tick
    pub lookahead_wps: usize,
    /// Publishing rate (Hz)
    pub publishing_rate: f64,
    /// Waypoints to pull the stop target back from the stop line
    pub stop_line_margin: usize,
    /// Maximum deceleration used for the braking curve
    pub max_decel: f64,
    /// Linear smoothing term per waypoint; `None` means `1 / lookahead_wps`
    pub constant_decel: Option<f64>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            lookahead_wps: 50,
            publishing_rate: 20.0,
            stop_line_margin: 3,
            max_decel: 0.5,
            constant_decel: None,
        }
    }
}

impl NavigationConfig {
    /// Smoothing constant actually applied by the planner
    pub fn decel_constant(&self) -> f64 {
        self.constant_decel
            .unwrap_or(1.0 / self.lookahead_wps.max(1) as f64)
    }

    /// Rejects parameter sets the planning loop cannot run with
    pub fn validate(&self) -> Result<(), UpdaterError> {
        if self.lookahead_wps == 0 {
            return Err(UpdaterError::ConfigInvalid(
                "lookahead_wps must be at least 1".to_string(),
            ));
        }
        // The period 1 / rate must fit in a Duration
        if self.publishing_rate.is_nan()
            || self.publishing_rate <= 0.0
            || Duration::try_from_secs_f64(1.0 / self.publishing_rate).is_err()
        {
            return Err(UpdaterError::ConfigInvalid(format!(
                "publishing_rate must be positive and give a representable period, got {}",
                self.publishing_rate
            )));
        }
        if self.max_decel.is_nan() || self.max_decel < 0.0 {
            return Err(UpdaterError::ConfigInvalid(format!(
                "max_decel must be non-negative, got {}",
                self.max_decel
            )));
        }
        Ok(())
    }
}

impl UpdaterConfig {
    /// Load the updater configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, UpdaterError> {
        let config_file = File::open(path.as_ref())?;
        let config: UpdaterConfig = serde_yaml::from_reader(config_file)?;
        config.navigation_config.validate()?;
        log::info!("Loaded updater config from {}", path.as_ref().display());
        Ok(config)
    }
}

/// Stop line positions of the traffic lights along the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLightConfig {
    /// Ordered (x, y) stop line positions; the last one bounds the braking zone
    pub stop_line_positions: Vec<[f64; 2]>,
}

impl TrafficLightConfig {
    /// Parse the YAML document published as a node parameter
    pub fn from_yaml_str(yaml: &str) -> Result<Self, UpdaterError> {
        let config: TrafficLightConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the stop line list from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, UpdaterError> {
        let config_file = File::open(path.as_ref())?;
        let config: TrafficLightConfig = serde_yaml::from_reader(config_file)?;
        config.validate()?;
        log::info!(
            "Loaded {} stop lines from {}",
            config.stop_line_positions.len(),
            path.as_ref().display()
        );
        Ok(config)
    }

    /// An empty stop line list is fatal
    pub fn validate(&self) -> Result<(), UpdaterError> {
        if self.stop_line_positions.is_empty() {
            return Err(UpdaterError::ConfigInvalid(
                "stop_line_positions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Last configured stop line; braking is disengaged once the vehicle passes it
    pub fn horizon(&self) -> Option<Point2D> {
        self.stop_line_positions
            .last()
            .map(|[x, y]| Point2D::new(*x, *y))
    }
}

/// Waypoint updater error types
#[derive(Debug, Clone, PartialEq)]
pub enum UpdaterError {
    /// Pose or path not received yet
    NotReady,
    /// Closest waypoint queried before the spatial index was built
    IndexNotBuilt,
    /// Configuration rejected
    ConfigInvalid(String),
    /// Configuration could not be read or parsed
    ConfigIo(String),
    /// Publishing or subscribing failed
    Transport(String),
}

impl std::fmt::Display for UpdaterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UpdaterError::NotReady => write!(f, "Pose or base waypoints not received yet"),
            UpdaterError::IndexNotBuilt => write!(f, "Waypoint index not built"),
            UpdaterError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            UpdaterError::ConfigIo(msg) => write!(f, "Configuration error: {}", msg),
            UpdaterError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for UpdaterError {}

impl From<std::io::Error> for UpdaterError {
    fn from(e: std::io::Error) -> Self {
        UpdaterError::ConfigIo(e.to_string())
    }
}

impl From<serde_yaml::Error> for UpdaterError {
    fn from(e: serde_yaml::Error) -> Self {
        UpdaterError::ConfigIo(e.to_string())
    }
}

/// Planning loop status
#[derive(Debug, Clone, PartialEq)]
pub struct UpdaterStatus {
    /// Current readiness
    pub mode: Mode,
    /// Number of lanes handed to the publisher
    pub ticks_published: u64,
    /// Closest waypoint index of the last computed tick
    pub last_closest_idx: Option<usize>,
    /// Whether the last computed tick applied the braking profile
    pub braking: bool,
}
