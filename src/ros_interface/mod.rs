//! ROS 2 interface for the waypoint updater
//!
//! This module handles all communication with ROS 2, including:
//! - Subscribing to the vehicle pose, base waypoints and stop-line index
//! - Publishing the final waypoints
//! - Reading the traffic light configuration parameter

mod publisher;
mod subscriber;

use std::sync::Arc;
use std::time::Duration;

use futures::executor::LocalPool;
use r2r::geometry_msgs::msg::{Point, Pose, PoseStamped, Quaternion, TwistStamped};
use r2r::styx_msgs::msg::{Lane, Waypoint as WaypointMsg};
use r2r::{Context, Node, ParameterValue, QosProfile};

pub use publisher::LaneRosPublisher;
pub use subscriber::*;

use crate::core::{Point3D, SharedState, VehiclePose, Waypoint};
use crate::{RosConfig, TrafficLightConfig, UpdaterConfig, UpdaterError};

/// ROS 2 interface manager
pub struct RosInterface {
    node: Node,
    pool: LocalPool,
    publisher: LaneRosPublisher,
    traffic_light_param: String,
}

impl RosInterface {
    /// Create the node and wire its subscriptions to the shared state
    pub fn new(config: &RosConfig, state: &Arc<SharedState>) -> Result<Self, UpdaterError> {
        let context = Context::create()?;
        let mut node = Node::create(context, &config.node_name, "")?;

        let qos = QosProfile::default().keep_last(config.qos_depth);
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        subscribe_pose(
            &mut node,
            &config.pose_topic,
            qos.clone(),
            state.pose_handle(),
            &spawner,
        )?;
        subscribe_base_waypoints(
            &mut node,
            &config.base_waypoints_topic,
            qos.clone(),
            state.path_handle(),
            &spawner,
        )?;
        subscribe_traffic_waypoint(
            &mut node,
            &config.traffic_waypoint_topic,
            qos.clone(),
            state.stop_line_handle(),
            &spawner,
        )?;

        let publisher = LaneRosPublisher::new(&mut node, &config.final_waypoints_topic, qos)?;
        log::info!(
            "Node {} publishing to {}",
            config.node_name,
            config.final_waypoints_topic
        );

        Ok(RosInterface {
            node,
            pool,
            publisher,
            traffic_light_param: config.traffic_light_param.clone(),
        })
    }

    /// Stop line configuration from the node parameter, falling back to the
    /// configured file
    pub fn traffic_light_config(
        &self,
        config: &UpdaterConfig,
    ) -> Result<TrafficLightConfig, UpdaterError> {
        let param = {
            let params = self
                .node
                .params
                .lock()
                .map_err(|_| UpdaterError::Transport("parameter lock poisoned".to_string()))?;
            match params.get(&self.traffic_light_param).map(|p| &p.value) {
                Some(ParameterValue::String(yaml)) => Some(yaml.clone()),
                _ => None,
            }
        };

        match (param, &config.traffic_light_config_path) {
            (Some(yaml), _) => TrafficLightConfig::from_yaml_str(&yaml),
            (None, Some(path)) => TrafficLightConfig::load(path),
            (None, None) => Err(UpdaterError::ConfigInvalid(format!(
                "parameter {} not set and no traffic_light_config_path given",
                self.traffic_light_param
            ))),
        }
    }

    /// Publisher handle for the planning loop
    pub fn lane_publisher(&self) -> LaneRosPublisher {
        self.publisher.clone()
    }

    /// Process pending messages
    pub fn spin_once(&mut self, timeout: Duration) {
        self.node.spin_once(timeout);
        self.pool.run_until_stalled();
    }
}

impl From<r2r::Error> for UpdaterError {
    fn from(e: r2r::Error) -> Self {
        UpdaterError::Transport(e.to_string())
    }
}

/// Vehicle pose from a stamped pose message
pub fn from_pose_msg(msg: &PoseStamped) -> VehiclePose {
    let (position, orientation) = from_ros_pose(&msg.pose);
    VehiclePose {
        position,
        orientation,
    }
}

/// Base path from a lane message; the twist holds the nominal speed
pub fn from_lane_msg(msg: &Lane) -> Vec<Waypoint> {
    msg.waypoints
        .iter()
        .map(|wp| {
            let (position, orientation) = from_ros_pose(&wp.pose.pose);
            Waypoint {
                position,
                orientation,
                speed: wp.twist.twist.linear.x,
            }
        })
        .collect()
}

/// Lane message carrying each waypoint's pose and target speed
pub fn to_lane_msg(waypoints: &[Waypoint]) -> Lane {
    Lane {
        waypoints: waypoints
            .iter()
            .map(|wp| {
                let mut twist = TwistStamped::default();
                twist.twist.linear.x = wp.speed;
                WaypointMsg {
                    pose: PoseStamped {
                        pose: to_ros_pose(wp),
                        ..Default::default()
                    },
                    twist,
                    ..Default::default()
                }
            })
            .collect(),
        ..Default::default()
    }
}

fn from_ros_pose(pose: &Pose) -> (Point3D, nalgebra::UnitQuaternion<f64>) {
    let q = &pose.orientation;
    (
        Point3D::new(pose.position.x, pose.position.y, pose.position.z),
        nalgebra::UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

fn to_ros_pose(wp: &Waypoint) -> Pose {
    let q = wp.orientation.quaternion();
    Pose {
        position: Point {
            x: wp.position.x,
            y: wp.position.y,
            z: wp.position.z,
        },
        orientation: Quaternion {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        },
    }
}
