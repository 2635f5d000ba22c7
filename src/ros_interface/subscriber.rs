// src/ros_interface/subscriber.rs
// Subscriptions feeding the shared state. Each stream only receives the
// update handle of the field it owns.

use futures::StreamExt;
use futures::task::{LocalSpawn, LocalSpawnExt};
use r2r::geometry_msgs::msg::PoseStamped;
use r2r::std_msgs::msg::Int32;
use r2r::styx_msgs::msg::Lane;
use r2r::{Node, QosProfile};

use super::{from_lane_msg, from_pose_msg};
use crate::UpdaterError;
use crate::core::{PathHandle, PoseHandle, StopLineHandle, stop_line_from_raw};

/// Forwards `/current_pose` into the pose slot
pub fn subscribe_pose<S: LocalSpawn>(
    node: &mut Node,
    topic: &str,
    qos: QosProfile,
    handle: PoseHandle,
    spawner: &S,
) -> Result<(), UpdaterError> {
    let stream = node.subscribe::<PoseStamped>(topic, qos)?;
    spawner
        .spawn_local(stream.for_each(move |msg| {
            handle.update(from_pose_msg(&msg));
            futures::future::ready(())
        }))
        .map_err(|e| UpdaterError::Transport(e.to_string()))
}

/// Forwards the base path; the first one also builds the waypoint index
pub fn subscribe_base_waypoints<S: LocalSpawn>(
    node: &mut Node,
    topic: &str,
    qos: QosProfile,
    handle: PathHandle,
    spawner: &S,
) -> Result<(), UpdaterError> {
    let stream = node.subscribe::<Lane>(topic, qos)?;
    spawner
        .spawn_local(stream.for_each(move |msg| {
            handle.update(from_lane_msg(&msg));
            futures::future::ready(())
        }))
        .map_err(|e| UpdaterError::Transport(e.to_string()))
}

/// Forwards the stop-line waypoint index, `-1` meaning no red light ahead
pub fn subscribe_traffic_waypoint<S: LocalSpawn>(
    node: &mut Node,
    topic: &str,
    qos: QosProfile,
    handle: StopLineHandle,
    spawner: &S,
) -> Result<(), UpdaterError> {
    let stream = node.subscribe::<Int32>(topic, qos)?;
    spawner
        .spawn_local(stream.for_each(move |msg| {
            handle.update(stop_line_from_raw(msg.data));
            futures::future::ready(())
        }))
        .map_err(|e| UpdaterError::Transport(e.to_string()))
}
