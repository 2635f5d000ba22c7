use r2r::styx_msgs::msg::Lane;

use super::to_lane_msg;
use crate::core::Waypoint;
use crate::{LanePublisher, UpdaterError};

/// Final waypoints publisher wrapping the r2r publisher
#[derive(Clone)]
pub struct LaneRosPublisher {
    inner: r2r::Publisher<Lane>,
}

impl LaneRosPublisher {
    /// Create a new publisher on the given topic with specified QoS
    pub fn new(
        node: &mut r2r::Node,
        topic: &str,
        qos: r2r::QosProfile,
    ) -> Result<Self, r2r::Error> {
        let publisher = node.create_publisher::<Lane>(topic, qos)?;
        Ok(LaneRosPublisher { inner: publisher })
    }
}

impl LanePublisher for LaneRosPublisher {
    fn publish(&self, waypoints: &[Waypoint]) -> Result<(), UpdaterError> {
        self.inner.publish(&to_lane_msg(waypoints))?;
        Ok(())
    }
}
