// core/waypoint.rs

// Data model shared by the index, the window selection and the planner:
// waypoints of the base path, the vehicle pose and the stop-line index.

use nalgebra::{Point2, Point3, UnitQuaternion};

/// Planar position used for nearest-neighbour queries
pub type Point2D = Point2<f64>;

/// Position used for arc length computation
pub type Point3D = Point3<f64>;

/// Single point of the base path with its speed
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    /// Position in the map frame
    pub position: Point3D,
    /// Heading of the path at this point
    pub orientation: UnitQuaternion<f64>,
    /// Nominal speed on the base path, target speed on published lanes
    pub speed: f64,
}

impl Waypoint {
    /// Waypoint with identity orientation
    pub fn new(x: f64, y: f64, z: f64, speed: f64) -> Self {
        Waypoint {
            position: Point3D::new(x, y, z),
            orientation: UnitQuaternion::identity(),
            speed,
        }
    }

    /// Position projected on the ground plane
    pub fn planar(&self) -> Point2D {
        self.position.xy()
    }

    /// Returns the waypoint speed
    pub fn get_velocity(&self) -> f64 {
        self.speed
    }

    /// Overwrites the waypoint speed
    pub fn set_velocity(&mut self, velocity: f64) {
        self.speed = velocity;
    }

    /// Copy of the waypoint carrying another speed
    pub fn with_velocity(&self, velocity: f64) -> Self {
        Waypoint {
            speed: velocity,
            ..self.clone()
        }
    }
}

/// Latest known vehicle pose
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehiclePose {
    /// Position in the map frame
    pub position: Point3D,
    /// Vehicle heading
    pub orientation: UnitQuaternion<f64>,
}

impl VehiclePose {
    /// Pose with identity orientation
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        VehiclePose {
            position: Point3D::new(x, y, z),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Position projected on the ground plane
    pub fn planar(&self) -> Point2D {
        self.position.xy()
    }
}

/// Maps the transport's stop-line value to an index; negative means no stop required
pub fn stop_line_from_raw(raw: i32) -> Option<usize> {
    usize::try_from(raw).ok()
}

/// Sum of the 3D segment lengths from `from` to `to` along `waypoints`.
/// Zero when `to` is not ahead of `from`; stops at the end of the slice.
pub fn arc_length(waypoints: &[Waypoint], from: usize, to: usize) -> f64 {
    if waypoints.is_empty() {
        return 0.0;
    }
    let to = to.min(waypoints.len() - 1);
    if to <= from {
        return 0.0;
    }
    waypoints[from..=to]
        .windows(2)
        .map(|pair| nalgebra::distance(&pair[0].position, &pair[1].position))
        .sum()
}
