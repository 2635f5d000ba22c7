//! Data model and shared state
//!
//! Waypoints, the spatial index over the base path, the path store and the
//! latest-value slots fed by the transport.

mod path_store;
mod spatial_index;
mod state;
mod waypoint;

// Re-export key types for a unified API
pub use path_store::{PathStore, hyperplane_value};
pub use spatial_index::SpatialIndex;
pub use state::{Mode, PathHandle, PoseHandle, SharedState, Slot, Snapshot, StopLineHandle};
pub use waypoint::{Point2D, Point3D, VehiclePose, Waypoint, arc_length, stop_line_from_raw};
