// core/path_store.rs

// Holds the base path and the spatial index built from it. The index is
// constructed from the first path received and never rebuilt: later path
// messages only replace the waypoint list used for output slicing.

use std::sync::{Arc, OnceLock};

use log::{debug, info, warn};

use super::spatial_index::SpatialIndex;
use super::state::Slot;
use super::waypoint::{Point2D, Waypoint};
use crate::UpdaterError;

/// Base path storage with its lazily built spatial index
#[derive(Default)]
pub struct PathStore {
    waypoints: Slot<Arc<[Waypoint]>>,
    index: OnceLock<SpatialIndex>,
}

impl PathStore {
    /// Creates an empty store; nothing is queryable until the first update
    pub fn new() -> Self {
        PathStore::default()
    }

    /// Stores the latest base path, building the index on first receipt
    pub fn update(&self, waypoints: Vec<Waypoint>) {
        if waypoints.is_empty() {
            warn!("Ignoring empty base path");
            return;
        }

        match self.index.get() {
            None => {
                let points = waypoints.iter().map(Waypoint::planar).collect();
                if self.index.set(SpatialIndex::build(points)).is_ok() {
                    info!("Built waypoint index over {} base waypoints", waypoints.len());
                }
            }
            Some(index) if index.len() != waypoints.len() => {
                warn!(
                    "Base path changed length ({} -> {}), keeping the original index",
                    index.len(),
                    waypoints.len()
                );
            }
            Some(_) => debug!("Base path replaced, index unchanged"),
        }

        self.waypoints.store(waypoints.into());
    }

    /// Latest base path, if any
    pub fn waypoints(&self) -> Option<Arc<[Waypoint]>> {
        self.waypoints.load()
    }

    /// Spatial index, once built
    pub fn index(&self) -> Option<&SpatialIndex> {
        self.index.get()
    }

    /// Whether the first path has been indexed
    pub fn is_index_built(&self) -> bool {
        self.index.get().is_some()
    }

    /// Waypoint nearest to an arbitrary position, without direction check
    pub fn nearest(&self, point: &Point2D) -> Result<usize, UpdaterError> {
        let index = self.index.get().ok_or(UpdaterError::IndexNotBuilt)?;
        index.nearest(point).ok_or(UpdaterError::NotReady)
    }

    /// Index of the first waypoint the vehicle has not passed yet.
    ///
    /// Takes the nearest waypoint and steps one forward when the vehicle is
    /// already beyond the plane through it orthogonal to the path direction.
    /// A pose with non-finite coordinates yields `NotReady`.
    pub fn closest_ahead_index(&self, pose: &Point2D) -> Result<usize, UpdaterError> {
        let index = self.index.get().ok_or(UpdaterError::IndexNotBuilt)?;
        let closest = index.nearest(pose).ok_or(UpdaterError::NotReady)?;

        if hyperplane_value(index.points(), closest, pose) > 0.0 {
            Ok((closest + 1) % index.len())
        } else {
            Ok(closest)
        }
    }
}

/// Positive when `pose` lies past waypoint `idx` in the direction of travel
/// from its predecessor (wrapping to the last waypoint for index 0).
pub fn hyperplane_value(points: &[Point2D], idx: usize, pose: &Point2D) -> f64 {
    let n = points.len();
    let closest = points[idx];
    let prev = points[(idx + n - 1) % n];
    (closest - prev).dot(&(*pose - closest))
}
