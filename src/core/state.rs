// core/state.rs

// Latest-value storage written by the transport callbacks and read by the
// planning loop. Each field has its own single-value slot, so a writer only
// ever waits for the short copy in or out of that one slot.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use super::path_store::PathStore;
use super::waypoint::{VehiclePose, Waypoint};

/// Planning loop readiness
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Pose or base path still missing, ticks publish nothing
    NotReady,
    /// Both pose and base path known
    Ready,
}

/// Last-writer-wins cell holding one value
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot {
            value: Mutex::new(None),
        }
    }
}

impl<T: Clone> Slot<T> {
    /// Replaces the current value
    pub fn store(&self, value: T) {
        self.set(Some(value));
    }

    /// Replaces the current value, `None` clears the slot
    pub fn set(&self, value: Option<T>) {
        // A poisoned slot still holds a whole value, the writer only swaps it
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Copy of the current value
    pub fn load(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Values one tick computes from
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Latest vehicle pose
    pub pose: Option<VehiclePose>,
    /// Latest base path
    pub waypoints: Option<Arc<[Waypoint]>>,
    /// Active stop line, `None` when no stop is required
    pub stop_line: Option<usize>,
}

impl Snapshot {
    /// Ready once both pose and path arrived
    pub fn mode(&self) -> Mode {
        if self.pose.is_some() && self.waypoints.is_some() {
            Mode::Ready
        } else {
            Mode::NotReady
        }
    }
}

/// State shared between the update handlers and the planning loop
#[derive(Default)]
pub struct SharedState {
    pose: Slot<VehiclePose>,
    path: PathStore,
    stop_line: Slot<usize>,
}

impl SharedState {
    /// Creates the state with every slot empty
    pub fn new() -> Arc<Self> {
        Arc::new(SharedState::default())
    }

    /// Base path and its index
    pub fn path(&self) -> &PathStore {
        &self.path
    }

    /// Reads every slot once
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pose: self.pose.load(),
            waypoints: self.path.waypoints(),
            stop_line: self.stop_line.load(),
        }
    }

    /// Writer restricted to the pose slot
    pub fn pose_handle(self: &Arc<Self>) -> PoseHandle {
        PoseHandle(Arc::clone(self))
    }

    /// Writer restricted to the base path
    pub fn path_handle(self: &Arc<Self>) -> PathHandle {
        PathHandle(Arc::clone(self))
    }

    /// Writer restricted to the stop-line slot
    pub fn stop_line_handle(self: &Arc<Self>) -> StopLineHandle {
        StopLineHandle(Arc::clone(self))
    }
}

/// Pose update access
#[derive(Clone)]
pub struct PoseHandle(Arc<SharedState>);

impl PoseHandle {
    /// Records the latest vehicle pose
    pub fn update(&self, pose: VehiclePose) {
        self.0.pose.store(pose);
    }
}

/// Base path update access
#[derive(Clone)]
pub struct PathHandle(Arc<SharedState>);

impl PathHandle {
    /// Records the latest base path
    pub fn update(&self, waypoints: Vec<Waypoint>) {
        debug!("Received base path with {} waypoints", waypoints.len());
        self.0.path.update(waypoints);
    }
}

/// Stop-line update access
#[derive(Clone)]
pub struct StopLineHandle(Arc<SharedState>);

impl StopLineHandle {
    /// Records the active stop line, `None` when the light allows passing
    pub fn update(&self, stop_line: Option<usize>) {
        if let Some(len) = self.0.path.waypoints().map(|w| w.len()) {
            if stop_line.is_some_and(|idx| idx >= len) {
                warn!(
                    "Stop line index {:?} outside base path of {} waypoints",
                    stop_line, len
                );
            }
        }
        self.0.stop_line.set(stop_line);
    }
}
