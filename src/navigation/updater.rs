// src/navigation/updater.rs
// Periodic driver: snapshots the latest pose, base path and stop line,
// computes the final waypoints and hands them to the publisher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use super::planner::DecelerationPlanner;
use super::window::WindowSelector;
use crate::core::{Mode, Point2D, SharedState, Snapshot, Waypoint};
use crate::{NavigationConfig, TrafficLightConfig, UpdaterError, UpdaterStatus};

/// Output boundary receiving one lane per tick
pub trait LanePublisher {
    /// Publishes the final waypoints of one tick
    fn publish(&self, waypoints: &[Waypoint]) -> Result<(), UpdaterError>;
}

/// Fixed-period sleeper; keeps a deadline so compute time does not add drift
pub struct Rate {
    period: Duration,
    next: Instant,
}

impl Rate {
    /// Rate ticking `hz` times per second; `hz` must pass
    /// [`NavigationConfig::validate`](crate::NavigationConfig::validate)
    pub fn new(hz: f64) -> Self {
        let period = Duration::from_secs_f64(1.0 / hz);
        Rate {
            period,
            next: Instant::now() + period,
        }
    }

    /// Time between two ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Blocks until the next deadline. A late caller restarts the schedule
    /// instead of firing a burst of catch-up ticks.
    pub fn sleep(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.next = now + self.period;
        }
    }
}

/// Planning loop computing the final waypoints
pub struct WaypointUpdater {
    state: Arc<SharedState>,
    selector: WindowSelector,
    planner: DecelerationPlanner,
    horizon: Point2D,
    publishing_rate: f64,
    status: UpdaterStatus,
}

impl WaypointUpdater {
    /// Create the loop over `state`; invalid parameters or an empty stop
    /// line list are rejected here so the loop never becomes ready
    pub fn new(
        state: Arc<SharedState>,
        config: &NavigationConfig,
        traffic_lights: &TrafficLightConfig,
    ) -> Result<Self, UpdaterError> {
        config.validate()?;
        traffic_lights.validate()?;
        let horizon = traffic_lights
            .horizon()
            .ok_or_else(|| UpdaterError::ConfigInvalid("no stop lines".to_string()))?;

        Ok(WaypointUpdater {
            state,
            selector: WindowSelector::new(config.lookahead_wps),
            planner: DecelerationPlanner::new(config),
            horizon,
            publishing_rate: config.publishing_rate,
            status: UpdaterStatus {
                mode: Mode::NotReady,
                ticks_published: 0,
                last_closest_idx: None,
                braking: false,
            },
        })
    }

    /// Main loop: one tick per period until `running` is cleared
    pub fn run<P: LanePublisher + ?Sized>(&mut self, running: &AtomicBool, publisher: &P) {
        let mut rate = Rate::new(self.publishing_rate);
        info!(
            "Publishing {} waypoints every {:?}",
            self.selector.lookahead(),
            rate.period()
        );

        while running.load(Ordering::Relaxed) {
            if let Some(lane) = self.tick() {
                match publisher.publish(&lane) {
                    Ok(()) => self.status.ticks_published += 1,
                    Err(e) => error!("Failed to publish final waypoints: {}", e),
                }
            }
            rate.sleep();
        }

        info!(
            "Planning loop stopped after {} published lanes",
            self.status.ticks_published
        );
    }

    /// Computes the lane for the latest snapshot; `None` while not ready
    pub fn tick(&mut self) -> Option<Vec<Waypoint>> {
        let snapshot = self.state.snapshot();

        let mode = snapshot.mode();
        if mode != self.status.mode {
            info!("Planning loop {:?} -> {:?}", self.status.mode, mode);
            self.status.mode = mode;
        }
        if mode == Mode::NotReady {
            return None;
        }

        match self.generate_lane(&snapshot) {
            Ok(lane) => Some(lane),
            Err(e) => {
                debug!("Skipping tick: {}", e);
                None
            }
        }
    }

    fn generate_lane(&mut self, snapshot: &Snapshot) -> Result<Vec<Waypoint>, UpdaterError> {
        let pose = snapshot.pose.ok_or(UpdaterError::NotReady)?;
        let waypoints = snapshot.waypoints.as_ref().ok_or(UpdaterError::NotReady)?;
        let path = self.state.path();

        let closest_idx = path.closest_ahead_index(&pose.planar())?;
        let window = self.selector.select(closest_idx, waypoints);
        let last_stop_idx = path.nearest(&self.horizon)?;

        // Out-of-range values are reported once by the stop line handler
        let stop_line = match snapshot.stop_line {
            Some(idx) if idx >= waypoints.len() => {
                debug!("Ignoring stop line {} past the end of the base path", idx);
                None
            }
            other => other,
        };

        let plan = self.planner.plan(&window, stop_line, last_stop_idx);
        debug!(
            "closest={} farthest={} stop_line={:?} braking={}",
            window.closest_idx, window.farthest_idx, stop_line, plan.braking
        );

        self.status.last_closest_idx = Some(window.closest_idx);
        self.status.braking = plan.braking;
        Ok(plan.waypoints)
    }

    /// Get current loop status
    pub fn get_status(&self) -> UpdaterStatus {
        self.status.clone()
    }
}
