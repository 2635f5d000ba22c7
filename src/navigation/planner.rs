// src/navigation/planner.rs
// Shapes the speeds of the lookahead window: cruise speeds pass through
// unless a stop line inside the window requires braking to a standstill.

use log::debug;

use super::window::LookaheadWindow;
use crate::NavigationConfig;
use crate::core::{Waypoint, arc_length};

/// Speeds below this are published as a full stop
const MIN_SPEED: f64 = 1.0;

/// Planned lane together with the braking decision that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct LanePlan {
    /// Final waypoints, one per window entry
    pub waypoints: Vec<Waypoint>,
    /// True when the speeds follow the braking profile
    pub braking: bool,
}

/// Computes the target speed of every waypoint in a lookahead window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecelerationPlanner {
    max_decel: f64,
    stop_line_margin: usize,
    decel_const: f64,
}

impl DecelerationPlanner {
    /// Creates a planner from the navigation parameters
    pub fn new(config: &NavigationConfig) -> Self {
        DecelerationPlanner {
            max_decel: config.max_decel,
            stop_line_margin: config.stop_line_margin,
            decel_const: config.decel_constant(),
        }
    }

    /// Whether the window has to brake for `stop_line`.
    /// `last_stop_idx` is the waypoint of the final configured stop line;
    /// past it, stop lines are ignored.
    pub fn braking_engaged(
        &self,
        window: &LookaheadWindow,
        stop_line: Option<usize>,
        last_stop_idx: usize,
    ) -> bool {
        match stop_line {
            None => false,
            Some(idx) => idx < window.farthest_idx && window.closest_idx <= last_stop_idx,
        }
    }

    /// Final waypoints of the window: nominal speeds, or the braking profile
    pub fn plan(
        &self,
        window: &LookaheadWindow,
        stop_line: Option<usize>,
        last_stop_idx: usize,
    ) -> LanePlan {
        match stop_line {
            Some(idx) if self.braking_engaged(window, stop_line, last_stop_idx) => {
                debug!(
                    "Braking for stop line {} (closest waypoint {})",
                    idx, window.closest_idx
                );
                LanePlan {
                    waypoints: self.decelerate(&window.waypoints, window.closest_idx, idx),
                    braking: true,
                }
            }
            _ => LanePlan {
                waypoints: window.waypoints.clone(),
                braking: false,
            },
        }
    }

    /// Window-local index the vehicle should come to rest at
    pub fn stop_index(&self, closest_idx: usize, stop_line: usize) -> usize {
        stop_line.saturating_sub(closest_idx + self.stop_line_margin)
    }

    /// Replaces every speed by the braking profile towards `stop_line`
    pub fn decelerate(
        &self,
        waypoints: &[Waypoint],
        closest_idx: usize,
        stop_line: usize,
    ) -> Vec<Waypoint> {
        let stop_idx = self.stop_index(closest_idx, stop_line);
        waypoints
            .iter()
            .enumerate()
            .map(|(i, wp)| wp.with_velocity(self.target_speed(waypoints, i, stop_idx)))
            .collect()
    }

    /// Braking speed at window index `i`, capped by the nominal speed.
    ///
    /// `sqrt(2 a d)` is the fastest speed that still stops within the
    /// remaining distance `d`; the `i * decel_const` term flattens the end of
    /// the curve. Results under `MIN_SPEED` become zero.
    pub fn target_speed(&self, waypoints: &[Waypoint], i: usize, stop_idx: usize) -> f64 {
        let dist = arc_length(waypoints, i, stop_idx);
        let mut speed = (2.0 * self.max_decel * dist).sqrt() + i as f64 * self.decel_const;
        if speed < MIN_SPEED {
            speed = 0.0;
        }
        speed.min(waypoints[i].get_velocity())
    }
}
