// src/navigation/window.rs
// Cuts the lookahead window out of the circular base path.

use crate::core::Waypoint;

/// Lookahead slice of the base path
#[derive(Debug, Clone, PartialEq)]
pub struct LookaheadWindow {
    /// Path index of the first waypoint in the window
    pub closest_idx: usize,
    /// `closest_idx + lookahead`, before wrapping
    pub farthest_idx: usize,
    /// Waypoints in path order, wrapped past the end of the path
    pub waypoints: Vec<Waypoint>,
}

/// Extracts fixed-length windows from a circular path
#[derive(Debug, Clone, Copy)]
pub struct WindowSelector {
    lookahead_wps: usize,
}

impl WindowSelector {
    /// Selector producing windows of `lookahead_wps` waypoints
    pub fn new(lookahead_wps: usize) -> Self {
        WindowSelector { lookahead_wps }
    }

    /// Window length requested from the selector
    pub fn lookahead(&self) -> usize {
        self.lookahead_wps
    }

    /// Returns `min(lookahead, path.len())` waypoints starting at `closest_idx`.
    ///
    /// A closest index on the last waypoint restarts the window at index 0.
    pub fn select(&self, closest_idx: usize, path: &[Waypoint]) -> LookaheadWindow {
        let n = path.len();
        if n == 0 {
            return LookaheadWindow {
                closest_idx: 0,
                farthest_idx: self.lookahead_wps,
                waypoints: Vec::new(),
            };
        }

        let mut start = closest_idx % n;
        if start == n - 1 {
            start = 0;
        }

        let end = start + self.lookahead_wps.min(n);
        let waypoints = if end <= n {
            path[start..end].to_vec()
        } else {
            path[start..]
                .iter()
                .chain(&path[..end - n])
                .cloned()
                .collect()
        };

        LookaheadWindow {
            closest_idx: start,
            farthest_idx: start + self.lookahead_wps,
            waypoints,
        }
    }
}
