// core/spatial_index.rs

// Static 2-d tree over the planar waypoint coordinates. Built once from the
// base path and queried every tick for the waypoint nearest to the vehicle.

use super::waypoint::Point2D;

/// Balanced KD tree answering nearest-waypoint queries
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    points: Vec<Point2D>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

#[derive(Clone, Debug)]
struct KdNode {
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl SpatialIndex {
    /// Builds the tree by recursive median split, O(N log N)
    pub fn build(points: Vec<Point2D>) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_subtree(&points, &mut order, 0, &mut nodes);
        SpatialIndex {
            points,
            nodes,
            root,
        }
    }

    fn build_subtree(
        points: &[Point2D],
        order: &mut [usize],
        depth: usize,
        nodes: &mut Vec<KdNode>,
    ) -> Option<usize> {
        if order.is_empty() {
            return None;
        }
        let axis = depth % 2;
        let median = order.len() / 2;
        order.select_nth_unstable_by(median, |&a, &b| {
            points[a][axis].total_cmp(&points[b][axis])
        });

        let node_id = nodes.len();
        nodes.push(KdNode {
            point: order[median],
            axis,
            left: None,
            right: None,
        });

        let (lower, rest) = order.split_at_mut(median);
        let left = Self::build_subtree(points, lower, depth + 1, nodes);
        let right = Self::build_subtree(points, &mut rest[1..], depth + 1, nodes);
        nodes[node_id].left = left;
        nodes[node_id].right = right;
        Some(node_id)
    }

    /// Index (in build order) of the point closest to `query`.
    /// Equidistant points resolve to the lowest index. Non-finite queries
    /// have no nearest point.
    pub fn nearest(&self, query: &Point2D) -> Option<usize> {
        let root = self.root?;
        if !query.coords.iter().all(|c| c.is_finite()) {
            return None;
        }
        let mut best = (usize::MAX, f64::INFINITY);
        self.search(root, query, &mut best);
        (best.0 != usize::MAX).then_some(best.0)
    }

    fn search(&self, node_id: usize, query: &Point2D, best: &mut (usize, f64)) {
        let node = &self.nodes[node_id];
        let point = &self.points[node.point];

        let dist_sq = nalgebra::distance_squared(point, query);
        if dist_sq < best.1 || (dist_sq == best.1 && node.point < best.0) {
            *best = (node.point, dist_sq);
        }

        let delta = query[node.axis] - point[node.axis];
        let (near, far) = if delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(near, query, best);
        }
        // Only cross the splitting plane if it is within the best radius
        if let Some(far) = far.filter(|_| delta * delta <= best.1) {
            self.search(far, query, best);
        }
    }

    /// Coordinates the tree was built from
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Number of indexed waypoints
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for an index built from an empty path
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
