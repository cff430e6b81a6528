//! R-tree based broad phase using the rstar crate.
//!
//! Indexes node centers by their slot in the node table, together with each
//! body's bounding radius, so repulsion only visits pairs that can possibly
//! be in range.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A node center in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// Slot of the node in the node table.
    pub slot: usize,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Bounding radius of the node body.
    pub bound: f64,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(slot: usize, x: f64, y: f64, bound: f64) -> Self {
        Self { slot, x, y, bound }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over node centers.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
    max_bound: f64,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            max_bound: 0.0,
        }
    }

    /// Rebuild the index from a fresh set of points.
    ///
    /// Points with non-finite coordinates are left out; they cannot be
    /// ordered inside the tree.
    pub fn rebuild(&mut self, points: Vec<NodePoint>) {
        let points: Vec<_> = points
            .into_iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();
        self.max_bound = points.iter().map(|p| p.bound).fold(0.0, f64::max);
        self.tree = RTree::bulk_load(points);
    }

    /// Largest bounding radius among indexed points.
    pub fn max_bound(&self) -> f64 {
        self.max_bound
    }

    /// Slots of all points whose center lies within `radius` of `(x, y)`,
    /// in ascending slot order.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Slots greater than `point.slot` whose bodies could lie within
    /// `max_gap` of `point`'s surface.
    pub fn candidates_after(&self, point: &NodePoint, max_gap: f64) -> Vec<usize> {
        let reach = max_gap + point.bound + self.max_bound;
        let mut slots = self.in_radius(point.x, point.y, reach);
        slots.retain(|&slot| slot > point.slot);
        slots
    }

    /// Get the number of points in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
