//! Minigraph layout force: bounded-range repulsion plus spring links.
//!
//! # Repulsion
//!
//! Every unordered pair of nodes whose surface gap `l` (clamped to at least 1)
//! is below `max_distance` receives equal and opposite velocity impulses of
//! magnitude `90 * alpha / l` along the line between their centers. Pairs
//! beyond `max_distance` do not interact, which keeps small clusters local
//! instead of spreading them across the whole canvas.
//!
//! For node sets larger than `spatial_threshold`, candidate pairs come from an
//! R-tree query that covers `max_distance` plus both bodies' bounding radii,
//! so no pair in range is ever skipped.
//!
//! # Links
//!
//! Each link pulls its endpoints toward a desired surface gap (see
//! [`Link::target_gap`]) with an impulse proportional to `alpha / d`, and
//! nudges both endpoints a third of the way toward their common `y`.

use serde::{Deserialize, Serialize};

use super::Force;
use crate::geometry::{SurfaceDistance, bounding_radius, surface_distance};
use crate::graph::{Link, NodeMap};
use crate::spatial::{NodePoint, SpatialIndex};

/// Default link rest length.
pub const LINK_DISTANCE: f64 = 24.0;

/// Default maximum repulsion range.
pub const SUBGRAPH_MAX_D: f64 = 6.0 * 24.0;

/// Repulsion strength numerator.
const REPULSION: f64 = 90.0;

/// Tuning options supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceOptions {
    /// Rest length for links without an explicit distance.
    pub link_distance: f64,
    /// Surface gap beyond which nodes stop repelling.
    #[serde(alias = "maxD")]
    pub max_distance: f64,
    /// Pull every node's `y` toward 0 for strictly horizontal layouts.
    pub axis_lock_y: bool,
    /// Node count above which repulsion uses the spatial index.
    pub spatial_threshold: usize,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            link_distance: LINK_DISTANCE,
            max_distance: SUBGRAPH_MAX_D,
            axis_lock_y: false,
            spatial_threshold: 64,
        }
    }
}

/// The layout force bound to one link list.
pub struct MinigraphForce<'a> {
    links: &'a [Link],
    options: ForceOptions,
    index: SpatialIndex,
}

impl<'a> MinigraphForce<'a> {
    /// Bind the force to `links`.
    pub fn new(links: &'a [Link], options: ForceOptions) -> Self {
        Self {
            links,
            options,
            index: SpatialIndex::new(),
        }
    }

    /// Options in use.
    pub fn options(&self) -> &ForceOptions {
        &self.options
    }
}

impl Force for MinigraphForce<'_> {
    type Error = std::convert::Infallible;

    fn apply(&mut self, nodes: &mut NodeMap, alpha: f64) -> Result<(), Self::Error> {
        apply_with_index(nodes, self.links, alpha, &self.options, &mut self.index);
        Ok(())
    }
}

/// One evaluation of the layout force.
pub fn apply_minigraph_force(
    nodes: &mut NodeMap,
    links: &[Link],
    alpha: f64,
    options: &ForceOptions,
) {
    let mut index = SpatialIndex::new();
    apply_with_index(nodes, links, alpha, options, &mut index);
}

fn apply_with_index(
    nodes: &mut NodeMap,
    links: &[Link],
    alpha: f64,
    options: &ForceOptions,
    index: &mut SpatialIndex,
) {
    apply_repulsion(nodes, alpha, options, index);

    if options.axis_lock_y {
        // Runs after repulsion: a node's y must not change while its pairs
        // are still being evaluated.
        for node in nodes.values_mut() {
            node.y -= node.y * alpha / 6.0;
        }
    }

    apply_links(nodes, links, alpha, options.link_distance);
}

fn apply_repulsion(
    nodes: &mut NodeMap,
    alpha: f64,
    options: &ForceOptions,
    index: &mut SpatialIndex,
) {
    let n = nodes.len();
    let max_d = options.max_distance;

    if n <= options.spatial_threshold {
        for i in 0..n {
            for j in (i + 1)..n {
                repel_pair(nodes, i, j, alpha, max_d);
            }
        }
        return;
    }

    let points: Vec<NodePoint> = nodes
        .values()
        .enumerate()
        .map(|(slot, node)| NodePoint::new(slot, node.x, node.y, bounding_radius(node.shape)))
        .collect();
    index.rebuild(points.clone());

    for point in &points {
        for j in index.candidates_after(point, max_d) {
            repel_pair(nodes, point.slot, j, alpha, max_d);
        }
    }
}

fn repel_pair(nodes: &mut NodeMap, i: usize, j: usize, alpha: f64, max_d: f64) {
    let SurfaceDistance { l, u, .. } = surface_distance(&nodes[i], &nodes[j]);
    let l = l.max(1.0);
    if l >= max_d {
        return;
    }

    let k = -REPULSION * alpha / l;

    let b = &mut nodes[j];
    b.vx -= u.x * k;
    b.vy -= u.y * k;

    let a = &mut nodes[i];
    a.vx += u.x * k;
    a.vy += u.y * k;
}

fn apply_links(nodes: &mut NodeMap, links: &[Link], alpha: f64, link_distance: f64) {
    for link in links {
        let (Some(si), Some(ti)) = (
            nodes.get_index_of(&link.source_id),
            nodes.get_index_of(&link.target_id),
        ) else {
            continue;
        };

        let (source, target) = (&nodes[si], &nodes[ti]);
        let sd = surface_distance(target, source);
        let l = sd.l.max(1.0);
        let d = sd.d.max(1.0);
        let tl = link.target_gap(l, d, link_distance);

        let (ax, ay) = (source.x, source.y);
        let (bx, by) = (target.x, target.y);

        let ll = (l - tl) * (alpha / d);
        let x = (bx - ax) * ll;
        let y = (by - ay) * ll;
        let my = (ay + by) / 2.0;

        let target = &mut nodes[ti];
        target.vx -= x;
        target.vy -= y;
        target.vy += (my - by) * alpha / 3.0;

        let source = &mut nodes[si];
        source.vx += x;
        source.vy += y;
        source.vy += (my - ay) * alpha / 3.0;
    }
}
