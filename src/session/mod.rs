//! LayoutSession - host-side driver around the simulation.
//!
//! A session owns everything a canvas needs to animate a small graph:
//! - The host's nodes (id and shape) and edges (possibly dangling)
//! - The simulation node table, including ghost nodes for dangling edges
//! - The link list derived from the edges
//! - Drag and pin bookkeeping
//!
//! Every topology change re-syncs the node table: removed nodes are dropped,
//! new nodes are seeded on a small ring around the view center, ghosts are
//! placed beside their anchor, and the simulation is reheated.

mod config;
mod edge;

use glam::DVec2;
use indexmap::IndexMap;

use crate::error::Result;
use crate::force::{ForceOptions, MinigraphForce};
use crate::geometry::Shape;
use crate::graph::{Link, NodeId, NodeMap, SimNode};
use crate::simulation::Simulation;

pub use config::{
    DEFAULT_EDGE_LEN, NODE_DIAMETER, NODE_RADIUS, RESTART_ALPHA, SEED_RADIUS,
    SIM_ALPHA_DECAY_DEFAULT, SessionConfig,
};
pub use edge::{DomainEdge, EdgeEnd, EdgeId, EdgeKind, GHOST_PREFIX, ghost_id, is_ghost_id};

/// Where a ghost goes when it first appears.
#[derive(Debug, Clone)]
struct GhostPlacement {
    anchor: NodeId,
    /// Signed horizontal offset from the anchor.
    offset: f64,
}

/// Seed position of the `k`-th new real node of one sync (1-based).
pub fn seed_position(center: DVec2, radius: f64, k: u32) -> DVec2 {
    let degrees = ((u64::from(k) + 1) * 997 % 360) as f64;
    let rad = degrees.to_radians();
    center + DVec2::new(rad.cos(), rad.sin()) * radius
}

/// Default body for a host shape name: `"rect"` is a 16x16 square, anything
/// else a circle of radius 8.
pub fn node_shape(kind: &str) -> Shape {
    match kind {
        "rect" => Shape::rect(NODE_DIAMETER, NODE_DIAMETER),
        _ => Shape::circle(NODE_RADIUS),
    }
}

/// Interactive layout of one small graph.
pub struct LayoutSession {
    config: SessionConfig,
    simulation: Simulation,
    force: ForceOptions,

    /// Host nodes and their shapes, in insertion order.
    domain_nodes: IndexMap<NodeId, Shape>,

    /// Host edges, in insertion order.
    domain_edges: IndexMap<EdgeId, DomainEdge>,

    /// Simulation nodes: host nodes plus ghosts.
    nodes: NodeMap,

    /// Links derived from `domain_edges` at the last sync.
    links: Vec<Link>,

    /// World point new nodes are seeded around.
    view_center: DVec2,

    /// Drags in progress.
    drag_count: u32,
}

impl LayoutSession {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let simulation = Simulation::new(config.simulation)?;
        Ok(Self {
            force: config.force,
            config,
            simulation,
            domain_nodes: IndexMap::new(),
            domain_edges: IndexMap::new(),
            nodes: NodeMap::new(),
            links: Vec::new(),
            view_center: DVec2::ZERO,
            drag_count: 0,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node, or change the shape of an existing one.
    pub fn add_node(&mut self, id: impl Into<NodeId>, shape: Shape) {
        self.domain_nodes.insert(id.into(), shape);
        self.sync();
    }

    /// Add or reshape many nodes with a single sync.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = (NodeId, Shape)>) {
        self.domain_nodes.extend(nodes);
        self.sync();
    }

    /// Remove a node. Edges touching it stay and become inert.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let removed = self.domain_nodes.shift_remove(id).is_some();
        if removed {
            self.sync();
        }
        removed
    }

    /// Number of host nodes (ghosts excluded).
    pub fn node_count(&self) -> usize {
        self.domain_nodes.len()
    }

    /// Simulation node by id, ghosts included.
    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.nodes.get(id)
    }

    /// The full simulation node table.
    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Mutable node table, for hosts that edit positions directly.
    ///
    /// Adding or removing entries here is undone by the next sync.
    pub fn nodes_mut(&mut self) -> &mut NodeMap {
        &mut self.nodes
    }

    /// Current position of a node.
    pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
        self.nodes.get(id).map(|node| (node.x, node.y))
    }

    /// Interleaved `[x0, y0, x1, y1, ...]` in node table order.
    pub fn positions(&self) -> Vec<f64> {
        self.nodes
            .values()
            .flat_map(|node| [node.x, node.y])
            .collect()
    }

    /// Ids in node table order, matching [`positions`](Self::positions).
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge, or replace an existing one with the same id.
    pub fn add_edge(&mut self, id: impl Into<EdgeId>, edge: DomainEdge) {
        self.domain_edges.insert(id.into(), edge);
        self.sync();
    }

    /// Remove an edge and its ghost, if any.
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        let removed = self.domain_edges.shift_remove(id).is_some();
        if removed {
            self.sync();
        }
        removed
    }

    /// Number of host edges.
    pub fn edge_count(&self) -> usize {
        self.domain_edges.len()
    }

    /// Links the force runs on.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    // =========================================================================
    // Pinning and Dragging
    // =========================================================================

    /// Pin a node at `(x, y)` and reheat. Returns false for unknown ids.
    pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.pin(x, y);
        self.simulation.reheat(self.config.restart_alpha);
        true
    }

    /// Release a pinned node and reheat.
    pub fn unpin(&mut self, id: &str) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.unpin();
        self.simulation.reheat(self.config.restart_alpha);
        true
    }

    /// True if either axis of the node is pinned.
    pub fn is_pinned(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(SimNode::is_pinned)
    }

    /// Start dragging a node. Alpha stops decaying until every drag ends.
    pub fn drag_start(&mut self, id: &str, x: f64, y: f64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.pin(x, y);
        }
        self.drag_count += 1;
        self.simulation.set_alpha_decay(0.0);
        self.simulation.reheat(self.config.restart_alpha);
        log::debug!("drag start: {} ({} active)", id, self.drag_count);
    }

    /// Move a dragged node.
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.pin(x, y);
        }
    }

    /// Release a dragged node. The last release restores alpha decay.
    pub fn drag_end(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.unpin();
        }
        self.drag_count = self.drag_count.saturating_sub(1);
        if self.drag_count == 0 {
            self.simulation.set_alpha_decay(self.config.alpha_decay);
            self.simulation.reheat(self.config.restart_alpha);
        }
        log::debug!("drag end: {} ({} active)", id, self.drag_count);
    }

    /// Drags in progress.
    pub fn drag_count(&self) -> u32 {
        self.drag_count
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the layout by one frame. Returns true once settled.
    pub fn tick(&mut self) -> bool {
        if self.simulation.is_ended() {
            return true;
        }
        let mut force = MinigraphForce::new(&self.links, self.force);
        self.simulation
            .step(&mut self.nodes, &mut force)
            .unwrap_or_else(|never| match never {})
    }

    /// Restart the layout at the configured alpha.
    pub fn reheat(&mut self) {
        self.simulation.reheat(self.config.restart_alpha);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn force_options(&self) -> &ForceOptions {
        &self.force
    }

    /// Replace the force options and reheat.
    pub fn set_force_options(&mut self, force: ForceOptions) {
        self.force = force;
        self.simulation.reheat(self.config.restart_alpha);
    }

    /// Set the world point new nodes are seeded around.
    pub fn set_view_center(&mut self, x: f64, y: f64) {
        self.view_center = DVec2::new(x, y);
    }

    pub fn view_center(&self) -> (f64, f64) {
        (self.view_center.x, self.view_center.y)
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box of all node centers as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut nodes = self.nodes.values();
        let first = nodes.next()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(nodes.fold(init, |(min_x, min_y, max_x, max_y), node| {
            (
                min_x.min(node.x),
                min_y.min(node.y),
                max_x.max(node.x),
                max_y.max(node.y),
            )
        }))
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.domain_nodes.clear();
        self.domain_edges.clear();
        self.nodes.clear();
        self.links.clear();
        self.drag_count = 0;
        self.simulation.set_alpha_decay(self.config.alpha_decay);
    }

    /// Rebuild ghosts, links and the node table from the host graph.
    fn sync(&mut self) {
        let mut links = Vec::with_capacity(self.domain_edges.len());
        let mut ghosts: IndexMap<NodeId, GhostPlacement> = IndexMap::new();

        for (edge_id, edge) in &self.domain_edges {
            let len = edge.kind.ghost_len(self.config.default_edge_len);
            match (&edge.source, &edge.target) {
                (Some(source), Some(target)) => {
                    links.push(Link::new(source.clone(), target.clone()));
                }
                (Some(anchor), None) | (None, Some(anchor)) => {
                    let end = if edge.target.is_none() {
                        EdgeEnd::Target
                    } else {
                        EdgeEnd::Source
                    };
                    let gid = ghost_id(edge_id, end);
                    let link = match end {
                        EdgeEnd::Target => Link::new(anchor.clone(), gid.clone()),
                        EdgeEnd::Source => Link::new(gid.clone(), anchor.clone()),
                    };
                    links.push(link.with_center_distance(len));
                    ghosts.insert(
                        gid,
                        GhostPlacement {
                            anchor: anchor.clone(),
                            offset: end.direction() * len,
                        },
                    );
                }
                (None, None) => {}
            }
        }

        let domain_nodes = &self.domain_nodes;
        self.nodes
            .retain(|id, _| domain_nodes.contains_key(id) || ghosts.contains_key(id));

        let mut seeded = 0;
        for (id, shape) in &self.domain_nodes {
            match self.nodes.get_mut(id) {
                Some(node) => {
                    node.shape = *shape;
                    node.shadow_x = node.x;
                    node.shadow_y = node.y;
                }
                None => {
                    seeded += 1;
                    let p = seed_position(self.view_center, self.config.seed_radius, seeded);
                    self.nodes.insert(id.clone(), SimNode::new(p.x, p.y, *shape));
                }
            }
        }

        for (id, placement) in &ghosts {
            if self.nodes.contains_key(id) {
                continue;
            }
            let anchor = self
                .nodes
                .get(&placement.anchor)
                .map(SimNode::position)
                .unwrap_or(self.view_center);
            self.nodes.insert(
                id.clone(),
                SimNode::new(anchor.x + placement.offset, anchor.y, Shape::circle(NODE_RADIUS)),
            );
        }

        self.links = links;

        self.simulation.reheat(self.config.restart_alpha);
        self.simulation.set_alpha_decay(if self.drag_count > 0 {
            0.0
        } else {
            self.config.alpha_decay
        });

        log::info!(
            "layout synced: {} nodes ({} ghosts, {} seeded), {} links",
            self.nodes.len(),
            ghosts.len(),
            seeded,
            self.links.len()
        );
    }
}
