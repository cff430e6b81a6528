//! Minigraph Layout - WASM Module
//!
//! Force-directed layout for small node/edge canvases. Nodes are circles or
//! rectangles; forces act on the gap between their surfaces. The simulation
//! anneals a temperature (alpha) and integrates with an explicit Runge-Kutta
//! scheme of order 1 to 4. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `geometry`: Vector helpers and shape-aware surface distances
//! - `graph`: Node table and links
//! - `force`: The force seam and the minigraph layout force
//! - `spatial`: R-tree broad phase for repulsion on larger node sets
//! - `simulation`: Alpha annealing and Runge-Kutta integration
//! - `session`: Host-side driver (dangling edges, seeding, dragging)

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod force;
pub mod geometry;
pub mod graph;
pub mod session;
pub mod simulation;
pub mod spatial;

pub use error::{LayoutError, Result};
pub use force::{Force, ForceOptions, MinigraphForce, NoopForce, force_fn};
pub use geometry::{Body, Shape};
pub use graph::{Link, NodeId, NodeMap, SimNode};
pub use session::{DomainEdge, EdgeId, EdgeKind, LayoutSession, SessionConfig};
pub use simulation::{Simulation, SimulationConfig, Stability};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    {
        // A second init (e.g. hot reload) keeps the first logger.
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

fn to_js(err: LayoutError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn from_js<T: serde::de::DeserializeOwned + Default>(value: JsValue) -> Result<T> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| LayoutError::InvalidConfig(e.to_string()))
}

/// Main entry point for the layout engine.
///
/// This struct wraps a [`LayoutSession`] and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct MinigraphLayoutWasm {
    session: LayoutSession,
}

#[wasm_bindgen]
impl MinigraphLayoutWasm {
    /// Create an empty layout.
    ///
    /// `config` is an optional camelCase object, e.g.
    /// `{ simulation: { stability: 4 }, force: { axisLockY: true } }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<MinigraphLayoutWasm, JsValue> {
        let config: SessionConfig = from_js(config).map_err(to_js)?;
        Self::with_config(config).map_err(to_js)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node, or reshape an existing one.
    ///
    /// `shape` is `"rect"` or `"circle"`; nodes get the default 16px size.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, id: &str, shape: &str) {
        self.session.add_node(id, session::node_shape(shape));
    }

    /// Add several nodes of one shape in a single sync, so they are seeded
    /// on distinct points of the ring.
    #[wasm_bindgen(js_name = addNodes)]
    pub fn add_nodes(&mut self, ids: Vec<String>, shape: &str) {
        let shape = session::node_shape(shape);
        self.session
            .add_nodes(ids.into_iter().map(|id| (NodeId(id), shape)));
    }

    /// Add a rectangular node with an explicit size.
    #[wasm_bindgen(js_name = addRectNode)]
    pub fn add_rect_node(&mut self, id: &str, width: f64, height: f64) {
        self.session.add_node(id, Shape::rect(width, height));
    }

    /// Add a circular node with an explicit radius.
    #[wasm_bindgen(js_name = addCircleNode)]
    pub fn add_circle_node(&mut self, id: &str, r: f64) {
        self.session.add_node(id, Shape::circle(r));
    }

    /// Remove a node by ID.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.session.remove_node(id)
    }

    /// Get the number of host nodes (ghosts excluded).
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.session.node_count()
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, id: &str) -> Option<f64> {
        self.session.node_position(id).map(|(x, _)| x)
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, id: &str) -> Option<f64> {
        self.session.node_position(id).map(|(_, y)| y)
    }

    /// True for ids the engine minted for dangling edges.
    #[wasm_bindgen(js_name = isGhost)]
    pub fn is_ghost(id: &str) -> bool {
        session::is_ghost_id(id)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add or replace an edge. Either endpoint may be missing.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(
        &mut self,
        id: &str,
        source: Option<String>,
        target: Option<String>,
        scope: bool,
    ) {
        let kind = if scope { EdgeKind::Scope } else { EdgeKind::Normal };
        let edge = DomainEdge::new(source.map(NodeId), target.map(NodeId), kind);
        self.session.add_edge(id, edge);
    }

    /// Remove an edge by ID.
    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, id: &str) -> bool {
        self.session.remove_edge(&EdgeId::from(id))
    }

    /// Get the number of host edges.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.session.edge_count()
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Set the world point new nodes are seeded around.
    #[wasm_bindgen(js_name = setViewCenter)]
    pub fn set_view_center(&mut self, x: f64, y: f64) {
        self.session.set_view_center(x, y);
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: &str, x: f64, y: f64) {
        self.session.drag_start(id, x, y);
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) {
        self.session.drag_to(id, x, y);
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, id: &str) {
        self.session.drag_end(id);
    }

    /// Pin a node at a position.
    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, id: &str, x: f64, y: f64) -> bool {
        self.session.pin(id, x, y)
    }

    /// Unpin a node.
    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, id: &str) -> bool {
        self.session.unpin(id)
    }

    /// Check if a node is pinned.
    #[wasm_bindgen(js_name = isNodePinned)]
    pub fn is_node_pinned(&self, id: &str) -> bool {
        self.session.is_pinned(id)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one frame. Returns true once the layout has settled.
    pub fn tick(&mut self) -> bool {
        self.session.tick()
    }

    pub fn alpha(&self) -> f64 {
        self.session.simulation().alpha()
    }

    #[wasm_bindgen(js_name = setAlpha)]
    pub fn set_alpha(&mut self, alpha: f64) {
        self.session.simulation_mut().set_alpha(alpha);
    }

    /// Restart a settled layout.
    pub fn reheat(&mut self) {
        self.session.reheat();
    }

    #[wasm_bindgen(js_name = isEnded)]
    pub fn is_ended(&self) -> bool {
        self.session.simulation().is_ended()
    }

    /// Change the integration order (1 to 4).
    #[wasm_bindgen(js_name = setStability)]
    pub fn set_stability(&mut self, order: u8) -> std::result::Result<(), JsValue> {
        self.session.simulation_mut().set_stability(order).map_err(to_js)
    }

    /// Replace the force options from a camelCase object.
    #[wasm_bindgen(js_name = setForceOptions)]
    pub fn set_force_options(&mut self, options: JsValue) -> std::result::Result<(), JsValue> {
        let options: ForceOptions = from_js(options).map_err(to_js)?;
        self.session.set_force_options(options);
        Ok(())
    }

    // =========================================================================
    // Position Access
    // =========================================================================

    /// Node ids (ghosts included) in the order of `getPositions`.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.session.node_ids().map(|id| id.0.clone()).collect()
    }

    /// Interleaved positions `[x0, y0, x1, y1, ...]`, copied out.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float64Array {
        Float64Array::from(&self.session.positions()[..])
    }

    /// Get the bounding box of all nodes.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if the layout is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f64>> {
        self.session
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Clear all nodes and edges.
    pub fn clear(&mut self) {
        self.session.clear();
    }
}

impl MinigraphLayoutWasm {
    /// Create a layout from an already-parsed config.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        Ok(Self {
            session: LayoutSession::new(config)?,
        })
    }

    pub fn session(&self) -> &LayoutSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LayoutSession {
        &mut self.session
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Build a small canvas the way a host does: nodes, one full edge, one
    /// dangling edge, then run frames until the layout comes to rest.
    #[test]
    fn test_session_comes_to_rest() {
        let mut layout = MinigraphLayoutWasm::with_config(SessionConfig::default()).unwrap();
        layout.set_view_center(400.0, 300.0);
        layout.add_node("a", "circle");
        layout.add_node("b", "rect");
        layout.add_node("c", "circle");
        layout.add_edge("ab", Some("a".into()), Some("b".into()), false);
        layout.add_edge("c-out", Some("c".into()), None, false);

        assert_eq!(layout.node_count(), 3);
        assert_eq!(layout.edge_count(), 2);

        let ids = layout.node_ids();
        assert_eq!(ids, ["a", "b", "c", "__ghost:c-out:target"]);
        assert!(MinigraphLayoutWasm::is_ghost(&ids[3]));

        for _ in 0..600 {
            assert!(!layout.tick());
        }

        for id in &ids {
            let x = layout.get_node_x(id).unwrap();
            let y = layout.get_node_y(id).unwrap();
            assert!(x.is_finite() && y.is_finite(), "{id} at ({x}, {y})");
        }

        // At rest the reheat keeps alpha warm instead of letting it end.
        assert_eq!(layout.alpha(), simulation::REHEAT_ALPHA);
        assert!(!layout.is_ended());

        let session = layout.session();
        let a = session.node("a").unwrap().position();
        let b = session.node("b").unwrap().position();
        let c = session.node("c").unwrap().position();
        let ghost = session.node("__ghost:c-out:target").unwrap().position();
        assert!(a.distance(b) > 32.0 && a.distance(b) < 64.0);
        assert!(c.distance(ghost) > 40.0 && c.distance(ghost) < 64.0);
    }

    /// Dragging holds alpha up; releasing lets it decay again.
    #[test]
    fn test_drag_keeps_layout_warm() {
        let mut layout = MinigraphLayoutWasm::with_config(SessionConfig::default()).unwrap();
        layout.add_node("a", "circle");
        layout.add_node("b", "circle");
        layout.add_edge("ab", Some("a".into()), Some("b".into()), false);

        layout.drag_start("a", 50.0, 50.0);
        for i in 0..400 {
            layout.drag_to("a", 50.0 + i as f64 * 0.1, 50.0);
            assert!(!layout.tick());
        }
        assert_eq!(layout.get_node_x("a"), Some(50.0 + 399.0 * 0.1));
        assert!(layout.is_node_pinned("a"));
        assert_eq!(layout.session().simulation().alpha_decay(), 0.0);

        layout.drag_end("a");
        assert!(!layout.is_node_pinned("a"));
        assert_eq!(
            layout.session().simulation().alpha_decay(),
            session::SIM_ALPHA_DECAY_DEFAULT
        );
        for _ in 0..100 {
            layout.tick();
        }
        assert!(layout.get_node_x("b").unwrap().is_finite());
    }

    /// With `alpha_min` above the reheat alpha a resting layout ends.
    #[test]
    fn test_high_alpha_min_ends() {
        let mut layout = MinigraphLayoutWasm::with_config(SessionConfig::default()).unwrap();
        layout.add_node("a", "circle");
        layout.session_mut().simulation_mut().set_alpha_min(0.2);
        let mut frames = 0;
        while !layout.tick() {
            frames += 1;
            assert!(frames < 100, "layout never ended");
        }
        assert!(layout.is_ended());
    }

    /// Larger canvases go through the spatial index and must still settle.
    #[test]
    fn test_chain_over_spatial_threshold() {
        let mut session = LayoutSession::new(SessionConfig::default()).unwrap();
        session.add_nodes((0..80).map(|i| (NodeId(format!("n{i}")), Shape::circle(8.0))));
        for i in 1..80 {
            session.add_edge(
                format!("e{i}"),
                DomainEdge::between(format!("n{}", i - 1), format!("n{i}")),
            );
        }
        assert!(session.nodes().len() > session.force_options().spatial_threshold);

        for _ in 0..300 {
            session.tick();
        }
        assert!(session.positions().iter().all(|v| v.is_finite()));
        let (min_x, min_y, max_x, max_y) = session.bounds().unwrap();
        assert!(max_x - min_x > 16.0 || max_y - min_y > 16.0);
    }

    #[test]
    fn test_invalid_stability_is_rejected() {
        let config = SessionConfig {
            simulation: SimulationConfig {
                stability: 7,
                ..SessionConfig::default().simulation
            },
            ..SessionConfig::default()
        };
        assert!(matches!(
            MinigraphLayoutWasm::with_config(config),
            Err(LayoutError::InvalidStability(7))
        ));
    }
}
