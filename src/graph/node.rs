//! Node type and related structures.
//!
//! Nodes are the bodies the simulation moves. Each node has:
//! - A stable string identifier owned by the host
//! - Position (x, y) and a per-axis optional pin (fx, fy)
//! - A shape (circle or rectangle) for surface distances
//! - Velocity (vx, vy) and a per-stage acceleration accumulator (ax, ay)
//! - A shadow position written at every integration stage for renderers
//!   that interpolate

use std::borrow::Borrow;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{Body, Shape};

/// Stable node identifier.
///
/// Chosen by the host; the engine never mints or recycles ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kinematic state of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub x: f64,
    pub y: f64,
    /// Pinned x. `None` leaves the axis free.
    pub fx: Option<f64>,
    /// Pinned y. `None` leaves the axis free.
    pub fy: Option<f64>,
    pub shape: Shape,
    pub vx: f64,
    pub vy: f64,
    /// Acceleration accumulated during one integration stage, zeroed after it.
    pub ax: f64,
    pub ay: f64,
    /// Position at the last integration stage.
    pub shadow_x: f64,
    pub shadow_y: f64,
}

impl SimNode {
    /// Create a free node at rest.
    pub fn new(x: f64, y: f64, shape: Shape) -> Self {
        Self {
            x,
            y,
            fx: None,
            fy: None,
            shape,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            shadow_x: x,
            shadow_y: y,
        }
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Fix the node at `(x, y)` and stop it.
    pub fn pin(&mut self, x: f64, y: f64) {
        self.fx = Some(x);
        self.fy = Some(y);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Release both axes.
    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    /// True if either axis is pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

impl Body for SimNode {
    #[inline]
    fn center(&self) -> DVec2 {
        self.position()
    }

    #[inline]
    fn shape(&self) -> Shape {
        self.shape
    }
}
