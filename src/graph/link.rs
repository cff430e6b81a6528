//! Spring links between nodes.
//!
//! Links reference nodes by id only. A link whose endpoint is missing from
//! the node map is skipped, and starts pulling again once the node returns.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// A spring between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// Rest length of the surface gap.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Desired center-to-center distance. Takes precedence over `distance`.
    #[serde(default)]
    pub center_distance: Option<f64>,
}

impl Link {
    /// Link with the default rest length.
    pub fn new(source_id: impl Into<NodeId>, target_id: impl Into<NodeId>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            distance: None,
            center_distance: None,
        }
    }

    /// Set an explicit surface rest length.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Set a desired center-to-center distance.
    pub fn with_center_distance(mut self, center_distance: f64) -> Self {
        self.center_distance = Some(center_distance);
        self
    }

    /// Desired surface gap for this link.
    ///
    /// `l` is the current (clamped) surface gap and `d` the current (clamped)
    /// center distance. A center distance target is converted to a gap by
    /// subtracting the part of `d` taken up by the bodies themselves, and
    /// never goes below contact.
    pub fn target_gap(&self, l: f64, d: f64, default_distance: f64) -> f64 {
        match self.center_distance {
            Some(center_distance) => (center_distance - (d - l)).max(0.0),
            None => self.distance.unwrap_or(default_distance),
        }
    }
}
