//! Host-side edge records.
//!
//! Host edges may be dangling: either endpoint can be missing, e.g. while
//! the user is still drawing the edge. A dangling edge gets a ghost node on
//! its open end so it still renders with a sensible length.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Stable edge identifier chosen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<&str> for EdgeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EdgeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Edge flavor. Scope edges render shorter when dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    #[default]
    Normal,
    Scope,
}

impl EdgeKind {
    /// Ghost distance for a dangling edge of this kind.
    pub fn ghost_len(self, default_len: f64) -> f64 {
        match self {
            Self::Normal => default_len,
            Self::Scope => default_len * 2.0 / 3.0,
        }
    }
}

/// Which end of an edge a ghost stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Source,
    Target,
}

impl EdgeEnd {
    fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }

    /// Horizontal direction of the ghost from its anchor.
    pub fn direction(self) -> f64 {
        match self {
            Self::Source => -1.0,
            Self::Target => 1.0,
        }
    }
}

/// Prefix shared by every ghost node id.
pub const GHOST_PREFIX: &str = "__ghost:";

/// Id of the ghost standing in for `end` of edge `edge`.
pub fn ghost_id(edge: &EdgeId, end: EdgeEnd) -> NodeId {
    NodeId(format!("{GHOST_PREFIX}{}:{}", edge.0, end.as_str()))
}

/// True if `id` names a ghost node.
#[inline]
pub fn is_ghost_id(id: &str) -> bool {
    id.starts_with(GHOST_PREFIX)
}

/// An edge as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEdge {
    pub source: Option<NodeId>,
    pub target: Option<NodeId>,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl DomainEdge {
    pub fn new(source: Option<NodeId>, target: Option<NodeId>, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// Edge between two existing nodes.
    pub fn between(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self::new(Some(source.into()), Some(target.into()), EdgeKind::Normal)
    }

    /// The open end, if exactly one endpoint is set.
    pub fn dangling_end(&self) -> Option<EdgeEnd> {
        match (&self.source, &self.target) {
            (Some(_), None) => Some(EdgeEnd::Target),
            (None, Some(_)) => Some(EdgeEnd::Source),
            _ => None,
        }
    }
}
