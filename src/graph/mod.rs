//! Node and link data model.
//!
//! Nodes live in an id-keyed table owned by the host. Iteration order is
//! insertion order, which fixes the order pairwise forces are visited in.
//! Links are plain id pairs; they never own or point at nodes.

mod link;
mod node;

use indexmap::IndexMap;

pub use link::Link;
pub use node::{NodeId, SimNode};

/// Id-keyed node table shared between the host and the simulation.
pub type NodeMap = IndexMap<NodeId, SimNode>;
