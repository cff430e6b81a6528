//! Spatial indexing for the repulsion broad phase.
//!
//! This module provides an R-tree over node centers so that bounded-range
//! repulsion on large node sets avoids visiting every pair.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
