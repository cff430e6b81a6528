//! Geometry primitives for the layout engine.
//!
//! Pure functions over 2-D vectors and node bodies:
//! - `vector`: norms, directions, and randomized placement helpers
//! - `shape`: circle/rectangle bodies and shape-aware surface distance

mod shape;
mod vector;

pub use shape::{
    Body, Region, Shape, SurfaceDistance, bounding_radius, center_to_surface_distance,
    rad_between, rectangle_region, surface_distance,
};
pub use vector::{
    TWO_PI, distance, jiggle_point, norm, normalize, random_in_radius, random_in_range,
    random_unit_vector, unit_vector,
};
