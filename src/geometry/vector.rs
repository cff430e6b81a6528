//! Vector math and randomized placement helpers.
//!
//! Directions between coincident points are randomized instead of
//! failing, so perfectly overlapping bodies still get pushed apart.
//! The placement helpers (`random_in_radius`, `jiggle_point`) are meant for
//! seeding new nodes, not for use inside a simulation step.

use glam::DVec2;
use rand::Rng;

/// Full turn in radians.
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Uniform sample in `[a, b)`.
pub fn random_in_range(a: f64, b: f64) -> f64 {
    a + rand::rng().random::<f64>() * (b - a)
}

/// Euclidean length of `(x, y)`.
#[inline]
pub fn norm(x: f64, y: f64) -> f64 {
    (x * x + y * y).sqrt()
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    norm(a.x - b.x, a.y - b.y)
}

/// Scale `p` to unit length.
///
/// A zero vector yields NaN components; use [`unit_vector`] when the input
/// may be degenerate.
#[inline]
pub fn normalize(p: DVec2) -> DVec2 {
    let d = norm(p.x, p.y);
    DVec2::new(p.x / d, p.y / d)
}

/// A unit vector pointing in a uniformly random direction.
pub fn random_unit_vector() -> DVec2 {
    let mut rng = rand::rng();
    loop {
        let p = DVec2::new(0.5 - rng.random::<f64>(), 0.5 - rng.random::<f64>());
        // Both samples landing exactly on 0.5 would normalize to NaN.
        if p.x != 0.0 || p.y != 0.0 {
            return normalize(p);
        }
    }
}

/// Direction from `from` to `to`.
///
/// Returns a random unit vector when the points coincide, never NaN or zero.
pub fn unit_vector(from: DVec2, to: DVec2) -> DVec2 {
    let delta = to - from;
    let d = norm(delta.x, delta.y);
    if d == 0.0 {
        return random_unit_vector();
    }
    DVec2::new(delta.x / d, delta.y / d)
}

/// A point on the circle of radius `radius` around `center`, at a random angle.
pub fn random_in_radius(center: DVec2, radius: f64) -> DVec2 {
    let angle = rand::rng().random::<f64>() * TWO_PI;
    DVec2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Offset `point` by `intensity` in a random direction.
pub fn jiggle_point(point: DVec2, intensity: f64) -> DVec2 {
    point + random_unit_vector() * intensity
}
