//! Shape-aware distances between node bodies.
//!
//! A body is a circle or an axis-aligned rectangle centered on its position.
//! The layout forces act on the *surface gap* between two bodies (the free
//! space along the line joining their centers), not on center distance, so
//! large and small nodes end up evenly spaced.
//!
//! Screen coordinates are used throughout: `y` grows downward, so the "top"
//! region of a rectangle lies toward negative `y`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::vector::{TWO_PI, distance, norm, unit_vector};

/// Outline of a node body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Shape {
    /// Circle of radius `r`.
    Circle { r: f64 },
    /// Axis-aligned rectangle.
    Rect { width: f64, height: f64 },
}

impl Shape {
    /// Create a circle.
    #[inline]
    pub fn circle(r: f64) -> Self {
        Self::Circle { r }
    }

    /// Create a rectangle.
    #[inline]
    pub fn rect(width: f64, height: f64) -> Self {
        Self::Rect { width, height }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle { r: 0.0 }
    }
}

/// Anything with a center and an outline.
pub trait Body {
    /// Center position.
    fn center(&self) -> DVec2;
    /// Outline.
    fn shape(&self) -> Shape;
}

/// Which edge of a rectangle a direction from its center exits through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Left,
    Top,
    Right,
    Bottom,
}

/// Result of [`surface_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDistance {
    /// Center-to-center distance.
    pub d: f64,
    /// Gap between the two surfaces along `u`. Negative when overlapping.
    pub l: f64,
    /// Unit direction from the first body to the second.
    pub u: DVec2,
}

/// Counter-clockwise angle from `a` to `b`, in `[0, 2π)`.
pub fn rad_between(a: DVec2, b: DVec2) -> f64 {
    let mut angle = b.y.atan2(b.x) - a.y.atan2(a.x);
    if angle < 0.0 {
        angle += TWO_PI;
    }
    angle
}

/// Classify the direction `u` against a `width × height` rectangle.
///
/// The decision compares the angle of `u` (measured from the top-right
/// corner) with the angle subtended by the top edge, so non-square
/// rectangles split their regions unevenly.
pub fn rectangle_region(width: f64, height: f64, u: DVec2) -> Region {
    let origin = DVec2::ZERO;
    let top_left = unit_vector(origin, DVec2::new(-width / 2.0, -height / 2.0));
    let top_right = unit_vector(origin, DVec2::new(width / 2.0, -height / 2.0));

    let alpha = rad_between(top_left, top_right);
    let beta = rad_between(u, top_right);

    if beta <= alpha {
        Region::Top
    } else if beta <= std::f64::consts::PI {
        Region::Left
    } else if beta <= std::f64::consts::PI + alpha {
        Region::Bottom
    } else {
        Region::Right
    }
}

/// Distance from a body's center to its boundary along the unit direction `u`.
pub fn center_to_surface_distance(shape: Shape, u: DVec2) -> f64 {
    match shape {
        Shape::Circle { r } => r,
        Shape::Rect { width, height } => {
            // Ratio of the direction's components; ±inf on the horizontal axis.
            let tan = u.x / u.y;
            // A zero extent exits at the center instead of through 0/0.
            match rectangle_region(width, height, u) {
                Region::Left | Region::Right if width <= 0.0 => 0.0,
                Region::Top | Region::Bottom if height <= 0.0 => 0.0,
                Region::Left | Region::Right => norm(width / 2.0, width / 2.0 / tan),
                Region::Top | Region::Bottom => norm(height / 2.0 * tan, height / 2.0),
            }
        }
    }
}

/// Radius of the smallest circle around the center that contains the body.
pub fn bounding_radius(shape: Shape) -> f64 {
    match shape {
        Shape::Circle { r } => r,
        Shape::Rect { width, height } => norm(width / 2.0, height / 2.0),
    }
}

/// Center distance, direction, and surface gap from `a` to `b`.
pub fn surface_distance<A: Body + ?Sized, B: Body + ?Sized>(a: &A, b: &B) -> SurfaceDistance {
    let pa = a.center();
    let pb = b.center();

    let d = distance(pa, pb);
    let u = unit_vector(pa, pb);

    let surface_a = center_to_surface_distance(a.shape(), u);
    let surface_b = center_to_surface_distance(b.shape(), u);

    SurfaceDistance {
        d,
        l: d - (surface_a + surface_b),
        u,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Disk(DVec2, Shape);

    impl Body for Disk {
        fn center(&self) -> DVec2 {
            self.0
        }
        fn shape(&self) -> Shape {
            self.1
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_circle_surface_distance() {
        let a = Disk(DVec2::new(0.0, 0.0), Shape::circle(8.0));
        let b = Disk(DVec2::new(40.0, 0.0), Shape::circle(8.0));
        let sd = surface_distance(&a, &b);

        assert!(approx(sd.d, 40.0));
        assert!(approx(sd.l, 24.0));
        assert_eq!(sd.u, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_overlap_gives_negative_gap() {
        let a = Disk(DVec2::new(0.0, 0.0), Shape::circle(8.0));
        let b = Disk(DVec2::new(4.0, 0.0), Shape::circle(8.0));
        assert!(approx(surface_distance(&a, &b).l, -12.0));
    }

    #[test]
    fn test_rectangle_regions() {
        assert_eq!(rectangle_region(20.0, 10.0, DVec2::new(1.0, 0.0)), Region::Right);
        assert_eq!(rectangle_region(20.0, 10.0, DVec2::new(-1.0, 0.0)), Region::Left);
        assert_eq!(rectangle_region(20.0, 10.0, DVec2::new(0.0, -1.0)), Region::Top);
        assert_eq!(rectangle_region(20.0, 10.0, DVec2::new(0.0, 1.0)), Region::Bottom);
    }

    #[test]
    fn test_wide_rectangle_splits_regions_unevenly() {
        // 45° exits a 100×10 rectangle through the bottom, not the side.
        let u = DVec2::new(1.0, 1.0).normalize();
        assert_eq!(rectangle_region(100.0, 10.0, u), Region::Bottom);
        // A shallow angle still exits through the side.
        let u = DVec2::new(1.0, 0.05).normalize();
        assert_eq!(rectangle_region(100.0, 10.0, u), Region::Right);
    }

    #[test]
    fn test_rect_center_to_surface_axes() {
        let rect = Shape::rect(20.0, 10.0);
        assert!(approx(center_to_surface_distance(rect, DVec2::new(1.0, 0.0)), 10.0));
        assert!(approx(center_to_surface_distance(rect, DVec2::new(-1.0, 0.0)), 10.0));
        assert!(approx(center_to_surface_distance(rect, DVec2::new(0.0, 1.0)), 5.0));
        assert!(approx(center_to_surface_distance(rect, DVec2::new(0.0, -1.0)), 5.0));
    }

    #[test]
    fn test_rect_center_to_surface_diagonal() {
        let square = Shape::rect(10.0, 10.0);
        let u = DVec2::new(1.0, 1.0).normalize();
        assert!(approx(center_to_surface_distance(square, u), 50.0f64.sqrt()));
    }

    #[test]
    fn test_rect_to_circle_gap() {
        let a = Disk(DVec2::new(0.0, 0.0), Shape::rect(30.0, 10.0));
        let b = Disk(DVec2::new(0.0, 50.0), Shape::circle(5.0));
        let sd = surface_distance(&a, &b);
        assert!(approx(sd.l, 50.0 - 5.0 - 5.0));
    }

    #[test]
    fn test_zero_extent_rect_has_finite_gap() {
        let a = Disk(DVec2::new(0.0, 0.0), Shape::rect(0.0, 10.0));
        let b = Disk(DVec2::new(0.0, 500.0), Shape::rect(0.0, 10.0));
        let sd = surface_distance(&a, &b);
        assert!(sd.l.is_finite());
        assert!(approx(sd.l, 500.0));

        let flat = Shape::rect(10.0, 0.0);
        for u in [DVec2::X, DVec2::Y, DVec2::new(1.0, 1.0).normalize()] {
            let surface = center_to_surface_distance(flat, u);
            assert!(surface.is_finite() && surface >= 0.0, "{u} -> {surface}");
        }
    }

    #[test]
    fn test_bounding_radius() {
        assert_eq!(bounding_radius(Shape::circle(3.0)), 3.0);
        assert!(approx(bounding_radius(Shape::rect(6.0, 8.0)), 5.0));
    }

    proptest! {
        #[test]
        fn prop_circle_gap_on_x_axis(r in 0.0f64..50.0, d in 0.001f64..1000.0) {
            let a = Disk(DVec2::ZERO, Shape::circle(r));
            let b = Disk(DVec2::new(d, 0.0), Shape::circle(r));
            let sd = surface_distance(&a, &b);
            prop_assert!((sd.l - (d - 2.0 * r)).abs() < 1e-9);
            prop_assert_eq!(sd.u, DVec2::new(1.0, 0.0));
        }

        #[test]
        fn prop_rect_surface_within_bounds(
            w in 0.1f64..200.0, h in 0.1f64..200.0, angle in 0.0f64..TWO_PI,
        ) {
            let u = DVec2::new(angle.cos(), angle.sin());
            let s = center_to_surface_distance(Shape::rect(w, h), u);
            prop_assert!(s >= w.min(h) / 2.0 - 1e-9);
            prop_assert!(s <= bounding_radius(Shape::rect(w, h)) + 1e-9);
        }
    }
}
