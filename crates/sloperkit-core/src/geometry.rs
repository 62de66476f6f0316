//! Planar geometry value types
//!
//! Everything in the drawing model lives in model millimeters, Y-up.
//! Rasterization flips into pixel space (Y-down) at the last moment.

use serde::{Deserialize, Serialize};

/// A point in model space, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Rotates this point about `center` by `angle_deg` degrees
    /// (counter-clockwise, math convention).
    pub fn rotated_around(&self, center: Point, angle_deg: f64) -> Point {
        let rad = angle_deg.to_radians();
        let (sin_a, cos_a) = rad.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point {
            x: center.x + dx * cos_a - dy * sin_a,
            y: center.y + dx * sin_a + dy * cos_a,
        }
    }
}

/// Axis-aligned bounding box in model millimeters.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`. A shape that cannot
/// produce a box yields `None` upstream, never a violated invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An inverted box that becomes valid once a point is included.
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// True once at least one point has been included.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite() && self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Grows the box by `amount` on all four sides.
    pub fn inflated(&self, amount: f64) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Distance from `p` to the nearest edge; 0 when inside.
    pub fn edge_distance(&self, p: Point) -> f64 {
        let dx = (self.min_x - p.x).max(0.0).max(p.x - self.max_x);
        let dy = (self.min_y - p.y).max(0.0).max(p.y - self.max_y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Area of the rectangle shared with `other`; 0 when disjoint.
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let overlap_x = (self.max_x.min(other.max_x) - self.min_x.max(other.min_x)).max(0.0);
        let overlap_y = (self.max_y.min(other.max_y) - self.min_y.max(other.min_y)).max(0.0);
        overlap_x * overlap_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance_to(&p2), 5.0);
    }

    #[test]
    fn point_rotation_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotated_around(Point::default(), 90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_include_and_union() {
        let mut bb = BoundingBox::empty();
        assert!(!bb.is_valid());
        bb.include(Point::new(1.0, 2.0));
        bb.include(Point::new(-3.0, 5.0));
        assert!(bb.is_valid());
        assert_eq!(bb.min_x, -3.0);
        assert_eq!(bb.max_y, 5.0);

        let mut other = BoundingBox::new(0.0, 0.0, 10.0, 1.0);
        other.union(&bb);
        assert_eq!(other.max_x, 10.0);
        assert_eq!(other.min_x, -3.0);
    }

    #[test]
    fn edge_distance_zero_inside() {
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bb.edge_distance(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(bb.edge_distance(Point::new(13.0, 14.0)), 5.0);
    }

    #[test]
    fn intersection_area_disjoint_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.intersection_area(&b), 0.0);

        let c = BoundingBox::new(0.5, 0.5, 1.5, 2.0);
        assert!((a.intersection_area(&c) - 0.25).abs() < 1e-12);
    }
}
