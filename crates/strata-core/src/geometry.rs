use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point. Screen offsets and world positions share this type; callers
/// never mix the two without going through [`screen_to_world`] or
/// [`world_to_screen`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: Point, width: f64, height: f64) -> Self {
        Self {
            min: origin,
            max: Point::new(origin.x + width, origin.y + height),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Edges are inclusive.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min: self.min.translate(-margin, -margin),
            max: self.max.translate(margin, margin),
        }
    }
}

// ── Viewport transform ──────────────────────────────────────────────

/// Map a screen-space point into world space.
pub fn screen_to_world(screen: Point, pan: Point, zoom: f64) -> Point {
    (screen - pan) / zoom
}

/// Map a world-space point onto the screen.
pub fn world_to_screen(world: Point, pan: Point, zoom: f64) -> Point {
    world * zoom + pan
}

/// Pan offset that keeps the world point under `cursor` fixed while the zoom
/// is multiplied by `factor`.
pub fn zoom_about(pan: Point, cursor: Point, factor: f64) -> Point {
    cursor - (cursor - pan) * factor
}

// ── Interpolation ───────────────────────────────────────────────────

/// Linear interpolation. `t` must already be in `[0, 1]`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Cubic ease-in-out. `t` must already be in `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let pans = [Point::new(0.0, 0.0), Point::new(-340.5, 12.25), Point::new(1e4, -7.0)];
        let zooms = [0.01, 0.5, 1.0, 2.75, 300.0];
        let points = [Point::new(0.0, 0.0), Point::new(123.4, -56.7), Point::new(-1e3, 1e3)];
        for pan in pans {
            for zoom in zooms {
                for p in points {
                    let back = screen_to_world(world_to_screen(p, pan, zoom), pan, zoom);
                    assert!((back.x - p.x).abs() < 1e-6 * (1.0 + p.x.abs()));
                    assert!((back.y - p.y).abs() < 1e-6 * (1.0 + p.y.abs()));
                }
            }
        }
    }

    #[test]
    fn test_screen_to_world_formula() {
        let w = screen_to_world(Point::new(300.0, 200.0), Point::new(100.0, 50.0), 2.0);
        assert!((w.x - 100.0).abs() < EPS);
        assert!((w.y - 75.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_about_keeps_cursor_fixed() {
        let pan = Point::new(40.0, -20.0);
        let cursor = Point::new(500.0, 300.0);
        let zoom = 1.5;
        let factor = 1.1;
        let before = screen_to_world(cursor, pan, zoom);
        let after = screen_to_world(cursor, zoom_about(pan, cursor, factor), zoom * factor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_lerp_endpoints_and_monotonic() {
        assert_eq!(lerp(3.0, 9.0, 0.0), 3.0);
        assert_eq!(lerp(3.0, 9.0, 1.0), 9.0);
        let mut prev = lerp(3.0, 9.0, 0.0);
        for i in 1..=100 {
            let v = lerp(3.0, 9.0, i as f64 / 100.0);
            assert!(v >= prev);
            assert!((3.0..=9.0).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn test_ease_fixed_points() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_ease_monotonic() {
        let mut prev = 0.0;
        for i in 1..=200 {
            let v = ease_in_out_cubic(i as f64 / 200.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_bbox_intersection() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = BBox::new(Point::new(5.0, 5.0), Point::new(15.0, 15.0));
        let c = BBox::new(Point::new(20.0, 20.0), Point::new(30.0, 30.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
