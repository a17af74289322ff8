use std::ops::{Deref, DerefMut};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use strata_core::{Color, Point};

/// Translate-then-scale transform, the only kind the canvas needs.
/// Maps a local point `p` to `p * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub translate: Point,
    pub scale: f64,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        translate: Point::ORIGIN,
        scale: 1.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        p * self.scale + self.translate
    }

    /// Compose with an inner transform applied first, as a 2D canvas does
    /// for `translate(t); scale(s)`.
    pub fn then(&self, translate: Point, scale: f64) -> Transform2D {
        Transform2D {
            translate: self.translate + translate * self.scale,
            scale: self.scale * scale,
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A drawing target with a transform stack and a global alpha.
///
/// Coordinates passed to the draw calls are in the current local space;
/// line widths are scaled by the current transform like any other length.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color);

    fn push_transform(&mut self, translate: Point, scale: f64);

    fn pop_transform(&mut self);

    /// Multiplier in `[0, 1]` applied to everything drawn afterwards.
    fn set_alpha(&mut self, alpha: f32);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color);

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: Color);

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, line_width: f64, color: Color);

    /// Draw `image` stretched over the given local rectangle.
    fn draw_image(&mut self, image: &RgbaImage, origin: Point, width: f64, height: f64);
}

/// Pushes a transform on creation and pops it when dropped, so the surface
/// is restored on every exit path of a frame.
pub struct ScopedTransform<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> ScopedTransform<'a, S> {
    pub fn new(surface: &'a mut S, translate: Point, scale: f64) -> Self {
        surface.push_transform(translate, scale);
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for ScopedTransform<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for ScopedTransform<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for ScopedTransform<'_, S> {
    fn drop(&mut self) {
        self.surface.pop_transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_then_matches_canvas_order() {
        let t = Transform2D::IDENTITY
            .then(Point::new(10.0, 20.0), 2.0)
            .then(Point::new(1.0, 1.0), 3.0);
        // translate(10,20) scale(2) translate(1,1) scale(3) applied to (1,0)
        let p = t.apply(Point::new(1.0, 0.0));
        assert!((p.x - (10.0 + 2.0 * (1.0 + 3.0))).abs() < 1e-12);
        assert!((p.y - (20.0 + 2.0 * 1.0)).abs() < 1e-12);
    }
}
