//! CPU rasterizer over an `image::RgbaImage`.
//!
//! Coverage is sampled once at each pixel center (no anti-aliasing) and
//! blended source-over in straight alpha.

use std::path::Path;

use image::{Rgba, RgbaImage};
use strata_core::{Color, Point};

use crate::surface::{Surface, Transform2D};
use crate::RenderError;

pub struct RasterSurface {
    image: RgbaImage,
    stack: Vec<Transform2D>,
    alpha: f32,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            stack: vec![Transform2D::IDENTITY],
            alpha: 1.0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Color::rgba(r, g, b, a)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.image
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        log::debug!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    fn current(&self) -> Transform2D {
        self.stack.last().copied().unwrap_or(Transform2D::IDENTITY)
    }

    /// Pixel index range covering device coordinates `[lo, hi]` along an
    /// axis of `len` pixels, clamped to the image.
    fn span(lo: f64, hi: f64, len: u32) -> std::ops::Range<u32> {
        let start = lo.floor().clamp(0.0, len as f64) as u32;
        let end = (hi.ceil() + 1.0).clamp(0.0, len as f64) as u32;
        start..end
    }

    /// Visit every pixel whose center lies in the device-space box and for
    /// which `inside(center)` holds, blending `color` there.
    fn cover(&mut self, min: Point, max: Point, color: Color, inside: impl Fn(Point) -> bool) {
        let (w, h) = self.image.dimensions();
        let weight = (color.a as f32 / 255.0) * self.alpha;
        if weight <= 0.0 {
            return;
        }
        for py in Self::span(min.y, max.y, h) {
            for px in Self::span(min.x, max.x, w) {
                let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if inside(center) {
                    blend(self.image.get_pixel_mut(px, py), [color.r, color.g, color.b], weight);
                }
            }
        }
    }
}

fn blend(dst: &mut Rgba<u8>, src: [u8; 3], weight: f32) {
    let weight = weight.clamp(0.0, 1.0);
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = weight + dst_a * (1.0 - weight);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let s = src[c] as f32;
        let d = dst.0[c] as f32;
        dst.0[c] = ((s * weight + d * dst_a * (1.0 - weight)) / out_a).round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Color) {
        let px = Rgba([color.r, color.g, color.b, color.a]);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn push_transform(&mut self, translate: Point, scale: f64) {
        let next = self.current().then(translate, scale);
        self.stack.push(next);
    }

    fn pop_transform(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            log::warn!("pop_transform on an empty stack");
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let t = self.current();
        let c = t.apply(center);
        let r = radius * t.scale;
        self.cover(c.translate(-r, -r), c.translate(r, r), color, |p| {
            p.distance_to(&c) <= r
        });
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color) {
        let t = self.current();
        let min = t.apply(origin);
        let max = t.apply(origin.translate(width, height));
        self.cover(min, max, color, |p| {
            p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: Color) {
        let t = self.current();
        let c = t.apply(center);
        let r = radius * t.scale;
        // Never thinner than one pixel, or the outline vanishes between samples.
        let half = (line_width * t.scale / 2.0).max(0.5);
        let outer = r + half;
        self.cover(c.translate(-outer, -outer), c.translate(outer, outer), color, |p| {
            (p.distance_to(&c) - r).abs() <= half
        });
    }

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, line_width: f64, color: Color) {
        let t = self.current();
        let min = t.apply(origin);
        let max = t.apply(origin.translate(width, height));
        let half = (line_width * t.scale / 2.0).max(0.5);
        let outer_min = min.translate(-half, -half);
        let outer_max = max.translate(half, half);
        let inner_min = min.translate(half, half);
        let inner_max = max.translate(-half, -half);
        self.cover(outer_min, outer_max, color, |p| {
            let in_outer =
                p.x >= outer_min.x && p.x <= outer_max.x && p.y >= outer_min.y && p.y <= outer_max.y;
            let in_inner =
                p.x > inner_min.x && p.x < inner_max.x && p.y > inner_min.y && p.y < inner_max.y;
            in_outer && !in_inner
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, origin: Point, width: f64, height: f64) {
        let t = self.current();
        let min = t.apply(origin);
        let max = t.apply(origin.translate(width, height));
        let (dw, dh) = (max.x - min.x, max.y - min.y);
        let (sw, sh) = image.dimensions();
        if dw <= 0.0 || dh <= 0.0 || sw == 0 || sh == 0 {
            return;
        }
        let (w, h) = self.image.dimensions();
        for py in Self::span(min.y, max.y, h) {
            for px in Self::span(min.x, max.x, w) {
                let cx = px as f64 + 0.5;
                let cy = py as f64 + 0.5;
                if cx < min.x || cx >= max.x || cy < min.y || cy >= max.y {
                    continue;
                }
                let sx = (((cx - min.x) / dw) * sw as f64) as u32;
                let sy = (((cy - min.y) / dh) * sh as f64) as u32;
                let Rgba([r, g, b, a]) = *image.get_pixel(sx.min(sw - 1), sy.min(sh - 1));
                let weight = (a as f32 / 255.0) * self.alpha;
                if weight > 0.0 {
                    blend(self.image.get_pixel_mut(px, py), [r, g, b], weight);
                }
            }
        }
    }
}
