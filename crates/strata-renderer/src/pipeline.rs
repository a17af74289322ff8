use serde::{Deserialize, Serialize};
use strata_core::depth::opacity;
use strata_core::{CanvasObject, Color, ObjectId, SceneStore, Shape, ViewMode};

use crate::image_cache::{CacheEntry, ImageCache};
use crate::surface::{ScopedTransform, Surface};
use crate::viewport::Viewport;
use crate::RenderError;

/// Colors used for everything that is not an object's own fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderStyle {
    pub background: Color,
    pub outline: Color,
    pub selection: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            outline: Color::BLACK,
            selection: Color::RED,
        }
    }
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    /// Invisible at the active depth in the current mode.
    pub hidden: usize,
    /// Entirely outside the visible region.
    pub culled: usize,
    /// Image objects whose content is still decoding.
    pub pending_images: usize,
    /// Objects skipped because their content or geometry is unusable.
    pub failed: usize,
}

enum DrawOutcome {
    Drawn,
    ImagePending,
}

/// Composites the scene onto a [`Surface`] once per frame.
#[derive(Debug, Default)]
pub struct Renderer {
    images: ImageCache,
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            images: ImageCache::new(),
            style,
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    pub fn render_frame<S: Surface + ?Sized>(
        &mut self,
        store: &SceneStore,
        mode: ViewMode,
        selection: Option<&ObjectId>,
        surface: &mut S,
    ) -> FrameStats {
        self.images.poll();

        let vp = store.viewport();
        let (width, height) = surface.size();
        let visible = Viewport::from_state(&vp, width as f64, height as f64).visible_bounds();
        let mut stats = FrameStats::default();

        surface.clear(self.style.background);
        {
            let mut frame = ScopedTransform::new(surface, vp.pan, vp.zoom);
            for object in store.objects() {
                let alpha = opacity(object.depth, vp.depth, mode);
                if alpha <= 0.0 {
                    stats.hidden += 1;
                    continue;
                }
                // Strokes keep a constant on-screen width and are centered
                // on the edge.
                let line_width = object.stroke_width / vp.zoom;
                if !object.bbox().expand(line_width / 2.0).intersects(&visible) {
                    stats.culled += 1;
                    continue;
                }

                frame.set_alpha(alpha);
                let outline = if selection == Some(&object.id) {
                    self.style.selection
                } else {
                    self.style.outline
                };
                match self.draw_object(&mut *frame, object, line_width, outline) {
                    Ok(DrawOutcome::Drawn) => stats.drawn += 1,
                    Ok(DrawOutcome::ImagePending) => stats.pending_images += 1,
                    Err(e) => {
                        log::debug!("Skipped object {}: {}", object.id, e);
                        stats.failed += 1;
                    }
                }
            }
            frame.set_alpha(1.0);
        }

        log::trace!(
            "Frame: {} drawn, {} hidden, {} culled, {} pending, {} failed",
            stats.drawn,
            stats.hidden,
            stats.culled,
            stats.pending_images,
            stats.failed
        );
        stats
    }

    fn draw_object<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        object: &CanvasObject,
        line_width: f64,
        outline: Color,
    ) -> Result<DrawOutcome, RenderError> {
        if !object.anchor().is_finite() || !line_width.is_finite() {
            return Err(RenderError::NonFinite(object.id.clone()));
        }
        let anchor = object.anchor();
        match &object.shape {
            Shape::Circle { radius } => {
                surface.fill_circle(anchor, *radius, object.color);
                surface.stroke_circle(anchor, *radius, line_width, outline);
            }
            Shape::Rect { width, height } => {
                surface.fill_rect(anchor, *width, *height, object.color);
                surface.stroke_rect(anchor, *width, *height, line_width, outline);
            }
            Shape::Image {
                width,
                height,
                content,
            } => match self.images.entry(content) {
                Some(CacheEntry::Ready(image)) => {
                    let image = image.clone();
                    surface.draw_image(&image, anchor, *width, *height);
                    surface.stroke_rect(anchor, *width, *height, line_width, outline);
                }
                Some(CacheEntry::Pending) => return Ok(DrawOutcome::ImagePending),
                Some(CacheEntry::Failed) => return Err(RenderError::Undrawable(object.id.clone())),
                None => {
                    self.images.request(content);
                    return Ok(DrawOutcome::ImagePending);
                }
            },
        }
        Ok(DrawOutcome::Drawn)
    }
}
