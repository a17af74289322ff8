//! # Strata Renderer
//!
//! Composites the scene onto a raster surface each frame: viewport
//! transform, depth-relative opacity, outlines and selection highlight, and
//! image-backed objects resolved through an asynchronous decode cache.
//!
//! Drawing goes through the [`Surface`] trait. [`RasterSurface`] produces
//! pixels; [`RecordingSurface`] produces a serializable display list.

pub mod image_cache;
pub mod pipeline;
pub mod raster;
pub mod render_data;
pub mod surface;
pub mod viewport;

use strata_core::ObjectId;
use thiserror::Error;

pub use image_cache::{CacheEntry, DecodeError, ImageCache};
pub use pipeline::{FrameStats, RenderStyle, Renderer};
pub use raster::RasterSurface;
pub use render_data::{DrawCommand, RecordingSurface, RenderFrame};
pub use surface::{ScopedTransform, Surface, Transform2D};
pub use viewport::Viewport;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Object {0} has non-finite geometry")]
    NonFinite(ObjectId),

    #[error("Image content of object {0} could not be decoded")]
    Undrawable(ObjectId),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
