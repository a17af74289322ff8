//! Decode cache for image-backed objects.
//!
//! Decoding happens on short-lived worker threads; results travel back over
//! a channel and are folded into the cache only by [`ImageCache::poll`],
//! which the render loop calls at the start of each frame. The map itself
//! is therefore touched from one timeline only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use image::{Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use strata_core::ImageContent;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed data URI")]
    MalformedDataUri,

    #[error("Unsupported image content: {0}")]
    Unsupported(String),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("SVG error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// State of one content handle.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Pending,
    Ready(Arc<RgbaImage>),
    /// Decoding failed; the handle is never retried.
    Failed,
}

type Completion = (ImageContent, Result<RgbaImage, DecodeError>);

#[derive(Debug)]
pub struct ImageCache {
    entries: HashMap<ImageContent, CacheEntry>,
    base_dir: Option<PathBuf>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    pending: usize,
}

impl ImageCache {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            entries: HashMap::new(),
            base_dir: None,
            tx,
            rx,
            pending: 0,
        }
    }

    /// Resolve relative file paths against `dir` (usually the project file's
    /// directory).
    pub fn set_base_dir(&mut self, dir: Option<PathBuf>) {
        self.base_dir = dir;
    }

    pub fn get(&self, handle: &ImageContent) -> Option<Arc<RgbaImage>> {
        match self.entries.get(handle) {
            Some(CacheEntry::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    pub fn entry(&self, handle: &ImageContent) -> Option<&CacheEntry> {
        self.entries.get(handle)
    }

    /// Start decoding `handle` unless it is already known. Returns whether a
    /// decode was started.
    pub fn request(&mut self, handle: &ImageContent) -> bool {
        if self.entries.contains_key(handle) {
            return false;
        }

        let tx = self.tx.clone();
        let job = handle.clone();
        let base_dir = self.base_dir.clone();
        let spawned = thread::Builder::new()
            .name("image-decode".into())
            .spawn(move || {
                let result = decode_content(&job, base_dir.as_deref());
                // The cache may already be gone; nothing to report then.
                let _ = tx.send((job, result));
            });

        match spawned {
            Ok(_) => {
                self.entries.insert(handle.clone(), CacheEntry::Pending);
                self.pending += 1;
                log::debug!("Decoding {}", handle);
                true
            }
            Err(e) => {
                log::warn!("Could not start decode of {}: {}", handle, e);
                self.entries.insert(handle.clone(), CacheEntry::Failed);
                false
            }
        }
    }

    /// Fold finished decodes into the cache. Returns how many completed.
    pub fn poll(&mut self) -> usize {
        let mut completed = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.complete(done);
            completed += 1;
        }
        completed
    }

    /// Block until every requested decode has finished.
    pub fn wait_idle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv() {
                Ok(done) => self.complete(done),
                // Unreachable while `self.tx` is alive.
                Err(_) => break,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn complete(&mut self, (handle, result): Completion) {
        self.pending = self.pending.saturating_sub(1);
        let entry = match result {
            Ok(image) => {
                log::debug!("Decoded {} ({}x{})", handle, image.width(), image.height());
                CacheEntry::Ready(Arc::new(image))
            }
            Err(e) => {
                log::warn!("Image {} will not be drawn: {}", handle, e);
                CacheEntry::Failed
            }
        };
        self.entries.insert(handle, entry);
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a content handle to pixels. Data URIs are decoded in place;
/// anything else is treated as a file path. SVG documents are rasterized at
/// their intrinsic size.
pub fn decode_content(handle: &ImageContent, base_dir: Option<&Path>) -> Result<RgbaImage, DecodeError> {
    let raw = handle.as_str();
    if let Some(rest) = raw.strip_prefix("data:") {
        let (meta, payload) = rest.split_once(',').ok_or(DecodeError::MalformedDataUri)?;
        let is_svg = meta.starts_with("image/svg");
        let bytes = if meta.ends_with(";base64") {
            BASE64_STANDARD.decode(payload.trim())?
        } else if is_svg {
            payload.as_bytes().to_vec()
        } else {
            return Err(DecodeError::Unsupported(format!("non-base64 data URI ({})", meta)));
        };
        return if is_svg {
            rasterize_svg(&bytes)
        } else {
            Ok(image::load_from_memory(&bytes)?.to_rgba8())
        };
    }

    let path = Path::new(raw);
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return rasterize_svg(&std::fs::read(&path)?);
    }
    Ok(image::open(&path)?.to_rgba8())
}

fn rasterize_svg(data: &[u8]) -> Result<RgbaImage, DecodeError> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| DecodeError::Unsupported("empty SVG canvas".into()))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; RgbaImage is straight.
    let mut image = RgbaImage::new(size.width(), size.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(image)
}
