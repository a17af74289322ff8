//! # Strata Editor
//!
//! The command surface a shell drives: control-panel actions, the bookmark
//! and object lists, pointer and wheel input, the animation-frame tick and
//! project import/export. One [`Editor`] owns one document.

pub mod config;
pub mod editor;

use strata_core::SceneError;
use strata_io::ProjectError;
use thiserror::Error;

pub use config::{ConfigError, EditorConfig, MAX_ANIMATION_SPEED_MS, MIN_ANIMATION_SPEED_MS};
pub use editor::{Editor, ObjectSummary};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No bookmark at index {0}")]
    BookmarkIndex(usize),

    #[error("Zoom must be a positive number, got {0}")]
    InvalidZoom(f64),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
