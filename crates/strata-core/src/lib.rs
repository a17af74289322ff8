//! # Strata Core
//!
//! The engine behind the Strata infinite canvas: world/screen transforms,
//! the scene store, semantic-zoom depth, pointer hit-testing and drag, and
//! eased viewport transitions between bookmarks.
//!
//! Everything here runs on one logical timeline. Mutation goes through
//! `&mut SceneStore`, which makes each store operation atomic with respect
//! to input, animation and rendering.

pub mod animator;
pub mod bookmark;
pub mod color;
pub mod depth;
pub mod geometry;
pub mod interaction;
pub mod object;
pub mod scene;
pub mod spatial;

pub use animator::{AnimationStatus, ViewportAnimator};
pub use bookmark::{Bookmark, BookmarkList};
pub use color::{Color, ColorError};
pub use depth::{DepthStep, DepthThresholds, ViewMode};
pub use geometry::{BBox, Point};
pub use interaction::{hit_test, DragController, DragSession};
pub use object::{CanvasObject, ImageContent, ObjectId, ObjectPatch, ObjectSpec, Shape, ShapeKind};
pub use scene::{SceneError, SceneStore, ViewportPatch, ViewportState};
