use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::object::CanvasObject;
use crate::scene::{SceneStore, ViewportState};

/// A saved viewport plus a frozen copy of the objects at its depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub zoom: f64,
    pub position: Point,
    pub objects: Vec<CanvasObject>,
    pub depth: i32,
}

impl Bookmark {
    /// Snapshot the current viewport and deep-copy the objects at the
    /// active depth. Later edits to the scene do not reach the bookmark.
    pub fn capture(store: &SceneStore) -> Self {
        let vp = store.viewport();
        Self {
            name: None,
            zoom: vp.zoom,
            position: vp.pan,
            objects: store.objects_at_depth(vp.depth).cloned().collect(),
            depth: vp.depth,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn viewport(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom,
            pan: self.position,
            depth: self.depth,
        }
    }

    /// Display label, falling back to the 1-based list position.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Bookmark {} (Depth: {})", index + 1, self.depth),
        }
    }
}

/// Ordered bookmark list, as shown (and reordered) in the bookmark panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkList {
    items: Vec<Bookmark>,
}

impl BookmarkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Bookmark>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, bookmark: Bookmark) -> usize {
        self.items.push(bookmark);
        self.items.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.items.get(index)
    }

    /// Move the bookmark at `from` so it ends up at `to`. Returns `false`
    /// and leaves the list alone if either index is out of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Bookmark> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
