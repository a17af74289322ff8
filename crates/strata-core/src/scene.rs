use std::cell::RefCell;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Point;
use crate::object::{CanvasObject, ObjectId, ObjectPatch, ObjectSpec};
use crate::spatial::{SpatialEntry, SpatialIndex};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Object {0} not found")]
    NotFound(ObjectId),
}

/// Current zoom, pan offset and active depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Screen pixels per world unit. Always positive.
    pub zoom: f64,
    /// Screen position of the world origin.
    pub pan: Point,
    pub depth: i32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ORIGIN,
            depth: 0,
        }
    }
}

/// Fields to merge into the viewport; `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportPatch {
    pub zoom: Option<f64>,
    pub pan: Option<Point>,
    pub depth: Option<i32>,
}

/// Authoritative owner of the placed objects and the viewport.
///
/// Object order is paint order: later objects are drawn on top and win
/// hit-tests. Every mutation goes through a method here so the bounding-box
/// index can be invalidated in one place.
#[derive(Debug, Default)]
pub struct SceneStore {
    objects: Vec<CanvasObject>,
    viewport: ViewportState,
    /// Rebuilt on demand; `None` after any object mutation.
    index: RefCell<Option<SpatialIndex>>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Objects ──────────────────────────────────────────────────────

    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        let mut id = ObjectId::new_v4();
        while self.position_of(&id).is_some() {
            id = ObjectId::new_v4();
        }
        self.objects.push(CanvasObject::from_spec(id.clone(), spec));
        self.invalidate_index();
        log::debug!("Added object {} ({} total)", id, self.objects.len());
        id
    }

    pub fn update_object(&mut self, id: &ObjectId, patch: ObjectPatch) -> Result<(), SceneError> {
        let idx = self.position_of(id).ok_or(SceneError::NotFound(id.clone()))?;
        self.objects[idx].apply(patch);
        self.invalidate_index();
        Ok(())
    }

    pub fn translate_object(&mut self, id: &ObjectId, delta: Point) -> Result<(), SceneError> {
        let idx = self.position_of(id).ok_or(SceneError::NotFound(id.clone()))?;
        self.objects[idx].translate(delta);
        self.invalidate_index();
        Ok(())
    }

    /// Remove every object at `depth`, then append `objects` in order.
    /// Identity of the removed objects is not carried over.
    pub fn replace_objects_at_depth(&mut self, depth: i32, objects: Vec<CanvasObject>) {
        let before = self.objects.len();
        self.objects.retain(|o| o.depth != depth);
        let removed = before - self.objects.len();

        let mut seen: HashSet<ObjectId> = self.objects.iter().map(|o| o.id.clone()).collect();
        for mut object in objects {
            if !seen.insert(object.id.clone()) {
                // The snapshot collides with a live object at another depth.
                object.id = ObjectId::new_v4();
                seen.insert(object.id.clone());
            }
            self.objects.push(object);
        }
        self.invalidate_index();
        log::debug!(
            "Replaced depth {}: {} removed, {} objects total",
            depth,
            removed,
            self.objects.len()
        );
    }

    /// Swap out the whole scene in one step.
    pub fn replace_all(&mut self, objects: Vec<CanvasObject>, viewport: ViewportState) {
        self.objects = objects;
        self.viewport = viewport;
        self.invalidate_index();
    }

    pub fn object(&self, id: &ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == *id)
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn objects_at_depth(&self, depth: i32) -> impl Iterator<Item = &CanvasObject> {
        self.objects.iter().filter(move |o| o.depth == depth)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn position_of(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == *id)
    }

    // ── Spatial queries ─────────────────────────────────────────────

    /// Ids of objects whose bounding box contains the world point.
    /// Unordered; callers apply paint order and exact shape tests.
    pub fn candidates_at(&self, world: &Point) -> HashSet<ObjectId> {
        self.with_index(|index| index.query_point(world).into_iter().collect())
    }

    fn with_index<T>(&self, f: impl FnOnce(&SpatialIndex) -> T) -> T {
        let mut slot = self.index.borrow_mut();
        let index = slot.get_or_insert_with(|| {
            SpatialIndex::build(
                self.objects
                    .iter()
                    .map(|o| SpatialEntry {
                        object_id: o.id.clone(),
                        bbox: o.bbox(),
                    })
                    .collect(),
            )
        });
        f(index)
    }

    fn invalidate_index(&mut self) {
        *self.index.get_mut() = None;
    }

    // ── Viewport ────────────────────────────────────────────────────

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        if let Some(zoom) = patch.zoom {
            self.viewport.zoom = zoom;
        }
        if let Some(pan) = patch.pan {
            self.viewport.pan = pan;
        }
        if let Some(depth) = patch.depth {
            self.viewport.depth = depth;
        }
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn pan(&self) -> Point {
        self.viewport.pan
    }

    pub fn depth(&self) -> i32 {
        self.viewport.depth
    }
}
