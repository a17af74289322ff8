//! Pointer hit-testing and drag sessions.

use crate::depth::{is_visible, ViewMode};
use crate::geometry::{screen_to_world, Point};
use crate::object::ObjectId;
use crate::scene::{SceneError, SceneStore, ViewportPatch};

/// Topmost visible object under a screen point, if any.
///
/// Objects are scanned in reverse paint order so the one drawn last wins.
/// Objects invisible at the current depth and mode are skipped.
pub fn hit_test(store: &SceneStore, screen: Point, mode: ViewMode) -> Option<ObjectId> {
    let vp = store.viewport();
    let world = screen_to_world(screen, vp.pan, vp.zoom);
    let candidates = store.candidates_at(&world);
    if candidates.is_empty() {
        return None;
    }

    store
        .objects()
        .iter()
        .rev()
        .filter(|o| candidates.contains(&o.id))
        .filter(|o| is_visible(o.depth, vp.depth, mode))
        .find(|o| o.contains_point(&world))
        .map(|o| o.id.clone())
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSession {
    Idle,
    /// Moving an object; `last` is the previous pointer position on screen.
    MovingObject { id: ObjectId, last: Point },
    /// Panning the viewport; `origin` is the pointer position minus the pan
    /// at pointer-down.
    Panning { origin: Point },
}

/// Turns pointer events into selection, object moves and viewport pans.
#[derive(Debug)]
pub struct DragController {
    session: DragSession,
    selection: Option<ObjectId>,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            session: DragSession::Idle,
            selection: None,
        }
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn selection(&self) -> Option<&ObjectId> {
        self.selection.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.session, DragSession::Idle)
    }

    /// Drop the selection and any session, e.g. after the scene was replaced.
    pub fn reset(&mut self) {
        self.session = DragSession::Idle;
        self.selection = None;
    }

    pub fn pointer_down(&mut self, store: &SceneStore, screen: Point, mode: ViewMode) {
        match hit_test(store, screen, mode) {
            Some(id) if mode.is_edit() => {
                log::debug!("Selected object {}", id);
                self.selection = Some(id.clone());
                self.session = DragSession::MovingObject { id, last: screen };
            }
            _ => {
                self.selection = None;
                self.session = DragSession::Panning {
                    origin: screen - store.pan(),
                };
            }
        }
    }

    pub fn pointer_move(&mut self, store: &mut SceneStore, screen: Point) {
        match &mut self.session {
            DragSession::Idle => {}
            DragSession::MovingObject { id, last } => {
                let delta = (screen - *last) / store.zoom();
                match store.translate_object(id, delta) {
                    Ok(()) => {}
                    Err(SceneError::NotFound(_)) => {
                        log::debug!("Dragged object {} no longer exists", id);
                    }
                }
                *last = screen;
            }
            DragSession::Panning { origin } => {
                store.set_viewport(ViewportPatch {
                    pan: Some(screen - *origin),
                    ..Default::default()
                });
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.session = DragSession::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
