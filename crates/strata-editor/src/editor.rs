use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use strata_core::geometry::zoom_about;
use strata_core::{
    AnimationStatus, Bookmark, BookmarkList, DragController, ObjectId, ObjectSpec, Point,
    SceneError, SceneStore, ShapeKind, ViewMode, ViewportAnimator, ViewportPatch,
};
use strata_io::{ProjectData, ProjectReader, ProjectWriter};
use strata_renderer::{FrameStats, Renderer, Surface, Viewport};

use crate::config::{EditorConfig, MAX_ANIMATION_SPEED_MS, MIN_ANIMATION_SPEED_MS};
use crate::EditorError;

/// One row of the object list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub id: ObjectId,
    pub kind: ShapeKind,
    pub depth: i32,
    /// Whether the object lives at the active depth.
    pub current: bool,
}

/// Editor state: the scene, its bookmarks, and everything that acts on them.
///
/// All inputs, animation frames and renders go through `&mut self`, so each
/// command sees and leaves a consistent scene.
#[derive(Debug)]
pub struct Editor {
    store: SceneStore,
    bookmarks: BookmarkList,
    mode: ViewMode,
    controller: DragController,
    animator: ViewportAnimator,
    renderer: Renderer,
    config: EditorConfig,
    animation_speed_ms: f64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let animation_speed_ms = config
            .animation_speed_ms
            .clamp(MIN_ANIMATION_SPEED_MS, MAX_ANIMATION_SPEED_MS);
        Self {
            store: SceneStore::new(),
            bookmarks: BookmarkList::new(),
            mode: ViewMode::View,
            controller: DragController::new(),
            animator: ViewportAnimator::new(config.sequence_dwell_ms),
            renderer: Renderer::new(config.style),
            config,
            animation_speed_ms,
        }
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn bookmarks(&self) -> &BookmarkList {
        &self.bookmarks
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn selection(&self) -> Option<&ObjectId> {
        self.controller.selection()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn animation_speed_ms(&self) -> f64 {
        self.animation_speed_ms
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.config.canvas_width = width;
        self.config.canvas_height = height;
    }

    // ── Control panel ────────────────────────────────────────────────

    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        self.store.add_object(spec)
    }

    pub fn set_edit_mode(&mut self, editing: bool) {
        self.mode = ViewMode::from_editing(editing);
        log::debug!("Mode: {:?}", self.mode);
    }

    pub fn toggle_edit_mode(&mut self) {
        self.set_edit_mode(!self.mode.is_edit());
    }

    /// Set the zoom directly. Depth thresholds are not consulted.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), EditorError> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(EditorError::InvalidZoom(zoom));
        }
        self.store.set_viewport(ViewportPatch {
            zoom: Some(zoom),
            ..Default::default()
        });
        Ok(())
    }

    pub fn zoom_in(&mut self) {
        self.scale_zoom(self.config.zoom_in_factor);
    }

    pub fn zoom_out(&mut self) {
        self.scale_zoom(self.config.zoom_out_factor);
    }

    fn scale_zoom(&mut self, factor: f64) {
        let zoom = self.store.zoom() * factor;
        if let Err(e) = self.set_zoom(zoom) {
            log::warn!("Ignoring zoom button: {}", e);
        }
    }

    /// Set the active depth. Manual changes are not floored at 0.
    pub fn set_depth(&mut self, depth: i32) {
        self.store.set_viewport(ViewportPatch {
            depth: Some(depth),
            ..Default::default()
        });
    }

    pub fn increase_depth(&mut self) {
        self.set_depth(self.store.depth().saturating_add(1));
    }

    pub fn decrease_depth(&mut self) {
        self.set_depth(self.store.depth().saturating_sub(1));
    }

    /// Capture the current view and active-depth objects. Returns the new
    /// bookmark's index.
    pub fn add_bookmark(&mut self) -> usize {
        let index = self.bookmarks.push(Bookmark::capture(&self.store));
        log::info!("Added bookmark {} at depth {}", index, self.store.depth());
        index
    }

    // ── Bookmark list ────────────────────────────────────────────────

    /// Animate to bookmark `index`. `duration_ms` defaults to the configured
    /// transition length.
    pub fn go_to_bookmark(
        &mut self,
        index: usize,
        duration_ms: Option<f64>,
        now: f64,
    ) -> Result<(), EditorError> {
        let target = self
            .bookmarks
            .get(index)
            .cloned()
            .ok_or(EditorError::BookmarkIndex(index))?;
        let duration = duration_ms.unwrap_or(self.config.transition_ms);
        self.animator.go_to(target, duration, now, &self.store);
        Ok(())
    }

    /// Tour every bookmark in list order. Returns `false` when there is
    /// nothing to play.
    pub fn play_sequence(&mut self, now: f64) -> bool {
        if self.bookmarks.is_empty() {
            return false;
        }
        let targets = self.bookmarks.as_slice().to_vec();
        self.animator
            .play_sequence(targets, self.animation_speed_ms, now, &self.store);
        true
    }

    pub fn stop_animation(&mut self) {
        self.animator.cancel();
    }

    pub fn set_animation_speed(&mut self, speed_ms: f64) {
        self.animation_speed_ms = speed_ms.clamp(MIN_ANIMATION_SPEED_MS, MAX_ANIMATION_SPEED_MS);
    }

    pub fn reorder_bookmarks(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        if !self.bookmarks.reorder(from, to) {
            let bad = if from >= self.bookmarks.len() { from } else { to };
            return Err(EditorError::BookmarkIndex(bad));
        }
        Ok(())
    }

    // ── Object list ──────────────────────────────────────────────────

    pub fn object_summaries(&self) -> Vec<ObjectSummary> {
        let active = self.store.depth();
        self.store
            .objects()
            .iter()
            .map(|o| ObjectSummary {
                id: o.id.clone(),
                kind: o.kind(),
                depth: o.depth,
                current: o.depth == active,
            })
            .collect()
    }

    /// Switch to the object's depth at zoom 1 with the object centered.
    pub fn jump_to_object(&mut self, id: &ObjectId) -> Result<(), EditorError> {
        let object = self
            .store
            .object(id)
            .ok_or_else(|| SceneError::NotFound(id.clone()))?;
        let depth = object.depth;
        let pan = Viewport::new(self.config.canvas_width, self.config.canvas_height)
            .pan_centering(object.anchor());
        self.store.set_viewport(ViewportPatch {
            zoom: Some(1.0),
            pan: Some(pan),
            depth: Some(depth),
        });
        Ok(())
    }

    // ── Input surface ────────────────────────────────────────────────

    /// Zoom about `cursor`. Positive `delta_y` (scrolling down) zooms out.
    pub fn handle_wheel(&mut self, delta_y: f64, cursor: Point) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y > 0.0 {
            self.config.zoom_out_factor
        } else {
            self.config.zoom_in_factor
        };
        let vp = self.store.viewport();
        let zoom = vp.zoom * factor;
        if !(zoom.is_finite() && zoom > 0.0) {
            log::warn!("Ignoring wheel zoom to {}", zoom);
            return;
        }
        self.store.set_viewport(ViewportPatch {
            pan: Some(zoom_about(vp.pan, cursor, factor)),
            ..Default::default()
        });
        self.config.thresholds.apply_zoom(&mut self.store, zoom);
    }

    pub fn pointer_down(&mut self, screen: Point) {
        self.controller.pointer_down(&self.store, screen, self.mode);
    }

    pub fn pointer_move(&mut self, screen: Point) {
        self.controller.pointer_move(&mut self.store, screen);
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
    }

    // ── Frame loop ───────────────────────────────────────────────────

    pub fn tick(&mut self, now: f64) -> AnimationStatus {
        self.animator.step(now, &mut self.store)
    }

    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        let selection = self.controller.selection();
        self.renderer
            .render_frame(&self.store, self.mode, selection, surface)
    }

    /// Block until every requested image has finished decoding.
    pub fn wait_for_images(&mut self) {
        self.renderer.images_mut().wait_idle();
    }

    // ── Project files ────────────────────────────────────────────────

    pub fn project_data(&self) -> ProjectData {
        let vp = self.store.viewport();
        ProjectData {
            canvas_objects: self.store.objects().to_vec(),
            bookmarks: self.bookmarks.as_slice().to_vec(),
            current_depth: vp.depth,
            zoom: vp.zoom,
            position: vp.pan,
        }
    }

    pub fn export_project<W: Write>(&self, writer: W) -> Result<(), EditorError> {
        ProjectWriter::new(writer).write(&self.project_data())?;
        Ok(())
    }

    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let file = File::create(path.as_ref()).map_err(strata_io::ProjectError::from)?;
        self.export_project(BufWriter::new(file))
    }

    /// Replace the whole document. A document that fails to parse or
    /// validate leaves the editor untouched.
    pub fn import_project<R: Read>(&mut self, reader: R) -> Result<(), EditorError> {
        let data = ProjectReader::new(reader).read()?;
        self.load(data);
        Ok(())
    }

    /// Import from a file. Relative image paths resolve against the file's
    /// directory.
    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(strata_io::ProjectError::from)?;
        self.import_project(BufReader::new(file))?;
        self.renderer
            .images_mut()
            .set_base_dir(path.parent().map(Path::to_path_buf));
        Ok(())
    }

    pub fn load(&mut self, data: ProjectData) {
        let viewport = data.viewport();
        self.animator.cancel();
        self.controller.reset();
        self.store.replace_all(data.canvas_objects, viewport);
        self.bookmarks = BookmarkList::from_vec(data.bookmarks);
        log::info!(
            "Loaded project: {} objects, {} bookmarks",
            self.store.object_count(),
            self.bookmarks.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::DepthThresholds;
    use strata_renderer::RecordingSurface;

    const EPSILON: f64 = 1e-9;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default().with_canvas_size(800.0, 600.0))
    }

    #[test]
    fn test_wheel_zoom_crosses_threshold() {
        let mut ed = editor();
        ed.set_zoom(1.9).unwrap();
        let cursor = Point::new(200.0, 150.0);
        let world_before = strata_core::geometry::screen_to_world(cursor, ed.store().pan(), ed.store().zoom());

        ed.handle_wheel(-100.0, cursor);
        assert!((ed.store().zoom() - 2.09).abs() < EPSILON);
        assert_eq!(ed.store().depth(), 1);

        let world_after = strata_core::geometry::screen_to_world(cursor, ed.store().pan(), ed.store().zoom());
        assert!(world_before.distance_to(&world_after) < 1e-6);

        // Staying above the threshold does not step again.
        ed.handle_wheel(-100.0, cursor);
        assert_eq!(ed.store().depth(), 1);
    }

    #[test]
    fn test_wheel_zoom_out_floors_depth() {
        let mut ed = editor();
        ed.set_zoom(0.52).unwrap();
        ed.handle_wheel(100.0, Point::ORIGIN);
        assert!(ed.store().zoom() < 0.5);
        assert_eq!(ed.store().depth(), 0);
    }

    #[test]
    fn test_buttons_ignore_thresholds() {
        let mut ed = editor();
        ed.set_zoom(1.95).unwrap();
        ed.zoom_in();
        assert!(ed.store().zoom() > 2.0);
        assert_eq!(ed.store().depth(), 0);

        ed.zoom_out();
        assert!((ed.store().zoom() - 1.95 * 1.1 * 0.9).abs() < EPSILON);
        assert!(ed.set_zoom(0.0).is_err());
        assert!(ed.set_zoom(f64::NAN).is_err());
    }

    #[test]
    fn test_manual_depth_may_go_negative() {
        let mut ed = editor();
        ed.decrease_depth();
        ed.decrease_depth();
        assert_eq!(ed.store().depth(), -2);
        ed.increase_depth();
        assert_eq!(ed.store().depth(), -1);
    }

    #[test]
    fn test_toggle_edit_mode() {
        let mut ed = editor();
        assert_eq!(ed.mode(), ViewMode::View);
        ed.toggle_edit_mode();
        assert_eq!(ed.mode(), ViewMode::Edit);
        ed.set_edit_mode(false);
        assert_eq!(ed.mode(), ViewMode::View);
    }

    #[test]
    fn test_jump_to_object_centers_it() {
        let mut ed = editor();
        let id = ed.add_object(ObjectSpec::rect(500.0, -40.0, 10.0, 10.0).with_depth(3));
        ed.set_zoom(4.0).unwrap();
        ed.jump_to_object(&id).unwrap();

        let vp = ed.store().viewport();
        assert_eq!(vp.depth, 3);
        assert_eq!(vp.zoom, 1.0);
        assert_eq!(vp.pan, Point::new(-100.0, 340.0));

        let missing = ObjectId::from("1712345678901");
        assert!(matches!(
            ed.jump_to_object(&missing),
            Err(EditorError::Scene(SceneError::NotFound(_)))
        ));
    }

    #[test]
    fn test_object_summaries_mark_current_depth() {
        let mut ed = editor();
        ed.add_object(ObjectSpec::circle(0.0, 0.0, 5.0));
        ed.add_object(ObjectSpec::rect(0.0, 0.0, 5.0, 5.0).with_depth(1));
        let rows = ed.object_summaries();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, ShapeKind::Circle);
        assert!(rows[0].current);
        assert_eq!(rows[1].depth, 1);
        assert!(!rows[1].current);
    }

    #[test]
    fn test_pointer_pans_empty_canvas() {
        let mut ed = editor();
        ed.pointer_down(Point::new(10.0, 10.0));
        ed.pointer_move(Point::new(30.0, 40.0));
        ed.pointer_up();
        assert_eq!(ed.store().pan(), Point::new(20.0, 30.0));
        assert_eq!(ed.selection(), None);
    }

    #[test]
    fn test_pointer_drags_object() {
        let mut ed = editor();
        let id = ed.add_object(ObjectSpec::circle(100.0, 100.0, 20.0));
        ed.set_edit_mode(true);
        ed.pointer_down(Point::new(100.0, 100.0));
        assert_eq!(ed.selection(), Some(&id));
        ed.pointer_move(Point::new(110.0, 95.0));
        ed.pointer_leave();
        ed.pointer_move(Point::new(500.0, 500.0));

        let obj = ed.store().object(&id).unwrap();
        assert_eq!(obj.anchor(), Point::new(110.0, 95.0));
        assert_eq!(ed.store().pan(), Point::ORIGIN);
    }

    #[test]
    fn test_go_to_bookmark_arrives() {
        let mut ed = editor();
        ed.add_object(ObjectSpec::circle(0.0, 0.0, 5.0));
        assert_eq!(ed.add_bookmark(), 0);

        ed.set_zoom(3.0).unwrap();
        ed.set_depth(2);
        ed.go_to_bookmark(0, Some(100.0), 0.0).unwrap();
        assert_eq!(ed.tick(50.0), AnimationStatus::Running);
        assert_eq!(ed.store().depth(), 2);
        assert_eq!(
            ed.tick(100.0),
            AnimationStatus::Arrived { index: 0, remaining: 0 }
        );
        assert!((ed.store().zoom() - 1.0).abs() < EPSILON);
        assert_eq!(ed.store().depth(), 0);
        assert!(!ed.is_animating());

        assert!(matches!(
            ed.go_to_bookmark(5, None, 0.0),
            Err(EditorError::BookmarkIndex(5))
        ));
    }

    #[test]
    fn test_play_sequence_chains_steps() {
        let mut ed = editor();
        assert!(!ed.play_sequence(0.0));

        ed.add_bookmark();
        ed.set_zoom(2.0).unwrap();
        ed.set_depth(1);
        ed.add_bookmark();
        ed.set_zoom(1.0).unwrap();
        ed.set_depth(0);

        ed.set_animation_speed(10.0);
        assert_eq!(ed.animation_speed_ms(), MIN_ANIMATION_SPEED_MS);

        assert!(ed.play_sequence(0.0));
        assert_eq!(
            ed.tick(500.0),
            AnimationStatus::Arrived { index: 0, remaining: 1 }
        );
        // Dwell before the next step.
        assert_eq!(ed.tick(550.0), AnimationStatus::Running);
        assert_eq!(ed.tick(600.0), AnimationStatus::Running);
        assert_eq!(
            ed.tick(1100.0),
            AnimationStatus::Arrived { index: 1, remaining: 0 }
        );
        assert_eq!(ed.store().depth(), 1);
        assert!((ed.store().zoom() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_reorder_bookmarks() {
        let mut ed = editor();
        ed.add_bookmark();
        ed.set_depth(4);
        ed.add_bookmark();
        ed.reorder_bookmarks(1, 0).unwrap();
        assert_eq!(ed.bookmarks().get(0).unwrap().depth, 4);
        assert!(matches!(
            ed.reorder_bookmarks(0, 7),
            Err(EditorError::BookmarkIndex(7))
        ));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut ed = editor();
        ed.add_object(ObjectSpec::circle(1.5, 2.5, 3.0));
        ed.add_object(ObjectSpec::rect(-4.0, 4.0, 8.0, 2.0).with_depth(1));
        ed.add_bookmark();
        ed.handle_wheel(-1.0, Point::new(13.0, 7.0));

        let mut buf = Vec::new();
        ed.export_project(&mut buf).unwrap();

        let mut other = editor();
        other.import_project(buf.as_slice()).unwrap();
        assert_eq!(other.project_data(), ed.project_data());
    }

    #[test]
    fn test_failed_import_leaves_state() {
        let mut ed = editor();
        let id = ed.add_object(ObjectSpec::circle(0.0, 0.0, 5.0));
        ed.add_bookmark();
        ed.set_zoom(1.5).unwrap();

        let bad = br#"{ "canvasObjects": [], "bookmarks": [], "currentDepth": 0, "zoom": -1, "position": { "x": 0, "y": 0 } }"#;
        assert!(matches!(
            ed.import_project(&bad[..]),
            Err(EditorError::Project(_))
        ));
        assert!(ed.import_project(&b"not json"[..]).is_err());

        assert!(ed.store().object(&id).is_some());
        assert_eq!(ed.bookmarks().len(), 1);
        assert_eq!(ed.store().zoom(), 1.5);
    }

    #[test]
    fn test_import_cancels_animation_and_selection() {
        let mut ed = editor();
        ed.add_object(ObjectSpec::circle(0.0, 0.0, 50.0));
        ed.add_bookmark();
        ed.set_edit_mode(true);
        ed.pointer_down(Point::ORIGIN);
        ed.go_to_bookmark(0, None, 0.0).unwrap();
        assert!(ed.selection().is_some());
        assert!(ed.is_animating());

        let data = ProjectData {
            canvas_objects: Vec::new(),
            bookmarks: Vec::new(),
            current_depth: 2,
            zoom: 0.75,
            position: Point::new(3.0, 4.0),
        };
        ed.load(data);
        assert!(ed.selection().is_none());
        assert!(!ed.is_animating());
        assert_eq!(ed.store().depth(), 2);
        assert_eq!(ed.store().object_count(), 0);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(strata_io::EXPORT_FILE_NAME);
        let mut ed = editor();
        ed.add_object(ObjectSpec::rect(1.0, 2.0, 3.0, 4.0));
        ed.export_to_file(&path).unwrap();

        let mut other = editor();
        other.import_from_file(&path).unwrap();
        assert_eq!(other.store().object_count(), 1);
    }

    #[test]
    fn test_render_skips_other_depths_in_view_mode() {
        let mut ed = editor();
        ed.add_object(ObjectSpec::circle(10.0, 10.0, 5.0));
        ed.add_object(ObjectSpec::circle(10.0, 10.0, 5.0).with_depth(1));
        let mut surface = RecordingSurface::new(64, 64);
        let stats = ed.render(&mut surface);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.hidden, 1);

        ed.toggle_edit_mode();
        let stats = ed.render(&mut surface);
        assert_eq!(stats.drawn, 2);
    }

    #[test]
    fn test_wheel_keeps_zoom_positive() {
        let mut config = EditorConfig::default();
        config.zoom_out_factor = 0.0;
        let mut ed = Editor::new(config);
        ed.handle_wheel(100.0, Point::new(5.0, 5.0));
        assert_eq!(ed.store().zoom(), 1.0);
        assert_eq!(ed.store().pan(), Point::ORIGIN);
    }

    #[test]
    fn test_custom_thresholds() {
        let mut config = EditorConfig::default();
        config.thresholds = DepthThresholds {
            zoom_in: 1.05,
            zoom_out: 0.5,
        };
        let mut ed = Editor::new(config);
        ed.handle_wheel(-1.0, Point::ORIGIN);
        assert_eq!(ed.store().depth(), 1);
    }
}
