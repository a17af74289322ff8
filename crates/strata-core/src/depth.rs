//! Semantic zoom: continuous zoom drives a discrete depth counter by
//! threshold crossing, and depth distance drives per-object opacity.

use serde::{Deserialize, Serialize};

use crate::scene::{SceneStore, ViewportPatch};

/// Whether the canvas is being edited or just viewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    View,
    Edit,
}

impl ViewMode {
    pub fn from_editing(editing: bool) -> Self {
        if editing {
            ViewMode::Edit
        } else {
            ViewMode::View
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, ViewMode::Edit)
    }
}

/// Zoom levels whose crossing changes the active depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DepthThresholds {
    /// Crossing upward past this zoom enters the next depth.
    pub zoom_in: f64,
    /// Crossing downward past this zoom returns to the previous depth.
    pub zoom_out: f64,
}

impl Default for DepthThresholds {
    fn default() -> Self {
        Self {
            zoom_in: 2.0,
            zoom_out: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStep {
    Deeper,
    Shallower,
    Stay,
}

impl DepthThresholds {
    /// Classify a zoom change. Only a crossing counts: moving around above
    /// `zoom_in` or below `zoom_out` never steps again.
    pub fn step(&self, old_zoom: f64, new_zoom: f64) -> DepthStep {
        if new_zoom > self.zoom_in && old_zoom <= self.zoom_in {
            DepthStep::Deeper
        } else if new_zoom < self.zoom_out && old_zoom >= self.zoom_out {
            DepthStep::Shallower
        } else {
            DepthStep::Stay
        }
    }

    /// Depth after applying `step`. The automatic path never goes below 0.
    pub fn next_depth(&self, depth: i32, step: DepthStep) -> i32 {
        match step {
            DepthStep::Deeper => depth.saturating_add(1),
            DepthStep::Shallower => depth.saturating_sub(1).max(0),
            DepthStep::Stay => depth,
        }
    }

    /// Write `new_zoom` into the store, stepping the depth if a threshold was
    /// crossed. Returns the step taken.
    pub fn apply_zoom(&self, store: &mut SceneStore, new_zoom: f64) -> DepthStep {
        let vp = store.viewport();
        let step = self.step(vp.zoom, new_zoom);
        let depth = self.next_depth(vp.depth, step);
        store.set_viewport(ViewportPatch {
            zoom: Some(new_zoom),
            depth: Some(depth),
            ..Default::default()
        });
        if step != DepthStep::Stay {
            log::info!("Zoom {:.3} -> {:.3}: depth {} -> {}", vp.zoom, new_zoom, vp.depth, depth);
        }
        step
    }
}

/// Opacity of an object at `object_depth` while `active_depth` is shown.
///
/// View mode shows only the active depth. Edit mode fades neighbours
/// linearly, half per layer, so two layers away is fully transparent.
pub fn opacity(object_depth: i32, active_depth: i32, mode: ViewMode) -> f32 {
    let distance = (object_depth as i64 - active_depth as i64).unsigned_abs();
    match mode {
        ViewMode::View => {
            if distance == 0 {
                1.0
            } else {
                0.0
            }
        }
        ViewMode::Edit => (1.0 - 0.5 * distance as f32).max(0.0),
    }
}

pub fn is_visible(object_depth: i32, active_depth: i32, mode: ViewMode) -> bool {
    opacity(object_depth, active_depth, mode) > 0.0
}
