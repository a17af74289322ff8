//! Timed viewport transitions between bookmarks.
//!
//! The animator is stepped from an animation-frame clock with millisecond
//! timestamps. A transition eases zoom and pan from wherever the viewport is
//! when it starts; on arrival it switches depth and restores the bookmark's
//! objects. Sequences advance on arrival, not on a timer, so slow frames
//! delay the tour instead of letting steps overlap.

use std::collections::VecDeque;

use crate::bookmark::Bookmark;
use crate::geometry::{ease_in_out_cubic, lerp, lerp_point, Point};
use crate::scene::{SceneStore, ViewportPatch};

/// Result of one animation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Idle,
    Running,
    /// Step `index` of the current run reached its target; `remaining`
    /// steps are still queued.
    Arrived { index: usize, remaining: usize },
}

#[derive(Debug, Clone)]
struct Transition {
    index: usize,
    target: Bookmark,
    start_zoom: f64,
    start_pan: Point,
    start_time: f64,
    duration_ms: f64,
}

impl Transition {
    fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration_ms).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Animating(Transition),
    /// Pause between two sequence steps.
    Dwelling { until: f64 },
}

#[derive(Debug, Clone)]
pub struct ViewportAnimator {
    state: State,
    queue: VecDeque<Bookmark>,
    step_duration_ms: f64,
    dwell_ms: f64,
    next_index: usize,
}

impl ViewportAnimator {
    pub fn new(dwell_ms: f64) -> Self {
        Self {
            state: State::Idle,
            queue: VecDeque::new(),
            step_duration_ms: 0.0,
            dwell_ms: dwell_ms.max(0.0),
            next_index: 0,
        }
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Start a transition to `target`, replacing anything in flight. The new
    /// transition starts from the store's current values, so a preempted
    /// transition hands over without a jump.
    pub fn go_to(&mut self, target: Bookmark, duration_ms: f64, now: f64, store: &SceneStore) {
        if self.is_animating() {
            log::debug!("Preempting running transition");
        }
        self.queue.clear();
        self.next_index = 0;
        self.begin(target, duration_ms, now, store);
    }

    /// Visit `targets` in order, each taking `step_duration_ms`, starting the
    /// next one only after the previous has arrived (plus the dwell).
    pub fn play_sequence(
        &mut self,
        targets: Vec<Bookmark>,
        step_duration_ms: f64,
        now: f64,
        store: &SceneStore,
    ) {
        self.cancel();
        self.queue = targets.into();
        self.step_duration_ms = step_duration_ms;
        log::info!("Playing sequence of {} bookmarks", self.queue.len());
        if let Some(first) = self.queue.pop_front() {
            self.begin(first, step_duration_ms, now, store);
        }
    }

    /// Stop immediately. The viewport keeps its last written value.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
        self.queue.clear();
        self.next_index = 0;
    }

    pub fn step(&mut self, now: f64, store: &mut SceneStore) -> AnimationStatus {
        if let State::Dwelling { until } = self.state {
            if now < until {
                return AnimationStatus::Running;
            }
            match self.queue.pop_front() {
                Some(next) => self.begin(next, self.step_duration_ms, now, store),
                None => self.state = State::Idle,
            }
        }

        let State::Animating(transition) = &self.state else {
            return AnimationStatus::Idle;
        };

        let progress = transition.progress(now);
        let eased = ease_in_out_cubic(progress);
        store.set_viewport(ViewportPatch {
            zoom: Some(lerp(transition.start_zoom, transition.target.zoom, eased)),
            pan: Some(lerp_point(transition.start_pan, transition.target.position, eased)),
            ..Default::default()
        });

        if progress < 1.0 {
            return AnimationStatus::Running;
        }

        let index = transition.index;
        let target = transition.target.clone();
        store.set_viewport(ViewportPatch {
            depth: Some(target.depth),
            ..Default::default()
        });
        store.replace_objects_at_depth(target.depth, target.objects);
        log::info!("Arrived at step {} (depth {})", index, target.depth);

        let remaining = self.queue.len();
        if remaining == 0 {
            self.state = State::Idle;
            self.next_index = 0;
        } else if self.dwell_ms > 0.0 {
            self.state = State::Dwelling {
                until: now + self.dwell_ms,
            };
        } else if let Some(next) = self.queue.pop_front() {
            self.begin(next, self.step_duration_ms, now, store);
        }
        AnimationStatus::Arrived { index, remaining }
    }

    fn begin(&mut self, target: Bookmark, duration_ms: f64, now: f64, store: &SceneStore) {
        let vp = store.viewport();
        let index = self.next_index;
        self.next_index += 1;
        log::debug!(
            "Transition {}: zoom {:.3} -> {:.3} over {}ms",
            index,
            vp.zoom,
            target.zoom,
            duration_ms
        );
        self.state = State::Animating(Transition {
            index,
            target,
            start_zoom: vp.zoom,
            start_pan: vp.pan,
            start_time: now,
            duration_ms,
        });
    }
}

impl Default for ViewportAnimator {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CanvasObject, ObjectId, ObjectSpec};

    fn target(zoom: f64, x: f64, depth: i32) -> Bookmark {
        Bookmark {
            name: None,
            zoom,
            position: Point::new(x, 0.0),
            objects: vec![CanvasObject::from_spec(
                ObjectId::new_v4(),
                ObjectSpec::circle(x, 0.0, 1.0).with_depth(depth),
            )],
            depth,
        }
    }

    #[test]
    fn test_go_to_reaches_target() {
        let mut store = SceneStore::new();
        store.add_object(ObjectSpec::rect(0.0, 0.0, 1.0, 1.0).with_depth(2));
        let bm = target(3.0, 200.0, 2);
        let mut anim = ViewportAnimator::new(0.0);
        anim.go_to(bm.clone(), 1000.0, 0.0, &store);

        assert_eq!(anim.step(0.0, &mut store), AnimationStatus::Running);
        assert_eq!(store.zoom(), 1.0);

        assert_eq!(anim.step(500.0, &mut store), AnimationStatus::Running);
        assert!((store.zoom() - 2.0).abs() < 1e-9);
        assert!((store.pan().x - 100.0).abs() < 1e-9);
        assert_eq!(store.depth(), 0);

        assert_eq!(
            anim.step(1000.0, &mut store),
            AnimationStatus::Arrived { index: 0, remaining: 0 }
        );
        assert_eq!(store.zoom(), 3.0);
        assert_eq!(store.depth(), 2);
        assert_eq!(store.objects_at_depth(2).cloned().collect::<Vec<_>>(), bm.objects);
        assert!(!anim.is_animating());
        assert_eq!(anim.step(1100.0, &mut store), AnimationStatus::Idle);
    }

    #[test]
    fn test_zero_duration_arrives_immediately() {
        let mut store = SceneStore::new();
        let mut anim = ViewportAnimator::new(0.0);
        anim.go_to(target(4.0, 10.0, 1), 0.0, 0.0, &store);
        assert!(matches!(anim.step(0.0, &mut store), AnimationStatus::Arrived { .. }));
        assert_eq!(store.zoom(), 4.0);
    }

    #[test]
    fn test_preempting_starts_from_current_values() {
        let mut store = SceneStore::new();
        let mut anim = ViewportAnimator::new(0.0);
        anim.go_to(target(5.0, 400.0, 1), 1000.0, 0.0, &store);
        anim.step(300.0, &mut store);
        let mid = store.viewport();
        assert!(mid.zoom > 1.0 && mid.zoom < 5.0);

        anim.go_to(target(1.0, -100.0, 0), 1000.0, 300.0, &store);
        match &anim.state {
            State::Animating(t) => {
                assert_eq!(t.start_zoom, mid.zoom);
                assert_eq!(t.start_pan, mid.pan);
            }
            other => panic!("expected a running transition, got {:?}", other),
        }
        anim.step(300.0, &mut store);
        assert_eq!(store.viewport(), mid);

        // The preempted transition never completes.
        let status = anim.step(1300.0, &mut store);
        assert_eq!(status, AnimationStatus::Arrived { index: 0, remaining: 0 });
        assert_eq!(store.zoom(), 1.0);
        assert_eq!(store.depth(), 0);
    }

    #[test]
    fn test_cancel_leaves_last_written_value() {
        let mut store = SceneStore::new();
        let mut anim = ViewportAnimator::new(0.0);
        anim.go_to(target(3.0, 100.0, 1), 1000.0, 0.0, &store);
        anim.step(250.0, &mut store);
        let frozen = store.viewport();
        anim.cancel();
        assert_eq!(anim.step(2000.0, &mut store), AnimationStatus::Idle);
        assert_eq!(store.viewport(), frozen);
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn test_sequence_chains_on_arrival() {
        let mut store = SceneStore::new();
        let mut anim = ViewportAnimator::new(100.0);
        let stops = vec![target(2.0, 10.0, 0), target(3.0, 20.0, 1), target(0.8, 30.0, 2)];
        anim.play_sequence(stops, 1000.0, 0.0, &store);

        assert_eq!(
            anim.step(1000.0, &mut store),
            AnimationStatus::Arrived { index: 0, remaining: 2 }
        );
        // Dwelling: the viewport holds at the first stop.
        assert_eq!(anim.step(1050.0, &mut store), AnimationStatus::Running);
        assert_eq!(store.zoom(), 2.0);

        // A long stall does not skip the second step.
        assert_eq!(anim.step(5000.0, &mut store), AnimationStatus::Running);
        assert_eq!(store.zoom(), 2.0);
        assert_eq!(anim.step(5500.0, &mut store), AnimationStatus::Running);
        assert!((store.zoom() - 2.5).abs() < 1e-9);
        assert_eq!(
            anim.step(6000.0, &mut store),
            AnimationStatus::Arrived { index: 1, remaining: 1 }
        );
        assert_eq!(store.depth(), 1);

        anim.step(6100.0, &mut store);
        assert_eq!(
            anim.step(7100.0, &mut store),
            AnimationStatus::Arrived { index: 2, remaining: 0 }
        );
        assert_eq!(store.depth(), 2);
        assert!(!anim.is_animating());
    }

    #[test]
    fn test_go_to_during_sequence_drops_queue() {
        let mut store = SceneStore::new();
        let mut anim = ViewportAnimator::new(0.0);
        anim.play_sequence(vec![target(2.0, 0.0, 0), target(3.0, 0.0, 1)], 500.0, 0.0, &store);
        assert_eq!(anim.queued(), 1);
        anim.go_to(target(1.5, 0.0, 0), 500.0, 100.0, &store);
        assert_eq!(anim.queued(), 0);
        assert_eq!(
            anim.step(600.0, &mut store),
            AnimationStatus::Arrived { index: 0, remaining: 0 }
        );
    }
}
