use serde::{Deserialize, Serialize};
use strata_core::geometry::{screen_to_world, world_to_screen};
use strata_core::{BBox, Point, ViewportState};

/// The viewport together with the size of the surface it is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen pixels per world unit.
    pub zoom: f64,
    /// Screen position of the world origin.
    pub pan: Point,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ORIGIN,
            canvas_width,
            canvas_height,
        }
    }

    pub fn from_state(state: &ViewportState, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            zoom: state.zoom,
            pan: state.pan,
            canvas_width,
            canvas_height,
        }
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen_to_world(screen, self.pan, self.zoom)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world_to_screen(world, self.pan, self.zoom)
    }

    /// Center of the canvas in screen coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0)
    }

    /// Pan that puts `world` at the canvas center at the current zoom.
    pub fn pan_centering(&self, world: Point) -> Point {
        self.center() - world * self.zoom
    }

    /// The visible region in world coordinates.
    pub fn visible_bounds(&self) -> BBox {
        let min = self.screen_to_world(Point::ORIGIN);
        let max = self.screen_to_world(Point::new(self.canvas_width, self.canvas_height));
        BBox::new(min, max)
    }
}
