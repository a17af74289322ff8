use image::RgbaImage;
use serde::{Deserialize, Serialize};
use strata_core::{Color, Point};

use crate::surface::Surface;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Clear { color: Color },
    PushTransform { translate: Point, scale: f64 },
    PopTransform,
    SetAlpha { alpha: f32 },
    FillCircle { center: Point, radius: f64, color: Color },
    FillRect { origin: Point, width: f64, height: f64, color: Color },
    StrokeCircle { center: Point, radius: f64, line_width: f64, color: Color },
    StrokeRect { origin: Point, width: f64, height: f64, line_width: f64, color: Color },
    /// Pixel data is not recorded, only where it went and its size.
    DrawImage { origin: Point, width: f64, height: f64, pixels: (u32, u32) },
}

/// A frame's display list, serializable for inspection or replay elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Net transform depth after all commands; zero for a balanced frame.
    pub fn transform_depth(&self) -> i64 {
        self.commands.iter().fold(0, |depth, cmd| match cmd {
            DrawCommand::PushTransform { .. } => depth + 1,
            DrawCommand::PopTransform => depth - 1,
            _ => depth,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A [`Surface`] that records calls instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    frame: RenderFrame,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RenderFrame::empty(width, height),
        }
    }

    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.frame.commands
    }

    fn record(&mut self, cmd: DrawCommand) {
        self.frame.commands.push(cmd);
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn clear(&mut self, color: Color) {
        self.frame.commands.clear();
        self.record(DrawCommand::Clear { color });
    }

    fn push_transform(&mut self, translate: Point, scale: f64) {
        self.record(DrawCommand::PushTransform { translate, scale });
    }

    fn pop_transform(&mut self) {
        self.record(DrawCommand::PopTransform);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.record(DrawCommand::SetAlpha { alpha });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.record(DrawCommand::FillCircle { center, radius, color });
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Color) {
        self.record(DrawCommand::FillRect { origin, width, height, color });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: Color) {
        self.record(DrawCommand::StrokeCircle { center, radius, line_width, color });
    }

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, line_width: f64, color: Color) {
        self.record(DrawCommand::StrokeRect { origin, width, height, line_width, color });
    }

    fn draw_image(&mut self, image: &RgbaImage, origin: Point, width: f64, height: f64) {
        self.record(DrawCommand::DrawImage {
            origin,
            width,
            height,
            pixels: image.dimensions(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_restarts_recording() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.fill_rect(Point::ORIGIN, 1.0, 1.0, Color::RED);
        surface.clear(Color::WHITE);
        surface.push_transform(Point::new(2.0, 3.0), 0.5);
        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.frame().transform_depth(), 1);
    }

    #[test]
    fn test_json_tags_ops() {
        let mut surface = RecordingSurface::new(4, 4);
        surface.stroke_circle(Point::new(1.0, 1.0), 2.0, 0.25, Color::BLACK);
        let json = surface.frame().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let cmd = &value["commands"][0];
        assert_eq!(cmd["op"], "strokeCircle");
        assert_eq!(cmd["color"], "#000000");
        assert_eq!(cmd["line_width"], 0.25);
    }
}
