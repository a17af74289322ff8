use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::geometry::{BBox, Point};

/// Unique, stable object identifier.
///
/// Opaque text. Fresh ids are UUIDs, but any string is accepted from a
/// project file, and so are integer ids, which read as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ObjectId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer object id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
                Ok(ObjectId::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ObjectId, E> {
                Ok(ObjectId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ObjectId, E> {
                Ok(ObjectId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ObjectId, E> {
                Ok(ObjectId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Opaque handle to image content: a `data:` URI or a file path.
/// Resolved to pixels by the renderer's decode cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageContent(String);

impl ImageContent {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data URIs can be megabytes long.
        match self.0.char_indices().nth(48) {
            Some((end, _)) => write!(f, "{}…", &self.0[..end]),
            None => f.write_str(&self.0),
        }
    }
}

/// Shape-specific geometry. Each variant carries exactly the fields its
/// type needs, so a circle without a radius cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Circle {
        radius: f64,
    },
    Rect {
        width: f64,
        height: f64,
    },
    #[serde(alias = "svg")]
    Image {
        width: f64,
        height: f64,
        #[serde(rename = "svgContent")]
        content: ImageContent,
    },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Image { .. } => ShapeKind::Image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Circle,
    Rect,
    Image,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Circle => f.write_str("circle"),
            ShapeKind::Rect => f.write_str("rect"),
            ShapeKind::Image => f.write_str("image"),
        }
    }
}

/// Everything about an object except its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    #[serde(flatten)]
    pub shape: Shape,
    /// Center for circles, top-left corner otherwise.
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub depth: i32,
    pub stroke_width: f64,
}

impl ObjectSpec {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::with_shape(Shape::Circle { radius }, x, y)
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::with_shape(Shape::Rect { width, height }, x, y)
    }

    pub fn image(x: f64, y: f64, width: f64, height: f64, content: ImageContent) -> Self {
        Self::with_shape(
            Shape::Image {
                width,
                height,
                content,
            },
            x,
            y,
        )
    }

    fn with_shape(shape: Shape, x: f64, y: f64) -> Self {
        Self {
            shape,
            x,
            y,
            color: Color::BLACK,
            depth: 0,
            stroke_width: 1.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }
}

/// A shape placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub depth: i32,
    pub stroke_width: f64,
}

impl CanvasObject {
    pub fn from_spec(id: ObjectId, spec: ObjectSpec) -> Self {
        Self {
            id,
            shape: spec.shape,
            x: spec.x,
            y: spec.y,
            color: spec.color,
            depth: spec.depth,
            stroke_width: spec.stroke_width,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bbox(&self) -> BBox {
        match &self.shape {
            Shape::Circle { radius } => BBox::new(
                Point::new(self.x - radius, self.y - radius),
                Point::new(self.x + radius, self.y + radius),
            ),
            Shape::Rect { width, height } | Shape::Image { width, height, .. } => {
                BBox::from_origin_size(self.anchor(), *width, *height)
            }
        }
    }

    /// Exact shape containment of a world-space point.
    pub fn contains_point(&self, p: &Point) -> bool {
        match &self.shape {
            Shape::Circle { radius } => self.anchor().distance_to(p) <= *radius,
            Shape::Rect { .. } | Shape::Image { .. } => self.bbox().contains_point(p),
        }
    }

    pub fn translate(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
    }

    pub fn apply(&mut self, patch: ObjectPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(depth) = patch.depth {
            self.depth = depth;
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width;
        }
        if let Some(shape) = patch.shape {
            self.shape = shape;
        }
    }
}

/// Partial update for a [`CanvasObject`]. The id is never patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<Color>,
    pub depth: Option<i32>,
    pub stroke_width: Option<f64>,
    pub shape: Option<Shape>,
}

impl ObjectPatch {
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_at(x: f64, y: f64, radius: f64) -> CanvasObject {
        CanvasObject::from_spec(ObjectId::new_v4(), ObjectSpec::circle(x, y, radius))
    }

    #[test]
    fn test_circle_containment() {
        let c = circle_at(100.0, 100.0, 20.0);
        assert!(c.contains_point(&Point::new(115.0, 100.0)));
        assert!(c.contains_point(&Point::new(120.0, 100.0)));
        assert!(!c.contains_point(&Point::new(125.0, 100.0)));
    }

    #[test]
    fn test_rect_containment_inclusive_edges() {
        let r = CanvasObject::from_spec(ObjectId::new_v4(), ObjectSpec::rect(10.0, 10.0, 30.0, 20.0));
        assert!(r.contains_point(&Point::new(10.0, 10.0)));
        assert!(r.contains_point(&Point::new(40.0, 30.0)));
        assert!(!r.contains_point(&Point::new(40.1, 30.0)));
    }

    #[test]
    fn test_circle_bbox() {
        let bb = circle_at(0.0, 0.0, 5.0).bbox();
        assert!((bb.min.x + 5.0).abs() < 1e-10);
        assert!((bb.max.y - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_json_shape_tags() {
        let obj = CanvasObject::from_spec(
            ObjectId::new_v4(),
            ObjectSpec::image(1.0, 2.0, 3.0, 4.0, ImageContent::new("data:image/png;base64,AA")),
        );
        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["svgContent"], "data:image/png;base64,AA");
        assert_eq!(value["strokeWidth"], 1.0);
        let back: CanvasObject = serde_json::from_value(value).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn test_missing_shape_field_is_rejected() {
        let json = r##"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","type":"circle",
            "x":0,"y":0,"color":"#000000","depth":0,"strokeWidth":1}"##;
        assert!(serde_json::from_str::<CanvasObject>(json).is_err());
    }

    #[test]
    fn test_svg_alias_accepted() {
        let json = r##"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","type":"svg",
            "x":0,"y":0,"color":"#000000","depth":1,"strokeWidth":2,
            "width":10,"height":10,"svgContent":"logo.png"}"##;
        let obj: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.kind(), ShapeKind::Image);
    }

    #[test]
    fn test_timestamp_ids_accepted() {
        let json = r##"{"id":"1712345678901","type":"circle","radius":5,
            "x":0,"y":0,"color":"#000000","depth":0,"strokeWidth":1}"##;
        let obj: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.id, ObjectId::from("1712345678901"));

        let numeric = json.replace(r#""1712345678901""#, "1712345678901");
        let obj: CanvasObject = serde_json::from_str(&numeric).unwrap();
        assert_eq!(obj.id.as_str(), "1712345678901");
        assert_eq!(serde_json::to_value(&obj).unwrap()["id"], "1712345678901");
    }

    #[test]
    fn test_patch_keeps_untouched_fields() {
        let mut c = circle_at(1.0, 2.0, 3.0);
        c.apply(ObjectPatch {
            depth: Some(4),
            ..Default::default()
        });
        assert_eq!(c.depth, 4);
        assert_eq!(c.anchor(), Point::new(1.0, 2.0));
    }
}
