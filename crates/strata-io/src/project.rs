//! The project document: every object, every bookmark, and the viewport.
//!
//! ```json
//! { "canvasObjects": [...], "bookmarks": [...],
//!   "currentDepth": 0, "zoom": 1.0, "position": { "x": 0.0, "y": 0.0 } }
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{Bookmark, CanvasObject, Point, Shape, ViewportState};
use thiserror::Error;

/// Default file name offered when exporting.
pub const EXPORT_FILE_NAME: &str = "infinite_canvas_project.json";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed project file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid project: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub canvas_objects: Vec<CanvasObject>,
    pub bookmarks: Vec<Bookmark>,
    pub current_depth: i32,
    pub zoom: f64,
    pub position: Point,
}

impl ProjectData {
    pub fn viewport(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom,
            pan: self.position,
            depth: self.current_depth,
        }
    }

    /// Shape checks that JSON typing alone cannot express.
    pub fn validate(&self) -> Result<(), ProjectError> {
        check_viewport("project", self.zoom, &self.position)?;

        let mut ids = HashSet::new();
        for object in &self.canvas_objects {
            check_object(object)?;
            if !ids.insert(&object.id) {
                return Err(ProjectError::Invalid(format!(
                    "object id {} appears twice",
                    object.id
                )));
            }
        }

        for (i, bookmark) in self.bookmarks.iter().enumerate() {
            check_viewport(&format!("bookmark {}", i + 1), bookmark.zoom, &bookmark.position)?;
            for object in &bookmark.objects {
                check_object(object)?;
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let data: ProjectData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }
}

fn check_viewport(what: &str, zoom: f64, position: &Point) -> Result<(), ProjectError> {
    if !(zoom.is_finite() && zoom > 0.0) {
        return Err(ProjectError::Invalid(format!("{} zoom must be positive, got {}", what, zoom)));
    }
    if !position.is_finite() {
        return Err(ProjectError::Invalid(format!("{} position is not finite", what)));
    }
    Ok(())
}

fn check_object(object: &CanvasObject) -> Result<(), ProjectError> {
    let invalid = |msg: &str| ProjectError::Invalid(format!("object {}: {}", object.id, msg));

    if !object.anchor().is_finite() {
        return Err(invalid("position is not finite"));
    }
    if !(object.stroke_width.is_finite() && object.stroke_width >= 0.0) {
        return Err(invalid("strokeWidth must be a non-negative number"));
    }
    let sizes_ok = match &object.shape {
        Shape::Circle { radius } => radius.is_finite() && *radius >= 0.0,
        Shape::Rect { width, height } | Shape::Image { width, height, .. } => {
            width.is_finite() && height.is_finite() && *width >= 0.0 && *height >= 0.0
        }
    };
    if !sizes_ok {
        return Err(invalid("size must be a non-negative number"));
    }
    Ok(())
}

/// Reads a project document from any byte source.
pub struct ProjectReader<R: Read> {
    reader: R,
}

impl<R: Read> ProjectReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read(self) -> Result<ProjectData, ProjectError> {
        let data: ProjectData = serde_json::from_reader(self.reader)?;
        data.validate()?;
        log::info!(
            "Read project: {} objects, {} bookmarks, depth {}",
            data.canvas_objects.len(),
            data.bookmarks.len(),
            data.current_depth
        );
        Ok(data)
    }
}

/// Writes a project document to any byte sink.
pub struct ProjectWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProjectWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(mut self, data: &ProjectData) -> Result<(), ProjectError> {
        serde_json::to_writer_pretty(&mut self.writer, data)?;
        self.writer.flush()?;
        log::info!(
            "Wrote project: {} objects, {} bookmarks",
            data.canvas_objects.len(),
            data.bookmarks.len()
        );
        Ok(())
    }
}

pub fn load_project(path: impl AsRef<Path>) -> Result<ProjectData, ProjectError> {
    let file = File::open(path.as_ref())?;
    ProjectReader::new(BufReader::new(file)).read()
}

pub fn save_project(path: impl AsRef<Path>, data: &ProjectData) -> Result<(), ProjectError> {
    let file = File::create(path.as_ref())?;
    ProjectWriter::new(BufWriter::new(file)).write(data)
}
