//! # Strata I/O
//!
//! Reading and writing the single-document JSON project format used for
//! export and import.

pub mod project;

pub use project::{
    load_project, save_project, ProjectData, ProjectError, ProjectReader, ProjectWriter,
    EXPORT_FILE_NAME,
};
