//! Strata CLI
//!
//! Inspect a project file, render its saved view to PNG, or play its
//! bookmarks as a sequence and write every frame.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use strata_core::{AnimationStatus, BookmarkList};
use strata_editor::{Editor, EditorConfig};
use strata_renderer::{FrameStats, RasterSurface, RecordingSurface};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List the objects and bookmarks in a project
    Info {
        project: PathBuf,
    },
    /// Render the project's saved view to a PNG
    Render {
        project: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        #[clap(long, default_value_t = 1280)]
        width: u32,
        #[clap(long, default_value_t = 720)]
        height: u32,
        /// Show neighbouring depths faded, as in edit mode
        #[clap(long)]
        edit: bool,
        #[clap(long)]
        config: Option<PathBuf>,
        /// Also write the frame's draw commands as JSON
        #[clap(long)]
        display_list: Option<PathBuf>,
    },
    /// Play every bookmark in order and write one PNG per frame
    Tour {
        project: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        #[clap(long, default_value_t = 30)]
        fps: u32,
        /// Duration of each step in milliseconds
        #[clap(long)]
        speed: Option<f64>,
        #[clap(long, default_value_t = 1280)]
        width: u32,
        #[clap(long, default_value_t = 720)]
        height: u32,
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.cmd {
        Command::Info { project } => info(&project),
        Command::Render {
            project,
            output,
            width,
            height,
            edit,
            config,
            display_list,
        } => {
            let mut editor = open(&project, config.as_deref(), width, height)?;
            editor.set_edit_mode(edit);
            let mut surface = RasterSurface::new(width, height);
            let stats = render_settled(&mut editor, &mut surface);
            surface
                .save_png(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} ({} drawn, {} hidden, {} culled)",
                output.display(),
                stats.drawn,
                stats.hidden,
                stats.culled
            );

            if let Some(path) = display_list {
                let mut recording = RecordingSurface::new(width, height);
                editor.render(&mut recording);
                std::fs::write(&path, recording.frame().to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            Ok(())
        }
        Command::Tour {
            project,
            output,
            fps,
            speed,
            width,
            height,
            config,
        } => {
            let mut editor = open(&project, config.as_deref(), width, height)?;
            if let Some(speed) = speed {
                editor.set_animation_speed(speed);
            }
            tour(&mut editor, &output, fps, width, height)
        }
    }
}

fn open(project: &Path, config: Option<&Path>, width: u32, height: u32) -> Result<Editor> {
    let config = match config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let config = config.with_canvas_size(width as f64, height as f64);
    config.validate().context("invalid canvas size")?;
    let mut editor = Editor::new(config);
    editor
        .import_from_file(project)
        .with_context(|| format!("importing {}", project.display()))?;
    Ok(editor)
}

fn info(project: &Path) -> Result<()> {
    let editor = open(project, None, 1280, 720)?;
    let vp = editor.store().viewport();
    println!(
        "{}: zoom {:.3}, pan ({:.1}, {:.1}), depth {}",
        project.display(),
        vp.zoom,
        vp.pan.x,
        vp.pan.y,
        vp.depth
    );

    println!("Objects ({}):", editor.store().object_count());
    for row in editor.object_summaries() {
        let marker = if row.current { "*" } else { " " };
        println!(" {} {} {} (depth {})", marker, row.id, row.kind, row.depth);
    }

    println!("Bookmarks ({}):", editor.bookmarks().len());
    for line in bookmark_lines(editor.bookmarks()) {
        println!("{}", line);
    }
    Ok(())
}

fn bookmark_lines(bookmarks: &BookmarkList) -> Vec<String> {
    bookmarks
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, bookmark)| format!("  {}", bookmark.label(i)))
        .collect()
}

/// Render, then if images were still decoding, wait and render again.
fn render_settled(editor: &mut Editor, surface: &mut RasterSurface) -> FrameStats {
    let stats = editor.render(surface);
    if stats.pending_images == 0 {
        return stats;
    }
    editor.wait_for_images();
    editor.render(surface)
}

fn tour(editor: &mut Editor, dir: &Path, fps: u32, width: u32, height: u32) -> Result<()> {
    if fps == 0 {
        bail!("--fps must be at least 1");
    }
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    if !editor.play_sequence(0.0) {
        bail!("project has no bookmarks");
    }

    let frame_ms = 1000.0 / fps as f64;
    let mut surface = RasterSurface::new(width, height);
    let mut frame = 0u32;
    loop {
        let status = editor.tick(frame as f64 * frame_ms);
        if let AnimationStatus::Arrived { index, remaining } = status {
            log::info!("Reached bookmark {} ({} to go)", index, remaining);
        }
        render_settled(editor, &mut surface);
        let path = dir.join(format!("frame_{:05}.png", frame));
        surface
            .save_png(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        frame += 1;
        if !editor.is_animating() {
            break;
        }
    }
    println!("Wrote {} frames to {}", frame, dir.display());
    Ok(())
}
