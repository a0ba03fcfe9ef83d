use crate::error::TransformError;
use crate::exif_container::ExifContainer;
use crate::task::{ConflictPolicy, Outcome, Task};
use crate::template::{parse_template, render_template};
use crate::thumbnail::render_thumbnail;
use chrono::{DateTime, Local};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::fs;
use std::path::{Path, PathBuf};

/// Runs the whole per-file pipeline for one task. Total: every error is
/// folded into `Outcome::Failure`, so nothing escapes into the dispatcher.
pub fn process_task(task: &Task) -> Outcome {
    let filename = basename(&task.source_path);
    match run(task) {
        Ok(outcome) => outcome,
        Err(err) => Outcome::Failure {
            message: format!("failed: {filename} ({err})"),
        },
    }
}

fn run(task: &Task) -> Result<Outcome, TransformError> {
    let original = fs::read(&task.source_path)?;

    // Unreadable EXIF is recoverable; undecodable pixels are not.
    let mut container = ExifContainer::from_jpeg_bytes(&original);
    let thumbnail = render_thumbnail(&original)?;

    container.ensure_orientation();
    let exif_blob = container.serialize_with_thumbnail(&thumbnail)?;

    // Swap only the APP1 segment. Every other segment, including the
    // entropy-coded pixel data, passes through byte-identical.
    let mut jpeg = Jpeg::from_bytes(Bytes::from(original))?;
    jpeg.set_exif(Some(Bytes::from(exif_blob)));
    let output = jpeg.encoder().bytes();

    let new_filename = output_filename(task)?;
    let out_dir = mirror_directory(task)?;
    let mut destination = out_dir.join(&new_filename);

    if destination.exists() {
        match task.conflict {
            ConflictPolicy::Skip => {
                return Ok(Outcome::SkippedExisting {
                    message: format!("skipped (already exists): {new_filename}"),
                });
            }
            ConflictPolicy::Overwrite => {}
            ConflictPolicy::Rename => destination = next_free_path(&destination),
        }
    }

    fs::write(&destination, &output)?;
    Ok(Outcome::Success {
        message: format!(
            "processed: {} -> {}",
            basename(&task.source_path),
            basename(&destination)
        ),
    })
}

/// Template rendering plus the original extension, e.g. "{name}-thumb" on
/// "IMG_0001.JPG" gives "IMG_0001-thumb.JPG".
fn output_filename(task: &Task) -> Result<String, TransformError> {
    let parts = parse_template(&task.template)?;
    let stem = task
        .source_path
        .file_stem()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string());
    let extension = task
        .source_path
        .extension()
        .map(|v| format!(".{}", v.to_string_lossy()))
        .unwrap_or_default();

    let rendered = render_template(&parts, &stem, file_modified(&task.source_path));
    Ok(format!("{rendered}{extension}"))
}

/// Mirrors the source's subdirectory path (relative to the input root) under
/// the output root, creating directories as needed.
fn mirror_directory(task: &Task) -> Result<PathBuf, TransformError> {
    let parent = task.source_path.parent().unwrap_or_else(|| Path::new(""));
    let relative = parent
        .strip_prefix(&task.input_root)
        .unwrap_or_else(|_| Path::new(""));
    let out_dir = task.output_root.join(relative);
    fs::create_dir_all(&out_dir)?;
    Ok(out_dir)
}

/// Appends " (2)", " (3)", ... before the extension until a free name is
/// found. Unbounded, like the conflict loop it replaces.
fn next_free_path(taken: &Path) -> PathBuf {
    let parent = taken.parent().unwrap_or_else(|| Path::new("."));
    let stem = taken
        .file_stem()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let extension = taken
        .extension()
        .map(|v| format!(".{}", v.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 2usize;
    loop {
        let candidate = parent.join(format!("{stem} ({n}){extension}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_modified(path: &Path) -> Option<DateTime<Local>> {
    let time = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::from(time))
}
