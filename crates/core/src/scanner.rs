use crate::exif_container::has_embedded_thumbnail;
use crate::task::{ConflictPolicy, Task};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub template: String,
    pub conflict: ConflictPolicy,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub tasks: Vec<Task>,
    pub already_thumbnail: usize,
}

/// Walks the input tree and turns every JPEG without an embedded thumbnail
/// into a task. Files that already carry one are counted, not queued.
pub fn scan_tasks(options: &ScanOptions) -> Result<ScanReport> {
    let mut report = ScanReport::default();

    for entry in WalkDir::new(&options.input_root).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!(
                "failed to walk input folder: {}",
                options.input_root.display()
            )
        })?;
        let path = entry.path();
        if path.is_dir() || !is_jpeg(path) {
            continue;
        }

        if has_embedded_thumbnail(path) {
            log::debug!("already has a thumbnail, skipping: {}", path.display());
            report.already_thumbnail += 1;
            continue;
        }

        report.tasks.push(Task {
            source_path: path.to_path_buf(),
            output_root: options.output_root.clone(),
            template: options.template.clone(),
            conflict: options.conflict,
            input_root: options.input_root.clone(),
        });
    }

    Ok(report)
}

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .map(|v| v.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("jpg") | Some("jpeg")
    )
}
