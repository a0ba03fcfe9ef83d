mod config;
mod error;
mod exif_container;
mod runner;
mod scanner;
mod task;
mod template;
mod thumbnail;
mod transform;

pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use error::TransformError;
pub use exif_container::{has_embedded_thumbnail, ExifContainer};
pub use runner::{
    default_workers, event_channel, run_batch, RunEvent, RunOptions, RunSummary,
};
pub use scanner::{scan_tasks, ScanOptions, ScanReport};
pub use task::{ConflictPolicy, Outcome, Task};
pub use template::{
    parse_template, render_template, validate_template, TemplateError, TemplatePart, Token,
};
pub use thumbnail::{render_thumbnail, MAX_HEIGHT, MAX_WIDTH};
pub use transform::process_task;

pub const DEFAULT_TEMPLATE: &str = "{name}-thumb";
