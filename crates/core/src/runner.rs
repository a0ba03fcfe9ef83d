use crate::scanner::{scan_tasks, ScanOptions};
use crate::task::{ConflictPolicy, Outcome, Task};
use crate::template::validate_template;
use crate::transform::process_task;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread;
use std::time::Instant;

/// Bound on the progress channel between the run and its front end.
const EVENT_QUEUE_DEPTH: usize = 256;
/// Bound on the channel that carries worker outcomes back to the aggregator.
const WORKER_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub template: String,
    pub conflict: ConflictPolicy,
    pub parallel: bool,
    pub workers: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub already_thumbnail: usize,
    pub skipped_existing: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn render(&self) -> String {
        format!(
            "done.\n  processed:          {}\n  already thumbnail:  {}\n  skipped (existing): {}\n  failed:             {}\n  elapsed:            {:.3}s",
            self.processed, self.already_thumbnail, self.skipped_existing, self.failed, self.elapsed_seconds
        )
    }
}

/// Progress stream of one batch run. Both `Fatal` and `Finished` are
/// terminal: a run that hits a fatal error ends without a summary.
#[derive(Debug, Clone)]
pub enum RunEvent {
    ScanComplete { queued: usize, already_thumbnail: usize },
    File(Outcome),
    Fatal(String),
    Finished(RunSummary),
}

pub fn default_workers() -> usize {
    let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    cores.min(8)
}

pub fn event_channel() -> (SyncSender<RunEvent>, std::sync::mpsc::Receiver<RunEvent>) {
    sync_channel(EVENT_QUEUE_DEPTH)
}

impl RunOptions {
    pub fn validate(&self) -> Result<(), String> {
        if !self.input_root.is_dir() {
            return Err(format!(
                "input folder does not exist: {}",
                self.input_root.display()
            ));
        }
        if !self.output_root.is_dir() {
            return Err(format!(
                "output folder does not exist: {}",
                self.output_root.display()
            ));
        }
        if let Err(err) = validate_template(&self.template) {
            return Err(err.to_string());
        }
        if self.workers == 0 {
            return Err("worker count must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Runs one batch end to end. Never returns an error: configuration, scan
/// and pool failures surface as a `Fatal` event and end the run without a
/// summary. Send errors mean the receiver hung up, at which point there is
/// nobody left to report to.
pub fn run_batch(options: &RunOptions, events: &SyncSender<RunEvent>) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    if let Err(message) = options.validate() {
        let _ = events.send(RunEvent::Fatal(message));
        return summary;
    }

    let scan = ScanOptions {
        input_root: options.input_root.clone(),
        output_root: options.output_root.clone(),
        template: options.template.clone(),
        conflict: options.conflict,
    };
    let report = match scan_tasks(&scan) {
        Ok(report) => report,
        Err(err) => {
            let _ = events.send(RunEvent::Fatal(format!("{err:#}")));
            return summary;
        }
    };

    summary.already_thumbnail = report.already_thumbnail;
    let _ = events.send(RunEvent::ScanComplete {
        queued: report.tasks.len(),
        already_thumbnail: report.already_thumbnail,
    });

    let dispatched = if options.parallel && options.workers > 1 && report.tasks.len() > 1 {
        dispatch_parallel(report.tasks, options, events, &mut summary)
    } else {
        dispatch_sequential(report.tasks, events, &mut summary);
        true
    };

    summary.elapsed_seconds = started.elapsed().as_secs_f64();
    if dispatched {
        let _ = events.send(RunEvent::Finished(summary.clone()));
    }
    summary
}

fn dispatch_parallel(
    tasks: Vec<Task>,
    options: &RunOptions,
    events: &SyncSender<RunEvent>,
    summary: &mut RunSummary,
) -> bool {
    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
    {
        Ok(pool) => pool,
        Err(err) => {
            let _ = events.send(RunEvent::Fatal(format!(
                "could not start worker pool: {err}"
            )));
            return false;
        }
    };

    let (tx, rx) = sync_channel::<Outcome>(WORKER_QUEUE_DEPTH);
    pool.spawn(move || {
        tasks
            .into_par_iter()
            .for_each_with(tx, |tx, task| {
                // A hung-up aggregator just drops the remaining outcomes.
                let _ = tx.send(process_task(&task));
            });
    });

    // Outcomes arrive in completion order, not scan order.
    for outcome in rx {
        absorb(outcome, events, summary);
    }
    true
}

fn dispatch_sequential(
    tasks: Vec<Task>,
    events: &SyncSender<RunEvent>,
    summary: &mut RunSummary,
) {
    for task in tasks {
        let outcome = process_task(&task);
        absorb(outcome, events, summary);
    }
}

fn absorb(outcome: Outcome, events: &SyncSender<RunEvent>, summary: &mut RunSummary) {
    match &outcome {
        Outcome::Success { .. } => summary.processed += 1,
        Outcome::SkippedExisting { .. } => summary.skipped_existing += 1,
        Outcome::Failure { .. } => summary.failed += 1,
    }
    // Front ends decide how chatty to be; the stream carries everything.
    let _ = events.send(RunEvent::File(outcome));
}
