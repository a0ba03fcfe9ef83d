#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use chrono::Local;
use eframe::egui;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;
use thumbstamp_core::{
    event_channel, load_config, run_batch, save_config, AppConfig, ConflictPolicy, RunEvent,
    RunOptions,
};

fn main() -> eframe::Result {
    env_logger::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([600.0, 580.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Thumbstamp",
        options,
        Box::new(|_cc| Ok(Box::new(ThumbstampApp::new()))),
    )
}

struct ThumbstampApp {
    input_dir: String,
    output_dir: String,
    template: String,
    conflict: ConflictPolicy,
    parallel: bool,
    workers: usize,
    max_workers: usize,
    verbose: bool,

    running: bool,
    queued: usize,
    done: usize,
    log: Vec<String>,
    events: Option<Receiver<RunEvent>>,
}

impl ThumbstampApp {
    fn new() -> Self {
        let config = load_config().unwrap_or_default();
        let max_workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            input_dir: String::new(),
            output_dir: String::new(),
            template: config.template,
            conflict: config.conflict,
            parallel: config.parallel,
            workers: config.workers.clamp(1, max_workers),
            max_workers,
            verbose: config.verbose,
            running: false,
            queued: 0,
            done: 0,
            log: Vec::new(),
            events: None,
        }
    }

    fn push_log(&mut self, line: impl AsRef<str>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.log.push(format!("[{stamp}] {}", line.as_ref()));
    }

    fn start_run(&mut self) {
        self.log.clear();
        self.queued = 0;
        self.done = 0;
        self.running = true;
        self.push_log("starting...");

        let options = RunOptions {
            input_root: self.input_dir.clone().into(),
            output_root: self.output_dir.clone().into(),
            template: self.template.clone(),
            conflict: self.conflict,
            parallel: self.parallel,
            workers: self.workers,
        };

        let config = AppConfig {
            template: self.template.clone(),
            conflict: self.conflict,
            parallel: self.parallel,
            workers: self.workers,
            verbose: self.verbose,
        };
        if let Err(err) = save_config(&config) {
            self.push_log(format!("could not save settings: {err:#}"));
        }

        let (tx, rx) = event_channel();
        self.events = Some(rx);
        thread::spawn(move || run_batch(&options, &tx));
    }

    fn drain_events(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = &self.events {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        for event in pending {
            match event {
                RunEvent::ScanComplete {
                    queued,
                    already_thumbnail,
                } => {
                    self.queued = queued;
                    self.push_log(format!(
                        "queued {queued} file(s), {already_thumbnail} already have a thumbnail"
                    ));
                }
                RunEvent::File(outcome) => {
                    self.done += 1;
                    if self.verbose || outcome.is_failure() {
                        let message = outcome.message().to_string();
                        self.push_log(message);
                    }
                }
                RunEvent::Fatal(message) => {
                    self.push_log(format!("error: {message}"));
                    self.running = false;
                    self.events = None;
                }
                RunEvent::Finished(summary) => {
                    for line in summary.render().lines() {
                        self.push_log(line);
                    }
                    self.running = false;
                    self.events = None;
                }
            }
        }
    }
}

impl eframe::App for ThumbstampApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Thumbstamp");
            ui.label("Embed EXIF preview thumbnails into JPEG photos in bulk.");
            ui.add_space(8.0);

            egui::Grid::new("folders")
                .num_columns(3)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Input folder:");
                    ui.add_sized(
                        [340.0, 20.0],
                        egui::TextEdit::singleline(&mut self.input_dir),
                    );
                    if ui.button("Browse...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Select input folder")
                            .pick_folder()
                        {
                            self.input_dir = path.display().to_string();
                        }
                    }
                    ui.end_row();

                    ui.label("Output folder:");
                    ui.add_sized(
                        [340.0, 20.0],
                        egui::TextEdit::singleline(&mut self.output_dir),
                    );
                    if ui.button("Browse...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Select output folder")
                            .pick_folder()
                        {
                            self.output_dir = path.display().to_string();
                        }
                    }
                    ui.end_row();

                    ui.label("Filename template:");
                    ui.add_sized(
                        [340.0, 20.0],
                        egui::TextEdit::singleline(&mut self.template)
                            .hint_text("{name}-thumb"),
                    );
                    ui.label("{name}, {date}");
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("If the file exists:");
                ui.radio_value(&mut self.conflict, ConflictPolicy::Skip, "Skip");
                ui.radio_value(&mut self.conflict, ConflictPolicy::Overwrite, "Overwrite");
                ui.radio_value(&mut self.conflict, ConflictPolicy::Rename, "Rename");
            });

            ui.horizontal(|ui| {
                ui.checkbox(&mut self.parallel, "Process in parallel");
                ui.add_enabled(
                    self.parallel,
                    egui::Slider::new(&mut self.workers, 1..=self.max_workers).text("workers"),
                );
                ui.checkbox(&mut self.verbose, "Log every file");
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let ready = !self.running
                    && !self.input_dir.is_empty()
                    && !self.output_dir.is_empty();
                if ui
                    .add_enabled(ready, egui::Button::new("Start"))
                    .clicked()
                {
                    self.start_run();
                }
                if self.running {
                    ui.spinner();
                    if self.queued > 0 {
                        ui.add(
                            egui::ProgressBar::new(self.done as f32 / self.queued as f32)
                                .text(format!("{}/{}", self.done, self.queued)),
                        );
                    } else {
                        ui.label("scanning...");
                    }
                }
            });

            ui.add_space(8.0);
            ui.separator();
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in &self.log {
                        ui.monospace(line);
                    }
                });
        });

        if self.running {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
