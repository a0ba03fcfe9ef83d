use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::thread;
use thumbstamp_core::{
    app_paths, default_workers, event_channel, load_config, run_batch, ConflictPolicy, RunEvent,
    RunOptions,
};

#[derive(Parser)]
#[command(
    name = "thumbstamp",
    version,
    about = "Embeds EXIF preview thumbnails into JPEG photos in bulk"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a folder and write thumbnail-stamped copies
    Run(RunArgs),
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration and its file location
    Show,
}

#[derive(Args)]
struct RunArgs {
    /// Folder to scan for JPEG files
    #[arg(long)]
    input: PathBuf,
    /// Folder that receives the stamped copies
    #[arg(long)]
    output: PathBuf,
    /// Output filename template, e.g. "{name}-thumb" or "{date}_{name}"
    #[arg(long)]
    template: Option<String>,
    /// What to do when the destination file already exists
    #[arg(long, value_enum)]
    conflict: Option<ConflictArg>,
    /// Process files one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,
    /// Worker thread count (default: number of cores, capped at 8)
    #[arg(long)]
    workers: Option<usize>,
    /// Report every file, not just failures
    #[arg(long)]
    verbose: bool,
    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConflictArg {
    Skip,
    Overwrite,
    Rename,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::Skip => ConflictPolicy::Skip,
            ConflictArg::Overwrite => ConflictPolicy::Overwrite,
            ConflictArg::Rename => ConflictPolicy::Rename,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args),
        Command::Config { command } => match command {
            ConfigCommand::Show => config_show(),
        },
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config()?;
    let options = RunOptions {
        input_root: args.input,
        output_root: args.output,
        template: args.template.unwrap_or(config.template),
        conflict: args.conflict.map(Into::into).unwrap_or(config.conflict),
        parallel: !args.sequential && config.parallel,
        workers: args.workers.unwrap_or(if config.workers >= 1 {
            config.workers
        } else {
            default_workers()
        }),
    };
    let verbose = args.verbose || config.verbose;

    let (tx, rx) = event_channel();
    let handle = thread::spawn(move || run_batch(&options, &tx));

    let mut failed = 0usize;
    for event in rx {
        match event {
            RunEvent::ScanComplete {
                queued,
                already_thumbnail,
            } => {
                println!("queued {queued} file(s), {already_thumbnail} already have a thumbnail");
            }
            RunEvent::File(outcome) => {
                if outcome.is_failure() {
                    failed += 1;
                    eprintln!("{}", outcome.message());
                } else if verbose {
                    println!("{}", outcome.message());
                }
            }
            RunEvent::Fatal(message) => {
                anyhow::bail!("{message}");
            }
            RunEvent::Finished(summary) => match args.format {
                OutputFormat::Text => println!("{}", summary.render()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            },
        }
    }

    let _ = handle.join();
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("config file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
