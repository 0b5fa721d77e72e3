//! touchless-pointer: replay tracked landmarks into cursor commands.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use touchless_pointer::calibration::{self, CalibrationProfile};
use touchless_pointer::cursor::{CommandSink, LogSink, SexpSink, VirtualPointer};
use touchless_pointer::tracking::GazeTracker;
use touchless_pointer::{Config, JsonLinesSource, Pipeline, PointerSource};

#[derive(Parser, Debug)]
#[command(
    name = "touchless-pointer",
    version,
    about = "Gesture and gaze cursor control from tracked landmarks"
)]
struct Cli {
    /// TOML config file (default: built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the pointer from a landmark stream
    Run {
        /// JSON-lines landmark frames (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where pointer commands go
        #[arg(long, value_enum, default_value_t = SinkKind::Sexp)]
        sink: SinkKind,
    },
    /// Fit a gaze calibration profile from a landmark stream
    Calibrate {
        /// JSON-lines landmark frames (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Profile output path (default: calibration_path from the config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration and exit
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SinkKind {
    /// One s-expression event per command on stdout
    Sexp,
    /// Virtual pointer that logs commands
    Log,
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(p) => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open landmark input: {}", p.display()))?;
            info!("Reading frames from {}", p.display());
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading frames from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

fn screen_pointer(config: &Config) -> VirtualPointer {
    let (w, h) = (config.screen_width as i32, config.screen_height as i32);
    VirtualPointer::new(w / 2, h / 2, Some((w, h)))
}

fn run(config: &Config, input: Option<&Path>, sink_kind: SinkKind) -> anyhow::Result<()> {
    let mut source = JsonLinesSource::new(open_input(input)?);
    let mut pipeline = Pipeline::new(config);

    if config.pointer_source == PointerSource::Gaze {
        pipeline.set_profile(CalibrationProfile::load(&config.calibration_path));
    }

    let summary = match sink_kind {
        SinkKind::Sexp => {
            let stdout = io::stdout();
            let mut sink = SexpSink::new(screen_pointer(config), BufWriter::new(stdout.lock()));
            let summary = pipeline.run(&mut source, &mut sink);
            sink.flush().context("Failed to flush command output")?;
            summary
        }
        SinkKind::Log => {
            let mut sink = LogSink::new(screen_pointer(config));
            let summary = pipeline.run(&mut source, &mut sink);
            let (x, y) = sink.position();
            info!("Commands: {} final position ({}, {})", sink.counts.sexp(), x, y);
            summary
        }
    };

    if source.skipped > 0 {
        warn!("Skipped {} malformed frame lines", source.skipped);
    }
    info!("Run complete: {}", summary.sexp());
    info!("Final status: {}", pipeline.status_sexp());
    Ok(())
}

fn calibrate(config: &Config, input: Option<&Path>, output: Option<&Path>) -> anyhow::Result<()> {
    let mut source = JsonLinesSource::new(open_input(input)?);
    let mut tracker = GazeTracker::new(config.gaze_alpha, config.frame_width, config.frame_height);

    let profile = calibration::calibrate_from(&mut source, &mut tracker)
        .context("Calibration incomplete; nothing saved")?;
    if profile.is_identity() {
        warn!("Calibration produced the identity profile");
    }

    let path = output.unwrap_or(config.calibration_path.as_path());
    profile.save(path)?;
    println!("{}", profile.sexp());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "touchless_pointer=debug"
    } else {
        "touchless_pointer=info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!("touchless-pointer v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.config.as_deref())?;
    info!("config: {}", config.sexp());

    match cli.command {
        Command::Run { input, sink } => run(&config, input.as_deref(), sink),
        Command::Calibrate { input, output } => calibrate(&config, input.as_deref(), output.as_deref()),
        Command::Config => {
            println!("{}", config.sexp());
            Ok(())
        }
    }
}
