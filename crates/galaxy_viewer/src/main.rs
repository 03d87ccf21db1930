//! Terminal galaxy trace viewer.
//!
//! # Usage
//!
//! ```bash
//! # Play a trace, looping until `q`
//! cargo run -p galaxy_viewer -- play game.json
//!
//! # Start paused with a faster clock and no colors
//! cargo run -p galaxy_viewer -- play game.trace --paused --period-ms 200 --no-color
//!
//! # Print a single turn
//! cargo run -p galaxy_viewer -- show game.json --step 3
//!
//! # Print trace statistics
//! cargo run -p galaxy_viewer -- info game.jsonl
//!
//! # Compile a trace to the binary format
//! cargo run -p galaxy_viewer -- convert game.json game.trace
//! ```
//!
//! Frames go to stdout, logs go to stderr. `RUST_LOG` overrides the log
//! level chosen by `--verbose`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use galaxy_core::playback::PlaybackController;
use galaxy_core::trace::Trace;
use galaxy_viewer::{
    render_progress, render_turn, run_session, AsciiConfig, AsciiRenderer, IntervalScheduler,
    PlayerPalette, ViewerConfig, HELP_TEXT,
};

#[derive(Parser)]
#[command(name = "galaxy-viewer")]
#[command(about = "Play back galaxy simulation traces in the terminal")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a trace in a loop, reading transport commands from stdin
    Play {
        /// Trace file (.json, .jsonl or .trace)
        trace: PathBuf,

        /// RON viewer configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Milliseconds between automatic steps
        #[arg(long)]
        period_ms: Option<u64>,

        /// Width of the map viewport
        #[arg(long)]
        width: Option<usize>,

        /// Height of the map viewport
        #[arg(long)]
        height: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Open paused on the first turn
        #[arg(long)]
        paused: bool,
    },

    /// Print one turn and exit
    Show {
        /// Trace file (.json, .jsonl or .trace)
        trace: PathBuf,

        /// Step to show (0-based)
        #[arg(short, long, default_value = "0")]
        step: usize,

        /// Width of ASCII output
        #[arg(long, default_value = "80")]
        width: usize,

        /// Height of ASCII output
        #[arg(long, default_value = "24")]
        height: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print trace statistics
    Info {
        /// Trace file (.json, .jsonl or .trace)
        trace: PathBuf,
    },

    /// Compile a trace to the binary format
    Convert {
        /// Source trace
        input: PathBuf,

        /// Destination file
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            trace,
            config,
            period_ms,
            width,
            height,
            no_color,
            paused,
        } => {
            cmd_play(trace, config, period_ms, width, height, no_color, paused);
        }
        Commands::Show {
            trace,
            step,
            width,
            height,
            no_color,
        } => {
            cmd_show(trace, step, width, height, no_color);
        }
        Commands::Info { trace } => {
            cmd_info(trace);
        }
        Commands::Convert { input, output } => {
            cmd_convert(input, output);
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_trace(path: &Path) -> Trace {
    match Trace::load(path) {
        Ok(trace) => trace,
        Err(e) => fail(e),
    }
}

/// Play a trace interactively
fn cmd_play(
    trace_path: PathBuf,
    config_path: Option<PathBuf>,
    period_ms: Option<u64>,
    width: Option<usize>,
    height: Option<usize>,
    no_color: bool,
    paused: bool,
) {
    let mut config = match config_path {
        Some(path) => match ViewerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => fail(e),
        },
        None => ViewerConfig::default(),
    };

    if let Some(ms) = period_ms {
        config.tick_period_ms = ms;
    }
    if let Some(width) = width {
        config.width = width;
    }
    if let Some(height) = height {
        config.height = height;
    }
    if no_color {
        config.use_color = false;
    }
    if paused {
        config.start_paused = true;
    }
    if let Err(e) = config.validate() {
        fail(e);
    }

    let trace = Arc::new(load_trace(&trace_path));
    tracing::info!(
        path = %trace_path.display(),
        galaxy = %trace.galaxy_name,
        turns = trace.len(),
        period_ms = config.tick_period_ms,
        "Starting playback"
    );
    eprintln!("{HELP_TEXT}");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => fail(format!("Failed to start runtime: {e}")),
    };

    let summary = runtime.block_on(async {
        let (scheduler, mut ticks) = IntervalScheduler::new();
        let renderer = AsciiRenderer::new(
            Arc::clone(&trace),
            config.ascii_config(),
            std::io::stdout(),
        );
        let period = config.tick_period();
        let built = if config.start_paused {
            PlaybackController::paused(trace.len(), period, renderer, scheduler)
        } else {
            PlaybackController::new(trace.len(), period, renderer, scheduler)
        };
        let mut controller = match built {
            Ok(controller) => controller,
            Err(e) => fail(e),
        };

        let stdin = BufReader::new(tokio::io::stdin());
        let summary = run_session(&mut controller, &mut ticks, stdin).await;

        let (renderer, _scheduler) = controller.into_parts();
        if renderer.write_failures() > 0 {
            tracing::warn!(
                failures = renderer.write_failures(),
                written = renderer.frames_written(),
                "Some frames could not be written"
            );
        }
        summary
    });

    // Dropping the runtime would otherwise wait on the blocking stdin reader.
    runtime.shutdown_timeout(Duration::from_millis(100));

    println!(
        "Stopped at step {}/{} after {} ticks ({} inputs, {} rejected)",
        summary.final_step + 1,
        trace.len(),
        summary.ticks_applied,
        summary.inputs_applied,
        summary.inputs_rejected
    );
}

/// Print a single turn
fn cmd_show(trace_path: PathBuf, step: usize, width: usize, height: usize, no_color: bool) {
    let trace = load_trace(&trace_path);
    if step >= trace.len() {
        fail(format!(
            "Step {step} is out of range for a trace of {} turns",
            trace.len()
        ));
    }

    let config = AsciiConfig {
        width,
        height,
        use_color: !no_color,
        ..Default::default()
    };
    let palette = PlayerPalette::for_trace(&trace);
    print!("{}", render_turn(&trace, &palette, step, &config));
}

/// Print trace statistics
fn cmd_info(trace_path: PathBuf) {
    let trace = load_trace(&trace_path);
    println!("{}", trace.summary());

    if !trace.is_empty() {
        let config = AsciiConfig {
            use_color: false,
            ..Default::default()
        };
        print!("{}", render_progress(&trace, 0, trace.len() - 1, &config));
    }
}

/// Compile a trace to the binary format
fn cmd_convert(input: PathBuf, output: PathBuf) {
    let trace = load_trace(&input);
    if let Err(e) = trace.save_compiled(&output) {
        fail(e);
    }
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        turns = trace.len(),
        "Trace compiled"
    );
    println!("Wrote {} turns to {}", trace.len(), output.display());
}
