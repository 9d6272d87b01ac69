//! Keytempo CLI
//!
//! Replays recorded input traces through the session engine and presents
//! the resulting playback-speed snapshots.

use clap::{Parser, Subcommand};
use keytempo::{
    collector::{ChannelCollector, InputEvent, InputEventKind, Trace},
    core::{Calculation, SessionEngine},
    presenter::{ConsolePresenter, JsonlPresenter, Presenter},
    settings::Settings,
    AverageStore, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "keytempo")]
#[command(version = VERSION)]
#[command(about = "Typing-intensity sensor driving a tempo-matched playback speed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded input trace through the session engine
    Run {
        /// Path to a JSONL input trace
        #[arg(long)]
        trace: PathBuf,

        /// Replay speed factor (2.0 replays twice as fast)
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Metric kind override (wpm, kpm, ncs)
        #[arg(long)]
        metric: Option<String>,

        /// Append snapshots to a JSONL file
        #[arg(long, short)]
        export: Option<PathBuf>,
    },

    /// Show stored averages and active settings
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trace,
            speed,
            metric,
            export,
        } => {
            cmd_run(&trace, speed, metric.as_deref(), export);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_run(trace_path: &std::path::Path, speed: f64, metric: Option<&str>, export: Option<PathBuf>) {
    println!("Keytempo v{VERSION}");
    println!();

    // Load or create settings
    let mut settings = Settings::load().unwrap_or_default();
    if let Some(kind) = metric {
        settings.calculation = Calculation::parse_lossy(kind);
    }
    if let Err(e) = settings.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let trace = match Trace::load(trace_path) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Error loading trace {trace_path:?}: {e}");
            std::process::exit(1);
        }
    };
    if trace.is_empty() {
        eprintln!("Trace {trace_path:?} contains no events");
        std::process::exit(1);
    }

    println!("Replaying {} events from {:?}", trace.len(), trace_path);
    println!("  Metric: {}", settings.calculation);
    println!("  Back ratio: {}", if settings.show_back_ratio { "enabled" } else { "disabled" });
    println!("  Idle threshold: {}ms", settings.idle_threshold.as_millis());
    println!("  Poll interval: {}ms", settings.update_interval.as_millis());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Compose the engine from settings and the persisted averages
    let averages = AverageStore::with_persistence(settings.averages_path());
    let mut engine = SessionEngine::new(settings.engine_config(), averages);

    let mut presenters: Vec<Box<dyn Presenter>> = vec![Box::new(ConsolePresenter)];
    if let Some(ref path) = export {
        match JsonlPresenter::create(path) {
            Ok(presenter) => presenters.push(Box::new(presenter)),
            Err(e) => {
                eprintln!("Warning: Could not create export file {path:?}: {e}");
            }
        }
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("Warning: Could not install Ctrl+C handler: {e}");
    }

    // The replay thread owns the only sender: when the trace ends the
    // channel disconnects and the loop can wind the session down.
    let (handle, receiver) = ChannelCollector::default().into_parts();
    let replay = trace.spawn_replay(handle, speed);

    let mut event_count: u64 = 0;
    let mut snapshot_count: u64 = 0;
    let mut disconnected = false;
    let mut last_tick = Instant::now();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => {
                event_count += 1;
                apply_event(&mut engine, event);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                // Trace finished; keep polling until the session winds down.
                disconnected = true;
                thread::sleep(Duration::from_millis(50));
            }
        }

        if last_tick.elapsed() >= settings.update_interval {
            let snapshot = engine.tick();
            snapshot_count += 1;
            for presenter in presenters.iter_mut() {
                presenter.present(&snapshot);
            }

            // Trace finished and the session closed on its own: done.
            if disconnected && snapshot.paused {
                break;
            }
            last_tick = Instant::now();
        }
    }

    // Final forced snapshot for clean shutdown
    let final_snapshot = engine.shutdown();
    for presenter in presenters.iter_mut() {
        presenter.present(&final_snapshot);
    }
    snapshot_count += 1;

    let _ = replay.join();

    println!();
    println!("Processed {event_count} events into {snapshot_count} snapshots");
    if let Some(path) = export {
        println!("Snapshots exported to {path:?}");
    }
}

fn apply_event(engine: &mut SessionEngine, event: InputEvent) {
    match event.kind {
        InputEventKind::CharsEntered(text) => engine.chars_entered(&text),
        InputEventKind::CharsDeleted(count) => engine.chars_deleted(count),
    }
}

fn cmd_status() {
    let settings = Settings::load().unwrap_or_default();
    let averages = AverageStore::with_persistence(settings.averages_path());

    println!("Keytempo Status");
    println!("===============");
    println!();

    println!("Settings:");
    println!("  Metric: {}", settings.calculation);
    println!(
        "  Back ratio: {}",
        if settings.show_back_ratio {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Idle threshold: {}ms", settings.idle_threshold.as_millis());
    println!("  Poll interval: {}ms", settings.update_interval.as_millis());
    println!();

    println!("Stored averages:");
    for kind in Calculation::ALL {
        match averages.get(kind) {
            Some(value) => println!("  {kind}: {value:.1}"),
            None => println!("  {kind}: (none)"),
        }
    }
}

fn cmd_config() {
    let settings = Settings::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Settings file: {:?}", Settings::settings_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&settings).unwrap_or_else(|_| "Error".to_string())
    );
}
