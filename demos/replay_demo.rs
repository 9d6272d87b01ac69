//! Demonstration of the keytempo engine on a scripted input trace.
//!
//! This example shows how to:
//! 1. Build an input trace in memory
//! 2. Replay it through the channel collector
//! 3. Poll the session engine on a fixed cadence
//! 4. Present the resulting snapshots
//!
//! Run with: cargo run --example replay_demo

use std::time::{Duration, Instant};

use keytempo::{
    collector::{ChannelCollector, InputEventKind, Trace, TraceEvent},
    presenter::{ConsolePresenter, Presenter},
    AverageStore, Calculation, EngineConfig, SessionEngine,
};

fn main() {
    println!("Keytempo - Replay Demo");
    println!("======================");
    println!();

    // A short burst of typing, a correction, then silence long enough for
    // the session to close on its own.
    let mut events = Vec::new();
    for (i, c) in "the quick brown fox".chars().enumerate() {
        events.push(TraceEvent {
            at_ms: (i * 120) as u64,
            kind: InputEventKind::CharsEntered(c.to_string()),
        });
    }
    events.push(TraceEvent {
        at_ms: 2500,
        kind: InputEventKind::CharsDeleted(3),
    });
    for (i, c) in "dog".chars().enumerate() {
        events.push(TraceEvent {
            at_ms: 2700 + (i * 120) as u64,
            kind: InputEventKind::CharsEntered(c.to_string()),
        });
    }
    let trace = Trace::from_events(events);

    let config = EngineConfig {
        calculation: Calculation::Wpm,
        show_back_ratio: true,
        ..EngineConfig::default()
    };
    let mut engine = SessionEngine::new(config, AverageStore::new());
    let mut presenter = ConsolePresenter;

    println!("Replaying {} events...", trace.len());
    println!();

    let (handle, receiver) = ChannelCollector::default().into_parts();
    let replay = trace.spawn_replay(handle, 1.0);

    let interval = Duration::from_millis(500);
    let mut last_tick = Instant::now();
    let mut disconnected = false;

    loop {
        match receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => match event.kind {
                InputEventKind::CharsEntered(text) => engine.chars_entered(&text),
                InputEventKind::CharsDeleted(count) => engine.chars_deleted(count),
            },
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                disconnected = true;
                std::thread::sleep(Duration::from_millis(50));
            }
        }

        if last_tick.elapsed() >= interval {
            let snapshot = engine.tick();
            presenter.present(&snapshot);
            if disconnected && snapshot.paused {
                break;
            }
            last_tick = Instant::now();
        }
    }

    let final_snapshot = engine.shutdown();
    presenter.present(&final_snapshot);
    let _ = replay.join();

    println!();
    println!("Demo complete!");
}
