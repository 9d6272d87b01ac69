//! Integration tests driving the session engine through full lifecycles.

use chrono::{DateTime, Duration, TimeZone, Utc};
use keytempo::{AverageStore, Calculation, EngineConfig, SessionEngine};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn ms(offset: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(offset)
}

fn engine_with(calculation: Calculation, show_back_ratio: bool) -> SessionEngine {
    let config = EngineConfig {
        calculation,
        show_back_ratio,
        ..EngineConfig::default()
    };
    SessionEngine::new(config, AverageStore::new())
}

/// Open a session at `t0` with a single throwaway tick so that later ticks
/// measure from a known start (t0 minus the 500ms grace period).
fn open_session(engine: &mut SessionEngine) {
    engine.chars_entered("a");
    engine.tick_at(t0());
}

#[test]
fn wpm_scenario_25_chars_over_one_minute() {
    let mut engine = engine_with(Calculation::Wpm, false);
    open_session(&mut engine);

    for _ in 0..24 {
        engine.chars_entered("x");
    }

    // Session start was back-dated to t0 - 500ms, so this poll sees exactly
    // one minute of elapsed time: 25 / 5 / 1 = 5.
    let snapshot = engine.tick_at(ms(59_500));
    assert!(!snapshot.paused);
    assert_eq!(snapshot.metric.kind, Calculation::Wpm);
    assert_eq!(snapshot.metric.value, 5.0);
}

#[test]
fn kpm_scenario_60_chars_over_one_minute() {
    let mut engine = engine_with(Calculation::Kpm, false);
    open_session(&mut engine);

    for _ in 0..59 {
        engine.chars_entered("x");
    }

    let snapshot = engine.tick_at(ms(59_500));
    assert_eq!(snapshot.metric.value, 60.0);
}

#[test]
fn wpm_clamps_when_deletions_outnumber_typed() {
    let mut engine = engine_with(Calculation::Wpm, false);
    open_session(&mut engine);

    for _ in 0..9 {
        engine.chars_entered("x");
    }
    for _ in 0..15 {
        engine.chars_deleted(1);
    }

    let snapshot = engine.tick_at(ms(59_500));
    assert_eq!(snapshot.metric.value, 0.0);
    assert_eq!(snapshot.video_speed, 0.0);
}

#[test]
fn ncs_penalizes_error_rate() {
    let mut engine = engine_with(Calculation::Ncs, false);
    open_session(&mut engine);

    for _ in 0..59 {
        engine.chars_entered("x");
    }
    // 30 of 60 characters deleted: gross 60 KPM scaled by (1 - 0.5)
    engine.chars_deleted(30);

    let snapshot = engine.tick_at(ms(59_500));
    assert_eq!(snapshot.metric.value, 30.0);
}

#[test]
fn pasted_text_counts_toward_back_ratio_only() {
    let mut engine = engine_with(Calculation::Kpm, true);
    open_session(&mut engine);

    // 9 more keystrokes plus a 10-character paste: typed 10, total 20
    for _ in 0..9 {
        engine.chars_entered("x");
    }
    engine.chars_entered("pasted tex");
    engine.chars_deleted(1);
    engine.chars_deleted(1);

    let snapshot = engine.tick_at(ms(59_500));
    // 2 deletion events over 20 total characters
    assert_eq!(snapshot.back_ratio, Some(10.0));
    // KPM sees only the 10 keystrokes
    assert_eq!(snapshot.metric.value, 10.0);
}

#[test]
fn session_lifecycle_open_idle_close_reopen() {
    let mut engine = engine_with(Calculation::Wpm, false);

    // Closed, nothing typed
    assert!(engine.tick_at(t0()).paused);

    // Typing opens a session
    engine.chars_entered("h");
    engine.chars_entered("i");
    assert!(!engine.tick_at(ms(1000)).paused);

    // Still active while keystrokes keep arriving inside the threshold
    engine.chars_entered("!");
    assert!(!engine.tick_at(ms(2000)).paused);

    // Two quiet seconds later the session closes on this tick...
    engine.tick_at(ms(5000));
    assert!(!engine.is_open());

    // ...and the next poll reports paused with a zero value
    let paused = engine.tick_at(ms(6000));
    assert!(paused.paused);
    assert_eq!(paused.metric.value, 0.0);
    assert_eq!(paused.video_speed, 0.0);

    // A new keystroke starts a fresh session
    engine.chars_entered("x");
    assert!(!engine.tick_at(ms(7000)).paused);
}

#[test]
fn double_tick_does_not_double_count() {
    let mut engine = engine_with(Calculation::Wpm, false);
    engine.chars_entered("a");
    engine.tick_at(t0());

    // Close the session, then poll again with no new events
    engine.tick_at(ms(3000));
    let first = engine.tick_at(ms(4000));
    let second = engine.tick_at(ms(5000));

    assert!(first.paused && second.paused);
    assert_eq!(first.metric.value, 0.0);
    assert_eq!(second.metric.value, 0.0);
    // Paused polls contribute nothing, so the stored average is stable
    assert_eq!(first.metric.average, second.metric.average);
}

#[test]
fn average_follows_half_life_rule_across_ticks() {
    let mut engine = engine_with(Calculation::Kpm, false);
    open_session(&mut engine);
    let after_open = engine.averages().get(Calculation::Kpm).unwrap();

    for _ in 0..59 {
        engine.chars_entered("x");
    }
    let snapshot = engine.tick_at(ms(59_500));

    // Each contribution halves the previous average and adds half the new
    // value: (after_open + 60) / 2.
    assert_eq!(snapshot.metric.average, (after_open + 60.0) / 2.0);
}

#[test]
fn back_ratio_sentinel_vs_zero() {
    let mut disabled = engine_with(Calculation::Wpm, false);
    disabled.chars_entered("a");
    assert_eq!(disabled.tick_at(t0()).back_ratio, None);

    let mut enabled = engine_with(Calculation::Wpm, true);
    enabled.chars_entered("a");
    assert_eq!(enabled.tick_at(t0()).back_ratio, Some(0.0));
}

#[test]
fn video_speed_stays_within_caps() {
    let mut engine = engine_with(Calculation::Wpm, false);

    // A burst far above any plausible typing rate
    for _ in 0..500 {
        engine.chars_entered("x");
    }
    let snapshot = engine.tick_at(t0());
    assert!(snapshot.metric.value > 0.0);
    assert!(snapshot.video_speed > 0.0);
    assert!(snapshot.video_speed <= 2.0);
}

#[test]
fn shutdown_forces_final_contribution_and_reset() {
    let mut engine = engine_with(Calculation::Wpm, false);
    open_session(&mut engine);
    engine.chars_entered("b");

    let final_snapshot = engine.shutdown();
    assert!(!final_snapshot.paused);
    assert!(!engine.is_open());

    // Engine is reusable after shutdown
    assert!(engine.tick_at(ms(1000)).paused);
    engine.chars_entered("c");
    assert!(!engine.tick_at(ms(2000)).paused);
}
