//! End-to-end session behaviour through the public API

use glam::Vec2;

use reflex_rush::consts::FRAME_MS;
use reflex_rush::hud::{HudSink, HudSnapshot, SessionSummary};
use reflex_rush::persistence::{MemoryStorage, Storage};
use reflex_rush::session::Job;
use reflex_rush::sim::{
    Bounds, EffectKind, GameEvent, GamePhase, HitOutcome, Message, PowerUp, PowerUpKind, Target,
    TargetKind, TARGET_COLORS,
};
use reflex_rush::{HighScore, Session, Tuning};

#[derive(Default)]
struct RecordingHud {
    snapshots: Vec<HudSnapshot>,
    messages: Vec<String>,
    summaries: Vec<SessionSummary>,
}

impl HudSink for RecordingHud {
    fn update(&mut self, snapshot: &HudSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn announce(&mut self, message: &Message) {
        self.messages.push(message.text.clone());
    }

    fn game_over(&mut self, summary: &SessionSummary) {
        self.summaries.push(*summary);
    }
}

type TestSession = Session<RecordingHud, MemoryStorage>;

fn session_with(storage: MemoryStorage) -> TestSession {
    Session::new(
        Tuning::default(),
        RecordingHud::default(),
        storage,
        2024,
        Bounds::default(),
    )
}

/// Park a long-lived normal target at `pos`, returning its id
fn place_target(session: &mut TestSession, pos: Vec2, now: f64) -> u32 {
    let state = session.state_mut();
    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        kind: TargetKind::Normal,
        pos,
        radius: 40.0,
        color: TARGET_COLORS[5],
        created_at: now,
        lifetime: 3000.0,
        hit_at: None,
        points: 20.0,
        vel: Vec2::ZERO,
        shrink_rate: 0.0,
    });
    id
}

/// Start a session with nothing on the field
fn started(storage: MemoryStorage) -> TestSession {
    let mut session = session_with(storage);
    session.start(0.0);
    session.state_mut().targets.clear();
    session.drain_events();
    session
}

/// A spot no spawned entity can cover (outside the canvas)
const EMPTY: Vec2 = Vec2::new(-500.0, -500.0);

#[test]
fn five_rapid_hits_reach_tier_two_once() {
    let mut session = started(MemoryStorage::new());
    for i in 0..4 {
        let now = 10.0 + i as f64 * 100.0;
        let pos = Vec2::new(100.0 + i as f32 * 100.0, 100.0);
        place_target(&mut session, pos, now);
        session.pointer_down(Some(pos), now);
    }
    assert_eq!(session.state().combo.streak(), 4);
    assert_eq!(session.state().combo.multiplier(), 1);

    let pos = Vec2::new(600.0, 400.0);
    place_target(&mut session, pos, 500.0);
    match session.pointer_down(Some(pos), 500.0) {
        HitOutcome::Target { combo, .. } => {
            assert_eq!(combo.streak, 5);
            assert_eq!(combo.multiplier, 2);
            assert_eq!(combo.tier_reached, Some(2));
        }
        other => panic!("expected a hit, got {other:?}"),
    }

    let tiers = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::ComboTier { .. }))
        .count();
    assert_eq!(tiers, 1);
    assert_eq!(
        session
            .hud()
            .messages
            .iter()
            .filter(|m| m.starts_with("Combo"))
            .count(),
        1
    );
    assert_eq!(session.hud().snapshots.last().map(|s| s.multiplier), Some(2));
}

#[test]
fn three_misses_end_the_game_and_record_high_score() {
    let mut session = started(MemoryStorage::new());
    session.state_mut().score = 250;

    assert_eq!(session.pointer_down(Some(EMPTY), 100.0), HitOutcome::Miss);
    assert_eq!(session.pointer_down(Some(EMPTY), 200.0), HitOutcome::Miss);
    assert!(session.is_playing());
    assert_eq!(session.pointer_down(Some(EMPTY), 300.0), HitOutcome::Miss);

    assert_eq!(session.phase(), GamePhase::GameOver);
    assert!(session.scheduler().is_empty());
    let summary = session.hud().summaries.last().copied().expect("no summary");
    assert_eq!(summary.score, 250);
    assert!(summary.new_record);
    assert_eq!(session.high_score(), 250);
    assert_eq!(session.hud().snapshots.last().map(|s| s.lives), Some(0));
    assert_eq!(
        session.storage().get(HighScore::STORAGE_KEY).unwrap().as_deref(),
        Some("250")
    );

    // Nothing reacts after game over
    assert_eq!(session.pointer_down(Some(EMPTY), 400.0), HitOutcome::Ignored);
}

/// Let three short-lived targets run out together on a fresh session
fn expire_three(storage: MemoryStorage, score: u64) -> TestSession {
    let mut session = started(storage);
    session.state_mut().score = score;
    for i in 0..3 {
        let state = session.state_mut();
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            kind: TargetKind::Normal,
            pos: Vec2::new(150.0 + i as f32 * 200.0, 300.0),
            radius: 30.0,
            color: TARGET_COLORS[2],
            created_at: 0.0,
            lifetime: 500.0,
            hit_at: None,
            points: 10.0,
            vel: Vec2::ZERO,
            shrink_rate: 0.0,
        });
    }
    assert!(!session.step(600.0));
    session
}

#[test]
fn three_timeouts_end_the_game() {
    let session = expire_three(MemoryStorage::new(), 90);
    assert_eq!(session.phase(), GamePhase::GameOver);
    assert_eq!(session.state().display_lives(), 0);
    assert!(session.scheduler().is_empty());

    let summary = session.last_summary().expect("no summary");
    assert!(summary.new_record);
    assert_eq!(summary.score, 90);
    assert_eq!(session.hud().summaries.len(), 1);
    assert_eq!(
        session.storage().get(HighScore::STORAGE_KEY).unwrap().as_deref(),
        Some("90")
    );
}

#[test]
fn three_timeouts_keep_a_higher_record() {
    let mut storage = MemoryStorage::new();
    storage.set(HighScore::STORAGE_KEY, "500").unwrap();
    let session = expire_three(storage, 90);
    assert_eq!(session.phase(), GamePhase::GameOver);
    let summary = session.last_summary().expect("no summary");
    assert!(!summary.new_record);
    assert_eq!(summary.high_score, 500);
    assert_eq!(
        session.storage().get(HighScore::STORAGE_KEY).unwrap().as_deref(),
        Some("500")
    );
}

#[test]
fn high_score_only_updates_when_beaten() {
    let mut storage = MemoryStorage::new();
    storage.set(HighScore::STORAGE_KEY, "1000").unwrap();
    let mut session = started(storage);
    assert_eq!(session.high_score(), 1000);

    session.state_mut().score = 400;
    let summary = session.end(50.0).expect("session was running");
    assert!(!summary.new_record);
    assert_eq!(summary.high_score, 1000);
    // Stored best left untouched
    assert_eq!(
        session.storage().get(HighScore::STORAGE_KEY).unwrap().as_deref(),
        Some("1000")
    );
}

#[test]
fn restart_resets_state_without_stale_timers() {
    let mut session = started(MemoryStorage::new());
    let pos = Vec2::new(300.0, 300.0);
    let id = place_target(&mut session, pos, 10.0);
    session.pointer_down(Some(pos), 10.0);
    session.pointer_down(Some(EMPTY), 20.0);
    assert!(session.scheduler().is_scheduled(&Job::RemoveTarget(id)));
    session.end(30.0);
    let score = session.state().score;
    assert!(score > 0);

    session.restart(5000.0);
    let state = session.state();
    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 3);
    assert_eq!(state.time_remaining, 60);
    assert_eq!(state.difficulty, 1.0);
    assert_eq!(state.combo.streak(), 0);
    assert_eq!(state.combo.max_streak(), 0);
    assert_eq!(state.targets.len(), 1);
    assert!(state.power_ups.is_empty());
    assert_eq!(state.high_score, score);
    assert!(!session.scheduler().is_scheduled(&Job::RemoveTarget(id)));
    assert!(!session.scheduler().is_scheduled(&Job::ComboDecay));
    // Only the three drivers, plus a chained spawn if the opening target rolled one
    assert!(session.scheduler().len() <= 4);

    // The old session's one-second countdown doesn't bleed into the new one
    session.drain_events();
    session.step(5999.0);
    assert_eq!(session.state().time_remaining, 60);
    session.step(6000.0);
    assert_eq!(session.state().time_remaining, 59);
}

#[test]
fn timed_effects_refresh_without_stacking() {
    let mut session = started(MemoryStorage::new());
    for (at, kind) in [
        (100.0, PowerUpKind::DoublePoints),
        (200.0, PowerUpKind::SlowTime),
        (4100.0, PowerUpKind::DoublePoints),
    ] {
        let state = session.state_mut();
        let id = state.next_entity_id();
        let pos = Vec2::new(400.0, 300.0);
        state.power_ups.push(PowerUp {
            id,
            kind,
            pos,
            radius: 30.0,
            created_at: at,
            lifetime: 5000.0,
            hit_at: None,
        });
        session.pointer_down(Some(pos), at);
        session.step(at + 50.0);
    }

    let effects = &session.state().effects;
    assert_eq!(effects.ends_at(EffectKind::DoublePoints), Some(14_100.0));
    assert_eq!(effects.ends_at(EffectKind::SlowTime), Some(10_200.0));
    let badges = session.hud_snapshot(4350.0).badges;
    assert_eq!(badges.len(), 2);
    assert_eq!(session.scheduler().period_of(&Job::Countdown), Some(1500.0));
}

#[test]
fn timeout_miss_keeps_the_combo() {
    let mut session = started(MemoryStorage::new());
    for i in 0..3 {
        let pos = Vec2::new(100.0 + i as f32 * 120.0, 200.0);
        place_target(&mut session, pos, 0.0);
        session.pointer_down(Some(pos), 10.0 + i as f64 * 50.0);
    }
    assert_eq!(session.state().combo.streak(), 3);

    // A target left alone until it times out
    let state = session.state_mut();
    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        kind: TargetKind::Normal,
        pos: Vec2::new(700.0, 500.0),
        radius: 30.0,
        color: TARGET_COLORS[0],
        created_at: 0.0,
        lifetime: 1000.0,
        hit_at: None,
        points: 10.0,
        vel: Vec2::ZERO,
        shrink_rate: 0.0,
    });
    session.step(1000.0);
    assert!(session
        .drain_events()
        .contains(&GameEvent::TargetExpired { id }));
    assert!(session.state().lives < 3);
    assert_eq!(session.state().combo.streak(), 3);
}

#[test]
fn malformed_pointer_events_cost_nothing() {
    let mut session = started(MemoryStorage::new());
    assert_eq!(session.pointer_down(None, 10.0), HitOutcome::Ignored);
    assert_eq!(
        session.pointer_down(Some(Vec2::new(f32::NAN, f32::NAN)), 20.0),
        HitOutcome::Ignored
    );
    assert_eq!(session.state().lives, 3);
}

#[test]
fn full_session_runs_to_time_out() {
    let mut session = session_with(MemoryStorage::new());
    session.start(0.0);
    let mut now = 0.0;
    let mut frames = 0u32;
    loop {
        now += FRAME_MS;
        frames += 1;
        // Keep the player alive so only the clock can end it
        session.state_mut().lives = 1_000;
        if !session.step(now) {
            break;
        }
        assert!(frames < 60 * 70, "session never ended");
    }
    assert_eq!(session.phase(), GamePhase::GameOver);
    assert!(session.state().difficulty >= 3.5);
    assert_eq!(session.hud().summaries.len(), 1);
}
