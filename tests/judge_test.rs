use brs_play::bms::{Note, compile, parse_chart};
use brs_play::config::PlayConfig;
use brs_play::game::{
    HoldTailPolicy, JudgeConfig, JudgePhase, JudgeSystem, JudgeTier, NoteState, PlaySession,
    ScoringRules, SessionStatus,
};

fn session(notes: Vec<Note>) -> PlaySession {
    session_with(notes, HoldTailPolicy::EntryOnly)
}

fn session_with(notes: Vec<Note>, hold_tail: HoldTailPolicy) -> PlaySession {
    PlaySession::new(
        notes,
        JudgeConfig::normal(),
        ScoringRules::default(),
        hold_tail,
    )
}

#[test]
fn test_tier_windows() {
    let judge = JudgeSystem::new(JudgeConfig::normal());

    assert_eq!(judge.judge(0.0), Some(JudgeTier::Best));
    assert_eq!(judge.judge(-40.0), Some(JudgeTier::Best));
    assert_eq!(judge.judge(60.0), Some(JudgeTier::Good));
    assert_eq!(judge.judge(-100.0), Some(JudgeTier::Bad));
    assert_eq!(judge.judge(130.0), Some(JudgeTier::Miss));
    assert_eq!(judge.judge(-200.0), None);
}

#[test]
fn test_no_double_judgment() {
    let mut s = session(vec![Note::tap(1.0, 0)]);

    let first = s.press(0, 0.99).unwrap();
    assert_eq!(first.tier, Some(JudgeTier::Best));
    let after_first = s.performance().clone();

    assert!(s.press(0, 1.01).is_none());
    assert_eq!(s.performance(), &after_first);
    assert_eq!(s.note_state(0), Some(NoteState::Hit));
    assert_eq!(s.performance().judged_count(), 1);
}

#[test]
fn test_miss_aging() {
    let mut s = session(vec![Note::tap(0.5, 1), Note::tap(2.0, 0)]);
    s.press(0, 0.0);
    assert_eq!(s.performance().judged_count(), 0);
    s.press(1, 0.5);
    assert_eq!(s.performance().combo, 1);

    assert!(s.tick(2.14).is_empty());
    let events = s.tick(2.15 + 1e-6);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].note_index, 1);
    assert_eq!(events[0].tier, Some(JudgeTier::Miss));
    assert_eq!(s.note_state(1), Some(NoteState::Missed));

    let perf = s.performance();
    assert_eq!(perf.combo, 0);
    assert_eq!(perf.miss_count, 1);
    assert_eq!(perf.score, 200);
    assert_eq!(perf.health, 92.0);

    // Aging applies once.
    assert!(s.tick(5.0).is_empty());
    assert_eq!(s.performance().miss_count, 1);
}

#[test]
fn test_press_in_miss_band_misses() {
    let mut s = session(vec![Note::tap(1.0, 0)]);
    let event = s.press(0, 0.87).unwrap();
    assert_eq!(event.tier, Some(JudgeTier::Miss));
    assert!((event.offset_ms + 130.0).abs() < 1e-6);
    assert_eq!(s.note_state(0), Some(NoteState::Missed));
    assert_eq!(s.performance().miss_count, 1);
}

#[test]
fn test_empty_press_has_no_effect() {
    let mut s = session(vec![Note::tap(1.0, 0)]);
    let before = s.performance().clone();
    assert!(s.press(0, 0.5).is_none());
    assert!(s.press(1, 1.0).is_none());
    assert_eq!(s.performance(), &before);
    assert_eq!(s.timing_stats().fast_count, 0);
}

#[test]
fn test_hold_is_shielded_from_aging() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0)]);
    let entry = s.press(0, 1.0).unwrap();
    assert_eq!(entry.phase, JudgePhase::Head);
    assert_eq!(s.note_state(0), Some(NoteState::Holding { since: 1.0 }));

    assert!(s.tick(2.5).is_empty());
    assert!(s.note_state(0).unwrap().is_holding());
}

#[test]
fn test_early_release_misses() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0)]);
    s.press(0, 1.0);
    let events = s.release(0, 2.5);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, JudgePhase::Tail);
    assert_eq!(events[0].tier, Some(JudgeTier::Miss));
    assert_eq!(s.note_state(0), Some(NoteState::Missed));
    assert_eq!(s.performance().combo, 0);
    assert_eq!(s.performance().score, 200);
}

#[test]
fn test_late_enough_release_completes_without_score() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0)]);
    s.press(0, 1.0);
    let before = s.performance().clone();

    let events = s.release(0, 2.85);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tier, None);
    assert_eq!(s.note_state(0), Some(NoteState::Hit));
    assert_eq!(s.performance(), &before);

    // Nothing left to release.
    assert!(s.release(0, 2.9).is_empty());
}

#[test]
fn test_hold_auto_completes_at_end() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0)]);
    s.press(0, 1.0);

    assert!(s.tick(2.99).is_empty());
    let events = s.tick(3.0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, JudgePhase::Tail);
    assert_eq!(events[0].tier, None);
    assert_eq!(s.note_state(0), Some(NoteState::Hit));
    assert!(s.is_complete());
}

#[test]
fn test_judge_release_policy_scores_tail() {
    let mut s = session_with(
        vec![Note::hold(1.0, 0, 2.0), Note::hold(4.0, 1, 1.0)],
        HoldTailPolicy::JudgeRelease,
    );

    s.press(0, 1.0);
    let tail = s.release(0, 2.9);
    assert_eq!(tail[0].tier, Some(JudgeTier::Bad));
    assert_eq!(s.performance().score, 350);
    assert_eq!(s.performance().combo, 0);

    s.press(1, 4.0);
    let auto = s.tick(5.0);
    assert_eq!(auto[0].tier, Some(JudgeTier::Best));
    assert_eq!(s.performance().score, 950);
    assert_eq!(s.performance().combo, 2);
}

#[test]
fn test_unpressed_hold_ages_out() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0)]);
    let events = s.tick(1.2);
    assert_eq!(events.len(), 1);
    assert_eq!(s.note_state(0), Some(NoteState::Missed));
    assert!(s.press(0, 1.2).is_none());
}

#[test]
fn test_health_zero_fails_session() {
    let notes: Vec<Note> = (0..14).map(|i| Note::tap(f64::from(i), 0)).collect();
    let mut s = session(notes);

    s.tick(11.5);
    assert_eq!(s.status(), SessionStatus::Playing);
    assert_eq!(s.performance().health, 4.0);

    let events = s.tick(12.5);
    assert_eq!(events.len(), 1);
    assert_eq!(s.status(), SessionStatus::Failed);
    assert_eq!(s.performance().health, 0.0);

    assert!(s.press(0, 13.0).is_none());
    assert!(s.tick(20.0).is_empty());
    assert_eq!(s.note_state(13), Some(NoteState::Scheduled));
    assert_eq!(s.result().status, SessionStatus::Failed);
}

#[test]
fn test_finish_sweeps_then_marks_finished() {
    let mut s = session(vec![Note::tap(1.0, 0), Note::tap(2.0, 0)]);
    s.press(0, 1.0);
    let events = s.finish(3.0);
    assert_eq!(events.len(), 1);
    assert_eq!(s.status(), SessionStatus::Finished);
    assert!(s.is_complete());

    // Finished sessions ignore input.
    assert!(s.press(0, 2.0).is_none());
    s.stop();
    assert_eq!(s.status(), SessionStatus::Finished);
}

#[test]
fn test_stop_discards_held_state() {
    let mut s = session(vec![Note::hold(1.0, 0, 2.0), Note::tap(1.5, 1)]);
    s.press(0, 1.0);
    let before = s.performance().clone();

    s.stop();
    assert_eq!(s.status(), SessionStatus::Stopped);
    assert_eq!(s.note_state(0), Some(NoteState::Scheduled));
    assert!(s.finish(10.0).is_empty());
    assert_eq!(s.status(), SessionStatus::Stopped);
    assert_eq!(s.performance(), &before);
}

#[test]
fn test_fast_slow_counts() {
    let mut s = session(vec![
        Note::tap(1.0, 0),
        Note::tap(2.0, 0),
        Note::tap(3.0, 0),
    ]);
    s.press(0, 0.94);
    s.press(0, 2.07);
    s.press(0, 3.0);
    assert_eq!(s.timing_stats().fast_count, 1);
    assert_eq!(s.timing_stats().slow_count, 1);
}

#[test]
fn test_session_from_chart_uses_rank_and_remap() {
    let chart = compile(&parse_chart("#RANK 0\n#00011:01\n#00016:0001\n"));
    let config = PlayConfig {
        use_chart_rank: true,
        lane_count: Some(6),
        ..PlayConfig::default()
    };
    let mut s = PlaySession::from_chart(&chart, &config);

    assert!((s.judge_config().miss_window - 105.0).abs() < 1e-9);
    // Scratch folds into the first free lane.
    assert_eq!(s.notes()[1].lane, 1);
    assert_eq!(s.press(1, 1.0).unwrap().tier, Some(JudgeTier::Best));
}
