use serde::Serialize;

use super::{
    GamePlayState, HoldTailPolicy, JudgeConfig, JudgeSystem, JudgeTier, NoteState,
    PerformanceState, PlayResult, ScoreManager, ScoringRules, TimingStats,
};
use crate::bms::{Chart, LANE_COUNT, Note, build_lane_index, remap_lanes};
use crate::config::PlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Playing,
    /// Health reached zero.
    Failed,
    /// Halted by [`PlaySession::stop`].
    Stopped,
    /// Reached the end of the track.
    Finished,
}

/// Which end of a note a judgment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JudgePhase {
    Head,
    Tail,
}

/// One judgment produced by a session call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgeEvent {
    pub note_index: usize,
    pub lane: usize,
    pub phase: JudgePhase,
    /// `None` for a hold completion that carries no score.
    pub tier: Option<JudgeTier>,
    pub offset_ms: f64,
}

/// Judges lane input against a compiled note list.
///
/// All times are seconds on the playback clock. Note indices refer to the
/// session's notes, which are the chart notes in time order.
pub struct PlaySession {
    title: String,
    artist: String,
    notes: Vec<Note>,
    lane_notes: Vec<Vec<usize>>,
    /// First note in each lane that may still be non-terminal.
    lane_cursor: Vec<usize>,
    /// Notes currently held, per lane.
    held: Vec<Vec<usize>>,
    /// Notes before this index are past the miss window.
    aging_cursor: usize,
    judge: JudgeSystem,
    hold_tail: HoldTailPolicy,
    note_states: GamePlayState,
    score: ScoreManager,
    timing_stats: TimingStats,
    status: SessionStatus,
}

impl PlaySession {
    pub fn new(
        mut notes: Vec<Note>,
        judge: JudgeConfig,
        rules: ScoringRules,
        hold_tail: HoldTailPolicy,
    ) -> Self {
        let before = notes.len();
        notes.retain(|n| n.lane < LANE_COUNT);
        if notes.len() < before {
            log::warn!(
                "dropped {} notes outside the {LANE_COUNT} playable lanes",
                before - notes.len()
            );
        }
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));

        let lane_notes = build_lane_index(&notes, LANE_COUNT);

        Self {
            title: String::new(),
            artist: String::new(),
            note_states: GamePlayState::new(notes.len()),
            notes,
            lane_notes,
            lane_cursor: vec![0; LANE_COUNT],
            held: vec![Vec::new(); LANE_COUNT],
            aging_cursor: 0,
            judge: JudgeSystem::new(judge),
            hold_tail,
            score: ScoreManager::new(rules),
            timing_stats: TimingStats::default(),
            status: SessionStatus::Playing,
        }
    }

    /// Session for a compiled chart. Applies the configured lane remap and,
    /// when enabled, the chart's `#RANK` windows.
    pub fn from_chart(chart: &Chart, config: &PlayConfig) -> Self {
        let judge = match (config.use_chart_rank, chart.metadata.rank) {
            (true, Some(rank)) => JudgeConfig::for_rank(rank),
            _ => config.judge.clone(),
        };
        let notes = match config.lane_count {
            Some(target) => remap_lanes(&chart.notes, target),
            None => chart.notes.clone(),
        };

        let mut session = Self::new(notes, judge, config.scoring.clone(), config.hold_tail);
        session.title = chart.metadata.title.clone();
        session.artist = chart.metadata.artist.clone();
        session
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    pub fn performance(&self) -> &PerformanceState {
        self.score.state()
    }

    pub fn timing_stats(&self) -> &TimingStats {
        &self.timing_stats
    }

    pub fn judge_config(&self) -> &JudgeConfig {
        self.judge.config()
    }

    pub fn note_state(&self, index: usize) -> Option<NoteState> {
        self.note_states.get_state(index)
    }

    pub fn note_states(&self) -> &[NoteState] {
        self.note_states.states()
    }

    /// Every note is hit or missed.
    pub fn is_complete(&self) -> bool {
        self.note_states.all_notes_processed()
    }

    fn offset_ms(time: f64, note_time: f64) -> f64 {
        (time - note_time) * 1000.0
    }

    /// Judge a lane press against the nearest scheduled note in the miss
    /// window. Presses with no candidate change nothing.
    pub fn press(&mut self, lane: usize, time: f64) -> Option<JudgeEvent> {
        if !self.is_playing() {
            return None;
        }

        let index = self.find_press_candidate(lane, time)?;
        let note = self.notes[index];
        let offset_ms = Self::offset_ms(time, note.time);
        let tier = self.judge.judge(offset_ms)?;

        if tier.is_miss() {
            self.note_states.set_missed(index);
        } else if note.is_hold() {
            self.note_states.set_holding(index, time);
            self.held[lane].push(index);
        } else {
            self.note_states.set_hit(index);
        }
        self.timing_stats.record(tier, offset_ms);
        self.apply(tier);

        Some(JudgeEvent {
            note_index: index,
            lane,
            phase: JudgePhase::Head,
            tier: Some(tier),
            offset_ms,
        })
    }

    fn find_press_candidate(&mut self, lane: usize, time: f64) -> Option<usize> {
        let lane_notes = self.lane_notes.get(lane)?;
        let cursor = &mut self.lane_cursor[lane];
        while lane_notes
            .get(*cursor)
            .is_some_and(|&i| self.note_states.states()[i].is_terminal())
        {
            *cursor += 1;
        }

        let miss_window = self.judge.config().miss_window;
        let mut best: Option<(usize, f64)> = None;
        for &index in &lane_notes[*cursor..] {
            let offset_ms = Self::offset_ms(time, self.notes[index].time);
            if offset_ms < -miss_window {
                break;
            }
            if !self.note_states.states()[index].is_scheduled()
                || !self.judge.is_candidate(offset_ms)
            {
                continue;
            }
            // Strict comparison keeps the lower index on ties.
            if best.is_none_or(|(_, abs)| offset_ms.abs() < abs) {
                best = Some((index, offset_ms.abs()));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Release a lane, ending every hold held in it.
    pub fn release(&mut self, lane: usize, time: f64) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        if !self.is_playing() {
            return events;
        }
        let Some(held) = self.held.get_mut(lane) else {
            return events;
        };

        for index in std::mem::take(held) {
            if !self.is_playing() {
                break;
            }
            let end_time = self.notes[index].end_time();
            let offset_ms = Self::offset_ms(time, end_time);

            let tier = if self.judge.is_early_release(-offset_ms) {
                self.note_states.set_missed(index);
                Some(JudgeTier::Miss)
            } else {
                self.note_states.set_hit(index);
                match self.hold_tail {
                    HoldTailPolicy::EntryOnly => None,
                    HoldTailPolicy::JudgeRelease => Some(self.judge.judge_release(offset_ms)),
                }
            };
            if let Some(tier) = tier {
                self.timing_stats.record(tier, offset_ms);
                self.apply(tier);
            }

            events.push(JudgeEvent {
                note_index: index,
                lane,
                phase: JudgePhase::Tail,
                tier,
                offset_ms,
            });
        }
        events
    }

    /// Per-frame sweep: completes holds whose end has passed, then ages out
    /// scheduled notes beyond the miss window.
    pub fn tick(&mut self, time: f64) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        if !self.is_playing() {
            return events;
        }

        self.complete_holds(time, &mut events);
        self.age_out(time, &mut events);
        events
    }

    fn complete_holds(&mut self, time: f64, events: &mut Vec<JudgeEvent>) {
        for lane in 0..self.held.len() {
            let (done, still_held): (Vec<usize>, Vec<usize>) = self.held[lane]
                .iter()
                .partition(|&&i| time >= self.notes[i].end_time());
            self.held[lane] = still_held;

            for index in done {
                if !self.is_playing() {
                    return;
                }
                self.note_states.set_hit(index);
                let tier = match self.hold_tail {
                    HoldTailPolicy::EntryOnly => None,
                    HoldTailPolicy::JudgeRelease => Some(JudgeTier::Best),
                };
                if let Some(tier) = tier {
                    self.apply(tier);
                }
                events.push(JudgeEvent {
                    note_index: index,
                    lane,
                    phase: JudgePhase::Tail,
                    tier,
                    offset_ms: 0.0,
                });
            }
        }
    }

    fn age_out(&mut self, time: f64, events: &mut Vec<JudgeEvent>) {
        while self.is_playing() {
            let Some(note) = self.notes.get(self.aging_cursor).copied() else {
                break;
            };
            let offset_ms = Self::offset_ms(time, note.time);
            if !self.judge.is_aged_out(offset_ms) {
                break;
            }

            let index = self.aging_cursor;
            self.aging_cursor += 1;
            if !self.note_states.states()[index].is_scheduled() {
                continue;
            }

            self.note_states.set_missed(index);
            self.apply(JudgeTier::Miss);
            events.push(JudgeEvent {
                note_index: index,
                lane: note.lane,
                phase: JudgePhase::Head,
                tier: Some(JudgeTier::Miss),
                offset_ms,
            });
        }
    }

    fn apply(&mut self, tier: JudgeTier) {
        self.score.add_judgment(tier);
        if self.score.state().is_dead() {
            self.status = SessionStatus::Failed;
            log::debug!("session failed at combo {}", self.score.state().max_combo);
        }
    }

    /// Abrupt stop. Held notes go back to `Scheduled` without scoring and
    /// every later call is a no-op.
    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        for index in self.held.iter_mut().flat_map(std::mem::take) {
            self.note_states.revert_hold(index);
        }
        self.status = SessionStatus::Stopped;
        log::debug!("session stopped");
    }

    /// Normal end of track: a last sweep at `time`, then `Finished` unless
    /// that sweep failed the session.
    pub fn finish(&mut self, time: f64) -> Vec<JudgeEvent> {
        let events = self.tick(time);
        if self.is_playing() {
            self.status = SessionStatus::Finished;
            log::debug!(
                "session finished: score {}, max combo {}",
                self.performance().score,
                self.performance().max_combo
            );
        }
        events
    }

    pub fn result(&self) -> PlayResult {
        PlayResult::new(
            self.title.clone(),
            self.artist.clone(),
            self.notes.len(),
            self.score.state(),
            &self.timing_stats,
            self.status,
        )
    }
}
