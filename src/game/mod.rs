mod judge;
mod result;
mod score;
mod session;
mod state;

use serde::Serialize;

pub use judge::{HoldTailPolicy, JudgeConfig, JudgeConfigBuilder, JudgeSystem, JudgeTier};
pub use result::PlayResult;
pub use score::{MAX_HEALTH, PerformanceState, ScoreManager, ScoringRules};
pub use session::{JudgeEvent, JudgePhase, PlaySession, SessionStatus};
pub use state::{GamePlayState, NoteState};

/// Timing direction for FAST/SLOW display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Fast,
    Exact,
    Slow,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `offset_ms` is input time minus note time.
    pub fn from_offset(offset_ms: f64) -> Self {
        if offset_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Fast
        } else if offset_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Slow
        } else {
            TimingDirection::Exact
        }
    }
}

/// Cumulative FAST/SLOW statistics during gameplay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingStats {
    pub fast_count: u32,
    pub slow_count: u32,
}

impl TimingStats {
    pub fn record(&mut self, tier: JudgeTier, offset_ms: f64) {
        // Only Good and Bad presses are shown as FAST/SLOW
        if !matches!(tier, JudgeTier::Good | JudgeTier::Bad) {
            return;
        }

        match TimingDirection::from_offset(offset_ms) {
            TimingDirection::Fast => self.fast_count += 1,
            TimingDirection::Slow => self.slow_count += 1,
            TimingDirection::Exact => {}
        }
    }
}
