use serde::Serialize;

use super::{PerformanceState, SessionStatus, TimingStats};

/// End-of-play summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayResult {
    pub title: String,
    pub artist: String,
    pub status: SessionStatus,
    pub score: u32,
    pub max_combo: u32,
    pub best_count: u32,
    pub good_count: u32,
    pub bad_count: u32,
    pub miss_count: u32,
    pub total_notes: u32,
    pub fast_count: u32,
    pub slow_count: u32,
    pub health: f64,
}

impl PlayResult {
    pub fn new(
        title: String,
        artist: String,
        total_notes: usize,
        performance: &PerformanceState,
        timing: &TimingStats,
        status: SessionStatus,
    ) -> Self {
        Self {
            title,
            artist,
            status,
            score: performance.score,
            max_combo: performance.max_combo,
            best_count: performance.best_count,
            good_count: performance.good_count,
            bad_count: performance.bad_count,
            miss_count: performance.miss_count,
            total_notes: u32::try_from(total_notes).unwrap_or(u32::MAX),
            fast_count: timing.fast_count,
            slow_count: timing.slow_count,
            health: performance.health,
        }
    }

    /// Best counts double, Good single.
    pub fn ex_score(&self) -> u32 {
        self.best_count * 2 + self.good_count
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_notes == 0 {
            return 0.0;
        }
        let max_ex = self.total_notes * 2;
        self.ex_score() as f64 / max_ex as f64 * 100.0
    }

    pub fn rank(&self) -> &'static str {
        let acc = self.accuracy();
        if acc >= 100.0 {
            "MAX"
        } else if acc >= 94.44 {
            "AAA"
        } else if acc >= 88.88 {
            "AA"
        } else if acc >= 77.77 {
            "A"
        } else if acc >= 66.66 {
            "B"
        } else if acc >= 55.55 {
            "C"
        } else if acc >= 44.44 {
            "D"
        } else if acc >= 33.33 {
            "E"
        } else {
            "F"
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    pub fn is_full_combo(&self) -> bool {
        self.total_notes > 0 && self.max_combo == self.total_notes
    }
}
