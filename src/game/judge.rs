use serde::{Deserialize, Serialize};

/// Accuracy bucket for a single judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgeTier {
    Best,
    Good,
    Bad,
    Miss,
}

impl JudgeTier {
    /// Best and Good keep the combo going.
    pub fn continues_combo(self) -> bool {
        matches!(self, Self::Best | Self::Good)
    }

    pub fn is_miss(self) -> bool {
        self == Self::Miss
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Best => "BEST",
            Self::Good => "GOOD",
            Self::Bad => "BAD",
            Self::Miss => "MISS",
        }
    }
}

/// How the end of a hold note is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoldTailPolicy {
    /// Only the entry press scores; completing the hold just marks it hit.
    #[default]
    EntryOnly,
    /// The release is judged against the end time and scored as a second tier.
    JudgeRelease,
}

/// Timing windows in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub best_window: f64,
    pub good_window: f64,
    pub bad_window: f64,
    /// Widest press offset that still selects a note. Notes this late age out.
    pub miss_window: f64,
    /// Releasing a hold earlier than this before its end is a miss.
    pub early_release_window: f64,
}

impl JudgeConfig {
    pub fn normal() -> Self {
        Self {
            best_window: 40.0,
            good_window: 80.0,
            bad_window: 120.0,
            miss_window: 150.0,
            early_release_window: 200.0,
        }
    }

    /// Windows scaled by the chart's `#RANK` (0 very hard .. 3 easy).
    /// Unknown ranks use the normal windows.
    pub fn for_rank(rank: u32) -> Self {
        let scale = match rank {
            0 => 0.7,
            1 => 0.85,
            3 => 1.2,
            _ => 1.0,
        };
        Self::normal().scaled(scale)
    }

    /// Press windows multiplied by `factor`. The early release window is kept.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            best_window: self.best_window * factor,
            good_window: self.good_window * factor,
            bad_window: self.bad_window * factor,
            miss_window: self.miss_window * factor,
            early_release_window: self.early_release_window,
        }
    }

    pub fn builder() -> JudgeConfigBuilder {
        JudgeConfigBuilder::default()
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Debug, Default)]
pub struct JudgeConfigBuilder {
    best_window: Option<f64>,
    good_window: Option<f64>,
    bad_window: Option<f64>,
    miss_window: Option<f64>,
    early_release_window: Option<f64>,
}

impl JudgeConfigBuilder {
    pub fn best_window(mut self, ms: f64) -> Self {
        self.best_window = Some(ms);
        self
    }

    pub fn good_window(mut self, ms: f64) -> Self {
        self.good_window = Some(ms);
        self
    }

    pub fn bad_window(mut self, ms: f64) -> Self {
        self.bad_window = Some(ms);
        self
    }

    pub fn miss_window(mut self, ms: f64) -> Self {
        self.miss_window = Some(ms);
        self
    }

    pub fn early_release_window(mut self, ms: f64) -> Self {
        self.early_release_window = Some(ms);
        self
    }

    pub fn build(self) -> JudgeConfig {
        let default = JudgeConfig::normal();
        JudgeConfig {
            best_window: self.best_window.unwrap_or(default.best_window),
            good_window: self.good_window.unwrap_or(default.good_window),
            bad_window: self.bad_window.unwrap_or(default.bad_window),
            miss_window: self.miss_window.unwrap_or(default.miss_window),
            early_release_window: self
                .early_release_window
                .unwrap_or(default.early_release_window),
        }
    }
}

/// Offset classification against a [`JudgeConfig`].
///
/// Offsets are `(input_time - note_time) * 1000`: negative is early, positive
/// is late.
#[derive(Debug, Clone, Default)]
pub struct JudgeSystem {
    config: JudgeConfig,
}

impl JudgeSystem {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Tier for a press offset, or `None` when the press is too far from the
    /// note to select it.
    pub fn judge(&self, offset_ms: f64) -> Option<JudgeTier> {
        let abs_diff = offset_ms.abs();

        if abs_diff <= self.config.best_window {
            Some(JudgeTier::Best)
        } else if abs_diff <= self.config.good_window {
            Some(JudgeTier::Good)
        } else if abs_diff <= self.config.bad_window {
            Some(JudgeTier::Bad)
        } else if abs_diff <= self.config.miss_window {
            Some(JudgeTier::Miss)
        } else {
            None
        }
    }

    /// Tier for a hold release under [`HoldTailPolicy::JudgeRelease`]. Releases
    /// past the bad window still count as Bad; early misses are decided by
    /// [`Self::is_early_release`] first.
    pub fn judge_release(&self, offset_ms: f64) -> JudgeTier {
        match self.judge(offset_ms) {
            Some(tier) if tier != JudgeTier::Miss => tier,
            _ => JudgeTier::Bad,
        }
    }

    pub fn is_candidate(&self, offset_ms: f64) -> bool {
        offset_ms.abs() <= self.config.miss_window
    }

    /// A scheduled note this late can no longer be pressed.
    pub fn is_aged_out(&self, offset_ms: f64) -> bool {
        offset_ms > self.config.miss_window
    }

    /// `remaining_ms` is the hold's end time minus the release time.
    pub fn is_early_release(&self, remaining_ms: f64) -> bool {
        remaining_ms > self.config.early_release_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        let judge = JudgeSystem::default();
        assert_eq!(judge.judge(0.0), Some(JudgeTier::Best));
        assert_eq!(judge.judge(-40.0), Some(JudgeTier::Best));
        assert_eq!(judge.judge(40.5), Some(JudgeTier::Good));
        assert_eq!(judge.judge(80.0), Some(JudgeTier::Good));
        assert_eq!(judge.judge(-120.0), Some(JudgeTier::Bad));
        assert_eq!(judge.judge(150.0), Some(JudgeTier::Miss));
        assert_eq!(judge.judge(150.1), None);
        assert_eq!(judge.judge(-151.0), None);
    }

    #[test]
    fn test_rank_scaling() {
        let very_hard = JudgeConfig::for_rank(0);
        assert!((very_hard.best_window - 28.0).abs() < 0.01);
        assert!((very_hard.miss_window - 105.0).abs() < 0.01);
        assert!((very_hard.early_release_window - 200.0).abs() < 0.01);

        let easy = JudgeConfig::for_rank(3);
        assert!((easy.bad_window - 144.0).abs() < 0.01);

        assert_eq!(JudgeConfig::for_rank(2), JudgeConfig::normal());
        assert_eq!(JudgeConfig::for_rank(9), JudgeConfig::normal());
    }

    #[test]
    fn test_builder_overrides_only_given_windows() {
        let config = JudgeConfig::builder()
            .best_window(10.0)
            .early_release_window(50.0)
            .build();
        assert_eq!(config.best_window, 10.0);
        assert_eq!(config.good_window, 80.0);
        assert_eq!(config.early_release_window, 50.0);
    }

    #[test]
    fn test_release_tier_never_misses() {
        let judge = JudgeSystem::default();
        assert_eq!(judge.judge_release(-30.0), JudgeTier::Best);
        assert_eq!(judge.judge_release(100.0), JudgeTier::Bad);
        assert_eq!(judge.judge_release(180.0), JudgeTier::Bad);
        assert_eq!(judge.judge_release(500.0), JudgeTier::Bad);
    }

    #[test]
    fn test_aging_and_early_release() {
        let judge = JudgeSystem::default();
        assert!(!judge.is_aged_out(150.0));
        assert!(judge.is_aged_out(150.001));
        assert!(!judge.is_aged_out(-500.0));
        assert!(judge.is_early_release(200.1));
        assert!(!judge.is_early_release(200.0));
    }

    #[test]
    fn test_combo_continuation() {
        assert!(JudgeTier::Best.continues_combo());
        assert!(JudgeTier::Good.continues_combo());
        assert!(!JudgeTier::Bad.continues_combo());
        assert!(!JudgeTier::Miss.continues_combo());
    }
}
