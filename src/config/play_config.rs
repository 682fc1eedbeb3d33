use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::game::{HoldTailPolicy, JudgeConfig, ScoringRules};
use crate::traits::time::ClockOffset;

/// Play-specific configuration: judgment windows, scoring and timing
/// correction for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub judge: JudgeConfig,
    pub scoring: ScoringRules,
    pub hold_tail: HoldTailPolicy,
    /// Judge timing adjustment in milliseconds, added to every clock read.
    pub judge_timing: i32,
    /// Fold notes onto this many lanes (6 for 5-key, 8 for 7-key).
    pub lane_count: Option<usize>,
    /// Use the chart's `#RANK` windows instead of `judge`.
    pub use_chart_rank: bool,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            judge: JudgeConfig::default(),
            scoring: ScoringRules::default(),
            hold_tail: HoldTailPolicy::default(),
            judge_timing: 0,
            lane_count: None,
            use_chart_rank: false,
        }
    }
}

impl PlayConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Judge timing as a clamped clock offset.
    pub fn clock_offset(&self) -> ClockOffset {
        ClockOffset::from_ms(self.judge_timing)
    }
}
