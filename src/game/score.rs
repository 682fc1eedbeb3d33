use serde::{Deserialize, Serialize};

use super::JudgeTier;

pub const MAX_HEALTH: f64 = 100.0;

/// Point values, combo bonus and health effects per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub best_score: u32,
    pub good_score: u32,
    pub bad_score: u32,
    pub miss_penalty: u32,
    /// Added to the combo bonus at every `combo_bonus_interval`-th combo.
    pub combo_bonus_step: u32,
    pub combo_bonus_interval: u32,
    pub best_recovery: f64,
    pub good_recovery: f64,
    pub miss_damage: f64,
    pub initial_health: f64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            best_score: 300,
            good_score: 150,
            bad_score: 50,
            miss_penalty: 100,
            combo_bonus_step: 10,
            combo_bonus_interval: 25,
            best_recovery: 1.0,
            good_recovery: 0.5,
            miss_damage: 8.0,
            initial_health: MAX_HEALTH,
        }
    }
}

/// Read-only performance snapshot handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceState {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub combo_bonus: u32,
    /// Always within `0.0..=100.0`.
    pub health: f64,
    pub best_count: u32,
    pub good_count: u32,
    pub bad_count: u32,
    pub miss_count: u32,
}

impl PerformanceState {
    fn new(initial_health: f64) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            combo_bonus: 0,
            health: initial_health.clamp(0.0, MAX_HEALTH),
            best_count: 0,
            good_count: 0,
            bad_count: 0,
            miss_count: 0,
        }
    }

    pub fn judged_count(&self) -> u32 {
        self.best_count + self.good_count + self.bad_count + self.miss_count
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Applies judgments to a [`PerformanceState`] under a set of [`ScoringRules`].
#[derive(Debug, Clone)]
pub struct ScoreManager {
    rules: ScoringRules,
    state: PerformanceState,
}

impl ScoreManager {
    pub fn new(rules: ScoringRules) -> Self {
        let state = PerformanceState::new(rules.initial_health);
        Self { rules, state }
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    pub fn add_judgment(&mut self, tier: JudgeTier) {
        let rules = &self.rules;
        let state = &mut self.state;

        if tier.continues_combo() {
            state.combo += 1;
            state.max_combo = state.max_combo.max(state.combo);
            if rules.combo_bonus_interval > 0 && state.combo % rules.combo_bonus_interval == 0 {
                state.combo_bonus = state.combo_bonus.saturating_add(rules.combo_bonus_step);
            }
        } else {
            state.combo = 0;
            state.combo_bonus = 0;
        }

        match tier {
            JudgeTier::Best | JudgeTier::Good => {
                let (base, recovery) = if tier == JudgeTier::Best {
                    state.best_count += 1;
                    (rules.best_score, rules.best_recovery)
                } else {
                    state.good_count += 1;
                    (rules.good_score, rules.good_recovery)
                };
                let gain = base.saturating_add(state.combo_bonus);
                state.score = state.score.saturating_add(gain);
                state.health = (state.health + recovery).clamp(0.0, MAX_HEALTH);
            }
            JudgeTier::Bad => {
                state.bad_count += 1;
                state.score = state.score.saturating_add(rules.bad_score);
            }
            JudgeTier::Miss => {
                state.miss_count += 1;
                state.score = state.score.saturating_sub(rules.miss_penalty);
                state.health = (state.health - rules.miss_damage).clamp(0.0, MAX_HEALTH);
            }
        }
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_and_good_build_combo() {
        let mut score = ScoreManager::default();
        score.add_judgment(JudgeTier::Best);
        score.add_judgment(JudgeTier::Good);

        let state = score.state();
        assert_eq!(state.combo, 2);
        assert_eq!(state.max_combo, 2);
        assert_eq!(state.score, 450);
        assert_eq!(state.best_count, 1);
        assert_eq!(state.good_count, 1);
        assert_eq!(state.health, MAX_HEALTH);
    }

    #[test]
    fn test_combo_bonus_every_25th() {
        let mut score = ScoreManager::default();
        for _ in 0..24 {
            score.add_judgment(JudgeTier::Best);
        }
        assert_eq!(score.state().combo_bonus, 0);
        assert_eq!(score.state().score, 24 * 300);

        score.add_judgment(JudgeTier::Best);
        assert_eq!(score.state().combo_bonus, 10);
        assert_eq!(score.state().score, 25 * 300 + 10);

        score.add_judgment(JudgeTier::Good);
        assert_eq!(score.state().score, 25 * 300 + 10 + 150 + 10);
    }

    #[test]
    fn test_bad_resets_combo_without_health_change() {
        let mut score = ScoreManager::default();
        for _ in 0..25 {
            score.add_judgment(JudgeTier::Best);
        }
        let health = score.state().health;
        score.add_judgment(JudgeTier::Bad);

        let state = score.state();
        assert_eq!(state.combo, 0);
        assert_eq!(state.combo_bonus, 0);
        assert_eq!(state.max_combo, 25);
        assert_eq!(state.health, health);
        assert_eq!(state.score, 25 * 300 + 10 + 50);
    }

    #[test]
    fn test_miss_floors_score_and_drains_health() {
        let mut score = ScoreManager::default();
        score.add_judgment(JudgeTier::Bad);
        score.add_judgment(JudgeTier::Miss);

        let state = score.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.health, 92.0);
        assert_eq!(state.miss_count, 1);
    }

    #[test]
    fn test_health_clamps() {
        let rules = ScoringRules {
            initial_health: 5.0,
            ..ScoringRules::default()
        };
        let mut score = ScoreManager::new(rules);
        score.add_judgment(JudgeTier::Miss);
        assert_eq!(score.state().health, 0.0);
        assert!(score.state().is_dead());

        let mut full = ScoreManager::default();
        full.add_judgment(JudgeTier::Best);
        assert_eq!(full.state().health, MAX_HEALTH);
    }

    #[test]
    fn test_huge_point_values_saturate() {
        let rules = ScoringRules {
            best_score: u32::MAX,
            combo_bonus_step: u32::MAX,
            combo_bonus_interval: 1,
            ..ScoringRules::default()
        };
        let mut score = ScoreManager::new(rules);
        score.add_judgment(JudgeTier::Best);
        score.add_judgment(JudgeTier::Best);
        score.add_judgment(JudgeTier::Good);

        let state = score.state();
        assert_eq!(state.combo_bonus, u32::MAX);
        assert_eq!(state.score, u32::MAX);
        assert_eq!(state.combo, 3);
    }
}
