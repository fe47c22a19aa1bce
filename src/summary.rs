use serde::{Deserialize, Serialize};

use crate::{Choice, SimulationState};

/// Aggregate view of one state, ignoring the diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub mean_goodwill: f64,
    /// Fraction of cooperative choices; `None` before the first step.
    pub cooperation_rate: Option<f64>,
    pub total_reward: f64,
    pub min_reward: f64,
    pub max_reward: f64,
}

impl StateSummary {
    pub fn of(state: &SimulationState) -> Self {
        let pairs = state.agents() * state.agents().saturating_sub(1);
        let mean_goodwill = if pairs == 0 {
            0.0
        } else {
            state.goodwill.off_diagonal().map(|(_, _, g)| g).sum::<f64>() / pairs as f64
        };

        let resolved: Option<Vec<Choice>> =
            state.choices.off_diagonal().map(|(_, _, c)| *c).collect();
        let cooperation_rate = match resolved {
            Some(choices) if !choices.is_empty() => Some(
                choices.iter().map(|c| c.as_f64()).sum::<f64>() / choices.len() as f64,
            ),
            _ => None,
        };

        let min_reward = state.rewards.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max_reward = state.rewards.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        Self {
            mean_goodwill,
            cooperation_rate,
            total_reward: state.rewards.iter().sum(),
            min_reward,
            max_reward,
        }
    }

    /// Gap between the best and worst performing agents.
    pub fn reward_spread(&self) -> f64 {
        self.max_reward - self.min_reward
    }
}
