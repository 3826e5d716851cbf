use super::returns::{discount_rewards, normalize_returns};
use crate::error::AgentError;

/// Transitions of the episode in progress, kept as three parallel sequences.
#[derive(Default, Clone, Debug)]
pub struct EpisodeBuffer {
    observations: Vec<Vec<f32>>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
}

impl EpisodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, observation: Vec<f32>, action: usize, reward: f32) {
        self.observations.push(observation);
        self.actions.push(action);
        self.rewards.push(reward);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn observations(&self) -> &[Vec<f32>] {
        &self.observations
    }

    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Undiscounted sum of the rewards collected so far.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Discounted returns of the episode, standardized across its steps.
    pub fn compute_returns(&self, gamma: f32) -> Result<Vec<f32>, AgentError> {
        if self.is_empty() {
            return Err(AgentError::EmptyEpisode);
        }
        let mut returns = discount_rewards(&self.rewards, gamma);
        normalize_returns(&mut returns);
        Ok(returns)
    }

    pub fn clear(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.rewards.clear();
    }
}
