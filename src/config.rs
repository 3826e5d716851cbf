use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Error};

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub const DEFAULT_GAMMA: f32 = 0.95;
pub const DEFAULT_HIDDEN: usize = 10;

/// Learning rate used by the CartPole driver, which overrides the agent default.
pub const DRIVER_LEARNING_RATE: f64 = 0.02;
pub const DEFAULT_EPISODES: usize = 3000;
pub const DEFAULT_LOG_INTERVAL: usize = 100;
pub const DEFAULT_MAX_STEPS: usize = 200;
pub const DEFAULT_SEED: u64 = 0xCA27_901E_5EED;

/// Hyperparameters of the policy-gradient agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Step size handed to Adam.
    pub learning_rate: f64,
    /// Reward discount factor, in `[0, 1]`.
    pub gamma: f32,
    /// Width of the single hidden layer.
    pub hidden: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            gamma: DEFAULT_GAMMA,
            hidden: DEFAULT_HIDDEN,
        }
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AgentError::InvalidConfiguration(
                "learning rate must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(AgentError::InvalidConfiguration(
                "discount factor must be within [0, 1]",
            ));
        }
        if self.hidden == 0 {
            return Err(AgentError::InvalidConfiguration(
                "hidden width must be positive",
            ));
        }
        Ok(())
    }
}

/// Settings for a full training run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub agent: AgentConfig,
    /// Number of episodes to train for.
    pub episodes: usize,
    /// Episodes between progress log lines. Zero disables progress logging.
    pub log_interval: usize,
    /// Time limit for a single episode.
    pub max_steps: usize,
    /// Seed shared by the environment and the action sampler.
    pub seed: u64,
    /// Where the learning curve is written, if anywhere.
    pub plot: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default().with_learning_rate(DRIVER_LEARNING_RATE),
            episodes: DEFAULT_EPISODES,
            log_interval: DEFAULT_LOG_INTERVAL,
            max_steps: DEFAULT_MAX_STEPS,
            seed: DEFAULT_SEED,
            plot: Some(PathBuf::from("CartPole.png")),
        }
    }
}

impl TrainingConfig {
    /// Parses a JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        self.agent.validate()?;
        if self.max_steps == 0 {
            return Err(AgentError::InvalidConfiguration(
                "max steps must be positive",
            ));
        }
        Ok(())
    }
}
