//! REINFORCE policy-gradient agent for CartPole, built on Burn.

pub mod config;
pub mod env;
pub mod error;
pub mod ml;
pub mod report;
pub mod session;

pub use crate::config::{AgentConfig, DEFAULT_GAMMA, DEFAULT_HIDDEN, TrainingConfig};
pub use crate::env::{CartPole, Environment, Step};
pub use crate::error::{AgentError, EnvError, Error};
pub use crate::ml::{
    EpisodeBuffer, PolicyGradient, PolicyNetwork, discount_rewards, normalize_returns,
};
pub use crate::report::{render_reward_plot, running_mean};
pub use crate::session::{EpisodeOutcome, TrainingHistory, run_episode, train};
