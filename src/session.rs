//! Episode loop that connects an [`Environment`] to a [`PolicyGradient`] agent.

use burn::tensor::backend::AutodiffBackend;
use rand::Rng;
use tracing::info;

use crate::config::TrainingConfig;
use crate::env::Environment;
use crate::error::Error;
use crate::ml::PolicyGradient;

/// Summary of one finished and trained-on episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeOutcome {
    pub total_reward: f32,
    pub steps: usize,
    pub loss: f32,
}

/// Total reward of every episode in a run, in order.
#[derive(Clone, Debug, Default)]
pub struct TrainingHistory {
    pub episode_rewards: Vec<f32>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.episode_rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episode_rewards.is_empty()
    }

    /// Mean reward over the last `window` episodes.
    pub fn recent_mean(&self, window: usize) -> Option<f32> {
        let window = window.min(self.episode_rewards.len());
        if window == 0 {
            return None;
        }
        let tail = &self.episode_rewards[self.episode_rewards.len() - window..];
        Some(tail.iter().sum::<f32>() / window as f32)
    }
}

/// Plays one episode with the current policy, then applies a single update.
pub fn run_episode<B, R, E>(
    agent: &mut PolicyGradient<B, R>,
    env: &mut E,
) -> Result<EpisodeOutcome, Error>
where
    B: AutodiffBackend,
    B::Device: Default,
    R: Rng,
    E: Environment,
{
    let observation = env.reset()?;
    agent.reset_episode();
    if let Err(err) = collect_transitions(agent, env, observation) {
        agent.reset_episode();
        return Err(err);
    }
    let total_reward = agent.buffer().total_reward();
    let steps = agent.buffer().len();
    let loss = agent.train_and_reset()?;
    Ok(EpisodeOutcome {
        total_reward,
        steps,
        loss,
    })
}

fn collect_transitions<B, R, E>(
    agent: &mut PolicyGradient<B, R>,
    env: &mut E,
    mut observation: Vec<f32>,
) -> Result<(), Error>
where
    B: AutodiffBackend,
    B::Device: Default,
    R: Rng,
    E: Environment,
{
    loop {
        let action = agent.sample_action(&observation)?;
        let step = env.step(action)?;
        agent.store(observation, action, step.reward)?;
        if step.done {
            return Ok(());
        }
        observation = step.observation;
    }
}

/// Runs `config.episodes` episodes and records their rewards.
///
/// `on_episode` receives the zero-based episode index after each update.
pub fn train<B, R, E, F>(
    agent: &mut PolicyGradient<B, R>,
    env: &mut E,
    config: &TrainingConfig,
    mut on_episode: F,
) -> Result<TrainingHistory, Error>
where
    B: AutodiffBackend,
    B::Device: Default,
    R: Rng,
    E: Environment,
    F: FnMut(usize, &EpisodeOutcome),
{
    let mut history = TrainingHistory {
        episode_rewards: Vec::with_capacity(config.episodes),
    };
    for episode in 0..config.episodes {
        let outcome = run_episode(agent, env)?;
        history.episode_rewards.push(outcome.total_reward);
        if config.log_interval > 0 && episode % config.log_interval == 0 {
            info!(episode, reward = outcome.total_reward, "episode finished");
        }
        on_episode(episode, &outcome);
    }
    Ok(history)
}
