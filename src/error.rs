use thiserror::Error;

/// Errors raised by the policy-gradient agent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("observation has {actual} features, expected {expected}")]
    ObservationShape { expected: usize, actual: usize },
    #[error("action {action} is out of range for {n_actions} actions")]
    ActionOutOfRange { action: usize, n_actions: usize },
    #[error("cannot train on an empty episode")]
    EmptyEpisode,
    #[error("batch sequences have mismatched lengths: {observations} observations, {actions} actions, {returns} returns")]
    BatchMismatch {
        observations: usize,
        actions: usize,
        returns: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("could not sample an action: {0}")]
    Sampling(String),
    #[error("tensor conversion failed: {0}")]
    Tensor(String),
}

/// Errors raised by an environment simulator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("action {action} is not valid for an environment with {n_actions} actions")]
    InvalidAction { action: usize, n_actions: usize },
    #[error("episode is finished; reset the environment before stepping")]
    EpisodeFinished,
}

/// Top-level error for a training session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
    #[error("environment error: {0}")]
    Environment(#[from] EnvError),
    #[error("plotting failed: {0}")]
    Plot(String),
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
