//! Environment interface and a CartPole-v0 simulator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EnvError;

/// Outcome of a single environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub done: bool,
}

/// A discrete-action Markov decision process the agent can be trained on.
pub trait Environment {
    /// Number of discrete actions.
    fn action_count(&self) -> usize;
    /// Length of every observation vector.
    fn feature_count(&self) -> usize;
    fn reset(&mut self) -> Result<Vec<f32>, EnvError>;
    fn step(&mut self, action: usize) -> Result<Step, EnvError>;
}

const GRAVITY: f32 = 9.8;
const CART_MASS: f32 = 1.0;
const POLE_MASS: f32 = 0.1;
const TOTAL_MASS: f32 = CART_MASS + POLE_MASS;
const POLE_HALF_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = POLE_MASS * POLE_HALF_LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
const INIT_RANGE: f32 = 0.05;

pub const CARTPOLE_ACTIONS: usize = 2;
pub const CARTPOLE_FEATURES: usize = 4;

/// Cart-pole balancing task with the CartPole-v0 dynamics and a 200 step time limit by default.
///
/// Observation layout: `[x, x_dot, theta, theta_dot]`. Action 0 pushes left, 1 pushes right.
/// Every step, including the one that ends the episode, yields a reward of 1.
#[derive(Debug)]
pub struct CartPole {
    state: [f32; CARTPOLE_FEATURES],
    steps: usize,
    max_steps: usize,
    done: bool,
    rng: StdRng,
}

impl CartPole {
    pub fn new(seed: u64, max_steps: usize) -> Self {
        Self {
            state: [0.0; CARTPOLE_FEATURES],
            steps: 0,
            max_steps,
            // Stepping before the first reset is rejected.
            done: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> [f32; CARTPOLE_FEATURES] {
        self.state
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn has_fallen(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x.abs() > X_THRESHOLD || theta.abs() > THETA_THRESHOLD
    }
}

impl Environment for CartPole {
    fn action_count(&self) -> usize {
        CARTPOLE_ACTIONS
    }

    fn feature_count(&self) -> usize {
        CARTPOLE_FEATURES
    }

    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        for value in self.state.iter_mut() {
            *value = self.rng.gen_range(-INIT_RANGE..INIT_RANGE);
        }
        self.steps = 0;
        self.done = false;
        Ok(self.state.to_vec())
    }

    fn step(&mut self, action: usize) -> Result<Step, EnvError> {
        if action >= CARTPOLE_ACTIONS {
            return Err(EnvError::InvalidAction {
                action,
                n_actions: CARTPOLE_ACTIONS,
            });
        }
        if self.done {
            return Err(EnvError::EpisodeFinished);
        }

        let [x, x_dot, theta, theta_dot] = self.state;
        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let cos_theta = theta.cos();
        let sin_theta = theta.sin();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (POLE_HALF_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        self.state = [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ];
        self.steps += 1;
        self.done = self.has_fallen() || self.steps >= self.max_steps;

        Ok(Step {
            observation: self.state.to_vec(),
            reward: 1.0,
            done: self.done,
        })
    }
}
