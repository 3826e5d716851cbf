use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::log_softmax;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{Tensor, TensorData};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::debug;

use super::buffer::EpisodeBuffer;
use super::policy::PolicyNetwork;
use crate::config::AgentConfig;
use crate::error::AgentError;

/// REINFORCE agent: samples actions from its policy, buffers one episode, and
/// takes a single Adam step on the return-weighted log-likelihood when it ends.
pub struct PolicyGradient<B: AutodiffBackend, R: Rng> {
    model: PolicyNetwork<B>,
    optimizer: OptimizerAdaptor<Adam, PolicyNetwork<B>, B>,
    config: AgentConfig,
    buffer: EpisodeBuffer,
    rng: R,
    updates: usize,
}

impl<B, R> PolicyGradient<B, R>
where
    B: AutodiffBackend,
    B::Device: Default,
    R: Rng,
{
    pub fn new(
        n_actions: usize,
        n_features: usize,
        config: AgentConfig,
        rng: R,
    ) -> Result<Self, AgentError> {
        if n_actions == 0 {
            return Err(AgentError::InvalidConfiguration(
                "action count must be positive",
            ));
        }
        if n_features == 0 {
            return Err(AgentError::InvalidConfiguration(
                "feature count must be positive",
            ));
        }
        config.validate()?;
        let model = PolicyNetwork::new(n_features, config.hidden, n_actions);
        Ok(Self {
            model,
            optimizer: AdamConfig::new().init(),
            config,
            buffer: EpisodeBuffer::new(),
            rng,
            updates: 0,
        })
    }

    pub fn model(&self) -> &PolicyNetwork<B> {
        &self.model
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn buffer(&self) -> &EpisodeBuffer {
        &self.buffer
    }

    /// Number of gradient steps taken so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn n_actions(&self) -> usize {
        self.model.n_actions()
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    pub fn action_probabilities(&self, observation: &[f32]) -> Result<Vec<f32>, AgentError> {
        self.model.probabilities_for(observation)
    }

    /// Draws an action from the policy's categorical distribution over `observation`.
    pub fn sample_action(&mut self, observation: &[f32]) -> Result<usize, AgentError> {
        let probs = self.action_probabilities(observation)?;
        let distribution =
            WeightedIndex::new(&probs).map_err(|err| AgentError::Sampling(err.to_string()))?;
        Ok(distribution.sample(&mut self.rng))
    }

    pub fn store(
        &mut self,
        observation: Vec<f32>,
        action: usize,
        reward: f32,
    ) -> Result<(), AgentError> {
        if observation.len() != self.n_features() {
            return Err(AgentError::ObservationShape {
                expected: self.n_features(),
                actual: observation.len(),
            });
        }
        self.check_action(action)?;
        self.buffer.store(observation, action, reward);
        Ok(())
    }

    pub fn compute_returns(&self) -> Result<Vec<f32>, AgentError> {
        self.buffer.compute_returns(self.config.gamma)
    }

    /// Drops any buffered transitions without training on them.
    pub fn reset_episode(&mut self) {
        self.buffer.clear();
    }

    /// Trains on the buffered episode and starts a fresh one.
    ///
    /// An empty buffer is rejected without touching the model. Otherwise the
    /// buffer is cleared whether or not the update succeeds.
    pub fn train_and_reset(&mut self) -> Result<f32, AgentError> {
        let returns = self.compute_returns()?;
        let episode = std::mem::take(&mut self.buffer);
        self.update(episode.observations(), episode.actions(), &returns)
    }

    /// One Adam step on `mean(cross_entropy(action, policy) * return)`. Returns the loss.
    pub fn update(
        &mut self,
        observations: &[Vec<f32>],
        actions: &[usize],
        returns: &[f32],
    ) -> Result<f32, AgentError> {
        if observations.len() != actions.len() || actions.len() != returns.len() {
            return Err(AgentError::BatchMismatch {
                observations: observations.len(),
                actions: actions.len(),
                returns: returns.len(),
            });
        }
        if observations.is_empty() {
            return Err(AgentError::EmptyEpisode);
        }
        let batch_size = observations.len();
        let n_actions = self.n_actions();
        let mut targets = vec![0.0f32; batch_size * n_actions];
        for (row, &action) in actions.iter().enumerate() {
            self.check_action(action)?;
            targets[row * n_actions + action] = 1.0;
        }

        let device = B::Device::default();
        let states = self.model.observations_tensor(observations)?;
        let targets =
            Tensor::<B, 2>::from_data(TensorData::new(targets, [batch_size, n_actions]), &device);
        let weights = Tensor::<B, 2>::from_data(
            TensorData::new(returns.to_vec(), [batch_size, 1]),
            &device,
        );

        let loss = Self::loss(&self.model, states, targets, weights);
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        let model = self.model.clone();
        self.model = self
            .optimizer
            .step(self.config.learning_rate, model, grads);
        self.updates += 1;

        let loss = Self::tensor_to_f32(loss)?;
        debug!(update = self.updates, steps = batch_size, loss, "policy updated");
        Ok(loss)
    }

    fn loss(
        model: &PolicyNetwork<B>,
        states: Tensor<B, 2>,
        targets: Tensor<B, 2>,
        weights: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let log_probs = log_softmax(model.forward(states), 1);
        let cross_entropy = -(targets * log_probs).sum_dim(1);
        (cross_entropy * weights).mean()
    }

    fn check_action(&self, action: usize) -> Result<(), AgentError> {
        if action >= self.n_actions() {
            return Err(AgentError::ActionOutOfRange {
                action,
                n_actions: self.n_actions(),
            });
        }
        Ok(())
    }

    fn tensor_to_f32(tensor: Tensor<B, 1>) -> Result<f32, AgentError> {
        tensor
            .detach()
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| AgentError::Tensor(format!("{err:?}")))?
            .pop()
            .ok_or_else(|| AgentError::Tensor("empty loss tensor".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type Backend = Autodiff<NdArray<f32>>;

    fn agent(seed: u64) -> PolicyGradient<Backend, StdRng> {
        PolicyGradient::new(2, 4, AgentConfig::default(), StdRng::seed_from_u64(seed))
            .expect("agent")
    }

    #[test]
    fn sampled_actions_stay_in_range_and_cover_both_choices() {
        let mut agent = agent(1);
        let observation = [0.01, -0.02, 0.03, 0.0];
        let mut seen = [false; 2];
        for _ in 0..200 {
            let action = agent.sample_action(&observation).expect("action");
            assert!(action < 2);
            seen[action] = true;
        }
        assert!(seen[0] && seen[1], "a fresh policy should explore both actions");
    }

    #[test]
    fn update_changes_the_policy() {
        let mut agent = agent(2);
        let observations = vec![vec![0.5, -0.5, 0.25, 1.0], vec![-0.3, 0.2, 0.1, -1.0]];
        let before = agent.action_probabilities(&observations[0]).unwrap();
        let loss = agent
            .update(&observations, &[0, 1], &[1.0, -1.0])
            .expect("update");
        assert!(loss.is_finite());
        let after = agent.action_probabilities(&observations[0]).unwrap();
        assert_ne!(before, after);
        assert_eq!(agent.updates(), 1);
    }

    #[test]
    fn positive_return_raises_probability_of_taken_action() {
        let mut agent = agent(3);
        let observation = vec![0.2, 0.1, -0.1, 0.3];
        let before = agent.action_probabilities(&observation).unwrap()[1];
        agent
            .update(&[observation.clone()], &[1], &[1.0])
            .expect("update");
        let after = agent.action_probabilities(&observation).unwrap()[1];
        assert!(after > before, "{after} should exceed {before}");
    }

    #[test]
    fn train_and_reset_clears_buffer() {
        let mut agent = agent(4);
        for step in 0..5 {
            agent
                .store(vec![0.1 * step as f32, 0.0, 0.0, 0.0], step % 2, 1.0)
                .expect("store");
        }
        assert_eq!(agent.buffer().len(), 5);
        agent.train_and_reset().expect("train");
        assert!(agent.buffer().is_empty());
        assert!(agent.buffer().observations().is_empty());
        assert!(agent.buffer().actions().is_empty());
    }

    #[test]
    fn train_and_reset_on_empty_buffer_fails_cleanly() {
        let mut agent = agent(5);
        assert_eq!(agent.train_and_reset(), Err(AgentError::EmptyEpisode));
        assert_eq!(agent.updates(), 0);
    }

    #[test]
    fn single_step_episode_trains_without_nan() {
        let mut agent = agent(6);
        agent.store(vec![0.0, 0.1, 0.2, 0.3], 0, 5.0).unwrap();
        assert_eq!(agent.compute_returns().unwrap(), vec![0.0]);
        let loss = agent.train_and_reset().expect("train");
        assert!(loss.is_finite());
        let probs = agent.action_probabilities(&[0.0, 0.1, 0.2, 0.3]).unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn store_rejects_contract_violations() {
        let mut agent = agent(7);
        assert_eq!(
            agent.store(vec![0.0; 3], 0, 1.0),
            Err(AgentError::ObservationShape {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            agent.store(vec![0.0; 4], 2, 1.0),
            Err(AgentError::ActionOutOfRange {
                action: 2,
                n_actions: 2
            })
        );
        assert!(agent.buffer().is_empty());
    }

    #[test]
    fn update_rejects_mismatched_batch() {
        let mut agent = agent(8);
        let result = agent.update(&[vec![0.0; 4]], &[0, 1], &[1.0]);
        assert!(matches!(result, Err(AgentError::BatchMismatch { .. })));
    }

    #[test]
    fn new_rejects_invalid_configuration() {
        let result = PolicyGradient::<Backend, StdRng>::new(
            2,
            4,
            AgentConfig::default().with_gamma(2.0),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(AgentError::InvalidConfiguration(_))));
        let result = PolicyGradient::<Backend, StdRng>::new(
            0,
            4,
            AgentConfig::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(AgentError::InvalidConfiguration(_))));
    }

    #[test]
    fn returns_depend_only_on_the_current_episode() {
        let mut agent = agent(9);
        for reward in [10.0, -3.0, 7.0, 0.5] {
            agent.store(vec![0.2, 0.0, -0.1, 0.0], 1, reward).unwrap();
        }
        agent.train_and_reset().expect("first episode");

        let second = [1.0, 2.0, 0.0];
        let mut fresh = EpisodeBuffer::new();
        for reward in second {
            agent.store(vec![0.0, 0.1, 0.0, 0.1], 0, reward).unwrap();
            fresh.store(vec![0.0, 0.1, 0.0, 0.1], 0, reward);
        }
        assert_eq!(
            agent.compute_returns().unwrap(),
            fresh.compute_returns(agent.config().gamma).unwrap()
        );
    }

    #[test]
    fn reset_episode_discards_partial_episode() {
        let mut agent = agent(10);
        agent.store(vec![0.0; 4], 0, 100.0).unwrap();
        agent.store(vec![0.0; 4], 1, -50.0).unwrap();
        agent.reset_episode();
        assert!(agent.buffer().is_empty());
        assert_eq!(agent.updates(), 0);

        agent.store(vec![0.0; 4], 1, 5.0).unwrap();
        assert_eq!(agent.compute_returns().unwrap(), vec![0.0]);
    }
}
