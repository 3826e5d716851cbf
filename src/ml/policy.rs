use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::{relu, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use crate::error::AgentError;

/// Two-layer policy: dense + ReLU, then a linear projection to one logit per action.
#[derive(Module, Debug)]
pub struct PolicyNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
    n_features: usize,
    n_actions: usize,
}

impl<B> PolicyNetwork<B>
where
    B: Backend,
    B::Device: Default,
{
    /// Panics on a zero size. `PolicyGradient::new` validates these and reports
    /// `AgentError::InvalidConfiguration` instead, so build the network through the agent.
    pub fn new(n_features: usize, hidden: usize, n_actions: usize) -> Self {
        assert!(n_features > 0, "feature count must be positive");
        assert!(hidden > 0, "hidden width must be positive");
        assert!(n_actions > 0, "action count must be positive");
        let device = B::Device::default();
        let xavier = Initializer::XavierUniform { gain: 1.0 };
        let hidden_layer = LinearConfig::new(n_features, hidden)
            .with_initializer(xavier.clone())
            .init(&device);
        let output = LinearConfig::new(hidden, n_actions)
            .with_initializer(xavier)
            .init(&device);
        Self {
            hidden: hidden_layer,
            output,
            n_features,
            n_actions,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Maps `[batch, n_features]` observations to `[batch, n_actions]` logits.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let activations = relu(self.hidden.forward(input));
        self.output.forward(activations)
    }

    pub fn action_probabilities(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(input), 1)
    }

    /// Builds a `[batch, n_features]` tensor, rejecting observations of the wrong length.
    pub fn observations_tensor(
        &self,
        observations: &[Vec<f32>],
    ) -> Result<Tensor<B, 2>, AgentError> {
        let mut flat = Vec::with_capacity(observations.len() * self.n_features);
        for observation in observations {
            self.check_observation(observation)?;
            flat.extend_from_slice(observation);
        }
        Ok(Tensor::<B, 2>::from_data(
            TensorData::new(flat, [observations.len(), self.n_features]),
            &B::Device::default(),
        ))
    }

    /// Action distribution for a single observation.
    pub fn probabilities_for(&self, observation: &[f32]) -> Result<Vec<f32>, AgentError> {
        self.check_observation(observation)?;
        let input = Tensor::<B, 2>::from_data(
            TensorData::new(observation.to_vec(), [1, self.n_features]),
            &B::Device::default(),
        );
        self.action_probabilities(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| AgentError::Tensor(format!("{err:?}")))
    }

    fn check_observation(&self, observation: &[f32]) -> Result<(), AgentError> {
        if observation.len() != self.n_features {
            return Err(AgentError::ObservationShape {
                expected: self.n_features,
                actual: observation.len(),
            });
        }
        Ok(())
    }
}
