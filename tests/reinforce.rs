use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use rand::SeedableRng;
use rand::rngs::StdRng;

use cartpole_pg::{
    AgentConfig, AgentError, CartPole, EpisodeBuffer, Environment, PolicyGradient,
    TrainingConfig, discount_rewards, normalize_returns, run_episode, running_mean, train,
};

type Backend = Autodiff<NdArray<f32>>;

const TOLERANCE: f32 = 1.0e-4;

#[test]
fn worked_example_three_unit_rewards() {
    let raw = discount_rewards(&[1.0, 1.0, 1.0], 0.95);
    let expected_raw = [2.8525, 1.95, 1.0];
    for (actual, expected) in raw.iter().zip(expected_raw) {
        assert!((actual - expected).abs() < TOLERANCE);
    }

    let mut normalized = raw.clone();
    normalize_returns(&mut normalized);
    let expected = [1.208, 0.021, -1.229];
    for (actual, expected) in normalized.iter().zip(expected) {
        assert!((actual - expected).abs() < 1.0e-2, "{actual} vs {expected}");
    }
}

#[test]
fn single_step_episode_normalizes_to_zero() {
    let mut buffer = EpisodeBuffer::new();
    buffer.store(vec![0.0; 4], 1, 5.0);
    assert_eq!(discount_rewards(buffer.rewards(), 0.95), vec![5.0]);
    assert_eq!(buffer.compute_returns(0.95).unwrap(), vec![0.0]);
}

#[test]
fn long_episode_returns_are_standardized_and_finite() {
    let rewards: Vec<f32> = (0..200).map(|t| ((t * 7) % 5) as f32 - 1.0).collect();
    let mut returns = discount_rewards(&rewards, 0.99);
    normalize_returns(&mut returns);
    assert!(returns.iter().all(|g| g.is_finite()));
    let n = returns.len() as f32;
    let mean = returns.iter().sum::<f32>() / n;
    let variance = returns.iter().map(|g| (g - mean).powi(2)).sum::<f32>() / n;
    assert!(mean.abs() < 1.0e-3);
    assert!((variance.sqrt() - 1.0).abs() < 1.0e-3);
}

#[test]
fn agent_episode_on_cartpole_leaves_empty_buffer() {
    let mut env = CartPole::new(21, 200);
    let mut agent = PolicyGradient::<Backend, _>::new(
        env.action_count(),
        env.feature_count(),
        AgentConfig::default(),
        StdRng::seed_from_u64(21),
    )
    .expect("agent");
    let outcome = run_episode(&mut agent, &mut env).expect("episode");
    assert!(outcome.steps >= 1);
    assert_eq!(outcome.total_reward, outcome.steps as f32);
    assert!(agent.buffer().is_empty());
    assert_eq!(agent.train_and_reset(), Err(AgentError::EmptyEpisode));
}

#[test]
fn short_training_run_records_bounded_rewards() {
    let config = TrainingConfig {
        episodes: 20,
        log_interval: 10,
        plot: None,
        ..TrainingConfig::default()
    };
    let mut env = CartPole::new(config.seed, config.max_steps);
    let mut agent = PolicyGradient::<Backend, _>::new(
        env.action_count(),
        env.feature_count(),
        config.agent.clone(),
        StdRng::seed_from_u64(config.seed),
    )
    .expect("agent");
    let history = train(&mut agent, &mut env, &config, |_, _| {}).expect("training");
    assert_eq!(history.len(), 20);
    assert_eq!(agent.updates(), 20);
    assert!(
        history
            .episode_rewards
            .iter()
            .all(|reward| *reward >= 1.0 && *reward <= 200.0)
    );
    let means = running_mean(&history.episode_rewards);
    assert_eq!(means.len(), 20);
    assert!(means.iter().all(|m| m.is_finite()));
}
