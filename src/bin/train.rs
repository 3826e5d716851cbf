use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cartpole_pg::{
    CartPole, Environment, PolicyGradient, TrainingConfig, render_reward_plot, train,
};

type TrainBackend = Autodiff<NdArray<f32>>;

/// Flags override the values from `--config`, which in turn override the defaults.
#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Train a REINFORCE policy on CartPole and plot its learning curve",
    version
)]
struct TrainArgs {
    /// JSON file with a training configuration; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the resolved configuration as JSON and exit.
    #[arg(long = "print-config", action = ArgAction::SetTrue)]
    print_config: bool,
    /// Number of episodes to train for [default: 3000].
    #[arg(long)]
    episodes: Option<usize>,
    /// Learning rate passed to the Adam optimizer [default: 0.02].
    #[arg(long)]
    learning_rate: Option<f64>,
    /// Reward discount factor [default: 0.95].
    #[arg(long)]
    gamma: Option<f32>,
    /// Hidden layer width for the policy network [default: 10].
    #[arg(long)]
    hidden: Option<usize>,
    /// Episodes between progress lines, 0 disables them [default: 100].
    #[arg(long)]
    log_interval: Option<usize>,
    /// Time limit for a single episode [default: 200].
    #[arg(long)]
    max_steps: Option<usize>,
    /// Seed for the environment and the action sampler.
    #[arg(long)]
    seed: Option<u64>,
    /// Output chart file [default: CartPole.png].
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,
    /// Skip writing the chart.
    #[arg(long = "no-plot", action = ArgAction::SetTrue)]
    no_plot: bool,
}

impl TrainArgs {
    fn resolve(self) -> Result<TrainingConfig, Box<dyn Error>> {
        let mut config = match self.config.as_deref() {
            Some(path) => TrainingConfig::load(path)?,
            None => TrainingConfig::default(),
        };
        if let Some(learning_rate) = self.learning_rate {
            config.agent = config.agent.with_learning_rate(learning_rate);
        }
        if let Some(gamma) = self.gamma {
            config.agent = config.agent.with_gamma(gamma);
        }
        if let Some(hidden) = self.hidden {
            config.agent = config.agent.with_hidden(hidden);
        }
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(log_interval) = self.log_interval {
            config.log_interval = log_interval;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(out) = self.out {
            config.plot = Some(out);
        }
        if self.no_plot {
            config.plot = None;
        }
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
    if let Err(err) = run(TrainArgs::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: TrainArgs) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let print_config = args.print_config;
    let config = args.resolve()?;
    config.validate()?;
    if print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }
    info!(config = %config.to_json()?, "starting training");

    let mut env = CartPole::new(config.seed, config.max_steps);
    let mut agent = PolicyGradient::<TrainBackend, _>::new(
        env.action_count(),
        env.feature_count(),
        config.agent.clone(),
        StdRng::seed_from_u64(config.seed ^ 0x9E37_79B9),
    )?;

    let history = train(&mut agent, &mut env, &config, |_, _| {})?;
    if let Some(mean) = history.recent_mean(100) {
        info!(episodes = history.len(), mean, "mean reward over the last 100 episodes");
    }

    if let Some(path) = config.plot.as_ref() {
        render_reward_plot(path, &history.episode_rewards, "CartPole")?;
        println!("Chart written to {}", path.display());
    }

    let minutes = start.elapsed().as_secs_f64() / 60.0;
    println!("This program takes {minutes:.3} minutes to run.");
    Ok(())
}
