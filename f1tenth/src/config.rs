//! Configuration of a run.
use crate::args::{ArchArg, Args};
use anyhow::Result;
use f1tenth_candle_agent::{Arch, Device, OptimizerConfig, QNetConfig, WeightInit};
use f1tenth_core::{
    replay_buffer::{PerConfig, ReplayBufferConfig},
    AgentConfig, EpsilonGreedyConfig, TrainerConfig,
};
use f1tenth_sim_env::{Observation, Scanner, SimEnvConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configurations of all the components of a run, saved as `config.yaml` in
/// the run directory.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DriverConfig {
    /// Seed of the environment.
    pub seed: u64,
    /// Simulated vehicle.
    pub env: SimEnvConfig,
    /// Action-value network.
    pub qnet: QNetConfig,
    /// Online and target networks.
    pub agent: AgentConfig,
    /// Replay buffer.
    pub replay_buffer: ReplayBufferConfig,
    /// Exploration.
    pub explorer: EpsilonGreedyConfig,
    /// Epochs.
    pub trainer: TrainerConfig,
}

impl DriverConfig {
    /// Resolves the arguments. Checkpoints are written in `run_dir`.
    pub fn from_args(args: &Args, run_dir: &Path) -> Self {
        let (arch, observation) = match args.arch {
            ArchArg::Dense => (Arch::Dense, Observation::Ranges),
            ArchArg::Cnn1d => (Arch::Cnn1d, Observation::Ranges),
            ArchArg::Cnn1dVelocity => (Arch::Cnn1dVelocity, Observation::RangesVelocity),
            ArchArg::Cnn2d => (
                Arch::Cnn2d {
                    width: args.image_size,
                    height: args.image_size,
                },
                Observation::Image {
                    width: args.image_size,
                    height: args.image_size,
                },
            ),
            ArchArg::Pointnet => (Arch::PointNet { features: 2 }, Observation::Points),
        };

        let env = SimEnvConfig::default()
            .scanner(Scanner {
                num_rays: args.num_rays,
                ..Scanner::default()
            })
            .observation(observation)
            .history_length(args.history_length);

        let qnet = QNetConfig::default()
            .arch(arch)
            .state_size(args.num_rays)
            .history_length(args.history_length)
            .num_actions(env.num_actions())
            .opt_config(OptimizerConfig::default().learning_rate(args.learning_rate))
            .weight_init(match args.normalize_weights {
                true => WeightInit::FanInUniform,
                false => WeightInit::VarianceScaling,
            })
            .device(match args.cuda {
                Some(n) => Device::Cuda(n),
                None => Device::Cpu,
            });

        let agent = AgentConfig::default()
            .discount_factor(args.gamma)
            .batch_size(args.batch_size)
            .target_model_update_freq(args.target_model_update_freq)
            .save_model_freq(args.save_model_freq)
            .model_dir(Some(run_dir));

        let replay_buffer = ReplayBufferConfig::default()
            .capacity(args.replay_capacity)
            .seed(args.seed)
            .compress(args.compress_replay)
            .per_config(match args.prioritized_replay {
                true => Some(PerConfig::default()),
                false => None,
            });

        let explorer = EpsilonGreedyConfig::default()
            .epsilon(args.epsilon)
            .decay(args.epsilon_decay)
            .epsilon_min(args.epsilon_min)
            .seed(args.seed);

        let trainer = TrainerConfig::default()
            .observation_steps(args.observation_steps)
            .frame(args.frame)
            .train_epoch_steps(args.train_epoch_steps)
            .eval_epoch_steps(args.eval_epoch_steps)
            .eval_epsilon(0.0)
            .stats_logging_freq(args.tensorboard_logging_freq);

        Self {
            seed: args.seed,
            env,
            qnet,
            agent,
            replay_buffer,
            explorer,
            trainer,
        }
    }

    /// Constructs [`DriverConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DriverConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
