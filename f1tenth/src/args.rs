//! Command line arguments.
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Network topology.
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum ArchArg {
    /// Dense layers over the range values.
    Dense,
    /// 1-D convolutions over the range scan.
    Cnn1d,
    /// 1-D convolutions with the velocity history.
    Cnn1dVelocity,
    /// 2-D convolutions over an occupancy image of the scan.
    Cnn2d,
    /// Point-set network over the points of the scan.
    Pointnet,
}

/// Train a deep Q-learning driver for 1/10th scale race cars.
///
/// Type `q` and enter to stop at the end of the current step.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Drive the simulated vehicle instead of the real car
    #[arg(long, default_value_t = false)]
    pub simulator: bool,

    /// Learning rate
    #[arg(long, default_value_t = 0.0004)]
    pub learning_rate: f64,

    /// Discount factor in [0, 1]
    #[arg(long, default_value_t = 0.996)]
    pub gamma: f32,

    /// Initial exploration rate in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    pub epsilon: f64,

    /// Factor applied to the exploration rate at every training step
    #[arg(long, default_value_t = 0.99988)]
    pub epsilon_decay: f64,

    /// Lower bound of the exploration rate
    #[arg(long, default_value_t = 0.1)]
    pub epsilon_min: f64,

    /// Train only after this many steps
    #[arg(long, default_value_t = 350)]
    pub observation_steps: usize,

    /// Number of training sessions between updates of the target network
    #[arg(long, default_value_t = 300)]
    pub target_model_update_freq: usize,

    /// Checkpoint directory to initialize the network from
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Train once every this many steps of an episode
    #[arg(long, default_value_t = 2)]
    pub frame: usize,

    /// Minimum number of steps of a training epoch
    #[arg(long, default_value_t = 5000)]
    pub train_epoch_steps: usize,

    /// Minimum number of steps of an evaluation epoch
    #[arg(long, default_value_t = 500)]
    pub eval_epoch_steps: usize,

    /// Number of transitions kept for training
    #[arg(long, default_value_t = 100000)]
    pub replay_capacity: usize,

    /// Draw terminal and rewarded transitions more often
    #[arg(long, default_value_t = false)]
    pub prioritized_replay: bool,

    /// Store states compressed in the replay buffer
    #[arg(long, default_value_t = false)]
    pub compress_replay: bool,

    /// Initialize parameters uniformly scaled by the fan-in, like torch
    #[arg(long, default_value_t = false)]
    pub normalize_weights: bool,

    /// Save the network once every this many training sessions
    #[arg(long, default_value_t = 2000)]
    pub save_model_freq: usize,

    /// Write training statistics once every this many steps
    #[arg(long, default_value_t = 300)]
    pub tensorboard_logging_freq: usize,

    /// Network topology
    #[arg(long, value_enum, default_value_t = ArchArg::Cnn1d)]
    pub arch: ArchArg,

    /// Number of transitions of a training batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of stacked sensor frames in a state
    #[arg(long, default_value_t = 2)]
    pub history_length: usize,

    /// Number of rays of the simulated range scanner
    #[arg(long, default_value_t = 1080)]
    pub num_rays: usize,

    /// Width and height of the occupancy image of cnn2d
    #[arg(long, default_value_t = 64)]
    pub image_size: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Ordinal of the GPU to use instead of the CPU
    #[arg(long)]
    pub cuda: Option<usize>,
}
