#![warn(missing_docs)]
//! Core of a Q-learning driver for f1tenth vehicles.
//!
//! * [`replay_buffer`]: fixed-capacity [`SampleStore`](replay_buffer::SampleStore)
//!   with optional compression and prioritized sampling.
//! * [`Agent`]: online and target [`Learner`]s, synchronized periodically.
//! * [`EpsilonGreedy`]: action selection with a decaying exploration rate.
//! * [`Trainer`]: alternating training and evaluation epochs on an [`Env`],
//!   stopped with a [`CancellationToken`].
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;

mod agent;
mod base;
mod cancel;
mod explorer;
mod trainer;

pub use agent::{Agent, AgentConfig};
pub use base::{ActionId, Env, Learner, Sample, State, Step, TrainBatch, WeightTensor, Weights};
pub use cancel::{spawn_stop_observer, CancellationToken};
pub use explorer::{EpsilonGreedy, EpsilonGreedyConfig};
pub use trainer::{Trainer, TrainerConfig};
