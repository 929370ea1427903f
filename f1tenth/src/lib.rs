//! Deep Q-learning driver for 1/10th scale race cars.
//!
//! The binary parses [`Args`], resolves them into a [`DriverConfig`] and
//! trains an [`Agent`](f1tenth_core::Agent) of
//! [`QNet`](f1tenth_candle_agent::QNet)s on the simulated vehicle
//! [`SimEnv`](f1tenth_sim_env::SimEnv), alternating training and evaluation
//! epochs until stopped.
pub mod args;
mod config;
mod run;

pub use args::{ArchArg, Args};
pub use config::DriverConfig;
pub use run::{build_trainer, run, run_dir_name};
