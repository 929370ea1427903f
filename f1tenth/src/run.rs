//! Wiring of a training run.
use crate::{args::Args, config::DriverConfig};
use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use f1tenth_candle_agent::QNet;
use f1tenth_core::{spawn_stop_observer, Agent, CancellationToken, Env, Trainer};
use f1tenth_sim_env::SimEnv;
use f1tenth_tensorboard::TensorboardRecorder;
use log::info;
use std::{
    fs,
    io::{stdin, BufReader},
    path::{Path, PathBuf},
};

/// Name of the output directory of a run started at `time`.
pub fn run_dir_name(time: DateTime<Local>) -> String {
    time.format("run-out-%Y-%m-%d-%H-%M-%S").to_string()
}

/// Builds a trainer on the simulated vehicle.
///
/// If `model` is given, the online network is loaded from this checkpoint
/// directory and the target network is synchronized to it.
pub fn build_trainer(
    config: &DriverConfig,
    model: Option<&Path>,
    cancel: CancellationToken,
) -> Result<Trainer<SimEnv, QNet>> {
    let env = SimEnv::build(&config.env, config.seed as i64)?;
    let mut agent = Agent::<QNet>::build(&config.agent, &config.qnet)?;
    if let Some(path) = model {
        agent.load(path)?;
    }
    Trainer::build(
        config.trainer.clone(),
        env,
        agent,
        &config.replay_buffer,
        &config.explorer,
        cancel,
    )
}

/// Trains until `q` is entered on the standard input.
///
/// Everything the run produces goes in a new directory of the current
/// directory: `config.yaml`, checkpoints `model-{step}` and TensorBoard logs.
pub fn run(args: &Args) -> Result<()> {
    if !args.simulator {
        bail!("Driving the real car is not supported by this build, use --simulator");
    }

    let run_dir = PathBuf::from(run_dir_name(Local::now()));
    fs::create_dir(&run_dir)?;
    let config = DriverConfig::from_args(args, &run_dir);
    config.save(run_dir.join("config.yaml"))?;
    info!("Output directory: {:?}", run_dir);

    let cancel = CancellationToken::new();
    spawn_stop_observer(BufReader::new(stdin()), cancel.clone());

    let mut trainer = build_trainer(&config, args.model.as_deref(), cancel)?;
    let mut recorder = TensorboardRecorder::new(run_dir.join("logs"));
    trainer.train(&mut recorder)?;

    trainer.agent().save(&run_dir.join("model-final"))?;
    info!("Stopped after {} steps", trainer.env().step_number());
    Ok(())
}
