use anyhow::Result;
use clap::Parser;
use f1tenth::{build_trainer, Args, DriverConfig};
use f1tenth_core::{
    record::{BufferedRecorder, NullRecorder},
    CancellationToken, Env,
};
use std::fs;
use tempdir::TempDir;

fn config(arch: &str, run_dir: &std::path::Path) -> Result<DriverConfig> {
    let args = Args::try_parse_from([
        "f1tenth",
        "--simulator",
        "--arch",
        arch,
        "--num-rays",
        "16",
        "--image-size",
        "16",
        "--observation-steps",
        "10",
        "--frame",
        "1",
        "--batch-size",
        "4",
        "--target-model-update-freq",
        "5",
        "--save-model-freq",
        "10",
        "--tensorboard-logging-freq",
        "10",
    ])?;
    let mut config = DriverConfig::from_args(&args, run_dir);
    config.env.max_episode_steps = 20;
    Ok(config)
}

#[test]
fn test_train_and_eval_epochs() -> Result<()> {
    let dir = TempDir::new("train")?;
    let config = config("cnn1d", dir.path())?;
    let mut trainer = build_trainer(&config, None, CancellationToken::new())?;

    let mut recorder = BufferedRecorder::new();
    trainer.run_epoch(40, None, &mut recorder)?;
    let steps = trainer.env().step_number();
    assert!(steps >= 40);
    assert!(trainer.agent().n_opts() > 0);
    assert!(trainer.store().size() > 0);
    assert!(trainer.epsilon() < 1.0);
    assert!(recorder
        .iter()
        .any(|r| r.get_scalar("average_training_score").is_ok()));

    let epsilon = trainer.epsilon();
    let n_opts = trainer.agent().n_opts();
    trainer.run_epoch(10, Some(0.0), &mut NullRecorder::new())?;
    assert_eq!(trainer.epsilon(), epsilon);
    assert_eq!(trainer.agent().n_opts(), n_opts);

    let checkpoints = fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("model-"))
        .count();
    assert!(checkpoints > 0);
    Ok(())
}

#[test]
fn test_resume_from_checkpoint() -> Result<()> {
    let dir = TempDir::new("resume")?;
    let config = config("pointnet", dir.path())?;
    let trainer = build_trainer(&config, None, CancellationToken::new())?;
    let checkpoint = dir.path().join("initial");
    trainer.agent().save(&checkpoint)?;

    let resumed = build_trainer(&config, Some(&checkpoint), CancellationToken::new())?;
    assert_eq!(
        trainer.agent().online_weights()?,
        resumed.agent().online_weights()?
    );
    assert_eq!(
        resumed.agent().online_weights()?,
        resumed.agent().target_weights()?
    );
    Ok(())
}

#[test]
fn test_cancelled_before_start() -> Result<()> {
    let dir = TempDir::new("cancelled")?;
    let config = config("cnn2d", dir.path())?;
    let cancel = CancellationToken::new();
    let mut trainer = build_trainer(&config, None, cancel.clone())?;

    cancel.cancel();
    trainer.train(&mut NullRecorder::new())?;
    assert_eq!(trainer.env().step_number(), 0);
    Ok(())
}
