use anyhow::Result;
use f1tenth_candle_agent::{Arch, OptimizerConfig, QNet, QNetConfig};
use f1tenth_core::{Agent, AgentConfig, Sample, State};
use ndarray::ArrayD;
use tempdir::TempDir;

const STATE_SIZE: usize = 16;
const HISTORY: usize = 2;
const NUM_ACTIONS: usize = 3;

fn state(t: usize) -> State {
    let data = (0..STATE_SIZE * HISTORY)
        .map(|i| ((t + i) % 13) as f32 / 13.0)
        .collect::<Vec<_>>();
    ArrayD::from_shape_vec(vec![STATE_SIZE, HISTORY], data).unwrap()
}

fn batch(n: usize) -> Vec<Sample> {
    (0..n)
        .map(|t| {
            Sample::new(
                state(t),
                t % NUM_ACTIONS,
                if t % 4 == 0 { 1.0 } else { 0.0 },
                state(t + 1),
                t % 5 == 4,
            )
        })
        .collect()
}

fn qnet_config() -> QNetConfig {
    QNetConfig::default()
        .arch(Arch::Cnn1d)
        .state_size(STATE_SIZE)
        .history_length(HISTORY)
        .num_actions(NUM_ACTIONS)
        .opt_config(OptimizerConfig::Adam { lr: 0.001 })
}

#[test]
fn test_target_follows_online_network() -> Result<()> {
    let config = AgentConfig::default()
        .batch_size(8)
        .target_model_update_freq(2);
    let mut agent = Agent::<QNet>::build(&config, &qnet_config())?;
    assert_eq!(agent.online_weights()?, agent.target_weights()?);

    let batch = batch(8);
    agent.train(&batch, 1)?;
    assert_ne!(agent.online_weights()?, agent.target_weights()?);

    let record = agent.train(&batch, 2)?;
    assert!(record.get_scalar("loss")?.is_finite());
    assert_eq!(agent.n_opts(), 2);
    assert_eq!(agent.online_weights()?, agent.target_weights()?);
    Ok(())
}

#[test]
fn test_checkpoint_and_resume() -> Result<()> {
    let dir = TempDir::new("agent")?;
    let config = AgentConfig::default()
        .batch_size(8)
        .save_model_freq(3)
        .model_dir(Some(dir.path()));
    let mut agent = Agent::<QNet>::build(&config, &qnet_config())?;

    let batch = batch(8);
    for step in 1..=3 {
        agent.train(&batch, step * 10)?;
    }
    let checkpoint = dir.path().join("model-30");
    assert!(checkpoint.join("qnet.safetensors").exists());

    let mut resumed = Agent::<QNet>::build(&AgentConfig::default(), &qnet_config())?;
    resumed.load(&checkpoint)?;
    for t in 0..4 {
        assert_eq!(
            agent.action_values(&state(t))?,
            resumed.action_values(&state(t))?
        );
    }
    assert_eq!(resumed.online_weights()?, resumed.target_weights()?);
    Ok(())
}
