use anyhow::Result;
use f1tenth_core::{
    dummy::{DummyEnv, DummyEnvConfig, DummyLearner, DummyLearnerConfig},
    error::F1tenthError,
    record::{BufferedRecorder, NullRecorder},
    replay_buffer::ReplayBufferConfig,
    Agent, AgentConfig, CancellationToken, Env, EpsilonGreedyConfig, Trainer, TrainerConfig,
};

const EPISODE_LEN: usize = 5;
const NUM_ACTIONS: usize = 3;
const STATE_SIZE: usize = 4;

fn env_config() -> DummyEnvConfig {
    DummyEnvConfig::default()
        .episode_len(EPISODE_LEN)
        .num_actions(NUM_ACTIONS)
        .state_size(STATE_SIZE)
        .reward(1.0)
}

fn trainer(
    config: TrainerConfig,
    env_config: &DummyEnvConfig,
    explorer_config: &EpsilonGreedyConfig,
    cancel: CancellationToken,
) -> Result<Trainer<DummyEnv, DummyLearner>> {
    let env = DummyEnv::build(env_config, 0)?;
    let learner_config = DummyLearnerConfig::default()
        .num_actions(NUM_ACTIONS)
        .state_shape(vec![STATE_SIZE]);
    let agent = Agent::build(&AgentConfig::default().batch_size(4), &learner_config)?;
    let replay_buffer_config = ReplayBufferConfig::default().capacity(100);
    Trainer::build(
        config,
        env,
        agent,
        &replay_buffer_config,
        explorer_config,
        cancel,
    )
}

#[test]
fn test_epoch_of_two_episodes() -> Result<()> {
    let config = TrainerConfig::default().observation_steps(0).frame(1);
    let mut trainer = trainer(
        config,
        &env_config(),
        &EpsilonGreedyConfig::default(),
        CancellationToken::new(),
    )?;

    let score = trainer.run_epoch(10, None, &mut NullRecorder::new())?;
    assert_eq!(score, 5.0);
    assert_eq!(trainer.env().game_number(), 2);
    assert_eq!(trainer.env().step_number(), 10);
    // the first step of an episode has no previous state
    assert_eq!(trainer.store().size(), 8);
    assert_eq!(trainer.agent().n_opts(), 8);
    Ok(())
}

#[test]
fn test_epoch_finishes_the_last_episode() -> Result<()> {
    let mut trainer = trainer(
        TrainerConfig::default(),
        &env_config(),
        &EpsilonGreedyConfig::default(),
        CancellationToken::new(),
    )?;

    let score = trainer.run_epoch(12, None, &mut NullRecorder::new())?;
    assert_eq!(score, 5.0);
    assert_eq!(trainer.env().game_number(), 3);
    assert_eq!(trainer.env().step_number(), 15);
    Ok(())
}

#[test]
fn test_observation_steps_and_frame() -> Result<()> {
    let config = TrainerConfig::default().observation_steps(7).frame(2);
    let mut trainer = trainer(
        config,
        &env_config(),
        &EpsilonGreedyConfig::default(),
        CancellationToken::new(),
    )?;

    trainer.run_epoch(10, None, &mut NullRecorder::new())?;
    // only step 9, the 4th step of the second episode, passes both gates
    assert_eq!(trainer.agent().n_opts(), 1);
    Ok(())
}

#[test]
fn test_cancel_mid_episode() -> Result<()> {
    let cancel = CancellationToken::new();
    let env_config = env_config().cancel_at(3, cancel.clone());
    let mut trainer = trainer(
        TrainerConfig::default(),
        &env_config,
        &EpsilonGreedyConfig::default(),
        cancel.clone(),
    )?;

    let score = trainer.run_epoch(100, None, &mut NullRecorder::new())?;
    assert_eq!(score, 0.0);
    assert_eq!(trainer.env().step_number(), 3);
    assert_eq!(trainer.env().game_number(), 0);

    // nothing runs once cancelled
    let score = trainer.run_epoch(100, Some(0.0), &mut NullRecorder::new())?;
    assert_eq!(score, 0.0);
    assert_eq!(trainer.env().step_number(), 3);
    Ok(())
}

#[test]
fn test_cancel_after_an_episode() -> Result<()> {
    let cancel = CancellationToken::new();
    let env_config = env_config().reward(2.0).cancel_at(7, cancel.clone());
    let mut trainer = trainer(
        TrainerConfig::default(),
        &env_config,
        &EpsilonGreedyConfig::default(),
        cancel,
    )?;

    let score = trainer.run_epoch(100, None, &mut NullRecorder::new())?;
    assert_eq!(score, 10.0);
    assert_eq!(trainer.env().step_number(), 7);
    assert_eq!(trainer.env().game_number(), 1);
    Ok(())
}

#[test]
fn test_epsilon_decays_in_training_only() -> Result<()> {
    let explorer_config = EpsilonGreedyConfig::default()
        .epsilon(1.0)
        .decay(0.9)
        .epsilon_min(0.1);
    let config = TrainerConfig::default().observation_steps(0).frame(1);
    let mut trainer = trainer(
        config,
        &env_config(),
        &explorer_config,
        CancellationToken::new(),
    )?;
    assert_eq!(trainer.epsilon(), 1.0);

    trainer.run_epoch(10, None, &mut NullRecorder::new())?;
    let mut expected = 1.0f64;
    for _ in 0..10 {
        expected = (expected * 0.9).max(0.1);
    }
    assert!((trainer.epsilon() - expected).abs() < 1e-12);

    let epsilon = trainer.epsilon();
    let size = trainer.store().size();
    let n_opts = trainer.agent().n_opts();
    for _ in 0..3 {
        trainer.run_epoch(5, Some(0.0), &mut NullRecorder::new())?;
    }
    assert_eq!(trainer.epsilon(), epsilon);
    assert_eq!(trainer.store().size(), size);
    assert_eq!(trainer.agent().n_opts(), n_opts);

    // decay carries over to the next training epoch
    trainer.run_epoch(5, None, &mut NullRecorder::new())?;
    assert!(trainer.epsilon() < epsilon);
    Ok(())
}

#[test]
fn test_run_statistics() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = TrainerConfig::default()
        .observation_steps(0)
        .frame(1)
        .stats_logging_freq(5);
    let mut trainer = trainer(
        config,
        &env_config(),
        &EpsilonGreedyConfig::default(),
        CancellationToken::new(),
    )?;

    let mut recorder = BufferedRecorder::new();
    trainer.run_epoch(10, None, &mut recorder)?;

    let stats = recorder
        .iter()
        .filter(|r| r.get("replay_size").is_some())
        .collect::<Vec<_>>();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].get_scalar("env_steps")?, 5.0);
    assert_eq!(stats[1].get_scalar("env_steps")?, 10.0);
    assert_eq!(stats[1].get_scalar("replay_size")?, 8.0);
    assert!(stats[1].get_scalar("loss").is_ok());

    let episodes = recorder
        .iter()
        .filter_map(|r| r.get_scalar("episode_score").ok())
        .collect::<Vec<_>>();
    assert_eq!(episodes, vec![5.0, 5.0]);

    let averages = recorder
        .iter()
        .filter_map(|r| r.get_scalar("average_training_score").ok())
        .collect::<Vec<_>>();
    assert_eq!(averages, vec![5.0]);
    Ok(())
}

#[test]
fn test_train_until_cancelled() -> Result<()> {
    let cancel = CancellationToken::new();
    let env_config = env_config().cancel_at(23, cancel.clone());
    let config = TrainerConfig::default()
        .train_epoch_steps(10)
        .eval_epoch_steps(5);
    let mut trainer = trainer(
        config,
        &env_config,
        &EpsilonGreedyConfig::default(),
        cancel,
    )?;

    let mut recorder = BufferedRecorder::new();
    trainer.train(&mut recorder)?;
    assert_eq!(trainer.env().step_number(), 23);

    let train_averages = recorder
        .iter()
        .filter_map(|r| r.get_scalar("average_training_score").ok())
        .collect::<Vec<_>>();
    let eval_averages = recorder
        .iter()
        .filter_map(|r| r.get_scalar("average_eval_score").ok())
        .collect::<Vec<_>>();
    // the second training epoch completes one episode before the stop
    assert_eq!(train_averages, vec![5.0, 5.0]);
    assert_eq!(eval_averages, vec![5.0, 0.0]);
    Ok(())
}

#[test]
fn test_action_space_mismatch() -> Result<()> {
    let env = DummyEnv::build(&env_config().num_actions(5), 0)?;
    let learner_config = DummyLearnerConfig::default()
        .num_actions(NUM_ACTIONS)
        .state_shape(vec![STATE_SIZE]);
    let agent = Agent::<DummyLearner>::build(&AgentConfig::default(), &learner_config)?;
    let err = Trainer::build(
        TrainerConfig::default(),
        env,
        agent,
        &ReplayBufferConfig::default(),
        &EpsilonGreedyConfig::default(),
        CancellationToken::new(),
    )
    .err()
    .unwrap();
    assert_eq!(
        err.downcast_ref::<F1tenthError>(),
        Some(&F1tenthError::ActionSpaceMismatch { env: 5, learner: 3 })
    );
    Ok(())
}
