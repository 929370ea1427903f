//! Epoch-based training and evaluation.
mod config;
use crate::{
    error::F1tenthError,
    record::{Record, RecordValue::Scalar, Recorder},
    replay_buffer::{ReplayBufferConfig, SampleStore, Sampler},
    Agent, CancellationToken, Env, EpsilonGreedy, EpsilonGreedyConfig, Learner, Sample, State,
};
use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Local};
pub use config::TrainerConfig;
use log::{info, trace};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs training and evaluation epochs on an environment.
///
/// # Epochs
///
/// An epoch runs whole episodes until the number of environment steps since
/// the start of the epoch reaches a minimum. Every step of an episode goes as
/// follows:
///
/// 1. Take the exploration rate. In a training epoch this is the decaying
///    rate, which is then decayed once and carries over to later epochs. In
///    an evaluation epoch it is a fixed value and nothing decays.
/// 2. Select an action with [`EpsilonGreedy`]. The first step of an episode
///    has no previous state and its action is random.
/// 3. Step the environment.
/// 4. In a training epoch, if there is a previous state, store the
///    transition in the [`SampleStore`]. Once the total number of
///    environment steps exceeds `observation_steps` and the episode step is
///    a multiple of `frame`, draw a batch with the [`Sampler`] and train the
///    [`Agent`].
/// 5. If the step is terminal, forget the state.
///
/// A finished episode adds its score to the epoch. The epoch returns the
/// average score of its episodes, or `0` if none finished.
///
/// # Cancellation
///
/// The [`CancellationToken`] is checked before every step and before every
/// episode. An in-flight step always completes; an episode interrupted this
/// way is neither counted nor reset.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> RunningEpisode
///     RunningEpisode --> RunningEpisode: step
///     RunningEpisode --> EpisodeTerminal: terminal step
///     EpisodeTerminal --> RunningEpisode: steps remain
///     EpisodeTerminal --> EpochDone: budget reached
///     RunningEpisode --> EpochDone: cancelled
///     EpisodeTerminal --> EpochDone: cancelled
///     EpochDone --> [*]
/// ```
pub struct Trainer<E: Env, L: Learner> {
    config: TrainerConfig,
    env: E,
    agent: Agent<L>,
    store: SampleStore,
    sampler: Sampler,
    explorer: EpsilonGreedy,

    /// Exploration rate of training, kept across epochs.
    train_epsilon: f64,

    cancel: CancellationToken,
    start_time: DateTime<Local>,
    last_loss: Option<f32>,
}

impl<E: Env, L: Learner> Trainer<E, L> {
    /// Constructs a trainer.
    ///
    /// Fails if the environment and the agent disagree on the number of
    /// actions, the replay buffer has no capacity or `frame` is zero.
    pub fn build(
        config: TrainerConfig,
        env: E,
        agent: Agent<L>,
        replay_buffer_config: &ReplayBufferConfig,
        explorer_config: &EpsilonGreedyConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        if env.num_actions() != agent.num_actions() {
            return Err(F1tenthError::ActionSpaceMismatch {
                env: env.num_actions(),
                learner: agent.num_actions(),
            }
            .into());
        }
        if config.frame == 0 {
            bail!("frame must be at least 1");
        }

        let store = SampleStore::build(replay_buffer_config)?;
        let sampler = Sampler::new(replay_buffer_config.seed);
        let explorer = EpsilonGreedy::build(explorer_config, env.num_actions());
        let train_epsilon = explorer.initial_epsilon();

        Ok(Self {
            config,
            env,
            agent,
            store,
            sampler,
            explorer,
            train_epsilon,
            cancel,
            start_time: Local::now(),
            last_loss: None,
        })
    }

    /// Current exploration rate of training.
    pub fn epsilon(&self) -> f64 {
        self.train_epsilon
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The agent.
    pub fn agent(&self) -> &Agent<L> {
        &self.agent
    }

    /// The replay buffer.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Runs an epoch of at least `min_epoch_steps` environment steps.
    ///
    /// Trains if `eval_epsilon` is `None`, otherwise evaluates with the given
    /// exploration rate. Returns the average score of the finished episodes.
    pub fn run_epoch(
        &mut self,
        min_epoch_steps: usize,
        eval_epsilon: Option<f64>,
        recorder: &mut dyn Recorder,
    ) -> Result<f32> {
        let is_training = eval_epsilon.is_none();
        let step_start = self.env.step_number();
        let mut episodes = 0usize;
        let mut total_score = 0f32;

        while self.env.step_number() - step_start < min_epoch_steps && !self.cancel.is_cancelled() {
            let mut state: Option<State> = None;

            while !self.env.is_game_over() && !self.cancel.is_cancelled() {
                let epsilon = match eval_epsilon {
                    Some(epsilon) => epsilon,
                    None => {
                        let epsilon = self.train_epsilon;
                        self.train_epsilon = self.explorer.decay(epsilon);
                        epsilon
                    }
                };

                let action = self.explorer.select(state.as_ref(), epsilon, &self.agent)?;
                let old_state = state.take();
                let step = self.env.step(action)?;
                trace!("action = {}, reward = {}", action, step.reward);

                if is_training {
                    if let Some(old_state) = old_state {
                        let sample = Sample::new(
                            old_state,
                            action,
                            step.reward,
                            step.state.clone(),
                            step.is_terminal,
                        );
                        self.store.add(sample)?;
                        self.train_step()?;
                    }
                    self.record_stats(recorder);
                }

                if !step.is_terminal {
                    state = Some(step.state);
                }
            }

            if !self.env.is_game_over() {
                // cancelled in the middle of the episode
                break;
            }

            let score = self.env.game_score();
            let elapsed = format_elapsed(Local::now() - self.start_time);
            let mut record = Record::from_scalar("env_steps", self.env.step_number() as f32);
            if is_training {
                info!(
                    "Episode {} ended with score: {} ({} elapsed)",
                    self.env.game_number(),
                    score,
                    elapsed
                );
                info!("epsilon {}", self.train_epsilon);
                record.insert("episode_score", Scalar(score));
                record.insert("epsilon", Scalar(self.train_epsilon as f32));
            } else {
                info!(
                    "Eval {} ended with score: {} ({} elapsed)",
                    self.env.game_number(),
                    score,
                    elapsed
                );
                record.insert("eval_episode_score", Scalar(score));
            }
            recorder.write(record);

            total_score += score;
            episodes += 1;
            self.env.reset_game()?;
        }

        let average = match episodes {
            0 => 0.0,
            n => total_score / n as f32,
        };
        let key = match is_training {
            true => "average_training_score",
            false => "average_eval_score",
        };
        let mut record = Record::from_scalar("env_steps", self.env.step_number() as f32);
        record.insert(key, Scalar(average));
        recorder.write(record);

        Ok(average)
    }

    /// Alternates training and evaluation epochs until cancelled.
    pub fn train(&mut self, recorder: &mut dyn Recorder) -> Result<()> {
        while !self.cancel.is_cancelled() {
            let score = self.run_epoch(self.config.train_epoch_steps, None, recorder)?;
            info!("Average training score: {}", score);
            let score = self.run_epoch(
                self.config.eval_epoch_steps,
                Some(self.config.eval_epsilon),
                recorder,
            )?;
            info!("Average eval score: {}", score);
        }
        Ok(())
    }

    fn train_step(&mut self) -> Result<()> {
        let step_number = self.env.step_number();
        if step_number <= self.config.observation_steps {
            return Ok(());
        }
        if self.env.episode_step_number() % self.config.frame != 0 {
            return Ok(());
        }

        let batch = self.sampler.draw(&self.store, self.agent.batch_size())?;
        let record = self.agent.train(&batch, step_number)?;
        self.last_loss = record.get_scalar("loss").ok();
        Ok(())
    }

    fn record_stats(&self, recorder: &mut dyn Recorder) {
        let freq = self.config.stats_logging_freq;
        let step_number = self.env.step_number();
        if freq == 0 || step_number % freq != 0 {
            return;
        }

        let mut record = Record::from_scalar("env_steps", step_number as f32);
        record.insert("epsilon", Scalar(self.train_epsilon as f32));
        record.insert("replay_size", Scalar(self.store.size() as f32));
        record.insert("n_opts", Scalar(self.agent.n_opts() as f32));
        if let Some(loss) = self.last_loss {
            record.insert("loss", Scalar(loss));
        }
        recorder.write(record);
    }
}

/// Formats a duration as `H:MM:SS.mmm`.
fn format_elapsed(d: Duration) -> String {
    let ms = d.num_milliseconds().max(0);
    format!(
        "{}:{:02}:{:02}.{:03}",
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1000) % 60,
        ms % 1000
    )
}
