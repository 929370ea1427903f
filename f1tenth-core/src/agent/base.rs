//! Q-learning agent.
use super::AgentConfig;
use crate::{
    error::F1tenthError,
    record::{Record, RecordValue},
    ActionId, Learner, Sample, State, TrainBatch, Weights,
};
use anyhow::Result;
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Q-learning agent.
///
/// The agent owns two learners built from the same configuration. The online
/// learner selects actions and is optimized on every call of
/// [`Agent::train`]; the target learner provides the bootstrapped values
/// `max_a Q_target(s', a)` and receives a copy of the online parameters
/// every `target_model_update_freq` training calls. Between two
/// synchronizations its parameters do not change.
pub struct Agent<L: Learner> {
    online: L,
    target: L,
    discount_factor: f32,
    batch_size: usize,
    target_model_update_freq: usize,
    save_model_freq: usize,
    model_dir: Option<PathBuf>,
    steps_since_target_sync: usize,
    steps_since_checkpoint: usize,
    n_opts: usize,
}

impl<L: Learner> Agent<L> {
    /// Builds an agent, the target learner starting as a copy of the online one.
    pub fn build(config: &AgentConfig, learner_config: &L::Config) -> Result<Self> {
        let online = L::build(learner_config)?;
        let target = L::build(learner_config)?;
        let mut agent = Self {
            online,
            target,
            discount_factor: config.discount_factor,
            batch_size: config.batch_size,
            target_model_update_freq: config.target_model_update_freq,
            save_model_freq: config.save_model_freq,
            model_dir: config.model_dir.clone(),
            steps_since_target_sync: 0,
            steps_since_checkpoint: 0,
            n_opts: 0,
        };
        agent.sync_target()?;
        Ok(agent)
    }

    /// Number of actions.
    pub fn num_actions(&self) -> usize {
        self.online.num_actions()
    }

    /// Number of samples per training call.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of training calls so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Action values of the online learner.
    pub fn action_values(&self, state: &State) -> Result<Vec<f32>> {
        self.check_shape(state)?;
        let mut values = self.online.infer(&[state])?;
        Ok(values.pop().unwrap_or_default())
    }

    /// Returns the action with the highest value under the online learner.
    ///
    /// Ties resolve to the lowest action id.
    pub fn infer(&self, state: &State) -> Result<ActionId> {
        let values = self.action_values(state)?;
        Ok(argmax(&values))
    }

    /// Applies one optimization step on a batch of samples.
    ///
    /// The regression target of a sample is its reward if it is terminal,
    /// `reward + discount_factor * max_a Q_target(next_state, a)` otherwise.
    /// `global_step` names the checkpoint directory when one is written.
    ///
    /// Fails on an empty batch, a state whose shape differs from the input of
    /// the learner, or an action out of range.
    pub fn train(&mut self, batch: &[Sample], global_step: usize) -> Result<Record> {
        self.check_batch(batch)?;

        let next_states = batch
            .iter()
            .filter(|s| !s.terminal)
            .filter_map(|s| s.next_state.as_ref())
            .collect::<Vec<_>>();
        let next_values = match next_states.is_empty() {
            true => vec![],
            false => self.target.infer(&next_states)?,
        };

        let mut next_values = next_values.iter();
        let mut targets = Vec::with_capacity(batch.len());
        for sample in batch.iter() {
            let target = match (&sample.next_state, sample.terminal) {
                (Some(_), false) => {
                    let q = next_values.next().map(|v| max(v)).unwrap_or(0.0);
                    sample.reward + self.discount_factor * q
                }
                _ => sample.reward,
            };
            targets.push(target);
        }

        let train_batch = TrainBatch {
            states: batch.iter().map(|s| &s.state).collect(),
            actions: batch.iter().map(|s| s.action).collect(),
            targets,
        };
        let loss = self.online.apply_gradient_step(&train_batch)?;
        self.n_opts += 1;

        self.steps_since_target_sync += 1;
        if self.steps_since_target_sync >= self.target_model_update_freq {
            self.sync_target()?;
            self.steps_since_target_sync = 0;
            debug!("Synchronized the target model at step {}", global_step);
        }

        self.steps_since_checkpoint += 1;
        if self.steps_since_checkpoint >= self.save_model_freq {
            self.steps_since_checkpoint = 0;
            if let Some(dir) = &self.model_dir {
                let path = dir.join(format!("model-{}", global_step));
                fs::create_dir_all(&path)?;
                self.online.save(&path)?;
                info!("Saved the model in {:?}", &path);
            }
        }

        Ok(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("n_opts", RecordValue::Scalar(self.n_opts as f32)),
        ]))
    }

    /// Copies the parameters of the online learner to the target learner.
    pub fn sync_target(&mut self) -> Result<()> {
        let weights = self.online.get_weights()?;
        self.target.set_weights(&weights)
    }

    /// Saves the online learner in `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.online.save(path)
    }

    /// Loads the online learner from `path` and synchronizes the target.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.online.load(path)?;
        self.sync_target()?;
        info!("Loaded the model from {:?}", path);
        Ok(())
    }

    /// Parameters of the online learner.
    pub fn online_weights(&self) -> Result<Weights> {
        self.online.get_weights()
    }

    /// Parameters of the target learner.
    pub fn target_weights(&self) -> Result<Weights> {
        self.target.get_weights()
    }

    fn check_shape(&self, state: &State) -> Result<()> {
        let expected = self.online.state_shape();
        if state.shape() != &expected[..] {
            return Err(F1tenthError::BatchShapeMismatch {
                expected,
                actual: state.shape().to_vec(),
            }
            .into());
        }
        Ok(())
    }

    fn check_batch(&self, batch: &[Sample]) -> Result<()> {
        if batch.is_empty() {
            return Err(F1tenthError::EmptyBatch.into());
        }

        let num_actions = self.num_actions();
        for sample in batch.iter() {
            self.check_shape(&sample.state)?;
            if let Some(next_state) = &sample.next_state {
                self.check_shape(next_state)?;
            }
            if sample.action >= num_actions {
                return Err(F1tenthError::InvalidAction {
                    action: sample.action,
                    num_actions,
                }
                .into());
            }
        }
        Ok(())
    }
}

fn max(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn argmax(values: &[f32]) -> ActionId {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
