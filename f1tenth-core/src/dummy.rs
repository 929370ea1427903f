//! Test doubles of [`Env`] and [`Learner`].
use crate::{
    error::F1tenthError, ActionId, CancellationToken, Env, Learner, State, Step, TrainBatch,
    WeightTensor, Weights,
};
use anyhow::Result;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// Number of steps of every episode.
    pub episode_len: usize,

    /// Number of actions.
    pub num_actions: usize,

    /// Length of the state vector.
    pub state_size: usize,

    /// Reward of every step.
    pub reward: f32,

    /// Cancels the token right after the given total step.
    pub cancel_at: Option<(usize, CancellationToken)>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            episode_len: 5,
            num_actions: 3,
            state_size: 4,
            reward: 1.0,
            cancel_at: None,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the episode length.
    pub fn episode_len(mut self, v: usize) -> Self {
        self.episode_len = v;
        self
    }

    /// Sets the number of actions.
    pub fn num_actions(mut self, v: usize) -> Self {
        self.num_actions = v;
        self
    }

    /// Sets the length of the state vector.
    pub fn state_size(mut self, v: usize) -> Self {
        self.state_size = v;
        self
    }

    /// Sets the reward of every step.
    pub fn reward(mut self, v: f32) -> Self {
        self.reward = v;
        self
    }

    /// Cancels `token` once the total step count reaches `step`.
    pub fn cancel_at(mut self, step: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((step, token));
        self
    }
}

/// Environment with fixed-length episodes and a constant reward.
///
/// The state of step `t` of an episode is `[t, t + 1, ...] * 0.1`.
pub struct DummyEnv {
    config: DummyEnvConfig,
    step_number: usize,
    game_number: usize,
    episode_step_number: usize,
    game_score: f32,
    game_over: bool,
    actions: Vec<ActionId>,
}

impl DummyEnv {
    /// Actions applied so far.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    fn state(&self) -> State {
        let t = self.episode_step_number;
        ArrayD::from_shape_fn(IxDyn(&[self.config.state_size]), |ix| {
            (t + ix[0]) as f32 * 0.1
        })
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            step_number: 0,
            game_number: 0,
            episode_step_number: 0,
            game_score: 0.0,
            game_over: false,
            actions: vec![],
        })
    }

    fn num_actions(&self) -> usize {
        self.config.num_actions
    }

    fn state_size(&self) -> usize {
        self.config.state_size
    }

    fn step(&mut self, action: ActionId) -> Result<Step> {
        if action >= self.config.num_actions {
            return Err(F1tenthError::InvalidAction {
                action,
                num_actions: self.config.num_actions,
            }
            .into());
        }

        self.actions.push(action);
        self.step_number += 1;
        self.episode_step_number += 1;
        self.game_score += self.config.reward;
        self.game_over = self.episode_step_number >= self.config.episode_len;

        if let Some((step, token)) = &self.config.cancel_at {
            if self.step_number == *step {
                token.cancel();
            }
        }

        Ok(Step {
            reward: self.config.reward,
            state: self.state(),
            is_terminal: self.game_over,
        })
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn reset_game(&mut self) -> Result<()> {
        self.game_number += 1;
        self.episode_step_number = 0;
        self.game_score = 0.0;
        self.game_over = false;
        Ok(())
    }

    fn step_number(&self) -> usize {
        self.step_number
    }

    fn game_number(&self) -> usize {
        self.game_number
    }

    fn episode_step_number(&self) -> usize {
        self.episode_step_number
    }

    fn game_score(&self) -> f32 {
        self.game_score
    }
}

/// Configuration of [`DummyLearner`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DummyLearnerConfig {
    /// Number of actions.
    pub num_actions: usize,

    /// Shape of a state.
    pub state_shape: Vec<usize>,

    /// Step size of gradient descent.
    pub learning_rate: f32,
}

impl Default for DummyLearnerConfig {
    fn default() -> Self {
        Self {
            num_actions: 3,
            state_shape: vec![4],
            learning_rate: 0.01,
        }
    }
}

impl DummyLearnerConfig {
    /// Sets the number of actions.
    pub fn num_actions(mut self, v: usize) -> Self {
        self.num_actions = v;
        self
    }

    /// Sets the shape of a state.
    pub fn state_shape(mut self, v: Vec<usize>) -> Self {
        self.state_shape = v;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }
}

/// Linear action-value function `Q(s, a) = w[a] . s + b[a]` trained with
/// plain gradient descent on the squared error.
pub struct DummyLearner {
    config: DummyLearnerConfig,
    in_dim: usize,
    w: Vec<f32>,
    b: Vec<f32>,
    last_targets: Vec<f32>,
}

impl DummyLearner {
    /// Targets of the last optimization step.
    pub fn last_targets(&self) -> &[f32] {
        &self.last_targets
    }

    fn q(&self, state: &State, a: usize) -> f32 {
        let w = &self.w[a * self.in_dim..(a + 1) * self.in_dim];
        self.b[a] + w.iter().zip(state.iter()).map(|(w, x)| w * x).sum::<f32>()
    }

    fn check(&self, state: &State) -> Result<()> {
        if state.shape() != &self.config.state_shape[..] {
            return Err(F1tenthError::BatchShapeMismatch {
                expected: self.config.state_shape.clone(),
                actual: state.shape().to_vec(),
            }
            .into());
        }
        Ok(())
    }
}

impl Learner for DummyLearner {
    type Config = DummyLearnerConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        let in_dim = config.state_shape.iter().product::<usize>();
        let n = config.num_actions * in_dim;
        let w = (0..n).map(|i| 0.01 * (i % 7) as f32 - 0.03).collect();
        Ok(Self {
            config: config.clone(),
            in_dim,
            w,
            b: vec![0.0; config.num_actions],
            last_targets: vec![],
        })
    }

    fn num_actions(&self) -> usize {
        self.config.num_actions
    }

    fn state_shape(&self) -> Vec<usize> {
        self.config.state_shape.clone()
    }

    fn infer(&self, states: &[&State]) -> Result<Vec<Vec<f32>>> {
        states
            .iter()
            .map(|s| -> Result<Vec<f32>> {
                self.check(s)?;
                Ok((0..self.config.num_actions).map(|a| self.q(s, a)).collect())
            })
            .collect()
    }

    fn apply_gradient_step(&mut self, batch: &TrainBatch) -> Result<f32> {
        if batch.is_empty() {
            return Err(F1tenthError::EmptyBatch.into());
        }

        let n = batch.len() as f32;
        let mut grad_w = vec![0f32; self.w.len()];
        let mut grad_b = vec![0f32; self.b.len()];
        let mut loss = 0f32;

        for ((s, &a), &t) in batch
            .states
            .iter()
            .zip(batch.actions.iter())
            .zip(batch.targets.iter())
        {
            self.check(s)?;
            let err = self.q(s, a) - t;
            loss += err * err;
            for (j, x) in s.iter().enumerate() {
                grad_w[a * self.in_dim + j] += 2.0 * err * x / n;
            }
            grad_b[a] += 2.0 * err / n;
        }

        let lr = self.config.learning_rate;
        self.w.iter_mut().zip(grad_w).for_each(|(w, g)| *w -= lr * g);
        self.b.iter_mut().zip(grad_b).for_each(|(b, g)| *b -= lr * g);
        self.last_targets = batch.targets.clone();

        Ok(loss / n)
    }

    fn get_weights(&self) -> Result<Weights> {
        let mut weights = Weights::new();
        weights.insert(
            "w",
            WeightTensor {
                shape: vec![self.config.num_actions, self.in_dim],
                data: self.w.clone(),
            },
        );
        weights.insert(
            "b",
            WeightTensor {
                shape: vec![self.config.num_actions],
                data: self.b.clone(),
            },
        );
        Ok(weights)
    }

    fn set_weights(&mut self, weights: &Weights) -> Result<()> {
        for (name, dst) in [("w", &mut self.w), ("b", &mut self.b)] {
            let src = weights.get(name).ok_or_else(|| {
                F1tenthError::InvalidWeights(format!("missing parameter {}", name))
            })?;
            if src.data.len() != dst.len() {
                let msg = format!("size mismatch of {}", name);
                return Err(F1tenthError::InvalidWeights(msg).into());
            }
            dst.copy_from_slice(&src.data);
        }
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path.join("weights.bin"))?;
        bincode::serialize_into(BufWriter::new(file), &self.get_weights()?)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path.join("weights.bin"))?;
        let weights: Weights = bincode::deserialize_from(BufReader::new(file))?;
        self.set_weights(&weights)
    }
}
