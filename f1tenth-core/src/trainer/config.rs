//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Training starts once the total number of environment steps exceeds
    /// this value.
    pub observation_steps: usize,

    /// Training happens on episode steps that are multiples of this value.
    pub frame: usize,

    /// Minimum number of environment steps of a training epoch.
    pub train_epoch_steps: usize,

    /// Minimum number of environment steps of an evaluation epoch.
    pub eval_epoch_steps: usize,

    /// Exploration rate during evaluation.
    pub eval_epsilon: f64,

    /// Interval of run statistics in environment steps. `0` disables them.
    pub stats_logging_freq: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            observation_steps: 350,
            frame: 2,
            train_epoch_steps: 5000,
            eval_epoch_steps: 500,
            eval_epsilon: 0.0,
            stats_logging_freq: 300,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of warm-up steps.
    pub fn observation_steps(mut self, v: usize) -> Self {
        self.observation_steps = v;
        self
    }

    /// Sets the frame stride of training.
    pub fn frame(mut self, v: usize) -> Self {
        self.frame = v;
        self
    }

    /// Sets the length of training epochs.
    pub fn train_epoch_steps(mut self, v: usize) -> Self {
        self.train_epoch_steps = v;
        self
    }

    /// Sets the length of evaluation epochs.
    pub fn eval_epoch_steps(mut self, v: usize) -> Self {
        self.eval_epoch_steps = v;
        self
    }

    /// Sets the exploration rate during evaluation.
    pub fn eval_epsilon(mut self, v: f64) -> Self {
        self.eval_epsilon = v;
        self
    }

    /// Sets the interval of run statistics.
    pub fn stats_logging_freq(mut self, v: usize) -> Self {
        self.stats_logging_freq = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
