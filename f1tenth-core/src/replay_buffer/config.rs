//! Configuration of the replay buffer.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of prioritized sampling.
///
/// A sample gets `base_priority` at insertion, multiplied by `boost` if the
/// sample is terminal or has a non-zero reward.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PerConfig {
    /// Priority of ordinary samples.
    pub base_priority: f32,

    /// Multiplier applied to the priority of terminal or rewarded samples.
    pub boost: f32,
}

impl Default for PerConfig {
    fn default() -> Self {
        Self {
            base_priority: 1.0,
            boost: 5.0,
        }
    }
}

impl PerConfig {
    /// Sets the priority of ordinary samples.
    pub fn base_priority(mut self, base_priority: f32) -> Self {
        self.base_priority = base_priority;
        self
    }

    /// Sets the multiplier for terminal or rewarded samples.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

/// Configuration of [`SampleStore`](super::SampleStore) and
/// [`Sampler`](super::Sampler).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of samples. When the buffer is full, new samples
    /// replace the oldest ones.
    pub capacity: usize,

    /// Random seed of the sampler.
    pub seed: u64,

    /// Prioritized sampling. If `None`, samples are drawn uniformly.
    pub per_config: Option<PerConfig>,

    /// If `true`, states are stored gzip compressed.
    pub compress: bool,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            seed: 42,
            per_config: None,
            compress: false,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the configuration of prioritized sampling.
    pub fn per_config(mut self, per_config: Option<PerConfig>) -> Self {
        self.per_config = per_config;
        self
    }

    /// Enables or disables compression of stored states.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Constructs [`ReplayBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ReplayBufferConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
