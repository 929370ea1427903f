//! Configuration of [`Agent`](super::Agent).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Agent`](super::Agent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AgentConfig {
    /// Discount factor of future rewards.
    pub discount_factor: f32,

    /// Number of samples per training call.
    pub batch_size: usize,

    /// Number of training calls between target synchronizations.
    pub target_model_update_freq: usize,

    /// Number of training calls between checkpoints.
    pub save_model_freq: usize,

    /// Directory of checkpoints. If `None`, no checkpoint is written.
    pub model_dir: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            discount_factor: 0.996,
            batch_size: 32,
            target_model_update_freq: 300,
            save_model_freq: 2000,
            model_dir: None,
        }
    }
}

impl AgentConfig {
    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the interval of target synchronization in training calls.
    pub fn target_model_update_freq(mut self, v: usize) -> Self {
        self.target_model_update_freq = v;
        self
    }

    /// Sets the interval of checkpoints in training calls.
    pub fn save_model_freq(mut self, v: usize) -> Self {
        self.save_model_freq = v;
        self
    }

    /// Sets the directory of checkpoints.
    pub fn model_dir(mut self, v: Option<impl Into<PathBuf>>) -> Self {
        self.model_dir = v.map(|p| p.into());
        self
    }

    /// Constructs [`AgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AgentConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_agent_config() -> Result<()> {
        let config = AgentConfig::default()
            .discount_factor(0.9)
            .batch_size(8)
            .target_model_update_freq(10)
            .save_model_freq(100)
            .model_dir(Some("run-out/models"));

        let dir = TempDir::new("agent_config")?;
        let path = dir.path().join("agent.yaml");
        config.save(&path)?;
        let config_ = AgentConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
