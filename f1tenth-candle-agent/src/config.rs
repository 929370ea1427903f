//! Configuration of [`QNet`](crate::QNet).
use crate::{opt::OptimizerConfig, util::CriticLoss, util::WeightInit, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Network topology.
///
/// States are arrays whose last axis stacks the `history_length` most recent
/// sensor frames.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Arch {
    /// Two dense layers of 128 units applied to every range value, followed
    /// by a linear output layer. State shape `[state_size, history_length]`.
    Dense,

    /// Two 1-D convolutions over the range scan and a dense layer of 64
    /// units. State shape `[state_size, history_length]`.
    Cnn1d,

    /// [`Arch::Cnn1d`] with the history of a scalar, e.g. the velocity,
    /// concatenated to the convolutional features. The scalar history is the
    /// last row of the state, of shape `[state_size + 1, history_length]`.
    Cnn1dVelocity,

    /// Two 2-D convolutions with max pooling over an image with values in
    /// `[0, 255]`. State shape `[width, height, history_length]`.
    Cnn2d {
        /// Width of the image.
        width: usize,
        /// Height of the image.
        height: usize,
    },

    /// Point-set network with learned alignment transforms. Every range
    /// value is a point with `features` values per frame. State shape
    /// `[state_size, features * history_length]`.
    PointNet {
        /// Number of values of a point in a single frame.
        features: usize,
    },
}

/// Configuration of [`QNet`](crate::QNet).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QNetConfig {
    /// Network topology.
    pub arch: Arch,

    /// Number of values of a sensor frame.
    pub state_size: usize,

    /// Number of stacked frames.
    pub history_length: usize,

    /// Number of actions.
    pub num_actions: usize,

    /// Optimizer.
    pub opt_config: OptimizerConfig,

    /// Loss between predicted and target action values.
    pub critic_loss: CriticLoss,

    /// Initialization of the parameters.
    pub weight_init: WeightInit,

    /// Device.
    pub device: Device,
}

impl Default for QNetConfig {
    fn default() -> Self {
        Self {
            arch: Arch::Cnn1d,
            state_size: 1080,
            history_length: 2,
            num_actions: 5,
            opt_config: OptimizerConfig::default(),
            critic_loss: CriticLoss::SmoothL1,
            weight_init: WeightInit::VarianceScaling,
            device: Device::Cpu,
        }
    }
}

impl QNetConfig {
    /// Sets the network topology.
    pub fn arch(mut self, v: Arch) -> Self {
        self.arch = v;
        self
    }

    /// Sets the number of values of a sensor frame.
    pub fn state_size(mut self, v: usize) -> Self {
        self.state_size = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn history_length(mut self, v: usize) -> Self {
        self.history_length = v;
        self
    }

    /// Sets the number of actions.
    pub fn num_actions(mut self, v: usize) -> Self {
        self.num_actions = v;
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the initialization of the parameters.
    pub fn weight_init(mut self, v: WeightInit) -> Self {
        self.weight_init = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Shape of a single state.
    pub fn state_shape(&self) -> Vec<usize> {
        let (n, h) = (self.state_size, self.history_length);
        match &self.arch {
            Arch::Dense | Arch::Cnn1d => vec![n, h],
            Arch::Cnn1dVelocity => vec![n + 1, h],
            Arch::Cnn2d { width, height } => vec![*width, *height, h],
            Arch::PointNet { features } => vec![n, features * h],
        }
    }

    /// Constructs [`QNetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetConfig`] as a YAML file.
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
    fn test_state_shape() {
        let config = QNetConfig::default().state_size(10).history_length(3);
        assert_eq!(config.clone().arch(Arch::Dense).state_shape(), vec![10, 3]);
        assert_eq!(
            config.clone().arch(Arch::Cnn1dVelocity).state_shape(),
            vec![11, 3]
        );
        assert_eq!(
            config
                .clone()
                .arch(Arch::Cnn2d {
                    width: 32,
                    height: 24
                })
                .state_shape(),
            vec![32, 24, 3]
        );
        assert_eq!(
            config.arch(Arch::PointNet { features: 2 }).state_shape(),
            vec![10, 6]
        );
    }

    #[test]
    fn test_serde_qnet_config() -> Result<()> {
        let config = QNetConfig::default()
            .arch(Arch::PointNet { features: 2 })
            .opt_config(OptimizerConfig::default().learning_rate(0.001))
            .critic_loss(CriticLoss::Mse)
            .weight_init(WeightInit::FanInUniform);

        let dir = TempDir::new("qnet_config")?;
        let path = dir.path().join("qnet.yaml");
        config.save(&path)?;
        let config_ = QNetConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
