//! Utilities.
use candle_core::{DType, Tensor};
use candle_nn::Init;
use serde::{Deserialize, Serialize};

/// Loss between predicted action values and their targets.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Huber loss with threshold 1, see [`smooth_l1_loss`].
    SmoothL1,
}

impl CriticLoss {
    /// Computes the mean loss.
    pub fn loss(&self, pred: &Tensor, tgt: &Tensor) -> Result<Tensor, candle_core::Error> {
        match self {
            Self::Mse => candle_nn::loss::mse(pred, tgt),
            Self::SmoothL1 => smooth_l1_loss(pred, tgt),
        }
    }
}

/// Smooth L1 loss: `0.5 d^2` for `|d| < 1`, `|d| - 0.5` otherwise, averaged.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = (1.0 - &m1)?;
    (((0.5 * m1)? * d.sqr()?)? + (m2 * (d - 0.5)?)?)?.mean_all()
}

/// Initialization of weights of linear and convolutional layers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum WeightInit {
    /// Normal weights with variance `2 / fan_in` and zero biases.
    VarianceScaling,

    /// Weights and biases uniform in `[-1/sqrt(fan_in), 1/sqrt(fan_in)]`.
    FanInUniform,
}

impl Default for WeightInit {
    fn default() -> Self {
        Self::VarianceScaling
    }
}

impl WeightInit {
    /// Initializer of a weight tensor.
    pub fn weight(&self, fan_in: usize) -> Init {
        match self {
            Self::VarianceScaling => Init::Randn {
                mean: 0.0,
                stdev: (2.0 / fan_in as f64).sqrt(),
            },
            Self::FanInUniform => {
                let bound = 1.0 / (fan_in as f64).sqrt();
                Init::Uniform {
                    lo: -bound,
                    up: bound,
                }
            }
        }
    }

    /// Initializer of a bias vector.
    pub fn bias(&self, fan_in: usize) -> Init {
        match self {
            Self::VarianceScaling => Init::Const(0.0),
            Self::FanInUniform => self.weight(fan_in),
        }
    }
}
