//! Network topologies.
mod cnn1d;
mod cnn2d;
mod dense;
mod pointnet;
use crate::config::{Arch, QNetConfig};
use anyhow::Result;
use candle_core::{ModuleT, Tensor};
use candle_nn::VarBuilder;
use cnn1d::Cnn1d;
use cnn2d::Cnn2d;
use dense::Dense;
use pointnet::PointNet;

/// Network of one of the topologies of [`Arch`], mapping a batch of states
/// to action values of shape `[batch, num_actions]`.
pub(crate) enum Net {
    Dense(Dense),
    Cnn1d(Cnn1d),
    Cnn2d(Cnn2d),
    PointNet(PointNet),
}

impl Net {
    pub(crate) fn build(config: &QNetConfig, vb: VarBuilder) -> Result<Self> {
        let init = config.weight_init;
        let (n, h, a) = (
            config.state_size,
            config.history_length,
            config.num_actions,
        );
        let net = match &config.arch {
            Arch::Dense => Self::Dense(Dense::build(n, h, a, init, vb)?),
            Arch::Cnn1d => Self::Cnn1d(Cnn1d::build(n, h, a, false, init, vb)?),
            Arch::Cnn1dVelocity => Self::Cnn1d(Cnn1d::build(n, h, a, true, init, vb)?),
            Arch::Cnn2d { width, height } => {
                Self::Cnn2d(Cnn2d::build(*width, *height, h, a, init, vb)?)
            }
            Arch::PointNet { features } => {
                Self::PointNet(PointNet::build(features * h, a, init, vb)?)
            }
        };
        Ok(net)
    }
}

impl ModuleT for Net {
    fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        match self {
            Self::Dense(net) => net.forward_t(xs, train),
            Self::Cnn1d(net) => net.forward_t(xs, train),
            Self::Cnn2d(net) => net.forward_t(xs, train),
            Self::PointNet(net) => net.forward_t(xs, train),
        }
    }
}
