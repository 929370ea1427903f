//! Layer constructors honoring [`WeightInit`].
use crate::util::WeightInit;
use anyhow::Result;
use candle_core::{Module, ModuleT, Tensor};
use candle_nn::{
    batch_norm, BatchNorm, BatchNormConfig, Conv1d, Conv1dConfig, Conv2d, Conv2dConfig, Linear,
    VarBuilder,
};

pub(crate) fn linear(
    in_dim: usize,
    out_dim: usize,
    init: WeightInit,
    vb: VarBuilder,
) -> Result<Linear> {
    let ws = vb.get_with_hints((out_dim, in_dim), "weight", init.weight(in_dim))?;
    let bs = vb.get_with_hints(out_dim, "bias", init.bias(in_dim))?;
    Ok(Linear::new(ws, Some(bs)))
}

pub(crate) fn conv1d(
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    init: WeightInit,
    vb: VarBuilder,
) -> Result<Conv1d> {
    let fan_in = in_channels * kernel_size;
    let ws = vb.get_with_hints(
        (out_channels, in_channels, kernel_size),
        "weight",
        init.weight(fan_in),
    )?;
    let bs = vb.get_with_hints(out_channels, "bias", init.bias(fan_in))?;
    let config = Conv1dConfig {
        stride,
        ..Default::default()
    };
    Ok(Conv1d::new(ws, Some(bs), config))
}

pub(crate) fn conv2d(
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    init: WeightInit,
    vb: VarBuilder,
) -> Result<Conv2d> {
    let fan_in = in_channels * kernel_size * kernel_size;
    let ws = vb.get_with_hints(
        (out_channels, in_channels, kernel_size, kernel_size),
        "weight",
        init.weight(fan_in),
    )?;
    let bs = vb.get_with_hints(out_channels, "bias", init.bias(fan_in))?;
    let config = Conv2dConfig {
        stride,
        ..Default::default()
    };
    Ok(Conv2d::new(ws, Some(bs), config))
}

/// Output length of a convolution without padding.
pub(crate) fn conv_out_len(len: usize, kernel_size: usize, stride: usize) -> usize {
    (len - kernel_size) / stride + 1
}

/// Batch normalization whose running statistics are those of the last
/// training batch.
fn bn(num_features: usize, vb: VarBuilder) -> Result<BatchNorm> {
    let config = BatchNormConfig {
        eps: 1e-3,
        remove_mean: true,
        affine: true,
        momentum: 1.0,
    };
    Ok(batch_norm(num_features, config, vb)?)
}

/// Pointwise convolution followed by batch normalization and ReLU, on inputs
/// of shape `[batch, channels, points]`.
pub(crate) struct ConvBn {
    conv: Conv1d,
    bn: BatchNorm,
}

impl ConvBn {
    pub(crate) fn new(
        in_channels: usize,
        out_channels: usize,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        Ok(Self {
            conv: conv1d(in_channels, out_channels, 1, 1, init, vb.pp("conv"))?,
            bn: bn(out_channels, vb.pp("bn"))?,
        })
    }
}

impl ModuleT for ConvBn {
    fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        self.conv.forward(xs)?.apply_t(&self.bn, train)?.relu()
    }
}

/// Linear layer followed by batch normalization and ReLU.
pub(crate) struct DenseBn {
    linear: Linear,
    bn: BatchNorm,
}

impl DenseBn {
    pub(crate) fn new(
        in_dim: usize,
        out_dim: usize,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        Ok(Self {
            linear: linear(in_dim, out_dim, init, vb.pp("linear"))?,
            bn: bn(out_dim, vb.pp("bn"))?,
        })
    }
}

impl ModuleT for DenseBn {
    fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        self.linear.forward(xs)?.apply_t(&self.bn, train)?.relu()
    }
}
