use crate::{
    layers::{conv1d, conv_out_len, linear},
    util::WeightInit,
};
use anyhow::{ensure, Result};
use candle_core::{Module, ModuleT, Tensor};
use candle_nn::{Conv1d, Linear, VarBuilder};

/// 1-D convolutions over the range scan, with the frames as channels.
///
/// With `velocity`, the last row of the state is not part of the scan; its
/// history is concatenated to the convolutional features.
pub(crate) struct Cnn1d {
    state_size: usize,
    velocity: bool,
    c1: Conv1d,
    c2: Conv1d,
    l1: Linear,
    out: Linear,
}

impl Cnn1d {
    pub(crate) fn build(
        state_size: usize,
        history_length: usize,
        num_actions: usize,
        velocity: bool,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        ensure!(
            state_size >= 6,
            "state_size {} is too small for the convolutions",
            state_size
        );
        let len = conv_out_len(conv_out_len(state_size, 4, 2), 2, 1);
        let in_dim = 32 * len + if velocity { history_length } else { 0 };

        Ok(Self {
            state_size,
            velocity,
            c1: conv1d(history_length, 16, 4, 2, init, vb.pp("c1"))?,
            c2: conv1d(16, 32, 2, 1, init, vb.pp("c2"))?,
            l1: linear(in_dim, 64, init, vb.pp("l1"))?,
            out: linear(64, num_actions, init, vb.pp("out"))?,
        })
    }
}

impl ModuleT for Cnn1d {
    /// `xs` has shape `[batch, state_size (+ 1), history_length]`.
    fn forward_t(&self, xs: &Tensor, _train: bool) -> candle_core::Result<Tensor> {
        let scan = xs.narrow(1, 0, self.state_size)?.transpose(1, 2)?.contiguous()?;
        let features = self.c1.forward(&scan)?.relu()?;
        let features = self.c2.forward(&features)?.relu()?.flatten_from(1)?;
        let features = match self.velocity {
            true => {
                let v = xs.narrow(1, self.state_size, 1)?.squeeze(1)?;
                Tensor::cat(&[&features, &v], 1)?
            }
            false => features,
        };
        let xs = self.l1.forward(&features)?.relu()?;
        self.out.forward(&xs)
    }
}
