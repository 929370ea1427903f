use crate::{layers::linear, util::WeightInit};
use anyhow::Result;
use candle_core::{Module, ModuleT, Tensor};
use candle_nn::{Linear, VarBuilder};

/// Two hidden layers of 128 units shared by all range values, then a linear
/// layer over all of them.
pub(crate) struct Dense {
    l1: Linear,
    l2: Linear,
    out: Linear,
}

impl Dense {
    pub(crate) fn build(
        state_size: usize,
        history_length: usize,
        num_actions: usize,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        Ok(Self {
            l1: linear(history_length, 128, init, vb.pp("l1"))?,
            l2: linear(128, 128, init, vb.pp("l2"))?,
            out: linear(state_size * 128, num_actions, init, vb.pp("out"))?,
        })
    }
}

impl ModuleT for Dense {
    /// `xs` has shape `[batch, state_size, history_length]`.
    fn forward_t(&self, xs: &Tensor, _train: bool) -> candle_core::Result<Tensor> {
        let xs = self.l1.forward(xs)?.relu()?;
        let xs = self.l2.forward(&xs)?.relu()?;
        self.out.forward(&xs.flatten_from(1)?)
    }
}
