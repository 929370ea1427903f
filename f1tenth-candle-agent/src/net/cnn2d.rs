use crate::{
    layers::{conv2d, conv_out_len, linear},
    util::WeightInit,
};
use anyhow::{ensure, Result};
use candle_core::{Module, ModuleT, Tensor};
use candle_nn::{Conv2d, Linear, VarBuilder};

/// 2-D convolutions with max pooling over an image with values in `[0, 255]`.
pub(crate) struct Cnn2d {
    c1: Conv2d,
    c2: Conv2d,
    l1: Linear,
    out: Linear,
}

fn feature_len(len: usize) -> usize {
    conv_out_len(conv_out_len(len, 4, 2) / 2, 2, 1) / 2
}

impl Cnn2d {
    pub(crate) fn build(
        width: usize,
        height: usize,
        history_length: usize,
        num_actions: usize,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        ensure!(
            width >= 14 && height >= 14,
            "image of {}x{} is too small for the convolutions",
            width,
            height
        );
        let in_dim = 8 * feature_len(width) * feature_len(height);

        Ok(Self {
            c1: conv2d(history_length, 16, 4, 2, init, vb.pp("c1"))?,
            c2: conv2d(16, 8, 2, 1, init, vb.pp("c2"))?,
            l1: linear(in_dim, 64, init, vb.pp("l1"))?,
            out: linear(64, num_actions, init, vb.pp("out"))?,
        })
    }
}

impl ModuleT for Cnn2d {
    /// `xs` has shape `[batch, width, height, history_length]`.
    fn forward_t(&self, xs: &Tensor, _train: bool) -> candle_core::Result<Tensor> {
        let xs = (xs.permute((0, 3, 1, 2))?.contiguous()? / 255.0)?;
        let xs = self.c1.forward(&xs)?.relu()?.max_pool2d(2)?;
        let xs = self.c2.forward(&xs)?.relu()?.max_pool2d(2)?;
        let xs = self.l1.forward(&xs.flatten_from(1)?)?.relu()?;
        self.out.forward(&xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_len() {
        assert_eq!(feature_len(16), 1);
        assert_eq!(feature_len(14), 1);
        assert_eq!(feature_len(13), 0);
        assert_eq!(feature_len(64), 7);
    }
}
