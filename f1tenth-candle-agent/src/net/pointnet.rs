use crate::{
    layers::{linear, ConvBn, DenseBn},
    util::WeightInit,
};
use anyhow::Result;
use candle_core::{Module, ModuleT, Tensor};
use candle_nn::{Dropout, Init, Linear, VarBuilder};

/// Learns a `k x k` transform applied to every point.
///
/// The output layer starts at zero, so the transform is the identity at
/// initialization.
pub(crate) struct TNet {
    k: usize,
    convs: Vec<ConvBn>,
    denses: Vec<DenseBn>,
    out: Linear,
}

impl TNet {
    pub(crate) fn build(k: usize, init: WeightInit, vb: VarBuilder) -> Result<Self> {
        let convs = vec![
            ConvBn::new(k, 32, init, vb.pp("c1"))?,
            ConvBn::new(32, 64, init, vb.pp("c2"))?,
            ConvBn::new(64, 512, init, vb.pp("c3"))?,
        ];
        let denses = vec![
            DenseBn::new(512, 256, init, vb.pp("d1"))?,
            DenseBn::new(256, 128, init, vb.pp("d2"))?,
        ];
        let out = {
            let vb = vb.pp("out");
            let ws = vb.get_with_hints((k * k, 128), "weight", Init::Const(0.0))?;
            let bs = vb.get_with_hints(k * k, "bias", Init::Const(0.0))?;
            Linear::new(ws, Some(bs))
        };

        Ok(Self {
            k,
            convs,
            denses,
            out,
        })
    }
}

impl ModuleT for TNet {
    /// `xs` has shape `[batch, k, points]`; so does the output.
    fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let mut t = xs.clone();
        for conv in self.convs.iter() {
            t = conv.forward_t(&t, train)?;
        }
        let mut t = t.max(2)?;
        for dense in self.denses.iter() {
            t = dense.forward_t(&t, train)?;
        }
        let eye = Tensor::eye(self.k, t.dtype(), t.device())?.flatten_all()?;
        let t = self.out.forward(&t)?.broadcast_add(&eye)?;
        let t = t.reshape(((), self.k, self.k))?;

        // Every point p (a row vector) is mapped to p T.
        t.transpose(1, 2)?.contiguous()?.matmul(xs)
    }
}

/// Point-set network treating every range value as a point whose features
/// are its values over the stacked frames.
pub(crate) struct PointNet {
    input_transform: TNet,
    c1: ConvBn,
    c2: ConvBn,
    feature_transform: TNet,
    c3: ConvBn,
    c4: ConvBn,
    c5: ConvBn,
    d1: DenseBn,
    d2: DenseBn,
    dropout: Dropout,
    out: Linear,
}

impl PointNet {
    pub(crate) fn build(
        channels: usize,
        num_actions: usize,
        init: WeightInit,
        vb: VarBuilder,
    ) -> Result<Self> {
        Ok(Self {
            input_transform: TNet::build(channels, init, vb.pp("tnet1"))?,
            c1: ConvBn::new(channels, 32, init, vb.pp("c1"))?,
            c2: ConvBn::new(32, 32, init, vb.pp("c2"))?,
            feature_transform: TNet::build(32, init, vb.pp("tnet2"))?,
            c3: ConvBn::new(32, 32, init, vb.pp("c3"))?,
            c4: ConvBn::new(32, 64, init, vb.pp("c4"))?,
            c5: ConvBn::new(64, 512, init, vb.pp("c5"))?,
            d1: DenseBn::new(512, 256, init, vb.pp("d1"))?,
            d2: DenseBn::new(256, 128, init, vb.pp("d2"))?,
            dropout: Dropout::new(0.3),
            out: linear(128, num_actions, init, vb.pp("out"))?,
        })
    }
}

impl ModuleT for PointNet {
    /// `xs` has shape `[batch, points, channels]`.
    fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let xs = xs.transpose(1, 2)?.contiguous()?;
        let xs = self.input_transform.forward_t(&xs, train)?;
        let xs = self.c1.forward_t(&xs, train)?;
        let xs = self.c2.forward_t(&xs, train)?;
        let xs = self.feature_transform.forward_t(&xs, train)?;
        let xs = self.c3.forward_t(&xs, train)?;
        let xs = self.c4.forward_t(&xs, train)?;
        let xs = self.c5.forward_t(&xs, train)?.max(2)?;
        let xs = self.d1.forward_t(&xs, train)?;
        let xs = self.dropout.forward_t(&xs, train)?;
        let xs = self.d2.forward_t(&xs, train)?;
        let xs = self.dropout.forward_t(&xs, train)?;
        self.out.forward(&xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_tnet_is_identity_at_init() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let tnet = TNet::build(3, WeightInit::default(), vb)?;

        let xs = Tensor::randn(0f32, 1f32, (2, 3, 10), &Device::Cpu)?;
        let ys = tnet.forward_t(&xs, true)?;
        let diff = (ys - &xs)?.abs()?.flatten_all()?.max(0)?.to_scalar::<f32>()?;
        assert!(diff < 1e-6);
        Ok(())
    }
}
