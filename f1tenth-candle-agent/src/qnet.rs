//! Action-value network.
use crate::{config::QNetConfig, net::Net, opt::Optimizer};
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, ModuleT, Tensor};
use candle_nn::{VarBuilder, VarMap};
use f1tenth_core::{
    error::F1tenthError, Learner, State, TrainBatch, WeightTensor, Weights,
};
use log::info;
use std::{convert::TryFrom, path::Path};

const WEIGHTS_FILE: &str = "qnet.safetensors";

/// Action-value network trained by regression on bootstrapped targets.
///
/// All parameters, including the running statistics of batch normalization,
/// live in a single [`VarMap`]; they are what [`Learner::get_weights`]
/// returns and what [`Learner::save`] writes.
pub struct QNet {
    config: QNetConfig,
    device: Device,
    varmap: VarMap,
    net: Net,
    opt: Optimizer,
}

impl QNet {
    /// The configuration.
    pub fn config(&self) -> &QNetConfig {
        &self.config
    }

    fn to_tensor(&self, states: &[&State]) -> Result<Tensor> {
        let shape = self.config.state_shape();
        let mut data: Vec<f32> = Vec::with_capacity(states.len() * shape.iter().product::<usize>());
        for state in states.iter() {
            if state.shape() != shape.as_slice() {
                return Err(F1tenthError::BatchShapeMismatch {
                    expected: shape,
                    actual: state.shape().to_vec(),
                }
                .into());
            }
            data.extend(state.iter());
        }

        let mut batch_shape = vec![states.len()];
        batch_shape.extend(shape);
        Ok(Tensor::from_vec(data, batch_shape, &self.device)?)
    }
}

impl Learner for QNet {
    type Config = QNetConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        let device = Device::try_from(config.device)?;
        let varmap = VarMap::new();
        let net = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Net::build(config, vb)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            config: config.clone(),
            device,
            varmap,
            net,
            opt,
        })
    }

    fn num_actions(&self) -> usize {
        self.config.num_actions
    }

    fn state_shape(&self) -> Vec<usize> {
        self.config.state_shape()
    }

    fn infer(&self, states: &[&State]) -> Result<Vec<Vec<f32>>> {
        if states.is_empty() {
            return Ok(vec![]);
        }
        let xs = self.to_tensor(states)?;
        Ok(self.net.forward_t(&xs, false)?.to_vec2::<f32>()?)
    }

    fn apply_gradient_step(&mut self, batch: &TrainBatch) -> Result<f32> {
        if batch.is_empty() {
            return Err(F1tenthError::EmptyBatch.into());
        }
        let n = batch.len();
        let xs = self.to_tensor(&batch.states)?;
        let actions = batch.actions.iter().map(|&a| a as u32).collect::<Vec<_>>();
        let actions = Tensor::from_vec(actions, (n, 1), &self.device)?;
        let targets = Tensor::from_slice(batch.targets.as_slice(), (n,), &self.device)?;

        let pred = self
            .net
            .forward_t(&xs, true)?
            .gather(&actions, 1)?
            .squeeze(1)?;
        let loss = self.config.critic_loss.loss(&pred, &targets)?;
        self.opt.backward_step(&loss)?;

        Ok(loss.to_scalar::<f32>()?)
    }

    fn get_weights(&self) -> Result<Weights> {
        let data = self.varmap.data().lock().map_err(|e| anyhow!("{}", e))?;
        let mut weights = Weights::new();
        for (name, var) in data.iter() {
            let t = var.as_tensor();
            let tensor = WeightTensor {
                shape: t.dims().to_vec(),
                data: t.flatten_all()?.to_vec1::<f32>()?,
            };
            weights.insert(name.clone(), tensor);
        }
        Ok(weights)
    }

    fn set_weights(&mut self, weights: &Weights) -> Result<()> {
        let data = self.varmap.data().lock().map_err(|e| anyhow!("{}", e))?;
        for (name, var) in data.iter() {
            let w = weights.get(name).ok_or_else(|| {
                F1tenthError::InvalidWeights(format!("missing parameter {}", name))
            })?;
            if w.shape.as_slice() != var.dims() {
                let msg = format!(
                    "parameter {} has shape {:?}, expected {:?}",
                    name,
                    w.shape,
                    var.dims()
                );
                return Err(F1tenthError::InvalidWeights(msg).into());
            }
            var.set(&Tensor::from_slice(w.data.as_slice(), w.shape.clone(), &self.device)?)?;
        }
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let path = path.join(WEIGHTS_FILE);
        self.varmap.save(&path)?;
        info!("Save qnet to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let path = path.join(WEIGHTS_FILE);
        self.varmap.load(&path)?;
        info!("Load qnet from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arch, CriticLoss, OptimizerConfig};
    use ndarray::ArrayD;
    use tempdir::TempDir;

    fn states(shape: &[usize], n: usize) -> Vec<State> {
        (0..n)
            .map(|i| {
                let len = shape.iter().product::<usize>();
                let data = (0..len)
                    .map(|j| ((i * 7 + j) % 11) as f32 / 11.0)
                    .collect::<Vec<_>>();
                ArrayD::from_shape_vec(shape.to_vec(), data).unwrap()
            })
            .collect()
    }

    fn config(arch: Arch) -> QNetConfig {
        QNetConfig::default()
            .arch(arch)
            .state_size(8)
            .history_length(2)
            .num_actions(3)
    }

    #[test]
    fn test_output_shapes() -> Result<()> {
        let archs = vec![
            Arch::Dense,
            Arch::Cnn1d,
            Arch::Cnn1dVelocity,
            Arch::Cnn2d {
                width: 16,
                height: 16,
            },
            Arch::PointNet { features: 2 },
        ];
        for arch in archs {
            let qnet = QNet::build(&config(arch.clone()))?;
            let xs = states(&qnet.state_shape(), 4);
            let xs = xs.iter().collect::<Vec<_>>();
            let qs = qnet.infer(&xs)?;
            assert_eq!(qs.len(), 4, "{:?}", arch);
            assert!(qs.iter().all(|q| q.len() == 3), "{:?}", arch);
            assert!(qs.iter().flatten().all(|q| q.is_finite()), "{:?}", arch);
        }
        Ok(())
    }

    #[test]
    fn test_state_shape_mismatch() -> Result<()> {
        let qnet = QNet::build(&config(Arch::Cnn1d))?;
        let xs = states(&[8, 3], 1);
        let err = qnet.infer(&[&xs[0]]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<F1tenthError>(),
            Some(&F1tenthError::BatchShapeMismatch {
                expected: vec![8, 2],
                actual: vec![8, 3],
            })
        );
        Ok(())
    }

    #[test]
    fn test_loss_decreases() -> Result<()> {
        let config = config(Arch::Dense)
            .critic_loss(CriticLoss::Mse)
            .opt_config(OptimizerConfig::Adam { lr: 0.01 });
        let mut qnet = QNet::build(&config)?;
        let xs = states(&qnet.state_shape(), 4);
        let batch = TrainBatch {
            states: xs.iter().collect(),
            actions: vec![0, 1, 2, 1],
            targets: vec![1.0, -1.0, 0.5, 2.0],
        };

        let first = qnet.apply_gradient_step(&batch)?;
        let mut last = first;
        for _ in 0..100 {
            last = qnet.apply_gradient_step(&batch)?;
        }
        assert!(last < first, "{} >= {}", last, first);
        Ok(())
    }

    #[test]
    fn test_weights_round_trip() -> Result<()> {
        let config = config(Arch::PointNet { features: 2 });
        let mut src = QNet::build(&config)?;
        let mut dst = QNet::build(&config)?;

        // updates the running statistics of batch normalization
        let xs = states(&src.state_shape(), 4);
        let batch = TrainBatch {
            states: xs.iter().collect(),
            actions: vec![0, 1, 2, 0],
            targets: vec![1.0; 4],
        };
        src.apply_gradient_step(&batch)?;

        dst.set_weights(&src.get_weights()?)?;
        assert_eq!(src.get_weights()?, dst.get_weights()?);

        let xs = xs.iter().collect::<Vec<_>>();
        assert_eq!(src.infer(&xs)?, dst.infer(&xs)?);
        Ok(())
    }

    #[test]
    fn test_set_weights_of_other_arch() -> Result<()> {
        let src = QNet::build(&config(Arch::Dense))?;
        let mut dst = QNet::build(&config(Arch::Cnn1d))?;
        let err = dst.set_weights(&src.get_weights()?).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<F1tenthError>(),
            Some(F1tenthError::InvalidWeights(_))
        ));
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let config = config(Arch::Cnn1dVelocity);
        let src = QNet::build(&config)?;
        let mut dst = QNet::build(&config)?;

        let dir = TempDir::new("qnet")?;
        src.save(dir.path())?;
        assert!(dir.path().join(WEIGHTS_FILE).exists());
        dst.load(dir.path())?;

        let xs = states(&src.state_shape(), 2);
        let xs = xs.iter().collect::<Vec<_>>();
        assert_eq!(src.infer(&xs)?, dst.infer(&xs)?);
        Ok(())
    }
}
