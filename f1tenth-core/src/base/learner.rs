//! Learner.
use super::{ActionId, State};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map::Iter, BTreeMap},
    path::Path,
};

/// A flattened parameter tensor.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WeightTensor {
    /// Shape of the tensor.
    pub shape: Vec<usize>,

    /// Values in row-major order.
    pub data: Vec<f32>,
}

/// Named parameters of a learner.
///
/// This is used to copy parameters between the online and the target learner.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Weights(BTreeMap<String, WeightTensor>);

impl Weights {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a parameter tensor.
    pub fn insert(&mut self, name: impl Into<String>, tensor: WeightTensor) {
        self.0.insert(name.into(), tensor);
    }

    /// Gets a parameter tensor by name.
    pub fn get(&self, name: &str) -> Option<&WeightTensor> {
        self.0.get(name)
    }

    /// Iterates over the parameters, sorted by name.
    pub fn iter(&self) -> Iter<'_, String, WeightTensor> {
        self.0.iter()
    }

    /// Number of named tensors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there is no tensor.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A batch prepared for one optimization step.
///
/// `targets[i]` is the regression target of the action value
/// `Q(states[i], actions[i])`.
pub struct TrainBatch<'a> {
    /// Observations.
    pub states: Vec<&'a State>,

    /// Actions taken in the observations.
    pub actions: Vec<ActionId>,

    /// Bootstrapped targets.
    pub targets: Vec<f32>,
}

impl<'a> TrainBatch<'a> {
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the batch has no sample.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Action-value function approximator.
///
/// The agent holds two instances, the online learner updated by
/// [`Learner::apply_gradient_step`] and the target learner, which only
/// receives parameters with [`Learner::set_weights`].
pub trait Learner {
    /// Configuration from which the learner is built.
    type Config: Clone;

    /// Builds a learner.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Number of actions, i.e. the output dimension.
    fn num_actions(&self) -> usize;

    /// Shape of a single input state.
    fn state_shape(&self) -> Vec<usize>;

    /// Returns action values for each state.
    fn infer(&self, states: &[&State]) -> Result<Vec<Vec<f32>>>;

    /// Performs an optimization step and returns the loss.
    fn apply_gradient_step(&mut self, batch: &TrainBatch) -> Result<f32>;

    /// Returns a copy of the parameters.
    fn get_weights(&self) -> Result<Weights>;

    /// Overwrites the parameters.
    fn set_weights(&mut self, weights: &Weights) -> Result<()>;

    /// Saves the parameters in the given directory.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads the parameters from the given directory.
    fn load(&mut self, path: &Path) -> Result<()>;
}
