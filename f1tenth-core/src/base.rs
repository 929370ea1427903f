//! Core functionalities.
mod env;
mod learner;
mod sample;
pub use env::{Env, Step};
pub use learner::{Learner, TrainBatch, WeightTensor, Weights};
pub use sample::{ActionId, Sample, State};
