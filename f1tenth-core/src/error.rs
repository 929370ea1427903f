//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum F1tenthError {
    /// The replay buffer was configured without room for a single sample.
    #[error("Replay buffer capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// A sample was requested beyond the populated part of the replay buffer.
    #[error("Index {index} is out of range for a replay buffer of size {size}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of populated slots.
        size: usize,
    },

    /// A batch was requested from a replay buffer holding no sample.
    #[error("Cannot draw a batch from an empty replay buffer")]
    EmptyReplayBuffer,

    /// An optimization step was requested with no sample.
    #[error("Cannot train on an empty batch")]
    EmptyBatch,

    /// A state in a batch does not match the input shape of the learner.
    #[error("State shape mismatch: expected {expected:?}, got {actual:?}")]
    BatchShapeMismatch {
        /// Shape the learner was built for.
        expected: Vec<usize>,
        /// Shape found in the batch.
        actual: Vec<usize>,
    },

    /// An action id is not valid for the learner.
    #[error("Action {action} is out of range for {num_actions} actions")]
    InvalidAction {
        /// Offending action.
        action: usize,
        /// Number of actions of the learner.
        num_actions: usize,
    },

    /// Environment and learner disagree on the number of actions.
    #[error("Environment has {env} actions but the learner has {learner}")]
    ActionSpaceMismatch {
        /// Number of actions of the environment.
        env: usize,
        /// Number of actions of the learner.
        learner: usize,
    },

    /// Compression or decompression of a stored state failed.
    #[error("State codec error: {0}")]
    Codec(String),

    /// Parameters do not fit the learner they are loaded into.
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}
