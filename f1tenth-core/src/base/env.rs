//! Environment.
use super::{ActionId, State};
use anyhow::Result;

/// Outcome of an environment step.
#[derive(Clone, Debug)]
pub struct Step {
    /// Reward of the step.
    pub reward: f32,

    /// Observation after the step.
    pub state: State,

    /// Flag denoting if the episode ended with this step.
    pub is_terminal: bool,
}

/// Represents a driving environment, either a simulator or a real vehicle.
///
/// The environment keeps its own counters: [`Env::step_number`] counts every
/// step since the environment was built, while [`Env::episode_step_number`]
/// and [`Env::game_score`] are reset by [`Env::reset_game`], which also
/// increments [`Env::game_number`].
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Number of discrete actions.
    fn num_actions(&self) -> usize;

    /// Number of values in a single sensor frame.
    fn state_size(&self) -> usize;

    /// Applies an action and returns the resulting step.
    fn step(&mut self, action: ActionId) -> Result<Step>;

    /// Returns if the current episode has ended.
    fn is_game_over(&self) -> bool;

    /// Starts a new episode.
    fn reset_game(&mut self) -> Result<()>;

    /// Total number of steps taken since the environment was built.
    fn step_number(&self) -> usize;

    /// Number of episodes finished with [`Env::reset_game`].
    fn game_number(&self) -> usize;

    /// Number of steps in the current episode.
    fn episode_step_number(&self) -> usize;

    /// Sum of rewards in the current episode.
    fn game_score(&self) -> f32;
}
