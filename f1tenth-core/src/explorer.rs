//! Epsilon-greedy action selection.
use crate::{ActionId, Agent, Learner, State};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Initial exploration rate.
    pub epsilon: f64,

    /// Factor applied to the exploration rate on every training step.
    pub decay: f64,

    /// Lower bound of the exploration rate.
    pub epsilon_min: f64,

    /// Random seed.
    pub seed: u64,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            decay: 0.99988,
            epsilon_min: 0.1,
            seed: 42,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial exploration rate.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the decay factor.
    pub fn decay(mut self, v: f64) -> Self {
        self.decay = v;
        self
    }

    /// Sets the lower bound of the exploration rate.
    pub fn epsilon_min(mut self, v: f64) -> Self {
        self.epsilon_min = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`EpsilonGreedyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EpsilonGreedyConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Epsilon-greedy action selector.
///
/// The exploration rate itself is owned by the caller: [`EpsilonGreedy::select`]
/// takes it as an argument and [`EpsilonGreedy::decay`] returns the next value.
/// This lets the trainer keep a decaying rate for training and a fixed one
/// for evaluation.
pub struct EpsilonGreedy {
    config: EpsilonGreedyConfig,
    num_actions: usize,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Constructs a selector over `num_actions` actions.
    pub fn build(config: &EpsilonGreedyConfig, num_actions: usize) -> Self {
        Self {
            config: config.clone(),
            num_actions,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Initial exploration rate.
    pub fn initial_epsilon(&self) -> f64 {
        self.config.epsilon
    }

    /// Selects an action.
    ///
    /// Returns a uniformly random action if there is no state yet or a
    /// uniform draw in `[0, 1)` is below `epsilon`; otherwise the greedy
    /// action of the agent.
    pub fn select<L: Learner>(
        &mut self,
        state: Option<&State>,
        epsilon: f64,
        agent: &Agent<L>,
    ) -> Result<ActionId> {
        match state {
            None => Ok(self.random_action()),
            Some(state) => {
                if self.rng.gen::<f64>() < epsilon {
                    Ok(self.random_action())
                } else {
                    agent.infer(state)
                }
            }
        }
    }

    /// Next exploration rate, `max(epsilon * decay, epsilon_min)`.
    pub fn decay(&self, epsilon: f64) -> f64 {
        (epsilon * self.config.decay).max(self.config.epsilon_min)
    }

    fn random_action(&mut self) -> ActionId {
        self.rng.gen_range(0..self.num_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{DummyLearner, DummyLearnerConfig},
        AgentConfig,
    };
    use ndarray::{ArrayD, IxDyn};

    fn agent() -> Result<Agent<DummyLearner>> {
        let config = DummyLearnerConfig::default()
            .num_actions(4)
            .state_shape(vec![3]);
        Agent::build(&AgentConfig::default(), &config)
    }

    #[test]
    fn test_decay_schedule() {
        let config = EpsilonGreedyConfig::default()
            .epsilon(1.0)
            .decay(0.5)
            .epsilon_min(0.2);
        let explorer = EpsilonGreedy::build(&config, 3);

        let mut eps = explorer.initial_epsilon();
        let mut history = vec![];
        for _ in 0..4 {
            eps = explorer.decay(eps);
            history.push(eps);
        }
        assert_eq!(history, vec![0.5, 0.25, 0.2, 0.2]);
    }

    #[test]
    fn test_decay_is_monotone_and_bounded() {
        let explorer = EpsilonGreedy::build(&EpsilonGreedyConfig::default(), 3);
        let mut eps = explorer.initial_epsilon();
        for _ in 0..100_000 {
            let next = explorer.decay(eps);
            assert!(next <= eps);
            assert!(next >= 0.1);
            eps = next;
        }
        assert_eq!(eps, 0.1);
    }

    #[test]
    fn test_greedy_and_random_selection() -> Result<()> {
        let agent = agent()?;
        let state = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0, -2.0, 0.5])?;
        let greedy = agent.infer(&state)?;

        let mut explorer = EpsilonGreedy::build(&EpsilonGreedyConfig::default(), 4);
        for _ in 0..50 {
            assert_eq!(explorer.select(Some(&state), 0.0, &agent)?, greedy);
        }

        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[explorer.select(Some(&state), 1.0, &agent)?] += 1;
        }
        assert!(counts.iter().all(|c| *c > 800));

        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[explorer.select(None, 0.0, &agent)?] += 1;
        }
        assert!(counts.iter().all(|c| *c > 800));
        Ok(())
    }
}
