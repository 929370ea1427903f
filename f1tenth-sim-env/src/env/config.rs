//! Configuration of [`SimEnv`](super::SimEnv).
use crate::{obs::Observation, track::Scanner, track::Track};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SimEnv`](super::SimEnv).
///
/// The actions are all pairs of a steering angle and a speed; action
/// `speed_index * steering_angles.len() + steering_index`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SimEnvConfig {
    /// Track.
    pub track: Track,

    /// Range scanner mounted on the vehicle.
    pub scanner: Scanner,

    /// Encoding of the scans.
    pub observation: Observation,

    /// Number of stacked frames in a state.
    pub history_length: usize,

    /// Steering angles in radians, positive to the left.
    pub steering_angles: Vec<f32>,

    /// Speeds in meters per second.
    pub speeds: Vec<f32>,

    /// Distance between the axles in meters.
    pub wheelbase: f32,

    /// Radius of the disc approximating the vehicle in meters.
    pub vehicle_radius: f32,

    /// Duration of a step in seconds.
    pub dt: f32,

    /// Maximum number of steps of an episode.
    pub max_episode_steps: usize,

    /// Reward of a step hitting a wall.
    pub crash_reward: f32,

    /// Maximum deviation of the initial heading from the track direction in
    /// radians.
    pub heading_noise: f32,
}

impl Default for SimEnvConfig {
    fn default() -> Self {
        Self {
            track: Track::default(),
            scanner: Scanner::default(),
            observation: Observation::default(),
            history_length: 2,
            steering_angles: vec![-0.3, -0.15, 0.0, 0.15, 0.3],
            speeds: vec![1.5],
            wheelbase: 0.33,
            vehicle_radius: 0.2,
            dt: 0.1,
            max_episode_steps: 1000,
            crash_reward: -1.0,
            heading_noise: 0.1,
        }
    }
}

impl SimEnvConfig {
    /// Sets the track.
    pub fn track(mut self, v: Track) -> Self {
        self.track = v;
        self
    }

    /// Sets the range scanner.
    pub fn scanner(mut self, v: Scanner) -> Self {
        self.scanner = v;
        self
    }

    /// Sets the encoding of the scans.
    pub fn observation(mut self, v: Observation) -> Self {
        self.observation = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn history_length(mut self, v: usize) -> Self {
        self.history_length = v;
        self
    }

    /// Sets the steering angles.
    pub fn steering_angles(mut self, v: Vec<f32>) -> Self {
        self.steering_angles = v;
        self
    }

    /// Sets the speeds.
    pub fn speeds(mut self, v: Vec<f32>) -> Self {
        self.speeds = v;
        self
    }

    /// Sets the duration of a step.
    pub fn dt(mut self, v: f32) -> Self {
        self.dt = v;
        self
    }

    /// Sets the maximum number of steps of an episode.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets the reward of a crash.
    pub fn crash_reward(mut self, v: f32) -> Self {
        self.crash_reward = v;
        self
    }

    /// Sets the noise of the initial heading.
    pub fn heading_noise(mut self, v: f32) -> Self {
        self.heading_noise = v;
        self
    }

    /// Number of actions.
    pub fn num_actions(&self) -> usize {
        self.steering_angles.len() * self.speeds.len()
    }

    /// Shape of a state.
    pub fn state_shape(&self) -> Vec<usize> {
        self.observation
            .state_shape(self.scanner.num_rays, self.history_length)
    }

    /// Constructs [`SimEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SimEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_sim_env_config() -> Result<()> {
        let config = SimEnvConfig::default()
            .observation(Observation::Image {
                width: 32,
                height: 32,
            })
            .speeds(vec![1.0, 2.0])
            .max_episode_steps(200);
        assert_eq!(config.num_actions(), 10);
        assert_eq!(config.state_shape(), vec![32, 32, 2]);

        let dir = TempDir::new("sim_env_config")?;
        let path = dir.path().join("sim_env.yaml");
        config.save(&path)?;
        let config_ = SimEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
