//! Simulated vehicle.
mod config;
use crate::{
    obs::FrameHistory,
    track::{wrap_angle, Pose},
};
pub use config::SimEnvConfig;
use anyhow::{bail, ensure, Result};
use f1tenth_core::{error::F1tenthError, ActionId, Env, State, Step};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;

/// Kinematic bicycle driving on an annular [`Track`](crate::Track).
///
/// A step applies the steering angle and the speed of the action for `dt`
/// seconds. The reward is the distance progressed along the center line of
/// the track, negative when driving backwards, or `crash_reward` if the
/// vehicle hits a wall, which ends the episode. Episodes also end after
/// `max_episode_steps` steps.
///
/// Each episode starts at a random point of the center line.
pub struct SimEnv {
    config: SimEnvConfig,
    rng: StdRng,
    pose: Pose,
    speed: f32,
    max_speed: f32,
    history: FrameHistory,
    step_number: usize,
    game_number: usize,
    episode_step_number: usize,
    game_score: f32,
    game_over: bool,
}

impl SimEnv {
    /// Current pose of the vehicle.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.history.state()
    }

    fn frame(&self) -> Vec<f32> {
        let ranges = self.config.scanner.scan(&self.config.track, &self.pose);
        self.config
            .observation
            .frame(&self.config.scanner, &ranges, self.speed / self.max_speed)
    }

    fn place_vehicle(&mut self) {
        let theta = self.rng.gen_range(-PI..PI);
        let mut pose = self.config.track.pose_at(theta);
        let noise = self.config.heading_noise;
        if noise > 0.0 {
            pose.heading = wrap_angle(pose.heading + self.rng.gen_range(-noise..=noise));
        }
        self.pose = pose;
        self.speed = self.config.speeds[0];
        let frame = self.frame();
        self.history.reset(frame);
    }
}

impl Env for SimEnv {
    type Config = SimEnvConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        ensure!(
            !config.steering_angles.is_empty() && !config.speeds.is_empty(),
            "at least one steering angle and one speed are required"
        );
        ensure!(config.history_length > 0, "history_length must be positive");
        ensure!(config.scanner.num_rays > 0, "num_rays must be positive");
        let max_speed = config.speeds.iter().fold(0f32, |m, v| m.max(v.abs()));
        ensure!(max_speed > 0.0, "at least one speed must be non-zero");

        let history = FrameHistory::new(
            config.observation.clone(),
            config.scanner.num_rays,
            config.history_length,
        );
        let mut env = Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed as u64),
            pose: config.track.pose_at(0.0),
            speed: 0.0,
            max_speed,
            history,
            step_number: 0,
            game_number: 0,
            episode_step_number: 0,
            game_score: 0.0,
            game_over: false,
        };
        env.place_vehicle();
        Ok(env)
    }

    fn num_actions(&self) -> usize {
        self.config.num_actions()
    }

    fn state_size(&self) -> usize {
        self.config.scanner.num_rays
    }

    fn step(&mut self, action: ActionId) -> Result<Step> {
        if self.game_over {
            bail!("step on a finished episode, reset_game is required");
        }
        if action >= self.num_actions() {
            return Err(F1tenthError::InvalidAction {
                action,
                num_actions: self.num_actions(),
            }
            .into());
        }

        let n = self.config.steering_angles.len();
        let steering = self.config.steering_angles[action % n];
        self.speed = self.config.speeds[action / n];

        let prev = self.pose;
        let dt = self.config.dt;
        let heading = prev.heading;
        self.pose = Pose {
            x: prev.x + self.speed * heading.cos() * dt,
            y: prev.y + self.speed * heading.sin() * dt,
            heading: wrap_angle(
                heading + self.speed / self.config.wheelbase * steering.tan() * dt,
            ),
        };

        let track = &self.config.track;
        let crashed = track.collides(self.pose.x, self.pose.y, self.config.vehicle_radius);
        let reward = match crashed {
            true => self.config.crash_reward,
            false => track.progress(&prev, &self.pose) * track.center_radius(),
        };

        let frame = self.frame();
        self.history.push(frame);
        self.step_number += 1;
        self.episode_step_number += 1;
        self.game_score += reward;
        self.game_over = crashed || self.episode_step_number >= self.config.max_episode_steps;
        trace!("pose = {:?}, reward = {}", self.pose, reward);
        if crashed {
            debug!("Crashed at episode step {}", self.episode_step_number);
        }

        Ok(Step {
            reward,
            state: self.history.state(),
            is_terminal: self.game_over,
        })
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn reset_game(&mut self) -> Result<()> {
        self.game_number += 1;
        self.episode_step_number = 0;
        self.game_score = 0.0;
        self.game_over = false;
        self.place_vehicle();
        Ok(())
    }

    fn step_number(&self) -> usize {
        self.step_number
    }

    fn game_number(&self) -> usize {
        self.game_number
    }

    fn episode_step_number(&self) -> usize {
        self.episode_step_number
    }

    fn game_score(&self) -> f32 {
        self.game_score
    }
}
