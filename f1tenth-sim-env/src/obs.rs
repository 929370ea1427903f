//! Observations built from range scans.
use crate::track::Scanner;
use f1tenth_core::State;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Encoding of a range scan into a frame, stacked over time into a state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Observation {
    /// Ranges divided by the maximum range.
    /// State shape `[num_rays, history_length]`.
    Ranges,

    /// [`Observation::Ranges`] with the speed divided by the maximum speed
    /// as an additional last row. State shape `[num_rays + 1, history_length]`.
    RangesVelocity,

    /// Points hit by the rays in the vehicle frame, `(forward, left)`,
    /// divided by the maximum range. State shape
    /// `[num_rays, 2 * history_length]`, the two coordinates of a frame
    /// being adjacent.
    Points,

    /// Occupancy image of the points hit by the rays, with values 0 or 255.
    /// The vehicle is at the center of the image, which spans twice the
    /// maximum range in both directions. State shape
    /// `[width, height, history_length]`.
    Image {
        /// Width of the image.
        width: usize,
        /// Height of the image.
        height: usize,
    },
}

impl Default for Observation {
    fn default() -> Self {
        Self::Ranges
    }
}

impl Observation {
    /// Shape of a state.
    pub fn state_shape(&self, num_rays: usize, history_length: usize) -> Vec<usize> {
        match self {
            Self::Ranges => vec![num_rays, history_length],
            Self::RangesVelocity => vec![num_rays + 1, history_length],
            Self::Points => vec![num_rays, 2 * history_length],
            Self::Image { width, height } => vec![*width, *height, history_length],
        }
    }

    /// Encodes a scan and the speed ratio into a frame.
    pub fn frame(&self, scanner: &Scanner, ranges: &[f32], speed_ratio: f32) -> Vec<f32> {
        let max_range = scanner.max_range;
        match self {
            Self::Ranges => ranges.iter().map(|r| r / max_range).collect(),
            Self::RangesVelocity => {
                let mut frame = ranges.iter().map(|r| r / max_range).collect::<Vec<_>>();
                frame.push(speed_ratio);
                frame
            }
            Self::Points => ranges
                .iter()
                .enumerate()
                .flat_map(|(i, r)| {
                    let a = scanner.ray_angle(i);
                    let r = r / max_range;
                    vec![r * a.cos(), r * a.sin()]
                })
                .collect(),
            Self::Image { width, height } => {
                let (w, h) = (*width, *height);
                let mut frame = vec![0f32; w * h];
                for (i, r) in ranges.iter().enumerate() {
                    if *r >= max_range {
                        continue;
                    }
                    let a = scanner.ray_angle(i);
                    let u = 0.5 * (r * a.cos() / max_range + 1.0);
                    let v = 0.5 * (r * a.sin() / max_range + 1.0);
                    let ix = ((u * w as f32) as usize).min(w - 1);
                    let iy = ((v * h as f32) as usize).min(h - 1);
                    frame[ix * h + iy] = 255.0;
                }
                frame
            }
        }
    }
}

/// The most recent frames, oldest first.
pub(crate) struct FrameHistory {
    observation: Observation,
    shape: Vec<usize>,
    frames: VecDeque<Vec<f32>>,
    history_length: usize,
}

impl FrameHistory {
    pub(crate) fn new(observation: Observation, num_rays: usize, history_length: usize) -> Self {
        Self {
            shape: observation.state_shape(num_rays, history_length),
            observation,
            frames: VecDeque::with_capacity(history_length),
            history_length,
        }
    }

    /// Fills the history with copies of `frame`.
    pub(crate) fn reset(&mut self, frame: Vec<f32>) {
        self.frames.clear();
        for _ in 1..self.history_length {
            self.frames.push_back(frame.clone());
        }
        self.frames.push_back(frame);
    }

    pub(crate) fn push(&mut self, frame: Vec<f32>) {
        if self.frames.len() == self.history_length {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub(crate) fn state(&self) -> State {
        let frames = &self.frames;
        let rows = self.shape[0];
        match self.observation {
            Observation::Ranges | Observation::RangesVelocity => {
                ArrayD::from_shape_fn(IxDyn(&self.shape), |ix| frames[ix[1]][ix[0]])
            }
            Observation::Points => ArrayD::from_shape_fn(IxDyn(&self.shape), |ix| {
                frames[ix[1] / 2][2 * ix[0] + ix[1] % 2]
            }),
            Observation::Image { height, .. } => {
                debug_assert_eq!(rows * height, frames[0].len());
                ArrayD::from_shape_fn(IxDyn(&self.shape), |ix| {
                    frames[ix[2]][ix[0] * height + ix[1]]
                })
            }
        }
    }
}
