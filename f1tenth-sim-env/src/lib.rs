#![warn(missing_docs)]
//! Simulated f1tenth vehicle for training without the real car.
//!
//! [`SimEnv`] implements [`f1tenth_core::Env`] with a kinematic vehicle on an
//! annular [`Track`], observed through a planar range [`Scanner`]. The
//! [`Observation`] selects how scans are encoded, matching the input of the
//! network topologies of the learner.
mod env;
mod obs;
mod track;

pub use env::{SimEnv, SimEnvConfig};
pub use obs::Observation;
pub use track::{wrap_angle, Pose, Scanner, Track};
