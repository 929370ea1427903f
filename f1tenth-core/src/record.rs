//! Run statistics.
//!
//! The [`Trainer`](crate::Trainer) summarizes training as [`Record`]s, sets of
//! named values, and hands them to a [`Recorder`]. Every record written by the
//! trainer carries the number of environment steps under the key
//! `env_steps`, which recorders use as the time axis. Values are `f32`, so a
//! step count above 2^24 is rounded.
//!
//! ```rust
//! use f1tenth_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("env_steps", 300.0);
//! record.insert("epsilon", RecordValue::Scalar(0.97));
//! assert_eq!(record.get_scalar("epsilon").unwrap(), 0.97);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
