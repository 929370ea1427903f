//! Replay buffer.
//!
//! [`SampleStore`] is a ring buffer of [`Sample`](crate::Sample)s with a fixed
//! capacity. Once full, every insertion overwrites the oldest sample.
//! States can be kept gzip compressed, which allows a much larger capacity
//! for the same memory; they are decoded when drawn.
//!
//! [`Sampler`] draws batches from the store, either uniformly or, if the
//! store is configured with a [`PerConfig`], with probability proportional to
//! a priority assigned once at insertion. Terminal samples and samples with
//! non-zero reward get a boosted priority.
//!
//! ```rust
//! use f1tenth_core::replay_buffer::{PerConfig, ReplayBufferConfig, SampleStore, Sampler};
//!
//! let config = ReplayBufferConfig::default()
//!     .capacity(10000)
//!     .compress(true)
//!     .per_config(Some(PerConfig::default()));
//! let store = SampleStore::build(&config).unwrap();
//! let sampler = Sampler::new(config.seed);
//! assert_eq!(store.size(), 0);
//! ```
mod base;
mod codec;
mod config;
mod priority;
mod sampler;
pub use base::SampleStore;
pub use codec::{decode, encode, PackedState};
pub use config::{PerConfig, ReplayBufferConfig};
pub use priority::{priority, PriorityIndex};
pub use sampler::Sampler;
