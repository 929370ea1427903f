//! Batch sampler.
use super::SampleStore;
use crate::{error::F1tenthError, Sample};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Draws batches of samples from a [`SampleStore`].
///
/// Indices are drawn independently with replacement, so a batch larger than
/// the store is still filled. If the store holds priorities, slot `i` is
/// drawn with probability `priority[i] / sum(priority)` by inverse sampling
/// of the cumulative priority; otherwise uniformly from `[0, size)`.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Creates a sampler with the given random seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws `batch_size` slot indices.
    ///
    /// Fails if the store is empty.
    pub fn draw_indices(&mut self, store: &SampleStore, batch_size: usize) -> Result<Vec<usize>> {
        let size = store.size();
        if size == 0 {
            return Err(F1tenthError::EmptyReplayBuffer.into());
        }

        let ixs = match store.priorities() {
            None => (0..batch_size)
                .map(|_| self.rng.gen_range(0..size))
                .collect(),
            Some(index) => {
                let total = index.total();
                (0..batch_size)
                    .map(|_| {
                        let s = self.rng.gen::<f64>() * total;
                        index.find(s).min(size - 1)
                    })
                    .collect()
            }
        };

        Ok(ixs)
    }

    /// Draws a batch of `batch_size` samples.
    pub fn draw(&mut self, store: &SampleStore, batch_size: usize) -> Result<Vec<Sample>> {
        self.draw_indices(store, batch_size)?
            .into_iter()
            .map(|ix| store.get(ix))
            .collect()
    }
}
