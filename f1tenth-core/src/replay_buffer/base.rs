//! Ring buffer of transitions.
use super::{decode, encode, priority, PackedState, PerConfig, PriorityIndex, ReplayBufferConfig};
use crate::{error::F1tenthError, ActionId, Sample};
use anyhow::Result;
use log::trace;

/// A stored transition.
enum Entry {
    /// Transition kept as is.
    Raw(Sample),

    /// Transition with compressed states.
    Packed {
        state: PackedState,
        action: ActionId,
        reward: f32,
        next_state: Option<PackedState>,
        terminal: bool,
    },
}

impl Entry {
    fn pack(sample: Sample) -> Result<Self> {
        let next_state = match &sample.next_state {
            Some(s) => Some(encode(s)?),
            None => None,
        };
        Ok(Self::Packed {
            state: encode(&sample.state)?,
            action: sample.action,
            reward: sample.reward,
            next_state,
            terminal: sample.terminal,
        })
    }

    fn unpack(&self) -> Result<Sample> {
        match self {
            Self::Raw(sample) => Ok(sample.clone()),
            Self::Packed {
                state,
                action,
                reward,
                next_state,
                terminal,
            } => {
                let next_state = match next_state {
                    Some(s) => Some(decode(s)?),
                    None => None,
                };
                Ok(Sample {
                    state: decode(state)?,
                    action: *action,
                    reward: *reward,
                    next_state,
                    terminal: *terminal,
                })
            }
        }
    }
}

/// Fixed-capacity store of [`Sample`]s.
///
/// Samples are written at the write cursor, which then advances modulo the
/// capacity. Once the store is full, each insertion overwrites the oldest
/// sample. Slot `i` is addressed directly by [`SampleStore::get`], so after
/// wrapping around, index `0` no longer refers to the oldest sample.
pub struct SampleStore {
    /// Maximum number of samples.
    capacity: usize,

    /// Write cursor.
    i: usize,

    /// Number of populated slots.
    size: usize,

    /// Slots, `None` until written for the first time.
    slots: Vec<Option<Entry>>,

    /// If `true`, states are compressed on insertion.
    compress: bool,

    /// Priorities of the slots, present in prioritized mode.
    per_state: Option<(PerConfig, PriorityIndex)>,
}

impl SampleStore {
    /// Builds an empty store.
    ///
    /// Fails if the capacity is zero.
    pub fn build(config: &ReplayBufferConfig) -> Result<Self> {
        let capacity = config.capacity;
        if capacity < 1 {
            return Err(F1tenthError::InvalidCapacity(capacity).into());
        }

        let per_state = config
            .per_config
            .as_ref()
            .map(|c| (c.clone(), PriorityIndex::new(capacity)));

        Ok(Self {
            capacity,
            i: 0,
            size: 0,
            slots: (0..capacity).map(|_| None).collect(),
            compress: config.compress,
            per_state,
        })
    }

    /// Inserts a sample, overwriting the oldest one if the store is full.
    ///
    /// An error is returned only when compression of the states fails.
    pub fn add(&mut self, sample: Sample) -> Result<()> {
        if let Some((config, index)) = self.per_state.as_mut() {
            index.set(self.i, priority(sample.reward, sample.terminal, config));
        }

        let entry = match self.compress {
            true => Entry::pack(sample)?,
            false => Entry::Raw(sample),
        };
        self.slots[self.i] = Some(entry);
        trace!("Stored a sample at slot {}", self.i);

        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
        Ok(())
    }

    /// Number of populated slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum number of samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot the next sample is written to.
    pub fn write_cursor(&self) -> usize {
        self.i
    }

    /// Returns `true` if states are stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    /// Returns the sample in slot `index`, decompressing it if needed.
    pub fn get(&self, index: usize) -> Result<Sample> {
        if index >= self.size {
            return Err(F1tenthError::IndexOutOfRange {
                index,
                size: self.size,
            }
            .into());
        }

        match &self.slots[index] {
            Some(entry) => entry.unpack(),
            None => Err(F1tenthError::IndexOutOfRange {
                index,
                size: self.size,
            }
            .into()),
        }
    }

    /// Priorities of the slots, if sampling is prioritized.
    pub fn priorities(&self) -> Option<&PriorityIndex> {
        self.per_state.as_ref().map(|(_, index)| index)
    }
}
