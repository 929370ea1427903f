//! Transitions.
use ndarray::ArrayD;

/// Observation of the vehicle, e.g. a stack of range scans of shape
/// `[state_size, history_length]`.
pub type State = ArrayD<f32>;

/// Index of a discrete action in `[0, num_actions)`.
pub type ActionId = usize;

/// A transition `(s_t, a_t, r_t, s_t+1, terminal)`.
///
/// States are owned copies, independent of the buffers of the environment
/// that produced them. `next_state` is `None` for terminal transitions.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Observation before the action.
    pub state: State,

    /// Action taken.
    pub action: ActionId,

    /// Reward received for the action.
    pub reward: f32,

    /// Observation after the action, absent when the episode ended.
    pub next_state: Option<State>,

    /// Whether the action ended the episode.
    pub terminal: bool,
}

impl Sample {
    /// Constructs a transition. The next state is dropped if `terminal` is set.
    pub fn new(
        state: State,
        action: ActionId,
        reward: f32,
        next_state: State,
        terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state: if terminal { None } else { Some(next_state) },
            terminal,
        }
    }
}
