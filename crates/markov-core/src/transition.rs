//! Transition edges

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::State;

/// Probability and destination reached by taking an action from a state.
///
/// Probabilities of competing actions are not required to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    probability: f32,
    next_state: State,
}

impl Transition {
    /// Create a new transition
    #[must_use]
    pub fn new(probability: f32, next_state: State) -> Self {
        Self {
            probability,
            next_state,
        }
    }

    /// Get the transition probability
    #[must_use]
    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Get the destination state
    #[must_use]
    pub fn next_state(&self) -> &State {
        &self.next_state
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {})", self.probability, self.next_state.name())
    }
}

/// Uniform probability over `support` outcomes, zero for an empty support
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn uniform(support: usize) -> f32 {
    if support == 0 {
        0.0
    } else {
        1.0 / support as f32
    }
}
