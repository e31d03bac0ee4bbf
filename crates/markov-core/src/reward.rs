//! Reward signals and the per-state rewards table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::render::block;
use crate::State;

/// Scalar reward for occupying a state
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Reward(pub f32);

impl Reward {
    /// The reward of a state with no entry
    pub const ZERO: Self = Self(0.0);

    /// Create a new reward
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl From<f32> for Reward {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<Reward> for f32 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::Mul<f32> for Reward {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self::Output {
        Self(self.0 * scalar)
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from state (by index) to reward.
///
/// The state objects are kept alongside the rewards so the table can render
/// state names. Iteration and rendering are ordered by state index.
#[derive(Debug, Clone, Default)]
pub struct RewardsTable {
    table: BTreeMap<usize, Reward>,
    states: BTreeMap<usize, State>,
}

impl RewardsTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the reward of `state`; a state without an entry has reward zero
    #[must_use]
    pub fn get(&self, state: &State) -> Reward {
        self.table
            .get(&state.index())
            .copied()
            .unwrap_or(Reward::ZERO)
    }

    /// Check if `state` has an entry
    #[must_use]
    pub fn contains(&self, state: &State) -> bool {
        self.table.contains_key(&state.index())
    }

    /// Insert or overwrite the reward of `state`
    pub fn set(&mut self, state: &State, reward: Reward) {
        self.table.insert(state.index(), reward);
        self.states.insert(state.index(), state.clone());
    }

    /// Remove the entry of `state`, if any
    pub fn remove(&mut self, state: &State) {
        self.table.remove(&state.index());
        self.states.remove(&state.index());
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (&State, Reward)> {
        self.states
            .iter()
            .filter_map(|(index, state)| self.table.get(index).map(|reward| (state, *reward)))
    }

    /// Render as a `{ state: reward, ... }` block whose closing brace sits at `indent`
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        block(
            indent,
            self.iter().map(|(state, reward)| format!("{state}: {reward}")),
        )
    }
}

impl FromIterator<(State, Reward)> for RewardsTable {
    fn from_iter<I: IntoIterator<Item = (State, Reward)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (state, reward) in iter {
            table.set(&state, reward);
        }
        table
    }
}
