//! Per-state action maps and the state-level transition table

use std::collections::BTreeMap;

use crate::error::{MdpError, Result};
use crate::render::block;
use crate::{Action, State, Transition};

/// Outgoing transitions of one origin state, keyed by action.
///
/// Iteration and rendering are ordered by action name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTableEntry {
    entry: BTreeMap<Action, Transition>,
}

impl TransitionTableEntry {
    /// Create an empty entry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the transition taken via `action`
    #[must_use]
    pub fn get(&self, action: &Action) -> Option<&Transition> {
        self.entry.get(action)
    }

    /// Insert or overwrite the transition taken via `action`
    pub fn set(&mut self, action: Action, probability: f32, next_state: State) {
        self.entry
            .insert(action, Transition::new(probability, next_state));
    }

    /// Remove the transition taken via `action`, if any
    pub fn remove(&mut self, action: &Action) -> Option<Transition> {
        self.entry.remove(action)
    }

    /// Remove every transition leading to `next_state`, returning how many were removed
    pub fn remove_by_destination(&mut self, next_state: &State) -> usize {
        let before = self.entry.len();
        self.entry
            .retain(|_, transition| transition.next_state() != next_state);
        before - self.entry.len()
    }

    /// Number of actions with a transition
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry.len()
    }

    /// Check if there are no transitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }

    /// Iterate transitions in action order
    pub fn iter(&self) -> impl Iterator<Item = (&Action, &Transition)> {
        self.entry.iter()
    }

    /// Render as `{ action: (probability, destination), ... }`, closing brace at `indent`
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        block(
            indent,
            self.entry
                .iter()
                .map(|(action, transition)| format!("{action}: {transition}")),
        )
    }
}

impl FromIterator<(Action, Transition)> for TransitionTableEntry {
    fn from_iter<I: IntoIterator<Item = (Action, Transition)>>(iter: I) -> Self {
        Self {
            entry: iter.into_iter().collect(),
        }
    }
}

/// Mapping from origin state to its [`TransitionTableEntry`], ordered by state index
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    table: BTreeMap<State, TransitionTableEntry>,
}

impl TransitionTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry of `state`
    #[must_use]
    pub fn get(&self, state: &State) -> Option<&TransitionTableEntry> {
        self.table.get(state)
    }

    /// Get the entry of `state` for in-place edits
    pub fn get_mut(&mut self, state: &State) -> Option<&mut TransitionTableEntry> {
        self.table.get_mut(state)
    }

    /// Register or overwrite the whole entry of `state`
    pub fn set(&mut self, state: State, entry: TransitionTableEntry) {
        // Remove first so the stored key is the new state object, not a stale one
        // sharing its index.
        self.table.remove(&state);
        self.table.insert(state, entry);
    }

    /// Set one transition inside the existing entry of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::PreconditionViolation`] if `state` has no entry yet;
    /// register one with [`TransitionTable::set`] first.
    pub fn update(
        &mut self,
        state: &State,
        action: Action,
        probability: f32,
        next_state: State,
    ) -> Result<()> {
        let entry = self.table.get_mut(state).ok_or_else(|| {
            MdpError::PreconditionViolation(format!(
                "state {state} has no transition entry to update"
            ))
        })?;
        entry.set(action, probability, next_state);
        Ok(())
    }

    /// Remove the entry of `state` (all of its outgoing transitions)
    pub fn remove(&mut self, state: &State) -> Option<TransitionTableEntry> {
        self.table.remove(state)
    }

    /// Check if `state` has an entry
    #[must_use]
    pub fn contains(&self, state: &State) -> bool {
        self.table.contains_key(state)
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

    /// Iterate entries in state index order
    pub fn iter(&self) -> impl Iterator<Item = (&State, &TransitionTableEntry)> {
        self.table.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut TransitionTableEntry> {
        self.table.values_mut()
    }

    /// Render as a nested block; each entry is one level deeper than the table
    #[must_use]
    pub fn render(&self, indent: &str) -> String {
        let inner = format!("{indent}\t");
        block(
            indent,
            self.table
                .iter()
                .map(|(state, entry)| format!("{state}: {}", entry.render(&inner))),
        )
    }
}
