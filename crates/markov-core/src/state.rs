//! State identities

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named, indexed situation in the environment.
///
/// States are immutable values. Identity is the index: two states compare
/// equal iff their indices match, whatever their names. Replacing a state's
/// properties means building a new `State` and registering it at the same
/// index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    name: String,
    index: usize,
    terminal: bool,
}

impl State {
    /// Create a new state
    pub fn new(name: impl Into<String>, index: usize, terminal: bool) -> Self {
        Self {
            name: name.into(),
            index,
            terminal,
        }
    }

    /// Create the states `names[0]`, `names[1]`, ... at indices 0, 1, ...
    pub fn sequence<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Self::new(name, index, false))
            .collect()
    }

    /// Get the state name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the state index
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if this is a terminal state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S_{}: {}", self.index, self.name)
    }
}
