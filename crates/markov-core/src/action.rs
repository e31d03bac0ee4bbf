//! Action identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named choice available from a state. Equality and ordering are by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action(String);

impl Action {
    /// Create a new action
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create one action per name
    pub fn many<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Self::new).collect()
    }

    /// Get the action name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
