//! Construction options and the name-keyed bulk definition

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use crate::error::Result;

/// Number of index slots a new MDP allocates
pub const DEFAULT_STATE_CAPACITY: usize = 128;

/// Options for an empty MDP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdpOptions {
    /// Initial number of index slots
    pub state_capacity: usize,
    /// Discount rate (gamma), in `(0, 1]`
    pub discount_rate: f32,
}

impl Default for MdpOptions {
    fn default() -> Self {
        Self {
            state_capacity: DEFAULT_STATE_CAPACITY,
            discount_rate: 1.0,
        }
    }
}

/// A transition written with its destination's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDefinition {
    /// Transition probability
    pub probability: f32,
    /// Name of the destination state
    pub next_state: String,
}

/// Name-keyed description of a whole MDP, consumed by
/// [`Mdp::from_definition`](crate::Mdp::from_definition).
///
/// Deserializes from JSON such as:
///
/// ```json
/// {
///   "initial_state": "start",
///   "states": ["start", "goal"],
///   "terminals": ["goal"],
///   "actions": ["go"],
///   "rewards": { "goal": 1.0 },
///   "transitions": { "start": { "go": { "probability": 1.0, "next_state": "goal" } } },
///   "discount_rate": 0.9
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdpDefinition {
    /// Name of the state placed at index 0; empty for none
    pub initial_state: String,
    /// State names, in index order (the initial state may be listed or not)
    pub states: Vec<String>,
    /// Names of terminal states
    pub terminals: Vec<String>,
    /// Action names
    pub actions: Vec<String>,
    /// Reward per state name; unlisted states get zero
    pub rewards: BTreeMap<String, f32>,
    /// Outgoing transitions per state name, keyed by action name
    pub transitions: BTreeMap<String, BTreeMap<String, TransitionDefinition>>,
    /// Discount rate (gamma)
    pub discount_rate: f32,
    /// Initial number of index slots, [`DEFAULT_STATE_CAPACITY`] if absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_capacity: Option<usize>,
}

impl Default for MdpDefinition {
    fn default() -> Self {
        Self {
            initial_state: String::new(),
            states: Vec::new(),
            terminals: Vec::new(),
            actions: Vec::new(),
            rewards: BTreeMap::new(),
            transitions: BTreeMap::new(),
            discount_rate: 1.0,
            state_capacity: None,
        }
    }
}

impl MdpDefinition {
    /// Start an empty definition with the given discount rate
    #[must_use]
    pub fn new(discount_rate: f32) -> Self {
        Self {
            discount_rate,
            ..Self::default()
        }
    }

    /// Parse a definition from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a definition from a JSON reader.
    ///
    /// Read failures (including invalid UTF-8) are [`MdpError::Io`](crate::MdpError::Io);
    /// malformed JSON is [`MdpError::Serialization`](crate::MdpError::Serialization).
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the initial state
    #[must_use]
    pub fn initial_state(mut self, name: impl Into<String>) -> Self {
        self.initial_state = name.into();
        self
    }

    /// Append a state
    #[must_use]
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(name.into());
        self
    }

    /// Mark a state terminal
    #[must_use]
    pub fn terminal(mut self, name: impl Into<String>) -> Self {
        self.terminals.push(name.into());
        self
    }

    /// Append an action
    #[must_use]
    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(name.into());
        self
    }

    /// Set a state's reward
    #[must_use]
    pub fn reward(mut self, state: impl Into<String>, reward: f32) -> Self {
        self.rewards.insert(state.into(), reward);
        self
    }

    /// Add a transition from `state` via `action` to `next_state`
    #[must_use]
    pub fn transition(
        mut self,
        state: impl Into<String>,
        action: impl Into<String>,
        probability: f32,
        next_state: impl Into<String>,
    ) -> Self {
        self.transitions.entry(state.into()).or_default().insert(
            action.into(),
            TransitionDefinition {
                probability,
                next_state: next_state.into(),
            },
        );
        self
    }
}
