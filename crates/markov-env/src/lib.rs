//! Environments and loaders for markov-core
//!
//! This crate builds [`markov_core::Mdp`] values from outside descriptions:
//! - Grid worlds, hand-made or with randomly placed holes
//! - JSON definition files

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod gridworld;
pub mod loader;

pub use gridworld::{Cell, Goal, GridWorld, Move};
pub use loader::{load_definition, load_gridworld, load_mdp};

// Re-export core types
pub use markov_core::{Action, Mdp, MdpDefinition, MdpError, Reward, State, Transition};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{load_mdp, GridWorld, Move};
    pub use markov_core::prelude::*;
}
