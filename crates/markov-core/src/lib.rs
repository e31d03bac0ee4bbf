//! Finite Markov Decision Process data model
//!
//! This crate provides a mutable, in-memory MDP: states, actions, rewards,
//! probabilistic transitions and a discount rate, with operations to build
//! and edit it incrementally while its cross-referencing indexes stay
//! consistent. It does not solve MDPs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod dense;
pub mod error;
pub mod health;
pub mod mdp;
mod parse;
mod render;
pub mod reward;
pub mod shared;
pub mod state;
pub mod transition;
pub mod transition_table;

// Re-export core types
pub use action::Action;
pub use config::{MdpDefinition, MdpOptions, TransitionDefinition, DEFAULT_STATE_CAPACITY};
pub use error::{ErrorKind, MdpError, Result};
pub use health::{DanglingTransition, HealthReport};
pub use mdp::Mdp;
pub use reward::{Reward, RewardsTable};
pub use shared::SharedMdp;
pub use state::State;
pub use transition::{uniform, Transition};
pub use transition_table::{TransitionTable, TransitionTableEntry};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, Mdp, MdpDefinition, MdpError, Reward, Result, State, Transition,
    };
}
