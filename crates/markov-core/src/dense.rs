//! Dense array views of an MDP for numerical consumers
//!
//! Arrays are indexed by state index and span `0..=highest live index`;
//! empty slots are zero rows and columns.

use ndarray::{Array1, Array2};

use crate::error::{MdpError, Result};
use crate::Mdp;

fn dimension(mdp: &Mdp) -> usize {
    mdp.states().last().map_or(0, |state| state.index() + 1)
}

/// Rewards as a vector indexed by state index
#[must_use]
pub fn reward_vector(mdp: &Mdp) -> Array1<f32> {
    let mut rewards = Array1::zeros(dimension(mdp));
    for (state, reward) in mdp.rewards().iter() {
        if let Some(slot) = rewards.get_mut(state.index()) {
            *slot = reward.value();
        }
    }
    rewards
}

/// Transition probabilities of one action as a matrix `[origin, destination]`.
///
/// Transitions to states that are no longer live are left out.
///
/// # Errors
///
/// Returns [`MdpError::NotFound`] if the action is not registered.
pub fn transition_matrix(mdp: &Mdp, action: &str) -> Result<Array2<f32>> {
    let action = mdp
        .action(action)
        .ok_or_else(|| MdpError::NotFound(format!("no action named {action}")))?;
    let n = dimension(mdp);
    let mut matrix = Array2::zeros((n, n));
    for (origin, entry) in mdp.transitions().iter() {
        let Some(transition) = entry.get(action) else {
            continue;
        };
        let destination = transition.next_state();
        let live = mdp
            .state_by_index(destination.index())
            .is_some_and(|state| state.name() == destination.name());
        if live {
            matrix[[origin.index(), destination.index()]] = transition.probability();
        }
    }
    Ok(matrix)
}

/// Terminal flags as a vector indexed by state index
#[must_use]
pub fn terminal_mask(mdp: &Mdp) -> Array1<bool> {
    let mut mask = Array1::from_elem(dimension(mdp), false);
    for state in mdp.states() {
        mask[state.index()] = state.is_terminal();
    }
    mask
}
