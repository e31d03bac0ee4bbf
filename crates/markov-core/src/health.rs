//! Integrity checks and the dangling-transition lint
//!
//! Removing a state leaves transitions of other states that lead to it in
//! place. [`Mdp::dangling_transitions`] finds them; [`Mdp::health`] also
//! re-checks the aggregate's structural invariants.

use serde::Serialize;
use tracing::warn;

use crate::mdp::validate_discount_rate;
use crate::{Action, Mdp, State};

/// A transition whose destination is not the live state at its index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingTransition {
    /// Origin state
    pub origin: State,
    /// Action the transition is taken by
    pub action: Action,
    /// Destination recorded in the transition
    pub destination: State,
}

/// Result of [`Mdp::health`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    /// Transitions leading to removed or replaced states
    pub dangling: Vec<DanglingTransition>,
    /// Broken structural invariants, one message each
    pub violations: Vec<String>,
}

impl HealthReport {
    /// Check if nothing was found
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.dangling.is_empty() && self.violations.is_empty()
    }
}

impl Mdp {
    /// List transitions whose destination index is empty or now holds a
    /// differently named state.
    #[must_use]
    pub fn dangling_transitions(&self) -> Vec<DanglingTransition> {
        let mut dangling = Vec::new();
        for (origin, entry) in self.transitions.iter() {
            for (action, transition) in entry.iter() {
                let destination = transition.next_state();
                let live = self
                    .state_by_index(destination.index())
                    .is_some_and(|live| live.name() == destination.name());
                if !live {
                    dangling.push(DanglingTransition {
                        origin: origin.clone(),
                        action: action.clone(),
                        destination: destination.clone(),
                    });
                }
            }
        }
        dangling
    }

    /// Check the structural invariants and look for dangling transitions
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let report = HealthReport {
            dangling: self.dangling_transitions(),
            violations: self.invariant_violations(),
        };
        if !report.violations.is_empty() {
            warn!(violations = ?report.violations, "MDP invariants broken");
        }
        report
    }

    fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        // Arena, name index and occupancy agree.
        for (index, slot) in self.states.iter().enumerate() {
            let Some(state) = slot else {
                if self.occupied.contains(&index) {
                    violations.push(format!("index {index} marked occupied but empty"));
                }
                continue;
            };
            if state.index() != index {
                violations.push(format!("{state} stored at index {index}"));
            }
            if self.names.get(state.name()) != Some(&index) {
                violations.push(format!("{state} missing from the name index"));
            }
            if !self.occupied.contains(&index) {
                violations.push(format!("{state} not marked occupied"));
            }
            if !self.rewards.contains(state) {
                violations.push(format!("{state} has no reward entry"));
            }
            if !self.transitions.contains(state) {
                violations.push(format!("{state} has no transition entry"));
            }
        }
        for (name, &index) in &self.names {
            if self.state_by_index(index).map(State::name) != Some(name.as_str()) {
                violations.push(format!("name {name} points at index {index}, held by another state"));
            }
        }
        if let Some(&highest) = self.occupied.last() {
            if highest >= self.states.len() {
                violations.push(format!(
                    "index {highest} beyond capacity {}",
                    self.states.len()
                ));
            }
        }
        if self.rewards.len() != self.len() {
            violations.push(format!(
                "{} reward entries for {} states",
                self.rewards.len(),
                self.len()
            ));
        }
        if self.transitions.len() != self.len() {
            violations.push(format!(
                "{} transition entries for {} states",
                self.transitions.len(),
                self.len()
            ));
        }

        // Every referenced action is registered.
        for (origin, entry) in self.transitions.iter() {
            for (action, _) in entry.iter() {
                if self.actions.get(action.name()) != Some(action) {
                    violations.push(format!("{origin} uses unregistered action {action}"));
                }
            }
        }

        if let Err(err) = validate_discount_rate(self.discount_rate) {
            violations.push(err.to_string());
        }

        match (&self.initial_state, self.state_by_index(0)) {
            (Some(initial), Some(first)) if initial.name() == first.name() => {}
            (None, None) => {}
            (initial, first) => violations.push(format!(
                "initial state {initial:?} differs from state at index 0 {first:?}"
            )),
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transition;

    fn chain() -> Mdp {
        let mut mdp = Mdp::new();
        let b = State::new("b", 1, false);
        let c = State::new("c", 2, true);
        mdp.set_initial_state("a", 0.0, [("next", Transition::new(1.0, b))])
            .unwrap();
        mdp.set_state("b", 1, false, 0.0, [("next", Transition::new(1.0, c))])
            .unwrap();
        mdp.set_state("c", 2, true, 1.0, Vec::<(String, Transition)>::new())
            .unwrap();
        mdp
    }

    #[test]
    fn test_fresh_mdp_is_healthy() {
        assert!(Mdp::new().health().is_healthy());
        assert!(chain().health().is_healthy());
    }

    #[test]
    fn test_removed_state_leaves_dangling_transition() {
        let mut mdp = chain();
        mdp.remove_state_by_name("c").unwrap();

        let report = mdp.health();
        assert!(report.violations.is_empty());
        assert_eq!(report.dangling.len(), 1);
        assert_eq!(report.dangling[0].origin.name(), "b");
        assert_eq!(report.dangling[0].action.name(), "next");
        assert_eq!(report.dangling[0].destination.name(), "c");
    }

    #[test]
    fn test_replaced_state_leaves_dangling_transition() {
        let mut mdp = chain();
        mdp.set_state("z", 2, false, 0.0, Vec::<(String, Transition)>::new())
            .unwrap();
        assert_eq!(mdp.dangling_transitions().len(), 1);
    }

    #[test]
    fn test_severing_clears_dangling() {
        let mut mdp = chain();
        mdp.remove_state_by_name("c").unwrap();
        mdp.remove_transition_by_action("b", "next").unwrap();
        assert!(mdp.health().is_healthy());
    }

    #[test]
    fn test_detects_broken_invariants() {
        let mut mdp = chain();
        mdp.discount_rate = 2.0;
        mdp.names.remove("b");
        let report = mdp.health();
        assert!(!report.is_healthy());
        assert!(report.violations.len() >= 2);
    }
}
