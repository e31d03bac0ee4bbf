//! Property tests over random edit sequences

use markov_core::{ErrorKind, Mdp, State, Transition};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Set { name: String, index: usize },
    Add { name: String },
    Remove { name: String },
    RemoveAt { index: usize },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    let name = "[a-f]";
    prop_oneof![
        (name, 0..24usize).prop_map(|(name, index)| Edit::Set { name, index }),
        name.prop_map(|name| Edit::Add { name }),
        name.prop_map(|name| Edit::Remove { name }),
        (0..24usize).prop_map(|index| Edit::RemoveAt { index }),
    ]
}

fn no_moves() -> Vec<(String, Transition)> {
    Vec::new()
}

fn apply(mdp: &mut Mdp, edit: &Edit) {
    // Rejected edits must leave the MDP consistent, so errors are ignored here.
    let _ = match edit {
        Edit::Set { name, index } => mdp.set_state(name, *index, false, 1.0, no_moves()),
        Edit::Add { name } => mdp.add_state(name, false, 1.0, no_moves()).map(drop),
        Edit::Remove { name } => mdp.remove_state_by_name(name).map(drop),
        Edit::RemoveAt { index } => mdp.remove_state_by_index(*index).map(drop),
    };
}

/// Random MDP with every state listed and transitions between them
fn arb_mdp() -> impl Strategy<Value = Mdp> {
    (
        proptest::collection::btree_set("[a-z]{1,6}", 1..8),
        proptest::collection::btree_set("[A-Z]{1,3}", 1..4),
        proptest::collection::vec((any::<usize>(), any::<usize>(), any::<usize>(), 0.0f32..=1.0), 0..20),
        proptest::collection::vec(-100.0f32..100.0, 8),
        1u32..=100,
    )
        .prop_map(|(names, actions, edges, rewards, gamma)| {
            let names: Vec<String> = names.into_iter().collect();
            let actions: Vec<String> = actions.into_iter().collect();
            let mut mdp = Mdp::new();
            mdp.set_discount_rate(gamma as f32 / 100.0).unwrap();
            for action in &actions {
                mdp.add_action(action).unwrap();
            }
            for (name, reward) in names.iter().zip(rewards) {
                mdp.add_state(name, false, reward, no_moves()).unwrap();
            }
            for (from, to, action, probability) in edges {
                mdp.set_transition(
                    &names[from % names.len()],
                    &names[to % names.len()],
                    &actions[action % actions.len()],
                    probability,
                )
                .unwrap();
            }
            mdp
        })
}

proptest! {
    #[test]
    fn indexes_agree_after_any_edits(edits in proptest::collection::vec(arb_edit(), 0..40)) {
        let mut mdp = Mdp::new();
        for edit in &edits {
            apply(&mut mdp, edit);
        }

        let report = mdp.health();
        prop_assert!(report.is_healthy(), "{:?}", report);
        prop_assert_eq!(mdp.states().count(), mdp.len());
        for state in mdp.states() {
            prop_assert_eq!(mdp.state_by_name(state.name()), Some(state));
            prop_assert_eq!(mdp.state_by_index(state.index()).map(State::name), Some(state.name()));
        }
        prop_assert_eq!(
            mdp.initial_state().map(State::name),
            mdp.state_by_index(0).map(State::name)
        );
    }

    #[test]
    fn render_is_stable_and_parses_back(mdp in arb_mdp()) {
        let text = mdp.render();
        prop_assert_eq!(&text, &mdp.render());

        let parsed: Mdp = text.parse().unwrap();
        prop_assert_eq!(parsed.render(), text);
        prop_assert_eq!(parsed.len(), mdp.len());
    }

    #[test]
    fn removing_an_action_clears_it_everywhere(mdp in arb_mdp()) {
        let mut mdp = mdp;
        let victim = mdp.actions().next().unwrap().name().to_owned();
        mdp.remove_action(&victim).unwrap();

        prop_assert!(!mdp.contains_action(&victim));
        for state in mdp.states() {
            prop_assert!(mdp.t(state.name(), &victim).is_none());
        }
        prop_assert!(mdp.health().is_healthy());
    }
}

#[test]
fn growth_keeps_earlier_states() {
    let mut mdp = Mdp::new();
    for name in ["a", "b", "c"] {
        mdp.add_state(name, false, 0.0, no_moves()).unwrap();
    }
    mdp.set_state("far", 500, true, 3.0, no_moves()).unwrap();

    assert!(mdp.capacity() > 500);
    assert_eq!(mdp.capacity(), 1000);
    for (index, name) in ["a", "b", "c"].into_iter().enumerate() {
        assert_eq!(mdp.state_by_index(index).map(State::name), Some(name));
    }
    assert_eq!(mdp.state_by_name("far").map(State::index), Some(500));
    assert!(mdp.health().is_healthy());
}

#[test]
fn removal_is_not_repeatable() {
    let mut mdp = Mdp::new();
    mdp.add_state("only", false, 0.0, no_moves()).unwrap();
    mdp.remove_state_by_name("only").unwrap();
    assert_eq!(
        mdp.remove_state_by_name("only").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        mdp.remove_state_by_index(0).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn discount_rate_range() {
    let mut mdp = Mdp::new();
    assert!(mdp.set_discount_rate(0.0).is_err());
    assert!(mdp.set_discount_rate(1.01).is_err());
    assert!(mdp.set_discount_rate(1.0).is_ok());
    assert!(mdp.set_discount_rate(f32::MIN_POSITIVE).is_ok());
}

#[test]
fn discount_rate_below_render_precision_parses_back() {
    for rate in [f32::MIN_POSITIVE, 0.000_01, 0.000_049] {
        let mut mdp = Mdp::new();
        mdp.set_discount_rate(rate).unwrap();
        let text = mdp.render();

        let parsed: Mdp = text.parse().unwrap();
        assert_eq!(parsed.render(), text);
    }
}

#[test]
fn huge_index_in_text_is_an_error() {
    let big = usize::MAX / 2 + 1;
    let text = Mdp::new()
        .render()
        .replace("\tS = ", &format!("\tS = S_{big}: x"));
    assert_eq!(
        text.parse::<Mdp>().unwrap_err().kind(),
        ErrorKind::InvalidParameter
    );
}
