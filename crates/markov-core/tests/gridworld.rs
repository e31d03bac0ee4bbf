//! 3x3 grid world built cell by cell through the object API

use approx::assert_relative_eq;
use markov_core::{uniform, Action, Mdp, Reward, State, Transition};

struct Moves {
    up: Action,
    right: Action,
    down: Action,
    left: Action,
}

impl Moves {
    fn new() -> Self {
        Self {
            up: Action::new("U"),
            right: Action::new("R"),
            down: Action::new("D"),
            left: Action::new("L"),
        }
    }

    /// Uniform move over the directions that stay on the board
    fn uniform(
        &self,
        up: Option<&State>,
        right: Option<&State>,
        down: Option<&State>,
        left: Option<&State>,
    ) -> Vec<(Action, Transition)> {
        let dirs = [
            (&self.up, up),
            (&self.right, right),
            (&self.down, down),
            (&self.left, left),
        ];
        let support = dirs.iter().filter(|(_, next)| next.is_some()).count();
        let probability = uniform(support);
        dirs.into_iter()
            .filter_map(|(action, next)| {
                next.map(|next| (action.clone(), Transition::new(probability, next.clone())))
            })
            .collect()
    }
}

fn grid() -> Mdp {
    let m = Moves::new();
    let tl = State::new("TL", 0, false);
    let tc = State::new("TC", 1, false);
    let tr = State::new("TR", 2, false);
    let ml = State::new("ML", 3, false);
    let mc = State::new("MC", 4, false);
    let mr = State::new("MR", 5, false);
    let bl = State::new("BL", 6, false);
    let bm = State::new("BM", 7, false);
    let br = State::new("BR", 8, true);

    let mut mdp = Mdp::new();
    let cells = [
        (&tl, 0.0, m.uniform(None, Some(&tc), Some(&ml), None)),
        (&tc, -2.0, m.uniform(None, Some(&tr), Some(&mc), Some(&tl))),
        (&tr, 0.0, m.uniform(None, None, Some(&mr), Some(&tc))),
        (&ml, 0.0, m.uniform(Some(&tl), Some(&mc), Some(&bl), None)),
        (&mc, -2.0, m.uniform(Some(&tc), Some(&mr), Some(&bm), Some(&ml))),
        (&mr, 0.0, m.uniform(Some(&tr), None, Some(&br), Some(&mc))),
        (&bl, 0.0, m.uniform(Some(&ml), Some(&bm), None, None)),
        (&bm, 0.0, m.uniform(Some(&mc), Some(&br), None, Some(&bl))),
        (&br, 10.0, m.uniform(Some(&mr), None, None, Some(&bm))),
    ];
    for (state, reward, moves) in cells {
        let index = mdp.add_state_object(state, reward, moves).unwrap();
        assert_eq!(index, state.index());
    }
    mdp
}

#[test]
fn test_rewards() {
    let mdp = grid();
    assert_eq!(mdp.r("BR"), Reward(10.0));
    assert_eq!(mdp.r("TC"), Reward(-2.0));
    assert_eq!(mdp.r_by_index(4), Reward(-2.0));
    assert_eq!(mdp.r("TL"), Reward::ZERO);
}

#[test]
fn test_corner_has_two_directions() {
    let mdp = grid();
    let t = mdp.t("TL", "R").unwrap();
    assert_relative_eq!(t.probability(), 0.5);
    assert_eq!(t.next_state().name(), "TC");
    assert!(mdp.t("TL", "U").is_none());

    let centre = mdp.t_by_index(4, "L").unwrap();
    assert_relative_eq!(centre.probability(), 0.25);
}

#[test]
fn test_terminal_and_initial() {
    let mdp = grid();
    assert!(mdp.state_by_name("BR").unwrap().is_terminal());
    assert_eq!(mdp.initial_state().map(State::name), Some("TL"));
    assert_eq!(mdp.actions().count(), 4);
}

#[test]
fn test_render_shape() {
    let text = grid().render();

    let state_line = text
        .lines()
        .find_map(|line| line.strip_prefix("\tS = "))
        .unwrap();
    assert_eq!(state_line.split(", ").count(), 9);

    let action_line = text
        .lines()
        .find_map(|line| line.strip_prefix("\tA = "))
        .unwrap();
    let tokens: Vec<&str> = action_line.split(", ").collect();
    assert_eq!(tokens, ["D", "L", "R", "U"]);

    assert!(text.contains("\t\tS_8: BR: 10\n"));
    assert!(text.contains("\t\tS_0: TL: {\n\t\t\tD: (0.5000, ML),\n\t\t\tR: (0.5000, TC)\n\t\t},\n"));
}

#[test]
fn test_render_roundtrip() {
    let mdp = grid();
    let text = mdp.render();
    assert_eq!(text, mdp.render());

    let parsed: Mdp = text.parse().unwrap();
    assert_eq!(parsed.render(), text);
}

#[test]
fn test_removing_a_hole_leaves_inbound_edges() {
    let mut mdp = grid();
    mdp.remove_state_by_name("MC").unwrap();

    let dangling = mdp.dangling_transitions();
    // TC, ML, MR and BM all had a move into the centre.
    assert_eq!(dangling.len(), 4);
    assert!(dangling.iter().all(|d| d.destination.name() == "MC"));

    mdp.remove_action("L").unwrap();
    for state in mdp.states() {
        assert!(mdp.t(state.name(), "L").is_none());
    }
    assert_eq!(mdp.dangling_transitions().len(), 3);
}
