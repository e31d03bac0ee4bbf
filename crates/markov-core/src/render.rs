//! Canonical text form of an MDP
//!
//! ```text
//! M := (
//! 	S = S_0: TL, S_1: TC
//! 	A = D, R
//! 	R = {
//! 		S_0: TL: 0,
//! 		S_1: TC: -2
//! 	}
//! 	T = {
//! 		S_0: TL: {
//! 			R: (1.0000, TC)
//! 		},
//! 		S_1: TC: {}
//! 	}
//! 	ɣ = 0.9000
//! )
//! ```
//!
//! States are listed by index, actions by name. Every nested block is one tab
//! deeper than its parent; entries are comma separated and empty blocks
//! render as `{}`.

use std::fmt;

use crate::Mdp;

/// Symbol used for the discount rate line
pub(crate) const GAMMA: &str = "ɣ";

/// Render `items` as a brace block: items one tab deeper than `indent`,
/// closing brace at `indent`.
pub(crate) fn block<I>(indent: &str, items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        return "{}".to_owned();
    }
    let separator = format!(",\n{indent}\t");
    format!("{{\n{indent}\t{}\n{indent}}}", items.join(&separator))
}

impl Mdp {
    /// Produce the canonical serialization. Repeated calls on an unmodified
    /// MDP return identical text.
    #[must_use]
    pub fn render(&self) -> String {
        let states: Vec<String> = self.states().map(ToString::to_string).collect();
        let actions: Vec<&str> = self.actions().map(crate::Action::name).collect();
        format!(
            "M := (\n\tS = {}\n\tA = {}\n\tR = {}\n\tT = {}\n\t{GAMMA} = {:.4}\n)",
            states.join(", "),
            actions.join(", "),
            self.rewards.render("\t"),
            self.transitions.render("\t"),
            self.discount_rate,
        )
    }
}

impl fmt::Display for Mdp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
