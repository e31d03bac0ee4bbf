//! Parser for the canonical text form produced by [`Mdp::render`]
//!
//! The canonical form does not carry terminal flags, so parsed states are
//! never terminal. Transitions must lead to listed states; names containing
//! `", S_"`, `", "` (actions) or line breaks cannot be read back.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{MdpError, Result};
use crate::render::GAMMA;
use crate::{Mdp, MdpOptions, Transition};

struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// One-based number of the line last returned
    fn line_no(&self) -> usize {
        self.pos
    }

    fn next(&mut self) -> Result<&'a str> {
        let line = self
            .lines
            .get(self.pos)
            .copied()
            .ok_or_else(|| MdpError::parse(self.pos + 1, "unexpected end of input"))?;
        self.pos += 1;
        Ok(line)
    }

    fn error(&self, message: impl Into<String>) -> MdpError {
        MdpError::parse(self.line_no(), message)
    }

    fn expect(&mut self, expected: &str) -> Result<()> {
        let line = self.next()?;
        if line == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}, found {line:?}")))
        }
    }

    /// Next line with `prefix` removed
    fn field(&mut self, prefix: &str) -> Result<&'a str> {
        let line = self.next()?;
        line.strip_prefix(prefix)
            .ok_or_else(|| self.error(format!("expected a line starting with {prefix:?}")))
    }
}

/// Split `S_<index>: <name>`
fn parse_state(token: &str) -> Option<(usize, &str)> {
    let (index, name) = token.strip_prefix("S_")?.split_once(": ")?;
    Some((index.parse().ok()?, name))
}

/// Text after `S =` / `A =`, minus the single separating space
fn list_body(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn strip_comma(line: &str) -> &str {
    line.strip_suffix(',').unwrap_or(line)
}

/// Read a block opening line; `true` if entries follow, `false` for `{}`
fn open_block(cursor: &mut Cursor<'_>, prefix: &str) -> Result<bool> {
    match cursor.field(prefix)? {
        "{" => Ok(true),
        "{}" => Ok(false),
        other => Err(cursor.error(format!("expected a block, found {other:?}"))),
    }
}

struct Parsed<'a> {
    states: Vec<(usize, &'a str)>,
    actions: Vec<&'a str>,
    rewards: BTreeMap<usize, f32>,
    transitions: Vec<(&'a str, &'a str, f32, &'a str)>,
    discount_rate: f32,
}

fn parse_text(text: &str) -> Result<Parsed<'_>> {
    let mut cursor = Cursor::new(text);
    cursor.expect("M := (")?;

    let states_line = list_body(cursor.field("\tS =")?);
    let mut states = Vec::new();
    if !states_line.is_empty() {
        let body = states_line
            .strip_prefix("S_")
            .ok_or_else(|| cursor.error("state list must start with S_"))?;
        for token in body.split(", S_") {
            let (index, name) = token
                .split_once(": ")
                .and_then(|(index, name)| Some((index.parse::<usize>().ok()?, name)))
                .ok_or_else(|| cursor.error(format!("malformed state S_{token}")))?;
            states.push((index, name));
        }
    }

    let actions_line = list_body(cursor.field("\tA =")?);
    let actions: Vec<&str> = actions_line
        .split(", ")
        .filter(|name| !name.is_empty())
        .collect();

    let mut rewards = BTreeMap::new();
    if open_block(&mut cursor, "\tR = ")? {
        loop {
            let line = cursor.next()?;
            if line == "\t}" {
                break;
            }
            let entry = strip_comma(
                line.strip_prefix("\t\t")
                    .ok_or_else(|| cursor.error("reward entries are indented two tabs"))?,
            );
            let (state, reward) = entry
                .rsplit_once(": ")
                .ok_or_else(|| cursor.error(format!("malformed reward {entry:?}")))?;
            let (index, _) = parse_state(state)
                .ok_or_else(|| cursor.error(format!("malformed state {state:?}")))?;
            let reward: f32 = reward
                .parse()
                .map_err(|_| cursor.error(format!("malformed reward value {reward:?}")))?;
            rewards.insert(index, reward);
        }
    }

    let mut transitions = Vec::new();
    if open_block(&mut cursor, "\tT = ")? {
        loop {
            let line = cursor.next()?;
            if line == "\t}" {
                break;
            }
            let header = strip_comma(
                line.strip_prefix("\t\t")
                    .ok_or_else(|| cursor.error("transition entries are indented two tabs"))?,
            );
            if let Some(state) = header.strip_suffix(": {}") {
                parse_state(state)
                    .ok_or_else(|| cursor.error(format!("malformed state {state:?}")))?;
                continue;
            }
            let state = header
                .strip_suffix(": {")
                .ok_or_else(|| cursor.error(format!("malformed transition header {header:?}")))?;
            let (_, origin) = parse_state(state)
                .ok_or_else(|| cursor.error(format!("malformed state {state:?}")))?;
            loop {
                let line = cursor.next()?;
                if strip_comma(line) == "\t\t}" {
                    break;
                }
                let entry = strip_comma(
                    line.strip_prefix("\t\t\t")
                        .ok_or_else(|| cursor.error("actions are indented three tabs"))?,
                );
                let (action, rest) = entry
                    .split_once(": (")
                    .and_then(|(action, rest)| Some((action, rest.strip_suffix(')')?)))
                    .ok_or_else(|| cursor.error(format!("malformed transition {entry:?}")))?;
                let (probability, destination) = rest
                    .split_once(", ")
                    .ok_or_else(|| cursor.error(format!("malformed transition {entry:?}")))?;
                let probability: f32 = probability.parse().map_err(|_| {
                    cursor.error(format!("malformed probability {probability:?}"))
                })?;
                transitions.push((origin, action, probability, destination));
            }
        }
    }

    let gamma = cursor.field(&format!("\t{GAMMA} = "))?;
    let discount_rate: f32 = gamma
        .parse()
        .map_err(|_| cursor.error(format!("malformed discount rate {gamma:?}")))?;
    // Rates below 0.00005 render as zero; read them back as the smallest positive rate.
    let discount_rate = if discount_rate == 0.0 {
        f32::MIN_POSITIVE
    } else {
        discount_rate
    };
    cursor.expect(")")?;

    Ok(Parsed {
        states,
        actions,
        rewards,
        transitions,
        discount_rate,
    })
}

impl FromStr for Mdp {
    type Err = MdpError;

    /// Rebuild an MDP from its canonical text. Rendering the result yields
    /// the same text.
    fn from_str(text: &str) -> Result<Self> {
        let parsed = parse_text(text)?;
        let mut mdp = Mdp::with_options(MdpOptions {
            discount_rate: parsed.discount_rate,
            ..MdpOptions::default()
        })?;

        for action in &parsed.actions {
            mdp.add_action(action)?;
        }
        for &(index, name) in &parsed.states {
            let reward = parsed.rewards.get(&index).copied().unwrap_or(0.0);
            mdp.set_state(name, index, false, reward, Vec::<(String, Transition)>::new())?;
        }
        for &(origin, action, probability, destination) in &parsed.transitions {
            mdp.set_transition(origin, destination, action, probability)?;
        }
        Ok(mdp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Reward, State};
    use pretty_assertions::assert_eq;

    fn sample() -> Mdp {
        let mut mdp = Mdp::new();
        let b = State::new("B", 1, false);
        let c = State::new("C", 5, true);
        mdp.set_initial_state(
            "A",
            0.5,
            [
                ("left", Transition::new(1.0 / 3.0, b.clone())),
                ("right", Transition::new(2.0 / 3.0, c)),
            ],
        )
        .unwrap();
        mdp.set_state("B", 1, false, -2.0, [("left", Transition::new(1.0, b))])
            .unwrap();
        mdp.set_state("C", 5, true, 10.0, Vec::<(String, Transition)>::new())
            .unwrap();
        mdp.add_action("idle").unwrap();
        mdp.set_discount_rate(0.95).unwrap();
        mdp
    }

    #[test]
    fn test_parse_roundtrip() {
        let mdp = sample();
        let text = mdp.render();
        let parsed: Mdp = text.parse().unwrap();

        assert_eq!(parsed.render(), text);
        assert_eq!(parsed.state_by_name("C").map(State::index), Some(5));
        assert_eq!(parsed.r("B"), Reward(-2.0));
        assert!(parsed.contains_action("idle"));
    }

    #[test]
    fn test_parse_empty() {
        let text = Mdp::new().render();
        let parsed: Mdp = text.parse().unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.render(), text);
    }

    #[test]
    fn test_parse_reports_line() {
        let text = sample().render().replace("\tA = ", "\tActions = ");
        let err = text.parse::<Mdp>().unwrap_err();
        match err {
            MdpError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_truncated() {
        let text = sample().render();
        let truncated = &text[..text.len() / 2];
        assert_eq!(
            truncated.parse::<Mdp>().unwrap_err().kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_parse_rejects_huge_index() {
        let big = usize::MAX / 2 + 1;
        let text = format!(
            "M := (\n\tS = S_{big}: x\n\tA = \n\tR = {{\n\t\tS_{big}: x: 0\n\t}}\n\tT = {{\n\t\tS_{big}: x: {{}}\n\t}}\n\tɣ = 1.0000\n)"
        );
        let err = text.parse::<Mdp>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_tiny_discount_rate_roundtrip() {
        let mut mdp = sample();
        mdp.set_discount_rate(0.000_01).unwrap();
        let text = mdp.render();
        assert!(text.contains("\tɣ = 0.0000\n"));

        let parsed: Mdp = text.parse().unwrap();
        assert!(parsed.discount_rate() > 0.0);
        assert_eq!(parsed.render(), text);
    }

    #[test]
    fn test_names_with_leading_spaces_roundtrip() {
        let mut mdp = Mdp::new();
        mdp.add_action(" pad").unwrap();
        mdp.add_action("go").unwrap();
        mdp.set_initial_state(" first", 1.0, [(" pad", Transition::new(1.0, State::new(" first", 0, false)))])
            .unwrap();
        let text = mdp.render();

        let parsed: Mdp = text.parse().unwrap();
        assert!(parsed.contains_action(" pad"));
        assert!(parsed.contains_state(" first"));
        assert_eq!(parsed.render(), text);
    }

    #[test]
    fn test_parse_rejects_dangling_destination() {
        let mut mdp = sample();
        mdp.remove_state_by_name("C").unwrap();
        let err = mdp.render().parse::<Mdp>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
