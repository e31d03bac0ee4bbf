//! The MDP aggregate: states, actions, rewards, transitions and discount rate
//!
//! All mutation goes through [`Mdp`], which keeps its state arena, its name
//! index, the [`RewardsTable`] and the [`TransitionTable`] in agreement:
//!
//! - a slot of the arena is occupied iff the name index maps that state's
//!   name to the slot;
//! - every live state has exactly one reward entry and one transition entry;
//! - every action referenced by a transition is registered;
//! - the discount rate lies in `(0, 1]`;
//! - the initial state, when set, is the state at index 0.
//!
//! Removing an action cascades into every state's transitions. Removing a
//! state only drops its own outgoing transitions: transitions from other
//! states that lead to it are left in place (see [`Mdp::health`]).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::config::{MdpDefinition, MdpOptions, DEFAULT_STATE_CAPACITY};
use crate::error::{MdpError, Result};
use crate::{Action, Reward, RewardsTable, State, Transition, TransitionTable, TransitionTableEntry};

/// A finite Markov Decision Process, editable in place
#[derive(Debug, Clone)]
pub struct Mdp {
    pub(crate) initial_state: Option<State>,
    /// Arena addressed by state index; `len()` is the capacity.
    pub(crate) states: Vec<Option<State>>,
    pub(crate) names: HashMap<String, usize>,
    pub(crate) occupied: BTreeSet<usize>,
    pub(crate) actions: BTreeMap<String, Action>,
    pub(crate) rewards: RewardsTable,
    pub(crate) transitions: TransitionTable,
    pub(crate) discount_rate: f32,
}

impl Default for Mdp {
    fn default() -> Self {
        let options = MdpOptions::default();
        Self {
            initial_state: None,
            states: vec![None; options.state_capacity],
            names: HashMap::new(),
            occupied: BTreeSet::new(),
            actions: BTreeMap::new(),
            rewards: RewardsTable::new(),
            transitions: TransitionTable::new(),
            discount_rate: options.discount_rate,
        }
    }
}

pub(crate) fn validate_discount_rate(discount_rate: f32) -> Result<()> {
    if discount_rate > 0.0 && discount_rate <= 1.0 {
        Ok(())
    } else {
        Err(MdpError::InvalidParameter(format!(
            "discount rate must be in (0, 1], got {discount_rate}"
        )))
    }
}

impl Mdp {
    /// Create an empty MDP: no initial state, no states, no actions, a
    /// discount rate of 1 and the default state capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty MDP with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::InvalidParameter`] if the discount rate is outside `(0, 1]`.
    pub fn with_options(options: MdpOptions) -> Result<Self> {
        validate_discount_rate(options.discount_rate)?;
        Ok(Self {
            states: vec![None; options.state_capacity],
            discount_rate: options.discount_rate,
            ..Self::default()
        })
    }

    /// Build an MDP from name-keyed bulk input.
    ///
    /// The initial state (if named) takes index 0; the remaining states take
    /// indices 1, 2, ... in list order, skipping the initial state's name.
    /// Transitions from a non-terminal state must only use registered
    /// actions. Transitions of a terminal state that use unregistered actions
    /// are dropped.
    ///
    /// # Errors
    ///
    /// - [`MdpError::InvalidParameter`] for a bad discount rate or empty name
    /// - [`MdpError::PreconditionViolation`] if a non-terminal state uses an unregistered action
    /// - [`MdpError::NotFound`] if a transition leads to an unlisted state
    /// - [`MdpError::AlreadyExists`] if a state name is listed twice
    pub fn from_definition(definition: &MdpDefinition) -> Result<Self> {
        let mut mdp = Self::with_options(MdpOptions {
            state_capacity: definition
                .state_capacity
                .unwrap_or(DEFAULT_STATE_CAPACITY),
            discount_rate: definition.discount_rate,
        })?;

        for name in &definition.actions {
            mdp.register_action(Action::new(name.as_str()))?;
        }

        let terminals: BTreeSet<&str> = definition.terminals.iter().map(String::as_str).collect();

        // Assign every index up front so transitions can refer to states listed later.
        let mut layout: Vec<State> = Vec::with_capacity(definition.states.len() + 1);
        if !definition.initial_state.is_empty() {
            layout.push(State::new(definition.initial_state.as_str(), 0, false));
        }
        let mut next_index = 1;
        for name in &definition.states {
            if *name == definition.initial_state {
                continue;
            }
            layout.push(State::new(
                name.as_str(),
                next_index,
                terminals.contains(name.as_str()),
            ));
            next_index += 1;
        }
        let by_name: HashMap<&str, &State> = layout.iter().map(|s| (s.name(), s)).collect();

        for name in definition.rewards.keys() {
            if !by_name.contains_key(name.as_str()) {
                warn!(state = %name, "reward given for unlisted state, ignoring");
            }
        }
        for name in definition.transitions.keys() {
            if !by_name.contains_key(name.as_str()) {
                warn!(state = %name, "transitions given for unlisted state, ignoring");
            }
        }

        for state in &layout {
            let mut entry = Vec::new();
            if let Some(outgoing) = definition.transitions.get(state.name()) {
                for (action_name, transition) in outgoing {
                    let Some(action) = mdp.actions.get(action_name).cloned() else {
                        if state.is_terminal() {
                            warn!(
                                state = %state,
                                action = %action_name,
                                "terminal state uses unregistered action, dropping transition"
                            );
                            continue;
                        }
                        return Err(MdpError::PreconditionViolation(format!(
                            "action {action_name} used by state {} is not registered",
                            state.name()
                        )));
                    };
                    let next_state = by_name.get(transition.next_state.as_str()).ok_or_else(|| {
                        MdpError::NotFound(format!(
                            "state {} reached from {} via {action_name}",
                            transition.next_state,
                            state.name()
                        ))
                    })?;
                    entry.push((
                        action,
                        Transition::new(transition.probability, (*next_state).clone()),
                    ));
                }
            }
            let reward = definition
                .rewards
                .get(state.name())
                .copied()
                .unwrap_or(0.0);
            mdp.set_state_object(state.clone(), reward, entry)?;
        }

        debug!(
            states = mdp.len(),
            actions = mdp.actions.len(),
            discount_rate = mdp.discount_rate,
            "constructed MDP"
        );
        Ok(mdp)
    }

    // ----- lookups -------------------------------------------------------

    /// Get the live state with the given name
    #[must_use]
    pub fn state_by_name(&self, name: &str) -> Option<&State> {
        let state = self
            .names
            .get(name)
            .and_then(|&index| self.state_by_index(index));
        trace!(name, found = state.is_some(), "state lookup by name");
        state
    }

    /// Get the live state at the given index
    #[must_use]
    pub fn state_by_index(&self, index: usize) -> Option<&State> {
        self.states.get(index).and_then(Option::as_ref)
    }

    /// Get the registered action with the given name
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Check if a live state has the given name
    #[must_use]
    pub fn contains_state(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Check if an action with the given name is registered
    #[must_use]
    pub fn contains_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Get the initial state (the state at index 0), if any
    #[must_use]
    pub fn initial_state(&self) -> Option<&State> {
        self.initial_state.as_ref()
    }

    /// Iterate live states in index order
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.occupied
            .iter()
            .filter_map(|&index| self.state_by_index(index))
    }

    /// Iterate registered actions in name order
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    /// Number of live states
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// Check if there are no live states
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Number of index slots currently allocated
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    /// Get the discount rate (gamma)
    #[must_use]
    pub fn discount_rate(&self) -> f32 {
        self.discount_rate
    }

    /// Read-only view of the rewards table
    #[must_use]
    pub fn rewards(&self) -> &RewardsTable {
        &self.rewards
    }

    /// Read-only view of the transition table
    #[must_use]
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    // ----- queries -------------------------------------------------------

    /// Reward for being in the named state; zero for an unknown state
    #[must_use]
    pub fn r(&self, state: &str) -> Reward {
        self.state_by_name(state)
            .map_or(Reward::ZERO, |s| self.rewards.get(s))
    }

    /// Reward for being in the state at `index`; zero for an empty slot
    #[must_use]
    pub fn r_by_index(&self, index: usize) -> Reward {
        self.state_by_index(index)
            .map_or(Reward::ZERO, |s| self.rewards.get(s))
    }

    /// Transition taken from the named state via the named action, if any
    #[must_use]
    pub fn t(&self, state: &str, action: &str) -> Option<&Transition> {
        self.lookup_transition(self.state_by_name(state)?, action)
    }

    /// Transition taken from the state at `index` via the named action, if any
    #[must_use]
    pub fn t_by_index(&self, index: usize, action: &str) -> Option<&Transition> {
        self.lookup_transition(self.state_by_index(index)?, action)
    }

    fn lookup_transition(&self, state: &State, action: &str) -> Option<&Transition> {
        let action = self.actions.get(action)?;
        self.transitions.get(state)?.get(action)
    }

    // ----- states --------------------------------------------------------

    /// Set the state `name` at `index`, replacing whatever occupied that slot.
    ///
    /// Actions named in `transitions` that are not registered yet are
    /// registered on the fly. Destinations are not required to be live.
    ///
    /// # Errors
    ///
    /// - [`MdpError::InvalidParameter`] if `name` is empty
    /// - [`MdpError::AlreadyExists`] if another index holds a state called `name`
    pub fn set_state<I, K>(
        &mut self,
        name: &str,
        index: usize,
        terminal: bool,
        reward: f32,
        transitions: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, Transition)>,
        K: Into<String>,
    {
        self.set_state_object(
            State::new(name, index, terminal),
            reward,
            transitions
                .into_iter()
                .map(|(action, transition)| (Action::new(action), transition)),
        )
    }

    /// Register a pre-built state at its own index; see [`Mdp::set_state`].
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::set_state`].
    pub fn set_state_object<I>(
        &mut self,
        state: State,
        reward: f32,
        transitions: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (Action, Transition)>,
    {
        if state.name().is_empty() {
            return Err(MdpError::InvalidParameter(format!(
                "state at index {} needs a name",
                state.index()
            )));
        }
        if let Some(&other) = self.names.get(state.name()) {
            if other != state.index() {
                return Err(MdpError::AlreadyExists(format!(
                    "state {} is already registered at index {other}",
                    state.name()
                )));
            }
        }

        // Validate actions before touching anything so a failure leaves the MDP unchanged.
        let transitions: Vec<(Action, Transition)> = transitions.into_iter().collect();
        if transitions.iter().any(|(action, _)| action.name().is_empty()) {
            return Err(MdpError::InvalidParameter(format!(
                "state {} uses an action without a name",
                state.name()
            )));
        }

        let index = state.index();
        self.ensure_capacity(index)?;
        if let Some(old) = self.evict(index) {
            debug!(old = %old, new = %state, "replacing state");
        }

        let mut entry = TransitionTableEntry::new();
        for (action, transition) in transitions {
            let action = self
                .actions
                .entry(action.name().to_owned())
                .or_insert_with(|| {
                    debug!(action = %action, "registering action implicitly");
                    action
                })
                .clone();
            entry.set(action, transition.probability(), transition.next_state().clone());
        }

        self.states[index] = Some(state.clone());
        self.names.insert(state.name().to_owned(), index);
        self.occupied.insert(index);
        self.rewards.set(&state, Reward(reward));
        self.transitions.set(state.clone(), entry);
        if index == 0 {
            self.initial_state = Some(state.clone());
        }

        debug!(state = %state, terminal = state.is_terminal(), "set state");
        Ok(())
    }

    /// Set the initial state: [`Mdp::set_state`] pinned to index 0.
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::set_state`].
    pub fn set_initial_state<I, K>(
        &mut self,
        name: &str,
        reward: f32,
        transitions: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, Transition)>,
        K: Into<String>,
    {
        self.set_state(name, 0, false, reward, transitions)
    }

    /// Set the initial state from a pre-built state, moved to index 0.
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::set_state`].
    pub fn set_initial_state_object<I>(
        &mut self,
        state: &State,
        reward: f32,
        transitions: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (Action, Transition)>,
    {
        self.set_state_object(
            State::new(state.name(), 0, state.is_terminal()),
            reward,
            transitions,
        )
    }

    /// Add a state at the first free index without overwriting anything.
    ///
    /// Returns the index the state was given.
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::set_state`].
    pub fn add_state<I, K>(
        &mut self,
        name: &str,
        terminal: bool,
        reward: f32,
        transitions: I,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = (K, Transition)>,
        K: Into<String>,
    {
        let index = self.first_free_index();
        self.set_state(name, index, terminal, reward, transitions)?;
        Ok(index)
    }

    /// Add a pre-built state at the first free index, keeping its name and
    /// terminal flag. Returns the index the state was given, which may differ
    /// from `state.index()`.
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::set_state`].
    pub fn add_state_object<I>(
        &mut self,
        state: &State,
        reward: f32,
        transitions: I,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = (Action, Transition)>,
    {
        let index = self.first_free_index();
        self.set_state_object(
            State::new(state.name(), index, state.is_terminal()),
            reward,
            transitions,
        )?;
        Ok(index)
    }

    /// Remove the state at `index` with its reward and outgoing transitions.
    ///
    /// Transitions of other states that lead to the removed state are kept.
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::NotFound`] if no state occupies `index`.
    pub fn remove_state_by_index(&mut self, index: usize) -> Result<State> {
        let removed = self
            .evict(index)
            .ok_or_else(|| MdpError::NotFound(format!("no state at index {index}")))?;
        debug!(state = %removed, "removed state");
        Ok(removed)
    }

    /// Remove the named state; see [`Mdp::remove_state_by_index`].
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::NotFound`] if no live state has that name.
    pub fn remove_state_by_name(&mut self, name: &str) -> Result<State> {
        let index = *self
            .names
            .get(name)
            .ok_or_else(|| MdpError::NotFound(format!("no state named {name}")))?;
        self.remove_state_by_index(index)
    }

    /// Remove a state given its object; see [`Mdp::remove_state_by_index`].
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::NotFound`] unless the live state at `state.index()`
    /// has the same name.
    pub fn remove_state_by_object(&mut self, state: &State) -> Result<State> {
        match self.state_by_index(state.index()) {
            Some(live) if live.name() == state.name() => self.remove_state_by_index(state.index()),
            _ => Err(MdpError::NotFound(format!("state {state} is not registered"))),
        }
    }

    // ----- actions -------------------------------------------------------

    /// Register a new action.
    ///
    /// # Errors
    ///
    /// - [`MdpError::InvalidParameter`] if `name` is empty
    /// - [`MdpError::AlreadyExists`] if the name is taken
    pub fn add_action(&mut self, name: &str) -> Result<()> {
        self.add_action_object(Action::new(name))
    }

    /// Register a pre-built action; see [`Mdp::add_action`].
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::add_action`].
    pub fn add_action_object(&mut self, action: Action) -> Result<()> {
        if self.actions.contains_key(action.name()) {
            return Err(MdpError::AlreadyExists(format!(
                "action {action} is already registered"
            )));
        }
        self.register_action(action)
    }

    fn register_action(&mut self, action: Action) -> Result<()> {
        if action.name().is_empty() {
            return Err(MdpError::InvalidParameter("action needs a name".to_owned()));
        }
        debug!(action = %action, "registered action");
        self.actions.insert(action.name().to_owned(), action);
        Ok(())
    }

    /// Unregister an action and remove it from every state's transitions.
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::NotFound`] if the action is not registered.
    pub fn remove_action(&mut self, name: &str) -> Result<Action> {
        let action = self
            .actions
            .remove(name)
            .ok_or_else(|| MdpError::NotFound(format!("no action named {name}")))?;
        let removed = self
            .transitions
            .entries_mut()
            .filter_map(|entry| entry.remove(&action))
            .count();
        debug!(action = %action, transitions = removed, "removed action");
        Ok(action)
    }

    /// Unregister a pre-built action; see [`Mdp::remove_action`].
    ///
    /// # Errors
    ///
    /// Same as [`Mdp::remove_action`].
    pub fn remove_action_object(&mut self, action: &Action) -> Result<Action> {
        self.remove_action(action.name())
    }

    // ----- discount rate -------------------------------------------------

    /// Update the discount rate (gamma).
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::InvalidParameter`] outside `(0, 1]`; the rate is left unchanged.
    pub fn set_discount_rate(&mut self, discount_rate: f32) -> Result<()> {
        validate_discount_rate(discount_rate)?;
        debug!(old = self.discount_rate, new = discount_rate, "set discount rate");
        self.discount_rate = discount_rate;
        Ok(())
    }

    // ----- transitions ---------------------------------------------------

    /// Set the transition from `start` to `end` via `action`.
    ///
    /// # Errors
    ///
    /// - [`MdpError::NotFound`] if either state or the action is unknown
    /// - [`MdpError::PreconditionViolation`] if `start` has no transition entry
    pub fn set_transition(
        &mut self,
        start: &str,
        end: &str,
        action: &str,
        probability: f32,
    ) -> Result<()> {
        let start = self.resolve_state(start)?.clone();
        let end = self.resolve_state(end)?.clone();
        let action = self.resolve_action(action)?.clone();
        debug!(from = %start, to = %end, action = %action, probability, "set transition");
        self.transitions.update(&start, action, probability, end)
    }

    /// Remove every transition from `start` that leads to `end`, whatever the
    /// action. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// - [`MdpError::NotFound`] if either state is unknown
    /// - [`MdpError::PreconditionViolation`] if `start` has no transition entry
    pub fn remove_transition(&mut self, start: &str, end: &str) -> Result<usize> {
        let end = self.resolve_state(end)?.clone();
        let entry = self.entry_mut(start)?;
        let removed = entry.remove_by_destination(&end);
        debug!(from = start, to = %end, removed, "removed transitions");
        Ok(removed)
    }

    /// Remove the transition taken from `start` via `action`, returning it if it existed.
    ///
    /// # Errors
    ///
    /// - [`MdpError::NotFound`] if the state or the action is unknown
    /// - [`MdpError::PreconditionViolation`] if `start` has no transition entry
    pub fn remove_transition_by_action(
        &mut self,
        start: &str,
        action: &str,
    ) -> Result<Option<Transition>> {
        let action = self.resolve_action(action)?.clone();
        let removed = self.entry_mut(start)?.remove(&action);
        debug!(from = start, action = %action, removed = removed.is_some(), "removed transition");
        Ok(removed)
    }

    // ----- internals -----------------------------------------------------

    fn resolve_state(&self, name: &str) -> Result<&State> {
        self.state_by_name(name)
            .ok_or_else(|| MdpError::NotFound(format!("no state named {name}")))
    }

    fn resolve_action(&self, name: &str) -> Result<&Action> {
        self.action(name)
            .ok_or_else(|| MdpError::NotFound(format!("no action named {name}")))
    }

    fn entry_mut(&mut self, start: &str) -> Result<&mut TransitionTableEntry> {
        let start = self.resolve_state(start)?.clone();
        self.transitions.get_mut(&start).ok_or_else(|| {
            MdpError::PreconditionViolation(format!("state {start} has no transition entry"))
        })
    }

    /// First unoccupied slot, or the current capacity when the arena is full.
    ///
    /// Linear in the number of slots; holes are expected to be rare and near the front.
    fn first_free_index(&self) -> usize {
        self.states
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.states.len())
    }

    /// Grow the arena to `max(capacity, index * 2, index + 1)` slots when
    /// `index` is out of range. Leaves the arena untouched on failure.
    fn ensure_capacity(&mut self, index: usize) -> Result<()> {
        let capacity = self.states.len();
        if index < capacity {
            return Ok(());
        }
        let too_large =
            || MdpError::InvalidParameter(format!("state index {index} is too large to allocate"));
        let grown = index
            .checked_mul(2)
            .ok_or_else(too_large)?
            .max(index + 1)
            .max(capacity);
        self.states
            .try_reserve_exact(grown - capacity)
            .map_err(|_| too_large())?;
        self.states.resize(grown, None);
        debug!(from = capacity, to = grown, "grew state capacity");
        Ok(())
    }

    /// Clear the slot at `index` and every record keyed by its occupant.
    fn evict(&mut self, index: usize) -> Option<State> {
        let old = self.states.get_mut(index)?.take()?;
        if self.names.get(old.name()) == Some(&index) {
            self.names.remove(old.name());
        }
        self.occupied.remove(&index);
        self.rewards.remove(&old);
        self.transitions.remove(&old);
        if index == 0 {
            self.initial_state = None;
        }
        Some(old)
    }
}
