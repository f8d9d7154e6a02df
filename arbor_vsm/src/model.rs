// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declared visual states, transitions, and setters.

use alloc::sync::Arc;
use alloc::vec::Vec;

use arbor_property::{ObjectId, PropertyIndex, Value};

use crate::trigger::StateTrigger;

/// Opaque identity of a visual state that survives renaming.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualStateToken(u32);

impl VisualStateToken {
    /// Creates a token from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// A property value applied to a target object while a state is current.
#[derive(Clone, Debug, PartialEq)]
pub struct Setter {
    /// Object the setter writes to.
    pub target: ObjectId,
    /// Property written.
    pub property: PropertyIndex,
    /// Value written.
    pub value: Value,
}

impl Setter {
    /// Creates a setter.
    #[must_use]
    pub fn new(target: ObjectId, property: PropertyIndex, value: Value) -> Self {
        Self {
            target,
            property,
            value,
        }
    }

    /// Returns `true` if both setters write the same property of the same
    /// object.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.target == other.target && self.property == other.property
    }
}

/// An animation handed to the host for playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Storyboard {
    /// Name used by the host to find the animation.
    pub name: Arc<str>,
    /// Duration in milliseconds.
    pub duration_ms: u32,
}

impl Storyboard {
    /// Creates a storyboard description.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, duration_ms: u32) -> Self {
        Self {
            name: name.into(),
            duration_ms,
        }
    }
}

/// One state of a group.
#[derive(Clone, Debug)]
pub struct VisualState {
    pub(crate) name: Arc<str>,
    pub(crate) token: Option<VisualStateToken>,
    pub(crate) setters: Vec<Setter>,
    pub(crate) storyboard: Option<Storyboard>,
    pub(crate) triggers: Vec<StateTrigger>,
}

impl VisualState {
    /// Creates an empty state.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            token: None,
            setters: Vec::new(),
            storyboard: None,
            triggers: Vec::new(),
        }
    }

    /// Assigns an explicit token. Otherwise the collection assigns one.
    #[must_use]
    pub fn with_token(mut self, token: VisualStateToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Adds a setter.
    #[must_use]
    pub fn with_setter(mut self, setter: Setter) -> Self {
        self.setters.push(setter);
        self
    }

    /// Sets the steady-state storyboard.
    #[must_use]
    pub fn with_storyboard(mut self, storyboard: Storyboard) -> Self {
        self.storyboard = Some(storyboard);
        self
    }

    /// Adds a trigger that selects this state.
    #[must_use]
    pub fn with_trigger(mut self, trigger: StateTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// State name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State token. Assigned once the state is added to a collection.
    #[must_use]
    pub fn token(&self) -> Option<VisualStateToken> {
        self.token
    }

    /// Setters applied while the state is current.
    #[must_use]
    pub fn setters(&self) -> &[Setter] {
        &self.setters
    }

    /// Triggers that select this state.
    #[must_use]
    pub fn triggers(&self) -> &[StateTrigger] {
        &self.triggers
    }
}

/// An animated transition between states of one group.
///
/// A missing `from` or `to` matches any state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualTransition {
    /// State the transition leaves, or any.
    pub from: Option<Arc<str>>,
    /// State the transition enters, or any.
    pub to: Option<Arc<str>>,
    /// Generated duration for properties the storyboard does not animate.
    pub duration_ms: u32,
    /// Explicit transition animation.
    pub storyboard: Option<Storyboard>,
}

impl VisualTransition {
    /// Creates a transition that matches any pair of states.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the transition to leave `state`.
    #[must_use]
    pub fn from(mut self, state: impl Into<Arc<str>>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Restricts the transition to enter `state`.
    #[must_use]
    pub fn to(mut self, state: impl Into<Arc<str>>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Sets the generated duration.
    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Sets the transition storyboard.
    #[must_use]
    pub fn with_storyboard(mut self, storyboard: Storyboard) -> Self {
        self.storyboard = Some(storyboard);
        self
    }

    /// Returns `true` if the transition completes immediately.
    #[must_use]
    pub fn is_zero_duration(&self) -> bool {
        self.duration_ms == 0 && self.storyboard.as_ref().is_none_or(|s| s.duration_ms == 0)
    }

    /// How specifically the transition matches `from -> to`, or `None`.
    ///
    /// Exact pairs beat `to`-only, which beat `from`-only, which beat the
    /// wildcard.
    pub(crate) fn specificity(&self, from: Option<&str>, to: &str) -> Option<u8> {
        let from_matches = match (&self.from, from) {
            (None, _) => Some(false),
            (Some(name), Some(current)) if &**name == current => Some(true),
            _ => None,
        }?;
        let to_matches = match &self.to {
            None => false,
            Some(name) if &**name == to => true,
            Some(_) => return None,
        };
        Some(u8::from(to_matches) * 2 + u8::from(from_matches))
    }
}

/// A named, ordered set of mutually exclusive states.
#[derive(Clone, Debug)]
pub struct VisualStateGroup {
    pub(crate) name: Arc<str>,
    pub(crate) states: Vec<VisualState>,
    pub(crate) transitions: Vec<VisualTransition>,
}

impl VisualStateGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Adds a state.
    #[must_use]
    pub fn with_state(mut self, state: VisualState) -> Self {
        self.states.push(state);
        self
    }

    /// Adds a transition.
    #[must_use]
    pub fn with_transition(mut self, transition: VisualTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// States in declaration order.
    #[must_use]
    pub fn states(&self) -> &[VisualState] {
        &self.states
    }

    /// The most specific transition for `from -> to`, if any matches.
    ///
    /// Earlier declarations win ties.
    #[must_use]
    pub fn find_transition(&self, from: Option<&str>, to: &str) -> Option<&VisualTransition> {
        let mut best: Option<(u8, &VisualTransition)> = None;
        for transition in &self.transitions {
            if let Some(score) = transition.specificity(from, to) {
                if best.is_none_or(|(b, _)| score > b) {
                    best = Some((score, transition));
                }
            }
        }
        best.map(|(_, t)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_transition_beats_wildcards() {
        let group = VisualStateGroup::new("CommonStates")
            .with_transition(VisualTransition::new().duration_ms(1))
            .with_transition(VisualTransition::new().to("Pressed").duration_ms(2))
            .with_transition(VisualTransition::new().from("Normal").duration_ms(3))
            .with_transition(
                VisualTransition::new()
                    .from("Normal")
                    .to("Pressed")
                    .duration_ms(4),
            );
        let pick = |from, to| group.find_transition(from, to).map(|t| t.duration_ms);
        assert_eq!(pick(Some("Normal"), "Pressed"), Some(4));
        assert_eq!(pick(Some("PointerOver"), "Pressed"), Some(2));
        assert_eq!(pick(Some("Normal"), "Disabled"), Some(3));
        assert_eq!(pick(None, "Disabled"), Some(1));
    }

    #[test]
    fn zero_duration_needs_an_instant_storyboard() {
        assert!(VisualTransition::new().is_zero_duration());
        assert!(
            !VisualTransition::new()
                .with_storyboard(Storyboard::new("Fade", 150))
                .is_zero_duration()
        );
    }
}
