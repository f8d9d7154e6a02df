// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data source abstraction and its declared-state implementation.
//!
//! State indices are flat across groups: the first state of the second group
//! follows the last state of the first. `None` stands for "no state", the
//! situation before a group's first transition.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::model::{
    Setter, Storyboard, VisualState, VisualStateGroup, VisualStateToken, VisualTransition,
};
use crate::trigger::StateTriggerVariantMap;

/// Where a state lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateLocation {
    /// Flat state index.
    pub state: usize,
    /// Group index.
    pub group: usize,
}

/// Role of an active storyboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoryboardKind {
    /// Steady-state animation of the current state.
    State,
    /// Animation of an in-flight transition.
    Transition,
}

/// Runtime state of one group.
#[derive(Debug, Default)]
pub struct GroupContext {
    pub(crate) current: Option<usize>,
    pub(crate) transition_from: Option<usize>,
    pub(crate) transitioning: bool,
    pub(crate) active_setters: Vec<Setter>,
    pub(crate) pending_setters: Vec<Setter>,
    pub(crate) active_storyboards: SmallVec<[(Rc<Storyboard>, StoryboardKind); 2]>,
    pub(crate) pending_storyboard: Option<Rc<Storyboard>>,
    pub(crate) trigger_map: Option<Box<StateTriggerVariantMap>>,
}

impl GroupContext {
    /// The current state, if the group has left its initial state.
    #[must_use]
    pub fn current_state(&self) -> Option<usize> {
        self.current
    }

    /// Returns `true` while a non-instant transition is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Setters currently applied by this group.
    #[must_use]
    pub fn active_setters(&self) -> &[Setter] {
        &self.active_setters
    }

    /// Setters waiting for the in-flight transition to complete.
    #[must_use]
    pub fn pending_setters(&self) -> &[Setter] {
        &self.pending_setters
    }

    /// Storyboards the host should be playing for this group.
    pub fn active_storyboards(&self) -> impl Iterator<Item = (&Storyboard, StoryboardKind)> + '_ {
        self.active_storyboards.iter().map(|(s, k)| (&**s, *k))
    }

    /// The state's trigger map, once created.
    #[must_use]
    pub fn state_trigger_variant_map(&self) -> Option<&StateTriggerVariantMap> {
        self.trigger_map.as_deref()
    }
}

/// What states and transitions exist, and which are active.
///
/// [`VisualStateManager`](crate::VisualStateManager) drives any
/// implementation, whether its states were declared up front or are
/// synthesized on demand.
pub trait VisualStateDataSource {
    /// Number of groups.
    fn group_count(&self) -> usize;

    /// Name of `group`.
    fn group_name(&self, group: usize) -> Option<&str>;

    /// Name of the flat state index `state`.
    fn state_name(&self, state: usize) -> Option<&str>;

    /// Group owning `state`.
    fn group_of_state(&self, state: usize) -> Option<usize>;

    /// Finds a state by name. Groups are scanned in order; the first match
    /// wins.
    fn try_get_visual_state(&self, name: &str) -> Option<StateLocation>;

    /// Finds a state by token.
    fn try_get_visual_state_by_token(&self, token: VisualStateToken) -> Option<StateLocation>;

    /// The transition declared for `from -> to` in the group of `to`.
    ///
    /// A `to` of `None` has no transition.
    fn try_get_or_create_transition(
        &mut self,
        from: Option<usize>,
        to: Option<usize>,
    ) -> Option<Rc<VisualTransition>>;

    /// The steady-state storyboard of `state`, created once and cached.
    fn try_get_or_create_storyboard_for_visual_state(
        &mut self,
        state: usize,
    ) -> Option<Rc<Storyboard>>;

    /// Setters declared on `state`.
    fn setters_for_visual_state(&self, state: usize) -> &[Setter];

    /// Runtime state of `group`.
    fn group_context(&self, group: usize) -> Option<&GroupContext>;

    /// Mutable runtime state of `group`.
    fn group_context_mut(&mut self, group: usize) -> Option<&mut GroupContext>;

    /// The trigger map of `group`, created from the declared triggers on
    /// first use.
    fn try_get_or_create_state_trigger_variant_map(
        &mut self,
        group: usize,
    ) -> Option<&mut StateTriggerVariantMap>;

    /// The current state of `group`.
    fn current_state(&self, group: usize) -> Option<usize> {
        self.group_context(group).and_then(GroupContext::current_state)
    }
}

/// Groups declared up front, as markup produces them.
#[derive(Debug, Default)]
pub struct VisualStateGroupCollection {
    groups: Vec<VisualStateGroup>,
    offsets: Vec<usize>,
    contexts: Vec<GroupContext>,
    storyboards: Vec<Option<Rc<Storyboard>>>,
    transitions: HashMap<(Option<usize>, usize), Option<Rc<VisualTransition>>>,
    next_token: u32,
}

impl VisualStateGroupCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, assigning tokens to states that have none, and returns
    /// its index.
    ///
    /// Assigned tokens skip every token already declared in the collection or
    /// in `group`. An explicit token that repeats an earlier one resolves to
    /// the earlier state.
    pub fn add_group(&mut self, mut group: VisualStateGroup) -> usize {
        let used: HashSet<VisualStateToken> = self
            .groups
            .iter()
            .chain(core::iter::once(&group))
            .flat_map(|declared| declared.states.iter().filter_map(|state| state.token))
            .collect();
        for state in &mut group.states {
            match state.token {
                None => {
                    self.next_token += 1;
                    while used.contains(&VisualStateToken::new(self.next_token)) {
                        self.next_token += 1;
                    }
                    state.token = Some(VisualStateToken::new(self.next_token));
                }
                Some(token) => {
                    if self.find(|existing| existing.token == Some(token)).is_some() {
                        debug!(state = %state.name(), token = token.get(), "duplicate state token");
                    }
                }
            }
        }
        self.offsets.push(self.storyboards.len());
        self.storyboards.resize(self.storyboards.len() + group.states.len(), None);
        self.contexts.push(GroupContext::default());
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Declared groups.
    #[must_use]
    pub fn groups(&self) -> &[VisualStateGroup] {
        &self.groups
    }

    fn locate(&self, state: usize) -> Option<(usize, usize)> {
        let group = self.offsets.partition_point(|offset| *offset <= state).checked_sub(1)?;
        let local = state - self.offsets[group];
        (local < self.groups[group].states.len()).then_some((group, local))
    }

    fn find(&self, mut matches: impl FnMut(&VisualState) -> bool) -> Option<StateLocation> {
        for (group, (declared, offset)) in self.groups.iter().zip(&self.offsets).enumerate() {
            if let Some(local) = declared.states.iter().position(&mut matches) {
                return Some(StateLocation {
                    state: offset + local,
                    group,
                });
            }
        }
        None
    }
}

impl VisualStateDataSource for VisualStateGroupCollection {
    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn group_name(&self, group: usize) -> Option<&str> {
        self.groups.get(group).map(VisualStateGroup::name)
    }

    fn state_name(&self, state: usize) -> Option<&str> {
        let (group, local) = self.locate(state)?;
        Some(self.groups[group].states[local].name())
    }

    fn group_of_state(&self, state: usize) -> Option<usize> {
        self.locate(state).map(|(group, _)| group)
    }

    fn try_get_visual_state(&self, name: &str) -> Option<StateLocation> {
        self.find(|state| state.name() == name)
    }

    fn try_get_visual_state_by_token(&self, token: VisualStateToken) -> Option<StateLocation> {
        self.find(|state| state.token == Some(token))
    }

    fn try_get_or_create_transition(
        &mut self,
        from: Option<usize>,
        to: Option<usize>,
    ) -> Option<Rc<VisualTransition>> {
        let to = to?;
        let (group, local) = self.locate(to)?;
        let from = from.filter(|f| self.group_of_state(*f) == Some(group));
        if let Some(cached) = self.transitions.get(&(from, to)) {
            return cached.clone();
        }
        let declared = &self.groups[group];
        let from_name = from.and_then(|f| self.state_name(f));
        let transition = declared
            .find_transition(from_name, declared.states[local].name())
            .cloned()
            .map(Rc::new);
        self.transitions.insert((from, to), transition.clone());
        transition
    }

    fn try_get_or_create_storyboard_for_visual_state(
        &mut self,
        state: usize,
    ) -> Option<Rc<Storyboard>> {
        let (group, local) = self.locate(state)?;
        if self.storyboards[state].is_none() {
            let declared = self.groups[group].states[local].storyboard.clone()?;
            self.storyboards[state] = Some(Rc::new(declared));
        }
        self.storyboards[state].clone()
    }

    fn setters_for_visual_state(&self, state: usize) -> &[Setter] {
        self.locate(state)
            .map_or(&[], |(group, local)| self.groups[group].states[local].setters())
    }

    fn group_context(&self, group: usize) -> Option<&GroupContext> {
        self.contexts.get(group)
    }

    fn group_context_mut(&mut self, group: usize) -> Option<&mut GroupContext> {
        self.contexts.get_mut(group)
    }

    fn try_get_or_create_state_trigger_variant_map(
        &mut self,
        group: usize,
    ) -> Option<&mut StateTriggerVariantMap> {
        let declared = self.groups.get(group)?;
        let context = &mut self.contexts[group];
        let map = context.trigger_map.get_or_insert_with(|| {
            let mut map = StateTriggerVariantMap::new();
            for state in &declared.states {
                let Some(token) = state.token else {
                    continue;
                };
                for trigger in &state.triggers {
                    map.add(token, trigger.qualifier());
                }
            }
            Box::new(map)
        });
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> VisualStateGroupCollection {
        let mut states = VisualStateGroupCollection::new();
        states.add_group(
            VisualStateGroup::new("CommonStates")
                .with_state(VisualState::new("Normal"))
                .with_state(VisualState::new("Pressed"))
                .with_transition(VisualTransition::new().to("Pressed").duration_ms(100)),
        );
        states.add_group(
            VisualStateGroup::new("FocusStates")
                .with_state(VisualState::new("Unfocused"))
                .with_state(VisualState::new("Focused"))
                .with_state(VisualState::new("Normal")),
        );
        states
    }

    #[test]
    fn lookup_by_name_takes_the_first_group() {
        let states = collection();
        assert_eq!(
            states.try_get_visual_state("Normal"),
            Some(StateLocation { state: 0, group: 0 })
        );
        assert_eq!(
            states.try_get_visual_state("Focused"),
            Some(StateLocation { state: 3, group: 1 })
        );
        assert_eq!(states.try_get_visual_state("Hidden"), None);
        assert_eq!(states.group_of_state(4), Some(1));
        assert_eq!(states.state_name(5), None);
    }

    #[test]
    fn lookup_by_token_survives_renames() {
        let mut states = VisualStateGroupCollection::new();
        let token = VisualStateToken::new(99);
        states.add_group(
            VisualStateGroup::new("G")
                .with_state(VisualState::new("A"))
                .with_state(VisualState::new("B").with_token(token)),
        );
        assert_eq!(
            states.try_get_visual_state_by_token(token),
            Some(StateLocation { state: 1, group: 0 })
        );
    }

    #[test]
    fn assigned_tokens_skip_explicit_ones() {
        let mut states = VisualStateGroupCollection::new();
        let explicit = VisualStateToken::new(1);
        states.add_group(
            VisualStateGroup::new("G")
                .with_state(VisualState::new("A"))
                .with_state(VisualState::new("B").with_token(explicit)),
        );
        states.add_group(VisualStateGroup::new("H").with_state(VisualState::new("C")));
        assert_eq!(
            states.try_get_visual_state_by_token(explicit),
            Some(StateLocation { state: 1, group: 0 })
        );
        let assigned: Vec<_> = states
            .groups()
            .iter()
            .flat_map(|group| group.states.iter().filter_map(|state| state.token))
            .collect();
        assert_eq!(
            assigned,
            [VisualStateToken::new(2), explicit, VisualStateToken::new(3)]
        );
    }

    #[test]
    fn transitions_resolve_in_the_to_group_and_are_cached() {
        let mut states = collection();
        let first = states.try_get_or_create_transition(None, Some(1)).unwrap();
        assert_eq!(first.duration_ms, 100);
        let again = states.try_get_or_create_transition(None, Some(1)).unwrap();
        assert!(Rc::ptr_eq(&first, &again));
        assert!(states.try_get_or_create_transition(Some(1), Some(3)).is_none());
        assert!(states.try_get_or_create_transition(Some(0), None).is_none());
    }

    #[test]
    fn trigger_map_is_created_lazily() {
        let mut states = collection();
        assert!(states.group_context(0).unwrap().state_trigger_variant_map().is_none());
        let map = states.try_get_or_create_state_trigger_variant_map(0).unwrap();
        assert!(map.is_empty());
        assert!(states.group_context(0).unwrap().state_trigger_variant_map().is_some());
    }
}
