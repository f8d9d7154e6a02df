// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visual state driver.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use arbor_object::ObjectGraph;
use smallvec::smallvec;
use tracing::debug;

use crate::error::{VsmError, VsmResult};
use crate::model::{Setter, VisualStateToken};
use crate::source::{StateLocation, StoryboardKind, VisualStateDataSource};
use crate::trigger::QualifierContext;

/// A state change within one group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// Group index.
    pub group: usize,
    /// State being left, if any.
    pub from: Option<usize>,
    /// State being entered.
    pub to: usize,
}

/// Observer of state changes.
///
/// `changing` runs before the new state's setters are applied, while the
/// previous state is still current. `changed` runs once the new state is
/// current and its transition, if any, has completed.
pub trait VisualStateListener: fmt::Debug {
    /// A change is about to be applied.
    fn changing(&mut self, source: &dyn VisualStateDataSource, change: &StateChange) {
        let _ = (source, change);
    }

    /// A change has been applied.
    fn changed(&mut self, source: &dyn VisualStateDataSource, change: &StateChange) {
        let _ = (source, change);
    }
}

/// Drives any [`VisualStateDataSource`] through state changes.
#[derive(Debug, Default)]
pub struct VisualStateManager {
    listeners: Vec<Box<dyn VisualStateListener>>,
}

impl VisualStateManager {
    /// Creates a driver with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Listeners run in registration order.
    pub fn add_listener(&mut self, listener: impl VisualStateListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Moves the group declaring `name` to that state.
    ///
    /// Returns `Ok(false)` if no group declares the state. Going to the
    /// current state does nothing unless `use_transitions` is off, in which
    /// case an in-flight transition is snapped to its end and the state's
    /// setters are applied again.
    pub fn go_to_state(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        name: &str,
        use_transitions: bool,
    ) -> VsmResult<bool> {
        match source.try_get_visual_state(name) {
            Some(location) => self.go_to_location(graph, source, location, use_transitions),
            None => Ok(false),
        }
    }

    /// Like [`go_to_state`](Self::go_to_state), identifying the state by
    /// token.
    pub fn go_to_state_by_token(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        token: VisualStateToken,
        use_transitions: bool,
    ) -> VsmResult<bool> {
        match source.try_get_visual_state_by_token(token) {
            Some(location) => self.go_to_location(graph, source, location, use_transitions),
            None => Ok(false),
        }
    }

    fn go_to_location(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        location: StateLocation,
        use_transitions: bool,
    ) -> VsmResult<bool> {
        let current = source.current_state(location.group);
        if current == Some(location.state) {
            if !use_transitions {
                self.complete_transition(graph, source, location.group)?;
                reapply_active_setters(graph, source, location.group)?;
            }
            return Ok(true);
        }
        self.change_visual_state(graph, source, location.group, current, location.state, use_transitions)?;
        Ok(true)
    }

    fn change_visual_state(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        group: usize,
        from: Option<usize>,
        to: usize,
        use_transitions: bool,
    ) -> VsmResult<()> {
        let setters: Vec<Setter> = source.setters_for_visual_state(to).to_vec();
        let storyboard = source.try_get_or_create_storyboard_for_visual_state(to);
        let transition = if use_transitions {
            source.try_get_or_create_transition(from, Some(to))
        } else {
            None
        };
        let instant = transition.as_ref().is_none_or(|t| t.is_zero_duration());

        let change = StateChange { group, from, to };
        debug!(
            group = source.group_name(group),
            from = from.and_then(|f| source.state_name(f)),
            to = source.state_name(to),
            instant,
            "visual state changing"
        );
        for listener in &mut self.listeners {
            listener.changing(&*source, &change);
        }

        let previous = source
            .group_context(group)
            .ok_or(VsmError::UnknownGroup(group))?
            .active_setters()
            .to_vec();
        if instant {
            apply_setters(graph, &setters, &previous)?;
        }

        let context = source
            .group_context_mut(group)
            .ok_or(VsmError::UnknownGroup(group))?;
        context.pending_setters.clear();
        if instant {
            context.active_setters = setters.clone();
            context.active_storyboards = storyboard
                .map(|s| smallvec![(s, StoryboardKind::State)])
                .unwrap_or_default();
            context.pending_storyboard = None;
        } else {
            context.pending_setters = setters.clone();
            context.pending_storyboard = storyboard;
            context.active_storyboards = transition
                .and_then(|t| t.storyboard.clone())
                .map(|s| smallvec![(Rc::new(s), StoryboardKind::Transition)])
                .unwrap_or_default();
        }
        context.current = Some(to);
        context.transition_from = from;
        context.transitioning = !instant;

        // Every stale setter is cleared; the first failure is reported.
        let mut cleared = Ok(());
        for old in previous.iter().filter(|old| !setters.iter().any(|s| s.same_slot(old))) {
            let result = graph.clear_value(old.target, old.property);
            if cleared.is_ok() {
                cleared = result;
            }
        }

        if instant {
            self.notify_changed(source, change);
        }
        cleared.map_err(VsmError::from)
    }

    /// Finishes the in-flight transition of `group`: applies the pending
    /// setters, starts the state storyboard, and notifies `changed`.
    ///
    /// The host calls this when the transition animation completes. Does
    /// nothing if no transition is in flight.
    pub fn complete_transition(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        group: usize,
    ) -> VsmResult<()> {
        let context = source
            .group_context_mut(group)
            .ok_or(VsmError::UnknownGroup(group))?;
        if !context.transitioning {
            return Ok(());
        }
        let Some(to) = context.current else {
            context.transitioning = false;
            return Ok(());
        };
        context.transitioning = false;
        let setters = core::mem::take(&mut context.pending_setters);
        context.active_storyboards = context
            .pending_storyboard
            .take()
            .map(|s| smallvec![(s, StoryboardKind::State)])
            .unwrap_or_default();
        context.active_setters = setters.clone();
        let change = StateChange {
            group,
            from: context.transition_from,
            to,
        };
        for setter in &setters {
            graph.set_value(setter.target, setter.property, setter.value.clone())?;
        }
        self.notify_changed(source, change);
        Ok(())
    }

    /// Evaluates the state triggers of `group` against `cx` and moves to the
    /// winning state.
    ///
    /// Returns the state moved to, or `None` if no trigger is met.
    pub fn evaluate_state_triggers(
        &mut self,
        graph: &mut ObjectGraph,
        source: &mut dyn VisualStateDataSource,
        group: usize,
        cx: &QualifierContext,
    ) -> VsmResult<Option<usize>> {
        let map = source
            .try_get_or_create_state_trigger_variant_map(group)
            .ok_or(VsmError::UnknownGroup(group))?;
        let Some(token) = map.select(cx) else {
            return Ok(None);
        };
        let Some(location) = source.try_get_visual_state_by_token(token) else {
            return Ok(None);
        };
        self.go_to_location(graph, source, location, true)?;
        Ok(Some(location.state))
    }

    fn notify_changed(&mut self, source: &dyn VisualStateDataSource, change: StateChange) {
        debug!(group = change.group, to = change.to, "visual state changed");
        for listener in &mut self.listeners {
            listener.changed(source, &change);
        }
    }
}

/// Writes `setters` in order. If one fails, those already written get their
/// `previous` value back, or are cleared when `previous` has none.
fn apply_setters(graph: &mut ObjectGraph, setters: &[Setter], previous: &[Setter]) -> VsmResult<()> {
    for (written, setter) in setters.iter().enumerate() {
        let Err(err) = graph.set_value(setter.target, setter.property, setter.value.clone()) else {
            continue;
        };
        for applied in &setters[..written] {
            let restored = match previous.iter().find(|old| old.same_slot(applied)) {
                Some(old) => graph.set_value(old.target, old.property, old.value.clone()),
                None => graph.clear_value(applied.target, applied.property),
            };
            if let Err(rollback) = restored {
                debug!(object = %applied.target, %rollback, "setter rollback failed");
            }
        }
        return Err(err.into());
    }
    Ok(())
}

fn reapply_active_setters(
    graph: &mut ObjectGraph,
    source: &dyn VisualStateDataSource,
    group: usize,
) -> VsmResult<()> {
    let context = source
        .group_context(group)
        .ok_or(VsmError::UnknownGroup(group))?;
    for setter in context.active_setters() {
        graph.set_value(setter.target, setter.property, setter.value.clone())?;
    }
    Ok(())
}
