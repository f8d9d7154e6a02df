// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driving state changes through the declared-group data source.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use arbor_object::{ObjectError, ObjectGraph};
use arbor_property::{ObjectId, PropertyBuilder, PropertyIndex, PropertyTableBuilder, TypeIndex, Value, ValueKind};
use arbor_vsm::{
    CustomTrigger, QualifierContext, Setter, StateChange, StateTrigger, Storyboard, StoryboardKind,
    VisualState, VisualStateDataSource, VisualStateGroup, VisualStateGroupCollection,
    VisualStateListener, VisualStateManager, VisualTransition, VsmError,
};

type Log = Rc<RefCell<Vec<(&'static str, Option<String>, String)>>>;

/// Records each notification with the state the data source reports as
/// current at that moment.
#[derive(Debug)]
struct Recorder(Log);

impl Recorder {
    fn record(&self, phase: &'static str, source: &dyn VisualStateDataSource, change: &StateChange) {
        let current = source
            .current_state(change.group)
            .and_then(|s| source.state_name(s))
            .map(ToString::to_string);
        let to = source.state_name(change.to).unwrap_or_default().to_string();
        self.0.borrow_mut().push((phase, current, to));
    }
}

impl VisualStateListener for Recorder {
    fn changing(&mut self, source: &dyn VisualStateDataSource, change: &StateChange) {
        self.record("changing", source, change);
    }

    fn changed(&mut self, source: &dyn VisualStateDataSource, change: &StateChange) {
        self.record("changed", source, change);
    }
}

fn setup() -> (ObjectGraph, ObjectId, PropertyIndex) {
    let mut builder = PropertyTableBuilder::new();
    let opacity = builder.register_property(
        PropertyBuilder::new("Opacity", TypeIndex::UI_ELEMENT, ValueKind::Double)
            .default_value(Value::Double(1.0)),
    );
    let mut graph = ObjectGraph::new(Arc::new(builder.build()));
    let border = graph.create(TypeIndex::UI_ELEMENT);
    (graph, border, opacity)
}

fn some(name: &str) -> Option<String> {
    Some(name.to_string())
}

#[test]
fn changing_sees_the_old_state_and_changed_sees_the_new() {
    let (mut graph, border, opacity) = setup();
    let mut states = VisualStateGroupCollection::new();
    states.add_group(
        VisualStateGroup::new("CommonStates")
            .with_state(VisualState::new("Normal"))
            .with_state(
                VisualState::new("PointerOver")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.8))),
            ),
    );
    let log = Log::default();
    let mut vsm = VisualStateManager::new();
    vsm.add_listener(Recorder(Rc::clone(&log)));

    assert!(vsm.go_to_state(&mut graph, &mut states, "Normal", true).unwrap());
    assert!(vsm.go_to_state(&mut graph, &mut states, "PointerOver", true).unwrap());

    assert_eq!(
        log.borrow().as_slice(),
        &[
            ("changing", None, "Normal".to_string()),
            ("changed", some("Normal"), "Normal".to_string()),
            ("changing", some("Normal"), "PointerOver".to_string()),
            ("changed", some("PointerOver"), "PointerOver".to_string()),
        ]
    );
    assert_eq!(graph.get_value(border, opacity), &Value::Double(0.8));
}

#[test]
fn unknown_state_and_current_state_are_not_changes() {
    let (mut graph, _, _) = setup();
    let mut states = VisualStateGroupCollection::new();
    states.add_group(VisualStateGroup::new("G").with_state(VisualState::new("A")));
    let log = Log::default();
    let mut vsm = VisualStateManager::new();
    vsm.add_listener(Recorder(Rc::clone(&log)));

    assert!(!vsm.go_to_state(&mut graph, &mut states, "Missing", true).unwrap());
    assert!(vsm.go_to_state(&mut graph, &mut states, "A", true).unwrap());
    assert!(vsm.go_to_state(&mut graph, &mut states, "A", true).unwrap());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn animated_transition_defers_setters_until_completion() {
    let (mut graph, border, opacity) = setup();
    let mut states = VisualStateGroupCollection::new();
    let group = states.add_group(
        VisualStateGroup::new("CommonStates")
            .with_state(
                VisualState::new("Normal")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.9))),
            )
            .with_state(
                VisualState::new("Pressed")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.5)))
                    .with_storyboard(Storyboard::new("PressedPulse", 0)),
            )
            .with_transition(
                VisualTransition::new()
                    .to("Pressed")
                    .with_storyboard(Storyboard::new("PressDown", 120)),
            ),
    );
    let log = Log::default();
    let mut vsm = VisualStateManager::new();
    vsm.add_listener(Recorder(Rc::clone(&log)));
    vsm.go_to_state(&mut graph, &mut states, "Normal", true).unwrap();
    log.borrow_mut().clear();

    vsm.go_to_state(&mut graph, &mut states, "Pressed", true).unwrap();
    let context = states.group_context(group).unwrap();
    assert!(context.is_transitioning());
    assert_eq!(context.pending_setters().len(), 1);
    let playing: Vec<_> = context.active_storyboards().map(|(s, k)| (s.name.to_string(), k)).collect();
    assert_eq!(playing, [("PressDown".to_string(), StoryboardKind::Transition)]);
    assert_eq!(graph.get_value(border, opacity), &Value::Double(0.9));
    assert_eq!(log.borrow().len(), 1);

    vsm.complete_transition(&mut graph, &mut states, group).unwrap();
    let context = states.group_context(group).unwrap();
    assert!(!context.is_transitioning());
    let playing: Vec<_> = context.active_storyboards().map(|(s, k)| (s.name.to_string(), k)).collect();
    assert_eq!(playing, [("PressedPulse".to_string(), StoryboardKind::State)]);
    assert_eq!(graph.get_value(border, opacity), &Value::Double(0.5));
    assert_eq!(
        log.borrow().last(),
        Some(&("changed", some("Pressed"), "Pressed".to_string()))
    );
}

#[test]
fn failed_setter_leaves_the_previous_state_in_place() {
    let (mut graph, border, opacity) = setup();
    let mut states = VisualStateGroupCollection::new();
    let group = states.add_group(
        VisualStateGroup::new("CommonStates")
            .with_state(
                VisualState::new("Normal")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.5))),
            )
            .with_state(
                VisualState::new("Broken")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.8)))
                    .with_setter(Setter::new(border, opacity, Value::Bool(true))),
            ),
    );
    let log = Log::default();
    let mut vsm = VisualStateManager::new();
    vsm.add_listener(Recorder(Rc::clone(&log)));
    vsm.go_to_state(&mut graph, &mut states, "Normal", false).unwrap();

    let err = vsm.go_to_state(&mut graph, &mut states, "Broken", false).unwrap_err();
    assert!(matches!(err, VsmError::Object(ObjectError::NotAssignable { .. })));
    assert_eq!(states.current_state(group), Some(0));
    let context = states.group_context(group).unwrap();
    assert_eq!(
        context.active_setters(),
        [Setter::new(border, opacity, Value::Double(0.5))]
    );
    assert_eq!(graph.get_value(border, opacity), &Value::Double(0.5));
    assert_eq!(
        log.borrow().last(),
        Some(&("changing", some("Normal"), "Broken".to_string()))
    );
}

#[test]
fn going_without_transitions_skips_the_animation() {
    let (mut graph, border, opacity) = setup();
    let mut states = VisualStateGroupCollection::new();
    states.add_group(
        VisualStateGroup::new("CommonStates")
            .with_state(VisualState::new("Normal"))
            .with_state(
                VisualState::new("Pressed")
                    .with_setter(Setter::new(border, opacity, Value::Double(0.5))),
            )
            .with_transition(VisualTransition::new().duration_ms(200)),
    );
    let mut vsm = VisualStateManager::new();
    vsm.go_to_state(&mut graph, &mut states, "Pressed", false).unwrap();
    assert!(!states.group_context(0).unwrap().is_transitioning());
    assert_eq!(graph.get_value(border, opacity), &Value::Double(0.5));
}

#[test]
fn triggers_select_states() {
    let (mut graph, _, _) = setup();
    let override_trigger = CustomTrigger::new();
    let mut states = VisualStateGroupCollection::new();
    let group = states.add_group(
        VisualStateGroup::new("WindowStates")
            .with_state(VisualState::new("Narrow").with_trigger(StateTrigger::min_window_width(0.)))
            .with_state(VisualState::new("Wide").with_trigger(StateTrigger::min_window_width(720.)))
            .with_state(
                VisualState::new("Compact").with_trigger(StateTrigger::Custom(override_trigger.clone())),
            ),
    );
    let mut vsm = VisualStateManager::new();
    let wide = QualifierContext {
        window_width: 1024.,
        window_height: 768.,
    };
    let narrow = QualifierContext {
        window_width: 400.,
        window_height: 768.,
    };

    assert_eq!(vsm.evaluate_state_triggers(&mut graph, &mut states, group, &wide).unwrap(), Some(1));
    assert_eq!(vsm.evaluate_state_triggers(&mut graph, &mut states, group, &narrow).unwrap(), Some(0));
    assert_eq!(states.current_state(group), Some(0));

    override_trigger.set_active(true);
    assert_eq!(vsm.evaluate_state_triggers(&mut graph, &mut states, group, &narrow).unwrap(), Some(0));
    assert!(states.group_context(group).unwrap().state_trigger_variant_map().is_some());
}
