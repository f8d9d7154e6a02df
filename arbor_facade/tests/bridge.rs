// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Facade bridge behavior against a recording property set.

use std::sync::Arc;

use arbor_dirty::LayoutFlags;
use arbor_facade::{
    CompositionError, FacadeBridge, FacadeError, FacadeId, FacadeProperties, FacadeValue,
    PendingFacadeChanges, PropertyChangeListener, PropertySet,
};
use arbor_object::ObjectGraph;
use arbor_property::{ObjectId, PropertyTableBuilder, TypeIndex, Value};

/// Property set that records insertions and listener registrations, and can
/// be told to fail.
#[derive(Debug, Default)]
struct RecordingSet {
    values: Vec<(String, FacadeValue)>,
    listeners: Vec<u32>,
    fail_with: Option<CompositionError>,
}

impl RecordingSet {
    fn check(&self) -> Result<(), CompositionError> {
        self.fail_with.map_or(Ok(()), Err)
    }
}

impl PropertySet for RecordingSet {
    fn insert(&mut self, name: &str, value: FacadeValue) -> Result<(), CompositionError> {
        self.check()?;
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name.to_string(), value)),
        }
        Ok(())
    }

    fn try_get(&self, name: &str) -> Result<Option<FacadeValue>, CompositionError> {
        self.check()?;
        Ok(self
            .values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone()))
    }

    fn register_listener(&mut self, property_id: u32) -> Result<(), CompositionError> {
        self.check()?;
        self.listeners.push(property_id);
        Ok(())
    }

    fn unregister_listener(&mut self, property_id: u32) -> Result<(), CompositionError> {
        self.check()?;
        self.listeners.retain(|id| *id != property_id);
        Ok(())
    }
}

fn setup() -> (ObjectGraph, ObjectId, FacadeProperties) {
    let mut builder = PropertyTableBuilder::new();
    let props = FacadeProperties::register(&mut builder, TypeIndex::UI_ELEMENT);
    let mut graph = ObjectGraph::new(Arc::new(builder.build()));
    let element = graph.create(TypeIndex::UI_ELEMENT);
    (graph, element, props)
}

#[test]
fn facade_ids_follow_first_use_order() {
    let (mut graph, element, props) = setup();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());

    bridge.start_animation(&mut graph, FacadeId::Translation).unwrap();
    bridge.start_animation(&mut graph, FacadeId::Scale).unwrap();
    bridge.start_animation(&mut graph, FacadeId::CenterPoint).unwrap();
    bridge.start_animation(&mut graph, FacadeId::Translation).unwrap();

    assert_eq!(bridge.mapping().property_id(FacadeId::Translation), Some(0));
    assert_eq!(bridge.mapping().property_id(FacadeId::Scale), Some(1));
    assert_eq!(bridge.mapping().property_id(FacadeId::CenterPoint), Some(2));
    assert_eq!(bridge.mapping().len(), 3);
    let names: Vec<_> = bridge.property_set().values.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["Translation", "Scale", "CenterPoint"]);
    assert_eq!(bridge.property_set().listeners, [0, 1, 2]);
}

#[test]
fn start_seeds_the_shadow_property() {
    let (mut graph, element, props) = setup();
    graph
        .set_value(element, props.value(FacadeId::Translation), Value::Vector3([4.0, 5.0, 0.0]))
        .unwrap();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());

    bridge.start_animation(&mut graph, FacadeId::Translation).unwrap();

    assert_eq!(
        graph.get_value(element, props.animated(FacadeId::Translation)),
        &Value::Vector3([4.0, 5.0, 0.0])
    );
    assert_eq!(
        bridge.property_set().values[0].1,
        FacadeValue::Vector3([4.0, 5.0, 0.0])
    );
}

#[test]
fn notifications_write_shadow_values_and_dirty_the_transform() {
    let (mut graph, element, props) = setup();
    let pending = PendingFacadeChanges::new();
    let mut left = FacadeBridge::new(element, props, RecordingSet::default(), pending.clone());
    let other = graph.create(TypeIndex::UI_ELEMENT);
    let mut right = FacadeBridge::new(other, props, RecordingSet::default(), pending.clone());

    left.start_animation(&mut graph, FacadeId::Scale).unwrap();
    right.start_animation(&mut graph, FacadeId::Rotation).unwrap();
    assert_eq!(pending.get(), 2);
    graph.clear_layout_flags(element, LayoutFlags::TRANSFORM_DIRTY).unwrap();

    left.on_vector3_changed(&mut graph, 0, [2.0, 2.0, 1.0]).unwrap();
    assert_eq!(
        graph.get_value(element, props.animated(FacadeId::Scale)),
        &Value::Vector3([2.0, 2.0, 1.0])
    );
    assert_eq!(graph.get_value(element, props.value(FacadeId::Scale)), &Value::Vector3([1.0; 3]));
    assert!(graph.layout_flags(element).contains(LayoutFlags::TRANSFORM_DIRTY));
    assert_eq!(pending.get(), 1);

    right.on_reference_changed(&mut graph, 0).unwrap();
    assert!(pending.is_drained());
    right.on_scalar_changed(&mut graph, 0, 30.0).unwrap();
    assert!(pending.is_drained());
    assert_eq!(graph.get_value(other, props.animated(FacadeId::Rotation)), &Value::Float(30.0));
}

#[test]
fn mismatched_shapes_are_ignored() {
    let (mut graph, element, props) = setup();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());
    bridge.start_animation(&mut graph, FacadeId::Rotation).unwrap();

    bridge.on_vector4_changed(&mut graph, 0, [1.0; 4]).unwrap();
    bridge.on_boolean_changed(&mut graph, 0, true).unwrap();
    bridge.on_scalar_changed(&mut graph, 7, 12.0).unwrap();
    assert_eq!(graph.get_value(element, props.animated(FacadeId::Rotation)), &Value::Float(0.0));
}

#[test]
fn completing_on_a_closed_object_is_not_an_error() {
    let (mut graph, element, props) = setup();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());
    bridge.start_animation(&mut graph, FacadeId::Translation).unwrap();
    bridge.property_set_mut().fail_with = Some(CompositionError::Closed);

    assert_eq!(bridge.complete_animation(FacadeId::Translation), Ok(()));
    assert!(!bridge.is_animating(FacadeId::Translation));
}

#[test]
fn other_completion_failures_propagate() {
    let (mut graph, element, props) = setup();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());
    bridge.start_animation(&mut graph, FacadeId::Scale).unwrap();
    bridge.property_set_mut().fail_with = Some(CompositionError::Failed("device lost"));

    assert_eq!(
        bridge.complete_animation(FacadeId::Scale),
        Err(FacadeError::Composition(CompositionError::Failed("device lost")))
    );
}

#[test]
fn pull_reads_the_composition_value() {
    let (mut graph, element, props) = setup();
    let mut bridge = FacadeBridge::new(element, props, RecordingSet::default(), PendingFacadeChanges::new());

    assert_eq!(
        bridge.pull_facade_value(&graph, FacadeId::RotationAxis).unwrap(),
        Value::Vector3([0.0, 0.0, 1.0])
    );

    bridge.start_animation(&mut graph, FacadeId::CenterPoint).unwrap();
    bridge
        .property_set_mut()
        .insert("CenterPoint", FacadeValue::Vector3([8.0, 8.0, 0.0]))
        .unwrap();
    assert_eq!(
        bridge.pull_facade_value(&graph, FacadeId::CenterPoint).unwrap(),
        Value::Vector3([8.0, 8.0, 0.0])
    );

    bridge.on_vector3_changed(&mut graph, 0, [6.0, 6.0, 0.0]).unwrap();
    bridge.property_set_mut().fail_with = Some(CompositionError::Closed);
    assert_eq!(
        bridge.pull_facade_value(&graph, FacadeId::CenterPoint).unwrap(),
        Value::Vector3([6.0, 6.0, 0.0])
    );
}
