// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-element bridge between facade properties and a property set.

use alloc::rc::Rc;
use core::cell::Cell;

use arbor_dirty::LayoutFlags;
use arbor_object::{ObjectError, ObjectGraph};
use arbor_property::{ObjectId, PropertyBuilder, PropertyIndex, PropertyTableBuilder, TypeIndex, Value};
use kurbo::{Affine, Vec2};
use peniko::Color;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::composition::{FacadeValue, PropertyChangeListener, PropertySet};
use crate::error::{CompositionError, FacadeError, FacadeResult};
use crate::facade::{FacadeId, FacadePropertyMap, MappingOutcome};

/// Static and `Animated*` shadow properties of every facade.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FacadeProperties {
    values: [PropertyIndex; 6],
    animated: [PropertyIndex; 6],
}

impl FacadeProperties {
    /// Registers both property families on `owner`.
    ///
    /// Static values invalidate the transform when written; shadow values
    /// are written by the bridge, which invalidates the transform itself.
    pub fn register(builder: &mut PropertyTableBuilder, owner: TypeIndex) -> Self {
        let values = FacadeId::ALL.map(|facade| {
            builder.register_property(
                PropertyBuilder::new(facade.name(), owner, facade.value_kind())
                    .default_value(facade.default_value())
                    .animatable()
                    .affects(LayoutFlags::TRANSFORM_DIRTY),
            )
        });
        let animated = FacadeId::ALL.map(|facade| {
            builder.register_property(
                PropertyBuilder::new(facade.animated_name(), owner, facade.value_kind())
                    .default_value(facade.default_value()),
            )
        });
        Self { values, animated }
    }

    /// The static property of `facade`.
    #[must_use]
    pub fn value(&self, facade: FacadeId) -> PropertyIndex {
        self.values[slot(facade)]
    }

    /// The shadow property of `facade`.
    #[must_use]
    pub fn animated(&self, facade: FacadeId) -> PropertyIndex {
        self.animated[slot(facade)]
    }
}

fn slot(facade: FacadeId) -> usize {
    facade as usize
}

/// Count of composition notifications not yet delivered.
///
/// Shared by every bridge under one root; clones share the count. A host
/// that needs a settled transform waits for [`is_drained`](Self::is_drained).
///
/// The count is of expected notifications, not of running animations.
/// Starting an animation expects one; a host that knows an animation will
/// report more calls [`schedule`](Self::schedule) with the extra count.
#[derive(Clone, Debug, Default)]
pub struct PendingFacadeChanges(Rc<Cell<u32>>);

impl PendingFacadeChanges {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count.
    #[must_use]
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns `true` once every expected notification has arrived.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.0.get() == 0
    }

    /// Expects one more notification.
    pub fn increment(&self) {
        self.schedule(1);
    }

    /// Expects `count` more notifications.
    pub fn schedule(&self, count: u32) {
        self.0.set(self.0.get().saturating_add(count));
    }

    /// Records a delivered notification. Never goes below zero.
    pub fn decrement(&self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Bridges the facades of one element to a composition [`PropertySet`].
///
/// A facade is inserted into the set the first time it is animated or
/// pulled; its property ID is its insertion position.
#[derive(Debug)]
pub struct FacadeBridge<S> {
    element: ObjectId,
    properties: FacadeProperties,
    set: S,
    mapping: FacadePropertyMap,
    listening: SmallVec<[FacadeId; 6]>,
    pending: PendingFacadeChanges,
}

impl<S: PropertySet> FacadeBridge<S> {
    /// Creates a bridge for `element` over `set`.
    pub fn new(element: ObjectId, properties: FacadeProperties, set: S, pending: PendingFacadeChanges) -> Self {
        Self {
            element,
            properties,
            set,
            mapping: FacadePropertyMap::new(),
            listening: SmallVec::new(),
            pending,
        }
    }

    /// The bridged element.
    #[must_use]
    pub fn element(&self) -> ObjectId {
        self.element
    }

    /// The property set.
    #[must_use]
    pub fn property_set(&self) -> &S {
        &self.set
    }

    /// Mutable access to the property set.
    pub fn property_set_mut(&mut self) -> &mut S {
        &mut self.set
    }

    /// Insertion-ordered facade map.
    #[must_use]
    pub fn mapping(&self) -> &FacadePropertyMap {
        &self.mapping
    }

    /// Returns `true` while changes of `facade` are routed to this bridge.
    #[must_use]
    pub fn is_animating(&self, facade: FacadeId) -> bool {
        self.listening.contains(&facade)
    }

    /// Inserts the static value of `facade` into the set if it is not there
    /// yet, and returns its property ID.
    pub fn ensure_facade(&mut self, graph: &ObjectGraph, facade: FacadeId) -> FacadeResult<u32> {
        if let Some(id) = self.mapping.property_id(facade) {
            return Ok(id);
        }
        let current = self.read(graph, self.properties.value(facade))?;
        let value = FacadeValue::from_value(&current)
            .ok_or(FacadeError::Composition(CompositionError::Failed("facade value has no composition form")))?;
        self.set.insert(facade.name(), value)?;
        let outcome = self.mapping.establish_mapping_for_facade_id(facade);
        if let MappingOutcome::Mapped(id) = outcome {
            trace!(element = %self.element, %facade, id, "facade mapped");
        }
        Ok(outcome.property_id())
    }

    /// Starts routing composition changes of `facade` back into the graph.
    ///
    /// The shadow property is seeded with the static value so it reads
    /// correctly before the first notification arrives. Fails with
    /// [`FacadeError::NotAnimatable`] when the static property was registered
    /// without [`animatable`](PropertyBuilder::animatable).
    pub fn start_animation(&mut self, graph: &mut ObjectGraph, facade: FacadeId) -> FacadeResult<()> {
        if !graph.table().get_descriptor(self.properties.value(facade)).is_animatable() {
            return Err(FacadeError::NotAnimatable(facade));
        }
        let current = self.read(graph, self.properties.value(facade))?;
        graph.set_value(self.element, self.properties.animated(facade), current)?;
        let id = self.ensure_facade(graph, facade)?;
        if self.is_animating(facade) {
            return Ok(());
        }
        self.set.register_listener(id)?;
        self.listening.push(facade);
        self.pending.increment();
        debug!(element = %self.element, %facade, id, "facade animation started");
        Ok(())
    }

    /// Stops routing changes of `facade`.
    ///
    /// A closed composition object is not an error: the listener is gone
    /// either way.
    pub fn complete_animation(&mut self, facade: FacadeId) -> FacadeResult<()> {
        let Some(position) = self.listening.iter().position(|f| *f == facade) else {
            return Ok(());
        };
        self.listening.swap_remove(position);
        let Some(id) = self.mapping.property_id(facade) else {
            return Ok(());
        };
        match self.set.unregister_listener(id) {
            Ok(()) => Ok(()),
            Err(CompositionError::Closed) => {
                debug!(element = %self.element, %facade, "composition object closed; listener already gone");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reads the current composition value of `facade` synchronously.
    ///
    /// Falls back to the shadow property while animating, and to the static
    /// property otherwise, when the set has no value or is closed.
    pub fn pull_facade_value(&mut self, graph: &ObjectGraph, facade: FacadeId) -> FacadeResult<Value> {
        let fallback = if self.is_animating(facade) {
            self.properties.animated(facade)
        } else {
            self.properties.value(facade)
        };
        if self.mapping.property_id(facade).is_none() {
            return self.read(graph, fallback);
        }
        match self.set.try_get(facade.name()) {
            Ok(Some(value)) => match value.to_facade_value(facade) {
                Some(value) => Ok(value),
                None => self.read(graph, fallback),
            },
            Ok(None) => self.read(graph, fallback),
            Err(CompositionError::Closed) => {
                debug!(element = %self.element, %facade, "composition object closed; using last known value");
                self.read(graph, fallback)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn read(&self, graph: &ObjectGraph, property: PropertyIndex) -> FacadeResult<Value> {
        graph
            .try_get_value(self.element, property)
            .cloned()
            .ok_or(FacadeError::Object(ObjectError::StaleObject(self.element)))
    }

    /// Writes a notification into the shadow property, invalidates the
    /// transform, and counts the notification as delivered.
    fn deliver(&mut self, graph: &mut ObjectGraph, property_id: u32, value: Option<FacadeValue>) -> FacadeResult<()> {
        self.pending.decrement();
        let Some(facade) = self.mapping.facade(property_id) else {
            trace!(element = %self.element, property_id, "change for unmapped property");
            return Ok(());
        };
        if let Some(value) = value {
            let Some(value) = value.to_facade_value(facade) else {
                trace!(element = %self.element, %facade, "change shape does not fit facade");
                return Ok(());
            };
            graph.set_value(self.element, self.properties.animated(facade), value)?;
        }
        graph.invalidate_transform(self.element)?;
        Ok(())
    }
}

impl<S: PropertySet> PropertyChangeListener for FacadeBridge<S> {
    fn on_scalar_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: f32) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Scalar(value)))
    }

    fn on_vector2_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: Vec2) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Vector2(value)))
    }

    fn on_vector3_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 3],
    ) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Vector3(value)))
    }

    fn on_vector4_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 4],
    ) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Vector4(value)))
    }

    fn on_color_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: Color) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Color(value)))
    }

    fn on_matrix3x2_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: Affine,
    ) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Matrix3x2(value)))
    }

    fn on_matrix4x4_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 16],
    ) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Matrix4x4(value)))
    }

    fn on_boolean_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: bool) -> FacadeResult<()> {
        self.deliver(graph, property_id, Some(FacadeValue::Bool(value)))
    }

    fn on_reference_changed(&mut self, graph: &mut ObjectGraph, property_id: u32) -> FacadeResult<()> {
        self.deliver(graph, property_id, None)
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::*;

    #[test]
    fn pending_counter_saturates_and_is_shared() {
        let pending = PendingFacadeChanges::new();
        let other = pending.clone();
        pending.decrement();
        assert!(pending.is_drained());
        pending.increment();
        other.increment();
        assert_eq!(pending.get(), 2);
        other.decrement();
        other.decrement();
        other.decrement();
        assert!(pending.is_drained());
    }

    #[test]
    fn scheduled_notifications_keep_the_counter_up() {
        let pending = PendingFacadeChanges::new();
        pending.increment();
        pending.schedule(3);
        for _ in 0..3 {
            pending.decrement();
            assert!(!pending.is_drained());
        }
        pending.decrement();
        assert!(pending.is_drained());
        pending.schedule(u32::MAX);
        pending.schedule(2);
        assert_eq!(pending.get(), u32::MAX);
    }

    /// Accepts every call and stores nothing.
    #[derive(Debug, Default)]
    struct NullSet;

    impl PropertySet for NullSet {
        fn insert(&mut self, _name: &str, _value: FacadeValue) -> Result<(), CompositionError> {
            Ok(())
        }

        fn try_get(&self, _name: &str) -> Result<Option<FacadeValue>, CompositionError> {
            Ok(None)
        }

        fn register_listener(&mut self, _property_id: u32) -> Result<(), CompositionError> {
            Ok(())
        }

        fn unregister_listener(&mut self, _property_id: u32) -> Result<(), CompositionError> {
            Ok(())
        }
    }

    #[test]
    fn animation_requires_an_animatable_property() {
        let mut builder = PropertyTableBuilder::new();
        let mut register = |facade: FacadeId, name: &'static str| {
            builder.register_property(
                PropertyBuilder::new(name, TypeIndex::UI_ELEMENT, facade.value_kind())
                    .default_value(facade.default_value()),
            )
        };
        let values = FacadeId::ALL.map(|facade| register(facade, facade.name()));
        let animated = FacadeId::ALL.map(|facade| register(facade, facade.animated_name()));
        let props = FacadeProperties { values, animated };
        let mut graph = ObjectGraph::new(Arc::new(builder.build()));
        let element = graph.create(TypeIndex::UI_ELEMENT);
        let pending = PendingFacadeChanges::new();
        let mut bridge = FacadeBridge::new(element, props, NullSet, pending.clone());

        let err = bridge.start_animation(&mut graph, FacadeId::Scale).unwrap_err();
        assert_eq!(err, FacadeError::NotAnimatable(FacadeId::Scale));
        assert!(!bridge.is_animating(FacadeId::Scale));
        assert!(bridge.mapping().property_id(FacadeId::Scale).is_none());
        assert!(pending.is_drained());
    }

    #[test]
    fn properties_register_both_families() {
        let mut builder = PropertyTableBuilder::new();
        let props = FacadeProperties::register(&mut builder, TypeIndex::UI_ELEMENT);
        let table = builder.build();
        let scale = table.get_descriptor(props.value(FacadeId::Scale));
        assert_eq!(scale.name(), "Scale");
        assert_eq!(scale.default_value(), &Value::Vector3([1.0; 3]));
        assert_eq!(scale.affects(), LayoutFlags::TRANSFORM_DIRTY);
        let animated = table.get_descriptor(props.animated(FacadeId::Rotation));
        assert_eq!(animated.name(), "AnimatedRotation");
        assert!(animated.affects().is_empty());
    }
}
