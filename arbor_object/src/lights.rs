// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The light target index.
//!
//! A composition light attached to an element through the built-in `Lights`
//! property targets that element while it is live. The graph keeps a
//! non-owning index from each light to its targets; entries are added on
//! enter and removed on leave, so nothing outlives the live tree. Adding or
//! removing a light in a held collection re-indexes the elements holding it.

use arbor_property::{Capabilities, ObjectId, Value, builtin};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::ObjectResult;
use crate::graph::ObjectGraph;

impl ObjectGraph {
    /// Live elements targeted by `light`.
    #[must_use]
    pub fn light_targets(&self, light: ObjectId) -> &[ObjectId] {
        self.light_targets.get(&light).map_or(&[], |targets| targets)
    }

    /// Number of lights with at least one live target.
    #[must_use]
    pub fn active_light_count(&self) -> usize {
        self.light_targets.len()
    }

    /// Lights attached to `id`: the children of the object in `Lights`, or
    /// that object itself when it has none.
    fn attached_lights(&self, id: ObjectId) -> SmallVec<[ObjectId; 4]> {
        let Some(Value::Object(lights)) = self.try_get_value(id, builtin::LIGHTS) else {
            return SmallVec::new();
        };
        let children = self.children(*lights);
        if children.is_empty() {
            SmallVec::from_slice(&[*lights])
        } else {
            SmallVec::from_slice(children)
        }
    }

    pub(crate) fn register_light_targets(&mut self, id: ObjectId) -> ObjectResult<()> {
        let ty = self.data(id)?.type_index;
        if !self.table().has_capability(ty, Capabilities::LIGHT_TARGET) {
            return Ok(());
        }
        for light in self.attached_lights(id) {
            let targets = self.light_targets.entry(light).or_default();
            if !targets.contains(&id) {
                targets.push(id);
                trace!(%light, target = %id, "light target registered");
            }
        }
        Ok(())
    }

    pub(crate) fn unregister_light_targets(&mut self, id: ObjectId) {
        self.light_targets.retain(|light, targets| {
            if let Some(position) = targets.iter().position(|t| *t == id) {
                targets.swap_remove(position);
                trace!(%light, target = %id, "light target unregistered");
            }
            !targets.is_empty()
        });
    }

    /// Live elements indexed against `collection` or one of its children.
    pub(crate) fn light_holders(&self, collection: ObjectId) -> SmallVec<[ObjectId; 4]> {
        let mut holders = SmallVec::new();
        if self.light_targets.is_empty() {
            return holders;
        }
        let lights = core::iter::once(&collection).chain(self.children(collection));
        for target in lights.flat_map(|light| self.light_targets(*light)) {
            if !holders.contains(target) {
                holders.push(*target);
            }
        }
        holders
    }

    pub(crate) fn refresh_light_targets(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.unregister_light_targets(id);
        self.register_light_targets(id)
    }

    /// Drops every index entry mentioning a destroyed object.
    pub(crate) fn forget_light(&mut self, id: ObjectId) {
        self.light_targets.remove(&id);
        self.unregister_light_targets(id);
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use arbor_property::{PropertyTableBuilder, TypeIndex};

    use super::*;

    #[test]
    fn targets_follow_enter_and_leave() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let root = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let element = graph.create(TypeIndex::UI_ELEMENT);
        let light = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        graph.add_child(root, element).unwrap();
        graph.set_value(element, builtin::LIGHTS, Value::Object(light)).unwrap();
        assert_eq!(graph.active_light_count(), 0);

        graph.attach_root(root).unwrap();
        assert_eq!(graph.light_targets(light), &[element]);

        graph.detach_root(root).unwrap();
        assert!(graph.light_targets(light).is_empty());
        assert_eq!(graph.active_light_count(), 0);
    }

    #[test]
    fn changing_lights_while_live_moves_the_target() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let element = graph.create(TypeIndex::UI_ELEMENT);
        let collection = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        let first = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        let second = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        graph.add_child(collection, first).unwrap();
        graph.add_child(collection, second).unwrap();
        graph.attach_root(element).unwrap();

        graph.set_value(element, builtin::LIGHTS, Value::Object(collection)).unwrap();
        assert_eq!(graph.light_targets(first), &[element]);
        assert_eq!(graph.light_targets(second), &[element]);

        graph.clear_value(element, builtin::LIGHTS).unwrap();
        assert_eq!(graph.active_light_count(), 0);
    }

    #[test]
    fn lights_added_to_a_live_collection_are_indexed() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let element = graph.create(TypeIndex::UI_ELEMENT);
        let collection = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        let first = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        let second = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        graph.add_child(collection, first).unwrap();
        graph.set_value(element, builtin::LIGHTS, Value::Object(collection)).unwrap();
        graph.attach_root(element).unwrap();
        assert_eq!(graph.light_targets(first), &[element]);

        graph.add_child(collection, second).unwrap();
        assert_eq!(graph.light_targets(second), &[element]);

        graph.remove_child(collection, first).unwrap();
        assert!(graph.light_targets(first).is_empty());
        assert_eq!(graph.light_targets(second), &[element]);
        assert_eq!(graph.active_light_count(), 1);
    }
}
