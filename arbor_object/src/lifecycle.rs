// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree structure and live-tree membership.

use arbor_property::{Capabilities, ObjectId, Theme, builtin};
use smallvec::SmallVec;
use tracing::debug;

use crate::class::{EnterParams, LeaveParams};
use crate::error::{ObjectError, ObjectResult};
use crate::graph::ObjectGraph;
use crate::object::ObjectFlags;

impl ObjectGraph {
    /// Parent of `id` in the visual tree.
    #[must_use]
    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.try_data(id)?.parent
    }

    /// Children of `id` in order; empty for a stale handle.
    #[must_use]
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.try_data(id).map_or(&[], |d| &d.children)
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// The collection takes a reference to `child`. If `parent` is live,
    /// `child` enters the live tree.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> ObjectResult<()> {
        self.data(parent)?;
        if self.data(child)?.parent.is_some() || self.roots.contains(&child) {
            return Err(ObjectError::AlreadyParented(child));
        }
        self.data_mut(parent)?.children.push(child);
        self.data_mut(child)?.parent = Some(parent);
        self.add_ref(child)?;
        if self.is_live(parent) {
            self.enter(child, EnterParams::live())?;
        }
        for holder in self.light_holders(parent) {
            self.refresh_light_targets(holder)?;
        }
        self.invalidate_measure(child)?;
        Ok(())
    }

    /// Removes `child` from `parent`'s children and drops the collection's
    /// reference.
    pub fn remove_child(&mut self, parent: ObjectId, child: ObjectId) -> ObjectResult<()> {
        let position = self
            .data(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(ObjectError::NotAChild { parent, child })?;
        let holders = self.light_holders(parent);
        if self.is_live(child) {
            self.leave(child, LeaveParams::live())?;
        }
        self.data_mut(parent)?.children.remove(position);
        if let Some(data) = self.try_data_mut(child) {
            data.parent = None;
        }
        for holder in holders {
            self.refresh_light_targets(holder)?;
        }
        self.prune_viewport_contributors(Some(parent))?;
        self.invalidate_measure(parent)?;
        self.release(child)?;
        Ok(())
    }

    /// Makes `id` a root of the live tree.
    pub fn attach_root(&mut self, id: ObjectId) -> ObjectResult<()> {
        if self.data(id)?.parent.is_some() || self.roots.contains(&id) {
            return Err(ObjectError::AlreadyParented(id));
        }
        self.roots.push(id);
        self.enter(id, EnterParams::live())
    }

    /// Detaches the root `id` from the live tree.
    pub fn detach_root(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data(id)?;
        self.roots.retain(|r| *r != id);
        self.leave(id, LeaveParams::live())
    }

    /// Live roots in attach order.
    #[must_use]
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Returns `true` if `id` is a live UI element reached by the visual
    /// tree walk.
    pub(crate) fn is_in_visual_tree(&self, id: ObjectId) -> bool {
        let Some(data) = self.try_data(id) else {
            return false;
        };
        data.is_live()
            && self.table().has_capability(data.type_index, Capabilities::UI_ELEMENT)
            && (data.parent.is_some() || self.roots.contains(&id))
    }

    /// The theme `id` requests for its subtree, if its type honors one.
    pub(crate) fn requested_theme(&self, id: ObjectId) -> Theme {
        if !self.has_capability(id, Capabilities::THEME_OVERRIDE) {
            return Theme::None;
        }
        self.try_get_value(id, builtin::REQUESTED_THEME)
            .and_then(Theme::from_value)
            .unwrap_or_default()
    }

    /// Theme `id` takes when it goes live.
    fn resolve_theme(&self, id: ObjectId) -> Theme {
        let requested = self.requested_theme(id);
        if !requested.is_none() {
            return requested;
        }
        if let Some(parent_theme) = self.parent(id).and_then(|p| self.theme(p)) {
            if !parent_theme.is_none() {
                return parent_theme;
            }
        }
        if !self.ambient_theme.is_none() {
            return self.ambient_theme;
        }
        self.config.app_theme
    }

    /// Objects held by owning properties of `id` that no visual parent owns.
    fn property_held_objects(&self, id: ObjectId) -> ObjectResult<SmallVec<[ObjectId; 8]>> {
        let table = self.table();
        let mut held = SmallVec::new();
        self.data(id)?.for_each_object_value(table, |index, target| {
            if !table.get_descriptor(index).is_back_reference() {
                held.push(target);
            }
        });
        held.retain(|target| self.parent(*target).is_none() && !self.roots.contains(target));
        Ok(held)
    }

    /// Base enter behavior.
    ///
    /// With `is_live`, marks the object live, applies its theme, refreshes
    /// its theme resource bindings, registers light targets, and recurses
    /// into children and property-held objects. Entering a live object is a
    /// no-op.
    pub fn enter_core(&mut self, id: ObjectId, params: EnterParams) -> ObjectResult<()> {
        if !params.is_live {
            let children: SmallVec<[ObjectId; 8]> = self.children(id).iter().copied().collect();
            for child in children {
                self.enter(child, params)?;
            }
            return Ok(());
        }
        if self.data(id)?.is_live() {
            return Ok(());
        }

        let theme = self.resolve_theme(id);
        let data = self.data_mut(id)?;
        data.flags.insert(ObjectFlags::LIVE);
        if data.theme != theme {
            data.theme = theme;
            debug!(%id, ?theme, "entered live tree");
        }

        self.with_ambient_theme(theme, |graph| {
            graph.update_all_theme_references(id)?;
            graph.register_light_targets(id)?;
            let children: SmallVec<[ObjectId; 8]> = graph.children(id).iter().copied().collect();
            for child in children {
                graph.enter(child, params)?;
            }
            for target in graph.property_held_objects(id)? {
                if graph.is_live(target) {
                    graph.notify_theme_changed(target, theme, false)?;
                } else {
                    graph.enter(target, params)?;
                }
            }
            Ok(())
        })
    }

    /// Base leave behavior.
    ///
    /// With `is_live`, clears the live flag, unregisters light targets,
    /// recurses into children and property-held objects, and resets the
    /// cached theme so the next enter resolves it again.
    pub fn leave_core(&mut self, id: ObjectId, params: LeaveParams) -> ObjectResult<()> {
        if params.is_live {
            let data = self.data_mut(id)?;
            if !data.is_live() {
                return Ok(());
            }
            data.flags.remove(ObjectFlags::LIVE);
            self.unregister_light_targets(id);
        }

        let children: SmallVec<[ObjectId; 8]> = self.children(id).iter().copied().collect();
        for child in children {
            self.leave(child, params)?;
        }
        if params.is_live {
            for target in self.property_held_objects(id)? {
                if self.is_live(target) {
                    self.leave(target, params)?;
                }
            }
            self.data_mut(id)?.theme = Theme::None;
            debug!(%id, "left live tree");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use arbor_property::{PropertyBuilder, PropertyTableBuilder, TypeIndex, Value, ValueKind};

    use super::*;

    #[test]
    fn enter_and_leave_follow_the_tree() {
        let mut b = PropertyTableBuilder::new();
        let content = b.register_property(PropertyBuilder::new(
            "Content",
            TypeIndex::FRAMEWORK_ELEMENT,
            ValueKind::Object,
        ));
        let mut graph = ObjectGraph::new(Arc::new(b.build()));
        let root = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let child = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let held = graph.create(TypeIndex::DEPENDENCY_OBJECT);
        graph.add_child(root, child).unwrap();
        graph.set_value(child, content, Value::Object(held)).unwrap();

        graph.attach_root(root).unwrap();
        assert!(graph.is_live(child));
        assert!(graph.is_live(held));
        assert_eq!(graph.theme(child), Some(Theme::Light));
        assert_eq!(graph.theme(held), Some(Theme::Light));

        graph.detach_root(root).unwrap();
        assert!(!graph.is_live(child));
        assert!(!graph.is_live(held));
        assert_eq!(graph.theme(child), Some(Theme::None));
    }

    #[test]
    fn requested_theme_overrides_parent() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let root = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let dark = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let leaf = graph.create(TypeIndex::UI_ELEMENT);
        graph
            .set_value(dark, builtin::REQUESTED_THEME, Theme::Dark.to_value())
            .unwrap();
        graph.add_child(root, dark).unwrap();
        graph.add_child(dark, leaf).unwrap();
        graph.attach_root(root).unwrap();
        assert_eq!(graph.theme(root), Some(Theme::Light));
        assert_eq!(graph.theme(dark), Some(Theme::Dark));
        assert_eq!(graph.theme(leaf), Some(Theme::Dark));
    }

    #[test]
    fn add_child_rejects_second_parent() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let a = graph.create(TypeIndex::UI_ELEMENT);
        let b = graph.create(TypeIndex::UI_ELEMENT);
        let c = graph.create(TypeIndex::UI_ELEMENT);
        graph.add_child(a, c).unwrap();
        assert_eq!(graph.add_child(b, c), Err(ObjectError::AlreadyParented(c)));
        assert_eq!(
            graph.remove_child(b, c),
            Err(ObjectError::NotAChild { parent: b, child: c })
        );
    }

    #[test]
    fn remove_child_drops_the_collection_reference() {
        let mut graph = ObjectGraph::new(Arc::new(PropertyTableBuilder::new().build()));
        let parent = graph.create(TypeIndex::UI_ELEMENT);
        let child = graph.create(TypeIndex::UI_ELEMENT);
        graph.add_child(parent, child).unwrap();
        assert_eq!(graph.ref_count(child), Some(2));
        graph.attach_root(parent).unwrap();
        graph.remove_child(parent, child).unwrap();
        assert!(!graph.is_live(child));
        assert_eq!(graph.parent(child), None);
        assert_eq!(graph.ref_count(child), Some(1));
        assert!(graph.children(parent).is_empty());
    }
}
