// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The object graph: an arena of dependency objects addressed by
//! generational [`ObjectId`] handles.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::{fmt, mem};

use arbor_dirty::{FramePacer, FrameScheduler};
use arbor_property::{
    BoxedObjects, Capabilities, GroupId, ObjectId, PropertyDescriptor, PropertyIndex,
    PropertyTable, Storage, Theme, TypeIndex, Value, ValueObject, ValueObjectPool, builtin,
    ensure_unboxed, is_assignable,
};
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::class::{BaseClass, EnterParams, LeaveParams, ObjectClass, PropertyChange};
use crate::error::{ObjectError, ObjectResult};
use crate::object::{ObjectData, ObjectFlags};
use crate::resources::{
    BaseValueSource, DictionaryResolver, ResourceDictionary, ResourceResolver,
    ThemeResourceBinding,
};

/// How automation peer invalidation marks ancestors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AutomationPeerPropagation {
    /// Every ancestor on the path is also marked automation-peer dirty.
    #[default]
    MarkAncestorsDirty,
    /// Ancestors only receive the on-path marker.
    PathOnly,
}

/// Behavior switches for an [`ObjectGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    /// Ancestor marking for automation peer invalidation.
    pub automation_peer: AutomationPeerPropagation,
    /// Arrange invalidation stops at layout-suspended ancestors.
    pub arrange_stops_at_suspended: bool,
    /// Resource lookups consult element dictionaries, not only the
    /// application dictionary.
    pub honor_resource_overrides: bool,
    /// Theme of live roots that request none.
    pub app_theme: Theme,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            automation_peer: AutomationPeerPropagation::default(),
            arrange_stops_at_suspended: true,
            honor_resource_overrides: true,
            app_theme: Theme::Light,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<ObjectData>,
}

/// An arena of dependency objects.
///
/// The graph owns every object, the per-type [`ObjectClass`] hooks, the
/// resource resolver, and the frame pacing state. It is single-threaded:
/// all reads, writes, and walks happen on the thread that owns it.
///
/// Objects are reference counted. [`create`](Self::create) returns a handle
/// holding one reference; children and object values of owning properties
/// hold one more each. [`release`](Self::release) destroys an object when
/// its count reaches zero.
pub struct ObjectGraph {
    table: Arc<PropertyTable>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live_count: usize,
    classes: HashMap<TypeIndex, Rc<dyn ObjectClass>>,
    base_class: Rc<dyn ObjectClass>,
    resolver: Rc<dyn ResourceResolver>,
    pub(crate) scheduler: Option<Box<dyn FrameScheduler>>,
    pub(crate) pacer: FramePacer,
    pub(crate) config: GraphConfig,
    pub(crate) roots: SmallVec<[ObjectId; 1]>,
    pub(crate) ambient_theme: Theme,
    pub(crate) theme_walk_depth: u32,
    pub(crate) light_targets: HashMap<ObjectId, SmallVec<[ObjectId; 4]>>,
    value_objects: ValueObjectPool,
    app_resources: ResourceDictionary,
}

impl ObjectGraph {
    /// Creates an empty graph over `table` with the default configuration.
    #[must_use]
    pub fn new(table: Arc<PropertyTable>) -> Self {
        Self::with_config(table, GraphConfig::default())
    }

    /// Creates an empty graph with an explicit configuration.
    #[must_use]
    pub fn with_config(table: Arc<PropertyTable>, config: GraphConfig) -> Self {
        Self {
            table,
            slots: Vec::new(),
            free: Vec::new(),
            live_count: 0,
            classes: HashMap::new(),
            base_class: Rc::new(BaseClass),
            resolver: Rc::new(DictionaryResolver),
            scheduler: None,
            pacer: FramePacer::new(),
            config,
            roots: SmallVec::new(),
            ambient_theme: Theme::None,
            theme_walk_depth: 0,
            light_targets: HashMap::new(),
            value_objects: ValueObjectPool::new(),
            app_resources: ResourceDictionary::new(),
        }
    }

    /// The property table.
    #[must_use]
    pub fn table(&self) -> &Arc<PropertyTable> {
        &self.table
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Installs behavior hooks for `type_index` and types deriving from it
    /// that have no class of their own.
    pub fn register_class(&mut self, type_index: TypeIndex, class: impl ObjectClass + 'static) {
        self.classes.insert(type_index, Rc::new(class));
    }

    /// Replaces the resource resolver.
    pub fn set_resolver(&mut self, resolver: impl ResourceResolver + 'static) {
        self.resolver = Rc::new(resolver);
    }

    pub(crate) fn resolver(&self) -> Rc<dyn ResourceResolver> {
        Rc::clone(&self.resolver)
    }

    /// Application-level resources, consulted after element dictionaries.
    #[must_use]
    pub fn app_resources(&self) -> &ResourceDictionary {
        &self.app_resources
    }

    /// Mutable access to application-level resources.
    pub fn app_resources_mut(&mut self) -> &mut ResourceDictionary {
        &mut self.app_resources
    }

    /// Sets the resource dictionary of `id`.
    pub fn set_resources(&mut self, id: ObjectId, resources: ResourceDictionary) -> ObjectResult<()> {
        self.data_mut(id)?.resources = Some(Box::new(resources));
        Ok(())
    }

    /// The resource dictionary of `id`, if it has one.
    #[must_use]
    pub fn resources(&self, id: ObjectId) -> Option<&ResourceDictionary> {
        self.try_data(id)?.resources.as_deref()
    }

    // --- arena ---

    /// Creates an object of `type_index` holding one reference.
    ///
    /// Inline storage starts as a copy of the type's defaults; sparse and
    /// group storage are not allocated.
    ///
    /// # Panics
    ///
    /// Panics if `type_index` is not registered in the table.
    #[track_caller]
    pub fn create(&mut self, type_index: TypeIndex) -> ObjectId {
        let inline: Box<[Value]> = self.table.type_info(type_index).inline_defaults().into();
        let data = ObjectData::new(type_index, inline);
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(data);
            return ObjectId::new(index, slot.generation);
        }
        assert!(self.slots.len() < u32::MAX as usize, "object graph is full");
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            object: Some(data),
        });
        ObjectId::new(index, 1)
    }

    /// Creates an object of a boxed primitive type carrying `payload`.
    ///
    /// # Panics
    ///
    /// Panics if `type_index` does not have [`Capabilities::BOXED_VALUE`].
    #[track_caller]
    pub fn create_boxed(&mut self, type_index: TypeIndex, payload: Value) -> ObjectResult<ObjectId> {
        assert!(
            self.table.has_capability(type_index, Capabilities::BOXED_VALUE),
            "{type_index:?} is not a boxed type"
        );
        let id = self.create(type_index);
        self.set_value(id, builtin::BOXED_VALUE, payload)?;
        Ok(id)
    }

    /// Interns a value object in the graph's flyweight pool.
    pub fn intern_value_object(&mut self, value: ValueObject) -> Value {
        Value::ValueObject(self.value_objects.intern(value))
    }

    /// Drops pooled value objects that are no longer referenced.
    pub fn purge_value_objects(&mut self) -> usize {
        self.value_objects.purge_unused()
    }

    /// Unboxes `value` against this graph's boxed objects.
    #[must_use]
    pub fn unbox(&self, value: &Value) -> Value {
        ensure_unboxed(value, self)
    }

    /// Returns `true` if `id` refers to an existing object.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.try_data(id).is_some()
    }

    /// Number of existing objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns `true` if the graph holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Type of `id`.
    #[must_use]
    pub fn type_of(&self, id: ObjectId) -> Option<TypeIndex> {
        self.try_data(id).map(|d| d.type_index)
    }

    /// Returns `true` if the type of `id` has every capability in `caps`.
    #[must_use]
    pub fn has_capability(&self, id: ObjectId, caps: Capabilities) -> bool {
        self.type_of(id)
            .is_some_and(|ty| self.table.has_capability(ty, caps))
    }

    pub(crate) fn try_data(&self, id: ObjectId) -> Option<&ObjectData> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    pub(crate) fn try_data_mut(&mut self, id: ObjectId) -> Option<&mut ObjectData> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    pub(crate) fn data(&self, id: ObjectId) -> ObjectResult<&ObjectData> {
        self.try_data(id).ok_or(ObjectError::StaleObject(id))
    }

    pub(crate) fn data_mut(&mut self, id: ObjectId) -> ObjectResult<&mut ObjectData> {
        self.try_data_mut(id).ok_or(ObjectError::StaleObject(id))
    }

    /// Removes the object and retires its handle.
    fn take_slot(&mut self, id: ObjectId) -> Option<ObjectData> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let data = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live_count -= 1;
        Some(data)
    }

    // --- reference counting ---

    /// Adds a reference to `id`.
    pub fn add_ref(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        data.ref_count += 1;
        Ok(())
    }

    /// Current reference count of `id`.
    #[must_use]
    pub fn ref_count(&self, id: ObjectId) -> Option<u32> {
        self.try_data(id).map(|d| d.ref_count)
    }

    /// Drops a reference to `id`, destroying it when none remain.
    ///
    /// Destruction releases the object's children and every object held by
    /// an owning property, iteratively. Returns `true` if `id` was destroyed.
    pub fn release(&mut self, id: ObjectId) -> ObjectResult<bool> {
        let data = self.data_mut(id)?;
        debug_assert!(data.ref_count > 0, "{id} has no references to release");
        data.ref_count = data.ref_count.saturating_sub(1);
        if data.ref_count > 0 {
            return Ok(false);
        }

        let table = Arc::clone(&self.table);
        let mut doomed: Vec<ObjectId> = alloc::vec![id];
        while let Some(id) = doomed.pop() {
            let Some(data) = self.take_slot(id) else {
                continue;
            };
            trace!(%id, "object destroyed");
            self.forget_light(id);
            self.roots.retain(|r| *r != id);

            let mut owned: SmallVec<[ObjectId; 8]> = SmallVec::new();
            data.for_each_object_value(&table, |index, target| {
                if !table.get_descriptor(index).is_back_reference() {
                    owned.push(target);
                }
            });
            for child in &data.children {
                if let Some(child_data) = self.try_data_mut(*child) {
                    child_data.parent = None;
                }
            }
            for target in data.children.iter().chain(owned.iter()) {
                if let Some(target_data) = self.try_data_mut(*target) {
                    target_data.ref_count = target_data.ref_count.saturating_sub(1);
                    if target_data.ref_count == 0 {
                        doomed.push(*target);
                    }
                }
            }
        }
        Ok(true)
    }

    // --- class dispatch ---

    pub(crate) fn class_for(&self, id: ObjectId) -> ObjectResult<Rc<dyn ObjectClass>> {
        let mut current = Some(self.data(id)?.type_index);
        while let Some(ty) = current {
            if let Some(class) = self.classes.get(&ty) {
                return Ok(Rc::clone(class));
            }
            current = self.table.type_info(ty).base();
        }
        Ok(Rc::clone(&self.base_class))
    }

    /// Runs the enter hook of `id`'s class.
    pub fn enter(&mut self, id: ObjectId, params: EnterParams) -> ObjectResult<()> {
        let class = self.class_for(id)?;
        class.enter(self, id, params)
    }

    /// Runs the leave hook of `id`'s class.
    pub fn leave(&mut self, id: ObjectId, params: LeaveParams) -> ObjectResult<()> {
        let class = self.class_for(id)?;
        class.leave(self, id, params)
    }

    // --- property access ---

    /// Returns the effective value of `property` on `id`.
    ///
    /// Reads the inline slot, the group block, or the sparse table, falling
    /// back to the descriptor default. Never allocates.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not exist or `property` is out of range.
    #[must_use]
    #[track_caller]
    pub fn get_value(&self, id: ObjectId, property: PropertyIndex) -> &Value {
        match self.try_get_value(id, property) {
            Some(value) => value,
            None => panic!("{id} does not exist"),
        }
    }

    /// Like [`get_value`](Self::get_value), returning `None` for a stale handle.
    #[must_use]
    pub fn try_get_value(&self, id: ObjectId, property: PropertyIndex) -> Option<&Value> {
        let data = self.try_data(id)?;
        let descriptor = self.table.get_descriptor(property);
        Some(read_storage(&self.table, data, descriptor))
    }

    /// Sets a local value.
    ///
    /// A [`Value::ThemeResource`] value creates a theme resource binding.
    /// Any other value clears an existing binding on the property.
    pub fn set_value(&mut self, id: ObjectId, property: PropertyIndex, value: Value) -> ObjectResult<()> {
        self.set_value_with_source(id, property, value, BaseValueSource::Local)
    }

    /// Sets a value, recording `source` on any theme resource binding it
    /// creates.
    pub fn set_value_with_source(
        &mut self,
        id: ObjectId,
        property: PropertyIndex,
        value: Value,
        source: BaseValueSource,
    ) -> ObjectResult<()> {
        if let Value::ThemeResource(reference) = &value {
            let binding = ThemeResourceBinding::new(Arc::clone(&reference.key)).with_source(source);
            return self.set_theme_resource_binding(id, property, None, binding, source);
        }
        self.set_value_core(id, property, value, true)
    }

    /// Drops the local value and any theme resource binding of `property`.
    pub fn clear_value(&mut self, id: ObjectId, property: PropertyIndex) -> ObjectResult<()> {
        let default = self.table.get_descriptor(property).default_value().clone();
        self.set_value_core(id, property, default, true)
    }

    /// Writes storage and runs change side effects.
    pub(crate) fn set_value_core(
        &mut self,
        id: ObjectId,
        property: PropertyIndex,
        value: Value,
        clear_binding: bool,
    ) -> ObjectResult<()> {
        let table = Arc::clone(&self.table);
        let descriptor = table.get_descriptor(property);
        if !is_assignable(descriptor, &value) {
            return Err(ObjectError::NotAssignable {
                property,
                name: descriptor.name(),
                kind: value.kind(),
            });
        }
        if let Value::Object(target) = value {
            self.data(target)?;
        }
        let data = self.data_mut(id)?;
        if data.flags.contains(ObjectFlags::FROZEN) {
            return Err(ObjectError::Frozen {
                object: id,
                property,
            });
        }
        if clear_binding && data.take_theme_ref(property).is_some() {
            trace!(%id, property = descriptor.name(), "theme resource binding cleared by local value");
        }
        let old = write_storage(&table, data, descriptor, value.clone());
        if old == value {
            return Ok(());
        }
        let is_live = data.is_live();

        let owning = !descriptor.is_back_reference();
        if owning {
            if let Value::Object(target) = value {
                self.add_ref(target)?;
            }
        }
        let effects = self.run_change_effects(id, descriptor, is_live, owning, &old, &value);
        // The previous value is released even when a side effect failed.
        let released = match old {
            Value::Object(previous) if owning => self.release(previous).map(drop),
            _ => Ok(()),
        };
        effects.and(released)
    }

    /// Attaches and detaches held objects, invalidates layout, and runs the
    /// class hook for a stored change.
    fn run_change_effects(
        &mut self,
        id: ObjectId,
        descriptor: &PropertyDescriptor,
        is_live: bool,
        owning: bool,
        old: &Value,
        value: &Value,
    ) -> ObjectResult<()> {
        let property = descriptor.index();
        if owning && is_live {
            if let Value::Object(target) = *value {
                self.attach_property_value(id, target)?;
            }
            if let Value::Object(previous) = *old {
                self.detach_property_value(previous)?;
            }
        }

        descriptor.notify_changed(id, old, value);
        self.invalidate_for(id, descriptor.affects())?;
        if is_live {
            if property == builtin::LIGHTS {
                self.refresh_light_targets(id)?;
            } else if property == builtin::REQUESTED_THEME {
                self.requested_theme_changed(id)?;
            }
        }
        let class = self.class_for(id)?;
        class.property_changed(
            self,
            id,
            &PropertyChange {
                property,
                old,
                new: value,
            },
        )
    }

    /// Brings an object newly held by a live owner up to date.
    fn attach_property_value(&mut self, owner: ObjectId, target: ObjectId) -> ObjectResult<()> {
        let theme = self.contextual_theme(owner);
        let target_data = self.data(target)?;
        if target_data.is_live() {
            self.notify_theme_changed(target, theme, false)?;
        } else if target_data.parent.is_none() {
            self.with_ambient_theme(theme, |graph| graph.enter(target, EnterParams::live()))?;
        }
        Ok(())
    }

    /// Detaches an object no longer held by a live owner.
    fn detach_property_value(&mut self, target: ObjectId) -> ObjectResult<()> {
        let Some(target_data) = self.try_data(target) else {
            return Ok(());
        };
        if target_data.is_live() && target_data.parent.is_none() && !self.roots.contains(&target) {
            self.leave(target, LeaveParams::live())?;
        }
        Ok(())
    }

    /// Prevents local writes to `id`.
    pub fn freeze(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?.flags.insert(ObjectFlags::FROZEN);
        Ok(())
    }

    /// Returns `true` if `id` is frozen.
    #[must_use]
    pub fn is_frozen(&self, id: ObjectId) -> bool {
        self.try_data(id)
            .is_some_and(|d| d.flags.contains(ObjectFlags::FROZEN))
    }

    /// Runs `f` with `id` transiently unfrozen.
    pub(crate) fn with_unfrozen<R>(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut Self) -> ObjectResult<R>,
    ) -> ObjectResult<R> {
        let data = self.data_mut(id)?;
        let was_frozen = data.flags.contains(ObjectFlags::FROZEN);
        data.flags.remove(ObjectFlags::FROZEN);
        let result = f(self);
        if was_frozen {
            if let Some(data) = self.try_data_mut(id) {
                data.flags.insert(ObjectFlags::FROZEN);
            }
        }
        result
    }

    /// Lifecycle flags of `id`.
    #[must_use]
    pub fn flags(&self, id: ObjectId) -> Option<ObjectFlags> {
        self.try_data(id).map(|d| d.flags)
    }

    /// Returns `true` if `id` is part of the live tree.
    #[must_use]
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.try_data(id).is_some_and(ObjectData::is_live)
    }

    /// Resolved theme of `id`; [`Theme::None`] until it goes live.
    #[must_use]
    pub fn theme(&self, id: ObjectId) -> Option<Theme> {
        self.try_data(id).map(|d| d.theme)
    }

    /// The theme resource binding on `property`, if one is tracked.
    #[must_use]
    pub fn theme_binding(&self, id: ObjectId, property: PropertyIndex) -> Option<&ThemeResourceBinding> {
        self.try_data(id)?.theme_ref(property)
    }

    /// Returns `true` if `property` has an entry in the sparse table of `id`.
    #[must_use]
    pub fn has_sparse_entry(&self, id: ObjectId, property: PropertyIndex) -> bool {
        self.try_data(id)
            .and_then(|d| d.sparse.as_deref())
            .is_some_and(|s| s.contains(property))
    }

    /// Returns `true` if `id` has allocated the block of `group`.
    #[must_use]
    pub fn has_group_block(&self, id: ObjectId, group: GroupId) -> bool {
        self.try_data(id).is_some_and(|d| d.group(group).is_some())
    }
}

fn inline_slot_matches(
    table: &PropertyTable,
    data: &ObjectData,
    property: PropertyIndex,
    slot: u16,
) -> bool {
    table
        .type_info(data.type_index)
        .inline_properties()
        .get(usize::from(slot))
        == Some(&property)
}

/// Reads a property's storage. A property stored inline on another type
/// lives in the sparse table of this object.
fn read_storage<'a>(
    table: &PropertyTable,
    data: &'a ObjectData,
    descriptor: &'a PropertyDescriptor,
) -> &'a Value {
    match descriptor.storage() {
        Storage::Inline { slot } if inline_slot_matches(table, data, descriptor.index(), slot) => {
            &data.inline[usize::from(slot)]
        }
        Storage::Group { group, slot } => data
            .group(group)
            .map_or(descriptor.default_value(), |block| &block[usize::from(slot)]),
        _ => data
            .sparse
            .as_deref()
            .and_then(|sparse| sparse.get(descriptor.index()))
            .unwrap_or(descriptor.default_value()),
    }
}

/// Writes a property's storage and returns the previous effective value.
///
/// Writing the default never allocates a group block or a sparse entry, and
/// removes an existing sparse entry.
fn write_storage(
    table: &PropertyTable,
    data: &mut ObjectData,
    descriptor: &PropertyDescriptor,
    value: Value,
) -> Value {
    let property = descriptor.index();
    match descriptor.storage() {
        Storage::Inline { slot } if inline_slot_matches(table, data, property, slot) => {
            mem::replace(&mut data.inline[usize::from(slot)], value)
        }
        Storage::Group { group, slot } => {
            if let Some(block) = data.group_mut(group) {
                return mem::replace(&mut block[usize::from(slot)], value);
            }
            if value == *descriptor.default_value() {
                return value;
            }
            let mut block: Box<[Value]> = table.group(group).defaults().into();
            let old = mem::replace(&mut block[usize::from(slot)], value);
            data.groups.push((group, block));
            old
        }
        _ => {
            if value == *descriptor.default_value() {
                let Some(sparse) = data.sparse.as_mut() else {
                    return value;
                };
                let old = sparse.remove(property);
                if sparse.is_empty() {
                    data.sparse = None;
                }
                old.unwrap_or(value)
            } else {
                data.sparse
                    .get_or_insert_with(Box::default)
                    .set(property, value)
                    .unwrap_or_else(|| descriptor.default_value().clone())
            }
        }
    }
}

impl BoxedObjects for ObjectGraph {
    fn boxed_payload(&self, id: ObjectId) -> Option<(TypeIndex, &Value)> {
        let data = self.try_data(id)?;
        if !self.table.has_capability(data.type_index, Capabilities::BOXED_VALUE) {
            return None;
        }
        let payload = data.sparse.as_deref()?.get(builtin::BOXED_VALUE)?;
        Some((data.type_index, payload))
    }
}

impl fmt::Debug for ObjectGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectGraph")
            .field("objects", &self.live_count)
            .field("slots", &self.slots.len())
            .field("roots", &self.roots)
            .field("classes", &self.classes.len())
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .field("has_scheduler", &self.scheduler.is_some())
            .field("ambient_theme", &self.ambient_theme)
            .field("lights", &self.light_targets.len())
            .field("value_objects", &self.value_objects.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::cell::Cell;

    use arbor_property::{PropertyBuilder, PropertyTableBuilder, StorageKind, ValueKind};

    use super::*;

    struct Fixture {
        graph: ObjectGraph,
        width: PropertyIndex,
        tag: PropertyIndex,
        font_size: PropertyIndex,
        text: GroupId,
    }

    fn fixture() -> Fixture {
        let mut b = PropertyTableBuilder::new();
        let width = b.register_property(
            PropertyBuilder::new("Width", TypeIndex::FRAMEWORK_ELEMENT, ValueKind::Double)
                .inline()
                .default_value(Value::Double(100.0)),
        );
        let tag = b.register_property(PropertyBuilder::new(
            "Tag",
            TypeIndex::DEPENDENCY_OBJECT,
            ValueKind::Object,
        ));
        let text = b.register_group("Text");
        let font_size = b.register_property(
            PropertyBuilder::new("FontSize", TypeIndex::UI_ELEMENT, ValueKind::Double)
                .storage(StorageKind::Group(text))
                .default_value(Value::Double(14.0)),
        );
        Fixture {
            graph: ObjectGraph::new(Arc::new(b.build())),
            width,
            tag,
            font_size,
            text,
        }
    }

    #[test]
    fn fresh_object_reads_defaults() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let table = Arc::clone(f.graph.table());
        for descriptor in table.descriptors() {
            assert_eq!(
                f.graph.get_value(id, descriptor.index()),
                descriptor.default_value(),
                "{} should read its default",
                descriptor.name()
            );
        }
    }

    #[test]
    fn default_write_does_not_allocate() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        f.graph.set_value(id, f.tag, Value::Null).unwrap();
        assert!(!f.graph.has_sparse_entry(id, f.tag));
        f.graph.set_value(id, f.font_size, Value::Double(14.0)).unwrap();
        assert!(!f.graph.has_group_block(id, f.text));
    }

    #[test]
    fn returning_to_default_drops_the_sparse_entry() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let other = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        f.graph.set_value(id, f.tag, Value::Object(other)).unwrap();
        assert!(f.graph.has_sparse_entry(id, f.tag));
        assert_eq!(f.graph.ref_count(other), Some(2));
        f.graph.clear_value(id, f.tag).unwrap();
        assert!(!f.graph.has_sparse_entry(id, f.tag));
        assert_eq!(f.graph.ref_count(other), Some(1));
    }

    #[test]
    fn inline_and_group_writes() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        f.graph.set_value(id, f.width, Value::Double(40.0)).unwrap();
        assert_eq!(f.graph.get_value(id, f.width), &Value::Double(40.0));
        assert!(!f.graph.has_sparse_entry(id, f.width));

        f.graph.set_value(id, f.font_size, Value::Double(20.0)).unwrap();
        assert!(f.graph.has_group_block(id, f.text));
        assert_eq!(f.graph.get_value(id, f.font_size), &Value::Double(20.0));
    }

    #[test]
    fn inline_property_of_another_type_goes_sparse() {
        let mut f = fixture();
        // Width is inline on FrameworkElement only.
        let id = f.graph.create(TypeIndex::UI_ELEMENT);
        f.graph.set_value(id, f.width, Value::Double(5.0)).unwrap();
        assert!(f.graph.has_sparse_entry(id, f.width));
        assert_eq!(f.graph.get_value(id, f.width), &Value::Double(5.0));
    }

    #[test]
    fn unassignable_value_is_rejected() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let err = f.graph.set_value(id, f.width, Value::Bool(true)).unwrap_err();
        assert!(matches!(err, ObjectError::NotAssignable { name: "Width", .. }));
        assert_eq!(f.graph.get_value(id, f.width), &Value::Double(100.0));
    }

    #[test]
    fn frozen_object_rejects_writes() {
        let mut f = fixture();
        let id = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        f.graph.freeze(id).unwrap();
        let err = f.graph.set_value(id, f.width, Value::Double(1.0)).unwrap_err();
        assert_eq!(
            err,
            ObjectError::Frozen {
                object: id,
                property: f.width
            }
        );
    }

    #[test]
    fn release_destroys_owned_values() {
        let mut f = fixture();
        let owner = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let held = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        f.graph.set_value(owner, f.tag, Value::Object(held)).unwrap();
        assert!(!f.graph.release(held).unwrap());
        assert!(f.graph.release(owner).unwrap());
        assert!(!f.graph.contains(owner));
        assert!(!f.graph.contains(held));
        assert!(f.graph.is_empty());
    }

    #[test]
    fn stale_handles_do_not_alias() {
        let mut f = fixture();
        let first = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        f.graph.release(first).unwrap();
        let second = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert_eq!(f.graph.try_get_value(first, f.tag), None);
        assert_eq!(
            f.graph.set_value(first, f.tag, Value::Null),
            Err(ObjectError::StaleObject(first))
        );
    }

    #[test]
    fn boxed_objects_unbox() {
        let mut f = fixture();
        let boxed = f.graph.create_boxed(TypeIndex::DOUBLE, Value::Double(2.5)).unwrap();
        assert_eq!(f.graph.unbox(&Value::Object(boxed)), Value::Double(2.5));
        let plain = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        assert_eq!(f.graph.unbox(&Value::Object(plain)), Value::Object(plain));

        let forever = f.graph.intern_value_object(ValueObject::Duration(
            arbor_property::Duration::Forever,
        ));
        let duration = f.graph.create_boxed(TypeIndex::DURATION, forever).unwrap();
        assert_eq!(f.graph.unbox(&Value::Object(duration)), Value::string("Forever"));
    }

    /// Fails every property change once switched on.
    #[derive(Debug)]
    struct RejectChanges(Rc<Cell<bool>>);

    impl ObjectClass for RejectChanges {
        fn property_changed(
            &self,
            _graph: &mut ObjectGraph,
            _id: ObjectId,
            _change: &PropertyChange<'_>,
        ) -> ObjectResult<()> {
            if self.0.get() {
                return Err(ObjectError::Hook {
                    type_name: "FrameworkElement",
                    message: "change rejected".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn failed_hook_still_releases_the_replaced_value() {
        let mut f = fixture();
        let reject = Rc::new(Cell::new(false));
        f.graph
            .register_class(TypeIndex::FRAMEWORK_ELEMENT, RejectChanges(Rc::clone(&reject)));
        let owner = f.graph.create(TypeIndex::FRAMEWORK_ELEMENT);
        let first = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        f.graph.set_value(owner, f.tag, Value::Object(first)).unwrap();
        assert_eq!(f.graph.ref_count(first), Some(2));

        reject.set(true);
        let second = f.graph.create(TypeIndex::DEPENDENCY_OBJECT);
        let result = f.graph.set_value(owner, f.tag, Value::Object(second));
        assert!(matches!(result, Err(ObjectError::Hook { .. })));
        assert_eq!(f.graph.get_value(owner, f.tag), &Value::Object(second));
        assert_eq!(f.graph.ref_count(first), Some(1));
        assert_eq!(f.graph.ref_count(second), Some(2));
    }
}
