// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object storage.

use alloc::boxed::Box;
use alloc::vec::Vec;

use arbor_dirty::LayoutFlags;
use arbor_property::{
    GroupId, ObjectId, PropertyIndex, PropertyTable, SparseValues, Theme, TypeIndex, Value,
};
use kurbo::Rect;
use smallvec::SmallVec;

use crate::resources::{ResourceDictionary, ThemeResourceBinding};

bitflags::bitflags! {
    /// Lifecycle and guard bits on an object.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u8 {
        /// The object is part of the live tree.
        const LIVE = 1 << 0;
        /// A theme walk is in flight on this object.
        const PROCESSING_THEME_WALK = 1 << 1;
        /// Local writes are rejected.
        const FROZEN = 1 << 2;
    }
}

/// Property index to theme resource binding, sorted by index.
#[derive(Clone, Debug, Default)]
pub(crate) struct ThemeRefMap {
    entries: SmallVec<[(PropertyIndex, ThemeResourceBinding); 2]>,
}

impl ThemeRefMap {
    fn find(&self, index: PropertyIndex) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&index, |(i, _)| *i)
    }

    pub(crate) fn get(&self, index: PropertyIndex) -> Option<&ThemeResourceBinding> {
        self.find(index).ok().map(|i| &self.entries[i].1)
    }

    pub(crate) fn contains(&self, index: PropertyIndex) -> bool {
        self.find(index).is_ok()
    }

    pub(crate) fn insert(&mut self, index: PropertyIndex, binding: ThemeResourceBinding) {
        match self.find(index) {
            Ok(i) => self.entries[i].1 = binding,
            Err(i) => self.entries.insert(i, (index, binding)),
        }
    }

    pub(crate) fn remove(&mut self, index: PropertyIndex) -> Option<ThemeResourceBinding> {
        self.find(index).ok().map(|i| self.entries.remove(i).1)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn indices(&self) -> impl Iterator<Item = PropertyIndex> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }
}

/// Layout geometry used by effective viewport computation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Geometry {
    /// Layout slot in parent coordinates.
    pub(crate) slot: Rect,
    /// Visible window in own coordinates, for scrolling containers.
    pub(crate) viewport: Option<Rect>,
}

/// One node of the object graph.
#[derive(Debug)]
pub(crate) struct ObjectData {
    pub(crate) type_index: TypeIndex,
    pub(crate) ref_count: u32,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) inline: Box<[Value]>,
    pub(crate) groups: SmallVec<[(GroupId, Box<[Value]>); 1]>,
    pub(crate) sparse: Option<Box<SparseValues>>,
    pub(crate) theme_refs: Option<Box<ThemeRefMap>>,
    pub(crate) theme: Theme,
    pub(crate) flags: ObjectFlags,
    pub(crate) layout: LayoutFlags,
    pub(crate) geometry: Geometry,
    pub(crate) resources: Option<Box<ResourceDictionary>>,
}

impl ObjectData {
    pub(crate) fn new(type_index: TypeIndex, inline: Box<[Value]>) -> Self {
        Self {
            type_index,
            ref_count: 1,
            parent: None,
            children: Vec::new(),
            inline,
            groups: SmallVec::new(),
            sparse: None,
            theme_refs: None,
            theme: Theme::None,
            flags: ObjectFlags::empty(),
            layout: LayoutFlags::empty(),
            geometry: Geometry::default(),
            resources: None,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.flags.contains(ObjectFlags::LIVE)
    }

    pub(crate) fn group(&self, group: GroupId) -> Option<&[Value]> {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, block)| &**block)
    }

    pub(crate) fn group_mut(&mut self, group: GroupId) -> Option<&mut Box<[Value]>> {
        self.groups
            .iter_mut()
            .find(|(g, _)| *g == group)
            .map(|(_, block)| block)
    }

    pub(crate) fn is_theme_tracked(&self, index: PropertyIndex) -> bool {
        self.theme_refs.as_ref().is_some_and(|refs| refs.contains(index))
    }

    pub(crate) fn theme_ref(&self, index: PropertyIndex) -> Option<&ThemeResourceBinding> {
        self.theme_refs.as_ref().and_then(|refs| refs.get(index))
    }

    pub(crate) fn take_theme_ref(&mut self, index: PropertyIndex) -> Option<ThemeResourceBinding> {
        let refs = self.theme_refs.as_mut()?;
        let binding = refs.remove(index);
        if refs.is_empty() {
            self.theme_refs = None;
        }
        binding
    }

    pub(crate) fn insert_theme_ref(&mut self, index: PropertyIndex, binding: ThemeResourceBinding) {
        self.theme_refs
            .get_or_insert_with(Box::default)
            .insert(index, binding);
    }

    /// Every object reference held in inline, group, and sparse storage,
    /// with the property holding it.
    pub(crate) fn for_each_object_value(
        &self,
        table: &PropertyTable,
        mut f: impl FnMut(PropertyIndex, ObjectId),
    ) {
        let slots = table.type_info(self.type_index).inline_properties();
        for (index, value) in slots.iter().zip(self.inline.iter()) {
            if let Value::Object(id) = value {
                f(*index, *id);
            }
        }
        for (group, block) in &self.groups {
            let members = table.group(*group).properties();
            for (index, value) in members.iter().zip(block.iter()) {
                if let Value::Object(id) = value {
                    f(*index, *id);
                }
            }
        }
        if let Some(sparse) = &self.sparse {
            for (index, value) in sparse.iter() {
                if let Value::Object(id) = value {
                    f(index, *id);
                }
            }
        }
    }
}
