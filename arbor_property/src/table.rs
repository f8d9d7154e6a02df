// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide property table.
//!
//! Types, property groups, and properties are registered on a
//! [`PropertyTableBuilder`] and frozen into an immutable [`PropertyTable`].
//! Inline slot offsets are assigned at [`build`](PropertyTableBuilder::build)
//! time so that a base type's slots are always a prefix of a derived type's
//! slots, whatever order the registrations arrived in.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::assign::kind_accepts;
use crate::id::{GroupId, PropertyIndex, TypeIndex};
use crate::metadata::{PropertyBuilder, PropertyDescriptor, Storage, StorageKind};
use crate::theme::Theme;
use crate::value::{Value, ValueKind};

bitflags::bitflags! {
    /// Capabilities queried by the object core instead of type switches.
    ///
    /// A registered type inherits all capabilities of its base.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Participates in the visual tree and in layout.
        const UI_ELEMENT = 1 << 0;
        /// Has resources and a `RequestedTheme`.
        const FRAMEWORK_ELEMENT = 1 << 1;
        /// Carries a single payload in the `BoxedValue` property.
        const BOXED_VALUE = 1 << 2;
        /// Honors `RequestedTheme` as a subtree theme override.
        const THEME_OVERRIDE = 1 << 3;
        /// Can be the target of a composition light.
        const LIGHT_TARGET = 1 << 4;
    }
}

/// Built-in property indices, registered by [`PropertyTableBuilder::new`].
pub mod builtin {
    use crate::id::PropertyIndex;

    /// Payload of objects of boxed primitive types.
    pub const BOXED_VALUE: PropertyIndex = PropertyIndex::new(0);
    /// Requested theme of a framework element.
    pub const REQUESTED_THEME: PropertyIndex = PropertyIndex::new(1);
    /// Composition lights attached to a UI element.
    pub const LIGHTS: PropertyIndex = PropertyIndex::new(2);

    /// Number of built-in properties.
    pub const COUNT: u16 = 3;
}

/// A registered type.
pub struct TypeInfo {
    index: TypeIndex,
    name: &'static str,
    base: Option<TypeIndex>,
    capabilities: Capabilities,
    inline_properties: Box<[PropertyIndex]>,
    inline_defaults: Box<[Value]>,
}

impl TypeInfo {
    /// Type index.
    #[must_use]
    pub fn index(&self) -> TypeIndex {
        self.index
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Base type, `None` only for the root.
    #[must_use]
    pub fn base(&self) -> Option<TypeIndex> {
        self.base
    }

    /// Capabilities, including those inherited from the base.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Inline properties of this type and its bases, in slot order.
    #[must_use]
    pub fn inline_properties(&self) -> &[PropertyIndex] {
        &self.inline_properties
    }

    /// Initial inline block for a new object of this type.
    #[must_use]
    pub fn inline_defaults(&self) -> &[Value] {
        &self.inline_defaults
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("base", &self.base)
            .field("capabilities", &self.capabilities)
            .field("inline_slots", &self.inline_properties.len())
            .finish_non_exhaustive()
    }
}

/// A registered property group.
#[derive(Debug)]
pub struct GroupInfo {
    id: GroupId,
    name: &'static str,
    properties: Box<[PropertyIndex]>,
    defaults: Box<[Value]>,
}

impl GroupInfo {
    /// Group id.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Member properties in slot order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyIndex] {
        &self.properties
    }

    /// Initial block for a newly allocated group.
    #[must_use]
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }
}

/// Immutable lookup from property index to descriptor, plus type metadata.
pub struct PropertyTable {
    types: Vec<TypeInfo>,
    properties: Vec<PropertyDescriptor>,
    groups: Vec<GroupInfo>,
    by_name: HashMap<&'static str, SmallVec<[PropertyIndex; 2]>>,
}

impl PropertyTable {
    /// Returns the descriptor for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not issued by this table's builder.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn get_descriptor(&self, index: PropertyIndex) -> &PropertyDescriptor {
        match self.properties.get(usize::from(index.get())) {
            Some(descriptor) => descriptor,
            None => panic!(
                "{index} is out of range for a table of {} properties",
                self.properties.len()
            ),
        }
    }

    /// Returns the descriptor for `index`, or `None` if out of range.
    #[must_use]
    pub fn try_descriptor(&self, index: PropertyIndex) -> Option<&PropertyDescriptor> {
        self.properties.get(usize::from(index.get()))
    }

    /// Number of registered properties.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// All descriptors in index order.
    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor> + '_ {
        self.properties.iter()
    }

    /// Returns type metadata.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was not registered.
    #[must_use]
    #[track_caller]
    pub fn type_info(&self, ty: TypeIndex) -> &TypeInfo {
        match self.types.get(usize::from(ty.get())) {
            Some(info) => info,
            None => panic!("{ty:?} is not a registered type"),
        }
    }

    /// Returns group metadata.
    ///
    /// # Panics
    ///
    /// Panics if `group` was not registered.
    #[must_use]
    #[track_caller]
    pub fn group(&self, group: GroupId) -> &GroupInfo {
        match self.groups.get(usize::from(group.get())) {
            Some(info) => info,
            None => panic!("{group:?} is not a registered group"),
        }
    }

    /// Returns `true` if `ty` is `ancestor` or derives from it.
    #[must_use]
    pub fn is_a(&self, ty: TypeIndex, ancestor: TypeIndex) -> bool {
        let mut current = Some(ty);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = self.types.get(usize::from(t.get())).and_then(TypeInfo::base);
        }
        false
    }

    /// Returns `true` if `ty` has every capability in `caps`.
    #[must_use]
    pub fn has_capability(&self, ty: TypeIndex, caps: Capabilities) -> bool {
        self.types
            .get(usize::from(ty.get()))
            .is_some_and(|info| info.capabilities.contains(caps))
    }

    /// Finds a property by name on `ty` or any of its bases.
    #[must_use]
    pub fn find_property(&self, ty: TypeIndex, name: &str) -> Option<PropertyIndex> {
        let candidates = self.by_name.get(name)?;
        let mut current = Some(ty);
        while let Some(t) = current {
            if let Some(index) = candidates
                .iter()
                .find(|i| self.properties[usize::from(i.get())].owner == t)
            {
                return Some(*index);
            }
            current = self.types.get(usize::from(t.get())).and_then(TypeInfo::base);
        }
        None
    }
}

impl fmt::Debug for PropertyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyTable")
            .field("types", &self.types.len())
            .field("properties", &self.properties.len())
            .field("groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct TypeSpec {
    name: &'static str,
    base: Option<TypeIndex>,
    capabilities: Capabilities,
}

/// Collects registrations and builds a [`PropertyTable`].
///
/// `new` pre-registers the built-in types (see [`TypeIndex`] constants) and
/// the built-in properties (see [`builtin`]).
///
/// ```rust
/// use arbor_property::{
///     Capabilities, PropertyBuilder, PropertyTableBuilder, StorageKind, TypeIndex, Value,
///     ValueKind,
/// };
///
/// let mut builder = PropertyTableBuilder::new();
/// let border = builder.register_type("Border", TypeIndex::FRAMEWORK_ELEMENT, Capabilities::empty());
/// let child = builder.register_property(
///     PropertyBuilder::new("Child", border, ValueKind::Object).inline(),
/// );
/// let table = builder.build();
///
/// assert!(table.is_a(border, TypeIndex::UI_ELEMENT));
/// assert_eq!(table.find_property(border, "Child"), Some(child));
/// assert_eq!(table.get_descriptor(child).default_value(), &Value::Null);
/// ```
#[derive(Debug)]
pub struct PropertyTableBuilder {
    types: Vec<TypeSpec>,
    groups: Vec<&'static str>,
    properties: Vec<PropertyBuilder>,
}

impl Default for PropertyTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyTableBuilder {
    /// Creates a builder holding the built-in registrations.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self {
            types: Vec::new(),
            groups: Vec::new(),
            properties: Vec::new(),
        };
        builder.push_type("DependencyObject", None, Capabilities::empty());
        for name in [
            "Boolean",
            "Int32",
            "Int64",
            "Double",
            "String",
            "Color",
            "Point",
            "Rect",
            "Size",
            "Matrix",
            "Matrix3D",
            "KeyTime",
            "Duration",
            "RepeatBehavior",
            "Enum",
            "ElementTheme",
        ] {
            builder.push_type(name, Some(TypeIndex::DEPENDENCY_OBJECT), Capabilities::BOXED_VALUE);
        }
        builder.push_type(
            "UIElement",
            Some(TypeIndex::DEPENDENCY_OBJECT),
            Capabilities::UI_ELEMENT | Capabilities::LIGHT_TARGET,
        );
        builder.push_type(
            "FrameworkElement",
            Some(TypeIndex::UI_ELEMENT),
            Capabilities::FRAMEWORK_ELEMENT | Capabilities::THEME_OVERRIDE,
        );
        debug_assert_eq!(
            builder.types.len(),
            usize::from(TypeIndex::BUILTIN_COUNT),
            "built-in type constants out of sync"
        );

        builder.register_property(PropertyBuilder::new(
            "BoxedValue",
            TypeIndex::DEPENDENCY_OBJECT,
            ValueKind::Object,
        ));
        builder.register_property(
            PropertyBuilder::new("RequestedTheme", TypeIndex::FRAMEWORK_ELEMENT, ValueKind::Enum)
                .inline()
                .default_value(Theme::None.to_value()),
        );
        builder.register_property(PropertyBuilder::new(
            "Lights",
            TypeIndex::UI_ELEMENT,
            ValueKind::Object,
        ));
        builder
    }

    fn push_type(
        &mut self,
        name: &'static str,
        base: Option<TypeIndex>,
        capabilities: Capabilities,
    ) -> TypeIndex {
        assert!(self.types.len() < usize::from(u16::MAX), "too many registered types");
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let index = self.types.len() as u16;
        let inherited = base
            .map(|b| self.types[usize::from(b.get())].capabilities)
            .unwrap_or_default();
        self.types.push(TypeSpec {
            name,
            base,
            capabilities: capabilities | inherited,
        });
        TypeIndex::new(index)
    }

    /// Registers a type deriving from `base`.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not registered.
    #[track_caller]
    pub fn register_type(
        &mut self,
        name: &'static str,
        base: TypeIndex,
        capabilities: Capabilities,
    ) -> TypeIndex {
        assert!(
            usize::from(base.get()) < self.types.len(),
            "base type {base:?} of `{name}` is not registered"
        );
        self.push_type(name, Some(base), capabilities)
    }

    /// Registers a property group.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 groups are registered.
    pub fn register_group(&mut self, name: &'static str) -> GroupId {
        assert!(self.groups.len() < usize::from(u16::MAX), "too many property groups");
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let index = self.groups.len() as u16;
        self.groups.push(name);
        GroupId::new(index)
    }

    /// Registers a property and returns its stable index.
    ///
    /// # Panics
    ///
    /// Panics if the owner type or group is not registered, if the owner
    /// already has a property with this name, or if the default value is
    /// not assignable to the property's payload kind.
    #[track_caller]
    pub fn register_property(&mut self, property: PropertyBuilder) -> PropertyIndex {
        assert!(
            usize::from(property.owner.get()) < self.types.len(),
            "owner {:?} of `{}` is not registered",
            property.owner,
            property.name
        );
        if let StorageKind::Group(group) = property.storage {
            assert!(
                usize::from(group.get()) < self.groups.len(),
                "group {group:?} of `{}` is not registered",
                property.name
            );
        }
        assert!(
            !self
                .properties
                .iter()
                .any(|p| p.owner == property.owner && p.name == property.name),
            "property `{}` is already registered on {:?}",
            property.name,
            property.owner
        );
        assert!(
            property.default.is_null() || kind_accepts(property.value_kind, property.default.kind()),
            "default of `{}` is {:?}, not assignable to {:?}",
            property.name,
            property.default.kind(),
            property.value_kind
        );
        assert!(
            self.properties.len() < usize::from(u16::MAX),
            "too many registered properties"
        );
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let index = self.properties.len() as u16;
        self.properties.push(property);
        PropertyIndex::new(index)
    }

    /// Freezes the registrations into a table.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "registration asserts every count fits in u16"
    )]
    pub fn build(self) -> PropertyTable {
        let type_count = self.types.len();
        let mut storages = alloc::vec![Storage::Sparse; self.properties.len()];

        // Own inline properties per type, in registration order.
        let mut own_inline: Vec<Vec<PropertyIndex>> = (0..type_count).map(|_| Vec::new()).collect();
        let mut group_members: Vec<Vec<PropertyIndex>> =
            (0..self.groups.len()).map(|_| Vec::new()).collect();
        for (i, p) in self.properties.iter().enumerate() {
            let index = PropertyIndex::new(i as u16);
            match p.storage {
                StorageKind::Inline => own_inline[usize::from(p.owner.get())].push(index),
                StorageKind::Group(group) => {
                    let members = &mut group_members[usize::from(group.get())];
                    storages[i] = Storage::Group {
                        group,
                        slot: members.len() as u16,
                    };
                    members.push(index);
                }
                StorageKind::Sparse => {}
            }
        }

        // Types are registered after their bases, so index order is a valid
        // topological order.
        let mut slots: Vec<Vec<PropertyIndex>> = Vec::with_capacity(type_count);
        for (i, spec) in self.types.iter().enumerate() {
            let mut all = spec
                .base
                .map(|b| slots[usize::from(b.get())].clone())
                .unwrap_or_default();
            for index in &own_inline[i] {
                storages[usize::from(index.get())] = Storage::Inline {
                    slot: all.len() as u16,
                };
                all.push(*index);
            }
            slots.push(all);
        }

        let mut by_name: HashMap<&'static str, SmallVec<[PropertyIndex; 2]>> =
            HashMap::with_capacity(self.properties.len());
        let properties: Vec<PropertyDescriptor> = self
            .properties
            .into_iter()
            .zip(storages)
            .enumerate()
            .map(|(i, (p, storage))| {
                let index = PropertyIndex::new(i as u16);
                by_name.entry(p.name).or_insert_with(SmallVec::new).push(index);
                PropertyDescriptor {
                    index,
                    name: p.name,
                    owner: p.owner,
                    storage,
                    value_kind: p.value_kind,
                    default: p.default,
                    flags: p.flags,
                    affects: p.affects,
                    on_changed: p.on_changed,
                }
            })
            .collect();

        let defaults_of = |members: &[PropertyIndex]| -> Box<[Value]> {
            members
                .iter()
                .map(|m| properties[usize::from(m.get())].default.clone())
                .collect()
        };

        let types = self
            .types
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(i, (spec, slots))| TypeInfo {
                index: TypeIndex::new(i as u16),
                name: spec.name,
                base: spec.base,
                capabilities: spec.capabilities,
                inline_defaults: defaults_of(&slots),
                inline_properties: slots.into_boxed_slice(),
            })
            .collect();

        let groups = self
            .groups
            .into_iter()
            .zip(group_members)
            .enumerate()
            .map(|(i, (name, members))| GroupInfo {
                id: GroupId::new(i as u16),
                name,
                defaults: defaults_of(&members),
                properties: members.into_boxed_slice(),
            })
            .collect();

        tracing::debug!(
            properties = properties.len(),
            types = type_count,
            "property table built"
        );

        PropertyTable {
            types,
            properties,
            groups,
            by_name,
        }
    }
}

#[cfg(feature = "std")]
mod global {
    use alloc::sync::Arc;
    use std::sync::{PoisonError, RwLock};

    use super::{PropertyTable, PropertyTableBuilder};

    static TABLE: RwLock<Option<Arc<PropertyTable>>> = RwLock::new(None);

    /// Returns the process-wide table, building it with `init` on first use.
    ///
    /// `init` receives a builder that already holds the built-in
    /// registrations. Later calls return the existing table and ignore
    /// their `init`.
    pub fn ensure_properties(init: impl FnOnce(&mut PropertyTableBuilder)) -> Arc<PropertyTable> {
        if let Some(table) = TABLE.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Arc::clone(table);
        }
        let mut slot = TABLE.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.as_ref() {
            return Arc::clone(table);
        }
        let mut builder = PropertyTableBuilder::new();
        init(&mut builder);
        let table = Arc::new(builder.build());
        *slot = Some(Arc::clone(&table));
        table
    }

    /// Returns the process-wide table if it has been built.
    #[must_use]
    pub fn properties() -> Option<Arc<PropertyTable>> {
        TABLE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// Drops the process-wide table.
    ///
    /// Existing `Arc` handles stay valid. Returns `true` if a table was
    /// present.
    pub fn clear_properties() -> bool {
        let cleared = TABLE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if cleared {
            tracing::debug!("process-wide property table cleared");
        }
        cleared
    }
}

#[cfg(feature = "std")]
pub use global::{clear_properties, ensure_properties, properties};
