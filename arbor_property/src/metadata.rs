// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors and their builder.

use alloc::boxed::Box;
use core::fmt;

use arbor_dirty::LayoutFlags;

use crate::id::{GroupId, ObjectId, PropertyIndex, TypeIndex};
use crate::value::{Value, ValueKind};

/// Callback invoked after a property value changed on an object.
///
/// Receives the object, the old value, and the new value. This is the
/// "render changed" hook: it runs synchronously inside `set_value`.
pub type PropertyChangedCallback = Box<dyn Fn(ObjectId, &Value, &Value) + Send + Sync>;

bitflags::bitflags! {
    /// Classification bits on a property descriptor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// The property points logically backward (toward a command parameter
        /// or an unparented item). Theme walks never traverse it and objects
        /// assigned to it are not entered into the live tree.
        const BACK_REFERENCE = 1 << 0;
        /// The property may be driven by an animation. Facade animations
        /// refuse to start on properties without it.
        const ANIMATABLE = 1 << 1;
        /// The property may hold a theme resource binding. Binding one to a
        /// property without it fails.
        const THEME_RESOURCE_ELIGIBLE = 1 << 2;
    }
}

/// Where a property's value is requested to live.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// A fixed per-type slot allocated with every object of the owner type.
    Inline,
    /// The per-object sparse table, allocated on first non-default write.
    Sparse,
    /// A slot inside a lazily allocated property group.
    Group(GroupId),
}

/// Resolved storage location of a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Inline slot index, shared by the owner type and its derived types.
    Inline {
        /// Slot within the object's inline block.
        slot: u16,
    },
    /// Sparse table entry keyed by property index.
    Sparse,
    /// Slot within a group block.
    Group {
        /// The group.
        group: GroupId,
        /// Slot within the group block.
        slot: u16,
    },
}

/// Immutable description of one property.
///
/// Descriptors are created by [`PropertyTableBuilder`](crate::PropertyTableBuilder)
/// and live for as long as the table.
pub struct PropertyDescriptor {
    pub(crate) index: PropertyIndex,
    pub(crate) name: &'static str,
    pub(crate) owner: TypeIndex,
    pub(crate) storage: Storage,
    pub(crate) value_kind: ValueKind,
    pub(crate) default: Value,
    pub(crate) flags: PropertyFlags,
    pub(crate) affects: LayoutFlags,
    pub(crate) on_changed: Option<PropertyChangedCallback>,
}

impl PropertyDescriptor {
    /// Stable index.
    #[must_use]
    #[inline]
    pub fn index(&self) -> PropertyIndex {
        self.index
    }

    /// Property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type that declares the property.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> TypeIndex {
        self.owner
    }

    /// Resolved storage location.
    #[must_use]
    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// The payload kind backing the property.
    #[must_use]
    #[inline]
    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Classification bits.
    #[must_use]
    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Returns `true` if this is a back-reference property.
    #[must_use]
    #[inline]
    pub fn is_back_reference(&self) -> bool {
        self.flags.contains(PropertyFlags::BACK_REFERENCE)
    }

    /// Returns `true` if this property may be animated.
    #[must_use]
    #[inline]
    pub fn is_animatable(&self) -> bool {
        self.flags.contains(PropertyFlags::ANIMATABLE)
    }

    /// Returns `true` if this property may hold a theme resource binding.
    #[must_use]
    #[inline]
    pub fn is_theme_resource_eligible(&self) -> bool {
        self.flags.contains(PropertyFlags::THEME_RESOURCE_ELIGIBLE)
    }

    /// Layout work a change to this property invalidates.
    ///
    /// Only the dirty bits are meaningful: `MEASURE_DIRTY`, `ARRANGE_DIRTY`,
    /// `TRANSFORM_DIRTY`, and `AUTOMATION_PEER_DIRTY`.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> LayoutFlags {
        self.affects
    }

    /// Runs the changed callback, if any.
    #[inline]
    pub fn notify_changed(&self, object: ObjectId, old: &Value, new: &Value) {
        if let Some(callback) = &self.on_changed {
            callback(object, old, new);
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("storage", &self.storage)
            .field("value_kind", &self.value_kind)
            .field("default", &self.default)
            .field("flags", &self.flags)
            .field("affects", &self.affects)
            .field("has_changed_callback", &self.on_changed.is_some())
            .finish()
    }
}

/// Builder for a property registration.
///
/// ```rust
/// use arbor_dirty::LayoutFlags;
/// use arbor_property::{PropertyBuilder, PropertyTableBuilder, TypeIndex, Value, ValueKind};
///
/// let mut builder = PropertyTableBuilder::new();
/// let width = builder.register_property(
///     PropertyBuilder::new("Width", TypeIndex::FRAMEWORK_ELEMENT, ValueKind::Double)
///         .default_value(Value::Double(f64::NAN))
///         .affects(LayoutFlags::MEASURE_DIRTY),
/// );
/// let table = builder.build();
/// assert_eq!(table.get_descriptor(width).name(), "Width");
/// ```
pub struct PropertyBuilder {
    pub(crate) name: &'static str,
    pub(crate) owner: TypeIndex,
    pub(crate) storage: StorageKind,
    pub(crate) value_kind: ValueKind,
    pub(crate) default: Value,
    pub(crate) flags: PropertyFlags,
    pub(crate) affects: LayoutFlags,
    pub(crate) on_changed: Option<PropertyChangedCallback>,
}

impl PropertyBuilder {
    /// Starts a sparse-stored property with a `Null` default.
    #[must_use]
    pub fn new(name: &'static str, owner: TypeIndex, value_kind: ValueKind) -> Self {
        Self {
            name,
            owner,
            storage: StorageKind::Sparse,
            value_kind,
            default: Value::Null,
            flags: PropertyFlags::empty(),
            affects: LayoutFlags::empty(),
            on_changed: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Sets the storage kind.
    #[must_use]
    pub fn storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    /// Stores the property inline.
    #[must_use]
    pub fn inline(self) -> Self {
        self.storage(StorageKind::Inline)
    }

    /// Marks the property as a back reference.
    #[must_use]
    pub fn back_reference(mut self) -> Self {
        self.flags |= PropertyFlags::BACK_REFERENCE;
        self
    }

    /// Marks the property as animatable.
    #[must_use]
    pub fn animatable(mut self) -> Self {
        self.flags |= PropertyFlags::ANIMATABLE;
        self
    }

    /// Allows theme resource bindings on the property.
    #[must_use]
    pub fn theme_resource_eligible(mut self) -> Self {
        self.flags |= PropertyFlags::THEME_RESOURCE_ELIGIBLE;
        self
    }

    /// Sets the layout work a change invalidates.
    #[must_use]
    pub fn affects(mut self, affects: LayoutFlags) -> Self {
        self.affects = affects;
        self
    }

    /// Sets the changed callback.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(ObjectId, &Value, &Value) + Send + Sync + 'static,
    {
        self.on_changed = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for PropertyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBuilder")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("storage", &self.storage)
            .field("value_kind", &self.value_kind)
            .field("default", &self.default)
            .field("flags", &self.flags)
            .field("affects", &self.affects)
            .field("has_changed_callback", &self.on_changed.is_some())
            .finish()
    }
}
