// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact identifiers for properties, types, groups, and objects.

use core::fmt;

/// A stable property index into a [`PropertyTable`](crate::PropertyTable).
///
/// Indices are assigned in registration order and never reused. The `u16`
/// size keeps sparse entries and theme maps compact.
///
/// ```rust
/// use arbor_property::PropertyIndex;
///
/// let index = PropertyIndex::new(42);
/// assert_eq!(index.get(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyIndex(u16);

impl PropertyIndex {
    /// Creates a property index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyIndex").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property #{}", self.0)
    }
}

/// The concrete kind of a dependency object.
///
/// Built-in types occupy the first indices; see the associated constants.
/// Types registered through
/// [`PropertyTableBuilder::register_type`](crate::PropertyTableBuilder::register_type)
/// follow.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeIndex(u16);

impl TypeIndex {
    /// The root of every type hierarchy.
    pub const DEPENDENCY_OBJECT: Self = Self(0);
    /// Boxed `bool`.
    pub const BOOLEAN: Self = Self(1);
    /// Boxed `i32`.
    pub const INT32: Self = Self(2);
    /// Boxed `i64`.
    pub const INT64: Self = Self(3);
    /// Boxed `f64`.
    pub const DOUBLE: Self = Self(4);
    /// Boxed string.
    pub const STRING: Self = Self(5);
    /// Boxed color.
    pub const COLOR: Self = Self(6);
    /// Boxed point.
    pub const POINT: Self = Self(7);
    /// Boxed rect.
    pub const RECT: Self = Self(8);
    /// Boxed size.
    pub const SIZE: Self = Self(9);
    /// Boxed 2-D affine matrix.
    pub const MATRIX: Self = Self(10);
    /// Boxed 3-D matrix.
    pub const MATRIX3D: Self = Self(11);
    /// Boxed key time.
    pub const KEY_TIME: Self = Self(12);
    /// Boxed duration.
    pub const DURATION: Self = Self(13);
    /// Boxed repeat behavior.
    pub const REPEAT_BEHAVIOR: Self = Self(14);
    /// Boxed enum value.
    pub const ENUM: Self = Self(15);
    /// The theme enumeration used by `RequestedTheme`.
    pub const THEME: Self = Self(16);
    /// Base of all visual elements.
    pub const UI_ELEMENT: Self = Self(17);
    /// Base of all elements with resources and a requested theme.
    pub const FRAMEWORK_ELEMENT: Self = Self(18);

    /// Number of built-in types.
    pub const BUILTIN_COUNT: u16 = 19;

    /// Creates a type index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeIndex").field(&self.0).finish()
    }
}

/// Identifies a property group.
///
/// Group-stored properties live in a per-object block that is allocated the
/// first time any member of the group receives a non-default value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u16);

impl GroupId {
    /// Creates a group id.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// A generational handle to an object in an object graph.
///
/// The generation changes whenever a slot is reused, so a stale handle never
/// aliases a newer object.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}v{}", self.index, self.generation)
    }
}
