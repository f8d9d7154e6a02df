// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Property: dependency property metadata and value storage.
//!
//! This crate holds everything about a property that does not need the
//! object graph:
//!
//! - **Values** ([`Value`]): a closed tagged union of payload kinds, from
//!   scalars through owned matrices to shared object, value-object and
//!   theme-resource references.
//! - **Unboxing** ([`ensure_unboxed`] and the `try_unbox_*` family):
//!   conversion of host values, boxed objects, and pooled value objects into
//!   plain payloads, falling back to a shallow wrapper when no mapping exists.
//! - **Flyweights** ([`ValueObjectPool`]): interned durations, key times, and
//!   repeat behaviors.
//! - **Metadata** ([`PropertyTable`], [`PropertyDescriptor`]): an immutable
//!   table built once from a [`PropertyTableBuilder`], with inline, sparse,
//!   and group storage kinds and back-reference classification.
//! - **Sparse storage** ([`SparseValues`]): the per-object table for
//!   properties without an inline slot.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_property::{
//!     Capabilities, PropertyBuilder, PropertyTableBuilder, Storage, TypeIndex, Value, ValueKind,
//!     is_assignable,
//! };
//!
//! let mut builder = PropertyTableBuilder::new();
//! let button = builder.register_type("Button", TypeIndex::FRAMEWORK_ELEMENT, Capabilities::empty());
//! let content = builder.register_property(
//!     PropertyBuilder::new("Content", button, ValueKind::Object).inline(),
//! );
//! let parameter = builder.register_property(
//!     PropertyBuilder::new("CommandParameter", button, ValueKind::Object).back_reference(),
//! );
//! let table = builder.build();
//!
//! let descriptor = table.get_descriptor(content);
//! assert!(matches!(descriptor.storage(), Storage::Inline { .. }));
//! assert!(table.get_descriptor(parameter).is_back_reference());
//! assert!(is_assignable(descriptor, &Value::from(1.5)));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables the process-wide table ([`ensure_properties`],
//!   [`clear_properties`]) and forwards to `kurbo/std` and `peniko/std`.
//! - `libm`: forwards to `kurbo/libm` and `peniko/libm` for `no_std` targets.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod assign;
mod id;
mod metadata;
mod store;
mod table;
mod theme;
mod unbox;
mod value;
mod value_object;

pub use assign::{is_assignable, kind_accepts};
pub use id::{GroupId, ObjectId, PropertyIndex, TypeIndex};
pub use metadata::{
    PropertyBuilder, PropertyChangedCallback, PropertyDescriptor, PropertyFlags, Storage,
    StorageKind,
};
pub use store::SparseValues;
pub use table::{
    Capabilities, GroupInfo, PropertyTable, PropertyTableBuilder, TypeInfo, builtin,
};
#[cfg(feature = "std")]
pub use table::{clear_properties, ensure_properties, properties};
pub use theme::Theme;
pub use unbox::{
    BoxedObjects, ensure_unboxed, try_unbox_external_value, try_unbox_object_value,
    try_unbox_value_object,
};
pub use value::{DateTime, EnumValue, ExternalValue, ThemeResourceRef, TimeSpan, Value, ValueKind};
pub use value_object::{Duration, KeyTime, RepeatBehavior, ValueObject, ValueObjectPool};
