// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Object: the dependency object graph.
//!
//! Objects live in an arena owned by [`ObjectGraph`] and are addressed by
//! generational [`ObjectId`](arbor_property::ObjectId) handles. On top of the
//! metadata from `arbor_property` the graph provides:
//!
//! - **Values**: `get_value` never allocates; `set_value` writes inline,
//!   group, or sparse storage, clears theme bindings, invalidates layout as
//!   the descriptor asks, and keeps object-valued properties referenced.
//! - **Lifecycle**: `enter`/`leave` move subtrees in and out of the live
//!   tree, resolving themes and refreshing bindings on the way in and
//!   releasing live-only state (light targets, cached themes) on the way out.
//!   Per-type behavior plugs in through [`ObjectClass`].
//! - **Themes**: [`ObjectGraph::notify_theme_changed`] walks owned objects
//!   and children with a per-object reentrancy guard and a scoped ambient
//!   theme; theme resource bindings resolve through a [`ResourceResolver`].
//! - **Invalidation**: measure, arrange, viewport, and automation-peer
//!   invalidation on top of `arbor_dirty`, with frame pacing through an
//!   optional [`FrameScheduler`](arbor_dirty::FrameScheduler), plus
//!   effective viewport reports for listening elements.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arbor_object::ObjectGraph;
//! use arbor_property::{PropertyBuilder, PropertyTableBuilder, Theme, TypeIndex, Value, ValueKind};
//!
//! let mut builder = PropertyTableBuilder::new();
//! let foreground = builder.register_property(
//!     PropertyBuilder::new("Foreground", TypeIndex::UI_ELEMENT, ValueKind::Int32)
//!         .theme_resource_eligible(),
//! );
//! let mut graph = ObjectGraph::new(Arc::new(builder.build()));
//! graph.app_resources_mut().insert_themed(Theme::Light, "TextFill", Value::Int32(0x000000));
//! graph.app_resources_mut().insert_themed(Theme::Dark, "TextFill", Value::Int32(0xffffff));
//!
//! let root = graph.create(TypeIndex::FRAMEWORK_ELEMENT);
//! let label = graph.create(TypeIndex::UI_ELEMENT);
//! graph.add_child(root, label).unwrap();
//! graph.set_value(label, foreground, Value::theme_resource("TextFill")).unwrap();
//!
//! graph.attach_root(root).unwrap();
//! assert!(graph.is_live(label));
//! assert_eq!(graph.get_value(label, foreground), &Value::Int32(0x000000));
//!
//! graph.notify_theme_changed(root, Theme::Dark, false).unwrap();
//! assert_eq!(graph.get_value(label, foreground), &Value::Int32(0xffffff));
//! assert_eq!(graph.theme(label), Some(Theme::Dark));
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `arbor_property/std` and `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` targets.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod class;
mod error;
mod graph;
mod layout;
mod lifecycle;
mod lights;
mod object;
mod resources;
mod theme_refs;
mod theme_walk;
mod viewport;

pub use class::{BaseClass, EnterParams, LeaveParams, ObjectClass, PropertyChange};
pub use error::{ObjectError, ObjectResult};
pub use graph::{AutomationPeerPropagation, GraphConfig, ObjectGraph};
pub use object::ObjectFlags;
pub use resources::{
    BaseValueSource, DictionaryResolver, ResourceDictionary, ResourceResolver,
    ThemeResourceBinding,
};
pub use viewport::EffectiveViewportChanged;
