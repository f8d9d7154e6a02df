// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor VSM: visual state management over the object graph.
//!
//! A control's appearance is split into groups of mutually exclusive visual
//! states (`CommonStates`: `Normal`, `PointerOver`, `Pressed`). Each state
//! carries property setters and an optional storyboard; transitions between
//! states of a group may be animated.
//!
//! - **Model** ([`VisualStateGroup`], [`VisualState`], [`VisualTransition`],
//!   [`Setter`]): the declared states.
//! - **Data source** ([`VisualStateDataSource`]): lookup by name or token,
//!   transition resolution, cached storyboards, and per-group runtime state.
//!   [`VisualStateGroupCollection`] is the implementation for declared
//!   groups.
//! - **Driver** ([`VisualStateManager`]): two-phase state changes with
//!   `changing` and `changed` notifications, setter application and removal,
//!   and transition completion.
//! - **Triggers** ([`StateTrigger`], [`StateTriggerVariantMap`]): adaptive
//!   and custom conditions that select a state automatically.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arbor_object::ObjectGraph;
//! use arbor_property::{PropertyBuilder, PropertyTableBuilder, TypeIndex, Value, ValueKind};
//! use arbor_vsm::{
//!     Setter, VisualState, VisualStateDataSource, VisualStateGroup, VisualStateGroupCollection,
//!     VisualStateManager,
//! };
//!
//! let mut builder = PropertyTableBuilder::new();
//! let opacity = builder.register_property(
//!     PropertyBuilder::new("Opacity", TypeIndex::UI_ELEMENT, ValueKind::Double)
//!         .default_value(Value::Double(1.0)),
//! );
//! let mut graph = ObjectGraph::new(Arc::new(builder.build()));
//! let border = graph.create(TypeIndex::UI_ELEMENT);
//!
//! let mut states = VisualStateGroupCollection::new();
//! states.add_group(
//!     VisualStateGroup::new("CommonStates")
//!         .with_state(VisualState::new("Normal"))
//!         .with_state(
//!             VisualState::new("Disabled")
//!                 .with_setter(Setter::new(border, opacity, Value::Double(0.4))),
//!         ),
//! );
//!
//! let mut vsm = VisualStateManager::new();
//! assert!(vsm.go_to_state(&mut graph, &mut states, "Disabled", true).unwrap());
//! assert_eq!(graph.get_value(border, opacity), &Value::Double(0.4));
//!
//! assert!(vsm.go_to_state(&mut graph, &mut states, "Normal", true).unwrap());
//! assert_eq!(graph.get_value(border, opacity), &Value::Double(1.0));
//! assert_eq!(states.current_state(0), Some(0));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod manager;
mod model;
mod source;
mod trigger;

pub use error::{VsmError, VsmResult};
pub use manager::{StateChange, VisualStateListener, VisualStateManager};
pub use model::{Setter, Storyboard, VisualState, VisualStateGroup, VisualStateToken, VisualTransition};
pub use source::{
    GroupContext, StateLocation, StoryboardKind, VisualStateDataSource, VisualStateGroupCollection,
};
pub use trigger::{
    CustomTrigger, Qualifier, QualifierContext, StateTrigger, StateTriggerVariantMap,
    VariantMapItem,
};
