// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Facade: animatable element properties on a composition property set.
//!
//! A small fixed set of element properties ([`FacadeId`]: translation,
//! rotation, rotation axis, scale, center point, transform matrix) can be
//! animated by the composition layer instead of the object graph. The
//! composition layer identifies the properties of a property set by
//! insertion order, so the bridge keeps an ordered [`FacadePropertyMap`]
//! whose positions are the property IDs.
//!
//! - [`PropertySet`] is the host's composition property set.
//! - [`FacadeBridge`] seeds `Animated*` shadow properties when an animation
//!   starts, routes value-changed callbacks ([`PropertyChangeListener`]) into
//!   them, and marks the element's transform dirty.
//! - [`PendingFacadeChanges`] counts notifications still in flight, shared by
//!   every bridge under a root.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use arbor_facade::{
//!     CompositionError, FacadeBridge, FacadeId, FacadeProperties, FacadeValue,
//!     PendingFacadeChanges, PropertyChangeListener, PropertySet,
//! };
//! use arbor_object::ObjectGraph;
//! use arbor_property::{PropertyTableBuilder, TypeIndex, Value};
//!
//! #[derive(Debug, Default)]
//! struct Set(HashMap<String, FacadeValue>);
//!
//! impl PropertySet for Set {
//!     fn insert(&mut self, name: &str, value: FacadeValue) -> Result<(), CompositionError> {
//!         self.0.insert(name.to_string(), value);
//!         Ok(())
//!     }
//!     fn try_get(&self, name: &str) -> Result<Option<FacadeValue>, CompositionError> {
//!         Ok(self.0.get(name).cloned())
//!     }
//!     fn register_listener(&mut self, _: u32) -> Result<(), CompositionError> {
//!         Ok(())
//!     }
//!     fn unregister_listener(&mut self, _: u32) -> Result<(), CompositionError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut builder = PropertyTableBuilder::new();
//! let props = FacadeProperties::register(&mut builder, TypeIndex::UI_ELEMENT);
//! let mut graph = ObjectGraph::new(Arc::new(builder.build()));
//! let element = graph.create(TypeIndex::UI_ELEMENT);
//!
//! let pending = PendingFacadeChanges::new();
//! let mut bridge = FacadeBridge::new(element, props, Set::default(), pending.clone());
//! bridge.start_animation(&mut graph, FacadeId::Rotation).unwrap();
//! assert_eq!(pending.get(), 1);
//!
//! // The composition layer reports a new rotation for property 0.
//! bridge.on_scalar_changed(&mut graph, 0, 90.0).unwrap();
//! assert_eq!(graph.get_value(element, props.animated(FacadeId::Rotation)), &Value::Float(90.0));
//! assert!(pending.is_drained());
//!
//! bridge.complete_animation(FacadeId::Rotation).unwrap();
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bridge;
mod composition;
mod error;
mod facade;

pub use bridge::{FacadeBridge, FacadeProperties, PendingFacadeChanges};
pub use composition::{FacadeValue, PropertyChangeListener, PropertySet};
pub use error::{CompositionError, FacadeError, FacadeResult};
pub use facade::{FacadeId, FacadePropertyMap, MappingOutcome};
