// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type behavior hooks.
//!
//! Concrete element kinds customize lifecycle and theme propagation by
//! registering an [`ObjectClass`] for their type index with
//! [`ObjectGraph::register_class`]. Every method has a default that runs the
//! graph's base behavior, so an override that wants to add work calls the
//! matching `*_core` method on the graph and then does its own.
//!
//! ```rust
//! use arbor_object::{EnterParams, ObjectClass, ObjectGraph, ObjectResult};
//! use arbor_property::ObjectId;
//!
//! /// Subscribes to an external service while live.
//! #[derive(Debug)]
//! struct Connected;
//!
//! impl ObjectClass for Connected {
//!     fn enter(&self, graph: &mut ObjectGraph, id: ObjectId, params: EnterParams) -> ObjectResult<()> {
//!         graph.enter_core(id, params)?;
//!         // type-specific attach work goes here
//!         Ok(())
//!     }
//! }
//! ```

use core::fmt;

use arbor_property::{ObjectId, PropertyIndex, Theme, Value};

use crate::error::ObjectResult;
use crate::graph::ObjectGraph;

/// Parameters of an enter walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EnterParams {
    /// Owner of the namescope the subtree joins, if any.
    pub namescope: Option<ObjectId>,
    /// The subtree is joining the live tree.
    pub is_live: bool,
}

impl EnterParams {
    /// Parameters for joining the live tree.
    #[must_use]
    pub fn live() -> Self {
        Self {
            namescope: None,
            is_live: true,
        }
    }
}

/// Parameters of a leave walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LeaveParams {
    /// Owner of the namescope the subtree leaves, if any.
    pub namescope: Option<ObjectId>,
    /// The subtree is leaving the live tree.
    pub is_live: bool,
}

impl LeaveParams {
    /// Parameters for leaving the live tree.
    #[must_use]
    pub fn live() -> Self {
        Self {
            namescope: None,
            is_live: true,
        }
    }
}

/// A property value change, as seen by [`ObjectClass::property_changed`].
#[derive(Clone, Copy, Debug)]
pub struct PropertyChange<'a> {
    /// The property that changed.
    pub property: PropertyIndex,
    /// Value before the write.
    pub old: &'a Value,
    /// Value after the write.
    pub new: &'a Value,
}

/// Behavior hooks for a type and the types deriving from it.
///
/// Hooks run on the graph's thread with the graph mutably borrowed, so they
/// may read and write other objects freely.
pub trait ObjectClass: fmt::Debug {
    /// Joins `id` and its subtree to the tree.
    fn enter(&self, graph: &mut ObjectGraph, id: ObjectId, params: EnterParams) -> ObjectResult<()> {
        graph.enter_core(id, params)
    }

    /// Detaches `id` and its subtree.
    fn leave(&self, graph: &mut ObjectGraph, id: ObjectId, params: LeaveParams) -> ObjectResult<()> {
        graph.leave_core(id, params)
    }

    /// Propagates a theme change through `id`.
    ///
    /// Runs inside the reentrancy guard and the ambient theme scope set up by
    /// [`ObjectGraph::notify_theme_changed`].
    fn notify_theme_changed_core(
        &self,
        graph: &mut ObjectGraph,
        id: ObjectId,
        theme: Theme,
        force_refresh: bool,
    ) -> ObjectResult<()> {
        graph.notify_theme_changed_core(id, theme, force_refresh)
    }

    /// Called after a property value changed.
    fn property_changed(
        &self,
        graph: &mut ObjectGraph,
        id: ObjectId,
        change: &PropertyChange<'_>,
    ) -> ObjectResult<()> {
        let _ = (graph, id, change);
        Ok(())
    }

    /// Lets the object's logical peer refresh its bindings during a theme walk.
    fn peer_theme_changed(&self, graph: &mut ObjectGraph, id: ObjectId, theme: Theme) -> ObjectResult<()> {
        let _ = (graph, id, theme);
        Ok(())
    }
}

/// The behavior of types with no registered class.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseClass;

impl ObjectClass for BaseClass {}
