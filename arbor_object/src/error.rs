// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors propagated by object graph operations.

use alloc::string::String;

use arbor_property::{ObjectId, PropertyIndex, ValueKind};
use thiserror::Error;

/// Result type for object graph operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Failures surfaced by get/set, lifecycle, and theme walk entry points.
///
/// Expected absences (a resource lookup miss, a missing scheduler, a value
/// with no unboxed form) are not errors and never appear here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ObjectError {
    /// The handle refers to a destroyed object.
    #[error("{0} does not exist")]
    StaleObject(ObjectId),

    /// The object is frozen and the write did not come from a theme update.
    #[error("{object} is frozen; cannot set {property}")]
    Frozen {
        /// The frozen object.
        object: ObjectId,
        /// The property being written.
        property: PropertyIndex,
    },

    /// The value's payload kind is not compatible with the property.
    #[error("a {kind} value is not assignable to `{name}`")]
    NotAssignable {
        /// The property being written.
        property: PropertyIndex,
        /// Property name.
        name: &'static str,
        /// Payload kind of the rejected value.
        kind: ValueKind,
    },

    /// A theme resource binding targets a property that does not take them.
    #[error("`{name}` does not accept theme resource bindings")]
    NotThemeResourceEligible {
        /// The property being bound.
        property: PropertyIndex,
        /// Property name.
        name: &'static str,
    },

    /// The child already has a parent.
    #[error("{0} already has a parent")]
    AlreadyParented(ObjectId),

    /// The object is not a child of the given parent.
    #[error("{child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent.
        parent: ObjectId,
        /// The object that was not found among its children.
        child: ObjectId,
    },

    /// A class hook failed.
    #[error("{type_name} hook failed: {message}")]
    Hook {
        /// Name of the type whose hook failed.
        type_name: &'static str,
        /// Hook-provided description.
        message: String,
    },
}
