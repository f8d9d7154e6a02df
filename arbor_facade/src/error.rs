// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use arbor_object::ObjectError;
use thiserror::Error;

use crate::facade::FacadeId;

/// Failures reported by a composition property set.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    /// The composition object was torn down. Expected during teardown races.
    #[error("composition object is closed")]
    Closed,

    /// Any other failure.
    #[error("composition call failed: {0}")]
    Failed(&'static str),
}

/// Failures surfaced by the facade bridge.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FacadeError {
    /// A composition call failed with something other than
    /// [`CompositionError::Closed`].
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// The facade's static property is not registered as animatable.
    #[error("{0} is not animatable")]
    NotAnimatable(FacadeId),

    /// Writing a shadow property failed.
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Result type for facade bridge operations.
pub type FacadeResult<T> = Result<T, FacadeError>;
