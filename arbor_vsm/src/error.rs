// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use arbor_object::ObjectError;
use thiserror::Error;

/// Result type for visual state operations.
pub type VsmResult<T> = Result<T, VsmError>;

/// Failures surfaced by the visual state driver.
///
/// A state name that no group declares is not an error; `go_to_state`
/// reports it by returning `false`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VsmError {
    /// The group index is out of range for the data source.
    #[error("no visual state group at index {0}")]
    UnknownGroup(usize),

    /// The state index is out of range for the data source.
    #[error("no visual state at index {0}")]
    UnknownState(usize),

    /// Applying or removing a setter failed.
    #[error(transparent)]
    Object(#[from] ObjectError),
}
