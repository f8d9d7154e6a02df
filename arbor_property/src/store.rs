// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse value storage.
//!
//! [`SparseValues`] is a sorted `SmallVec` with binary search rather than a
//! hash map: typical objects have a handful of explicitly set non-inline
//! properties, so contiguous storage beats hashing and the first few entries
//! need no heap allocation at all.

use smallvec::SmallVec;

use crate::id::PropertyIndex;
use crate::value::Value;

const INLINE_CAPACITY: usize = 4;

/// Sparse table mapping property index to value, sorted by index.
///
/// ```rust
/// use arbor_property::{PropertyIndex, SparseValues, Value};
///
/// let mut values = SparseValues::new();
/// let tag = PropertyIndex::new(7);
/// assert!(values.get(tag).is_none());
///
/// values.set(tag, Value::Int32(3));
/// assert_eq!(values.get(tag), Some(&Value::Int32(3)));
/// assert_eq!(values.remove(tag), Some(Value::Int32(3)));
/// assert!(values.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SparseValues {
    entries: SmallVec<[(PropertyIndex, Value); INLINE_CAPACITY]>,
}

impl SparseValues {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn find(&self, index: PropertyIndex) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&index, |(i, _)| *i)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the stored value for `index`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: PropertyIndex) -> Option<&Value> {
        self.find(index).ok().map(|i| &self.entries[i].1)
    }

    /// Returns `true` if an entry exists for `index`.
    #[must_use]
    #[inline]
    pub fn contains(&self, index: PropertyIndex) -> bool {
        self.find(index).is_ok()
    }

    /// Stores `value`, returning the previous value.
    pub fn set(&mut self, index: PropertyIndex, value: Value) -> Option<Value> {
        match self.find(index) {
            Ok(i) => Some(core::mem::replace(&mut self.entries[i].1, value)),
            Err(i) => {
                self.entries.insert(i, (index, value));
                None
            }
        }
    }

    /// Removes the entry for `index`, returning its value.
    pub fn remove(&mut self, index: PropertyIndex) -> Option<Value> {
        self.find(index).ok().map(|i| self.entries.remove(i).1)
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyIndex, &Value)> + '_ {
        self.entries.iter().map(|(i, v)| (*i, v))
    }

    /// Removes every entry, yielding them in index order.
    pub fn drain(&mut self) -> impl Iterator<Item = (PropertyIndex, Value)> + '_ {
        self.entries.drain(..)
    }
}
