// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability hooks for path propagation.
//!
//! [`propagate_on_path_with_trace`](crate::propagate_on_path_with_trace)
//! reports every ancestor it marks and the reason the walk ended. The
//! [`PathRecorder`] sink keeps both, which is enough to answer "which nodes
//! did this invalidation touch?" in tests and debugging tools.

use alloc::vec::Vec;

use crate::{PathFlags, PathStop};

/// A callback sink for path propagation tracing.
pub trait PathTrace<K> {
    /// Called after `key` was marked with `flags.path`.
    fn marked(&mut self, key: K, flags: PathFlags);

    /// Called once when the walk ends.
    ///
    /// `at` is the node that ended the walk, or `None` if the walk ran past
    /// the root.
    fn stopped(&mut self, at: Option<K>, stop: PathStop) {
        let _ = (at, stop);
    }
}

impl<K> PathTrace<K> for () {
    #[inline]
    fn marked(&mut self, _key: K, _flags: PathFlags) {}
}

/// Records every marked node in walk order.
#[derive(Clone, Debug)]
pub struct PathRecorder<K> {
    marked: Vec<K>,
    stops: Vec<(Option<K>, PathStop)>,
}

impl<K> Default for PathRecorder<K> {
    fn default() -> Self {
        Self {
            marked: Vec::new(),
            stops: Vec::new(),
        }
    }
}

impl<K: Copy> PathRecorder<K> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes marked so far, in walk order across all recorded walks.
    #[must_use]
    pub fn marked_nodes(&self) -> &[K] {
        &self.marked
    }

    /// Total number of node visits that changed flags.
    #[must_use]
    pub fn mark_count(&self) -> usize {
        self.marked.len()
    }

    /// How each recorded walk ended.
    #[must_use]
    pub fn stops(&self) -> &[(Option<K>, PathStop)] {
        &self.stops
    }

    /// Clears all recorded data.
    pub fn clear(&mut self) {
        self.marked.clear();
        self.stops.clear();
    }
}

impl<K: Copy> PathTrace<K> for PathRecorder<K> {
    fn marked(&mut self, key: K, _flags: PathFlags) {
        self.marked.push(key);
    }

    fn stopped(&mut self, at: Option<K>, stop: PathStop) {
        self.stops.push((at, stop));
    }
}
