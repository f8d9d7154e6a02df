// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flyweight value objects: durations, key times, and repeat behaviors.
//!
//! These small immutable payloads are used by thousands of animation objects
//! with only a handful of distinct values, so they are interned in a
//! [`ValueObjectPool`] and shared by `Arc`.

use alloc::sync::Arc;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::value::TimeSpan;

/// Length of an animation timeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Duration {
    /// Determined by the timeline's children.
    Automatic,
    /// Never ends.
    Forever,
    /// An explicit span.
    TimeSpan(TimeSpan),
}

/// Position of a key frame within its timeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeyTime(pub TimeSpan);

/// How often a timeline repeats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RepeatBehavior {
    /// Repeats a (possibly fractional) number of times.
    Count(f64),
    /// Repeats for the given span.
    Duration(TimeSpan),
    /// Repeats forever.
    Forever,
}

/// One of the pooled value-object kinds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ValueObject {
    /// A duration.
    Duration(Duration),
    /// A key time.
    KeyTime(KeyTime),
    /// A repeat behavior.
    RepeatBehavior(RepeatBehavior),
}

impl ValueObject {
    /// Identity used for interning: floats compare by bit pattern.
    fn key(&self) -> (u8, u8, u64) {
        match *self {
            Self::Duration(Duration::Automatic) => (0, 0, 0),
            Self::Duration(Duration::Forever) => (0, 1, 0),
            Self::Duration(Duration::TimeSpan(t)) => (0, 2, t.ticks as u64),
            Self::KeyTime(KeyTime(t)) => (1, 0, t.ticks as u64),
            Self::RepeatBehavior(RepeatBehavior::Count(c)) => (2, 0, c.to_bits()),
            Self::RepeatBehavior(RepeatBehavior::Duration(t)) => (2, 1, t.ticks as u64),
            Self::RepeatBehavior(RepeatBehavior::Forever) => (2, 2, 0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PoolKey(ValueObject);

impl PartialEq for PoolKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.key() == other.0.key()
    }
}

impl Eq for PoolKey {}

impl Hash for PoolKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.key().hash(state);
    }
}

/// Interns value objects so equal values share one allocation.
///
/// ```rust
/// use std::sync::Arc;
/// use arbor_property::{Duration, ValueObject, ValueObjectPool};
///
/// let mut pool = ValueObjectPool::new();
/// let a = pool.intern(ValueObject::Duration(Duration::Forever));
/// let b = pool.intern(ValueObject::Duration(Duration::Forever));
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(pool.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ValueObjectPool {
    entries: HashMap<PoolKey, Arc<ValueObject>>,
}

impl ValueObjectPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared instance for `value`, creating it on first use.
    pub fn intern(&mut self, value: ValueObject) -> Arc<ValueObject> {
        self.entries
            .entry(PoolKey(value))
            .or_insert_with(|| Arc::new(value))
            .clone()
    }

    /// Number of distinct values held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops entries no longer referenced outside the pool.
    ///
    /// Returns the number of entries removed.
    pub fn purge_unused(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, v| Arc::strong_count(v) > 1);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_get_distinct_entries() {
        let mut pool = ValueObjectPool::new();
        let one = pool.intern(ValueObject::RepeatBehavior(RepeatBehavior::Count(1.0)));
        let two = pool.intern(ValueObject::RepeatBehavior(RepeatBehavior::Count(2.0)));
        assert!(!Arc::ptr_eq(&one, &two));
        let span = pool.intern(ValueObject::KeyTime(KeyTime(TimeSpan::from_millis(250))));
        assert_eq!(*span, ValueObject::KeyTime(KeyTime(TimeSpan::from_ticks(2_500_000))));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn purge_keeps_referenced_entries() {
        let mut pool = ValueObjectPool::new();
        let kept = pool.intern(ValueObject::Duration(Duration::Automatic));
        drop(pool.intern(ValueObject::Duration(Duration::Forever)));
        assert_eq!(pool.purge_unused(), 1);
        assert_eq!(pool.len(), 1);
        assert!(Arc::ptr_eq(
            &kept,
            &pool.intern(ValueObject::Duration(Duration::Automatic))
        ));
    }
}
