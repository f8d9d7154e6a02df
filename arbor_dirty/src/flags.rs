// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node layout flag bits and the flag triples used by path propagation.

use core::fmt;

bitflags::bitflags! {
    /// Layout and invalidation bits stored on every node of the tree.
    ///
    /// The bits come in semantic pairs: an "is dirty" bit meaning work is
    /// pending on this node, and an "on dirty path" bit meaning some
    /// descendant needs processing. Measure and arrange additionally carry a
    /// "pending" bit that is promoted to "dirty" when a path walk passes
    /// through the node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayoutFlags: u32 {
        /// The node needs to be measured.
        const MEASURE_DIRTY = 1 << 0;
        /// A descendant of the node needs to be measured.
        const ON_MEASURE_DIRTY_PATH = 1 << 1;
        /// Measure work was deferred; becomes `MEASURE_DIRTY` on the next walk.
        const MEASURE_DIRTY_PENDING = 1 << 2;
        /// The node needs to be arranged.
        const ARRANGE_DIRTY = 1 << 3;
        /// A descendant of the node needs to be arranged.
        const ON_ARRANGE_DIRTY_PATH = 1 << 4;
        /// Arrange work was deferred; becomes `ARRANGE_DIRTY` on the next walk.
        const ARRANGE_DIRTY_PENDING = 1 << 5;
        /// The node's effective viewport must be recomputed.
        const VIEWPORT_DIRTY = 1 << 6;
        /// A descendant's effective viewport must be recomputed.
        const ON_VIEWPORT_DIRTY_PATH = 1 << 7;
        /// The node or a descendant listens for effective viewport changes.
        const CONTRIBUTES_TO_VIEWPORT = 1 << 8;
        /// The node's automation peer data is stale.
        const AUTOMATION_PEER_DIRTY = 1 << 9;
        /// A descendant's automation peer data is stale.
        const ON_AUTOMATION_PEER_DIRTY_PATH = 1 << 10;
        /// Layout is suspended at this node; arrange walks may stop here.
        const LAYOUT_SUSPENDED = 1 << 11;
        /// The node's render transform must be rebuilt.
        const TRANSFORM_DIRTY = 1 << 12;
        /// The node registered an effective viewport listener.
        const HAS_VIEWPORT_LISTENER = 1 << 13;
    }
}

/// The flag triple that parameterizes one path propagation.
///
/// `path` is the ancestor marker, `dirty` is the actual-work bit and
/// `pending` is the deferred-dirty bit. Either of the last two may be empty.
///
/// When `pending` is non-empty, an ancestor carrying the pending bit has it
/// promoted to `dirty`. When `pending` is empty but `dirty` is not, every
/// ancestor on the path is marked `dirty` unconditionally.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathFlags {
    /// Ancestor marker set on every node the walk visits.
    pub path: LayoutFlags,
    /// Actual-work bit.
    pub dirty: LayoutFlags,
    /// Deferred-dirty bit promoted to `dirty` lazily.
    pub pending: LayoutFlags,
}

impl PathFlags {
    /// Measure invalidation: pending measure is promoted on the way up.
    pub const MEASURE: Self = Self::new(
        LayoutFlags::ON_MEASURE_DIRTY_PATH,
        LayoutFlags::MEASURE_DIRTY,
        LayoutFlags::MEASURE_DIRTY_PENDING,
    );

    /// Arrange invalidation: pending arrange is promoted on the way up.
    pub const ARRANGE: Self = Self::new(
        LayoutFlags::ON_ARRANGE_DIRTY_PATH,
        LayoutFlags::ARRANGE_DIRTY,
        LayoutFlags::ARRANGE_DIRTY_PENDING,
    );

    /// Viewport invalidation: path marking only.
    pub const VIEWPORT: Self = Self::path_only(LayoutFlags::ON_VIEWPORT_DIRTY_PATH);

    /// Viewport listener registration: path marking only.
    pub const CONTRIBUTES_TO_VIEWPORT: Self =
        Self::path_only(LayoutFlags::CONTRIBUTES_TO_VIEWPORT);

    /// Automation peer invalidation: every ancestor is marked dirty as well.
    pub const AUTOMATION_PEER: Self = Self::new(
        LayoutFlags::ON_AUTOMATION_PEER_DIRTY_PATH,
        LayoutFlags::AUTOMATION_PEER_DIRTY,
        LayoutFlags::empty(),
    );

    /// Automation peer invalidation without marking ancestors dirty.
    pub const AUTOMATION_PEER_PATH_ONLY: Self =
        Self::path_only(LayoutFlags::ON_AUTOMATION_PEER_DIRTY_PATH);

    /// Creates a flag triple.
    #[must_use]
    pub const fn new(path: LayoutFlags, dirty: LayoutFlags, pending: LayoutFlags) -> Self {
        Self {
            path,
            dirty,
            pending,
        }
    }

    /// Creates a triple that only marks `path`.
    #[must_use]
    pub const fn path_only(path: LayoutFlags) -> Self {
        Self::new(path, LayoutFlags::empty(), LayoutFlags::empty())
    }

    /// Applies this triple to one ancestor's flags.
    ///
    /// Returns `None` if the ancestor is already on the path.
    #[must_use]
    pub fn mark(self, mut flags: LayoutFlags) -> Option<LayoutFlags> {
        if flags.contains(self.path) {
            return None;
        }
        flags.insert(self.path);
        if !self.pending.is_empty() {
            if flags.intersects(self.pending) {
                flags.remove(self.pending);
                flags.insert(self.dirty);
            }
        } else if !self.dirty.is_empty() {
            flags.insert(self.dirty);
        }
        Some(flags)
    }
}

impl fmt::Debug for PathFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFlags")
            .field("path", &self.path)
            .field("dirty", &self.dirty)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_sets_path() {
        let flags = PathFlags::VIEWPORT.mark(LayoutFlags::empty()).unwrap();
        assert_eq!(flags, LayoutFlags::ON_VIEWPORT_DIRTY_PATH);
    }

    #[test]
    fn mark_stops_when_already_on_path() {
        assert!(
            PathFlags::MEASURE
                .mark(LayoutFlags::ON_MEASURE_DIRTY_PATH)
                .is_none()
        );
    }

    #[test]
    fn mark_promotes_pending() {
        let flags = PathFlags::MEASURE
            .mark(LayoutFlags::MEASURE_DIRTY_PENDING)
            .unwrap();
        assert!(flags.contains(LayoutFlags::MEASURE_DIRTY));
        assert!(!flags.contains(LayoutFlags::MEASURE_DIRTY_PENDING));
    }

    #[test]
    fn mark_without_pending_does_not_dirty_measure() {
        let flags = PathFlags::MEASURE.mark(LayoutFlags::empty()).unwrap();
        assert!(!flags.contains(LayoutFlags::MEASURE_DIRTY));
    }

    #[test]
    fn automation_peer_marks_dirty_unconditionally() {
        let flags = PathFlags::AUTOMATION_PEER.mark(LayoutFlags::empty()).unwrap();
        assert!(flags.contains(LayoutFlags::AUTOMATION_PEER_DIRTY));

        let flags = PathFlags::AUTOMATION_PEER_PATH_ONLY
            .mark(LayoutFlags::empty())
            .unwrap();
        assert!(!flags.contains(LayoutFlags::AUTOMATION_PEER_DIRTY));
    }
}
