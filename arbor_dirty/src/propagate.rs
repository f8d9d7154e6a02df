// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ancestor path propagation and frame pacing.

use tracing::trace;

use crate::{LayoutFlags, PathFlags, PathTrace};

/// A tree whose nodes carry [`LayoutFlags`].
///
/// Implemented by the object graph; tests implement it over a plain parent
/// array.
pub trait PathTree {
    /// Node handle.
    type Key: Copy + Eq + core::fmt::Debug;

    /// Returns the parent of `key`, or `None` at the root.
    fn parent(&self, key: Self::Key) -> Option<Self::Key>;

    /// Returns the flags currently stored on `key`.
    fn layout_flags(&self, key: Self::Key) -> LayoutFlags;

    /// Replaces the flags stored on `key`.
    fn set_layout_flags(&mut self, key: Self::Key, flags: LayoutFlags);
}

/// Why a path walk ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathStop {
    /// The walk passed the root without meeting an already-marked ancestor.
    ReachedRoot,
    /// An ancestor already carried the path flag.
    AlreadyOnPath,
    /// An ancestor had layout suspended and the walk was asked to stop there.
    LayoutSuspended,
}

/// Result of a path walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathOutcome {
    /// Number of ancestors whose flags changed.
    pub marked: usize,
    /// Why the walk ended.
    pub stop: PathStop,
}

impl PathOutcome {
    /// Returns `true` if the walk reached the root.
    #[must_use]
    pub fn reached_root(&self) -> bool {
        self.stop == PathStop::ReachedRoot
    }
}

/// Marks every ancestor of `start` with `flags.path` until a node already
/// carrying it is found.
///
/// `start` itself is not touched; callers set the dirty bit on the
/// invalidated node before walking. On each visited ancestor, a set
/// `flags.pending` bit is promoted to `flags.dirty`. When `flags.pending` is
/// empty but `flags.dirty` is not, every visited ancestor also receives
/// `flags.dirty`.
///
/// With `stop_at_layout_suspended`, the walk ends at the first ancestor
/// carrying [`LayoutFlags::LAYOUT_SUSPENDED`] without marking it.
///
/// Because the walk stops at the first already-marked ancestor, repeated
/// invalidations within the same subtree are O(1) after the first.
pub fn propagate_on_path<T: PathTree>(
    tree: &mut T,
    start: T::Key,
    flags: PathFlags,
    stop_at_layout_suspended: bool,
) -> PathOutcome {
    propagate_on_path_with_trace(tree, start, flags, stop_at_layout_suspended, &mut ())
}

/// Like [`propagate_on_path`], reporting each marked node to `tracer`.
pub fn propagate_on_path_with_trace<T, R>(
    tree: &mut T,
    start: T::Key,
    flags: PathFlags,
    stop_at_layout_suspended: bool,
    tracer: &mut R,
) -> PathOutcome
where
    T: PathTree,
    R: PathTrace<T::Key>,
{
    let mut marked = 0;
    let mut current = tree.parent(start);
    while let Some(key) = current {
        let existing = tree.layout_flags(key);
        if stop_at_layout_suspended && existing.contains(LayoutFlags::LAYOUT_SUSPENDED) {
            tracer.stopped(Some(key), PathStop::LayoutSuspended);
            return PathOutcome {
                marked,
                stop: PathStop::LayoutSuspended,
            };
        }
        let Some(updated) = flags.mark(existing) else {
            tracer.stopped(Some(key), PathStop::AlreadyOnPath);
            return PathOutcome {
                marked,
                stop: PathStop::AlreadyOnPath,
            };
        };
        tree.set_layout_flags(key, updated);
        tracer.marked(key, flags);
        marked += 1;
        current = tree.parent(key);
    }
    trace!(?start, marked, "path walk reached root");
    tracer.stopped(None, PathStop::ReachedRoot);
    PathOutcome {
        marked,
        stop: PathStop::ReachedRoot,
    }
}

/// Why a frame is being requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameReason {
    /// Measure or arrange work is pending.
    Layout,
    /// Effective viewports must be recomputed.
    Viewport,
    /// Automation peer data is stale.
    AutomationPeer,
    /// A render transform changed.
    Transform,
}

/// Host hook for scheduling frames.
pub trait FrameScheduler {
    /// Requests another frame after `delay_ms` milliseconds.
    fn request_additional_frame(&mut self, delay_ms: u32, reason: FrameReason);
}

/// Coalesces frame requests to at most one per processing pass.
///
/// A request is issued only when a path walk reached the root, no frame has
/// been requested since the last pass, and no layout tick is in progress.
#[derive(Clone, Debug, Default)]
pub struct FramePacer {
    requested: bool,
    in_tick: bool,
}

impl FramePacer {
    /// Creates an idle pacer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a frame was requested and the pass has not run yet.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Returns `true` while a layout tick is in progress.
    #[must_use]
    pub fn in_tick(&self) -> bool {
        self.in_tick
    }

    /// Marks the start of a processing pass. Requests made during the pass
    /// are suppressed because the pass will pick the work up.
    pub fn begin_tick(&mut self) {
        self.in_tick = true;
        self.requested = false;
    }

    /// Marks the end of a processing pass.
    pub fn end_tick(&mut self) {
        self.in_tick = false;
    }

    /// Requests a frame after a path walk if the walk warrants one.
    ///
    /// A missing scheduler is a silent no-op. Returns `true` if a request
    /// was issued.
    pub fn after_walk<S: FrameScheduler + ?Sized>(
        &mut self,
        outcome: PathOutcome,
        scheduler: Option<&mut S>,
        reason: FrameReason,
    ) -> bool {
        if !outcome.reached_root() {
            return false;
        }
        self.request(scheduler, reason)
    }

    /// Requests a frame unless one is already pending or a tick is running.
    pub fn request<S: FrameScheduler + ?Sized>(
        &mut self,
        scheduler: Option<&mut S>,
        reason: FrameReason,
    ) -> bool {
        if self.requested || self.in_tick {
            return false;
        }
        let Some(scheduler) = scheduler else {
            trace!(?reason, "no frame scheduler installed");
            return false;
        };
        scheduler.request_additional_frame(0, reason);
        self.requested = true;
        true
    }
}
