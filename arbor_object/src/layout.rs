// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout invalidation on the object graph.
//!
//! Each `invalidate_*` method marks the object dirty and runs
//! [`propagate_on_path`] with the matching flag triple. When a walk reaches
//! the root, the graph's [`FramePacer`](arbor_dirty::FramePacer) asks the
//! installed [`FrameScheduler`] for another frame, at most once per pass and
//! never during a layout tick.

use alloc::boxed::Box;

use arbor_dirty::{
    FrameReason, FrameScheduler, LayoutFlags, PathFlags, PathOutcome, PathTree, propagate_on_path,
};
use arbor_property::ObjectId;

use crate::error::ObjectResult;
use crate::graph::{AutomationPeerPropagation, ObjectGraph};

impl PathTree for ObjectGraph {
    type Key = ObjectId;

    fn parent(&self, key: ObjectId) -> Option<ObjectId> {
        self.try_data(key)?.parent
    }

    fn layout_flags(&self, key: ObjectId) -> LayoutFlags {
        self.try_data(key).map_or(LayoutFlags::empty(), |d| d.layout)
    }

    fn set_layout_flags(&mut self, key: ObjectId, flags: LayoutFlags) {
        if let Some(data) = self.try_data_mut(key) {
            data.layout = flags;
        }
    }
}

impl ObjectGraph {
    /// Installs or removes the frame scheduler.
    ///
    /// Without a scheduler, frame requests are dropped silently.
    pub fn set_frame_scheduler(&mut self, scheduler: Option<Box<dyn FrameScheduler>>) {
        self.scheduler = scheduler;
    }

    /// Returns `true` if a frame was requested and not yet serviced.
    #[must_use]
    pub fn is_frame_requested(&self) -> bool {
        self.pacer.is_requested()
    }

    /// Starts a layout tick. Invalidations during the tick do not request
    /// frames, and the per-pass request latch is reset.
    pub fn begin_layout_tick(&mut self) {
        self.pacer.begin_tick();
    }

    /// Ends a layout tick.
    pub fn end_layout_tick(&mut self) {
        self.pacer.end_tick();
    }

    /// Layout flags of `id`.
    #[must_use]
    pub fn layout_flags(&self, id: ObjectId) -> LayoutFlags {
        PathTree::layout_flags(self, id)
    }

    /// Clears `flags` on `id`, as a layout pass does after servicing them.
    pub fn clear_layout_flags(&mut self, id: ObjectId, flags: LayoutFlags) -> ObjectResult<()> {
        self.data_mut(id)?.layout.remove(flags);
        Ok(())
    }

    /// Marks `id` as a layout-suspended boundary, or clears the mark.
    pub fn set_layout_suspended(&mut self, id: ObjectId, suspended: bool) -> ObjectResult<()> {
        self.data_mut(id)?
            .layout
            .set(LayoutFlags::LAYOUT_SUSPENDED, suspended);
        Ok(())
    }

    fn mark_and_walk(
        &mut self,
        id: ObjectId,
        dirty: LayoutFlags,
        path: PathFlags,
        stop_at_suspended: bool,
        reason: FrameReason,
    ) -> ObjectResult<PathOutcome> {
        self.data_mut(id)?.layout.insert(dirty);
        let outcome = propagate_on_path(self, id, path, stop_at_suspended);
        self.pacer
            .after_walk(outcome, self.scheduler.as_deref_mut(), reason);
        Ok(outcome)
    }

    /// Marks `id` measure-dirty and its ancestors on the measure path.
    pub fn invalidate_measure(&mut self, id: ObjectId) -> ObjectResult<PathOutcome> {
        self.mark_and_walk(
            id,
            LayoutFlags::MEASURE_DIRTY,
            PathFlags::MEASURE,
            false,
            FrameReason::Layout,
        )
    }

    /// Defers measure work on `id`: the pending bit becomes dirty when a
    /// later walk passes through it.
    pub fn defer_measure(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?
            .layout
            .insert(LayoutFlags::MEASURE_DIRTY_PENDING);
        Ok(())
    }

    /// Defers arrange work on `id`.
    pub fn defer_arrange(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?
            .layout
            .insert(LayoutFlags::ARRANGE_DIRTY_PENDING);
        Ok(())
    }

    /// Marks `id` arrange-dirty and its ancestors on the arrange path.
    pub fn invalidate_arrange(&mut self, id: ObjectId) -> ObjectResult<PathOutcome> {
        let stop = self.config.arrange_stops_at_suspended;
        self.mark_and_walk(
            id,
            LayoutFlags::ARRANGE_DIRTY,
            PathFlags::ARRANGE,
            stop,
            FrameReason::Layout,
        )
    }

    /// Marks `id` viewport-dirty and its ancestors on the viewport path.
    pub fn invalidate_viewport(&mut self, id: ObjectId) -> ObjectResult<PathOutcome> {
        self.mark_and_walk(
            id,
            LayoutFlags::VIEWPORT_DIRTY,
            PathFlags::VIEWPORT,
            false,
            FrameReason::Viewport,
        )
    }

    /// Marks `id`'s automation peer dirty and its ancestors on the
    /// automation peer path.
    ///
    /// Under [`AutomationPeerPropagation::MarkAncestorsDirty`] every ancestor
    /// on the path is also marked dirty.
    pub fn invalidate_automation_peer(&mut self, id: ObjectId) -> ObjectResult<PathOutcome> {
        let path = match self.config.automation_peer {
            AutomationPeerPropagation::MarkAncestorsDirty => PathFlags::AUTOMATION_PEER,
            AutomationPeerPropagation::PathOnly => PathFlags::AUTOMATION_PEER_PATH_ONLY,
        };
        self.mark_and_walk(
            id,
            LayoutFlags::AUTOMATION_PEER_DIRTY,
            path,
            false,
            FrameReason::AutomationPeer,
        )
    }

    /// Marks `id`'s transform dirty and requests a frame.
    pub fn invalidate_transform(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?.layout.insert(LayoutFlags::TRANSFORM_DIRTY);
        self.pacer
            .request(self.scheduler.as_deref_mut(), FrameReason::Transform);
        Ok(())
    }

    /// Runs the invalidations a property change calls for.
    pub(crate) fn invalidate_for(&mut self, id: ObjectId, affects: LayoutFlags) -> ObjectResult<()> {
        if affects.contains(LayoutFlags::MEASURE_DIRTY) {
            self.invalidate_measure(id)?;
        }
        if affects.contains(LayoutFlags::ARRANGE_DIRTY) {
            self.invalidate_arrange(id)?;
        }
        if affects.contains(LayoutFlags::TRANSFORM_DIRTY) {
            self.invalidate_transform(id)?;
        }
        if affects.contains(LayoutFlags::AUTOMATION_PEER_DIRTY) {
            self.invalidate_automation_peer(id)?;
        }
        Ok(())
    }
}
