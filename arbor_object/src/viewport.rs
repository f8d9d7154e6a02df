// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effective viewport tracking.
//!
//! Elements register as effective viewport listeners. Registration marks the
//! element viewport-dirty and marks every ancestor as contributing to a
//! viewport, so later changes to an ancestor's slot or scroll window dirty the
//! path again. [`ObjectGraph::update_effective_viewports`] then walks down
//! from a root through dirty nodes only and reports new values to listeners.

use alloc::vec::Vec;

use arbor_dirty::{
    LayoutFlags, PathFlags, UnidimensionalViewport, compute_bring_into_view_distance,
    compute_effective_viewport, compute_max_viewport, propagate_on_path,
};
use arbor_property::ObjectId;
use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::ObjectResult;
use crate::graph::ObjectGraph;

/// New effective viewport values for a listening element.
///
/// Rects are in the element's own coordinate space.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveViewportChanged {
    /// The listening element.
    pub element: ObjectId,
    /// Intersection of all ancestor viewports. Non-overlapping ancestors
    /// yield an origin at `+inf` with no extent on that axis.
    pub effective_viewport: Rect,
    /// Largest ancestor viewport, moved to touch inner viewports it misses.
    pub max_viewport: Rect,
    /// Offset that would scroll the element fully into the effective
    /// viewport.
    pub bring_into_view_distance: Vec2,
}

type Axis = SmallVec<[UnidimensionalViewport; 4]>;

#[derive(Debug)]
struct Visit {
    id: ObjectId,
    parent_origin: Point,
    x: Axis,
    y: Axis,
    under_dirty: bool,
}

const WALK: LayoutFlags = LayoutFlags::VIEWPORT_DIRTY.union(LayoutFlags::ON_VIEWPORT_DIRTY_PATH);
const LISTENING: LayoutFlags =
    LayoutFlags::CONTRIBUTES_TO_VIEWPORT.union(LayoutFlags::HAS_VIEWPORT_LISTENER);
const WALK_UNDER_DIRTY: LayoutFlags = WALK.union(LISTENING);

impl ObjectGraph {
    /// Sets the layout slot of `id`, in its parent's coordinate space.
    pub fn set_layout_slot(&mut self, id: ObjectId, slot: Rect) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        if data.geometry.slot == slot {
            return Ok(());
        }
        data.geometry.slot = slot;
        self.viewport_geometry_changed(id)
    }

    /// Layout slot of `id`.
    #[must_use]
    pub fn layout_slot(&self, id: ObjectId) -> Option<Rect> {
        self.try_data(id).map(|d| d.geometry.slot)
    }

    /// Sets the visible window of a scrolling element, in its own coordinate
    /// space. `None` means the element does not clip.
    pub fn set_viewport(&mut self, id: ObjectId, viewport: Option<Rect>) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        if data.geometry.viewport == viewport {
            return Ok(());
        }
        data.geometry.viewport = viewport;
        self.viewport_geometry_changed(id)
    }

    fn viewport_geometry_changed(&mut self, id: ObjectId) -> ObjectResult<()> {
        let flags = self.data(id)?.layout;
        if flags.intersects(LISTENING) {
            self.invalidate_viewport(id)?;
        }
        Ok(())
    }

    /// Registers `id` for effective viewport reports.
    pub fn add_effective_viewport_listener(&mut self, id: ObjectId) -> ObjectResult<()> {
        self.data_mut(id)?
            .layout
            .insert(LayoutFlags::HAS_VIEWPORT_LISTENER);
        propagate_on_path(self, id, PathFlags::CONTRIBUTES_TO_VIEWPORT, false);
        self.invalidate_viewport(id)?;
        Ok(())
    }

    /// Stops effective viewport reports for `id`.
    ///
    /// Ancestors lose their contributor mark once nothing below them listens.
    pub fn remove_effective_viewport_listener(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.data_mut(id)?;
        data.layout.remove(LayoutFlags::HAS_VIEWPORT_LISTENER);
        let parent = data.parent;
        self.prune_viewport_contributors(parent)
    }

    /// Clears the contributor mark from `start` and its ancestors, stopping
    /// at the first one with a listening or contributing child.
    pub(crate) fn prune_viewport_contributors(&mut self, start: Option<ObjectId>) -> ObjectResult<()> {
        let mut current = start;
        while let Some(id) = current {
            let data = self.data(id)?;
            if !data.layout.contains(LayoutFlags::CONTRIBUTES_TO_VIEWPORT) {
                break;
            }
            if data
                .children
                .iter()
                .any(|child| self.layout_flags(*child).intersects(LISTENING))
            {
                break;
            }
            current = data.parent;
            self.data_mut(id)?
                .layout
                .remove(LayoutFlags::CONTRIBUTES_TO_VIEWPORT);
            trace!(element = %id, "viewport contributor mark cleared");
        }
        Ok(())
    }

    /// Returns `true` if `id` listens for effective viewport changes.
    #[must_use]
    pub fn has_effective_viewport_listener(&self, id: ObjectId) -> bool {
        self.layout_flags(id)
            .contains(LayoutFlags::HAS_VIEWPORT_LISTENER)
    }

    /// Recomputes effective viewports below `root` and clears the viewport
    /// flags of every node visited.
    ///
    /// Only nodes that are viewport-dirty or on the viewport path are
    /// entered; below a dirty node, contributors and listeners are entered
    /// too. Listeners at or below a dirty node are reported.
    pub fn update_effective_viewports(
        &mut self,
        root: ObjectId,
    ) -> ObjectResult<Vec<EffectiveViewportChanged>> {
        let mut changes = Vec::new();
        let mut stack = alloc::vec![Visit {
            id: root,
            parent_origin: Point::ORIGIN,
            x: Axis::new(),
            y: Axis::new(),
            under_dirty: false,
        }];
        while let Some(visit) = stack.pop() {
            let data = self.data(visit.id)?;
            let flags = data.layout;
            let wanted = if visit.under_dirty {
                WALK_UNDER_DIRTY
            } else {
                WALK
            };
            if visit.id != root && !flags.intersects(wanted) {
                continue;
            }
            let geometry = data.geometry;
            let origin = visit.parent_origin + geometry.slot.origin().to_vec2();
            let dirty = visit.under_dirty || flags.contains(LayoutFlags::VIEWPORT_DIRTY);
            if dirty && flags.contains(LayoutFlags::HAS_VIEWPORT_LISTENER) {
                trace!(element = %visit.id, "effective viewport changed");
                changes.push(report(
                    visit.id,
                    origin,
                    geometry.slot.size(),
                    &visit.x,
                    &visit.y,
                ));
            }
            let children: SmallVec<[ObjectId; 8]> = data.children.iter().copied().collect();
            self.data_mut(visit.id)?.layout.remove(WALK);

            let (mut x, mut y) = (visit.x, visit.y);
            if let Some(window) = geometry.viewport {
                x.push(axis(origin.x + window.x0, window.width()));
                y.push(axis(origin.y + window.y0, window.height()));
            }
            for child in children.into_iter().rev() {
                stack.push(Visit {
                    id: child,
                    parent_origin: origin,
                    x: x.clone(),
                    y: y.clone(),
                    under_dirty: dirty,
                });
            }
        }
        Ok(changes)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "viewport math runs in f32"
)]
fn narrow(value: f64) -> f32 {
    value as f32
}

fn axis(offset: f64, length: f64) -> UnidimensionalViewport {
    UnidimensionalViewport::new(narrow(offset), narrow(length))
}

fn relative(x: UnidimensionalViewport, y: UnidimensionalViewport, origin: Point) -> Rect {
    Rect::new(
        f64::from(x.offset) - origin.x,
        f64::from(y.offset) - origin.y,
        f64::from(x.end()) - origin.x,
        f64::from(y.end()) - origin.y,
    )
}

fn report(
    element: ObjectId,
    origin: Point,
    size: Size,
    x: &[UnidimensionalViewport],
    y: &[UnidimensionalViewport],
) -> EffectiveViewportChanged {
    let dx = compute_bring_into_view_distance(narrow(origin.x), narrow(size.width), x);
    let dy = compute_bring_into_view_distance(narrow(origin.y), narrow(size.height), y);
    EffectiveViewportChanged {
        element,
        effective_viewport: relative(
            compute_effective_viewport(x),
            compute_effective_viewport(y),
            origin,
        ),
        max_viewport: relative(compute_max_viewport(x), compute_max_viewport(y), origin),
        bring_into_view_distance: Vec2::new(f64::from(dx), f64::from(dy)),
    }
}
