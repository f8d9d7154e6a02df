// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-dimensional viewport math.
//!
//! Effective viewports are computed per axis from the chain of ancestor
//! viewports, ordered outermost first and expressed in the element's
//! coordinate space.

/// A span along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnidimensionalViewport {
    /// Start of the span.
    pub offset: f32,
    /// Length of the span. Non-positive means empty.
    pub length: f32,
}

impl UnidimensionalViewport {
    /// The span covering the whole axis, used when there are no viewports.
    pub const UNBOUNDED: Self = Self {
        offset: f32::NEG_INFINITY,
        length: f32::INFINITY,
    };

    /// The sentinel returned when ancestor viewports do not overlap.
    pub const EMPTY: Self = Self {
        offset: f32::INFINITY,
        length: 0.0,
    };

    /// Creates a span.
    #[must_use]
    pub const fn new(offset: f32, length: f32) -> Self {
        Self { offset, length }
    }

    /// End of the span. An infinite length always ends at `+inf`.
    #[must_use]
    pub fn end(&self) -> f32 {
        if self.length == f32::INFINITY {
            f32::INFINITY
        } else {
            self.offset + self.length
        }
    }

    /// Returns `true` for spans with no visible extent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length.is_nan() || self.length <= 0.0
    }
}

/// Intersects all viewports along one axis.
///
/// If the intersection is empty, returns [`UnidimensionalViewport::EMPTY`]
/// (offset `+inf`, length 0). With no viewports, returns
/// [`UnidimensionalViewport::UNBOUNDED`].
#[must_use]
pub fn compute_effective_viewport(viewports: &[UnidimensionalViewport]) -> UnidimensionalViewport {
    let mut start = f32::NEG_INFINITY;
    let mut end = f32::INFINITY;
    for v in viewports {
        start = start.max(v.offset);
        end = end.min(v.end());
    }
    if viewports.is_empty() {
        UnidimensionalViewport::UNBOUNDED
    } else if end <= start {
        UnidimensionalViewport::EMPTY
    } else {
        UnidimensionalViewport::new(start, end - start)
    }
}

/// Computes the largest span an element could be scrolled into.
///
/// Walking from the outermost viewport inward, the accumulated span is kept
/// at the largest length seen. When the next viewport does not overlap the
/// accumulated span, the span is moved to touch the near edge of that
/// viewport before comparing lengths.
#[must_use]
pub fn compute_max_viewport(viewports: &[UnidimensionalViewport]) -> UnidimensionalViewport {
    let Some((first, rest)) = viewports.split_first() else {
        return UnidimensionalViewport::UNBOUNDED;
    };
    let mut acc = *first;
    for v in rest {
        if acc.end() <= v.offset {
            acc.offset = v.offset;
        } else if acc.offset >= v.end() {
            acc.offset = v.end() - acc.length;
        }
        if v.length > acc.length {
            acc = *v;
        }
    }
    acc
}

/// Distance an element must move along one axis to become fully visible
/// within the effective viewport.
///
/// Positive values move toward larger offsets. Elements longer than the
/// viewport align their start edge. When the viewports do not overlap, the
/// innermost one is used.
#[must_use]
pub fn compute_bring_into_view_distance(
    element_offset: f32,
    element_length: f32,
    viewports: &[UnidimensionalViewport],
) -> f32 {
    let mut target = compute_effective_viewport(viewports);
    if target.is_empty() {
        match viewports.last() {
            Some(inner) => target = *inner,
            None => return 0.0,
        }
    }
    if !target.offset.is_finite() || !target.length.is_finite() {
        return 0.0;
    }
    let element_end = element_offset + element_length;
    if element_offset < target.offset || element_length > target.length {
        target.offset - element_offset
    } else if element_end > target.end() {
        target.end() - element_end
    } else {
        0.0
    }
}
