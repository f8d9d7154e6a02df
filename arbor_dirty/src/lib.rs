// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Dirty: ancestor-path invalidation for retained UI trees.
//!
//! Layout, effective-viewport and automation-peer invalidations in a UI tree
//! share one shape: a node becomes dirty, and every ancestor learns that
//! "something below me needs work" through an on-path bit. This crate
//! provides that machinery independent of any concrete tree:
//!
//! - **Flags** ([`LayoutFlags`], [`PathFlags`]): the per-node bits and the
//!   `(path, dirty, pending)` triple that parameterizes one walk.
//! - **Propagation** ([`propagate_on_path`], [`PathTree`]): walks ancestors,
//!   stopping at the first node already on the path, so repeated
//!   invalidations in a subtree cost O(1).
//! - **Frame pacing** ([`FramePacer`], [`FrameScheduler`]): requests at most
//!   one frame per processing pass, and only when a walk reached the root.
//! - **Tracing** ([`PathTrace`], [`PathRecorder`]): optional hooks that
//!   report which nodes a walk touched.
//! - **Viewport math** ([`compute_effective_viewport`],
//!   [`compute_max_viewport`], [`compute_bring_into_view_distance`]):
//!   one-dimensional span intersection used by effective-viewport updates.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_dirty::{LayoutFlags, PathFlags, PathTree, propagate_on_path};
//!
//! struct Tree {
//!     parents: Vec<Option<usize>>,
//!     flags: Vec<LayoutFlags>,
//! }
//!
//! impl PathTree for Tree {
//!     type Key = usize;
//!     fn parent(&self, key: usize) -> Option<usize> {
//!         self.parents[key]
//!     }
//!     fn layout_flags(&self, key: usize) -> LayoutFlags {
//!         self.flags[key]
//!     }
//!     fn set_layout_flags(&mut self, key: usize, flags: LayoutFlags) {
//!         self.flags[key] = flags;
//!     }
//! }
//!
//! // root (0) <- panel (1) <- button (2)
//! let mut tree = Tree {
//!     parents: vec![None, Some(0), Some(1)],
//!     flags: vec![LayoutFlags::empty(); 3],
//! };
//!
//! tree.flags[2].insert(LayoutFlags::MEASURE_DIRTY);
//! let first = propagate_on_path(&mut tree, 2, PathFlags::MEASURE, false);
//! assert_eq!(first.marked, 2);
//! assert!(first.reached_root());
//!
//! // The path is already marked; the second walk stops at the parent.
//! let second = propagate_on_path(&mut tree, 2, PathFlags::MEASURE, false);
//! assert_eq!(second.marked, 0);
//! ```
//!
//! ## Effective Viewports
//!
//! ```rust
//! use arbor_dirty::{UnidimensionalViewport, compute_effective_viewport};
//!
//! let outer = UnidimensionalViewport::new(0.0, 100.0);
//! let inner = UnidimensionalViewport::new(150.0, 100.0);
//! let effective = compute_effective_viewport(&[outer, inner]);
//! assert_eq!(effective.offset, f32::INFINITY);
//! assert!(effective.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod flags;
mod propagate;
pub mod trace;
mod viewport;

pub use flags::{LayoutFlags, PathFlags};
pub use propagate::{
    FramePacer, FrameReason, FrameScheduler, PathOutcome, PathStop, PathTree, propagate_on_path,
    propagate_on_path_with_trace,
};
pub use trace::{PathRecorder, PathTrace};
pub use viewport::{
    UnidimensionalViewport, compute_bring_into_view_distance, compute_effective_viewport,
    compute_max_viewport,
};
