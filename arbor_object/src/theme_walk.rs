// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme change propagation.
//!
//! A theme walk visits an object, re-resolves its theme resource bindings,
//! and then recurses into everything that inherits its theme: objects held
//! by owning properties, and visual children. Three rules keep the walk
//! finite and single-visit:
//!
//! - An object with a walk already in flight is skipped, so a write that
//!   points a property back at an ancestor cannot recurse into it.
//! - Back-reference properties are never followed.
//! - A property-held object that is itself a live visual element is left to
//!   the visual tree walk.

use arbor_property::{ObjectId, PropertyIndex, Theme, Value};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::ObjectResult;
use crate::graph::ObjectGraph;
use crate::object::ObjectFlags;

impl ObjectGraph {
    /// The theme pushed for the subtree currently being processed.
    #[must_use]
    pub fn ambient_theme(&self) -> Theme {
        self.ambient_theme
    }

    /// Runs `f` with `theme` as the ambient theme, restoring the previous one
    /// afterward whatever `f` returns.
    ///
    /// [`Theme::None`] leaves the ambient theme unchanged.
    pub fn with_ambient_theme<R>(
        &mut self,
        theme: Theme,
        f: impl FnOnce(&mut Self) -> ObjectResult<R>,
    ) -> ObjectResult<R> {
        if theme.is_none() || theme == self.ambient_theme {
            return f(self);
        }
        let previous = core::mem::replace(&mut self.ambient_theme, theme);
        let result = f(self);
        self.ambient_theme = previous;
        result
    }

    /// Theme in effect for work on `id`: the ambient theme when one is
    /// pushed, otherwise the object's own.
    pub(crate) fn contextual_theme(&self, id: ObjectId) -> Theme {
        if self.ambient_theme.is_none() {
            self.theme(id).unwrap_or_default()
        } else {
            self.ambient_theme
        }
    }

    /// Theme used for resource lookups on behalf of `id`.
    #[must_use]
    pub fn lookup_theme_for(&self, id: ObjectId) -> Theme {
        let theme = self.contextual_theme(id);
        if theme.is_none() { self.config.app_theme } else { theme }
    }

    /// The theme `id` takes when its context moves to `theme`.
    fn effective_theme(&self, id: ObjectId, theme: Theme) -> Theme {
        let requested = self.requested_theme(id);
        if requested.is_none() { theme } else { requested }
    }

    /// Re-themes a live object after its `RequestedTheme` changed.
    pub(crate) fn requested_theme_changed(&mut self, id: ObjectId) -> ObjectResult<()> {
        let inherited = self
            .parent(id)
            .and_then(|p| self.theme(p))
            .filter(|t| !t.is_none())
            .unwrap_or(self.config.app_theme);
        self.notify_theme_changed(id, inherited, false)?;
        Ok(())
    }

    /// Propagates `theme` through `id` and everything that inherits from it.
    ///
    /// Returns `Ok(false)` without doing anything when a walk is already in
    /// flight on `id`, or when its theme is already current and
    /// `force_refresh` is not set. The new theme is stored on `id` only if
    /// the walk succeeds; the in-flight flag and the ambient theme are
    /// restored on every path.
    pub fn notify_theme_changed(
        &mut self,
        id: ObjectId,
        theme: Theme,
        force_refresh: bool,
    ) -> ObjectResult<bool> {
        let data = self.data(id)?;
        if data.flags.contains(ObjectFlags::PROCESSING_THEME_WALK) {
            trace!(%id, ?theme, "theme walk already in flight");
            return Ok(false);
        }
        let effective = self.effective_theme(id, theme);
        if effective == data.theme && !force_refresh {
            return Ok(false);
        }

        let class = self.class_for(id)?;
        self.data_mut(id)?
            .flags
            .insert(ObjectFlags::PROCESSING_THEME_WALK);
        self.theme_walk_depth += 1;
        let result = self.with_ambient_theme(effective, |graph| {
            class.notify_theme_changed_core(graph, id, effective, force_refresh)
        });
        self.theme_walk_depth -= 1;
        if let Some(data) = self.try_data_mut(id) {
            data.flags.remove(ObjectFlags::PROCESSING_THEME_WALK);
            if result.is_ok() {
                data.theme = effective;
            }
        }
        result?;
        debug!(%id, theme = ?effective, "theme applied");
        Ok(true)
    }

    /// Base theme walk body, run inside the guard set up by
    /// [`notify_theme_changed`](Self::notify_theme_changed).
    pub fn notify_theme_changed_core(
        &mut self,
        id: ObjectId,
        theme: Theme,
        force_refresh: bool,
    ) -> ObjectResult<()> {
        self.update_all_theme_references(id)?;

        let (fields, sparse) = self.theme_walk_targets(id)?;
        for target in fields {
            if !self.is_in_visual_tree(target) {
                self.notify_theme_changed(target, theme, force_refresh)?;
            }
        }
        for target in sparse {
            if !self.is_in_visual_tree(target) {
                self.notify_theme_changed(target, theme, force_refresh)?;
            }
        }

        let class = self.class_for(id)?;
        class.peer_theme_changed(self, id, theme)?;

        let children: SmallVec<[ObjectId; 8]> = self.children(id).iter().copied().collect();
        for child in children {
            self.notify_theme_changed(child, theme, force_refresh)?;
        }
        Ok(())
    }

    /// Snapshots the objects a theme walk on `id` follows: first those held in
    /// inline and group slots, then those in the sparse table. Back
    /// references and theme-tracked properties are skipped.
    fn theme_walk_targets(
        &self,
        id: ObjectId,
    ) -> ObjectResult<(SmallVec<[ObjectId; 4]>, SmallVec<[ObjectId; 8]>)> {
        let table = self.table();
        let data = self.data(id)?;
        let follows = |index: PropertyIndex| {
            !table.get_descriptor(index).is_back_reference() && !data.is_theme_tracked(index)
        };

        let mut fields = SmallVec::new();
        let slots = table.type_info(data.type_index).inline_properties();
        for (index, value) in slots.iter().zip(data.inline.iter()) {
            if let Value::Object(target) = value {
                if follows(*index) {
                    fields.push(*target);
                }
            }
        }
        for (group, block) in &data.groups {
            for (index, value) in table.group(*group).properties().iter().zip(block.iter()) {
                if let Value::Object(target) = value {
                    if follows(*index) {
                        fields.push(*target);
                    }
                }
            }
        }

        let mut sparse = SmallVec::new();
        if let Some(values) = data.sparse.as_deref() {
            for (index, value) in values.iter() {
                if let Value::Object(target) = value {
                    if follows(index) {
                        sparse.push(*target);
                    }
                }
            }
        }
        Ok((fields, sparse))
    }
}
