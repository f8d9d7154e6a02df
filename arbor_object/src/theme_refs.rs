// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme resource bindings on objects.

use arbor_property::{ObjectId, PropertyIndex, Value};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{ObjectError, ObjectResult};
use crate::graph::ObjectGraph;
use crate::resources::{BaseValueSource, ThemeResourceBinding};

impl ObjectGraph {
    /// Re-resolves every theme resource binding on `id`.
    ///
    /// Works from a snapshot of the bound properties, so bindings removed or
    /// added by earlier updates in the same pass are tolerated.
    pub fn update_all_theme_references(&mut self, id: ObjectId) -> ObjectResult<()> {
        let Some(refs) = self.data(id)?.theme_refs.as_deref() else {
            return Ok(());
        };
        let bound: SmallVec<[PropertyIndex; 48]> = refs.indices().collect();
        for property in bound {
            self.update_theme_reference(id, property)?;
        }
        Ok(())
    }

    /// Re-establishes the binding on `property`, if it still has one.
    pub fn update_theme_reference(&mut self, id: ObjectId, property: PropertyIndex) -> ObjectResult<()> {
        let Some(binding) = self.data_mut(id)?.take_theme_ref(property) else {
            trace!(%id, %property, "binding already removed");
            return Ok(());
        };
        let source = binding.source;
        self.set_theme_resource_binding(id, property, None, binding, source)
    }

    /// Refreshes the cached value of `binding` for `id`.
    ///
    /// A live object looks the key up through the resolver; a hit is fresh
    /// by construction. Otherwise the binding is refreshed explicitly when a
    /// theme walk is running, the object already has a theme, or the binding
    /// has been resolved before.
    fn update_theme_reference_binding(
        &self,
        id: ObjectId,
        binding: &mut ThemeResourceBinding,
    ) -> ObjectResult<()> {
        let data = self.data(id)?;
        let resolver = self.resolver();
        if data.is_live() {
            if let Some(value) = resolver.find_next_resolved_value(
                self,
                id,
                &binding.key,
                self.config.honor_resource_overrides,
            ) {
                binding.last_resolved = Some(value);
                binding.from_initial_theme = false;
                return Ok(());
            }
        }
        if self.theme_walk_depth > 0 || !data.theme.is_none() || !binding.from_initial_theme {
            if let Some(value) = resolver.refresh_value(self, binding, self.lookup_theme_for(id)) {
                binding.last_resolved = Some(value);
            }
            if data.is_live() {
                binding.from_initial_theme = false;
            }
        }
        Ok(())
    }

    /// Resolves `binding`, writes the resolved value (or `modified`, when
    /// given) to `property`, and records the binding.
    ///
    /// Runs with the object's theme pushed as ambient and with the object
    /// unfrozen, restoring both afterward. Inside a theme walk the object's
    /// theme is the one being applied.
    pub fn set_theme_resource_binding(
        &mut self,
        id: ObjectId,
        property: PropertyIndex,
        modified: Option<Value>,
        mut binding: ThemeResourceBinding,
        source: BaseValueSource,
    ) -> ObjectResult<()> {
        self.data(id)?;
        let descriptor = self.table().get_descriptor(property);
        if !descriptor.is_theme_resource_eligible() {
            return Err(ObjectError::NotThemeResourceEligible {
                property,
                name: descriptor.name(),
            });
        }
        let theme = self.contextual_theme(id);
        binding.source = source;
        self.with_ambient_theme(theme, move |graph| {
            graph.update_theme_reference_binding(id, &mut binding)?;
            if binding.last_resolved.is_none() {
                let resolver = graph.resolver();
                binding.last_resolved =
                    resolver.refresh_value(graph, &binding, graph.lookup_theme_for(id));
            }
            if let Some(value) = modified.or_else(|| binding.last_resolved.clone()) {
                graph.with_unfrozen(id, |graph| graph.set_value_core(id, property, value, true))?;
            }
            graph.data_mut(id)?.insert_theme_ref(property, binding);
            Ok(())
        })
    }
}
