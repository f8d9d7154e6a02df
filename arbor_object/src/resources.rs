// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme resource bindings, dictionaries, and the resolver seam.
//!
//! A [`ThemeResourceBinding`] ties a property on an object to a resource key.
//! Resolution goes through a [`ResourceResolver`]: the graph asks it for the
//! nearest resolved value of a key, and when that lookup misses, asks it to
//! refresh the binding against a theme. A miss is an ordinary outcome.
//!
//! [`DictionaryResolver`] is the resolver installed by default. It looks the
//! key up in the owner's [`ResourceDictionary`] and its ancestors', then in
//! the application dictionary.

use alloc::sync::Arc;

use arbor_property::{ObjectId, Theme, Value};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::graph::ObjectGraph;

/// Where a value written through a binding comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaseValueSource {
    /// Set locally on the object.
    #[default]
    Local,
    /// Set by a style setter.
    Style,
    /// Set by the built-in default style.
    BuiltInStyle,
    /// The property default.
    Default,
}

/// Association between a property and a resource key.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeResourceBinding {
    pub(crate) key: Arc<str>,
    pub(crate) last_resolved: Option<Value>,
    pub(crate) from_initial_theme: bool,
    pub(crate) source: BaseValueSource,
}

impl ThemeResourceBinding {
    /// Creates an unresolved binding for `key`.
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self {
            key: key.into(),
            last_resolved: None,
            from_initial_theme: true,
            source: BaseValueSource::Local,
        }
    }

    /// Sets the base value source recorded with the binding.
    #[must_use]
    pub fn with_source(mut self, source: BaseValueSource) -> Self {
        self.source = source;
        self
    }

    /// Resource key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value the key resolved to most recently.
    #[must_use]
    pub fn last_resolved(&self) -> Option<&Value> {
        self.last_resolved.as_ref()
    }

    /// Returns `true` until the binding has been re-resolved on a live object.
    #[must_use]
    pub fn is_from_initial_theme(&self) -> bool {
        self.from_initial_theme
    }

    /// Base value source.
    #[must_use]
    pub fn source(&self) -> BaseValueSource {
        self.source
    }
}

/// Keyed resources with optional per-theme dictionaries.
///
/// Lookups consult the dictionary for the requested theme first and then the
/// theme-independent entries. [`Theme::None`] looks in the light dictionary.
#[derive(Clone, Debug, Default)]
pub struct ResourceDictionary {
    entries: HashMap<Arc<str>, Value>,
    themed: SmallVec<[(Theme, HashMap<Arc<str>, Value>); 3]>,
}

impl ResourceDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a theme-independent resource.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Inserts a resource into the dictionary for `theme`.
    pub fn insert_themed(
        &mut self,
        theme: Theme,
        key: impl Into<Arc<str>>,
        value: Value,
    ) -> Option<Value> {
        let theme = lookup_theme(theme);
        let dict = match self.themed.iter().position(|(t, _)| *t == theme) {
            Some(i) => &mut self.themed[i].1,
            None => {
                self.themed.push((theme, HashMap::new()));
                let last = self.themed.len() - 1;
                &mut self.themed[last].1
            }
        };
        dict.insert(key.into(), value)
    }

    /// Looks up `key` for `theme`.
    #[must_use]
    pub fn get(&self, key: &str, theme: Theme) -> Option<&Value> {
        let theme = lookup_theme(theme);
        self.themed
            .iter()
            .find(|(t, _)| *t == theme)
            .and_then(|(_, dict)| dict.get(key))
            .or_else(|| self.entries.get(key))
    }

    /// Returns `true` if the dictionary holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.themed.iter().all(|(_, dict)| dict.is_empty())
    }
}

fn lookup_theme(theme: Theme) -> Theme {
    if theme.is_none() { Theme::Light } else { theme }
}

/// Resource lookup used by theme resolution.
pub trait ResourceResolver {
    /// Returns the nearest value for `key` as seen from `owner`.
    ///
    /// `check_overrides` selects whether element-level dictionaries are
    /// consulted. Returns `None` when the key is unresolved.
    fn find_next_resolved_value(
        &self,
        graph: &ObjectGraph,
        owner: ObjectId,
        key: &str,
        check_overrides: bool,
    ) -> Option<Value>;

    /// Re-evaluates `binding` against `theme` without an ancestor walk.
    fn refresh_value(
        &self,
        graph: &ObjectGraph,
        binding: &ThemeResourceBinding,
        theme: Theme,
    ) -> Option<Value>;
}

/// Resolves keys through element dictionaries and the application dictionary.
#[derive(Clone, Copy, Debug, Default)]
pub struct DictionaryResolver;

impl ResourceResolver for DictionaryResolver {
    fn find_next_resolved_value(
        &self,
        graph: &ObjectGraph,
        owner: ObjectId,
        key: &str,
        check_overrides: bool,
    ) -> Option<Value> {
        let theme = graph.lookup_theme_for(owner);
        if check_overrides {
            let mut current = Some(owner);
            while let Some(id) = current {
                if let Some(value) = graph.resources(id).and_then(|dict| dict.get(key, theme)) {
                    return Some(value.clone());
                }
                current = graph.parent(id);
            }
        }
        graph.app_resources().get(key, theme).cloned()
    }

    fn refresh_value(
        &self,
        graph: &ObjectGraph,
        binding: &ThemeResourceBinding,
        theme: Theme,
    ) -> Option<Value> {
        graph.app_resources().get(binding.key(), theme).cloned()
    }
}
