// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State triggers and the per-group qualifier map.
//!
//! Triggers declared on states are flattened into a [`StateTriggerVariantMap`]
//! the first time a group's triggers are evaluated. Each entry pairs a state
//! token with a [`Qualifier`]; evaluation picks the best-scoring qualifier
//! that is currently met.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::model::VisualStateToken;

/// Environment that qualifiers are evaluated against.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct QualifierContext {
    /// Width of the hosting window.
    pub window_width: f64,
    /// Height of the hosting window.
    pub window_height: f64,
}

/// A trigger whose activity is set by application code.
///
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CustomTrigger {
    active: Rc<Cell<bool>>,
}

impl CustomTrigger {
    /// Creates an inactive trigger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the trigger on or off.
    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    /// Returns `true` if the trigger is on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// A trigger declared on a visual state.
#[derive(Clone, Debug)]
pub enum StateTrigger {
    /// Active when the window is at least this large.
    Adaptive {
        /// Minimum window width.
        min_window_width: f64,
        /// Minimum window height.
        min_window_height: f64,
    },
    /// Active while application code says so.
    Custom(CustomTrigger),
}

impl StateTrigger {
    /// An adaptive trigger on window width only.
    #[must_use]
    pub fn min_window_width(width: f64) -> Self {
        Self::Adaptive {
            min_window_width: width,
            min_window_height: 0.0,
        }
    }

    /// An adaptive trigger on window height only.
    #[must_use]
    pub fn min_window_height(height: f64) -> Self {
        Self::Adaptive {
            min_window_width: 0.0,
            min_window_height: height,
        }
    }

    pub(crate) fn qualifier(&self) -> Qualifier {
        match self {
            Self::Adaptive {
                min_window_width,
                min_window_height,
            } => Qualifier::MinWindowSize {
                width: *min_window_width,
                height: *min_window_height,
            },
            Self::Custom(trigger) => Qualifier::Custom(trigger.clone()),
        }
    }
}

/// Evaluation form of a trigger.
#[derive(Clone, Debug)]
pub enum Qualifier {
    /// Met when the window is at least `width` by `height`.
    MinWindowSize {
        /// Minimum width.
        width: f64,
        /// Minimum height.
        height: f64,
    },
    /// Met while the custom trigger is active.
    Custom(CustomTrigger),
}

impl Qualifier {
    /// Returns `true` if the qualifier holds in `cx`.
    #[must_use]
    pub fn is_met(&self, cx: &QualifierContext) -> bool {
        match self {
            Self::MinWindowSize { width, height } => {
                cx.window_width >= *width && cx.window_height >= *height
            }
            Self::Custom(trigger) => trigger.is_active(),
        }
    }

    /// Ranking among met qualifiers. Larger thresholds are more specific;
    /// custom triggers score zero.
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Self::MinWindowSize { width, height } => width + height,
            Self::Custom(_) => 0.0,
        }
    }
}

/// One entry of a [`StateTriggerVariantMap`].
#[derive(Clone, Debug)]
pub struct VariantMapItem {
    /// State selected when the qualifier wins.
    pub token: VisualStateToken,
    /// Condition for the state.
    pub qualifier: Qualifier,
}

/// The qualifiers of one group, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct StateTriggerVariantMap {
    items: Vec<VariantMapItem>,
}

impl StateTriggerVariantMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a qualifier for the state identified by `token`.
    pub fn add(&mut self, token: VisualStateToken, qualifier: Qualifier) {
        self.items.push(VariantMapItem { token, qualifier });
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn items(&self) -> &[VariantMapItem] {
        &self.items
    }

    /// Returns `true` if no state of the group declares a trigger.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The state whose qualifier is met with the highest score. Earlier
    /// entries win ties.
    #[must_use]
    pub fn select(&self, cx: &QualifierContext) -> Option<VisualStateToken> {
        let mut best: Option<(f64, VisualStateToken)> = None;
        for item in &self.items {
            if !item.qualifier.is_met(cx) {
                continue;
            }
            let score = item.qualifier.score();
            if best.is_none_or(|(b, _)| score > b) {
                best = Some((score, item.token));
            }
        }
        best.map(|(_, token)| token)
    }
}
