// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The theme enumeration.

use crate::id::TypeIndex;
use crate::value::{EnumValue, Value};

/// An application theme.
///
/// [`Theme::None`] means "not yet resolved" on an object and "inherit" as a
/// requested theme.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// No theme; inherit from the ambient context.
    #[default]
    None,
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// High contrast theme.
    HighContrast,
}

impl Theme {
    /// Returns `true` for [`Theme::None`].
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }

    /// Encodes the theme as a `RequestedTheme` property value.
    #[must_use]
    pub fn to_value(self) -> Value {
        let value = match self {
            Self::None => 0,
            Self::Light => 1,
            Self::Dark => 2,
            Self::HighContrast => 3,
        };
        Value::Enum(EnumValue {
            type_index: TypeIndex::THEME,
            value,
        })
    }

    /// Decodes a `RequestedTheme` property value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Enum(EnumValue {
                type_index: TypeIndex::THEME,
                value,
            }) => match *value {
                0 => Some(Self::None),
                1 => Some(Self::Light),
                2 => Some(Self::Dark),
                3 => Some(Self::HighContrast),
                _ => None,
            },
            _ => None,
        }
    }
}
