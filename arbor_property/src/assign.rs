// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Payload compatibility checks.

use crate::metadata::PropertyDescriptor;
use crate::value::{Value, ValueKind};

/// Returns whether `candidate` may be assigned to a property backed by
/// `descriptor`'s payload kind.
///
/// Strings, object references, external values, and theme resource
/// references are accepted by every property, because coercion of those
/// payloads happens at assignment time downstream. `Null` is accepted only
/// by reference-like kinds.
///
/// ```rust
/// use arbor_property::{PropertyTableBuilder, TypeIndex, Value, builtin, is_assignable};
///
/// let table = PropertyTableBuilder::new().build();
/// let theme = table.get_descriptor(builtin::REQUESTED_THEME);
/// assert!(is_assignable(theme, &Value::Int32(1)));
/// assert!(is_assignable(theme, &Value::string("Dark")));
/// assert!(!is_assignable(theme, &Value::Double(1.0)));
/// ```
#[must_use]
pub fn is_assignable(descriptor: &PropertyDescriptor, candidate: &Value) -> bool {
    kind_accepts(descriptor.value_kind(), candidate.kind())
}

/// The compatibility table behind [`is_assignable`].
#[must_use]
pub fn kind_accepts(target: ValueKind, candidate: ValueKind) -> bool {
    use ValueKind as K;

    if target == candidate {
        return true;
    }
    match candidate {
        K::String | K::Object | K::External | K::ThemeResource => return true,
        K::Null => {
            return matches!(
                target,
                K::Object | K::String | K::ValueObject | K::Matrix | K::Matrix3D
            );
        }
        _ => {}
    }
    match target {
        K::Object => true,
        K::Double => matches!(candidate, K::Float | K::Int32 | K::Int64),
        K::Float => matches!(candidate, K::Double | K::Int32),
        K::Int32 => matches!(candidate, K::Int64 | K::Enum),
        K::Int64 => matches!(candidate, K::Int32),
        K::Bool | K::Enum => matches!(candidate, K::Bool | K::Enum | K::Int32),
        K::TimeSpan => matches!(candidate, K::ValueObject),
        K::ValueObject => matches!(candidate, K::TimeSpan),
        K::Matrix => matches!(candidate, K::Matrix3D),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueKind as K;

    #[test]
    fn double_accepts_numeric_and_permissive_kinds() {
        for candidate in [
            K::Double,
            K::Float,
            K::Int32,
            K::Int64,
            K::String,
            K::ThemeResource,
            K::Object,
        ] {
            assert!(kind_accepts(K::Double, candidate), "{candidate:?}");
        }
        assert!(!kind_accepts(K::Double, K::Bool));
        assert!(!kind_accepts(K::Double, K::Color));
        assert!(!kind_accepts(K::Double, K::Null));
    }

    #[test]
    fn bool_accepts_enum() {
        assert!(kind_accepts(K::Bool, K::Enum));
        assert!(kind_accepts(K::Bool, K::Object));
        assert!(!kind_accepts(K::Bool, K::Double));
    }

    #[test]
    fn object_accepts_everything() {
        for candidate in [K::Null, K::Color, K::Matrix3D, K::ValueObject, K::Rect] {
            assert!(kind_accepts(K::Object, candidate));
        }
    }

    #[test]
    fn structs_are_exact() {
        assert!(kind_accepts(K::Color, K::Color));
        assert!(!kind_accepts(K::Color, K::Point));
        assert!(!kind_accepts(K::Rect, K::Size));
    }
}
