// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions from boxed representations to plain [`Value`] payloads.
//!
//! Three inputs can carry a boxed payload: a host-supplied
//! [`ExternalValue`], an object of a built-in boxed type, and a pooled
//! [`ValueObject`]. Each `try_unbox_*` function returns `None` when no
//! mapping exists. That is an ordinary outcome, and the caller keeps the
//! original reference instead, which is what [`ensure_unboxed`] does.

use alloc::sync::Arc;

use crate::id::{ObjectId, TypeIndex};
use crate::value::{ExternalValue, Value};
use crate::value_object::{Duration, KeyTime, RepeatBehavior, ValueObject};

/// Access to the payload of boxed objects.
///
/// The object graph implements this by reading the built-in `BoxedValue`
/// property of objects whose type is a boxed primitive.
pub trait BoxedObjects {
    /// Returns the type and stored payload of `id`, or `None` if the object
    /// does not exist or has no payload.
    fn boxed_payload(&self, id: ObjectId) -> Option<(TypeIndex, &Value)>;
}

impl BoxedObjects for () {
    fn boxed_payload(&self, _id: ObjectId) -> Option<(TypeIndex, &Value)> {
        None
    }
}

/// Maps a host value onto a [`Value`] by its declared type.
///
/// Struct-typed ([`ExternalValue::OtherType`]) and unrecognized values return
/// `None`.
#[must_use]
pub fn try_unbox_external_value(external: &ExternalValue) -> Option<Value> {
    match external {
        ExternalValue::Boolean(v) => Some(Value::Bool(*v)),
        ExternalValue::Int32(v) => Some(Value::Int32(*v)),
        ExternalValue::Int64(v) => Some(Value::Int64(*v)),
        ExternalValue::Single(v) => Some(Value::Float(*v)),
        ExternalValue::Double(v) => Some(Value::Double(*v)),
        ExternalValue::String(s) => Some(Value::String(s.clone())),
        ExternalValue::TimeSpan(t) => Some(Value::TimeSpan(*t)),
        ExternalValue::DateTime(d) => Some(Value::DateTime(*d)),
        ExternalValue::Empty | ExternalValue::UInt32(_) | ExternalValue::OtherType { .. } => None,
    }
}

/// Extracts the payload of an object of a built-in boxed type.
///
/// Key times, durations, and repeat behaviors are stored as pooled value
/// objects and unbox through [`try_unbox_value_object`]. A payload whose kind
/// does not match the object's type is treated as unboxable.
#[must_use]
pub fn try_unbox_object_value<B: BoxedObjects + ?Sized>(id: ObjectId, objects: &B) -> Option<Value> {
    let (type_index, payload) = objects.boxed_payload(id)?;
    match (type_index, payload) {
        (TypeIndex::BOOLEAN, Value::Bool(_))
        | (TypeIndex::INT32, Value::Int32(_))
        | (TypeIndex::INT64, Value::Int64(_))
        | (TypeIndex::DOUBLE, Value::Double(_))
        | (TypeIndex::STRING, Value::String(_))
        | (TypeIndex::COLOR, Value::Color(_))
        | (TypeIndex::POINT, Value::Point(_))
        | (TypeIndex::RECT, Value::Rect(_))
        | (TypeIndex::SIZE, Value::Size(_))
        | (TypeIndex::MATRIX, Value::Matrix(_))
        | (TypeIndex::MATRIX3D, Value::Matrix3D(_))
        | (TypeIndex::ENUM | TypeIndex::THEME, Value::Enum(_)) => Some(payload.clone()),
        (
            TypeIndex::KEY_TIME | TypeIndex::DURATION | TypeIndex::REPEAT_BEHAVIOR,
            Value::ValueObject(vo),
        ) => try_unbox_value_object(vo),
        _ => None,
    }
}

/// Unboxes a pooled value object.
///
/// Non-numeric sub-kinds render as strings: `Duration::Automatic` becomes
/// `"Automatic"`, and `Forever` becomes `"Forever"`. Explicit spans become
/// seconds, and repeat counts become the count, both as doubles.
#[must_use]
pub fn try_unbox_value_object(value_object: &ValueObject) -> Option<Value> {
    let value = match *value_object {
        ValueObject::Duration(Duration::Automatic) => Value::string("Automatic"),
        ValueObject::Duration(Duration::Forever)
        | ValueObject::RepeatBehavior(RepeatBehavior::Forever) => Value::string("Forever"),
        ValueObject::Duration(Duration::TimeSpan(t))
        | ValueObject::KeyTime(KeyTime(t))
        | ValueObject::RepeatBehavior(RepeatBehavior::Duration(t)) => {
            Value::Double(t.as_secs_f64())
        }
        ValueObject::RepeatBehavior(RepeatBehavior::Count(count)) => Value::Double(count),
    };
    Some(value)
}

/// Returns the unboxed form of `value`, or a shallow copy of it when no
/// mapping exists.
///
/// The shallow copy shares the original allocation (an `Arc` clone or the
/// same object handle). Applying this twice yields the same result as
/// applying it once.
///
/// ```rust
/// use std::sync::Arc;
/// use arbor_property::{ExternalValue, Value, ensure_unboxed};
///
/// let boxed = Value::External(Arc::new(ExternalValue::Int32(7)));
/// assert_eq!(ensure_unboxed(&boxed, &()), Value::Int32(7));
///
/// let opaque = Value::External(Arc::new(ExternalValue::OtherType {
///     type_name: "Windows.Foundation.Point".into(),
/// }));
/// let once = ensure_unboxed(&opaque, &());
/// assert_eq!(once, opaque);
/// assert_eq!(ensure_unboxed(&once, &()), once);
/// ```
#[must_use]
pub fn ensure_unboxed<B: BoxedObjects + ?Sized>(value: &Value, objects: &B) -> Value {
    match value {
        Value::External(external) => try_unbox_external_value(external)
            .unwrap_or_else(|| Value::External(Arc::clone(external))),
        Value::Object(id) => try_unbox_object_value(*id, objects).unwrap_or(Value::Object(*id)),
        Value::ValueObject(vo) => {
            try_unbox_value_object(vo).unwrap_or_else(|| Value::ValueObject(Arc::clone(vo)))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Point;

    use super::*;
    use crate::value::{TimeSpan, ThemeResourceRef};

    struct Boxes(Vec<(TypeIndex, Value)>);

    impl BoxedObjects for Boxes {
        fn boxed_payload(&self, id: ObjectId) -> Option<(TypeIndex, &Value)> {
            self.0
                .get(id.index() as usize)
                .map(|(ty, value)| (*ty, value))
        }
    }

    fn oid(i: u32) -> ObjectId {
        ObjectId::new(i, 0)
    }

    #[test]
    fn external_primitives_map_one_to_one() {
        assert_eq!(
            try_unbox_external_value(&ExternalValue::Boolean(true)),
            Some(Value::Bool(true))
        );
        assert_eq!(
            try_unbox_external_value(&ExternalValue::Single(0.5)),
            Some(Value::Float(0.5))
        );
        assert_eq!(
            try_unbox_external_value(&ExternalValue::TimeSpan(TimeSpan::from_ticks(9))),
            Some(Value::TimeSpan(TimeSpan::from_ticks(9)))
        );
    }

    #[test]
    fn other_type_is_silent_miss() {
        let other = ExternalValue::OtherType {
            type_name: "Thickness".into(),
        };
        assert_eq!(try_unbox_external_value(&other), None);
        assert_eq!(try_unbox_external_value(&ExternalValue::UInt32(4)), None);
    }

    #[test]
    fn value_object_string_number_asymmetry() {
        let auto = ValueObject::Duration(Duration::Automatic);
        assert_eq!(try_unbox_value_object(&auto), Some(Value::string("Automatic")));
        let forever = ValueObject::RepeatBehavior(RepeatBehavior::Forever);
        assert_eq!(try_unbox_value_object(&forever), Some(Value::string("Forever")));
        let count = ValueObject::RepeatBehavior(RepeatBehavior::Count(3.0));
        assert_eq!(try_unbox_value_object(&count), Some(Value::Double(3.0)));
        let span = ValueObject::Duration(Duration::TimeSpan(TimeSpan::from_millis(2000)));
        assert_eq!(try_unbox_value_object(&span), Some(Value::Double(2.0)));
    }

    #[test]
    fn boxed_objects_unbox_by_type() {
        let vo = Arc::new(ValueObject::KeyTime(KeyTime(TimeSpan::from_millis(500))));
        let boxes = Boxes(alloc::vec![
            (TypeIndex::POINT, Value::Point(Point::new(1.0, 2.0))),
            (TypeIndex::KEY_TIME, Value::ValueObject(vo)),
            (TypeIndex::INT32, Value::string("mismatch")),
            (TypeIndex::DEPENDENCY_OBJECT, Value::Int32(1)),
        ]);
        assert_eq!(
            try_unbox_object_value(oid(0), &boxes),
            Some(Value::Point(Point::new(1.0, 2.0)))
        );
        assert_eq!(try_unbox_object_value(oid(1), &boxes), Some(Value::Double(0.5)));
        assert_eq!(try_unbox_object_value(oid(2), &boxes), None);
        assert_eq!(try_unbox_object_value(oid(3), &boxes), None);
        assert_eq!(try_unbox_object_value(oid(9), &boxes), None);
    }

    #[test]
    fn ensure_unboxed_is_idempotent() {
        let boxes = Boxes(alloc::vec![
            (TypeIndex::DOUBLE, Value::Double(4.0)),
            (TypeIndex::DEPENDENCY_OBJECT, Value::Null),
        ]);
        let inputs = [
            Value::External(Arc::new(ExternalValue::Double(1.0))),
            Value::External(Arc::new(ExternalValue::OtherType {
                type_name: "Struct".into(),
            })),
            Value::External(Arc::new(ExternalValue::Empty)),
            Value::Object(oid(0)),
            Value::Object(oid(1)),
            Value::ValueObject(Arc::new(ValueObject::Duration(Duration::Forever))),
            Value::ThemeResource(Arc::new(ThemeResourceRef::new("Brush"))),
            Value::Int32(5),
        ];
        for input in &inputs {
            let once = ensure_unboxed(input, &boxes);
            let twice = ensure_unboxed(&once, &boxes);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn ensure_unboxed_wraps_without_copy() {
        let external = Arc::new(ExternalValue::OtherType {
            type_name: "Struct".into(),
        });
        let wrapped = ensure_unboxed(&Value::External(external.clone()), &());
        match wrapped {
            Value::External(inner) => assert!(Arc::ptr_eq(&inner, &external)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
