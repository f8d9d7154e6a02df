// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tagged property value.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use kurbo::{Point, Rect, Size};
use peniko::Color;

use crate::id::{ObjectId, TypeIndex};
use crate::value_object::ValueObject;

/// A time interval in 100-nanosecond ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan {
    /// Number of 100ns ticks.
    pub ticks: i64,
}

impl TimeSpan {
    /// Ticks per second.
    pub const TICKS_PER_SECOND: i64 = 10_000_000;

    /// A zero-length span.
    pub const ZERO: Self = Self { ticks: 0 };

    /// Creates a span from ticks.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self { ticks }
    }

    /// Creates a span from whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            ticks: millis * 10_000,
        }
    }

    /// The span in seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.ticks as f64 / Self::TICKS_PER_SECOND as f64
    }
}

/// A point in time in 100-nanosecond ticks since the platform epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    /// Ticks since the epoch.
    pub universal_time: i64,
}

/// An enum payload tagged with its enumeration type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// The enumeration type.
    pub type_index: TypeIndex,
    /// The underlying value.
    pub value: u32,
}

/// A reference to a theme resource by key, assigned in place of a concrete value.
///
/// Assigning one creates a theme resource binding on the owning property; the
/// property then tracks the resolved value across theme changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThemeResourceRef {
    /// Resource dictionary key.
    pub key: Arc<str>,
}

impl ThemeResourceRef {
    /// Creates a reference to `key`.
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }
}

/// A value supplied by a host runtime, tagged with its declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum ExternalValue {
    /// No value.
    Empty,
    /// `bool`.
    Boolean(bool),
    /// `i32`.
    Int32(i32),
    /// `i64`.
    Int64(i64),
    /// `f32`.
    Single(f32),
    /// `f64`.
    Double(f64),
    /// String.
    String(Arc<str>),
    /// Time span.
    TimeSpan(TimeSpan),
    /// Date-time.
    DateTime(DateTime),
    /// `u32`, which has no payload of its own.
    UInt32(u32),
    /// A struct-typed value only the host understands.
    OtherType {
        /// Host type name, for diagnostics.
        type_name: Arc<str>,
    },
}

/// The discriminant of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Null`].
    Null,
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Int32`].
    Int32,
    /// [`Value::Int64`].
    Int64,
    /// [`Value::Float`].
    Float,
    /// [`Value::Double`].
    Double,
    /// [`Value::String`].
    String,
    /// [`Value::TimeSpan`].
    TimeSpan,
    /// [`Value::DateTime`].
    DateTime,
    /// [`Value::Color`].
    Color,
    /// [`Value::Point`].
    Point,
    /// [`Value::Rect`].
    Rect,
    /// [`Value::Size`].
    Size,
    /// [`Value::Vector3`].
    Vector3,
    /// [`Value::Matrix`].
    Matrix,
    /// [`Value::Matrix3D`].
    Matrix3D,
    /// [`Value::Enum`].
    Enum,
    /// [`Value::ThemeResource`].
    ThemeResource,
    /// [`Value::Object`].
    Object,
    /// [`Value::ValueObject`].
    ValueObject,
    /// [`Value::External`].
    External,
}

/// A property value.
///
/// Exactly one payload is active. Scalars are stored inline; matrices are
/// owned heap arrays; strings, theme references, value objects and external
/// values are shared. Converting between representations always produces a
/// new `Value`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Shared string.
    String(Arc<str>),
    /// Time span.
    TimeSpan(TimeSpan),
    /// Date-time.
    DateTime(DateTime),
    /// Color.
    Color(Color),
    /// Point.
    Point(Point),
    /// Rectangle.
    Rect(Rect),
    /// Size.
    Size(Size),
    /// Three-component vector, used for rotation axes and 3-D translation.
    Vector3([f32; 3]),
    /// 2-D affine matrix `[m11, m12, m21, m22, dx, dy]`.
    Matrix(Box<[f32; 6]>),
    /// Row-major 4x4 matrix.
    Matrix3D(Box<[f32; 16]>),
    /// Enum value.
    Enum(EnumValue),
    /// Theme resource reference.
    ThemeResource(Arc<ThemeResourceRef>),
    /// Reference to another object in the graph.
    Object(ObjectId),
    /// Shared flyweight value object.
    ValueObject(Arc<ValueObject>),
    /// Host-supplied value that has not been unboxed.
    External(Arc<ExternalValue>),
}

impl Value {
    /// Returns the active payload kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::TimeSpan(_) => ValueKind::TimeSpan,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Color(_) => ValueKind::Color,
            Self::Point(_) => ValueKind::Point,
            Self::Rect(_) => ValueKind::Rect,
            Self::Size(_) => ValueKind::Size,
            Self::Vector3(_) => ValueKind::Vector3,
            Self::Matrix(_) => ValueKind::Matrix,
            Self::Matrix3D(_) => ValueKind::Matrix3D,
            Self::Enum(_) => ValueKind::Enum,
            Self::ThemeResource(_) => ValueKind::ThemeResource,
            Self::Object(_) => ValueKind::Object,
            Self::ValueObject(_) => ValueKind::ValueObject,
            Self::External(_) => ValueKind::External,
        }
    }

    /// Creates a string value.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Creates a theme resource reference value.
    #[must_use]
    pub fn theme_resource(key: &str) -> Self {
        Self::ThemeResource(Arc::new(ThemeResourceRef::new(key)))
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the referenced object, if this is an object reference.
    #[must_use]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the theme resource reference, if any.
    #[must_use]
    pub fn as_theme_resource(&self) -> Option<&Arc<ThemeResourceRef>> {
        match self {
            Self::ThemeResource(r) => Some(r),
            _ => None,
        }
    }

    /// Returns a numeric payload widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Double(v) => Some(v),
            Self::Float(v) => Some(f64::from(v)),
            Self::Int32(v) => Some(f64::from(v)),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string payload.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a string. Use this only where the payload
    /// kind is an invariant of the caller.
    #[must_use]
    #[track_caller]
    pub fn expect_str(&self) -> &str {
        match self {
            Self::String(s) => s,
            other => panic!("expected a string payload, found {:?}", other.kind()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::string(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::Object(v)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_payloads() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(1.5_f64).kind(), ValueKind::Double);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(
            Value::Matrix(Box::new([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])).kind(),
            ValueKind::Matrix
        );
        assert_eq!(Value::theme_resource("Accent").kind(), ValueKind::ThemeResource);
    }

    #[test]
    fn clone_is_deep_for_matrices() {
        let a = Value::Matrix3D(Box::new([0.0; 16]));
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn timespan_seconds() {
        assert_eq!(TimeSpan::from_millis(1500).as_secs_f64(), 1.5);
    }

    #[test]
    #[should_panic(expected = "expected a string payload")]
    fn expect_str_panics_on_wrong_kind() {
        let _ = Value::Int32(3).expect_str();
    }
}
