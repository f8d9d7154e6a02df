// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composition-side seams: property sets and change listeners.

use alloc::boxed::Box;

use arbor_object::ObjectGraph;
use arbor_property::Value;
use kurbo::{Affine, Vec2};
use peniko::Color;

use crate::error::{CompositionError, FacadeResult};
use crate::facade::FacadeId;

/// A value as the composition layer stores it.
#[derive(Clone, Debug, PartialEq)]
pub enum FacadeValue {
    /// Single float.
    Scalar(f32),
    /// Two-component vector.
    Vector2(Vec2),
    /// Three-component vector.
    Vector3([f32; 3]),
    /// Four-component vector.
    Vector4([f32; 4]),
    /// Color.
    Color(Color),
    /// 2-D affine matrix.
    Matrix3x2(Affine),
    /// Row-major 4x4 matrix.
    Matrix4x4([f32; 16]),
    /// Boolean.
    Bool(bool),
}

impl FacadeValue {
    /// Converts a facade property value for insertion into a property set.
    ///
    /// Returns `None` for payloads no facade uses.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Float(v) => Self::Scalar(*v),
            Value::Vector3(v) => Self::Vector3(*v),
            Value::Matrix3D(m) => Self::Matrix4x4(**m),
            Value::Bool(b) => Self::Bool(*b),
            Value::Color(c) => Self::Color(*c),
            _ => return None,
        })
    }

    /// Converts a composition value back into the payload of `facade`.
    ///
    /// A 2-D vector widens into a 3-D facade with `z = 0`. Shapes that do not
    /// fit the facade give `None`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "composition vectors are single precision"
    )]
    #[must_use]
    pub fn to_facade_value(&self, facade: FacadeId) -> Option<Value> {
        match (facade, self) {
            (FacadeId::Rotation, Self::Scalar(v)) => Some(Value::Float(*v)),
            (FacadeId::TransformMatrix, Self::Matrix4x4(m)) => Some(Value::Matrix3D(Box::new(*m))),
            (FacadeId::Rotation | FacadeId::TransformMatrix, _) => None,
            (_, Self::Vector3(v)) => Some(Value::Vector3(*v)),
            (_, Self::Vector2(v)) => Some(Value::Vector3([v.x as f32, v.y as f32, 0.0])),
            _ => None,
        }
    }
}

/// A composition property set, as seen by the bridge.
///
/// Properties are identified by insertion order: the first value inserted is
/// property 0. Implementations report a torn-down composition object with
/// [`CompositionError::Closed`].
pub trait PropertySet {
    /// Inserts (or overwrites) the named value.
    fn insert(&mut self, name: &str, value: FacadeValue) -> Result<(), CompositionError>;

    /// Reads the named value back, if present.
    fn try_get(&self, name: &str) -> Result<Option<FacadeValue>, CompositionError>;

    /// Starts routing changes of `property_id` to the bridge.
    fn register_listener(&mut self, property_id: u32) -> Result<(), CompositionError>;

    /// Stops routing changes of `property_id`.
    fn unregister_listener(&mut self, property_id: u32) -> Result<(), CompositionError>;
}

/// Receiver of composition value-changed callbacks.
///
/// The composition runtime calls the method matching the changed property's
/// value shape, on the UI thread.
pub trait PropertyChangeListener {
    /// A single float changed.
    fn on_scalar_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: f32) -> FacadeResult<()>;

    /// A two-component vector changed.
    fn on_vector2_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: Vec2) -> FacadeResult<()>;

    /// A three-component vector changed.
    fn on_vector3_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 3],
    ) -> FacadeResult<()>;

    /// A four-component vector changed.
    fn on_vector4_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 4],
    ) -> FacadeResult<()>;

    /// A color changed.
    fn on_color_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: Color) -> FacadeResult<()>;

    /// A 2-D affine matrix changed.
    fn on_matrix3x2_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: Affine,
    ) -> FacadeResult<()>;

    /// A 4x4 matrix changed.
    fn on_matrix4x4_changed(
        &mut self,
        graph: &mut ObjectGraph,
        property_id: u32,
        value: [f32; 16],
    ) -> FacadeResult<()>;

    /// A boolean changed.
    fn on_boolean_changed(&mut self, graph: &mut ObjectGraph, property_id: u32, value: bool) -> FacadeResult<()>;

    /// A property changed without a value attached.
    fn on_reference_changed(&mut self, graph: &mut ObjectGraph, property_id: u32) -> FacadeResult<()>;
}
