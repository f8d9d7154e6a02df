// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Facade identities and the insertion-ordered property ID map.

use alloc::boxed::Box;
use core::fmt;

use arbor_property::{Value, ValueKind};
use smallvec::SmallVec;

/// An animatable element property bridged to the composition layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FacadeId {
    /// 3-D offset.
    Translation,
    /// Rotation in degrees about [`RotationAxis`](Self::RotationAxis).
    Rotation,
    /// Axis of rotation.
    RotationAxis,
    /// 3-D scale.
    Scale,
    /// Origin for rotation and scale.
    CenterPoint,
    /// Full 4x4 transform applied after the other facades.
    TransformMatrix,
}

impl FacadeId {
    /// Every facade, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Translation,
        Self::Rotation,
        Self::RotationAxis,
        Self::Scale,
        Self::CenterPoint,
        Self::TransformMatrix,
    ];

    /// Property name of the static value.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Translation => "Translation",
            Self::Rotation => "Rotation",
            Self::RotationAxis => "RotationAxis",
            Self::Scale => "Scale",
            Self::CenterPoint => "CenterPoint",
            Self::TransformMatrix => "TransformMatrix",
        }
    }

    /// Property name of the shadow value written by change notifications.
    #[must_use]
    pub const fn animated_name(self) -> &'static str {
        match self {
            Self::Translation => "AnimatedTranslation",
            Self::Rotation => "AnimatedRotation",
            Self::RotationAxis => "AnimatedRotationAxis",
            Self::Scale => "AnimatedScale",
            Self::CenterPoint => "AnimatedCenterPoint",
            Self::TransformMatrix => "AnimatedTransformMatrix",
        }
    }

    /// Payload kind of the facade's properties.
    #[must_use]
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Rotation => ValueKind::Float,
            Self::TransformMatrix => ValueKind::Matrix3D,
            Self::Translation | Self::RotationAxis | Self::Scale | Self::CenterPoint => {
                ValueKind::Vector3
            }
        }
    }

    /// Value of the facade before anything is set.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Self::Translation | Self::CenterPoint => Value::Vector3([0.0; 3]),
            Self::Rotation => Value::Float(0.0),
            Self::RotationAxis => Value::Vector3([0.0, 0.0, 1.0]),
            Self::Scale => Value::Vector3([1.0; 3]),
            Self::TransformMatrix => Value::Matrix3D(Box::new(IDENTITY_4X4)),
        }
    }
}

impl fmt::Display for FacadeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) const IDENTITY_4X4: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Outcome of [`FacadePropertyMap::establish_mapping_for_facade_id`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MappingOutcome {
    /// The facade was appended and received this property ID.
    Mapped(u32),
    /// The facade already had this property ID.
    AlreadyMapped(u32),
}

impl MappingOutcome {
    /// The facade's property ID either way.
    #[must_use]
    pub const fn property_id(self) -> u32 {
        match self {
            Self::Mapped(id) | Self::AlreadyMapped(id) => id,
        }
    }
}

/// Facades in the order their values were inserted into a property set.
///
/// The composition layer numbers properties by insertion order, so the
/// position of a facade in this list is its property ID. Entries are never
/// removed or reordered.
#[derive(Clone, Debug, Default)]
pub struct FacadePropertyMap {
    order: SmallVec<[FacadeId; 6]>,
}

impl FacadePropertyMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `facade` unless it is already present.
    ///
    /// Call exactly once per facade, right after inserting its value into the
    /// property set.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "at most six facades are ever mapped"
    )]
    pub fn establish_mapping_for_facade_id(&mut self, facade: FacadeId) -> MappingOutcome {
        if let Some(id) = self.property_id(facade) {
            return MappingOutcome::AlreadyMapped(id);
        }
        self.order.push(facade);
        MappingOutcome::Mapped((self.order.len() - 1) as u32)
    }

    /// Property ID of `facade`, if mapped.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "at most six facades are ever mapped"
    )]
    #[must_use]
    pub fn property_id(&self, facade: FacadeId) -> Option<u32> {
        self.order.iter().position(|f| *f == facade).map(|i| i as u32)
    }

    /// Facade mapped to `property_id`.
    #[must_use]
    pub fn facade(&self, property_id: u32) -> Option<FacadeId> {
        self.order.get(property_id as usize).copied()
    }

    /// Number of mapped facades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_ids_follow_insertion_order() {
        let mut map = FacadePropertyMap::new();
        assert_eq!(
            map.establish_mapping_for_facade_id(FacadeId::Translation),
            MappingOutcome::Mapped(0)
        );
        assert_eq!(
            map.establish_mapping_for_facade_id(FacadeId::Scale),
            MappingOutcome::Mapped(1)
        );
        assert_eq!(
            map.establish_mapping_for_facade_id(FacadeId::CenterPoint),
            MappingOutcome::Mapped(2)
        );
        assert_eq!(
            map.establish_mapping_for_facade_id(FacadeId::Translation),
            MappingOutcome::AlreadyMapped(0)
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map.facade(1), Some(FacadeId::Scale));
        assert_eq!(map.facade(3), None);
        assert_eq!(map.property_id(FacadeId::Rotation), None);
    }

    #[test]
    fn defaults_match_kinds() {
        for facade in FacadeId::ALL {
            assert_eq!(facade.default_value().kind(), facade.value_kind(), "{facade}");
        }
    }
}
