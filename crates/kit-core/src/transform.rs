//! Rigid affine transforms
//!
//! [`Transform`] is an immutable value: composition, inversion and
//! application never mutate their operands. `a * b` (or `a.compose(&b)`)
//! applies `b` first, then `a`.

use std::ops::Mul;

use glam::{DAffine3, DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::precision::{contains_component, snap, snap_vec, vec_approx_eq};

/// Rotation + translation, with an optionally mirrored basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(DAffine3);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self(DAffine3::IDENTITY);

    /// Pure translation
    pub fn from_translation(v: DVec3) -> Self {
        Self(DAffine3::from_translation(v))
    }

    /// Rotation by `angle` radians about `axis` through `point` (right-handed).
    /// `axis` must be non-zero.
    pub fn rotation(point: DVec3, axis: DVec3, angle: f64) -> Self {
        let rotation = DAffine3::from_axis_angle(axis.normalize(), angle);
        Self(DAffine3::from_translation(point) * rotation * DAffine3::from_translation(-point))
    }

    /// Build from explicit basis vectors and origin. Mirrored bases are allowed.
    pub fn from_axes(x_axis: DVec3, y_axis: DVec3, z_axis: DVec3, origin: DVec3) -> Self {
        Self(DAffine3::from_mat3_translation(
            DMat3::from_cols(x_axis, y_axis, z_axis),
            origin,
        ))
    }

    /// `self ∘ other`: apply `other`, then `self`
    pub fn compose(&self, other: &Transform) -> Transform {
        Self(self.0 * other.0)
    }

    pub fn inverse(&self) -> Transform {
        Self(self.0.inverse())
    }

    pub fn apply_point(&self, point: DVec3) -> DVec3 {
        self.0.transform_point3(point)
    }

    /// Vectors ignore the translation part
    pub fn apply_vector(&self, vector: DVec3) -> DVec3 {
        self.0.transform_vector3(vector)
    }

    pub fn origin(&self) -> DVec3 {
        self.0.translation
    }

    pub fn x_axis(&self) -> DVec3 {
        self.0.matrix3.x_axis
    }

    pub fn y_axis(&self) -> DVec3 {
        self.0.matrix3.y_axis
    }

    pub fn z_axis(&self) -> DVec3 {
        self.0.matrix3.z_axis
    }

    /// Basis column by index (0 = X, 1 = Y, 2 = Z)
    pub fn axis(&self, index: usize) -> DVec3 {
        self.0.matrix3.col(index)
    }

    /// Every matrix entry snapped to the crate precision
    pub fn snapped(&self) -> Transform {
        let m = self.0.matrix3;
        Self::from_axes(
            snap_vec(m.x_axis),
            snap_vec(m.y_axis),
            snap_vec(m.z_axis),
            snap_vec(self.0.translation),
        )
    }

    /// Tolerance equality of basis and origin
    pub fn approx_eq(&self, other: &Transform) -> bool {
        (0..3).all(|i| vec_approx_eq(self.axis(i), other.axis(i)))
            && vec_approx_eq(self.origin(), other.origin())
    }

    /// Whether the basis is left-handed (an odd number of inverted axes)
    pub fn is_mirrored(&self) -> bool {
        snap(self.0.matrix3.determinant()) < 0.0
    }

    /// Whether basis column `index` has a component equal to -1, i.e. that
    /// axis maps onto a negative canonical direction
    pub fn axis_points_negative(&self, index: usize) -> bool {
        contains_component(snap_vec(self.axis(index)), -1.0)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        self.compose(rhs)
    }
}
