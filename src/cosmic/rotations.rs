/*
    satnav, capture planning for imaging satellites
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::errors::{GeometryError, NonFiniteSnafu, ZeroNormSnafu};
use crate::linalg::{Matrix3, Quaternion, Unit, UnitQuaternion, Vector3, Vector4};
use crate::utils::{checked_acos, normalize, skew_symmetric, NORM_TOLERANCE};
use approx::abs_diff_eq;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use std::ops::Neg;

/// Rotation angles below this value (in radians) are considered to be the identity.
pub const ZERO_ANGLE_TOLERANCE: f64 = 1e-8;

/// When `sin(theta)` is below this value, the rotation is treated as a half turn and
/// its axis is recovered from the symmetric part of the DCM.
pub const HALF_TURN_TOLERANCE: f64 = 1e-9;

/// An attitude quaternion, stored scalar first as `[q0, q1, q2, q3]` and always of unit norm.
///
/// The sign is never canonicalized: `q` and `-q` represent the same rotation, so compare
/// quaternions with [`AttitudeQuaternion::is_equivalent`] instead of `==`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttitudeQuaternion {
    components: [f64; 4],
}

impl AttitudeQuaternion {
    /// Builds a new quaternion from its scalar and vector parts, normalizing it.
    pub fn new(q0: f64, q1: f64, q2: f64, q3: f64) -> Result<Self, GeometryError> {
        let norm = (q0 * q0 + q1 * q1 + q2 * q2 + q3 * q3).sqrt();
        ensure!(
            norm.is_finite(),
            NonFiniteSnafu {
                action: "normalizing a quaternion"
            }
        );
        ensure!(
            norm >= NORM_TOLERANCE,
            ZeroNormSnafu {
                action: "normalizing a quaternion",
                norm
            }
        );
        Ok(Self {
            components: [q0 / norm, q1 / norm, q2 / norm, q3 / norm],
        })
    }

    pub const fn identity() -> Self {
        Self {
            components: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Scalar part, `q0`
    pub fn scalar(&self) -> f64 {
        self.components[0]
    }

    /// Vector part, `[q1, q2, q3]`
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.components[1], self.components[2], self.components[3])
    }

    /// Components in the order expected by attitude control interfaces: scalar first.
    pub fn as_scalar_first(&self) -> [f64; 4] {
        self.components
    }

    pub fn norm(&self) -> f64 {
        self.components.iter().map(|q| q * q).sum::<f64>().sqrt()
    }

    /// Returns whether both quaternions represent the same rotation, i.e. whether `self` is
    /// within `epsilon` of either `other` or `-other`, component-wise.
    pub fn is_equivalent(&self, other: &Self, epsilon: f64) -> bool {
        let this = Vector4::from(self.components);
        abs_diff_eq!(this, Vector4::from(other.components), epsilon = epsilon)
            || abs_diff_eq!(this, -Vector4::from(other.components), epsilon = epsilon)
    }

    /// Converts this quaternion into nalgebra's representation (which stores it vector first).
    pub fn to_unit_quaternion(&self) -> UnitQuaternion<f64> {
        let [q0, q1, q2, q3] = self.components;
        UnitQuaternion::new_unchecked(Quaternion::new(q0, q1, q2, q3))
    }
}

impl Default for AttitudeQuaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Neg for AttitudeQuaternion {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let [q0, q1, q2, q3] = self.components;
        Self {
            components: [-q0, -q1, -q2, -q3],
        }
    }
}

impl fmt::Display for AttitudeQuaternion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [qs, qx, qy, qz] = self.components;
        write!(
            f,
            "Qs = {qs:.10}, Qx = {qx:.10}, Qy = {qy:.10}, Qz = {qz:.10}"
        )
    }
}

/// Returns the unit rotation axis `(â × b̂) / |â × b̂|`, or `None` when both vectors are
/// (anti)parallel and the axis is undefined.
pub fn rotation_axis(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
) -> Result<Option<Unit<Vector3<f64>>>, GeometryError> {
    let a_hat = normalize(a, "building a rotation axis")?;
    let b_hat = normalize(b, "building a rotation axis")?;
    let lambda = a_hat.cross(&b_hat);
    if lambda.norm() < NORM_TOLERANCE {
        Ok(None)
    } else {
        Ok(Some(Unit::new_normalize(lambda)))
    }
}

/// Computes the rotation of `theta` radians around `axis` as the matrix exponential of the
/// skew symmetric generator `theta * [axis]x`.
pub fn exp_rotation(axis: &Unit<Vector3<f64>>, theta: f64) -> Matrix3<f64> {
    skew_symmetric(&(axis.into_inner() * theta)).exp()
}

/// A rotation built with Rodrigues' formula from two vectors and an angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RodriguesRotation {
    pub dcm: Matrix3<f64>,
    pub axis: Unit<Vector3<f64>>,
    /// Set if the vectors were (anti)parallel and the fallback axis was used.
    pub degenerate: bool,
}

/// Rotates by `theta` radians around the axis normal to `a` and `b`.
///
/// If `a` and `b` are (anti)parallel, their cross product does not define an axis and
/// the rotation is instead performed around `fallback_axis`. Callers should provide an
/// axis orthogonal to `a` so that a half turn remains meaningful.
pub fn axis_angle_rotation(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    theta: f64,
    fallback_axis: &Unit<Vector3<f64>>,
) -> Result<RodriguesRotation, GeometryError> {
    let (axis, degenerate) = match rotation_axis(a, b)? {
        Some(axis) => (axis, false),
        None => {
            warn!(
                "rotation axis undefined for (anti)parallel vectors {a} and {b}, rotating {:.6} deg about fallback {}",
                theta.to_degrees(),
                fallback_axis.into_inner()
            );
            (*fallback_axis, true)
        }
    };

    Ok(RodriguesRotation {
        dcm: exp_rotation(&axis, theta),
        axis,
        degenerate,
    })
}

/// Converts a DCM into a quaternion using the axis-angle extraction.
///
/// The axis is read from the antisymmetric part as `[R12 - R21, R20 - R02, R01 - R10] / (2 sin θ)`,
/// which yields the quaternion of the DCM (passive) convention, scalar first.
pub fn rotation_to_quaternion(dcm: &Matrix3<f64>) -> Result<AttitudeQuaternion, GeometryError> {
    let theta = checked_acos(
        (dcm.trace() - 1.0) / 2.0,
        "extracting the rotation angle of a DCM",
    )?;

    if theta.abs() < ZERO_ANGLE_TOLERANCE {
        return Ok(AttitudeQuaternion::identity());
    }

    let sin_theta = theta.sin();
    let e_hat = if sin_theta.abs() > HALF_TURN_TOLERANCE {
        Vector3::new(
            dcm[(1, 2)] - dcm[(2, 1)],
            dcm[(2, 0)] - dcm[(0, 2)],
            dcm[(0, 1)] - dcm[(1, 0)],
        ) / (2.0 * sin_theta)
    } else {
        half_turn_axis(dcm)?
    };

    let (sin_half, cos_half) = (theta / 2.0).sin_cos();
    AttitudeQuaternion::new(
        cos_half,
        e_hat[0] * sin_half,
        e_hat[1] * sin_half,
        e_hat[2] * sin_half,
    )
}

/// For a half turn, R = 2 e eᵀ - I so the axis is read from the symmetric part.
/// The sign of the axis is irrelevant for a half turn.
fn half_turn_axis(dcm: &Matrix3<f64>) -> Result<Vector3<f64>, GeometryError> {
    let sym = (dcm + dcm.transpose()) * 0.5;
    let pivot = (0..3)
        .max_by(|&i, &j| sym[(i, i)].total_cmp(&sym[(j, j)]))
        .unwrap_or(0);
    let e_pivot = ((sym[(pivot, pivot)] + 1.0) / 2.0).max(0.0).sqrt();
    ensure!(
        e_pivot >= NORM_TOLERANCE,
        ZeroNormSnafu {
            action: "extracting the axis of a half turn",
            norm: e_pivot
        }
    );
    let mut axis = Vector3::zeros();
    for i in 0..3 {
        axis[i] = if i == pivot {
            e_pivot
        } else {
            sym[(pivot, i)] / (2.0 * e_pivot)
        };
    }
    normalize(&axis, "extracting the axis of a half turn")
}
