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

use crate::errors::{AcosDomainSnafu, GeometryError, NonFiniteSnafu, ZeroNormSnafu};
use crate::linalg::{Matrix3, Vector3};
use snafu::ensure;

/// Vectors whose norm is below this value cannot be normalized.
pub const NORM_TOLERANCE: f64 = 1e-12;

/// Arccosine arguments may exceed unity by this much from floating point error before being rejected.
pub const ACOS_TOLERANCE: f64 = 1e-9;

/// Returns the skew symmetric (tilde) matrix of the provided vector, such that `S * v = x.cross(v)`.
pub fn skew_symmetric(x: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -x[2], x[1], x[2], 0.0, -x[0], -x[1], x[0], 0.0)
}

/// Returns the unit vector of `v`, or an error if its norm is (near) zero.
/// The `action` is only used to build the error message.
pub fn normalize(v: &Vector3<f64>, action: &'static str) -> Result<Vector3<f64>, GeometryError> {
    let norm = v.norm();
    ensure!(norm.is_finite(), NonFiniteSnafu { action });
    ensure!(norm >= NORM_TOLERANCE, ZeroNormSnafu { action, norm });
    Ok(*v / norm)
}

/// Arccosine which clamps arguments within [`ACOS_TOLERANCE`] of [-1, 1] and rejects the others.
pub fn checked_acos(value: f64, action: &'static str) -> Result<f64, GeometryError> {
    ensure!(value.is_finite(), NonFiniteSnafu { action });
    ensure!(
        value.abs() <= 1.0 + ACOS_TOLERANCE,
        AcosDomainSnafu { action, value }
    );
    Ok(value.clamp(-1.0, 1.0).acos())
}

/// Angle in degrees between two vectors, in [0, 180].
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<f64, GeometryError> {
    let a_hat = normalize(a, "computing an angle between vectors")?;
    let b_hat = normalize(b, "computing an angle between vectors")?;
    Ok(checked_acos(a_hat.dot(&b_hat), "computing an angle between vectors")?.to_degrees())
}
