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

use super::StateVector;
use crate::errors::GeometryError;
use crate::linalg::{Matrix3, Vector3};
use crate::utils::{normalize, NORM_TOLERANCE};
use std::fmt;

/// Local orbit frame (LVLH-like) of a satellite at one instant.
///
/// The z axis points to the central body (nadir), the y axis is the negative orbit normal
/// and the x axis completes the right handed triad, roughly along the velocity.
/// An orbit frame is only valid at the epoch of the state it was built from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitFrame {
    /// DCM from the inertial frame to the orbit frame, its rows are the x, y and z axes.
    pub dcm: Matrix3<f64>,
    /// Position expressed in the orbit frame, for diagnostics
    pub position_km: Vector3<f64>,
    /// Velocity expressed in the orbit frame, for diagnostics
    pub velocity_km_s: Vector3<f64>,
}

impl OrbitFrame {
    /// Builds the orbit frame from an inertial position and velocity.
    pub fn new(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Result<Self, GeometryError> {
        let z_o = -normalize(position, "building the nadir axis of an orbit frame")?;

        let h = position.cross(velocity);
        let cross_norm = h.norm();
        if cross_norm <= NORM_TOLERANCE * position.norm() * velocity.norm() {
            return Err(GeometryError::DegenerateOrbit { cross_norm });
        }
        let y_o = -normalize(&h, "building the orbit normal axis of an orbit frame")?;
        let x_o = y_o.cross(&z_o);

        let dcm = Matrix3::from_rows(&[x_o.transpose(), y_o.transpose(), z_o.transpose()]);

        Ok(Self {
            dcm,
            position_km: dcm * position,
            velocity_km_s: dcm * velocity,
        })
    }

    /// Builds the orbit frame of the provided state.
    pub fn from_state(state: &StateVector) -> Result<Self, GeometryError> {
        Self::new(&state.position_km, &state.velocity_km_s)
    }

    pub fn x_axis(&self) -> Vector3<f64> {
        self.dcm.row(0).transpose()
    }

    pub fn y_axis(&self) -> Vector3<f64> {
        self.dcm.row(1).transpose()
    }

    /// The nadir direction, in the inertial frame.
    pub fn z_axis(&self) -> Vector3<f64> {
        self.dcm.row(2).transpose()
    }

    /// Rotates an inertial vector into this orbit frame.
    pub fn to_orbit(&self, inertial: &Vector3<f64>) -> Vector3<f64> {
        self.dcm * inertial
    }

    /// Rotates a vector expressed in this orbit frame back into the inertial frame.
    pub fn to_inertial(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.dcm.transpose() * local
    }
}

impl fmt::Display for OrbitFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (x, y, z) = (self.x_axis(), self.y_axis(), self.z_axis());
        write!(
            f,
            "x_o = [{:.9}, {:.9}, {:.9}]\ty_o = [{:.9}, {:.9}, {:.9}]\tz_o = [{:.9}, {:.9}, {:.9}]",
            x[0], x[1], x[2], y[0], y[1], y[2], z[0], z[1], z[2]
        )
    }
}
