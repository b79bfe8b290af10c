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

use super::rotations::{axis_angle_rotation, rotation_to_quaternion, AttitudeQuaternion};
use super::{EphemerisProvider, OrbitFrame, StateVector, TimeTagged};
use crate::errors::{
    EphemerisError, GeometryError, SearchEphemerisSnafu, SearchError, SearchGeometrySnafu,
};
use crate::linalg::{Unit, Vector3};
use crate::time::Epoch;
use crate::utils::{checked_acos, normalize};
use snafu::ResultExt;
use std::fmt;

/// Boresight of the camera in the orbit frame when the spacecraft is not retargeted.
pub fn nadir() -> Vector3<f64> {
    Vector3::z()
}

/// Pointing solution of the camera boresight toward a target at one instant.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointing {
    pub epoch: Epoch,
    /// Unit direction to the target in the orbit frame
    pub target_direction: Vector3<f64>,
    /// Angle between nadir and the target direction, in [0, 180] degrees
    pub off_nadir_angle_deg: f64,
    /// Orbit-from-body attitude quaternion, scalar first
    pub quaternion: AttitudeQuaternion,
    /// Set when the target is exactly at nadir or zenith and the rotation axis fell back to x_o.
    /// Attitude commands built from a degenerate pointing should be audited.
    pub degenerate: bool,
}

impl Pointing {
    /// Computes the attitude required to point the nadir boresight at the target.
    ///
    /// The `frame` must have been built from `satellite` itself. This function is pure.
    pub fn compute(
        satellite: &StateVector,
        target_position_km: &Vector3<f64>,
        frame: &OrbitFrame,
    ) -> Result<Self, GeometryError> {
        let relative_position = target_position_km - satellite.position_km;
        let relative_position_orbit = frame.to_orbit(&relative_position);

        let target_direction = normalize(
            &relative_position_orbit,
            "computing the direction to the target",
        )?;

        let off_nadir_angle_rad = checked_acos(
            target_direction.dot(&nadir()),
            "computing the off-nadir angle",
        )?;

        let rotation = axis_angle_rotation(
            &nadir(),
            &target_direction,
            off_nadir_angle_rad,
            &Vector3::x_axis(),
        )?;
        // R_bo rotates nadir onto the target, the attitude command is R_ob.
        let quaternion = rotation_to_quaternion(&rotation.dcm.transpose())?;

        Ok(Self {
            epoch: satellite.epoch,
            target_direction,
            off_nadir_angle_deg: off_nadir_angle_rad.to_degrees(),
            quaternion,
            degenerate: rotation.degenerate,
        })
    }

    /// Queries the provider for the satellite state and target position at `epoch` and computes the pointing
    /// in a freshly built orbit frame.
    pub fn at<P: EphemerisProvider>(
        provider: &P,
        satellite: P::Body,
        target: P::Body,
        observer: P::Body,
        epoch: Epoch,
    ) -> Result<Self, SearchError> {
        let (sat_state, target_position) = observe(provider, satellite, target, observer, epoch)
            .context(SearchEphemerisSnafu { epoch })?;
        trace!("{sat_state}");

        let frame = OrbitFrame::from_state(&sat_state).context(SearchGeometrySnafu { epoch })?;
        Self::compute(&sat_state, &target_position, &frame).context(SearchGeometrySnafu { epoch })
    }

    /// Rotation axis used for this pointing, in the orbit frame, if defined
    pub fn slew_axis(&self) -> Option<Unit<Vector3<f64>>> {
        if self.degenerate {
            None
        } else {
            Some(Unit::new_normalize(nadir().cross(&self.target_direction)))
        }
    }
}

impl TimeTagged for Pointing {
    fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl fmt::Display for Pointing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] off-nadir angle = {:.10} deg\t{}",
            self.epoch, self.off_nadir_angle_deg, self.quaternion
        )?;
        if self.degenerate {
            write!(f, " (degenerate axis)")?;
        }
        Ok(())
    }
}

/// Fetches the satellite state and the target position as seen by the observer.
pub(crate) fn observe<P: EphemerisProvider>(
    provider: &P,
    satellite: P::Body,
    target: P::Body,
    observer: P::Body,
    epoch: Epoch,
) -> Result<(StateVector, Vector3<f64>), EphemerisError> {
    let sat_state = provider.state_at(satellite, epoch)?;
    let target_position = provider.position_at(target, epoch, observer)?;
    Ok((sat_state, target_position))
}
